//! On-disk JSON shape (spec §6 "Persistence format"). Kept deliberately
//! separate from the runtime `CtwNode`/`CtwModel`/`Registry` types so the
//! in-memory representation (arrays, sparse `Option<Box<_>>` children) can
//! diverge freely from the wire format (present-keys-only maps, string
//! symbol keys) without `#[serde(...)]` attribute gymnastics on the hot
//! path types.

use crate::config::Config;
use crate::ctw::{CtwModel, CtwNode};
use crate::ngram::NgramTable;
use crate::registry::{OpponentModel, Registry};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const CURRENT_VERSION: &str = "1.0.0";

fn symbol_key(prev: &[Symbol]) -> String {
    prev.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_symbol_key(key: &str) -> Option<Vec<Symbol>> {
    key.split(',')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<Symbol>().ok())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    pub counts: CountsDoc,
    pub total: u64,
    pub pe: f64,
    pub pw: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, NodeDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountsDoc {
    pub rock: u64,
    pub paper: u64,
    pub scissor: u64,
}

impl From<[u64; 3]> for CountsDoc {
    fn from(c: [u64; 3]) -> Self {
        Self {
            rock: c[0],
            paper: c[1],
            scissor: c[2],
        }
    }
}

impl From<&CountsDoc> for [u64; 3] {
    fn from(c: &CountsDoc) -> Self {
        [c.rock, c.paper, c.scissor]
    }
}

impl NodeDoc {
    pub fn from_node(node: &CtwNode) -> Self {
        let mut children = BTreeMap::new();
        for s in Symbol::ALL {
            if let Some(child) = node.child(s) {
                children.insert(s.to_string(), NodeDoc::from_node(child));
            }
        }
        Self {
            counts: node.counts.into(),
            total: node.total,
            pe: node.pe,
            pw: node.pw,
            children,
        }
    }

    /// Validates `total == sum(counts)` at every node (spec §7
    /// PersistenceCorrupt) and reconstructs a runtime `CtwNode`.
    pub fn to_node(&self) -> Result<CtwNode, String> {
        let counts: [u64; 3] = (&self.counts).into();
        let expected_total: u64 = counts.iter().sum();
        if expected_total != self.total {
            return Err(format!(
                "node total {} does not match sum of counts {}",
                self.total, expected_total
            ));
        }
        let mut node = CtwNode {
            counts,
            total: self.total,
            pe: self.pe,
            pw: self.pw,
            children: [None, None, None],
        };
        for (key, child_doc) in &self.children {
            let s: Symbol = key
                .parse()
                .map_err(|_| format!("unknown child symbol key {key:?}"))?;
            node.children[s.index()] = Some(Box::new(child_doc.to_node()?));
        }
        Ok(node)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtwDoc {
    pub max_depth: usize,
    pub history: Vec<Symbol>,
    pub root: NodeDoc,
}

impl CtwDoc {
    pub fn from_model(model: &CtwModel) -> Self {
        Self {
            max_depth: model.max_depth,
            history: model.history.iter().copied().collect(),
            root: NodeDoc::from_node(&model.root),
        }
    }

    pub fn to_model(&self) -> Result<CtwModel, String> {
        Ok(CtwModel {
            max_depth: self.max_depth,
            root: self.root.to_node()?,
            history: VecDeque::from(self.history.clone()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentDoc {
    pub ctw: CtwDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_ngram: Option<BTreeMap<String, CountsDoc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: String,
    pub save_timestamp: i64,
    pub symbols: [String; 3],
    pub config: Config,
    pub global_ngram: BTreeMap<String, CountsDoc>,
    pub opponents: BTreeMap<String, OpponentDoc>,
}

fn ngram_to_doc(table: &NgramTable) -> BTreeMap<String, CountsDoc> {
    table
        .snapshot()
        .iter()
        .map(|(k, v)| (symbol_key(k), (*v).into()))
        .collect()
}

fn ngram_from_doc(
    order: usize,
    min_samples: u32,
    doc: &BTreeMap<String, CountsDoc>,
) -> Result<NgramTable, String> {
    let mut counts = std::collections::HashMap::new();
    for (k, v) in doc {
        let key = parse_symbol_key(k).ok_or_else(|| format!("unparsable n-gram key {k:?}"))?;
        counts.insert(key, (v).into());
    }
    Ok(NgramTable::restore(order, min_samples, counts))
}

impl SaveFile {
    pub fn from_registry(registry: &Registry, save_timestamp: i64) -> Self {
        let config = registry.config().clone();
        let opponents = registry
            .iter()
            .map(|(id, model)| {
                let doc = OpponentDoc {
                    ctw: CtwDoc::from_model(&model.ctw),
                    local_ngram: model.local_ngram.as_ref().map(ngram_to_doc),
                };
                (id.to_string(), doc)
            })
            .collect();
        Self {
            version: CURRENT_VERSION.to_string(),
            save_timestamp,
            symbols: ["rock".to_string(), "paper".to_string(), "scissor".to_string()],
            global_ngram: ngram_to_doc(&registry.global_ngram()),
            config,
            opponents,
        }
    }

    pub fn to_registry(&self) -> Result<Registry, String> {
        self.config.validate().map_err(|e| e.to_string())?;
        let mut registry = Registry::new(self.config.clone());
        {
            let restored = ngram_from_doc(
                self.config.ngram_order,
                self.config.ngram_min_samples,
                &self.global_ngram,
            )?;
            *registry.global_ngram() = restored;
        }
        for (id_str, doc) in &self.opponents {
            let id: u64 = id_str
                .parse()
                .map_err(|_| format!("non-numeric opponent id {id_str:?}"))?;
            let ctw = doc.ctw.to_model()?;
            let local_ngram = match &doc.local_ngram {
                Some(d) => Some(ngram_from_doc(
                    self.config.ngram_order,
                    self.config.ngram_min_samples,
                    d,
                )?),
                None => None,
            };
            registry.restore_opponent(id, OpponentModel { ctw, local_ngram });
        }
        Ok(registry)
    }
}
