pub mod battlelog;
pub mod charges;
pub mod cli;
pub mod config;
pub mod ctw;
pub mod ensemble;
pub mod error;
pub mod evaluate;
pub mod ngram;
pub mod persistence;
pub mod registry;
pub mod symbol;
pub mod training;

pub use charges::Charges;
pub use config::Config;
pub use error::PredictorError;
pub use registry::{Prediction, Registry};
pub use symbol::{Distribution, Symbol};

/// Probability mass assigned to a single symbol.
pub type Probability = f64;

/// KT add-1/2 smoothing constant, shared by the CTW node and the n-gram table.
pub const KT_SMOOTHING: Probability = 0.5;

/// `pe`/`pw` underflow guard: rescale a node's path once any value on it
/// drops below this threshold (spec: "< 1e-100 at any node on the update path").
pub const PE_UNDERFLOW_THRESHOLD: f64 = 1e-100;

/// Common factor used to rescale `pe`/`pw` back into a safe range together.
pub const PE_RESCALE_FACTOR: f64 = 1e100;

/// History ring buffers are trimmed to `10 * max_depth` symbols (spec §4.1).
pub const HISTORY_TRIM_FACTOR: usize = 10;

/// Initialize logging: a colored terminal logger at `Info` plus a debug
/// logger into a timestamped file under `logs/`, the way the teacher's
/// `lib.rs::init()` wires up `simplelog`.
pub fn init_logging() -> anyhow::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    std::fs::create_dir_all("logs")?;
    let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log"))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).map_err(|e| anyhow::anyhow!(e))
}

/// A small, ticking progress reporter for long offline passes (bootstrap,
/// backtest). Mirrors the teacher's `clustering::progress::Progress`, but
/// backed by `indicatif` the way the teacher's own `lib.rs::progress()`
/// helper builds its bars.
pub struct Progress {
    bar: indicatif::ProgressBar,
    check: usize,
    ticks: usize,
}

impl Progress {
    pub fn new(total: usize, report_every: usize) -> Self {
        let bar = indicatif::ProgressBar::new(total as u64);
        bar.set_style(
            indicatif::ProgressStyle::with_template(
                "{elapsed_precise} {bar:40.cyan/blue} {pos:>10}/{len:<10} {percent:>3}%",
            )
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
        );
        Self {
            bar,
            check: report_every.max(1),
            ticks: 0,
        }
    }

    pub fn tick(&mut self) {
        self.ticks += 1;
        self.bar.inc(1);
        if self.ticks % self.check == 0 {
            log::debug!("progress: {}/{}", self.bar.position(), self.bar.length().unwrap_or(0));
        }
        if self.ticks == self.bar.length().unwrap_or(0) as usize {
            self.bar.finish_and_clear();
        }
    }
}
