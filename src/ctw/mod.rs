pub mod model;
pub mod node;

pub use model::CtwModel;
pub use node::{kt_distribution, kt_probability, CtwNode};
