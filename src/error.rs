/// failure taxonomy for the tuning pipeline.
///
/// a Numerical failure at an infeasible trial point never surfaces here;
/// cost evaluation maps those to the sentinel cost and the solver backs
/// away on its own. Domain and Optimization failures reach the sweep,
/// which records them in the row and keeps going. Config failures abort
/// before any tuning starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("domain: {0}")]
    Domain(String),
    #[error("numerical: {0}")]
    Numerical(String),
    #[error("optimization failed: {0}")]
    Optimization(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
