use crate::engine::prelude::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("{path}:{source}")]
    Engine {
        path: String,
        #[source]
        source: EngineError,
    },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: worker stopped before reporting. {reason}")]
    Worker { path: String, reason: String },
}
