use coverflow_model::{CarouselPhase, ModelError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverflowError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Phase transition rejected: {from} -> {to}")]
    TransitionRejected {
        from: CarouselPhase,
        to: CarouselPhase,
    },

    #[error("Stored preference {key} is malformed: {source}")]
    Preference {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoverflowError>;
