use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("Turn mismatch: snapshot is at turn {expected}, context asked for {actual}")]
    TurnMismatch { expected: u64, actual: u64 },

    #[error("Player nation '{id}' not present in world state")]
    UnknownPlayerNation { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
