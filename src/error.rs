use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelWatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Level {0} is not in the list")]
    NotFound(f64),

    #[error("Level {0} is already in the list")]
    DuplicateLevel(f64),

    #[error("Price feed unavailable: {0}")]
    SamplerUnavailable(String),

    #[error("Monitoring has already been started")]
    AlreadyStarted,

    #[error("WebSocket error: {0}")]
    WebsocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LevelWatchError>;
