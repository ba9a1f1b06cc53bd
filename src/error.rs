use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse tracker configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("innovation covariance is singular")]
    SingularCovariance,

    #[error("failed to spawn tracking stage: {0}")]
    StageSpawn(#[from] std::io::Error),

    #[error("tracking stage thread panicked")]
    StagePanicked,
}
