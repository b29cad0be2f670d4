use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("no path found between source and destination")]
    NoPathFound,
    #[error("invalid vehicle profile: {0}")]
    InvalidVehicleProfile(String),
    #[error("planning deadline exceeded before any route could be produced")]
    Timeout,
    #[error("planning was cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("navigation session {0} not found")]
    NotFound(uuid::Uuid),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read graph file")]
    ReadGraph(std::io::Error),
    #[error("failed to write graph file")]
    WriteGraph(std::io::Error),
    #[error("failed to encode graph")]
    EncodeGraph(bincode::error::EncodeError),
    #[error("failed to decode graph")]
    DecodeGraph(bincode::error::DecodeError),
}
