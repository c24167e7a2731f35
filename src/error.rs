use std::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Malformed input: {0}")]
    Format(String),
    #[error("Sample alignment failed: {0}")]
    Alignment(String),
    #[error("Failed to package tables: {0}")]
    Serialization(String),
    #[error("Failed to open source file")]
    FileOpeningError(#[from] io::Error),
    #[error("Failed to (de)serialize binary artifact")]
    ArtifactCodecError(#[from] bincode::Error),
    #[error("Failed to process delimited file")]
    DelimitedFileError(#[from] csv::Error),
    #[error("Failed to write debug json")]
    JsonWriteError(#[from] serde_json::Error),
}
