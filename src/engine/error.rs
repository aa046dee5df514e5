use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read rules file: {0}")]
    Read(#[source] io::Error),

    #[error("could not parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rules: {0}")]
    Invalid(&'static str),
}
