use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("parsing config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("source: {0}")]
    Source(String),
    #[error("csv line {line}: {reason}")]
    Csv { line: usize, reason: String },
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("midi: {0}")]
    Midi(String),
    #[error("can't find output port: {0}")]
    PortNotFound(String),
    #[error("{0} environment variable not set")]
    MissingToken(String),
}

impl PulseError {
    pub fn config(msg: impl Into<String>) -> Self {
        PulseError::Config(msg.into())
    }

    pub fn midi(err: impl std::fmt::Display) -> Self {
        PulseError::Midi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
