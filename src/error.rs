use thiserror::Error;

/// Errors raised while building the system description, reading frames
/// or evaluating rules. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Invalid system description or rule configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed rule or trajectory text.
    #[error("parse error at line {line}: {details}")]
    Parse { line: usize, details: String },

    /// A frame whose shape disagrees with the system description.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A rank points past the end of a bond list.
    #[error("rank {rank} is out of range for bond type {bond_type} ({available} bonds available)")]
    Index {
        bond_type: String,
        rank: usize,
        available: usize,
    },

    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AnalyzeError {
    pub fn config(details: impl Into<String>) -> Self {
        Self::Configuration(details.into())
    }

    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }
}
