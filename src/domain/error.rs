//! Domain error types.

/// Top-level error type for papertrader.
///
/// Expected business conditions (insufficient funds, insufficient margin)
/// are boolean returns on the ledger, not errors.
#[derive(Debug, thiserror::Error)]
pub enum PapertraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("state store error: {reason}")]
    State { reason: String },

    #[error("data provider error for {ticker}: {reason}")]
    Data { ticker: String, reason: String },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PapertraderError> for std::process::ExitCode {
    fn from(err: &PapertraderError) -> Self {
        let code: u8 = match err {
            PapertraderError::Io(_) => 1,
            PapertraderError::ConfigParse { .. }
            | PapertraderError::ConfigMissing { .. }
            | PapertraderError::ConfigInvalid { .. } => 2,
            PapertraderError::State { .. } => 3,
            PapertraderError::Data { .. } => 4,
            PapertraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
