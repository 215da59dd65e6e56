//! Market status reported by the data provider.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Open,
    Closed,
    /// Provider failure. Gates trading identically to [`MarketState::Closed`].
    Error,
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketState::Open => write!(f, "OPEN"),
            MarketState::Closed => write!(f, "CLOSED"),
            MarketState::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketStatus {
    pub is_open: bool,
    pub state: MarketState,
    /// Human-readable description of the next transition.
    pub detail: String,
    /// Minutes until the venue closes, when open and known.
    pub minutes_to_close: Option<i64>,
}

impl MarketStatus {
    pub fn open(detail: impl Into<String>, minutes_to_close: Option<i64>) -> Self {
        MarketStatus {
            is_open: true,
            state: MarketState::Open,
            detail: detail.into(),
            minutes_to_close,
        }
    }

    pub fn closed(detail: impl Into<String>) -> Self {
        MarketStatus {
            is_open: false,
            state: MarketState::Closed,
            detail: detail.into(),
            minutes_to_close: None,
        }
    }

    /// Provider failure surfaced as a status rather than an error.
    pub fn error(message: impl Into<String>) -> Self {
        MarketStatus {
            is_open: false,
            state: MarketState::Error,
            detail: message.into(),
            minutes_to_close: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_status() {
        let status = MarketStatus::open("Market closes in 90 minutes", Some(90));
        assert!(status.is_open);
        assert_eq!(status.state, MarketState::Open);
        assert_eq!(status.minutes_to_close, Some(90));
    }

    #[test]
    fn error_gates_like_closed() {
        let err = MarketStatus::error("connection refused");
        let closed = MarketStatus::closed("Market closed");
        assert!(!err.is_open);
        assert!(!closed.is_open);
        assert_eq!(err.state, MarketState::Error);
        assert_eq!(err.detail, "connection refused");
    }

    #[test]
    fn state_labels() {
        assert_eq!(MarketState::Open.to_string(), "OPEN");
        assert_eq!(MarketState::Closed.to_string(), "CLOSED");
        assert_eq!(MarketState::Error.to_string(), "ERROR");
    }
}
