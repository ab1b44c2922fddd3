//! Per-candidate failure kinds of the detection pipeline.
//!
//! None of these ever reach a caller of the public detection API: each one
//! is absorbed where it happens and the pipeline moves on to the next
//! candidate, selector or signal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("no digit sequence in text")]
    NoDigits,
    #[error("price {0} outside the accepted range")]
    PriceOutOfRange(f64),
    #[error("unsupported selector `{pattern}`: {reason}")]
    InvalidSelector { pattern: String, reason: String },
    #[error("malformed structured data: {0}")]
    MalformedStructuredData(#[from] serde_json::Error),
}

impl DetectionError {
    pub fn invalid_selector(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
