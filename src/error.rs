//! Error types.
//!
//! - `ValuationError`: precondition violations inside the numerical core
//!   (interpolation domain, zero denominators, missing base levels).
//! - `AppError`: what the binary reports. Carries the process exit code.
//!
//! Exit codes: 2 = configuration / local I/O, 3 = calculation domain,
//! 4 = upstream retrieval.

use thiserror::Error;

/// Domain errors raised by the interpolator, valuation engine and assembler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("degenerate interpolation interval: end day {end} must be greater than start day {start}")]
    DegenerateInterval { start: u32, end: u32 },

    #[error("target day {target} outside interpolation interval [{start}, {end}]")]
    TargetOutOfRange { start: u32, end: u32, target: u32 },

    #[error("zero denominator in {0}")]
    ZeroDenominator(&'static str),

    #[error("non-finite input to {0}")]
    NonFinite(&'static str),

    #[error("base {0} level is missing or zero; set it explicitly or extend the source series")]
    MissingBase(&'static str),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ValuationError> for AppError {
    fn from(err: ValuationError) -> Self {
        AppError::new(3, format!("Calculation error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valuation_errors_map_to_exit_code_3() {
        let err: AppError = ValuationError::MissingBase("KR M2").into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("KR M2"));
    }
}
