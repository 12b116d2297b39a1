use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    DegeneratePath,
    Internal,
}

#[derive(Debug, Clone)]
pub struct TerraError {
    pub code: ErrorCode,
    pub message: String,
}

impl TerraError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DegeneratePath, message)
    }
}

impl fmt::Display for TerraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for TerraError {}

pub type TerraResult<T> = Result<T, TerraError>;
