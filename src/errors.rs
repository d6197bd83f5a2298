use core::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FastError {
    InvalidParams(&'static str),
    InvalidLength { expected: usize, actual: usize },
    InvalidSymbol { position: usize, value: u8 },
    DerivationFailure,
    AllocFailure,
}

impl fmt::Display for FastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FastError::InvalidParams(reason) => {
                write!(f, "Invalid parameters: {}", reason)
            }
            FastError::InvalidLength { expected, actual } => {
                write!(
                    f,
                    "Word is {} symbols, cipher operates on words of {}",
                    actual, expected
                )
            }
            FastError::InvalidSymbol { position, value } => {
                write!(
                    f,
                    "Symbol {} at position {} is outside the alphabet",
                    value, position
                )
            }
            FastError::DerivationFailure => {
                write!(f, "Key derivation primitive failed")
            }
            FastError::AllocFailure => {
                write!(f, "Memory allocation failed")
            }
        }
    }
}

impl std::error::Error for FastError {}
