//! Request validation.

use noughts_engine::{Board, BoardParseError};

use crate::recipe::{ModelVariant, UnknownVariantError};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ValidationError {
    #[display("{_0}")]
    InvalidBoardState(BoardParseError),
    #[display("{_0}")]
    InvalidModelNumber(UnknownVariantError),
}

/// Accepts exactly 9 characters, each one of `x`, `o` or `b`.
pub fn validate_board_state(board_state: &str) -> Result<Board, ValidationError> {
    Ok(board_state.parse()?)
}

/// Accepts exactly `"1"` to `"7"`.
pub fn validate_model_number(model_number: &str) -> Result<ModelVariant, ValidationError> {
    Ok(model_number.parse()?)
}
