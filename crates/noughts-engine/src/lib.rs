//! Board model for tic-tac-toe.
//!
//! This crate holds the game-level vocabulary shared by the rest of the workspace:
//!
//! - [`Symbol`] - the three cell values (`x`, `o`, `b`)
//! - [`Square`] - the nine positions of the 3×3 grid, in row-major order
//! - [`Board`] - a full board, parsed from (and rendered to) its 9-character encoding
//! - [`Outcome`] - the label assigned to a board by looking at its completed lines
//!
//! # Board encoding
//!
//! A board state is written as nine characters from top-left to bottom-right:
//!
//! ```text
//! x o b
//! b o x      =>  "xobboxobx"
//! o b x
//! ```
//!
//! # Example
//!
//! ```
//! use noughts_engine::{Board, Outcome, Symbol};
//!
//! let board: Board = "xxxoobbbb".parse().unwrap();
//! assert_eq!(board.count(Symbol::Cross), 3);
//! assert_eq!(board.outcome(), Outcome::Cross);
//! ```

pub use self::{board::*, outcome::*};

pub mod board;
pub mod outcome;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board state must have 9 cells, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid symbol {symbol:?} at position {index}")]
    InvalidSymbol { index: usize, symbol: char },
}
