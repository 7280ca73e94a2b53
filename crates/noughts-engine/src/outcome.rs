use std::fmt;

use crate::{Board, Symbol};

/// The eight winning lines as square indices: three rows, three columns, two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Label of a board in the canonical dataset.
///
/// | label      | meaning                             |
/// |------------|-------------------------------------|
/// | `x`        | only `x` completed a line           |
/// | `o`        | only `o` completed a line           |
/// | `nobody`   | no line is complete                 |
/// | `everyone` | both players completed a line       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Cross,
    Nought,
    Nobody,
    Everyone,
}

impl Outcome {
    pub const ALL: [Self; 4] = [Self::Cross, Self::Nought, Self::Nobody, Self::Everyone];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cross => "x",
            Self::Nought => "o",
            Self::Nobody => "nobody",
            Self::Everyone => "everyone",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Board {
    /// Returns `true` if `symbol` occupies all three squares of any line.
    #[must_use]
    pub fn has_line(&self, symbol: Symbol) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells()[i] == symbol))
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match (self.has_line(Symbol::Cross), self.has_line(Symbol::Nought)) {
            (true, false) => Outcome::Cross,
            (false, true) => Outcome::Nought,
            (false, false) => Outcome::Nobody,
            (true, true) => Outcome::Everyone,
        }
    }
}
