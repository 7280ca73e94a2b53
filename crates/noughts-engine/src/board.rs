use std::{fmt, str::FromStr};

use crate::BoardParseError;

/// Width and height of the grid.
pub const BOARD_SIDE: usize = 3;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;

/// Value held by a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Cross,
    Nought,
    Blank,
}

impl Symbol {
    /// All symbols, in the player-major order used by one-hot column layouts.
    pub const ALL: [Self; 3] = [Self::Cross, Self::Nought, Self::Blank];

    /// Symbols that belong to a player.
    pub const PLAYERS: [Self; 2] = [Self::Cross, Self::Nought];

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Cross => 'x',
            Self::Nought => 'o',
            Self::Blank => 'b',
        }
    }

    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'x' => Some(Self::Cross),
            'o' => Some(Self::Nought),
            'b' => Some(Self::Blank),
            _ => None,
        }
    }

    /// Ordinal scale: `x` → 1, `b` → 0, `o` → -1.
    #[must_use]
    pub const fn ordinal(self) -> i8 {
        match self {
            Self::Cross => 1,
            Self::Blank => 0,
            Self::Nought => -1,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One of the nine positions of the grid.
///
/// Squares are indexed in row-major order, `0` being top-left and `8` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    const VERTICAL_NAMES: [&str; BOARD_SIDE] = ["top", "middle", "bottom"];
    const HORIZONTAL_NAMES: [&str; BOARD_SIDE] = ["left", "middle", "right"];

    /// All squares in row-major order.
    pub const ALL: [Self; BOARD_CELLS] = {
        let mut squares = [Self(0); BOARD_CELLS];
        let mut i: u8 = 0;
        while (i as usize) < BOARD_CELLS {
            squares[i as usize] = Self(i);
            i += 1;
        }
        squares
    };

    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Option<Self> {
        if row >= BOARD_SIDE || column >= BOARD_SIDE {
            return None;
        }
        Some(Self((row * BOARD_SIDE + column) as u8))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.index() / BOARD_SIDE
    }

    #[must_use]
    pub const fn column(self) -> usize {
        self.index() % BOARD_SIDE
    }

    /// Position name such as `"top-left"` or `"middle-middle"`.
    #[must_use]
    pub fn position_name(self) -> String {
        format!(
            "{}-{}",
            Self::VERTICAL_NAMES[self.row()],
            Self::HORIZONTAL_NAMES[self.column()]
        )
    }
}

/// A full tic-tac-toe board.
///
/// The board does not check that the position is reachable in a real game: the
/// canonical dataset enumerates every one of the 3^9 symbol assignments.
///
/// Boards serialize as their 9-character encoding (e.g. `"xobboxobx"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Symbol; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Number of distinct boards (3^9).
    #[expect(clippy::cast_possible_truncation)]
    pub const COUNT: usize = 3_usize.pow(BOARD_CELLS as u32);

    #[must_use]
    pub const fn new(cells: [Symbol; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::filled(Symbol::Blank)
    }

    #[must_use]
    pub const fn filled(symbol: Symbol) -> Self {
        Self {
            cells: [symbol; BOARD_CELLS],
        }
    }

    #[must_use]
    pub const fn cells(&self) -> &[Symbol; BOARD_CELLS] {
        &self.cells
    }

    #[must_use]
    pub const fn get(&self, square: Square) -> Symbol {
        self.cells[square.index()]
    }

    pub fn set(&mut self, square: Square, symbol: Symbol) {
        self.cells[square.index()] = symbol;
    }

    #[must_use]
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|s| **s == symbol).count()
    }

    /// Board number `index` in base-3 enumeration order (`x` = 0, `o` = 1, `b` = 2,
    /// top-left being the most significant digit).
    ///
    /// Returns `None` when `index >= Board::COUNT`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= Self::COUNT {
            return None;
        }
        let mut cells = [Symbol::Blank; BOARD_CELLS];
        let mut rest = index;
        for cell in cells.iter_mut().rev() {
            *cell = Symbol::ALL[rest % Symbol::ALL.len()];
            rest /= Symbol::ALL.len();
        }
        Some(Self { cells })
    }

    /// Iterates over every board, in [`Board::from_index`] order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != BOARD_CELLS {
            return Err(BoardParseError::InvalidLength { len });
        }
        let mut cells = [Symbol::Blank; BOARD_CELLS];
        for (index, (cell, symbol)) in cells.iter_mut().zip(s.chars()).enumerate() {
            *cell = Symbol::from_char(symbol)
                .ok_or(BoardParseError::InvalidSymbol { index, symbol })?;
        }
        Ok(Self { cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}
