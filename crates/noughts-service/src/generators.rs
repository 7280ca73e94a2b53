//! Canonical column layouts and the hyperparameter search space.

use noughts_engine::{Square, Symbol};
use noughts_forest::{Criterion, MaxFeatures, ParamGrid};

/// Name of the board column for `square`, e.g. `"top-left-square"`.
#[must_use]
pub fn board_column_name(square: Square) -> String {
    format!("{}-square", square.position_name())
}

/// Name of the one-hot indicator column for `symbol` on `square`, e.g. `"top-left-square_x"`.
#[must_use]
pub fn onehot_column_name(square: Square, symbol: Symbol) -> String {
    format!("{}_{symbol}", board_column_name(square))
}

/// The 9 raw board columns in row-major order.
#[must_use]
pub fn board_state_column_names() -> Vec<String> {
    Square::ALL.into_iter().map(board_column_name).collect()
}

/// The 27 one-hot columns: symbol-major (`x`, `o`, `b`), then square in row-major order.
#[must_use]
pub fn onehot_column_names() -> Vec<String> {
    Symbol::ALL
        .into_iter()
        .flat_map(|symbol| {
            Square::ALL
                .into_iter()
                .map(move |square| onehot_column_name(square, symbol))
        })
        .collect()
}

#[must_use]
pub fn param_grid() -> ParamGrid {
    ParamGrid {
        n_estimators: vec![10],
        max_features: vec![MaxFeatures::Sqrt],
        max_depth: vec![Some(8), Some(16)],
        criterion: vec![Criterion::Gini, Criterion::Entropy],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_state_column_names() {
        assert_eq!(
            board_state_column_names(),
            [
                "top-left-square",
                "top-middle-square",
                "top-right-square",
                "middle-left-square",
                "middle-middle-square",
                "middle-right-square",
                "bottom-left-square",
                "bottom-middle-square",
                "bottom-right-square",
            ]
        );
    }

    #[test]
    fn test_onehot_column_names() {
        let names = onehot_column_names();
        assert_eq!(names.len(), 27);
        assert_eq!(names[0], "top-left-square_x");
        assert_eq!(names[8], "bottom-right-square_x");
        assert_eq!(names[9], "top-left-square_o");
        assert_eq!(names[13], "middle-middle-square_o");
        assert_eq!(names[26], "bottom-right-square_b");

        let board = board_state_column_names();
        for (i, symbol) in ["x", "o", "b"].into_iter().enumerate() {
            for (j, square) in board.iter().enumerate() {
                assert_eq!(names[i * 9 + j], format!("{square}_{symbol}"));
            }
        }
    }

    #[test]
    fn test_param_grid() {
        let grid = param_grid();
        assert_eq!(grid.n_estimators, [10]);
        assert_eq!(grid.max_features, [MaxFeatures::Sqrt]);
        assert_eq!(grid.max_depth, [Some(8), Some(16)]);
        assert_eq!(grid.criterion, [Criterion::Gini, Criterion::Entropy]);
        assert_eq!(grid.len(), 4);
    }
}
