//! Model variants and the feature pipeline each of them uses.
//!
//! | variant | train pipeline               | test / inference pipeline |
//! |---------|------------------------------|---------------------------|
//! | 1       | one-hot                      | one-hot                   |
//! | 2       | ordinal                      | ordinal                   |
//! | 3       | downsample, ordinal          | ordinal                   |
//! | 4       | upsample, ordinal            | ordinal                   |
//! | 5       | move counts, ordinal         | move counts, ordinal      |
//! | 6       | adjacency, drop board        | adjacency, drop board     |
//! | 7       | upsample, adjacency, ordinal | adjacency, ordinal        |

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    data::{self, TransformError},
    table::Table,
};

/// A named feature recipe, identified externally by `"1"` to `"7"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelVariant {
    Onehot,
    Ordinal,
    Downsampled,
    Upsampled,
    MoveCounts,
    Adjacency,
    UpsampledAdjacency,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown model variant {input:?}, expected 1 to 7")]
pub struct UnknownVariantError {
    pub input: String,
}

/// Dataset partition a pipeline is built for. Predictions use the test pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Train,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Onehot,
    Ordinal,
    Downsample,
    Upsample,
    MoveCounts,
    Adjacency,
    DropBoard,
}

impl ModelVariant {
    pub const ALL: [Self; 7] = [
        Self::Onehot,
        Self::Ordinal,
        Self::Downsampled,
        Self::Upsampled,
        Self::MoveCounts,
        Self::Adjacency,
        Self::UpsampledAdjacency,
    ];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Onehot => 1,
            Self::Ordinal => 2,
            Self::Downsampled => 3,
            Self::Upsampled => 4,
            Self::MoveCounts => 5,
            Self::Adjacency => 6,
            Self::UpsampledAdjacency => 7,
        }
    }

    #[must_use]
    pub const fn pipeline(self, partition: Partition) -> &'static [Step] {
        use Step::{Adjacency, Downsample, DropBoard, MoveCounts, Onehot, Ordinal, Upsample};
        match (self, partition) {
            (Self::Onehot, _) => &[Onehot],
            (Self::Ordinal, _)
            | (Self::Downsampled | Self::Upsampled, Partition::Test) => &[Ordinal],
            (Self::Downsampled, Partition::Train) => &[Downsample, Ordinal],
            (Self::Upsampled, Partition::Train) => &[Upsample, Ordinal],
            (Self::MoveCounts, _) => &[MoveCounts, Ordinal],
            (Self::Adjacency, _) => &[Adjacency, DropBoard],
            (Self::UpsampledAdjacency, Partition::Train) => &[Upsample, Adjacency, Ordinal],
            (Self::UpsampledAdjacency, Partition::Test) => &[Adjacency, Ordinal],
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for ModelVariant {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| UnknownVariantError {
                input: s.to_owned(),
            })
    }
}

impl Serialize for ModelVariant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ModelVariant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Step {
    pub fn apply<R>(self, table: Table, rng: &mut R) -> Result<Table, TransformError>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Onehot => data::onehot_encode(table),
            Self::Ordinal => Ok(data::ordinal_encode(table)),
            Self::Downsample => data::downsample_dataset(table, rng),
            Self::Upsample => data::upsample_dataset(table, rng),
            Self::MoveCounts => data::calculate_move_counts(table),
            Self::Adjacency => data::calculate_adjacent_symbols(table),
            Self::DropBoard => data::drop_board_columns(table),
        }
    }
}

/// Runs `steps` in order.
pub fn apply<R>(steps: &[Step], table: Table, rng: &mut R) -> Result<Table, TransformError>
where
    R: Rng + ?Sized,
{
    steps
        .iter()
        .try_fold(table, |table, step| step.apply(table, rng))
}
