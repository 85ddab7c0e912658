//! Beta-factor and defense-factor scoring for common cause failures.
//!
//! Each subfactor is graded `A, A+, B, B+, C, D, E`. A factor is the sum of
//! the graded subfactor weights over the table's denominator. Some grades are
//! undefined for some subfactors and fall back to the grade below the plus.

use std::fmt;
use std::str::FromStr;

use crate::engine::errors::ExecError;

/// Subfactor grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    A,
    APlus,
    B,
    BPlus,
    C,
    D,
    E,
}

impl Score {
    pub const ALL: [Score; 7] = [
        Score::A,
        Score::APlus,
        Score::B,
        Score::BPlus,
        Score::C,
        Score::D,
        Score::E,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Score::A => "A",
            Score::APlus => "A+",
            Score::B => "B",
            Score::BPlus => "B+",
            Score::C => "C",
            Score::D => "D",
            Score::E => "E",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Score {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Score::ALL
            .into_iter()
            .find(|score| score.as_str() == trimmed)
            .ok_or_else(|| ExecError::InvalidArgument(format!("unknown subfactor score '{}'", trimmed)))
    }
}

/// Weights by [`Score`] order; `None` where a grade is undefined.
type Weights = [Option<u32>; 7];

/// Subfactor weight table.
#[derive(Debug, Clone, Copy)]
pub struct ScoreTable {
    pub name: &'static str,
    pub denominator: f64,
    rows: &'static [(&'static str, Weights)],
    /// Grades that may fall back, with their fallback grade.
    fallbacks: &'static [(Score, Score)],
}

pub const BETA_FACTOR_TABLE: ScoreTable = ScoreTable {
    name: "beta factor",
    denominator: 100_000.0,
    rows: &[
        ("Redundancy", [Some(23976), Some(10112), Some(4265), Some(1799), Some(759), Some(135), Some(24)]),
        ("Input Similarity", [Some(23976), Some(10112), Some(4265), None, Some(759), Some(135), Some(24)]),
        ("Understanding", [Some(7992), None, Some(1422), None, Some(253), Some(45), Some(8)]),
        ("Analysis and Feedback", [Some(7992), None, Some(1422), None, Some(253), Some(45), Some(8)]),
        ("Human-Machine Interface", [Some(11988), None, Some(2132), None, Some(379), Some(67), Some(12)]),
        ("Safety Culture and Training", [Some(6993), None, Some(1244), None, Some(221), Some(39), Some(7)]),
        ("Access Control", [Some(4995), None, Some(888), None, Some(158), Some(28), Some(5)]),
        ("Tests", [Some(11988), None, Some(2132), None, Some(379), Some(67), Some(12)]),
    ],
    fallbacks: &[(Score::APlus, Score::A), (Score::BPlus, Score::B)],
};

/// The defense table has no `B+` grade at all.
pub const DEFENSE_FACTOR_TABLE: ScoreTable = ScoreTable {
    name: "defense factor",
    denominator: 76_000.0,
    rows: &[
        ("Input Similarity", [Some(23976), Some(10112), Some(4265), None, Some(759), Some(135), Some(24)]),
        ("Understanding", [Some(7992), None, Some(1422), None, Some(253), Some(45), Some(8)]),
        ("Analysis", [Some(7992), None, Some(1442), None, Some(253), Some(45), Some(8)]),
        ("MMI", [Some(11988), None, Some(2132), None, Some(379), Some(67), Some(12)]),
        ("Safety Culture", [Some(6993), None, Some(1244), None, Some(221), Some(39), Some(7)]),
        ("Control", [Some(4995), None, Some(888), None, Some(158), Some(28), Some(5)]),
        ("Tests", [Some(11988), None, Some(2132), None, Some(379), Some(67), Some(12)]),
    ],
    fallbacks: &[(Score::APlus, Score::A)],
};

impl ScoreTable {
    pub fn subfactors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rows.iter().map(|(name, _)| *name)
    }

    /// Weight of one graded subfactor, after fallback.
    pub fn weight(&self, subfactor: &str, score: Score) -> Result<u32, ExecError> {
        let weights = self
            .rows
            .iter()
            .find(|(name, _)| *name == subfactor)
            .map(|(_, w)| w)
            .ok_or_else(|| ExecError::InvalidArgument(format!("Unidentified subfactor '{}'", subfactor)))?;
        weights[score.index()]
            .or_else(|| {
                self.fallbacks
                    .iter()
                    .find(|(from, _)| *from == score)
                    .and_then(|(_, to)| weights[to.index()])
            })
            .ok_or_else(|| {
                ExecError::InvalidArgument(format!(
                    "no {} weight for subfactor '{}' with score '{}'",
                    self.name, subfactor, score
                ))
            })
    }

    /// Sum of graded weights over the denominator.
    pub fn compute<'a, I>(&self, scores: I) -> Result<f64, ExecError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut total = 0u64;
        for (subfactor, score) in scores {
            total += u64::from(self.weight(subfactor, score.parse()?)?);
        }
        Ok(total as f64 / self.denominator)
    }
}

/// Beta factor from `(subfactor, score)` pairs.
pub fn compute_beta<'a, I>(scores: I) -> Result<f64, ExecError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    BETA_FACTOR_TABLE.compute(scores)
}

/// Defense factor from `(subfactor, score)` pairs.
pub fn compute_phi<'a, I>(scores: I) -> Result<f64, ExecError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    DEFENSE_FACTOR_TABLE.compute(scores)
}
