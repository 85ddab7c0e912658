//! Positional expansion of the multi-valued coupling-factor cells.
//!
//! `Function_Config = "F1; F2"` becomes `Function_1 = F1, Function_2 = F2`,
//! with shorter lists padded by missing values up to the widest row of the
//! table.

use smallvec::SmallVec;

use bahamas_frontend::{ComponentTable, CouplingFactor};

/// Values of one coupling-factor family for one component, by position.
pub type FamilyValues = SmallVec<[String; 4]>;

/// Component table with each coupling-factor family split into positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedTable {
    /// `values[factor][row]`
    values: [Vec<FamilyValues>; CouplingFactor::COUNT],
    /// Number of expanded columns per family.
    widths: [usize; CouplingFactor::COUNT],
    rows: usize,
}

impl ExpandedTable {
    pub fn from_components(table: &ComponentTable) -> Self {
        let values: [Vec<FamilyValues>; CouplingFactor::COUNT] = std::array::from_fn(|i| {
            let factor = CouplingFactor::ALL[i];
            table
                .components
                .iter()
                .map(|c| c.config_values(factor).into_iter().map(str::to_string).collect())
                .collect()
        });
        let widths = std::array::from_fn(|i| values[i].iter().map(|v| v.len()).max().unwrap_or(0));
        Self {
            values,
            widths,
            rows: table.len(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of expanded `<Family>_<n>` columns.
    pub fn width(&self, factor: CouplingFactor) -> usize {
        self.widths[factor.index()]
    }

    /// Value at `(row, position)`; `None` for padding.
    pub fn cell(&self, factor: CouplingFactor, row: usize, position: usize) -> Option<&str> {
        self.values[factor.index()][row].get(position).map(String::as_str)
    }

    pub fn row_values(&self, factor: CouplingFactor, row: usize) -> &[String] {
        &self.values[factor.index()][row]
    }

    /// Expanded column headers of a family, e.g. `Function_1, Function_2`.
    pub fn column_names(&self, factor: CouplingFactor) -> Vec<String> {
        (1..=self.width(factor)).map(|p| factor.expanded_column(p)).collect()
    }
}
