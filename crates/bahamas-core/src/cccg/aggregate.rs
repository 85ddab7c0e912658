//! Re-aggregation of expanded groups into output records.

use bahamas_frontend::{ComponentRecord, ComponentTable, CouplingFactor};

use super::expand::ExpandedTable;
use super::matching::ComponentGroup;

/// Header of the coupling factor tag column.
pub const COUPLING_FACTOR_COLUMN: &str = "Coupling_Factor";

/// Placeholder tokens that never count as a value.
const PLACEHOLDER_TOKENS: [&str; 2] = ["None", "nan"];

/// Sort a component's values of one family and join them with `;`,
/// skipping empty and placeholder tokens. Repeated values are kept.
pub fn collapse_values<S: AsRef<str>>(values: &[S]) -> String {
    let mut kept: Vec<&str> = values
        .iter()
        .map(AsRef::as_ref)
        .filter(|v| !v.is_empty() && !PLACEHOLDER_TOKENS.contains(v))
        .collect();
    kept.sort_unstable();
    kept.join(";")
}

/// One component of an aggregated group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AggregatedRecord {
    pub attributes: Vec<Option<String>>,
    /// Collapsed `*_Config` strings by [`CouplingFactor::index`].
    pub configs: [String; CouplingFactor::COUNT],
}

impl AggregatedRecord {
    pub fn config(&self, factor: CouplingFactor) -> &str {
        &self.configs[factor.index()]
    }
}

/// A common cause group ready for output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AggregatedGroup {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub members: ComponentGroup,
    pub records: Vec<AggregatedRecord>,
    /// Families whose collapsed value is the same non-empty string for every
    /// member.
    pub coupling_factors: Vec<CouplingFactor>,
    /// [`Self::coupling_factors`] joined with `;`.
    pub coupling_factor: String,
}

impl AggregatedGroup {
    pub fn build(components: &ComponentTable, expanded: &ExpandedTable, members: &ComponentGroup) -> Self {
        let records: Vec<AggregatedRecord> = members
            .rows()
            .iter()
            .map(|&row| AggregatedRecord {
                attributes: components.components[row].attributes.clone(),
                configs: CouplingFactor::ALL.map(|f| collapse_values(expanded.row_values(f, row))),
            })
            .collect();
        let coupling_factors: Vec<CouplingFactor> = CouplingFactor::ALL
            .into_iter()
            .filter(|&f| shares_factor(&records, f))
            .collect();
        let coupling_factor = coupling_factors
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(";");
        Self {
            members: members.clone(),
            records,
            coupling_factors,
            coupling_factor,
        }
    }

    /// `Function;Design` style tag; empty when no family is constant.
    pub fn coupling_factor_label(&self) -> &str {
        &self.coupling_factor
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The group's records as a component table with the given descriptive
    /// columns, e.g. to aggregate them again.
    pub fn to_component_table(&self, columns: &[String]) -> ComponentTable {
        ComponentTable {
            columns: columns.to_vec(),
            components: self
                .records
                .iter()
                .map(|r| ComponentRecord {
                    attributes: r.attributes.clone(),
                    configs: r.configs.clone().map(|c| (!c.is_empty()).then_some(c)),
                })
                .collect(),
        }
    }

    /// Cells in [`output_columns`] order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records.iter().map(move |r| {
            let mut cells: Vec<&str> = r.attributes.iter().map(|a| a.as_deref().unwrap_or("")).collect();
            cells.extend(r.configs.iter().map(String::as_str));
            cells.push(&self.coupling_factor);
            cells
        })
    }
}

fn shares_factor(records: &[AggregatedRecord], factor: CouplingFactor) -> bool {
    let Some(first) = records.first() else {
        return false;
    };
    records.len() > 1
        && !first.config(factor).is_empty()
        && records.iter().all(|r| r.config(factor) == first.config(factor))
}

/// Header: descriptive columns, the three `*_Config` columns, then
/// [`COUPLING_FACTOR_COLUMN`].
pub fn output_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .cloned()
        .chain(CouplingFactor::ALL.iter().map(|f| f.config_column().to_string()))
        .chain(std::iter::once(COUPLING_FACTOR_COLUMN.to_string()))
        .collect()
}
