//! Coupling-factor matching over row sets.
//!
//! A group is identified by the sorted indices of its component rows, so two
//! groups with the same members are equal regardless of how they were found.
//! Deduplication hashes that canonical form instead of comparing tables
//! pairwise.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use bahamas_frontend::CouplingFactor;

use super::expand::ExpandedTable;

/// Candidate common cause group: ascending component row indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentGroup(SmallVec<[usize; 8]>);

impl ComponentGroup {
    /// Build from arbitrary row indices; duplicates are removed.
    pub fn new(rows: impl IntoIterator<Item = usize>) -> Self {
        let mut rows: SmallVec<[usize; 8]> = rows.into_iter().collect();
        rows.sort_unstable();
        rows.dedup();
        Self(rows)
    }

    /// Every row of a table with `len` rows.
    pub fn all(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn rows(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.0.binary_search(&row).is_ok()
    }
}

/// Group the rows of `within` by shared `factor` values.
///
/// Distinct values are visited column by column (`<Family>_1` for every row,
/// then `<Family>_2`, ...) in first-seen order; each value yields the rows of
/// `within` that hold it at any position. Singletons are kept.
pub fn match_on(table: &ExpandedTable, within: &ComponentGroup, factor: CouplingFactor) -> Vec<ComponentGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: FxHashMap<&str, SmallVec<[usize; 8]>> = FxHashMap::default();
    for position in 0..table.width(factor) {
        for &row in within.rows() {
            let Some(value) = table.cell(factor, row, position) else {
                continue;
            };
            let rows = members.entry(value).or_insert_with(|| {
                order.push(value);
                SmallVec::new()
            });
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
    }
    let groups = order
        .into_iter()
        .filter_map(|value| members.remove(value))
        .map(ComponentGroup::new)
        .filter(|g| !g.is_empty())
        .collect();
    dedup(groups)
}

/// [`match_on`] applied inside every group of `groups`, then deduplicated.
pub fn match_groups_on(
    table: &ExpandedTable,
    groups: &[ComponentGroup],
    factor: CouplingFactor,
) -> Vec<ComponentGroup> {
    let refined = groups
        .iter()
        .flat_map(|group| match_on(table, group, factor))
        .collect();
    dedup(refined)
}

/// Drop repeated groups, keeping the first occurrence of each.
pub fn dedup(groups: Vec<ComponentGroup>) -> Vec<ComponentGroup> {
    let mut seen: FxHashSet<ComponentGroup> = FxHashSet::default();
    groups
        .into_iter()
        .filter(|g| seen.insert(g.clone()))
        .collect()
}

/// Concatenate several group lists in order and deduplicate.
pub fn merge<'a>(lists: impl IntoIterator<Item = &'a [ComponentGroup]>) -> Vec<ComponentGroup> {
    dedup(lists.into_iter().flatten().cloned().collect())
}

/// Discard groups with fewer than two members.
pub fn drop_singletons(groups: Vec<ComponentGroup>) -> Vec<ComponentGroup> {
    groups.into_iter().filter(|g| g.len() > 1).collect()
}
