//! Common cause component group (CCCG) generation.
//!
//! Components are grouped when they share values of the three coupling
//! factors (Function, Input, Design):
//!
//! - **single**: groups sharing one value of any one family
//! - **double**: single-family groups refined by a second family, over all
//!   six ordered family pairs
//! - **triple**: double groups refined by the remaining family
//! - **final**: single, double and triple merged
//!
//! Every view is deduplicated by member set. Singletons are discarded from
//! the single, double and triple views. Matching is not commutative on
//! intermediate group membership, which is why every ordering is explored.

pub mod aggregate;
pub mod expand;
pub mod matching;

use std::fmt;
use std::str::FromStr;

use bahamas_frontend::{ComponentTable, CouplingFactor};

use crate::engine::errors::ExecError;

pub use aggregate::{collapse_values, output_columns, AggregatedGroup, AggregatedRecord, COUPLING_FACTOR_COLUMN};
pub use expand::ExpandedTable;
pub use matching::{dedup, drop_singletons, match_groups_on, match_on, merge, ComponentGroup};

/// Named grouping view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CccgView {
    Final,
    Single,
    Double,
    Triple,
}

impl CccgView {
    pub const ALL: [CccgView; 4] = [CccgView::Final, CccgView::Single, CccgView::Double, CccgView::Triple];

    pub fn as_str(self) -> &'static str {
        match self {
            CccgView::Final => "final",
            CccgView::Single => "single",
            CccgView::Double => "double",
            CccgView::Triple => "triple",
        }
    }
}

impl fmt::Display for CccgView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CccgView {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CccgView::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                ExecError::InvalidArgument(format!(
                    "unrecognized CCCG view '{}', expected one of final, single, double, triple",
                    s
                ))
            })
    }
}

/// Groups of every view for one component table.
#[derive(Debug, Clone)]
pub struct CccgGenerator {
    components: ComponentTable,
    expanded: ExpandedTable,
    single: Vec<ComponentGroup>,
    double: Vec<ComponentGroup>,
    triple: Vec<ComponentGroup>,
    final_groups: Vec<ComponentGroup>,
}

impl CccgGenerator {
    /// Run the matching passes over `components`.
    pub fn generate(components: ComponentTable) -> Self {
        use CouplingFactor::{Design, Function, Input};

        #[cfg(feature = "tracing")]
        tracing::info!("Generating CCCGs for {} components", components.len());

        let expanded = ExpandedTable::from_components(&components);
        let all = ComponentGroup::all(expanded.rows());
        let by = |factor| match_on(&expanded, &all, factor);
        let refine = |groups: &[ComponentGroup], factor| match_groups_on(&expanded, groups, factor);

        let function = by(Function);
        let design = by(Design);
        let input = by(Input);
        let single = drop_singletons(merge([&function[..], &design[..], &input[..]]));

        let fi = refine(&function, Input);
        let fd = refine(&function, Design);
        let i_f = refine(&input, Function);
        let id = refine(&input, Design);
        let di = refine(&design, Input);
        let df = refine(&design, Function);
        let double = drop_singletons(merge([&fd[..], &fi[..], &di[..], &df[..], &id[..], &i_f[..]]));

        let fid = refine(&fi, Design);
        let fdi = refine(&fd, Input);
        let idf = refine(&id, Function);
        let ifd = refine(&i_f, Design);
        let dif = refine(&di, Function);
        let dfi = refine(&df, Input);
        let triple = drop_singletons(merge([&fid[..], &fdi[..], &idf[..], &ifd[..], &dif[..], &dfi[..]]));

        let final_groups = merge([&single[..], &double[..], &triple[..]]);

        #[cfg(feature = "tracing")]
        tracing::info!(
            "CCCGs: {} single, {} double, {} triple, {} final",
            single.len(),
            double.len(),
            triple.len(),
            final_groups.len()
        );

        Self {
            components,
            expanded,
            single,
            double,
            triple,
            final_groups,
        }
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Member sets of a view.
    pub fn groups(&self, view: CccgView) -> &[ComponentGroup] {
        match view {
            CccgView::Final => &self.final_groups,
            CccgView::Single => &self.single,
            CccgView::Double => &self.double,
            CccgView::Triple => &self.triple,
        }
    }

    /// Aggregated groups of a view.
    pub fn aggregate(&self, view: CccgView) -> Vec<AggregatedGroup> {
        self.groups(view)
            .iter()
            .map(|g| AggregatedGroup::build(&self.components, &self.expanded, g))
            .collect()
    }

    /// [`Self::aggregate`] by view name (`final`, `single`, `double`, `triple`).
    pub fn get(&self, name: &str) -> Result<Vec<AggregatedGroup>, ExecError> {
        Ok(self.aggregate(name.parse()?))
    }

    /// Header of aggregated output.
    pub fn output_columns(&self) -> Vec<String> {
        output_columns(&self.components.columns)
    }
}
