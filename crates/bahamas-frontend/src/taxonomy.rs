//! Fixed taxonomies of the reliability model.
//!
//! The network topology is fixed: six lifecycle stages feed eight orthogonal
//! defect classification (ODC) categories, which feed four unsafe control
//! action (UCA) categories. Every enum here has a stable ordering (`ALL`) and
//! a dense `index()` so engine tables can be plain arrays.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::FrontendError;

macro_rules! fixed_taxonomy {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// All members in their fixed order.
            pub const ALL: [$name; [$($label),+].len()] = [$($name::$variant),+];

            /// Number of members.
            pub const COUNT: usize = Self::ALL.len();

            /// Position in [`Self::ALL`].
            pub fn index(self) -> usize {
                self as usize
            }

            /// Label as it appears in input tables and reports.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = FrontendError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == trimmed)
                    .ok_or_else(|| {
                        FrontendError::ParseError(format!(
                            "unknown {} '{}'",
                            $kind, trimmed
                        ))
                    })
            }
        }
    };
}

fixed_taxonomy! {
    /// Software development lifecycle stage.
    Stage, "lifecycle stage" {
        Concept => "Concept",
        Requirement => "Requirement",
        Design => "Design",
        Implementation => "Implementation",
        Testing => "Testing",
        InstallAndMaintenance => "Install and Maintenance",
    }
}

fixed_taxonomy! {
    /// Orthogonal defect classification category.
    DefectCategory, "defect category" {
        Algorithm => "Algorithm",
        Assignment => "Assignment",
        Checking => "Checking",
        Documentation => "Documentation",
        Function => "Function",
        Interface => "Interface",
        Relationship => "Relationship",
        Timing => "Timing",
    }
}

fixed_taxonomy! {
    /// Unsafe control action category.
    UcaType, "UCA type" {
        A => "UCA-A",
        B => "UCA-B",
        C => "UCA-C",
        D => "UCA-D",
    }
}

fixed_taxonomy! {
    /// Human error mode used by the precise stage calculation.
    HumanErrorMode, "human error mode" {
        D1 => "D1",
        D2 => "D2",
        C => "C",
        OC => "OC",
        D1C => "D1C",
        D1OC => "D1OC",
        D2C => "D2C",
        D2OC => "D2OC",
        O => "O",
        D1O => "D1O",
        D2O => "D2O",
    }
}

fixed_taxonomy! {
    /// Coupling factor family used to form common cause component groups.
    CouplingFactor, "coupling factor" {
        Function => "Function",
        Input => "Input",
        Design => "Design",
    }
}

impl UcaType {
    /// Column holding the correlation mean in the `UCA Correlation` sheet.
    pub fn mean_column(self) -> String {
        format!("{} Mean", self.label())
    }

    /// Column holding the correlation sigma in the `UCA Correlation` sheet.
    pub fn sigma_column(self) -> String {
        format!("{} Sigma", self.label())
    }
}

impl HumanErrorMode {
    pub fn description(self) -> &'static str {
        match self {
            HumanErrorMode::D1 => "Diagnosis error (Diagnosis-1)",
            HumanErrorMode::D2 => "Simple diagnosis error (Diagnosis-2)",
            HumanErrorMode::C => "Commission error",
            HumanErrorMode::O => "Omission error",
            HumanErrorMode::OC => "Omission and Commission errors",
            HumanErrorMode::D1C => "Diagnosis-1 and Commission",
            HumanErrorMode::D1O => "Diagnosis-1 and Omission",
            HumanErrorMode::D1OC => "Diagnosis-1, Omission and Commission",
            HumanErrorMode::D2C => "Diagnosis-2 and Commission",
            HumanErrorMode::D2O => "Diagnosis-2 and Omission",
            HumanErrorMode::D2OC => "Diagnosis-2, Omission and Commission",
        }
    }
}

impl CouplingFactor {
    /// Multi-valued input column, e.g. `Function_Config`.
    pub fn config_column(self) -> &'static str {
        match self {
            CouplingFactor::Function => "Function_Config",
            CouplingFactor::Input => "Input_Config",
            CouplingFactor::Design => "Design_Config",
        }
    }

    /// Prefix of the per-position expanded columns, e.g. `Function_`.
    pub fn column_prefix(self) -> &'static str {
        match self {
            CouplingFactor::Function => "Function_",
            CouplingFactor::Input => "Input_",
            CouplingFactor::Design => "Design_",
        }
    }

    /// Name of the expanded column at 1-based `position`, e.g. `Function_2`.
    pub fn expanded_column(self, position: usize) -> String {
        format!("{}{}", self.column_prefix(), position)
    }
}
