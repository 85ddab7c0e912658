//! Readers for CSV sheets and workbook directories.
//!
//! A workbook is a directory holding one `<Sheet Name>.csv` per sheet. Blank
//! cells (and the literal `nan`/`NaN` exported by spreadsheet tools) are read
//! as missing values.

use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::errors::{CellPosition, FrontendError, ValidationContext};
use crate::tables::{
    columns, sheets, ComponentRecord, ComponentTable, DefectWorkbook, HemdRow, OdcRow, StageRow,
    StageSheet, StageWorkbook, UcaCorrelationRow,
};
use crate::taxonomy::{CouplingFactor, DefectCategory, Stage, UcaType};

/// Path of `sheet` inside the workbook directory `dir`.
pub fn sheet_path(dir: &Path, sheet: &str) -> PathBuf {
    dir.join(format!("{}.csv", sheet))
}

/// An in-memory CSV sheet with its header row.
struct Sheet {
    name: String,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Sheet {
    fn parse(name: &str, text: &str, path: Option<&Path>) -> Result<Self, FrontendError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let wrap = |source: csv::Error| match path {
            Some(p) => FrontendError::Csv {
                path: p.to_path_buf(),
                source,
            },
            None => FrontendError::ParseError(format!("sheet '{}': {}", name, source)),
        };

        let headers = reader
            .headers()
            .map_err(wrap)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;

        Ok(Self {
            name: name.to_string(),
            headers,
            records,
        })
    }

    fn read(dir: &Path, name: &str) -> Result<Self, FrontendError> {
        let path = sheet_path(dir, name);
        let text = read_file(&path)?;
        Self::parse(name, &text, Some(&path))
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, FrontendError> {
        self.column(name).ok_or_else(|| {
            FrontendError::validation(
                format!("missing required column '{}'", name),
                Some(ValidationContext::Sheet {
                    sheet: self.name.clone(),
                }),
                None,
            )
        })
    }

    fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.records[row]
            .get(col)
            .map(str::trim)
            .filter(|cell| !is_missing(cell))
    }

    fn number(&self, row: usize, col: usize) -> Result<Option<f64>, FrontendError> {
        match self.text(row, col) {
            None => Ok(None),
            Some(cell) => cell.parse::<f64>().map(Some).map_err(|_| {
                FrontendError::validation(
                    format!("expected a number, found '{}'", cell),
                    Some(ValidationContext::Column {
                        sheet: self.name.clone(),
                        column: self.headers[col].clone(),
                    }),
                    Some(CellPosition {
                        row: row + 1,
                        column: col + 1,
                    }),
                )
            }),
        }
    }

    fn required_number(&self, row: usize, col: usize) -> Result<f64, FrontendError> {
        self.number(row, col)?.ok_or_else(|| {
            FrontendError::validation(
                "missing required value",
                Some(ValidationContext::Column {
                    sheet: self.name.clone(),
                    column: self.headers[col].clone(),
                }),
                Some(CellPosition {
                    row: row + 1,
                    column: col + 1,
                }),
            )
        })
    }

    fn optional_number(&self, row: usize, col: Option<usize>) -> Result<Option<f64>, FrontendError> {
        match col {
            Some(c) => self.number(row, c),
            None => Ok(None),
        }
    }

    fn row_count(&self) -> usize {
        self.records.len()
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan")
}

fn read_file(path: &Path) -> Result<String, FrontendError> {
    fs::read_to_string(path).map_err(|source| FrontendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse one stage sheet. Columns that are absent simply leave the
/// corresponding cells empty.
pub fn parse_stage_sheet(stage: Stage, text: &str) -> Result<StageSheet, FrontendError> {
    let sheet = Sheet::parse(stage.label(), text, None)?;
    stage_sheet_from(stage, &sheet)
}

fn stage_sheet_from(stage: Stage, sheet: &Sheet) -> Result<StageSheet, FrontendError> {
    let task_col = sheet.column(columns::TASK_NUMBER);
    let mode_col = sheet.column(columns::HUMAN_ERROR_MODE);
    let mean_col = sheet.column(columns::HEP_MEAN);
    let std_col = sheet.column(columns::HEP_STD);
    let review_col = sheet.column(columns::REVIEW_NUMBER);
    let trigger_col = sheet.column(columns::TRIGGER_COVERAGE);

    let mut rows = Vec::with_capacity(sheet.row_count());
    for r in 0..sheet.row_count() {
        rows.push(StageRow {
            task_number: sheet.optional_number(r, task_col)?,
            human_error_mode: mode_col.and_then(|c| sheet.text(r, c)).map(String::from),
            hep_mean: sheet.optional_number(r, mean_col)?,
            hep_std: sheet.optional_number(r, std_col)?,
            review_number: sheet.optional_number(r, review_col)?,
            trigger_coverage: sheet.optional_number(r, trigger_col)?,
        });
    }
    Ok(StageSheet::new(stage, rows))
}

/// Read every stage sheet of a task-list or approximation workbook.
pub fn read_stage_workbook(dir: &Path) -> Result<StageWorkbook, FrontendError> {
    let mut sheets = Vec::with_capacity(Stage::COUNT);
    for stage in Stage::ALL {
        let sheet = Sheet::read(dir, stage.label())?;
        sheets.push(stage_sheet_from(stage, &sheet)?);
    }
    Ok(StageWorkbook::new(sheets))
}

/// Parse the `HEMD` sheet (`key, mu, sigma`).
pub fn parse_hemd_sheet(text: &str) -> Result<Vec<HemdRow>, FrontendError> {
    let sheet = Sheet::parse(sheets::HEMD, text, None)?;
    hemd_from(&sheet)
}

fn hemd_from(sheet: &Sheet) -> Result<Vec<HemdRow>, FrontendError> {
    let key_col = sheet.require_column(columns::HEMD_KEY)?;
    let mu_col = sheet.require_column(columns::HEMD_MU)?;
    let sigma_col = sheet.require_column(columns::HEMD_SIGMA)?;

    let mut rows = Vec::with_capacity(sheet.row_count());
    for r in 0..sheet.row_count() {
        let Some(key) = sheet.text(r, key_col) else {
            continue;
        };
        rows.push(HemdRow {
            key: key.to_string(),
            mu: sheet.required_number(r, mu_col)?,
            sigma: sheet.required_number(r, sigma_col)?,
        });
    }
    Ok(rows)
}

/// Parse the `ODC` sheet: a `Stages` column, a `Total` column and one count
/// column per defect category.
pub fn parse_odc_sheet(text: &str) -> Result<Vec<OdcRow>, FrontendError> {
    let sheet = Sheet::parse(sheets::ODC, text, None)?;
    odc_from(&sheet)
}

fn odc_from(sheet: &Sheet) -> Result<Vec<OdcRow>, FrontendError> {
    let stage_col = sheet.require_column(columns::ODC_STAGES)?;
    let total_col = sheet.require_column(columns::ODC_TOTAL)?;
    let mut defect_cols = [0usize; DefectCategory::COUNT];
    for defect in DefectCategory::ALL {
        defect_cols[defect.index()] = sheet.require_column(defect.label())?;
    }

    let mut rows = Vec::with_capacity(sheet.row_count());
    for r in 0..sheet.row_count() {
        let Some(label) = sheet.text(r, stage_col) else {
            continue;
        };
        let stage: Stage = label.parse()?;
        let mut counts = [0.0; DefectCategory::COUNT];
        for (slot, &col) in counts.iter_mut().zip(defect_cols.iter()) {
            *slot = sheet.required_number(r, col)?;
        }
        rows.push(OdcRow {
            stage,
            total: sheet.required_number(r, total_col)?,
            counts,
        });
    }
    Ok(rows)
}

/// Parse the `UCA Correlation` sheet. The first column holds the defect
/// category; `UCA-<X> Mean` / `UCA-<X> Sigma` columns hold the coefficients.
pub fn parse_uca_correlation_sheet(text: &str) -> Result<Vec<UcaCorrelationRow>, FrontendError> {
    let sheet = Sheet::parse(sheets::UCA_CORRELATION, text, None)?;
    uca_correlation_from(&sheet)
}

fn uca_correlation_from(sheet: &Sheet) -> Result<Vec<UcaCorrelationRow>, FrontendError> {
    let mut mean_cols = [0usize; UcaType::COUNT];
    let mut sigma_cols = [0usize; UcaType::COUNT];
    for uca in UcaType::ALL {
        mean_cols[uca.index()] = sheet.require_column(&uca.mean_column())?;
        sigma_cols[uca.index()] = sheet.require_column(&uca.sigma_column())?;
    }

    let mut rows = Vec::with_capacity(sheet.row_count());
    for r in 0..sheet.row_count() {
        let Some(label) = sheet.text(r, 0) else {
            continue;
        };
        let defect: DefectCategory = label.parse()?;
        let mut means = [0.0; UcaType::COUNT];
        let mut sigmas = [0.0; UcaType::COUNT];
        for uca in UcaType::ALL {
            means[uca.index()] = sheet.required_number(r, mean_cols[uca.index()])?;
            sigmas[uca.index()] = sheet.required_number(r, sigma_cols[uca.index()])?;
        }
        rows.push(UcaCorrelationRow {
            defect,
            means,
            sigmas,
        });
    }
    Ok(rows)
}

/// Read the defect workbook. The `HEMD` sheet is optional (it is only needed
/// by the precise stage calculation); `ODC` and `UCA Correlation` are required.
pub fn read_defect_workbook(dir: &Path) -> Result<DefectWorkbook, FrontendError> {
    let hemd = if sheet_path(dir, sheets::HEMD).is_file() {
        hemd_from(&Sheet::read(dir, sheets::HEMD)?)?
    } else {
        Vec::new()
    };
    let odc = odc_from(&Sheet::read(dir, sheets::ODC)?)?;
    let uca_correlation = uca_correlation_from(&Sheet::read(dir, sheets::UCA_CORRELATION)?)?;
    Ok(DefectWorkbook {
        hemd,
        odc,
        uca_correlation,
    })
}

/// Parse a component table from CSV text.
pub fn parse_component_table(text: &str) -> Result<ComponentTable, FrontendError> {
    let sheet = Sheet::parse("components", text, None)?;
    component_table_from(&sheet)
}

/// Read a component table from a CSV file.
pub fn read_component_table(path: &Path) -> Result<ComponentTable, FrontendError> {
    let text = read_file(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "components".to_string());
    let sheet = Sheet::parse(&name, &text, Some(path))?;
    component_table_from(&sheet)
}

fn component_table_from(sheet: &Sheet) -> Result<ComponentTable, FrontendError> {
    let mut config_cols = [0usize; CouplingFactor::COUNT];
    for factor in CouplingFactor::ALL {
        config_cols[factor.index()] = sheet.require_column(factor.config_column())?;
    }
    let passthrough: Vec<usize> = (0..sheet.headers.len())
        .filter(|c| !config_cols.contains(c))
        .collect();

    let columns = passthrough
        .iter()
        .map(|&c| sheet.headers[c].clone())
        .collect();
    let mut components = Vec::with_capacity(sheet.row_count());
    for r in 0..sheet.row_count() {
        let attributes = passthrough
            .iter()
            .map(|&c| sheet.text(r, c).map(String::from))
            .collect();
        let mut configs: [Option<String>; CouplingFactor::COUNT] = Default::default();
        for factor in CouplingFactor::ALL {
            configs[factor.index()] = sheet
                .text(r, config_cols[factor.index()])
                .map(String::from);
        }
        components.push(ComponentRecord {
            attributes,
            configs,
        });
    }

    Ok(ComponentTable {
        columns,
        components,
    })
}
