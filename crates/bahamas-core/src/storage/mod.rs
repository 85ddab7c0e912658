//! Output writers.
//!
//! - BBN summary table as CSV (`mean` and `std` rows under one column per series)
//! - CCCG views as CSV, one file per view, each group with its own header and
//!   groups separated by a blank line
//! - any serializable report as pretty JSON (`serde` feature)

use std::fs;
use std::path::{Path, PathBuf};

use bahamas_frontend::config::GenerateOptions;

use crate::cccg::{AggregatedGroup, CccgGenerator, CccgView};
use crate::engine::errors::ExecError;
use crate::metrics::SummaryTable;

/// Write the summary table with series as columns and `mean`/`std` as rows.
pub fn write_bbn_summary(path: &Path, table: &SummaryTable) -> Result<(), ExecError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| ExecError::io(path, e))?;
    let header = std::iter::once(String::new()).chain(table.labels().map(str::to_string));
    writer.write_record(header).map_err(|e| ExecError::io(path, e))?;
    let mean = std::iter::once("mean".to_string()).chain(table.entries.iter().map(|e| e.mean.to_string()));
    writer.write_record(mean).map_err(|e| ExecError::io(path, e))?;
    let std = std::iter::once("std".to_string()).chain(table.entries.iter().map(|e| e.std.to_string()));
    writer.write_record(std).map_err(|e| ExecError::io(path, e))?;
    writer.flush().map_err(|e| ExecError::io(path, e))?;

    #[cfg(feature = "tracing")]
    tracing::info!("Save BBN summary into {}", path.display());
    Ok(())
}

/// Render aggregated groups as concatenated CSV blocks.
pub fn render_cccg_groups(columns: &[String], groups: &[AggregatedGroup]) -> Result<Vec<u8>, ExecError> {
    let internal = |e: csv::Error| ExecError::Internal(format!("CSV encoding failed: {}", e));
    let mut out = Vec::new();
    for group in groups {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns).map_err(internal)?;
        for row in group.rows() {
            writer.write_record(&row).map_err(internal)?;
        }
        let block = writer
            .into_inner()
            .map_err(|e| ExecError::Internal(format!("CSV encoding failed: {}", e.error())))?;
        out.extend_from_slice(&block);
        out.push(b'\n');
    }
    Ok(out)
}

/// Write one view to `path`.
pub fn write_cccg_view(path: &Path, columns: &[String], groups: &[AggregatedGroup]) -> Result<(), ExecError> {
    #[cfg(feature = "tracing")]
    tracing::info!("Save CCCGs into {}", path.display());

    let bytes = render_cccg_groups(columns, groups)?;
    fs::write(path, bytes).map_err(|e| ExecError::io(path, e))
}

/// File name of one view: `<base>_<view>.csv`.
pub fn cccg_view_path(dir: &Path, base: &str, view: CccgView) -> PathBuf {
    dir.join(format!("{}_{}.csv", base, view))
}

/// Write every view requested by `options` into `dir`; returns the paths
/// in request order.
pub fn write_cccg_views(
    generator: &CccgGenerator,
    options: &GenerateOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExecError> {
    let columns = generator.output_columns();
    let mut written = Vec::new();
    for name in options.requested_views() {
        let view: CccgView = name.parse()?;
        let path = cccg_view_path(dir, &options.output_file_base, view);
        write_cccg_view(&path, &columns, &generator.aggregate(view))?;
        written.push(path);
    }
    Ok(written)
}

/// Pretty-printed JSON.
#[cfg(feature = "serde")]
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ExecError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ExecError::Internal(format!("JSON encoding failed: {}", e)))?;
    fs::write(path, text).map_err(|e| ExecError::io(path, e))
}
