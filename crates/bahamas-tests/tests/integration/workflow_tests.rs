use std::fs;
use std::path::Path;

use bahamas_core::workflow::run_bbn;
use bahamas_core::{load_config, ExecError, Workflow, WorkflowOutputs};
use bahamas_frontend::config::{BbnConfig, BbnFiles, CcfConfig, CcfFiles};
use bahamas_frontend::{parse_config, Config};
use bahamas_tests::{assert_rel_close, fixture};

fn outputs(dir: &Path) -> WorkflowOutputs {
    WorkflowOutputs {
        bbn_summary: Some(dir.join("summary.csv")),
        cccg_dir: dir.to_path_buf(),
    }
}

#[test]
fn precise_config_writes_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let workflow = Workflow::from_path(&fixture("precise.toml")).expect("workflow");
    let report = workflow.run(&outputs(dir.path())).expect("run");

    assert!(report.ccf.is_none());
    let bbn = report.bbn.expect("bbn report");
    assert_eq!(bbn.analysis, "precise");
    assert_eq!(bbn.seed, 42);
    assert_eq!(bbn.num_samples, 2000);
    assert_eq!(bbn.result.total.len(), 2000);

    let text = fs::read_to_string(dir.path().join("summary.csv")).expect("summary file");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(",Total Failure Prob.,UCA-A,UCA-B,UCA-C,UCA-D"));
    let mean_row: Vec<&str> = lines.next().expect("mean row").split(',').collect();
    assert_eq!(mean_row[0], "mean");
    let total_mean: f64 = mean_row[1].parse().expect("number");
    assert_eq!(total_mean, bbn.summary.entries[0].mean);
    assert!(lines.next().expect("std row").starts_with("std,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn workflow_matches_direct_model_run() {
    let config = load_config(&fixture("precise.toml")).expect("config");
    let bbn_config = config.bbn.clone().expect("bbn section");
    let report = run_bbn(&bbn_config, None).expect("run_bbn");
    assert!(report.summary_path.is_none());

    let again = Workflow::new(config)
        .expect("workflow")
        .run(&WorkflowOutputs::default())
        .expect("run");
    let total = again.bbn.expect("bbn").result.total_failure_probability().mean;
    assert_rel_close(total, report.result.total_failure_probability().mean, 1e-15, "total mean");
}

#[test]
fn approx_config_runs_approximate_analysis() {
    let workflow = Workflow::from_path(&fixture("approx.toml")).expect("workflow");
    let report = workflow.run(&WorkflowOutputs::default()).expect("run");
    let bbn = report.bbn.expect("bbn report");
    assert_eq!(bbn.analysis, "approx");
    assert_eq!(bbn.seed, 7);
    assert!(bbn.result.stage.values().all(|s| s.fit.is_none()));
}

#[test]
fn ccf_config_writes_every_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let workflow = Workflow::from_path(&fixture("ccf.toml")).expect("workflow");
    let report = workflow.run(&outputs(dir.path())).expect("run");

    assert!(report.bbn.is_none());
    assert!(!dir.path().join("summary.csv").exists());
    let ccf = report.ccf.expect("ccf report");
    let names: Vec<String> = ccf
        .files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    assert_eq!(
        names,
        vec!["plant_final.csv", "plant_single.csv", "plant_double.csv", "plant_triple.csv"]
    );
    assert_eq!(
        ccf.group_counts,
        vec![
            ("final".to_string(), 6),
            ("single".to_string(), 6),
            ("double".to_string(), 4),
            ("triple".to_string(), 1),
        ]
    );

    let final_text = fs::read_to_string(dir.path().join("plant_final.csv")).expect("final view");
    let headers = final_text
        .lines()
        .filter(|l| l.starts_with("Component,"))
        .count();
    assert_eq!(headers, 6);
}

#[test]
fn combined_config_runs_both_analyses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let workflow = Workflow::from_path(&fixture("combined.toml")).expect("workflow");
    let report = workflow.run(&outputs(dir.path())).expect("run");

    let bbn = report.bbn.expect("bbn report");
    assert_eq!(bbn.num_samples, 500);
    assert_eq!(bbn.seed, 42);
    assert_eq!(bbn.analysis, "precise");

    let ccf = report.ccf.expect("ccf report");
    assert_eq!(ccf.files, vec![dir.path().join("cccg_final.csv")]);
    assert!(dir.path().join("cccg_final.csv").exists());
    assert!(dir.path().join("summary.csv").exists());
}

#[test]
fn empty_config_is_rejected() {
    let err = Workflow::new(Config::default()).expect_err("no sections");
    assert!(matches!(err, ExecError::ValidationError(_)), "{err:?}");
}

#[test]
fn approx_without_workbook_is_rejected() {
    let err = parse_config(
        "[BBN.files]\ndefect = \"defect\"\n[BBN.analysis]\ntype = \"approx\"\n",
        &bahamas_tests::fixture_dir(),
    )
    .expect_err("approx needs files.approx");
    let err = ExecError::from(err);
    match err {
        ExecError::ValidationError(msg) => assert!(msg.contains("files.approx"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn whole_family_views_are_rejected() {
    let err = parse_config(
        "[CCF.files]\nstructure = \"components.csv\"\n[CCF.generate]\nfunction_all = true\n",
        &bahamas_tests::fixture_dir(),
    )
    .expect_err("function_all unsupported");
    assert!(err.to_string().contains("generate.function_all"), "{err}");
}

#[test]
fn run_bbn_without_tasks_is_missing_input() {
    let config = BbnConfig {
        files: BbnFiles {
            defect: Some(fixture("defect")),
            task: None,
            approx: None,
        },
        ..BbnConfig::default()
    };
    let err = run_bbn(&config, None).expect_err("no task workbook");
    assert!(matches!(err, ExecError::MissingInput(_)), "{err:?}");
}

#[test]
fn missing_structure_file_is_an_io_error() {
    let config = Config {
        bbn: None,
        ccf: Some(CcfConfig {
            files: CcfFiles {
                structure: Some(fixture("no-such-components.csv")),
            },
            ..CcfConfig::default()
        }),
    };
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Workflow::new(config)
        .expect("valid config")
        .run(&outputs(dir.path()))
        .expect_err("missing file");
    assert!(matches!(err, ExecError::Io { .. }), "{err:?}");
}
