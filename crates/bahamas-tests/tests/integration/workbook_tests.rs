use bahamas_core::engine::dcp::stage_dcp_table;
use bahamas_core::engine::distribution::DistributionKind;
use bahamas_core::engine::hemd::HumanErrorModeDistributions;
use bahamas_core::engine::odc::OdcConditionalModel;
use bahamas_core::ExecError;
use bahamas_frontend::parser::{read_component_table, read_defect_workbook, read_stage_workbook};
use bahamas_frontend::{DefectCategory, FrontendError, HumanErrorMode, Stage};
use bahamas_tests::{assert_close, assert_rel_close, fixture};

const GOLD_DCP: [f64; 6] = [
    3.497242685425109e-05,
    0.0002529112181892472,
    3.9544415406499936e-05,
    5.478224783437511e-05,
    3.7439121863896394e-05,
    5.478224783437511e-05,
];

#[test]
fn task_workbook_dcp_matches_reference() {
    let tasks = read_stage_workbook(&fixture("tasks")).expect("tasks");
    let dcp = stage_dcp_table(&tasks).expect("dcp");
    for stage in Stage::ALL {
        assert_rel_close(dcp[stage], GOLD_DCP[stage.index()], 1e-12, stage.label());
    }
}

#[test]
fn approx_workbook_shares_review_data() {
    let approx = read_stage_workbook(&fixture("approx")).expect("approx");
    let dcp = stage_dcp_table(&approx).expect("dcp");
    for stage in Stage::ALL {
        assert_rel_close(dcp[stage], GOLD_DCP[stage.index()], 1e-12, stage.label());
    }
    let concept = approx.sheet(Stage::Concept).expect("concept sheet");
    assert_eq!(concept.first_hep_summary(), Some((0.0153, 0.0041)));
}

#[test]
fn task_rows_carry_human_error_modes() {
    let tasks = read_stage_workbook(&fixture("tasks")).expect("tasks");
    let design = tasks.sheet(Stage::Design).expect("design sheet");
    let modes: Vec<&str> = design.human_error_tasks().map(|(_, m)| m).collect();
    assert_eq!(modes, vec!["D1C", "D2C", "O", "C", "D2"]);
    // Rows below the task list still contribute review data.
    assert_eq!(design.review_trigger_pairs().count(), 13);
}

#[test]
fn defect_workbook_builds_every_table() {
    let defect = read_defect_workbook(&fixture("defect")).expect("defect");
    assert_eq!(defect.odc.len(), Stage::COUNT);
    assert_eq!(defect.uca_correlation.len(), DefectCategory::COUNT);

    let hemd = HumanErrorModeDistributions::from_rows(&defect.hemd, DistributionKind::LogNorm).expect("hemd");
    assert_eq!(hemd.len(), HumanErrorMode::ALL.len());
    let d1 = hemd.get(HumanErrorMode::D1).expect("D1");
    assert_close(d1.mean(), (-5.2983f64 + 0.5 * 0.8326 * 0.8326).exp(), 1e-15, "D1 lognormal mean");
}

#[test]
fn odc_posterior_means_follow_counts() {
    let defect = read_defect_workbook(&fixture("defect")).expect("defect");
    let odc = OdcConditionalModel::from_rows(&defect.odc, DistributionKind::Beta).expect("odc");
    let cases = [
        (Stage::Concept, DefectCategory::Documentation, 1000.0, 1000.0),
        (Stage::Concept, DefectCategory::Algorithm, 0.0, 1000.0),
        (Stage::Requirement, DefectCategory::Assignment, 26.0, 375.0),
        (Stage::Design, DefectCategory::Checking, 26.0, 375.0),
        (Stage::Design, DefectCategory::Timing, 13.0, 375.0),
        (Stage::Implementation, DefectCategory::Function, 372.0, 2292.0),
        (Stage::Testing, DefectCategory::Interface, 361.0, 2464.0),
        (Stage::InstallAndMaintenance, DefectCategory::Relationship, 91.0, 2464.0),
    ];
    for (stage, defect, count, total) in cases {
        let mean = odc.distribution(stage, defect).mean();
        assert_close(mean, (count + 0.5) / (total + 1.0), 1e-15, &format!("{stage}/{defect}"));
    }
}

#[test]
fn component_table_separates_coupling_factor_columns() {
    let table = read_component_table(&fixture("components.csv")).expect("components");
    assert_eq!(table.columns, vec!["Component".to_string(), "Division".to_string()]);
    assert_eq!(table.len(), 5);
    let first = &table.components[0];
    assert_eq!(
        first.config_values(bahamas_frontend::CouplingFactor::Function),
        vec!["Reactor Trip", "Alarm"]
    );
}

#[test]
fn missing_workbook_is_an_io_error() {
    let err = read_stage_workbook(&fixture("no-such-dir")).expect_err("must fail");
    assert!(matches!(err, FrontendError::Io { .. }));
    assert!(matches!(ExecError::from(err), ExecError::Io { .. }));
}
