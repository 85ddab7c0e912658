use bahamas_core::engine::dcp::defect_conditional_probability;
use bahamas_core::engine::indexed::ByStage;
use bahamas_core::metrics::{TOTAL_PLOT_TITLE, TOTAL_SUMMARY_LABEL};
use bahamas_core::{BbnModel, BbnOptions, BbnResult, ExecError, PlotKind, SampleVector, StageObservation};
use bahamas_frontend::parser::{parse_stage_sheet, read_defect_workbook, read_stage_workbook};
use bahamas_frontend::{DefectCategory, Stage, StageWorkbook, UcaType};
use bahamas_tests::{assert_close, assert_rel_close, fixture};

fn model() -> BbnModel {
    let defect = read_defect_workbook(&fixture("defect")).expect("defect workbook");
    BbnModel::from_defect_workbook(&defect).expect("model")
}

fn tasks() -> StageWorkbook {
    read_stage_workbook(&fixture("tasks")).expect("task workbook")
}

fn options(num_samples: usize, seed: u64) -> BbnOptions {
    BbnOptions { num_samples, seed }
}

fn precise(num_samples: usize, seed: u64) -> BbnResult {
    model()
        .run_precise(Some(&tasks()), options(num_samples, seed))
        .expect("precise run")
}

#[test]
fn precise_run_is_reproducible_for_a_seed() {
    let a = precise(400, 42);
    let b = precise(400, 42);
    assert_eq!(a, b);

    let c = precise(400, 43);
    assert_ne!(a.total, c.total);
}

#[test]
fn precise_run_shapes_and_ranges() {
    let result = precise(1000, 42);
    for stage in Stage::ALL {
        let sample = &result.stage[stage];
        assert_eq!(sample.samples.len(), 1000, "{stage}");
        let fit = sample.fit.expect("every fixture stage lists tasks");
        assert!(fit.sigma > 0.0, "{stage}: sigma {}", fit.sigma);
        assert_close(fit.mean, sample.samples.mean(), 1e-15, stage.label());
    }
    for defect in DefectCategory::ALL {
        let v = &result.defect[defect];
        assert_eq!(v.len(), 1000);
        assert!(v.iter().all(|&p| (0.0..=1.0).contains(&p)), "{defect} outside [0, 1]");
    }
    assert!(result.total.iter().all(|&p| p.is_finite() && p >= 0.0));
}

#[test]
fn total_is_the_sum_of_uca_series() {
    let result = precise(500, 11);
    for i in 0..result.total.len() {
        let sum: f64 = UcaType::ALL.iter().map(|&u| result.uca[u][i]).sum();
        assert_rel_close(result.total[i], sum, 1e-12, "total vs UCA sum");
    }
    let total = result.total_failure_probability();
    let mean_sum: f64 = UcaType::ALL.iter().map(|&u| result.uca(u).mean).sum();
    assert_rel_close(total.mean, mean_sum, 1e-12, "mean additivity");
}

#[test]
fn precise_dcp_comes_from_task_sheets() {
    let result = precise(50, 42);
    // Concept reviews average 2.5 at a constant trigger coverage.
    let expected = defect_conditional_probability(2.5, 0.887465625);
    assert_rel_close(result.dcp[Stage::Concept], expected, 1e-12, "Concept DCP");
    assert_rel_close(result.dcp[Stage::Concept], 3.497242685425109e-05, 1e-12, "Concept DCP gold");
}

#[test]
fn summary_table_lists_total_then_ucas() {
    let result = precise(200, 42);
    let table = result.summary_table();
    let labels: Vec<&str> = table.labels().collect();
    assert_eq!(labels, vec![TOTAL_SUMMARY_LABEL, "UCA-A", "UCA-B", "UCA-C", "UCA-D"]);

    let entry = table.get("UCA-C").expect("UCA-C entry");
    let uca_c = result.uca(UcaType::C);
    assert_eq!(entry.mean, uca_c.mean);
    assert_eq!(entry.std, uca_c.std);
}

#[test]
fn uca_lookup_by_label() {
    let result = precise(100, 42);
    let b = result.uca_by_label("UCA-B").expect("UCA-B");
    assert_eq!(b.mean, result.uca(UcaType::B).mean);

    let err = result.uca_by_label("UCA-Z").expect_err("unknown label");
    assert!(matches!(err, ExecError::InvalidArgument(_)), "{err:?}");
}

#[test]
fn plot_selects_series() {
    let result = precise(300, 42);
    let all = result.plot(PlotKind::All, 20);
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].series.len(), Stage::COUNT);
    assert_eq!(all[1].series.len(), DefectCategory::COUNT);
    assert_eq!(all[2].series.len(), UcaType::COUNT);
    for figure in &all {
        for hist in &figure.series {
            assert_eq!(hist.counts.len(), 20);
            assert_eq!(hist.total(), 300, "{} / {}", figure.title, hist.name);
        }
    }

    let total = result.plot("total".parse().expect("plot kind"), 10);
    assert_eq!(total.len(), 1);
    assert_eq!(total[0].title, TOTAL_PLOT_TITLE);

    assert!(matches!("violin".parse::<PlotKind>(), Err(ExecError::InvalidArgument(_))));
}

#[test]
fn approx_run_samples_stage_summaries() {
    let approx = read_stage_workbook(&fixture("approx")).expect("approx workbook");
    let result = model().run_approx(&approx, options(2000, 7)).expect("approx run");

    let concept = &result.stage[Stage::Concept];
    assert!(concept.fit.is_none());
    assert_close(concept.samples.mean(), 0.0153, 5e-4, "Concept HEP mean");
    assert_close(result.stage[Stage::Design].samples.mean(), 0.0221, 6e-4, "Design HEP mean");
    assert!(concept.samples.iter().all(|&x| (0.0..=1.0).contains(&x)));
}

#[test]
fn precise_run_without_tasks_is_missing_input() {
    let err = model().run_precise(None, BbnOptions::default()).expect_err("no tasks");
    assert!(matches!(err, ExecError::MissingInput(_)), "{err:?}");
}

#[test]
fn zero_samples_is_rejected() {
    let err = model()
        .run_precise(Some(&tasks()), options(0, 42))
        .expect_err("zero samples");
    assert!(matches!(err, ExecError::InvalidArgument(_)), "{err:?}");
}

#[test]
fn unknown_human_error_mode_is_rejected() {
    let mut workbook = tasks();
    let sheet = parse_stage_sheet(
        Stage::Concept,
        "Task Number,Human Error Mode,Review Number,Trigger Coverage\n1,Q7,2.0,0.9\n",
    )
    .expect("sheet");
    workbook.insert(sheet);
    let err = model()
        .run_precise(Some(&workbook), options(10, 42))
        .expect_err("unknown mode");
    assert!(matches!(err, ExecError::InvalidArgument(_)), "{err:?}");
}

#[test]
fn stage_without_tasks_contributes_nothing() {
    let mut workbook = tasks();
    let sheet = parse_stage_sheet(
        Stage::Testing,
        "Task Number,Human Error Mode,Review Number,Trigger Coverage\n,,2.0,0.9\n",
    )
    .expect("sheet");
    workbook.insert(sheet);
    let result = model()
        .run_precise(Some(&workbook), options(100, 42))
        .expect("run");
    let testing = &result.stage[Stage::Testing];
    assert!(testing.samples.iter().all(|&x| x == 0.0));
    assert!(testing.fit.is_none());
}

fn direct_observations(n: usize, value: f64) -> ByStage<StageObservation> {
    ByStage::from_fn(|_| StageObservation::Samples {
        samples: SampleVector::filled(n, value),
        review: 2.0,
        trigger: 0.9,
    })
}

#[test]
fn direct_run_uses_samples_verbatim() {
    let result = model()
        .run_direct(direct_observations(64, 0.01), options(64, 5))
        .expect("direct run");
    let dcp = defect_conditional_probability(2.0, 0.9);
    for stage in Stage::ALL {
        assert!(result.stage[stage].samples.iter().all(|&x| x == 0.01));
        assert_rel_close(result.dcp[stage], dcp, 1e-15, stage.label());
    }
    // Union bound over the six stage contributions.
    let bound = Stage::COUNT as f64 * 0.01 * dcp;
    for defect in DefectCategory::ALL {
        assert!(result.defect[defect].iter().all(|&p| p <= bound * (1.0 + 1e-12)));
    }
}

#[test]
fn direct_run_rejects_mismatched_sample_counts() {
    let err = model()
        .run_direct(direct_observations(10, 0.01), options(64, 5))
        .expect_err("length mismatch");
    assert!(matches!(err, ExecError::InvalidArgument(_)), "{err:?}");
}

#[test]
fn direct_summary_observations_are_truncated_normals() {
    let observations = ByStage::from_fn(|_| StageObservation::Summary {
        mean: 0.02,
        std: 0.005,
        review: 2.0,
        trigger: 0.9,
    });
    let result = model()
        .run_direct(observations, options(3000, 3))
        .expect("direct run");
    for stage in Stage::ALL {
        assert_close(result.stage[stage].samples.mean(), 0.02, 5e-4, stage.label());
    }
}
