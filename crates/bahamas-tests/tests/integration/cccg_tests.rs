use std::fs;

use bahamas_core::storage::{cccg_view_path, write_cccg_view};
use bahamas_core::{CccgGenerator, CccgView, ExecError};
use bahamas_frontend::parser::{parse_component_table, read_component_table};
use bahamas_frontend::CouplingFactor;
use bahamas_tests::fixture;

fn generator() -> CccgGenerator {
    CccgGenerator::generate(read_component_table(&fixture("components.csv")).expect("components"))
}

fn members(generator: &CccgGenerator, view: CccgView) -> Vec<Vec<usize>> {
    generator.groups(view).iter().map(|g| g.rows().to_vec()).collect()
}

#[test]
fn single_view_groups_by_each_family() {
    let g = generator();
    assert_eq!(
        members(&g, CccgView::Single),
        vec![
            vec![0, 1, 2],
            vec![3, 4],
            vec![0, 1],
            vec![0, 1, 4],
            vec![2, 3],
            vec![0, 1, 2, 3],
        ]
    );
}

#[test]
fn double_and_triple_views_refine_matches() {
    let g = generator();
    assert_eq!(
        members(&g, CccgView::Double),
        vec![vec![0, 1], vec![0, 1, 2], vec![3, 4], vec![2, 3]]
    );
    assert_eq!(members(&g, CccgView::Triple), vec![vec![0, 1]]);
}

#[test]
fn final_view_merges_without_duplicates() {
    let g = generator();
    let final_groups = members(&g, CccgView::Final);
    assert_eq!(final_groups, members(&g, CccgView::Single));
    for view in CccgView::ALL {
        for group in g.groups(view) {
            assert!(group.len() > 1, "{view} keeps a singleton");
        }
    }
}

#[test]
fn aggregated_groups_carry_shared_factor_tags() {
    let g = generator();
    let tags: Vec<String> = g
        .aggregate(CccgView::Final)
        .iter()
        .map(|a| a.coupling_factor_label().to_string())
        .collect();
    assert_eq!(
        tags,
        vec!["", "Function", "Function;Input;Design", "Design", "Design", ""]
    );

    let triple = g.get("triple").expect("triple view");
    assert_eq!(triple.len(), 1);
    let group = &triple[0];
    assert_eq!(
        group.coupling_factors,
        vec![CouplingFactor::Function, CouplingFactor::Input, CouplingFactor::Design]
    );
    let first = &group.records[0];
    assert_eq!(first.attributes, vec![Some("RPS-A".to_string()), Some("A".to_string())]);
    assert_eq!(first.config(CouplingFactor::Function), "Alarm;Reactor Trip");
    assert_eq!(first.config(CouplingFactor::Input), "Pressure;Temperature");
    assert_eq!(first.config(CouplingFactor::Design), "FPGA-1");
}

#[test]
fn unknown_view_name_is_rejected() {
    let err = generator().get("bogus").expect_err("unknown view");
    assert!(matches!(err, ExecError::InvalidArgument(_)), "{err:?}");
}

#[test]
fn view_file_has_one_block_per_group() {
    let g = generator();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = cccg_view_path(dir.path(), "plant", CccgView::Triple);
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("plant_triple.csv"));

    write_cccg_view(&path, &g.output_columns(), &g.aggregate(CccgView::Triple)).expect("write");
    let text = fs::read_to_string(&path).expect("read back");
    assert_eq!(
        text,
        "Component,Division,Function_Config,Input_Config,Design_Config,Coupling_Factor\n\
         RPS-A,A,Alarm;Reactor Trip,Pressure;Temperature,FPGA-1,Function;Input;Design\n\
         RPS-B,B,Alarm;Reactor Trip,Pressure;Temperature,FPGA-1,Function;Input;Design\n\
         \n"
    );
}

#[test]
fn aggregated_group_regenerates_itself() {
    let g = generator();
    let columns = g.components().columns.clone();
    let triple = g.aggregate(CccgView::Triple);
    let again = CccgGenerator::generate(triple[0].to_component_table(&columns));
    let regrouped = again.aggregate(CccgView::Triple);
    assert_eq!(regrouped.len(), 1);
    assert_eq!(regrouped[0].records, triple[0].records);
    assert_eq!(regrouped[0].coupling_factor, triple[0].coupling_factor);
}

#[test]
fn components_without_shared_values_form_no_groups() {
    let table = parse_component_table(
        "Component,Function_Config,Input_Config,Design_Config\n\
         X,F1,I1,D1\n\
         Y,F2,I2,D2\n",
    )
    .expect("table");
    let g = CccgGenerator::generate(table);
    for view in CccgView::ALL {
        assert!(g.groups(view).is_empty(), "{view}");
    }
}
