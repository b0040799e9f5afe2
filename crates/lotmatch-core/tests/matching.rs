use lotmatch_core::{
    DateRange, MatchOptions, ProductionDataset, SpecDatabaseBuilder, gate, run_matching,
};
use lotmatch_ingest::RawTable;
use lotmatch_map::AliasTables;
use lotmatch_model::{
    CellValue, ClientSpecification, Family, MatchReport, ParameterStatus, SpecDatabase,
};
use proptest::prelude::*;

const SPEC_HEADERS: &[&str] = &[
    "Codigo FT",
    "Cliente",
    "Familia",
    "Producto",
    "Tipo",
    "Analisis",
    "Min",
    "Max",
];

fn table(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
    RawTable {
        headers: headers.iter().map(|h| (*h).to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|cell| CellValue::from_text(cell)).collect())
            .collect(),
    }
}

/// One analysis row per (code, client, parameter, min, max).
fn specifications(rows: &[(&str, &str, &str, &str, &str)]) -> SpecDatabase {
    let rows: Vec<Vec<&str>> = rows
        .iter()
        .map(|(code, client, parameter, min, max)| {
            vec![
                *code,
                *client,
                "Hojuela",
                "Hojuela tradicional",
                "Analisis",
                *parameter,
                *min,
                *max,
            ]
        })
        .collect();
    SpecDatabaseBuilder::new(&MatchOptions::default())
        .build(&table(SPEC_HEADERS, &rows))
        .expect("specification table")
}

fn run(database: &SpecDatabase, label: &str, headers: &[&str], rows: &[Vec<&str>]) -> MatchReport {
    let dataset = ProductionDataset::from_table(label, &table(headers, rows)).expect("production");
    let options = MatchOptions::default();
    run_matching(
        database,
        dataset,
        &options,
        &AliasTables::builtin(),
        &DateRange::default(),
    )
    .expect("match")
}

#[test]
fn in_range_reading_yields_a_passing_candidate() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[vec!["F-1", "Retenido", "15"]],
    );
    assert_eq!(report.records_considered, 1);
    let candidates = &report.lots[0].candidates;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].client, "Acme");
    assert_eq!(candidates[0].score, 100.0);
    assert_eq!(candidates[0].details[0].status, ParameterStatus::Pass);
    assert_eq!(candidates[0].details[0].display_value, "15.00");
}

#[test]
fn out_of_range_reading_disqualifies() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    for reading in ["25", "9.99", "20.01"] {
        let report = run(
            &database,
            "Hojuela",
            &["Folio", "Estado", "Bulk Density"],
            &[vec!["F-1", "Retenido", reading]],
        );
        let lot = &report.lots[0];
        assert!(lot.candidates.is_empty(), "reading {reading}");
        let rejected = &lot.rejected[0];
        assert_eq!(rejected.code, "S1");
        assert!(!rejected.compatible);
        assert_eq!(rejected.evaluated_count, 1);
        assert_eq!(rejected.details[0].status, ParameterStatus::Fail);
        assert_eq!(rejected.details[0].range, "10 - 20");
    }
}

#[test]
fn unresolved_parameter_never_yields_a_candidate() {
    let database = specifications(&[("S1", "Acme", "Cenizas", "0", "2")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[vec!["F-1", "Retenido", "15"]],
    );
    let lot = &report.lots[0];
    assert!(lot.candidates.is_empty());
    assert_eq!(report.resolution.unresolved, 1);
    let rejected = &lot.rejected[0];
    assert!(rejected.compatible);
    assert_eq!(rejected.evaluated_count, 0);
    assert_eq!(rejected.details[0].status, ParameterStatus::NotFound);
    assert_eq!(rejected.details[0].resolved_column, None);
}

#[test]
fn unresolved_parameter_beside_a_pass_still_qualifies() {
    let database = specifications(&[
        ("S1", "Acme", "Bulk Density", "10", "20"),
        ("S1", "Acme", "Cenizas", "0", "2"),
    ]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[vec!["F-1", "Retenido", "15"]],
    );
    let lot = &report.lots[0];
    assert!(lot.rejected.is_empty());
    let candidate = &lot.candidates[0];
    assert_eq!((candidate.matched_count, candidate.evaluated_count), (1, 1));
    assert_eq!(candidate.score, 100.0);
    let statuses: Vec<ParameterStatus> = candidate.details.iter().map(|d| d.status).collect();
    assert_eq!(statuses, vec![ParameterStatus::Pass, ParameterStatus::NotFound]);
}

#[test]
fn broader_evidence_ranks_first() {
    let parameters = ["Humedad", "Espesor", "Densidad", "Acidez", "Peroxidos"];
    let mut rows = Vec::new();
    for parameter in &parameters[..3] {
        rows.push(("S3", "Tres", *parameter, "0", "100"));
    }
    for parameter in &parameters {
        rows.push(("S5", "Cinco", *parameter, "0", "100"));
    }
    let database = specifications(&rows);
    let mut headers = vec!["Folio", "Estado"];
    headers.extend(parameters);
    let report = run(
        &database,
        "Hojuela",
        &headers,
        &[vec!["F-1", "Retenido", "10", "1", "40", "2", "3"]],
    );
    let candidates = &report.lots[0].candidates;
    let order: Vec<(&str, usize)> = candidates
        .iter()
        .map(|c| (c.code.as_str(), c.evaluated_count))
        .collect();
    assert_eq!(order, vec![("S5", 5), ("S3", 3)]);
    assert!(candidates.iter().all(|c| c.type_match_level() == 0));
}

#[test]
fn only_held_records_are_scored() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[
            vec!["F-1", "Liberado", "15"],
            vec!["F-2", "RETENIDO", "15"],
            vec!["F-3", "Held - QA", "16"],
        ],
    );
    let folios: Vec<&str> = report.lots.iter().map(|lot| lot.folio.as_str()).collect();
    assert_eq!(folios, vec!["F-2", "F-3"]);
}

#[test]
fn imputed_values_are_flagged_and_scored() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Lote", "Estado", "Bulk Density"],
        &[
            vec!["F-1", "L1", "Liberado", "12"],
            vec!["F-2", "L1", "Retenido", ""],
            vec!["F-3", "L2", "Liberado", "40"],
        ],
    );
    assert_eq!(report.imputed_cells, 1);
    let detail = &report.lots[0].candidates[0].details[0];
    assert!(detail.imputed);
    assert_eq!(detail.display_value, "12.00");
    assert!(report.lots[0].readings.iter().all(|r| r.imputed));
}

#[test]
fn unfillable_reading_is_a_value_error() {
    let database = specifications(&[
        ("S1", "Acme", "Bulk Density", "10", "20"),
        ("S1", "Acme", "Acidez", "0", "1"),
    ]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density", "Acidez"],
        &[vec!["F-1", "Retenido", "15", ""]],
    );
    let lot = &report.lots[0];
    assert!(lot.candidates.is_empty());
    let details = &lot.rejected[0].details;
    assert_eq!(details[0].status, ParameterStatus::Pass);
    assert_eq!(details[1].status, ParameterStatus::ValueError);
    assert_eq!(details[1].display_value, "n/a");
    assert_eq!(details[1].resolved_column.as_deref(), Some("Acidez"));
    assert!(!details[1].imputed);
}

#[test]
fn rejected_evaluations_serialize_with_their_statuses() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[vec!["F-1", "Retenido", "25"]],
    );
    let json = serde_json::to_string(&report).expect("json");
    assert!(json.contains(r#""status":"Fail""#));
    assert!(json.contains(r#""candidates":[]"#));
}

#[test]
fn gluten_free_lots_only_meet_gluten_free_specifications() {
    let rows: Vec<Vec<&str>> = vec![
        vec!["GF-1", "Acme", "Hojuela GF", "Hojuela sin gluten", "Analisis", "Bulk Density", "10", "20"],
        vec!["R-1", "Acme", "Hojuela", "Hojuela tradicional", "Analisis", "Bulk Density", "10", "20"],
    ];
    let database = SpecDatabaseBuilder::new(&MatchOptions::default())
        .build(&table(SPEC_HEADERS, &rows))
        .expect("specification table");
    let headers = ["Folio", "Estado", "Bulk Density"];
    let held = vec![vec!["F-1", "Retenido", "15"]];

    let gluten_free = run(&database, "Hojuela GF", &headers, &held);
    let codes: Vec<&str> = gluten_free.lots[0]
        .candidates
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(codes, vec!["GF-1"]);

    let regular = run(&database, "Hojuela", &headers, &held);
    let codes: Vec<&str> = regular.lots[0]
        .candidates
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(codes, vec!["R-1"]);
}

#[test]
fn report_serializes_to_json() {
    let database = specifications(&[("S1", "Acme", "Bulk Density", "10", "20")]);
    let report = run(
        &database,
        "Hojuela",
        &["Folio", "Estado", "Bulk Density"],
        &[vec!["F-1", "Retenido", "15"]],
    );
    let candidate = serde_json::to_value(&report.lots[0].candidates[0].details[0]).expect("json");
    insta::assert_json_snapshot!(candidate, @r#"
    {
      "display_value": "15.00",
      "imputed": false,
      "parameter_name": "Bulk Density",
      "range": "10 - 20",
      "resolved_column": "Bulk Density",
      "status": "Pass"
    }
    "#);
}

fn family_strategy() -> impl Strategy<Value = Family> {
    prop_oneof![
        Just(Family::Flake),
        Just(Family::Flour),
        Just(Family::Groat),
        Just(Family::Pillow),
        Just(Family::Other),
    ]
}

proptest! {
    #[test]
    fn gluten_free_status_must_agree(
        lot_family in family_strategy(),
        spec_family in family_strategy(),
        lot_gf in any::<bool>(),
        spec_gf in any::<bool>(),
    ) {
        let specification = ClientSpecification {
            code: "S".to_string(),
            client: "C".to_string(),
            family: spec_family,
            product_text: String::new(),
            product_normalized: String::new(),
            is_gluten_free: spec_gf,
            parameters: Vec::new(),
        };
        if gate(lot_family, lot_gf, &specification).is_ok() {
            prop_assert_eq!(lot_gf, spec_gf);
        }
    }

    #[test]
    fn imputation_fills_every_column_with_an_observation(
        cells in proptest::collection::vec(
            (0u8..3, proptest::option::of(0.0f64..100.0)),
            1..20,
        ),
    ) {
        let records = cells
            .iter()
            .enumerate()
            .map(|(row_index, (group, value))| lotmatch_model::ProductionRecord {
                row_index,
                folio: None,
                lot: Some(format!("L{group}")),
                status: "Retenido".to_string(),
                product_type: None,
                condition: None,
                origin_client: None,
                hold_reason: None,
                date: None,
                readings: vec![*value],
            })
            .collect();
        let (filled, mask) = lotmatch_core::impute(records, lotmatch_core::GroupKey::Lot)
            .expect("impute");
        let observed = cells.iter().any(|(_, value)| value.is_some());
        for (row, (_, original)) in cells.iter().enumerate() {
            match original {
                Some(value) => {
                    prop_assert_eq!(filled[row].reading(0), Some(*value));
                    prop_assert!(!mask.is_imputed(row, 0));
                }
                None => {
                    prop_assert_eq!(filled[row].reading(0).is_some(), observed);
                    prop_assert_eq!(mask.is_imputed(row, 0), observed);
                }
            }
        }
    }
}
