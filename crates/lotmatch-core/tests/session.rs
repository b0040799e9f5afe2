use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use lotmatch_core::{CoreError, DateRange, MatchOptions, MatchRequest, MatchSession};
use lotmatch_model::ParameterStatus;
use tempfile::TempDir;

const SPECIFICATIONS: &str = "\
Codigo FT,Cliente,Familia,Producto,Tipo,Analisis,Min,Max
FT-1,Acme,Hojuela,Hojuela tradicional,Analisis,Humedad,8,12
FT-1,Acme,Hojuela,Hojuela tradicional,Analisis,Densidad aparente,350,450
FT-1,Acme,Hojuela,Hojuela tradicional,Envase,Bolsa,,
FT-2,Beta,Hojuela,Hojuela instantanea,Analisis,Humedad,8,14
FT-3,Gamma,Harina,Harina fina,Analisis,Humedad,0,14
FT-9,_Cliente de PruebaX,Hojuela,Hojuela,Analisis,Humedad,0,100
";

const PRODUCTION: &str = "\
Reporte de planta,,,,,,
Folio,Lote,Estado,Tipo de producto,Fecha,Humedad,Densidad
F-1,L1,Retenido,Tradicional,03/02/2025,10.5,400
F-2,L1,Liberado,Tradicional,03/02/2025,11,380
F-3,L2,Retenido,Instantanea,10/02/2025,13,
F-4,L3,Retenido,Tradicional,20/03/2025,15,420
";

fn write_inputs(dir: &TempDir) -> (PathBuf, PathBuf) {
    let specifications = dir.path().join("specs.csv");
    let production = dir.path().join("Hojuela.csv");
    fs::write(&specifications, SPECIFICATIONS).expect("write specifications");
    fs::write(&production, PRODUCTION).expect("write production");
    (specifications, production)
}

#[test]
fn matches_held_lots_from_csv_files() {
    let dir = TempDir::new().expect("temp dir");
    let (specifications, production) = write_inputs(&dir);
    let mut session = MatchSession::new(MatchOptions::default());
    let report = session
        .run(&MatchRequest {
            specifications,
            production,
            ..MatchRequest::default()
        })
        .expect("run");

    assert_eq!(report.source_label, "Hojuela");
    assert_eq!(report.specification_count, 3);
    assert_eq!(report.records_considered, 3);

    let f1 = &report.lots[0];
    assert_eq!(f1.folio, "F-1");
    let codes: Vec<&str> = f1.candidates.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["FT-1", "FT-2"]);
    assert_eq!(f1.candidates[0].type_match_level(), 2);

    // Moisture 13 is above FT-1's range; F-3's density is imputed.
    let f3 = &report.lots[1];
    assert_eq!(f3.candidates.len(), 1);
    assert_eq!(f3.candidates[0].code, "FT-2");
    assert!(f3.readings.iter().any(|r| r.column == "Densidad" && r.imputed));
    assert_eq!(f3.candidates[0].type_match_level(), 2);
    // FT-3 is flour and gated out, so only FT-1 is listed as rejected.
    let rejected: Vec<&str> = f3.rejected.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(rejected, vec!["FT-1"]);
    let moisture = &f3.rejected[0].details[0];
    assert_eq!(moisture.status, ParameterStatus::Fail);
    assert_eq!(moisture.display_value, "13.00");

    // Moisture 15 is out of every flake range.
    assert!(report.lots[2].candidates.is_empty());
}

#[test]
fn date_range_limits_the_records() {
    let dir = TempDir::new().expect("temp dir");
    let (specifications, production) = write_inputs(&dir);
    let mut session = MatchSession::new(MatchOptions::default());
    let report = session
        .run(&MatchRequest {
            specifications,
            production,
            sheet: None,
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 3, 1),
                NaiveDate::from_ymd_opt(2025, 3, 31),
            ),
        })
        .expect("run");
    let folios: Vec<&str> = report.lots.iter().map(|lot| lot.folio.as_str()).collect();
    assert_eq!(folios, vec!["F-4"]);
}

#[test]
fn lookup_lists_accepting_clients() {
    let dir = TempDir::new().expect("temp dir");
    let (specifications, _) = write_inputs(&dir);
    let mut session = MatchSession::new(MatchOptions::default());
    let hits = session
        .lookup(&specifications, "humedad", 13.0)
        .expect("lookup");
    let clients: Vec<&str> = hits.iter().map(|hit| hit.client.as_str()).collect();
    assert_eq!(clients, vec!["Beta", "Gamma"]);
}

#[test]
fn missing_status_column_is_a_configuration_error() {
    let dir = TempDir::new().expect("temp dir");
    let (specifications, _) = write_inputs(&dir);
    let production = dir.path().join("Hojuela.csv");
    fs::write(&production, "titulo\nFolio,Humedad\nF-1,10\n").expect("write production");
    let mut session = MatchSession::new(MatchOptions::default());
    let err = session
        .run(&MatchRequest {
            specifications,
            production,
            ..MatchRequest::default()
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::Configuration { table: "production", .. }));
    assert_eq!(
        err.to_string(),
        "production table is missing required columns: status"
    );
}

#[test]
fn options_file_overrides_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("options.json");
    fs::write(&path, r#"{ "held_status_keywords": ["bloqueado"], "production_header_row": 0 }"#)
        .expect("write options");
    let options = MatchOptions::from_path(&path).expect("options");
    assert!(options.is_held_status("BLOQUEADO"));
    assert!(!options.is_held_status("Retenido"));
    assert_eq!(options.production_header_row, 0);
    assert_eq!(options.specification_ttl_secs, 3600);
}
