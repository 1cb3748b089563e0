use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use airq_explorer::analysis::{AnalysisKind, AnalysisResult};
use airq_explorer::config::ExplorerConfig;
use airq_explorer::data::{load_file, CellValue, DType};
use airq_explorer::inference::{load_model, FeatureInput, FeatureMap, FEATURE_COLUMNS};
use airq_explorer::profile::profile_file;
use airq_explorer::session::Session;
use airq_explorer::ExplorerError;
use approx::assert_abs_diff_eq;
use confique::Config;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

const WIND: [&str; 4] = ["N", "NE", "E", "SE"];
const STATIONS: [&str; 2] = ["Dongsi", "Tiantan"];

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Twelve hourly rows; `encoded` swaps the labels for integer codes.
fn air_quality_csv(encoded: bool) -> String {
    let mut out = String::from(
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station\n",
    );
    for i in 0..12 {
        let pm25 = if i == 3 { String::new() } else { format!("{}", 10 + i * 3) };
        let wd_idx = i % WIND.len();
        let st_idx = i % STATIONS.len();
        let (wd, station) = if encoded {
            (wd_idx.to_string(), st_idx.to_string())
        } else {
            (WIND[wd_idx].to_string(), STATIONS[st_idx].to_string())
        };
        writeln!(
            out,
            "{},2013,3,1,{i},{pm25},{},{},{},{},{},{},{},{},{},{wd},{},{station}",
            i + 1,
            20 + i * 4,
            3 + i % 5,
            30 + i,
            300 + i * 25,
            40 - i,
            -2.0 + i as f64 * 0.5,
            1020 - i,
            -15 + i as i64,
            if i % 6 == 0 { 0.4 } else { 0.0 },
            1.0 + (i % 3) as f64,
        )
        .unwrap();
    }
    out
}

fn model_json() -> String {
    serde_json::json!({
        "kind": "linear",
        "feature_names": FEATURE_COLUMNS,
        "coefficients": [0.6, 0.0, 0.1, 0.02, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -2.0, 1.0],
        "intercept": 5.0
    })
    .to_string()
}

fn session_dir() -> (TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(dir.path(), "air_quality.csv", &air_quality_csv(false));
    let numeric = write(dir.path(), "air_quality_numerical.csv", &air_quality_csv(true));
    let model = write(dir.path(), "model.json", &model_json());
    let settings = write(
        dir.path(),
        "airq.toml",
        &format!(
            "raw_dataset = {:?}\nnumeric_dataset = {:?}\nmodel = {:?}\nhistogram_bins = 5\n",
            raw.display().to_string(),
            numeric.display().to_string(),
            model.display().to_string(),
        ),
    );
    let config = ExplorerConfig::builder().file(settings).load().unwrap();
    let session = Session::open(&config).unwrap();
    (dir, session)
}

fn features() -> FeatureMap {
    FEATURE_COLUMNS
        .iter()
        .map(|&name| (name.to_string(), FeatureInput::Number(1.0)))
        .collect()
}

// ---------------------------------------------------------------------------
// Profiler
// ---------------------------------------------------------------------------

#[test]
fn duplicate_example_from_three_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "tiny.csv", "PM2.5,PM10\n10,20\n10,20\n5,8\n");
    let report = profile_file(&path).unwrap();
    assert_eq!(report.row_count, 3);
    assert_eq!(report.column_count, 2);
    assert_eq!(report.duplicate_rows, 1);
    assert_eq!(report.unique_count_of("PM2.5"), Some(2));
    assert!(report.missing.is_empty());
}

#[test]
fn missing_file_is_a_load_error() {
    let err = profile_file(Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, ExplorerError::DataLoad { .. }));
}

#[test]
fn ragged_rows_are_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "ragged.csv", "a,b\n1,2\n3\n");
    assert!(matches!(profile_file(&path), Err(ExplorerError::DataLoad { .. })));
}

#[test]
fn unknown_extension_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "table.xlsx", "");
    assert!(matches!(load_file(&path), Err(ExplorerError::DataLoad { .. })));
}

#[test]
fn raw_table_profile() {
    let (_dir, session) = session_dir();
    let report = session.profile();

    assert_eq!(report.row_count, 12);
    assert_eq!(report.column_count, 18);
    let dtype = |name: &str| report.columns.iter().find(|c| c.name == name).unwrap().dtype;
    assert_eq!(dtype("hour"), DType::Int64);
    assert_eq!(dtype("PM2.5"), DType::Float64);
    assert_eq!(dtype("wd"), DType::Object);

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].column, "PM2.5");
    assert_eq!(report.summary_of("PM2.5").unwrap().count, 11);
    assert_eq!(report.summary.len(), 16);

    let tables: Vec<&str> = report
        .categorical_frequencies
        .iter()
        .map(|t| t.column.as_str())
        .collect();
    assert_eq!(tables, ["wd", "station"]);
    assert_eq!(
        report.categorical_frequencies[1].count_of(&CellValue::Text("Dongsi".into())),
        Some(6)
    );
}

#[test]
fn json_records_load_in_first_seen_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "records.json",
        r#"[{"PM2.5": 4, "wd": "N"}, {"PM2.5": 6.5, "wd": null, "station": "Dongsi"}]"#,
    );
    let ds = load_file(&path).unwrap();
    let names: Vec<&str> = ds.column_names().collect();
    assert_eq!(names, ["PM2.5", "wd", "station"]);
    assert_eq!(ds.column("PM2.5").unwrap().dtype, DType::Float64);
    assert_eq!(ds.column("station").unwrap().null_count(), 1);
}

#[test]
fn parquet_columns_load_with_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("numeric.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("PM2.5", DataType::Float64, true),
        Field::new("station", DataType::Utf8, false),
    ]));
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(vec![Some(1.5), None, Some(3.0)])),
        Arc::new(StringArray::from(vec!["A", "B", "A"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.column("PM2.5").unwrap().null_count(), 1);
    assert_eq!(ds.column("station").unwrap().unique_count(), 2);
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[test]
fn every_analysis_runs_on_the_numeric_table() {
    let (_dir, session) = session_dir();
    for kind in AnalysisKind::ALL {
        let result = session.analyze(kind).unwrap();
        assert_eq!(result.kind(), kind);
    }
}

#[test]
fn correlation_is_symmetric() {
    let (_dir, session) = session_dir();
    let AnalysisResult::CorrelationHeatmap(matrix) =
        session.analyze(AnalysisKind::CorrelationHeatmap).unwrap()
    else {
        panic!("wrong result kind");
    };
    let n = matrix.columns.len();
    assert_eq!(n, 18);
    for i in 0..n {
        let d = matrix.values[i][i];
        assert!(d == 1.0 || d.is_nan());
        for j in 0..n {
            assert_eq!(matrix.values[i][j].to_bits(), matrix.values[j][i].to_bits());
        }
    }
    // Constant columns have no spread.
    assert!(matrix.get("year", "year").unwrap().is_nan());
}

#[test]
fn histograms_honour_configured_bins() {
    let (_dir, session) = session_dir();
    let result = session.analyze(AnalysisKind::Histograms).unwrap();
    let AnalysisResult::Histograms(dists) = result else {
        panic!("wrong result kind");
    };
    assert_eq!(dists.len(), 11);
    assert!(dists.iter().all(|d| d.histogram.counts.len() == 5));
    assert_eq!(dists[0].observations, 11);
}

#[test]
fn wind_direction_groups_match_observed_codes() {
    let (_dir, session) = session_dir();
    let AnalysisResult::GroupedByWindDirection(table) = session
        .analyze_named("Grouped Bar Chart by Wind Direction")
        .unwrap()
    else {
        panic!("wrong result kind");
    };
    assert_eq!(table.rows.len(), WIND.len());
    assert_eq!(table.rows.iter().map(|r| r.size).sum::<usize>(), 12);
}

#[test]
fn pie_fractions_sum_to_one() {
    let (_dir, session) = session_dir();
    let AnalysisResult::PollutantPieChart(pie) =
        session.analyze(AnalysisKind::PollutantPieChart).unwrap()
    else {
        panic!("wrong result kind");
    };
    let total: f64 = pie.slices.iter().map(|s| s.fraction).sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
}

#[test]
fn unknown_analysis_name_is_unsupported() {
    let (_dir, session) = session_dir();
    assert!(matches!(
        session.analyze_named("Sankey"),
        Err(ExplorerError::UnsupportedAnalysisKind(_))
    ));
}

#[test]
fn results_serialize_for_any_renderer() {
    let (_dir, session) = session_dir();
    let result = session.analyze(AnalysisKind::StationComparison).unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["kind"], "station_comparison");
    assert_eq!(value["data"]["rows"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

#[test]
fn prediction_matches_the_linear_model() {
    let (_dir, session) = session_dir();
    let mut features = features();
    features.insert("PM10".into(), 50.0.into());
    let pm25 = session.predict(&features).unwrap();
    // 0.6*50 + 0.1 + 0.02 - 2.0 + 1.0 + 5.0
    assert_abs_diff_eq!(pm25, 34.12, epsilon = 1e-9);
    assert_eq!(pm25.to_bits(), session.predict(&features).unwrap().to_bits());
}

#[test]
fn missing_station_is_named() {
    let (_dir, session) = session_dir();
    let mut features = features();
    features.remove("station");
    assert_eq!(
        session.predict(&features),
        Err(ExplorerError::MissingFeature {
            feature: "station".into()
        })
    );
}

#[test]
fn free_text_feature_is_rejected() {
    let (_dir, session) = session_dir();
    let mut features = features();
    features.insert("CO".into(), "lots".into());
    assert!(matches!(
        session.predict(&features),
        Err(ExplorerError::InvalidFeatureType { .. })
    ));
}

#[test]
fn feature_maps_deserialize_from_form_json() {
    let json = serde_json::to_string(&features()).unwrap();
    let parsed: FeatureMap = serde_json::from_str(&json.replace("1.0", "\"1.0\"")).unwrap();
    assert_eq!(parsed["wd"], FeatureInput::Text("1.0".into()));
}

#[test]
fn model_load_failures() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("model.json");
    assert!(matches!(load_model(&missing), Err(ExplorerError::ModelLoad { .. })));

    let pickle = write(dir.path(), "model.pkl", "\u{80}\u{4}");
    assert!(matches!(load_model(&pickle), Err(ExplorerError::ModelLoad { .. })));

    let short = serde_json::json!({
        "kind": "linear",
        "feature_names": ["PM10", "SO2"],
        "coefficients": [1.0, 1.0],
        "intercept": 0.0
    });
    let incompatible = write(dir.path(), "short.json", &short.to_string());
    assert!(matches!(load_model(&incompatible), Err(ExplorerError::ModelLoad { .. })));
}
