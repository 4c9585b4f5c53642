use ndarray::{ArrayD, IxDyn};
use parcel_features::embed::{EmbedError, ImageEmbedder};
use parcel_features::ids::extract_ids;
use parcel_features::preprocessing::{FittedFeatureEncoder, FittedTransformer, NumericScaling};
use parcel_features::split::SplitConfig;
use parcel_features::{Anomaly, Pipeline, PipelineConfig, PipelineError, Table};
use std::path::Path;
use tempfile::TempDir;

const CSV: &str = "\
Unnamed: 0,Land_ID,Latitude,Longitude,Soil_Type,Approach_Road_Type,State,District,Water_Source_Data,Approach_Road_Length,Land_Zone_Data,Price_per_Acre
0,1,10.0,20.0,Red,Paved,Goa,North,1,12,2,100
1,2,10.01,20.01,,unpaved,goa,North,,8,,200
2,3,30.0,40.0,,Paved,Kerala,South,2,,1,300
3,4,30.5,40.5,Black,,KERALA,South,1,20,1,400
4,  ,11.0,21.0,Red,Paved,Goa,North,1,3,2,500
5,6,11.5,21.5,\"Red\",Paved,Goa,South,x,7,0,600
6,7,12.0,22.0,Black,Paved,Kerala,North,0,30,0,
7,8,12.5,22.5,Black,Unpaved,Kerala,North,0,9,0,800
8,9,13.0,23.0,Red,Unpaved,Goa,South,1,11,2,900
9,10,13.5,23.5,Black,Paved,Kerala,South,0,14,1,1000
";

fn write_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dataset1.csv");
    std::fs::write(&path, CSV).unwrap();
    path
}

fn load(dir: &Path) -> (Pipeline, Table) {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let raw = pipeline.load(write_csv(dir)).unwrap();
    (pipeline, raw)
}

struct FixedEmbedder(usize);

impl ImageEmbedder for FixedEmbedder {
    fn embed(&mut self, _image: &image::DynamicImage) -> Result<ArrayD<f32>, EmbedError> {
        Ok(ArrayD::from_elem(IxDyn(&[1, self.0]), 0.25))
    }
}

#[test]
fn processed_table_is_clean_and_complete() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let processed = pipeline.process(&raw).unwrap();
    let t = &processed.table;

    // keyless row dropped, index column gone
    assert_eq!(t.n_rows(), 9);
    assert!(!t.has_column("Unnamed: 0"));
    assert!(t.row_position("Land_ID", 5).is_none());

    // ~1.5 km from parcel 1
    let row = t.row_position("Land_ID", 2).unwrap();
    assert_eq!(t.text("Soil_Type").unwrap()[row].as_deref(), Some("red"));

    // nearest known soil to parcel 3 is parcel 4, ~70 km away
    let row = t.row_position("Land_ID", 3).unwrap();
    assert_eq!(t.text("Soil_Type").unwrap()[row].as_deref(), Some("unknown"));
    assert!(processed
        .anomalies
        .contains(&Anomaly::ImputationGap { land_id: Some(3) }));

    // "x" failed numeric coercion
    assert!(processed.anomalies.iter().any(|a| matches!(
        a,
        Anomaly::CoercionWarning { column, failed: 1 } if column == "Water_Source_Data"
    )));

    for name in [
        "Soil_Type",
        "Water_Source_Data",
        "Approach_Road_Length",
        "Land_Zone_Data",
        "Approach_Road_Type",
    ] {
        assert_eq!(t.column(name).unwrap().null_count(), 0, "{}", name);
    }

    for (_, column) in t.columns() {
        if let Some(values) = column.as_text() {
            for value in values.iter().flatten() {
                assert_eq!(value.trim(), value);
                assert!(!value.starts_with('"') && !value.ends_with('"'));
            }
        }
    }
}

#[test]
fn imputation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let once = pipeline.process(&raw).unwrap().table;
    let twice = pipeline.impute(&once).unwrap();
    assert_eq!(once, twice.table);
}

#[test]
fn processed_table_round_trips_through_csv() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let processed = pipeline.process(&raw).unwrap().table;

    let out = dir.path().join("processed_dataset.csv");
    processed.write_csv(&out).unwrap();
    let reloaded = Table::read_csv(&out).unwrap();

    assert_eq!(reloaded.n_rows(), processed.n_rows());
    assert_eq!(reloaded.column_names(), processed.column_names());
}

#[test]
fn run_produces_disjoint_consistent_partitions() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let prepared = pipeline.run(&raw).unwrap();

    // 9 keyed rows, one without a price
    assert_eq!(prepared.y_train.len(), 6);
    assert_eq!(prepared.y_valid.len(), 2);
    assert_eq!(prepared.x_train.feature_names, prepared.x_valid.feature_names);

    let mut prices: Vec<f64> = prepared
        .y_train
        .iter()
        .chain(prepared.y_valid.iter())
        .copied()
        .collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(prices, vec![100.0, 200.0, 300.0, 400.0, 600.0, 800.0, 900.0, 1000.0]);

    let names = &prepared.x_train.feature_names;
    assert_eq!(&names[..2], &["Soil_Type", "Approach_Road_Type"]);
    assert!(names.iter().all(|n| !n.contains('[') && !n.contains('<')));
}

#[test]
fn scaler_parameters_come_from_training_rows_only() {
    let dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::default();
    config.encoder.numeric_scaling = NumericScaling::Standardize;
    let pipeline = Pipeline::new(config).unwrap();
    let raw = pipeline.load(write_csv(dir.path())).unwrap();

    let prepared = pipeline.run(&raw).unwrap();
    assert!(prepared.encoder.scaler().is_some());

    // Fitted on the training rows, so the training column is exactly standardized
    let col = prepared.x_train.column("Approach_Road_Length").unwrap();
    let n = col.len() as f64;
    let mean = col.sum() / n;
    let std = (col.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n).sqrt();
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

#[test]
fn stratified_split_requires_two_members_per_stratum() {
    let dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::default();
    config.split = SplitConfig {
        stratify_by: Some("District".to_string()),
        ..SplitConfig::default()
    };
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let raw = pipeline.load(write_csv(dir.path())).unwrap();
    let prepared = pipeline.run(&raw).unwrap();
    assert_eq!(prepared.y_train.len() + prepared.y_valid.len(), 8);

    config.split.stratify_by = Some("Land_ID".to_string());
    let pipeline = Pipeline::new(config).unwrap();
    assert!(matches!(
        pipeline.run(&raw),
        Err(PipelineError::Stratification { count: 1, .. })
    ));
}

#[test]
fn embeddings_join_the_numeric_group() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let processed = pipeline.process(&raw).unwrap().table;

    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    image::RgbImage::new(2, 2).save(images.join("9.png")).unwrap();
    image::RgbImage::new(2, 2).save(images.join("42.png")).unwrap();

    let attached = pipeline
        .attach_embeddings(&images, &processed, &mut FixedEmbedder(384))
        .unwrap();
    assert_eq!(attached.attached, 1);
    assert_eq!(attached.anomalies.len(), 1);
    assert!(attached.table.has_column("emb_383"));

    let row = attached.table.row_position("Land_ID", 9).unwrap();
    let emb = attached.table.numeric("emb_0").unwrap();
    assert_eq!(emb[row], Some(0.25));
    assert_eq!(emb.iter().filter(|v| v.is_some()).count(), 1);

    let prepared = pipeline.prepare(&attached.table).unwrap();
    let names = &prepared.x_train.feature_names;
    assert_eq!(names.last().map(String::as_str), Some("emb_383"));
}

#[test]
fn fitted_encoder_reloads_and_matches() {
    let dir = TempDir::new().unwrap();
    let (pipeline, raw) = load(dir.path());
    let processed = pipeline.process(&raw).unwrap().table;
    let prepared = pipeline.prepare(&processed).unwrap();

    let path = dir.path().join("encoder.bin");
    prepared.encoder.save_to_file(&path).unwrap();
    let loaded = FittedFeatureEncoder::load_from_file(&path).unwrap();

    let a = prepared.encoder.transform(&processed).unwrap();
    let b = loaded.transform(&processed).unwrap();
    assert_eq!(a.feature_names, b.feature_names);
    assert_eq!(a.values, b.values);
}

#[test]
fn land_ids_are_deduplicated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ids.json");
    std::fs::write(&path, r#"{"land_ids": [5, 5, 3, 3, 7]}"#).unwrap();

    let ids: Vec<i64> = extract_ids(&path).unwrap().into_iter().collect();
    assert_eq!(ids, vec![3, 5, 7]);
}

#[test]
fn missing_key_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Latitude,Longitude\n1,2\n").unwrap();

    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let raw = pipeline.load(&path).unwrap();
    assert!(matches!(
        pipeline.run(&raw),
        Err(PipelineError::Schema { column }) if column == "Land_ID"
    ));
}
