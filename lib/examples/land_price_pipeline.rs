//! End-to-end example: Land price-per-acre dataset preparation
//!
//! This example demonstrates the complete workflow:
//! - Parcel IDs read from a `land_ids` JSON document
//! - Map capture requests built for each parcel (dry run, no browser)
//! - A messy CSV export cleaned and imputed
//! - Image embeddings attached from a directory of parcel images
//! - Seeded train/validation split and feature encoding
//! - A baseline regressor trained and evaluated
//! - The fitted encoder saved and reloaded
//!
//! Run with: RUST_LOG=debug cargo run --example land_price_pipeline

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array1, ArrayD, IxDyn};
use parcel_features::{
    capture::{capture_parcels, CaptureError, CaptureRequest, ScreenshotCapture},
    config::PipelineConfig,
    embed::{EmbedError, ImageEmbedder},
    ids::extract_ids,
    pipeline::Pipeline,
    preprocessing::{FeatureMatrix, FittedFeatureEncoder, FittedTransformer},
    trainer::{FittedRegressor, Regressor, Trainer},
};
use std::error::Error;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DATASET: &str = "\
Unnamed: 0,Land_ID,Latitude,Longitude,Soil_Type,Approach_Road_Type,State,District,Water_Source_Data,Approach_Road_Length,Land_Zone_Data,Price_per_Acre,created_at
0,101,15.4931,73.8278,Red,Paved,Goa,North Goa,1,12,2,1500000,2024-01-03
1,102,15.5012,73.8301,,\"  Unpaved \",Goa,North Goa,,8,,1350000,2024-01-04
2,103,10.8505,76.2711,Laterite,Paved,Kerala,Thrissur,2,,1,900000,2024-01-04
3,104,10.8611,76.2650,laterite,,Kerala,Thrissur,1,20,1,950000,2024-01-05
4,105,26.2006,92.9376,Alluvial,Paved,Assam,Nagaon,0,5,0,400000,2024-01-05
5,106,26.2100,92.9400,,Paved,Assam,Nagaon,n/a,7,0,420000,2024-01-06
6,107,15.2993,74.1240,Red,Unpaved,Goa,South Goa,1,15,2,1250000,2024-01-06
7,,15.3000,74.1250,Red,Paved,Goa,South Goa,1,3,2,1100000,2024-01-07
8,108,10.5276,76.2144,Laterite,Unpaved,Kerala,Thrissur,2,25,1,,2024-01-07
9,109,26.1500,92.9000,Alluvial,Unpaved,Assam,Nagaon,0,30,0,380000,2024-01-08
10,110,15.4000,73.9000,Red,Paved,Goa,North Goa,1,9,2,1420000,2024-01-08
";

/// Logs what a browser would be asked to do.
struct DryRunCapture;

impl ScreenshotCapture for DryRunCapture {
    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CaptureError> {
        println!("  would capture {} -> {}", request.url, request.output_path.display());
        Ok(())
    }
}

/// Mean red/green/blue intensity as a 3-value embedding.
struct MeanColorEmbedder;

impl ImageEmbedder for MeanColorEmbedder {
    fn embed(&mut self, image: &DynamicImage) -> Result<ArrayD<f32>, EmbedError> {
        let rgb = image.to_rgb8();
        let n = (rgb.width() * rgb.height()).max(1) as f32;
        let mut sums = [0f32; 3];
        for pixel in rgb.pixels() {
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += f32::from(channel) / 255.0;
            }
        }
        ArrayD::from_shape_vec(IxDyn(&[1, 3]), sums.iter().map(|s| s / n).collect())
            .map_err(|e| EmbedError::Inference(e.to_string()))
    }
}

/// Predicts the training mean. A stand-in for a gradient-boosting model.
struct BaselineRegressor;

struct FittedBaseline {
    mean: f64,
}

impl Regressor for BaselineRegressor {
    type Model = FittedBaseline;

    fn fit(&self, _x: &FeatureMatrix, y: &Array1<f64>) -> parcel_features::Result<FittedBaseline> {
        let mean = y.mean().ok_or_else(|| {
            parcel_features::PipelineError::Model("no training targets".to_string())
        })?;
        Ok(FittedBaseline { mean })
    }
}

impl FittedRegressor for FittedBaseline {
    fn predict(&self, x: &FeatureMatrix) -> parcel_features::Result<Array1<f64>> {
        Ok(Array1::from_elem(x.n_rows(), self.mean))
    }

    fn save(&self, path: &Path) -> parcel_features::Result<()> {
        std::fs::write(path, self.mean.to_string())?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Land Price Dataset Pipeline ===\n");

    let workdir = tempfile::TempDir::new()?;
    let csv_path = workdir.path().join("dataset1.csv");
    std::fs::write(&csv_path, DATASET)?;
    let ids_path = workdir.path().join("land_ids.json");
    std::fs::write(&ids_path, r#"{"land_ids": [101, 103, 103, 999]}"#)?;

    let mut config = PipelineConfig::from_toml_str(
        r#"
        [encoder]
        numeric_scaling = "standardize"

        [split]
        fraction = 0.25
        seed = 7
        "#,
    )?;
    config.capture.output_dir = workdir.path().join("images");
    config.training.model_path = workdir.path().join("baseline.txt");
    config.training.save_model = true;
    let pipeline = Pipeline::new(config)?;

    // 1. Load
    let raw = pipeline.load(&csv_path)?;
    println!("1. Loaded {} rows x {} columns", raw.n_rows(), raw.n_cols());

    // 2. Capture requests for the requested IDs
    let ids = extract_ids(&ids_path)?;
    println!("\n2. Capturing maps for {} unique IDs", ids.len());
    let summary = capture_parcels(ids, &raw, &mut DryRunCapture, &pipeline.config().capture);
    println!("  captured {:?}, skipped {:?}", summary.captured, summary.skipped);

    // 3. Clean and impute
    let processed = pipeline.process(&raw)?;
    println!(
        "\n3. Processed: {} rows, {} anomalies recovered",
        processed.table.n_rows(),
        processed.anomalies.len()
    );
    for anomaly in &processed.anomalies {
        println!("  - {}", anomaly);
    }
    let processed_path = workdir.path().join("processed_dataset.csv");
    processed.table.write_csv(&processed_path)?;
    println!("  saved {}", processed_path.display());

    // 4. Embeddings from parcel images
    let image_dir = workdir.path().join("images");
    std::fs::create_dir_all(&image_dir)?;
    for (id, shade) in [(101u32, 200u8), (103, 90), (105, 30)] {
        RgbImage::from_pixel(8, 8, Rgb([shade, 120, 255 - shade]))
            .save(image_dir.join(format!("{}.png", id)))?;
    }
    let attached = pipeline.attach_embeddings(&image_dir, &processed.table, &mut MeanColorEmbedder)?;
    println!(
        "\n4. Attached {} embeddings of dimension {:?}",
        attached.attached, attached.dimension
    );

    // 5. Split and encode
    let prepared = pipeline.prepare(&attached.table)?;
    println!(
        "\n5. Features: {} train rows, {} valid rows",
        prepared.x_train.n_rows(),
        prepared.x_valid.n_rows()
    );
    println!("  {:?}", prepared.x_train.feature_names);

    // 6. Train a baseline
    let trainer = Trainer::new(pipeline.config().training.clone());
    let trained = trainer.train_and_evaluate(&prepared, &BaselineRegressor)?;
    println!(
        "\n6. Baseline validation RMSE {:.0}, MAE {:.0}, R² {:.3}",
        trained.report.valid.rmse, trained.report.valid.mae, trained.report.valid.r_squared
    );

    // 7. Reuse the fitted encoder
    let encoder_path = workdir.path().join("encoder.bin");
    prepared.encoder.save_to_file(&encoder_path)?;
    let loaded = FittedFeatureEncoder::load_from_file(&encoder_path)?;
    let again = loaded.transform(&attached.table)?;
    println!(
        "\n7. Reloaded encoder produces {} features for {} rows",
        again.n_features(),
        again.n_rows()
    );

    println!("\n=== Done ===");
    Ok(())
}
