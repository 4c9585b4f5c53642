//! Image embedding attachment.
//!
//! Joins per-parcel image embeddings onto the dataset. Each image file in a
//! directory is named after its parcel (`{Land_ID}.png`); its embedding is
//! written into columns `emb_0..emb_{k-1}` on the matching row. The columns
//! are created on the first successful embedding, so the vector dimension
//! never needs to be configured.
//!
//! The embedding model itself is an external collaborator behind the
//! [`ImageEmbedder`] trait.

use crate::error::{Anomaly, Result};
use crate::table::Table;
use image::DynamicImage;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reported by an [`ImageEmbedder`].
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Failed to initialize embedding model: {0}")]
    Init(String),

    #[error("Embedding failed: {0}")]
    Inference(String),
}

/// A pretrained image model mapping one image to one embedding vector.
///
/// The returned array may have any shape (e.g. `[1, 384]`); it is flattened
/// in logical order.
pub trait ImageEmbedder {
    fn embed(&mut self, image: &DynamicImage) -> std::result::Result<ArrayD<f32>, EmbedError>;
}

/// Attachment settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub id_column: String,
    /// Prefix of the generated embedding columns.
    pub column_prefix: String,
    /// Image file extensions to consider, matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            id_column: "Land_ID".to_string(),
            column_prefix: "emb_".to_string(),
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// Output of [`EmbeddingAttacher::attach`].
#[derive(Clone, Debug)]
pub struct Attached {
    pub table: Table,
    pub anomalies: Vec<Anomaly>,
    /// Number of rows that received an embedding.
    pub attached: usize,
    /// Embedding dimension discovered in this run.
    pub dimension: Option<usize>,
}

/// Merges image embeddings into a table.
#[derive(Clone, Debug, Default)]
pub struct EmbeddingAttacher {
    config: EmbedConfig,
}

impl EmbeddingAttacher {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }

    /// Sorted image files in `dir`.
    fn image_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| {
                    self.config
                        .extensions
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                });
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Embed every image in `dir` and write the vectors onto matching rows of
    /// a copy of `table`.
    ///
    /// Files whose name is not a known `Land_ID`, that fail to decode, whose
    /// embedding fails, or whose vector length differs from the first one are
    /// skipped and reported as [`Anomaly::AttachmentMiss`]. Only an unreadable
    /// directory is fatal.
    pub fn attach<E>(&self, dir: impl AsRef<Path>, table: &Table, embedder: &mut E) -> Result<Attached>
    where
        E: ImageEmbedder + ?Sized,
    {
        let dir = dir.as_ref();
        let mut out = table.clone();
        let mut anomalies = Vec::new();
        let mut attached = 0;
        let mut dimension: Option<usize> = None;

        let files = self.image_files(dir)?;
        tracing::info!(dir = %dir.display(), files = files.len(), "attaching image embeddings");

        for file in files {
            let miss = |reason: String| Anomaly::AttachmentMiss {
                file: file.clone(),
                reason,
            };

            let Some(land_id) = file
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i64>().ok())
            else {
                miss("file name is not a Land_ID".to_string()).record(&mut anomalies);
                continue;
            };

            // Locate the row before paying for inference
            let Some(row) = out.row_position(&self.config.id_column, land_id) else {
                miss(format!("no row with Land_ID {}", land_id)).record(&mut anomalies);
                continue;
            };

            let image = match image::open(&file) {
                Ok(image) => image,
                Err(e) => {
                    miss(format!("cannot decode image: {}", e)).record(&mut anomalies);
                    continue;
                }
            };

            let vector: Vec<f32> = match embedder.embed(&image) {
                Ok(v) => v.iter().copied().collect(),
                Err(e) => {
                    miss(e.to_string()).record(&mut anomalies);
                    continue;
                }
            };

            match dimension {
                None if vector.is_empty() => {
                    miss("embedding is empty".to_string()).record(&mut anomalies);
                    continue;
                }
                None => {
                    for k in 0..vector.len() {
                        out.ensure_float_column(&self.column_name(k))?;
                    }
                    dimension = Some(vector.len());
                }
                Some(dim) if dim != vector.len() => {
                    miss(format!(
                        "embedding has {} values, expected {}",
                        vector.len(),
                        dim
                    ))
                    .record(&mut anomalies);
                    continue;
                }
                Some(_) => {}
            }

            for (k, value) in vector.iter().enumerate() {
                if let Some(column) = out.column_mut(&self.column_name(k)) {
                    column.set_numeric(row, Some(f64::from(*value)));
                }
            }
            attached += 1;
            tracing::debug!(land_id, "attached embedding");
        }

        tracing::info!(attached, skipped = anomalies.len(), "attached image embeddings");
        Ok(Attached {
            table: out,
            anomalies,
            attached,
            dimension,
        })
    }

    fn column_name(&self, k: usize) -> String {
        format!("{}{}", self.config.column_prefix, k)
    }
}
