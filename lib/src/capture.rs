//! Map screenshot capture for parcels.
//!
//! For each requested parcel ID the coordinates are resolved from the
//! dataset, a map URL is built and an external [`ScreenshotCapture`]
//! implementation (typically a headless browser) saves the rendered map to
//! `{output_dir}/{id}.png`. Capture failures are logged and counted; they
//! never abort the batch.

use crate::geo::{self, GeoColumns, LatLong};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`ScreenshotCapture`] implementation.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Page load timed out after {0:?}")]
    Timeout(Duration),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a browser needs to render one parcel map.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureRequest {
    pub land_id: i64,
    pub url: String,
    pub output_path: PathBuf,
    pub page_load_timeout: Duration,
    /// Wait after navigation, before the page is tidied up.
    pub settle_after_load: Duration,
    /// Wait after tidying, before the screenshot.
    pub settle_before_shot: Duration,
    pub window_size: (u32, u32),
}

/// Given a URL and an output path, produce an image file or fail.
pub trait ScreenshotCapture {
    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CaptureError>;
}

/// Capture settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub base_url: String,
    /// Map zoom segment of the URL.
    pub zoom: String,
    pub output_dir: PathBuf,
    pub page_load_timeout_secs: u64,
    pub settle_after_load_secs: u64,
    pub settle_before_shot_secs: u64,
    pub window_width: u32,
    pub window_height: u32,
    pub geo: GeoColumns,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.1acre.in".to_string(),
            zoom: "17m".to_string(),
            output_dir: PathBuf::from("images"),
            page_load_timeout_secs: 20,
            settle_after_load_secs: 5,
            settle_before_shot_secs: 2,
            window_width: 1280,
            window_height: 1024,
            geo: GeoColumns::default(),
        }
    }
}

impl CaptureConfig {
    /// Map URL for a parcel.
    pub fn url_for(&self, land_id: i64, at: LatLong) -> String {
        format!(
            "{}/@{}-{}-{}/data-!land{}",
            self.base_url.trim_end_matches('/'),
            at.lat,
            at.long,
            self.zoom,
            land_id
        )
    }

    /// Full request for a parcel.
    pub fn request_for(&self, land_id: i64, at: LatLong) -> CaptureRequest {
        CaptureRequest {
            land_id,
            url: self.url_for(land_id, at),
            output_path: self.output_dir.join(format!("{}.png", land_id)),
            page_load_timeout: Duration::from_secs(self.page_load_timeout_secs),
            settle_after_load: Duration::from_secs(self.settle_after_load_secs),
            settle_before_shot: Duration::from_secs(self.settle_before_shot_secs),
            window_size: (self.window_width, self.window_height),
        }
    }
}

/// Result of a capture batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureSummary {
    pub captured: Vec<i64>,
    /// IDs without usable coordinates in the dataset.
    pub skipped: Vec<i64>,
    /// IDs whose capture failed.
    pub failed: Vec<i64>,
}

/// Capture a map screenshot for every ID, in the order given.
pub fn capture_parcels<I, C>(
    ids: I,
    table: &Table,
    capturer: &mut C,
    config: &CaptureConfig,
) -> CaptureSummary
where
    I: IntoIterator<Item = i64>,
    C: ScreenshotCapture + ?Sized,
{
    let mut summary = CaptureSummary::default();

    for land_id in ids {
        let Some(at) = geo::lookup(table, &config.geo, land_id) else {
            summary.skipped.push(land_id);
            continue;
        };

        let request = config.request_for(land_id, at);
        tracing::info!(land_id, url = %request.url, "capturing parcel map");
        match capturer.capture(&request) {
            Ok(()) => summary.captured.push(land_id),
            Err(e) => {
                tracing::error!(land_id, error = %e, "capture failed");
                summary.failed.push(land_id);
            }
        }
    }

    tracing::info!(
        captured = summary.captured.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "capture batch complete"
    );
    summary
}
