//! Pixel-to-area conversion for pothole detections.
//!
//! The scale model is deliberately simple: a road lane is assumed to span the
//! full image width at a fixed real-world width of [`LANE_WIDTH_M`] meters,
//! viewed flat and perpendicular. No perspective correction is applied -- this
//! is a known approximation, kept behind [`meters_per_pixel`] so a calibrated
//! camera model can replace it without touching classification or costing.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Assumed real-world lane width spanned by the image, in meters.
pub const LANE_WIDTH_M: f64 = 3.5;

/// Default distance-adjustment factor (no camera distance/tilt correction).
pub const DEFAULT_DISTANCE_FACTOR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One candidate pothole instance as returned by the detection gateway.
///
/// The box is center-form: `(x, y)` is the box center in pixels and
/// `width`/`height` are the box extents in pixels. Confidence is 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

/// A detection with its corner-form pixel box and computed physical area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasuredDetection {
    /// `[x1, y1, x2, y2]` pixel corners (top-left, bottom-right).
    pub bbox: [f64; 4],
    pub confidence: f64,
    pub area_m2: f64,
}

/// Per-image summary derived from all detections.
///
/// Invariants: `total_area_m2` is the sum of per-detection areas and
/// `mean_confidence` is the arithmetic mean over detections, defined as 0.0
/// when there are none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub count: u32,
    pub total_area_m2: f64,
    pub mean_confidence: f64,
    pub detections: Vec<MeasuredDetection>,
}

impl AggregateResult {
    /// The zero-detection aggregate: count 0, area 0.0, confidence 0.0.
    pub fn empty() -> Self {
        Self {
            count: 0,
            total_area_m2: 0.0,
            mean_confidence: 0.0,
            detections: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Linear scale factor in meters per pixel.
///
/// `distance_factor` is a caller-supplied correction for camera distance or
/// tilt; 1.0 means no correction.
pub fn meters_per_pixel(image_width_px: u32, distance_factor: f64) -> f64 {
    (LANE_WIDTH_M / image_width_px as f64) * distance_factor
}

/// Physical area of one box: `(width_px * scale) * (height_px * scale)`.
pub fn box_area_m2(width_px: f64, height_px: f64, scale: f64) -> f64 {
    (width_px * scale) * (height_px * scale)
}

/// Measure every detection and aggregate into a per-image summary.
///
/// Zero detections is not an error: the result is [`AggregateResult::empty`].
pub fn aggregate(
    detections: &[Detection],
    image_width_px: u32,
    distance_factor: f64,
) -> AggregateResult {
    if detections.is_empty() {
        return AggregateResult::empty();
    }

    let scale = meters_per_pixel(image_width_px, distance_factor);

    let mut measured = Vec::with_capacity(detections.len());
    let mut total_area_m2 = 0.0;
    let mut confidence_sum = 0.0;

    for det in detections {
        let area_m2 = box_area_m2(det.width, det.height, scale);
        let x1 = det.x - det.width / 2.0;
        let y1 = det.y - det.height / 2.0;
        let x2 = det.x + det.width / 2.0;
        let y2 = det.y + det.height / 2.0;

        measured.push(MeasuredDetection {
            bbox: [x1, y1, x2, y2],
            confidence: det.confidence,
            area_m2,
        });

        total_area_m2 += area_m2;
        confidence_sum += det.confidence;
    }

    AggregateResult {
        count: detections.len() as u32,
        total_area_m2,
        mean_confidence: confidence_sum / detections.len() as f64,
        detections: measured,
    }
}
