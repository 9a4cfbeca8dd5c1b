//! Image decoding and annotation helpers.

use std::io::Cursor;

use image::{ImageReader, Rgba};

use roadwatch_core::geometry::MeasuredDetection;

use crate::provider::InferenceError;

const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BOX_THICKNESS: u32 = 2;

/// Read the pixel dimensions of an encoded image without fully decoding it.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), InferenceError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InferenceError::Image(e.to_string()))?;
    reader
        .into_dimensions()
        .map_err(|e| InferenceError::Image(e.to_string()))
}

/// Draw a hollow rectangle around each detection and re-encode as PNG.
pub fn annotate(bytes: &[u8], detections: &[MeasuredDetection]) -> Result<Vec<u8>, InferenceError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InferenceError::Image(e.to_string()))?;
    let mut img = reader
        .decode()
        .map_err(|e| InferenceError::Image(e.to_string()))?
        .into_rgba8();

    let (img_w, img_h) = img.dimensions();
    for det in detections {
        let [x1, y1, x2, y2] = det.bbox;
        let x1 = x1.max(0.0) as u32;
        let y1 = y1.max(0.0) as u32;
        let x2 = (x2.max(0.0) as u32).min(img_w.saturating_sub(1));
        let y2 = (y2.max(0.0) as u32).min(img_h.saturating_sub(1));
        if x2 <= x1 || y2 <= y1 {
            continue;
        }
        draw_hollow_rect(&mut img, x1, y1, x2, y2);
    }

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| InferenceError::Image(e.to_string()))?;
    Ok(out)
}

fn draw_hollow_rect(img: &mut image::RgbaImage, x1: u32, y1: u32, x2: u32, y2: u32) {
    let (img_w, img_h) = img.dimensions();
    for t in 0..BOX_THICKNESS {
        for x in x1..=x2 {
            let top = y1.saturating_add(t);
            let bottom = y2.saturating_sub(t);
            if top < img_h {
                img.put_pixel(x, top, BOX_COLOR);
            }
            if bottom < img_h {
                img.put_pixel(x, bottom, BOX_COLOR);
            }
        }
        for y in y1..=y2 {
            let left = x1.saturating_add(t);
            let right = x2.saturating_sub(t);
            if left < img_w {
                img.put_pixel(left, y, BOX_COLOR);
            }
            if right < img_w {
                img.put_pixel(right, y, BOX_COLOR);
            }
        }
    }
}
