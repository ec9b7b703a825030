//! Building requests from images.
//!
//! Every pixel whose alpha reaches the threshold becomes one cell. Image rows
//! run top to bottom while cell rows run upward, so rows are flipped.

use std::path::Path;

use glam::Vec3;
use image::RgbaImage;

use crate::error::PatternError;
use crate::request::{PatternCell, Request};

/// Pixels with alpha below this are treated as empty.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// Convert an RGBA image to a request at `origin`.
///
/// Fails with [`PatternError::Empty`] when no pixel reaches `alpha_threshold`.
pub fn request_from_image(
    image: &RgbaImage,
    origin: Vec3,
    alpha_threshold: u8,
) -> Result<Request, PatternError> {
    let (width, height) = image.dimensions();
    let cells: Vec<PatternCell> = image
        .enumerate_pixels()
        .filter(|(_, _, px)| px.0[3] >= alpha_threshold)
        .map(|(x, y, px)| PatternCell::new(x as i32, (height - 1 - y) as i32, px.0))
        .collect();

    if cells.is_empty() {
        return Err(PatternError::Empty { width, height });
    }

    log::debug!("pattern {}x{}: {} cells", width, height, cells.len());
    Ok(Request::new(origin, cells, width, height))
}

/// Load an image file and convert it with [`request_from_image`].
pub fn load_request<P: AsRef<Path>>(
    path: P,
    origin: Vec3,
    alpha_threshold: u8,
) -> Result<Request, PatternError> {
    let bytes = std::fs::read(path.as_ref())?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    request_from_image(&image, origin, alpha_threshold)
}

/// A small built-in smiley, used when no image is supplied.
pub fn smiley(origin: Vec3) -> Request {
    const ROWS: [&str; 9] = [
        "..YYYYY..",
        ".YYYYYYY.",
        "YYBYYYBYY",
        "YYBYYYBYY",
        "YYYYYYYYY",
        "YRYYYYYRY",
        "YYRRRRRYY",
        ".YYYYYYY.",
        "..YYYYY..",
    ];

    let height = ROWS.len() as u32;
    let width = ROWS[0].len() as u32;
    let mut cells = Vec::new();
    for (row, line) in ROWS.iter().enumerate() {
        let y = (height as usize - 1 - row) as i32;
        for (x, ch) in line.chars().enumerate() {
            let color = match ch {
                'Y' => [255, 210, 40, 255],
                'B' => [40, 40, 60, 255],
                'R' => [230, 60, 40, 255],
                _ => continue,
            };
            cells.push(PatternCell::new(x as i32, y, color));
        }
    }
    Request::new(origin, cells, width, height)
}
