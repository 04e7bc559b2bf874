use crate::{
    constants::{AVAILABLE_COLOR, UNAVAILABLE_COLOR},
    error::{AvailabilityError, Result},
    grid::AvailabilityGrid,
};
use image::{Rgb, RgbImage};
use log::info;

/// Binary availability matrix: rows are hotels, columns are dates, both in
/// grid order. A cell is `true` iff its stored count is greater than zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl HeatmapMask {
    pub fn from_grid(grid: &AvailabilityGrid) -> Self {
        let cols = grid.dates.len();
        let cells = grid
            .rows
            .iter()
            .flat_map(|row| {
                // Rows are always axis-aligned; pad defensively if one is short.
                (0..cols).map(move |c| row.cells.get(c).copied().flatten().unwrap_or(0) > 0)
            })
            .collect();

        Self {
            rows: grid.rows.len(),
            cols,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn is_available(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// One pixel per cell: width = dates, height = hotels.
    pub fn to_image(&self, palette: &Palette) -> RgbImage {
        RgbImage::from_fn(self.cols as u32, self.rows as u32, |x, y| {
            palette.color(self.is_available(y as usize, x as usize))
        })
    }
}

/// Two-colour palette for the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub unavailable: Rgb<u8>,
    pub available: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            unavailable: UNAVAILABLE_COLOR,
            available: AVAILABLE_COLOR,
        }
    }
}

impl Palette {
    #[inline]
    pub fn color(&self, available: bool) -> Rgb<u8> {
        if available {
            self.available
        } else {
            self.unavailable
        }
    }
}

/// Encode the grid as a heatmap of `target = (width, height)` pixels.
///
/// Returns `Ok(None)` when the grid has no hotels or no dates, in which case
/// no image should be written.
pub fn encode(grid: &AvailabilityGrid, target: (u32, u32)) -> Result<Option<RgbImage>> {
    encode_with_palette(grid, target, &Palette::default())
}

pub fn encode_with_palette(
    grid: &AvailabilityGrid,
    target: (u32, u32),
    palette: &Palette,
) -> Result<Option<RgbImage>> {
    let mask = HeatmapMask::from_grid(grid);
    if mask.is_empty() {
        info!("No data to render for PNG; skipping.");
        return Ok(None);
    }

    let (width, height) = target;
    if width == 0 || height == 0 {
        return Err(AvailabilityError::InvalidImageSize { width, height });
    }

    let natural = mask.to_image(palette);
    Ok(Some(resize_nearest(&natural, width, height)))
}

/// Nearest-neighbour resample sampling each target pixel at its centre, so
/// every cell stays a hard-edged block with no blending between neighbours.
fn resize_nearest(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let sx = nearest_index(x, width, src_w);
        let sy = nearest_index(y, height, src_h);
        *src.get_pixel(sx, sy)
    })
}

#[inline]
fn nearest_index(dst: u32, dst_len: u32, src_len: u32) -> u32 {
    // floor((dst + 0.5) * src_len / dst_len) in integer arithmetic
    let idx = ((2 * u64::from(dst) + 1) * u64::from(src_len)) / (2 * u64::from(dst_len));
    (idx as u32).min(src_len - 1)
}
