//! Show requests: where to spawn, and what pattern to draw.

use glam::{Vec2, Vec3, Vec4};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One drawn pixel of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternCell {
    /// Column in the source grid.
    pub x: i32,
    /// Row in the source grid, increasing upward.
    pub y: i32,
    /// RGBA, 8 bits per channel.
    pub color: [u8; 4],
}

impl PatternCell {
    /// Create a cell.
    pub fn new(x: i32, y: i32, color: [u8; 4]) -> Self {
        Self { x, y, color }
    }

    /// Color as linear floats in `[0, 1]`.
    pub fn color_f32(&self) -> Vec4 {
        Vec4::new(
            self.color[0] as f32 / 255.0,
            self.color[1] as f32 / 255.0,
            self.color[2] as f32 / 255.0,
            self.color[3] as f32 / 255.0,
        )
    }
}

/// Immutable request to play one show.
///
/// Cells are unique by coordinate. When the same coordinate is supplied more
/// than once, the last cell wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    origin: Vec3,
    cells: Vec<PatternCell>,
    width: u32,
    height: u32,
}

impl Request {
    /// Create a request for a pattern drawn on a `width` x `height` grid.
    pub fn new(origin: Vec3, cells: Vec<PatternCell>, width: u32, height: u32) -> Self {
        let mut index: HashMap<(i32, i32), usize> = HashMap::with_capacity(cells.len());
        let mut unique: Vec<PatternCell> = Vec::with_capacity(cells.len());
        for cell in cells {
            match index.get(&(cell.x, cell.y)) {
                Some(&slot) => unique[slot] = cell,
                None => {
                    index.insert((cell.x, cell.y), unique.len());
                    unique.push(cell);
                }
            }
        }

        Self {
            origin,
            cells: unique,
            width,
            height,
        }
    }

    /// A request with no pattern. Behaviours with a fixed count still play.
    pub fn empty(origin: Vec3) -> Self {
        Self::new(origin, Vec::new(), 0, 0)
    }

    /// World-space spawn point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Pattern cells, unique by coordinate.
    #[inline]
    pub fn cells(&self) -> &[PatternCell] {
        &self.cells
    }

    /// Source grid width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source grid height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Same pattern, different spawn point.
    pub fn with_origin(&self, origin: Vec3) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    /// Grid midpoint in cell coordinates.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    /// Cell position relative to the grid midpoint, in pixels.
    #[inline]
    pub fn centered_offset(&self, cell: &PatternCell) -> Vec2 {
        Vec2::new(cell.x as f32, cell.y as f32) - self.center()
    }

    /// Largest distance of any cell from the grid midpoint, in pixels.
    ///
    /// Zero for an empty pattern.
    pub fn max_radius(&self) -> f32 {
        self.cells
            .iter()
            .map(|c| self.centered_offset(c).length())
            .fold(0.0, f32::max)
    }
}
