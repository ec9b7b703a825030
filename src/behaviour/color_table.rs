//! Weighted color sampling from a drawn pattern.

use glam::Vec4;

use crate::request::Request;
use crate::spawn::SpawnContext;

/// One entry per pattern cell, duplicates kept.
///
/// Sampling uniformly from the table picks each color with probability
/// proportional to how many cells were drawn in it.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<Vec4>,
    fallback: Vec4,
}

impl ColorTable {
    /// Build the table for `request`. `fallback` is used for empty patterns.
    pub fn from_request(request: &Request, fallback: Vec4) -> Self {
        Self {
            entries: request.cells().iter().map(|c| c.color_f32()).collect(),
            fallback,
        }
    }

    /// Number of entries (equal to the cell count).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the pattern had no cells.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw one color.
    pub fn sample(&self, ctx: &mut SpawnContext) -> Vec4 {
        if self.entries.is_empty() {
            return self.fallback;
        }
        self.entries[ctx.random_index(self.entries.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PatternCell;
    use glam::Vec3;

    #[test]
    fn test_entries_are_not_deduplicated() {
        let req = Request::new(
            Vec3::ZERO,
            vec![
                PatternCell::new(0, 0, [255, 0, 0, 255]),
                PatternCell::new(1, 0, [255, 0, 0, 255]),
                PatternCell::new(2, 0, [0, 255, 0, 255]),
            ],
            3,
            1,
        );
        let table = ColorTable::from_request(&req, Vec4::ONE);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_empty_table_uses_fallback() {
        let table = ColorTable::from_request(&Request::empty(Vec3::ZERO), Vec4::ONE);
        let mut ctx = SpawnContext::seeded(0);
        assert!(table.is_empty());
        assert_eq!(table.sample(&mut ctx), Vec4::ONE);
    }
}
