//! The module grid and its fixed function patterns.

use crate::capacity::Version;
use crate::error::QrError;

/// State of one grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Module {
    #[default]
    Unset,
    /// Part of a function pattern, format or version area.
    Reserved(bool),
    /// Carries a data or EC bit.
    Data(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Reserved(true) | Module::Data(true))
    }
}

/// A square grid of modules, stored row-major.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Matrix {
    size: usize,
    modules: Vec<Module>,
}

impl Matrix {
    /// An all-`Unset` grid of `size × size` modules.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![Module::Unset; size * size],
        }
    }

    /// Allocates the grid for `version` and stamps every function pattern.
    pub fn build(version: Version) -> Result<Self, QrError> {
        let mut matrix = Matrix::new(version.size());
        let size = matrix.size;
        matrix.draw_finder_pattern(0, 0);
        matrix.draw_finder_pattern(0, size - 7);
        matrix.draw_finder_pattern(size - 7, 0);
        matrix.draw_alignment_patterns(version)?;
        matrix.draw_timing_patterns();
        matrix.reserve_format_areas();
        if version.value() >= 7 {
            matrix.reserve_version_areas();
        }
        // Dark module at (4 * version + 9, 8)
        matrix.set_reserved(size - 8, 8, true);
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` for a dark module. Out-of-range coordinates are light.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.module(row, col).is_dark()
    }

    pub fn module(&self, row: usize, col: usize) -> Module {
        assert!(row < self.size && col < self.size, "Module coordinates out of range");
        self.modules[row * self.size + col]
    }

    pub fn is_reserved(&self, row: usize, col: usize) -> bool {
        matches!(self.module(row, col), Module::Reserved(_))
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_dark()).count()
    }

    /// Row `row` as dark/light values.
    pub fn row(&self, row: usize) -> impl Iterator<Item = bool> + '_ {
        self.modules[row * self.size..(row + 1) * self.size]
            .iter()
            .map(|m| m.is_dark())
    }

    pub(crate) fn set_data(&mut self, row: usize, col: usize, dark: bool) {
        let cell = &mut self.modules[row * self.size + col];
        debug_assert_eq!(*cell, Module::Unset, "data written over a set module");
        *cell = Module::Data(dark);
    }

    pub(crate) fn toggle_data(&mut self, row: usize, col: usize) {
        let cell = &mut self.modules[row * self.size + col];
        if let Module::Data(dark) = *cell {
            *cell = Module::Data(!dark);
        }
    }

    /// Writes a reserved module. Format and version areas are first reserved
    /// light and later rewritten with their final bits.
    pub(crate) fn set_reserved(&mut self, row: usize, col: usize, dark: bool) {
        let cell = &mut self.modules[row * self.size + col];
        debug_assert!(!matches!(*cell, Module::Data(_)), "reserved write over data");
        *cell = Module::Reserved(dark);
    }

    fn reserve_if_unset(&mut self, row: usize, col: usize, dark: bool) {
        if self.module(row, col) == Module::Unset {
            self.set_reserved(row, col, dark);
        }
    }

    /// 7×7 finder with top-left corner (`top`, `left`) plus its light
    /// separator, clipped at the grid edge.
    fn draw_finder_pattern(&mut self, top: usize, left: usize) {
        let size = self.size as isize;
        for dy in -1isize..=7 {
            for dx in -1isize..=7 {
                let row = top as isize + dy;
                let col = left as isize + dx;
                if !(0..size).contains(&row) || !(0..size).contains(&col) {
                    continue;
                }
                let dist = (dy - 3).abs().max((dx - 3).abs());
                self.set_reserved(row as usize, col as usize, dist != 2 && dist != 4);
            }
        }
    }

    fn draw_alignment_patterns(&mut self, version: Version) -> Result<(), QrError> {
        let positions = alignment_pattern_positions(version)?;
        let last = self.size - 1;
        for &row in positions {
            for &col in positions {
                let (row, col) = (usize::from(row), usize::from(col));
                // Skip centers whose 5×5 pattern would reach a finder's 8×8 zone.
                let near_top = row - 2 < 8;
                let near_left = col - 2 < 8;
                let near_bottom = row + 2 > last - 8;
                let near_right = col + 2 > last - 8;
                if (near_top && near_left) || (near_top && near_right) || (near_bottom && near_left) {
                    continue;
                }
                for dy in 0..5usize {
                    for dx in 0..5usize {
                        let dist = dy.abs_diff(2).max(dx.abs_diff(2));
                        self.set_reserved(row + dy - 2, col + dx - 2, dist != 1);
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_timing_patterns(&mut self) {
        for i in 8..self.size - 8 {
            self.reserve_if_unset(6, i, i % 2 == 0);
            self.reserve_if_unset(i, 6, i % 2 == 0);
        }
    }

    fn reserve_format_areas(&mut self) {
        let size = self.size;
        for i in 0..9 {
            self.reserve_if_unset(8, i, false);
            self.reserve_if_unset(i, 8, false);
        }
        for i in 0..8 {
            self.reserve_if_unset(8, size - 1 - i, false);
        }
        for i in 0..7 {
            self.reserve_if_unset(size - 1 - i, 8, false);
        }
    }

    fn reserve_version_areas(&mut self) {
        let size = self.size;
        for i in 0..18 {
            let a = size - 11 + i % 3;
            let b = i / 3;
            self.set_reserved(b, a, false);
            self.set_reserved(a, b, false);
        }
    }
}

/// Alignment pattern center coordinates for `version`, ascending.
pub fn alignment_pattern_positions(version: Version) -> Result<&'static [u8], QrError> {
    ALIGNMENT_PATTERN_POSITIONS
        .get(usize::from(version.value()))
        .copied()
        .ok_or(QrError::AlignmentPatternNotFound(version.value()))
}

#[rustfmt::skip]
static ALIGNMENT_PATTERN_POSITIONS: [&[u8]; 41] = [
    &[],
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::raw_data_modules;

    fn unset_count(m: &Matrix) -> usize {
        let mut n = 0;
        for r in 0..m.size() {
            for c in 0..m.size() {
                if m.module(r, c) == Module::Unset {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_finder_and_separator() {
        let m = Matrix::build(Version::new(1)).unwrap();
        assert_eq!(m.size(), 21);
        let expected = [
            "11111110",
            "10000010",
            "10111010",
            "10111010",
            "10111010",
            "10000010",
            "11111110",
            "00000000",
        ];
        for (r, line) in expected.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                assert_eq!(m.get(r, c), ch == '1', "({}, {})", r, c);
                assert!(m.is_reserved(r, c));
                // Mirror images at the other two corners
                assert_eq!(m.get(r, 20 - c), ch == '1');
                assert_eq!(m.get(20 - r, c), ch == '1');
            }
        }
    }

    #[test]
    fn test_timing_and_dark_module() {
        let m = Matrix::build(Version::new(2)).unwrap();
        for i in 8..m.size() - 8 {
            assert_eq!(m.get(6, i), i % 2 == 0);
            assert_eq!(m.get(i, 6), i % 2 == 0);
        }
        assert!(m.get(4 * 2 + 9, 8));
        assert!(m.is_reserved(4 * 2 + 9, 8));
    }

    #[test]
    fn test_alignment_pattern_version_2() {
        let m = Matrix::build(Version::new(2)).unwrap();
        // Single pattern centered at (18, 18)
        assert!(m.get(18, 18));
        assert!(!m.get(17, 18));
        assert!(!m.get(19, 19));
        assert!(m.get(16, 16));
        assert!(m.get(20, 18));
        assert!(m.is_reserved(16, 20));
    }

    #[test]
    fn test_alignment_skips_finder_corners() {
        let m = Matrix::build(Version::new(7)).unwrap();
        // (6, 22) sits on the timing row between finders and is kept
        assert!(m.get(6, 22));
        assert!(!m.get(5, 22));
        assert!(m.get(4, 22));
        // A pattern at (6, 38) would have put its light ring over the finder
        assert!(m.get(5, 38));
        assert!(m.get(38, 5));
    }

    #[test]
    fn test_positions_match_formula() {
        for ver in Version::MIN.through(Version::MAX) {
            let v = ver.value();
            let expected: Vec<u8> = if v == 1 {
                Vec::new()
            } else {
                let numalign = v / 7 + 2;
                let step = if v == 32 { 26 } else { ((v * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2 };
                let size = ver.size() as u8;
                let mut r: Vec<u8> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
                r.push(6);
                r.reverse();
                r
            };
            assert_eq!(alignment_pattern_positions(ver).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn test_unreserved_modules_match_raw_capacity() {
        for v in [1u8, 2, 6, 7, 14, 21, 32, 40] {
            let ver = Version::new(v);
            let m = Matrix::build(ver).unwrap();
            assert_eq!(unset_count(&m), raw_data_modules(ver), "version {}", v);
        }
    }

    #[test]
    fn test_version_areas_reserved_from_7() {
        let m6 = Matrix::build(Version::new(6)).unwrap();
        assert!(!m6.is_reserved(0, m6.size() - 11));
        let m7 = Matrix::build(Version::new(7)).unwrap();
        let s = m7.size();
        assert!(m7.is_reserved(0, s - 11));
        assert!(m7.is_reserved(5, s - 9));
        assert!(m7.is_reserved(s - 11, 0));
        assert!(m7.is_reserved(s - 9, 5));
    }
}
