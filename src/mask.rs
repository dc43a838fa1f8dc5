//! Mask patterns, penalty scoring, and format/version information.

use rayon::prelude::*;

use crate::capacity::{ECLevel, Version};
use crate::matrix::Matrix;

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// BCH(15,5) generator x^10 + x^8 + x^5 + x^4 + x^2 + x + 1.
const FORMAT_GENERATOR: u32 = 0b101_0011_0111;
const FORMAT_XOR_MASK: u32 = 0x5412;
/// BCH(18,6) generator x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1.
const VERSION_GENERATOR: u32 = 0b1_1111_0010_0101;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    pub const ALL: [Mask; 8] = [Mask(0), Mask(1), Mask(2), Mask(3), Mask(4), Mask(5), Mask(6), Mask(7)];

    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether the module at (`row`, `col`) is inverted by this mask.
    pub fn applies(self, row: usize, col: usize) -> bool {
        let (i, j) = (row, col);
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

/// A masked trial matrix and its penalty.
#[derive(Clone, Debug)]
pub struct MaskCandidate {
    pub mask: Mask,
    pub matrix: Matrix,
    pub penalty: i32,
}

/// The 15-bit format information codeword: 2 EC bits, 3 mask bits, 10 BCH
/// bits, XOR-ed with the fixed mask.
pub fn format_bits(ec_level: ECLevel, mask: Mask) -> u16 {
    let data = u32::from((ec_level.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
    }
    (((data << 10) | rem) ^ FORMAT_XOR_MASK) as u16
}

/// The 18-bit version information codeword: 6 version bits and 12 BCH bits.
pub fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
    }
    (ver << 12) | rem
}

fn get_bit(x: u32, i: usize) -> bool {
    (x >> i) & 1 != 0
}

/// XORs every data module with `mask`; function modules are untouched.
pub fn apply_mask(matrix: &mut Matrix, mask: Mask) {
    for row in 0..matrix.size() {
        for col in 0..matrix.size() {
            if mask.applies(row, col) {
                matrix.toggle_data(row, col);
            }
        }
    }
}

/// Writes both copies of the format information.
pub fn draw_format_bits(matrix: &mut Matrix, ec_level: ECLevel, mask: Mask) {
    let bits = u32::from(format_bits(ec_level, mask));
    let size = matrix.size();

    // Around the top-left finder
    for i in 0..6 {
        matrix.set_reserved(i, 8, get_bit(bits, i));
    }
    matrix.set_reserved(7, 8, get_bit(bits, 6));
    matrix.set_reserved(8, 8, get_bit(bits, 7));
    matrix.set_reserved(8, 7, get_bit(bits, 8));
    for i in 9..15 {
        matrix.set_reserved(8, 14 - i, get_bit(bits, i));
    }

    // Split between the top-right and bottom-left finders
    for i in 0..8 {
        matrix.set_reserved(8, size - 1 - i, get_bit(bits, i));
    }
    for i in 8..15 {
        matrix.set_reserved(size - 15 + i, 8, get_bit(bits, i));
    }
    matrix.set_reserved(size - 8, 8, true);
}

/// Writes both copies of the version information (versions 7 and up).
pub fn draw_version_bits(matrix: &mut Matrix, version: Version) {
    if version.value() < 7 {
        return;
    }
    let bits = version_bits(version);
    let size = matrix.size();
    for i in 0..18 {
        let bit = get_bit(bits, i);
        let a = size - 11 + i % 3;
        let b = i / 3;
        matrix.set_reserved(b, a, bit);
        matrix.set_reserved(a, b, bit);
    }
}

/// Applies `mask` to a copy of `matrix`, draws the matching format bits and
/// scores the result.
pub fn evaluate(matrix: &Matrix, ec_level: ECLevel, mask: Mask) -> MaskCandidate {
    let mut trial = matrix.clone();
    apply_mask(&mut trial, mask);
    draw_format_bits(&mut trial, ec_level, mask);
    let penalty = penalty_score(&trial);
    tracing::trace!(mask = mask.value(), penalty, "mask candidate scored");
    MaskCandidate {
        mask,
        matrix: trial,
        penalty,
    }
}

/// Tries all 8 masks and keeps the lowest-penalty candidate.
pub fn finalize(matrix: Matrix, ec_level: ECLevel, version: Version) -> MaskCandidate {
    finalize_with(matrix, ec_level, version, None, true)
}

/// Like [`finalize`], with an optional fixed mask and a choice between
/// scoring candidates on the rayon pool or sequentially.
///
/// Ties go to the lowest mask id: a candidate only replaces the incumbent
/// with a strictly lower penalty.
pub fn finalize_with(
    mut matrix: Matrix,
    ec_level: ECLevel,
    version: Version,
    fixed: Option<Mask>,
    parallel: bool,
) -> MaskCandidate {
    draw_version_bits(&mut matrix, version);
    if let Some(mask) = fixed {
        return evaluate(&matrix, ec_level, mask);
    }

    let candidates: Vec<MaskCandidate> = if parallel {
        Mask::ALL[..]
            .par_iter()
            .map(|&mask| evaluate(&matrix, ec_level, mask))
            .collect()
    } else {
        Mask::ALL
            .iter()
            .map(|&mask| evaluate(&matrix, ec_level, mask))
            .collect()
    };

    let mut best: Option<MaskCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(b) if candidate.penalty >= b.penalty => {}
            _ => best = Some(candidate),
        }
    }
    let best = best.unwrap_or_else(|| unreachable!("eight candidates were scored"));
    tracing::debug!(mask = best.mask.value(), penalty = best.penalty, "mask selected");
    best
}

/// Sum of the four penalty rules over the whole matrix.
pub fn penalty_score(matrix: &Matrix) -> i32 {
    let size = matrix.size();
    let grid: Vec<bool> = (0..size).flat_map(|r| matrix.row(r)).collect();
    let at = |row: usize, col: usize| grid[row * size + col];

    let mut result: i32 = 0;
    for row in 0..size {
        result += score_line(size, (0..size).map(|col| at(row, col)));
    }
    for col in 0..size {
        result += score_line(size, (0..size).map(|row| at(row, col)));
    }

    result += block_penalty(size, &grid);
    result + balance_penalty(grid.iter().filter(|&&d| d).count(), size * size)
}

/// Rule 2: every 2×2 block of one color, overlapping blocks included.
fn block_penalty(size: usize, grid: &[bool]) -> i32 {
    let at = |row: usize, col: usize| grid[row * size + col];
    let mut result: i32 = 0;
    for row in 0..size.saturating_sub(1) {
        for col in 0..size - 1 {
            let color = at(row, col);
            if color == at(row, col + 1) && color == at(row + 1, col) && color == at(row + 1, col + 1) {
                result += PENALTY_N2;
            }
        }
    }
    result
}

/// Rule 1 (same-color runs of five or more) and rule 3 (finder-like
/// 1:1:3:1:1 patterns) along one row or column.
fn score_line(size: usize, line: impl Iterator<Item = bool>) -> i32 {
    let mut result: i32 = 0;
    let mut runcolor = false;
    let mut runlen: i32 = 0;
    let mut history = RunHistory::new(size);
    for color in line {
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            history.push(runlen);
            if !runcolor {
                result += history.count_patterns() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + history.terminate_and_count(runcolor, runlen) * PENALTY_N3
}

/// Rule 4: 10 points per 5% step that the dark proportion sits away from 50%,
/// measured from whichever neighboring multiple of 5 is closer to 50.
fn balance_penalty(dark: usize, total: usize) -> i32 {
    let percent = (dark * 100 / total) as i32;
    let prev = percent - percent % 5;
    let next = prev + 5;
    let steps = ((prev - 50).abs() / 5).min((next - 50).abs() / 5);
    steps * PENALTY_N4
}

/// The last seven run lengths on a line, newest first; the area outside the
/// symbol counts as a light run of `size` modules.
struct RunHistory {
    qr_size: i32,
    run_history: [i32; 7],
}

impl RunHistory {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn push(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size;
        }
        let len = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Counts a dark:light:dark(3):light:dark window once per side that has
    /// a light margin of at least 4 units, provided the other side has at
    /// least 1. A pattern with wide margins on both sides counts twice.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n) + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        // Close a trailing dark run, then add the light border beyond the edge
        if currentruncolor {
            self.push(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size;
        self.push(currentrunlength);
        self.count_patterns()
    }
}
