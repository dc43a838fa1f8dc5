//! Zigzag placement of the codeword stream into the unreserved modules.

use crate::matrix::{Matrix, Module};

/// Walk state over the grid in placement order.
///
/// Starts at the bottom-right corner and climbs two-module-wide columns,
/// right module first, reversing direction at the top and bottom edges and
/// skipping the vertical timing column.
#[derive(Clone, Debug)]
pub struct PlacementCursor {
    size: usize,
    row: usize,
    /// Right-hand column of the current pair.
    col: usize,
    upward: bool,
    right_half: bool,
    done: bool,
}

impl PlacementCursor {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            row: size - 1,
            col: size - 1,
            upward: true,
            right_half: true,
            done: size == 0,
        }
    }

    fn advance(&mut self) {
        if self.right_half {
            self.right_half = false;
            return;
        }
        self.right_half = true;
        let at_edge = if self.upward { self.row == 0 } else { self.row == self.size - 1 };
        if !at_edge {
            if self.upward {
                self.row -= 1;
            } else {
                self.row += 1;
            }
            return;
        }
        // Move to the next column pair, hopping over the timing column.
        self.upward = !self.upward;
        if self.col < 2 {
            self.done = true;
            return;
        }
        self.col -= 2;
        if self.col == 6 {
            self.col = 5;
        }
    }
}

impl Iterator for PlacementCursor {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.done {
            return None;
        }
        let pos = if self.right_half {
            (self.row, self.col)
        } else {
            (self.row, self.col - 1)
        };
        self.advance();
        Some(pos)
    }
}

/// Writes `codewords` MSB first into every `Unset` module in zigzag order.
///
/// Modules left over once the stream is exhausted are the remainder bits
/// (0 to 7 of them, depending on version) and are set light.
///
/// # Panics
///
/// Panics if the stream does not fit the free modules exactly.
pub fn place(matrix: &mut Matrix, codewords: &[u8]) {
    let totalbits = codewords.len() * 8;
    let mut i: usize = 0;
    let mut remainder: usize = 0;
    for (row, col) in PlacementCursor::new(matrix.size()) {
        if matrix.module(row, col) != Module::Unset {
            continue;
        }
        if i < totalbits {
            let bit = (codewords[i >> 3] >> (7 - (i & 7))) & 1 != 0;
            matrix.set_data(row, col, bit);
            i += 1;
        } else {
            matrix.set_data(row, col, false);
            remainder += 1;
        }
    }
    assert_eq!(i, totalbits, "Codeword stream longer than the free modules");
    assert!(remainder < 8, "Codeword stream ran out {} modules early", remainder);
    tracing::trace!(bits = i, remainder, "codewords placed");
}
