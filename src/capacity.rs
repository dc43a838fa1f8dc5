//! Per-version, per-level block layout and the smallest-version search.

use crate::error::QrError;
use crate::segment::Mode;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ECLevel {
    /// Tolerates ~7% erroneous codewords.
    L,
    /// Tolerates ~15% erroneous codewords.
    M,
    /// Tolerates ~25% erroneous codewords.
    Q,
    /// Tolerates ~30% erroneous codewords.
    H,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    /// Table row index, in order of increasing redundancy.
    pub const fn ordinal(self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }

    /// The 2-bit value written into the format information.
    pub const fn format_bits(self) -> u8 {
        match self {
            ECLevel::L => 1,
            ECLevel::M => 0,
            ECLevel::Q => 3,
            ECLevel::H => 2,
        }
    }

    /// Inverse of [`ECLevel::format_bits`].
    pub const fn from_format_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(ECLevel::L),
            0 => Some(ECLevel::M),
            3 => Some(ECLevel::Q),
            2 => Some(ECLevel::H),
            _ => None,
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Checked counterpart of [`Version::new`].
    pub const fn try_new(ver: u8) -> Option<Self> {
        if Version::MIN.value() <= ver && ver <= Version::MAX.value() {
            Some(Self(ver))
        } else {
            None
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length in modules: `4 * version + 17`.
    pub const fn size(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// Versions from `self` through `last`, ascending.
    pub fn through(self, last: Version) -> impl Iterator<Item = Version> {
        (self.0..=last.0).map(Version)
    }
}

/// `block_count` blocks, each carrying `data_codewords` data codewords.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockGroup {
    pub block_count: usize,
    pub data_codewords: usize,
}

/// One row of the capacity table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CapacityEntry {
    pub version: Version,
    pub ec_level: ECLevel,
    /// Total data capacity in bits (always a whole number of codewords).
    pub data_bits: usize,
    /// EC codewords appended to every block.
    pub ec_per_block: usize,
    pub group1: BlockGroup,
    /// Blocks one codeword longer than group 1's, if any.
    pub group2: Option<BlockGroup>,
}

impl CapacityEntry {
    /// Looks up the layout for `version` at `ec_level`.
    pub fn get(version: Version, ec_level: ECLevel) -> &'static CapacityEntry {
        &CAPACITY_TABLE[usize::from(version.value()) - 1][ec_level.ordinal()]
    }

    pub fn data_codewords(&self) -> usize {
        self.data_bits / 8
    }

    pub fn num_blocks(&self) -> usize {
        self.group1.block_count + self.group2.map_or(0, |g| g.block_count)
    }

    /// Data plus EC codewords; what the placer must lay out.
    pub fn total_codewords(&self) -> usize {
        self.data_codewords() + self.num_blocks() * self.ec_per_block
    }

    /// Group descriptors in transmission order.
    pub fn groups(&self) -> impl Iterator<Item = BlockGroup> {
        std::iter::once(self.group1).chain(self.group2)
    }
}

/// Number of modules available for data and EC bits, remainder bits included.
pub const fn raw_data_modules(ver: Version) -> usize {
    let ver = ver.value() as usize;
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

const fn entry(ver: u8, ecl: ECLevel) -> CapacityEntry {
    let version = Version::new(ver);
    let ec_per_block = ECC_CODEWORDS_PER_BLOCK[ecl.ordinal()][ver as usize] as usize;
    let numblocks = NUM_ERROR_CORRECTION_BLOCKS[ecl.ordinal()][ver as usize] as usize;
    let rawcodewords = raw_data_modules(version) / 8;
    let numlongblocks = rawcodewords % numblocks;
    let shortblockdatalen = rawcodewords / numblocks - ec_per_block;
    let group1 = BlockGroup {
        block_count: numblocks - numlongblocks,
        data_codewords: shortblockdatalen,
    };
    let group2 = if numlongblocks == 0 {
        None
    } else {
        Some(BlockGroup {
            block_count: numlongblocks,
            data_codewords: shortblockdatalen + 1,
        })
    };
    CapacityEntry {
        version,
        ec_level: ecl,
        data_bits: (rawcodewords - ec_per_block * numblocks) * 8,
        ec_per_block,
        group1,
        group2,
    }
}

const fn build_table() -> [[CapacityEntry; 4]; 40] {
    let placeholder = entry(1, ECLevel::L);
    let mut table = [[placeholder; 4]; 40];
    let mut ver = 1u8;
    while ver <= 40 {
        let mut i = 0;
        while i < 4 {
            table[ver as usize - 1][i] = entry(ver, ECLevel::ALL[i]);
            i += 1;
        }
        ver += 1;
    }
    table
}

/// Indexed by `[version - 1][ec_level.ordinal()]`.
pub static CAPACITY_TABLE: [[CapacityEntry; 4]; 40] = build_table();

/// Finds the smallest version in `min..=max` whose data capacity at `ec_level`
/// holds the mode indicator, count indicator and `data_bits` of payload.
pub fn select_version(
    mode: Mode,
    numchars: usize,
    ec_level: ECLevel,
    data_bits: usize,
    min: Version,
    max: Version,
) -> Result<&'static CapacityEntry, QrError> {
    let mut needed_bits = 0;
    for version in min.through(max) {
        let ccbits = mode.num_char_count_bits(version);
        needed_bits = 4 + usize::from(ccbits) + data_bits;
        let capacity = CapacityEntry::get(version, ec_level);
        if numchars < (1usize << ccbits) && needed_bits <= capacity.data_bits {
            return Ok(capacity);
        }
    }
    Err(QrError::InputTooLarge {
        needed_bits,
        capacity_bits: CapacityEntry::get(max, ec_level).data_bits,
    })
}

const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // L
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // M
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Q
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // H
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // L
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // M
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Q
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // H
];
