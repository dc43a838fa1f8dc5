//! The encode pipeline and the finished symbol.
//!
//! Text flows one way: segment, version selection, codeword assembly,
//! Reed-Solomon and interleaving, matrix construction, placement, and
//! finally masking with format/version information.

use crate::capacity::{select_version, CapacityEntry, ECLevel, Version};
use crate::codewords::{assemble, EncodingPlan};
use crate::error::QrError;
use crate::interleave::interleave;
use crate::mask::{finalize_with, Mask};
use crate::matrix::Matrix;
use crate::placement::place;
use crate::segment::{Mode, Segment};

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use qrforge::{encode, ECLevel};
///
/// let qr = encode("HELLO WORLD", ECLevel::Q).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrSymbol {
    version: Version,
    ec_level: ECLevel,
    mask: Mask,
    mode: Mode,
    matrix: Matrix,
}

impl QrSymbol {
    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the error correction level written into the format information.
    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    /// Returns the mask chosen for this symbol.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the mode the payload was encoded in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> usize {
        self.matrix.size()
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules.
    /// Coordinates outside the symbol are light.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.matrix.get(row, col)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> Matrix {
        self.matrix
    }
}

/// Encoder settings.
///
/// ```rust
/// use qrforge::{EncodeOptions, ECLevel, Mask};
///
/// let options = EncodeOptions::new()
///     .ec_level(ECLevel::H)
///     .version_range(2, 10)
///     .mask(Some(Mask::new(3)));
/// let qr = qrforge::encode_with("https://example.com", &options).unwrap();
/// assert!(qr.version().value() >= 2);
/// assert_eq!(qr.mask(), Mask::new(3));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodeOptions {
    ec_level: ECLevel,
    min_version: u8,
    max_version: u8,
    mask: Option<Mask>,
    boost_ecl: bool,
    parallel_masks: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ec_level: ECLevel::M,
            min_version: Version::MIN.value(),
            max_version: Version::MAX.value(),
            mask: None,
            boost_ecl: false,
            parallel_masks: true,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ec_level(mut self, ec_level: ECLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    /// Restricts version selection to `min..=max`. Checked at encode time.
    pub fn version_range(mut self, min: u8, max: u8) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    /// `None` picks the lowest-penalty mask; `Some` forces one.
    pub fn mask(mut self, mask: Option<Mask>) -> Self {
        self.mask = mask;
        self
    }

    /// Raise the EC level as far as the chosen version still allows.
    pub fn boost_ecl(mut self, boost: bool) -> Self {
        self.boost_ecl = boost;
        self
    }

    /// Score the 8 mask candidates on the rayon pool instead of in turn.
    pub fn parallel_masks(mut self, parallel: bool) -> Self {
        self.parallel_masks = parallel;
        self
    }

    fn versions(&self) -> Result<(Version, Version), QrError> {
        let invalid = QrError::InvalidVersionRange {
            min: self.min_version,
            max: self.max_version,
        };
        let min = Version::try_new(self.min_version).ok_or_else(|| invalid.clone())?;
        let max = Version::try_new(self.max_version).ok_or_else(|| invalid.clone())?;
        if min > max {
            return Err(invalid);
        }
        Ok((min, max))
    }
}

/// Encodes `input` at `ec_level` into the smallest symbol that holds it.
///
/// # Errors
///
/// [`QrError::InputTooLarge`] if no version up to 40 has room.
pub fn encode(input: &str, ec_level: ECLevel) -> Result<QrSymbol, QrError> {
    encode_with(input, &EncodeOptions::new().ec_level(ec_level))
}

/// Encodes `input` with explicit options.
pub fn encode_with(input: &str, options: &EncodeOptions) -> Result<QrSymbol, QrError> {
    let segment = Segment::encode(input)?;
    encode_segment(&segment, options)
}

/// Encodes raw bytes, always in byte mode.
pub fn encode_bytes(data: &[u8], options: &EncodeOptions) -> Result<QrSymbol, QrError> {
    encode_segment(&Segment::make_bytes(data), options)
}

/// Runs the pipeline for one prepared segment.
pub fn encode_segment(segment: &Segment, options: &EncodeOptions) -> Result<QrSymbol, QrError> {
    let (minversion, maxversion) = options.versions()?;
    let mut entry = select_version(
        segment.mode(),
        segment.num_chars(),
        options.ec_level,
        segment.bit_len(),
        minversion,
        maxversion,
    )?;

    // Increase the error correction level while the data still fits
    if options.boost_ecl {
        let needed = segment.total_bits(entry.version).unwrap_or(usize::MAX);
        for newecl in [ECLevel::M, ECLevel::Q, ECLevel::H] {
            let candidate = CapacityEntry::get(entry.version, newecl);
            if newecl > entry.ec_level && needed <= candidate.data_bits {
                entry = candidate;
            }
        }
    }

    let plan = EncodingPlan::new(segment.mode(), entry);
    tracing::debug!(
        mode = ?plan.mode,
        version = plan.version.value(),
        ec_level = ?plan.ec_level,
        data_bits = segment.bit_len(),
        "encoding plan selected"
    );

    let datacodewords = assemble(&plan, segment);
    let allcodewords = interleave(entry, &datacodewords);

    let mut matrix = Matrix::build(plan.version)?;
    place(&mut matrix, &allcodewords);
    let best = finalize_with(
        matrix,
        plan.ec_level,
        plan.version,
        options.mask,
        options.parallel_masks,
    );

    Ok(QrSymbol {
        version: plan.version,
        ec_level: plan.ec_level,
        mask: best.mask,
        mode: plan.mode,
        matrix: best.matrix,
    })
}
