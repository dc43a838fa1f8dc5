use crate::segment::Mode;

/// Errors returned by the encoder.
///
/// Ways to handle [`QrError::InputTooLarge`]:
///
/// - Decrease the error correction level if it was greater than `ECLevel::L`.
/// - Widen the version range if it was narrower than 1..=40.
/// - Change the text to fit a cheaper mode (e.g. uppercase for alphanumeric).
/// - Shorten the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QrError {
    /// A character is outside the alphabet of the mode it is being encoded in.
    #[error("character {ch:?} cannot be encoded in {mode:?} mode")]
    InvalidCharacterForMode { ch: char, mode: Mode },

    /// No version in the allowed range has room for the data.
    #[error("data length = {needed_bits} bits, max capacity = {capacity_bits} bits")]
    InputTooLarge { needed_bits: usize, capacity_bits: usize },

    /// The alignment table has no row for this version.
    #[error("no alignment pattern positions for version {0}")]
    AlignmentPatternNotFound(u8),

    /// The requested version bounds are reversed or outside 1..=40.
    #[error("invalid version range {min}..={max}")]
    InvalidVersionRange { min: u8, max: u8 },
}

/// Errors from the raster and file rendering helpers.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("image of {modules} modules with border {border} at {module_px} px per module is too large")]
    DimensionsTooLarge { modules: usize, border: usize, module_px: u32 },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
