//! Mode detection and payload bit packing.
//!
//! An input string is encoded as exactly one segment, in the cheapest mode whose
//! alphabet covers every character: numeric, then alphanumeric, then Latin-1
//! bytes, then UTF-8 bytes.

use crate::capacity::Version;
use crate::error::QrError;

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Encoding alphabet of a segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Digits `0-9`, three per 10 bits.
    Numeric,
    /// The 45-symbol set `0-9A-Z $%*+-./:`, two per 11 bits.
    Alphanumeric,
    /// One Latin-1 code point (U+0000..=U+00FF) per byte.
    Byte,
    /// Arbitrary text as its UTF-8 byte sequence.
    Utf8,
}

impl Mode {
    /// Picks the cheapest mode able to encode all of `text`.
    ///
    /// An empty string is vacuously numeric.
    pub fn detect(text: &str) -> Self {
        if is_numeric(text) {
            Mode::Numeric
        } else if is_alphanumeric(text) {
            Mode::Alphanumeric
        } else if is_latin1(text) {
            Mode::Byte
        } else {
            Mode::Utf8
        }
    }

    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use Mode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte | Utf8 => 0x4,
        }
    }

    /// Width of the character-count indicator for this mode at `ver`.
    ///
    /// Three bands: versions 1-9, 10-26 and 27-40.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use Mode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte | Utf8 => [8, 16, 16],
        })[usize::from((ver.value() + 7) / 17)]
    }

    fn accepts(self, c: char) -> bool {
        use Mode::*;
        match self {
            Numeric => c.is_ascii_digit(),
            Alphanumeric => ALPHANUMERIC_CHARSET.contains(c),
            Byte => u32::from(c) <= 0xff,
            Utf8 => true,
        }
    }
}

/// An append-only big-endian bit sequence packed into bytes.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(bits.div_ceil(8)),
            length: 0,
        }
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value does not fit in bit width");
        for i in (0..len).rev() {
            let bit = ((val >> i) & 1) as u8;
            let shift = 7 - (self.length & 7);
            if shift == 7 {
                self.data.push(bit << 7);
            } else {
                let last = self.data.len() - 1;
                self.data[last] |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Appends every bit of `other`.
    pub fn extend(&mut self, other: &BitBuffer) {
        for i in 0..other.len() {
            self.append_bits(u32::from(other.bit(i)), 1);
        }
    }

    /// Returns bit `i`, counting from the first bit written.
    pub fn bit(&self, i: usize) -> bool {
        assert!(i < self.length, "Bit index out of range");
        (self.data[i >> 3] >> (7 - (i & 7))) & 1 != 0
    }

    /// The packed bytes; a trailing partial byte is zero-filled.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// One encoded run of input: mode, character count and packed payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Segment {
    mode: Mode,
    numchars: usize,
    bits: BitBuffer,
}

impl Segment {
    /// Encodes `text` in the cheapest mode that covers all of it.
    pub fn encode(text: &str) -> Result<Self, QrError> {
        let mode = Mode::detect(text);
        let seg = Self::encode_in(text, mode)?;
        tracing::trace!(?mode, numchars = seg.numchars, bits = seg.bit_len(), "segment encoded");
        Ok(seg)
    }

    /// Encodes `text` in an explicit mode.
    pub fn encode_in(text: &str, mode: Mode) -> Result<Self, QrError> {
        if let Some(ch) = text.chars().find(|&c| !mode.accepts(c)) {
            return Err(QrError::InvalidCharacterForMode { ch, mode });
        }
        Ok(match mode {
            Mode::Numeric => Self::make_numeric(text),
            Mode::Alphanumeric => Self::make_alphanumeric(text),
            Mode::Byte => {
                let latin1: Vec<u8> = text.chars().map(|c| u32::from(c) as u8).collect();
                Self::from_bytes(Mode::Byte, &latin1)
            }
            Mode::Utf8 => Self::from_bytes(Mode::Utf8, text.as_bytes()),
        })
    }

    /// Wraps raw binary data in a byte-mode segment.
    pub fn make_bytes(data: &[u8]) -> Self {
        Self::from_bytes(Mode::Byte, data)
    }

    fn from_bytes(mode: Mode, data: &[u8]) -> Self {
        let mut bits = BitBuffer::with_capacity(data.len() * 8);
        for &b in data {
            bits.append_bits(u32::from(b), 8);
        }
        Self {
            mode,
            numchars: data.len(),
            bits,
        }
    }

    // Callers have already checked the alphabet.
    fn make_numeric(text: &str) -> Self {
        let mut bits = BitBuffer::with_capacity(text.len() * 10 / 3 + 4);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bits.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        // 2 digits -> 7 bits, 1 digit -> 4 bits
        if accumcount > 0 {
            bits.append_bits(accumdata, accumcount * 3 + 1);
        }
        Self {
            mode: Mode::Numeric,
            numchars: text.len(),
            bits,
        }
    }

    fn make_alphanumeric(text: &str) -> Self {
        let mut bits = BitBuffer::with_capacity(text.len() * 11 / 2 + 6);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let code = ALPHANUMERIC_CHARSET.find(c).unwrap_or_default() as u32;
            accumdata = accumdata * 45 + code;
            accumcount += 1;
            if accumcount == 2 {
                bits.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bits.append_bits(accumdata, 6);
        }
        Self {
            mode: Mode::Alphanumeric,
            numchars: text.chars().count(),
            bits,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Characters for numeric/alphanumeric, bytes for byte/UTF-8.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Payload length in bits, excluding mode and count headers.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Header plus payload bits at `version`, or `None` if the character
    /// count overflows that version's count indicator.
    pub fn total_bits(&self, version: Version) -> Option<usize> {
        let ccbits = self.mode.num_char_count_bits(version);
        if self.numchars >= 1usize << ccbits {
            return None;
        }
        Some(4 + usize::from(ccbits) + self.bits.len())
    }
}

pub fn is_numeric(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
}

pub fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xff)
}
