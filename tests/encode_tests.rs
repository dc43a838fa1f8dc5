//! End-to-end tests for the encoder.
//!
//! These read structure back out of finished symbols: function patterns,
//! format and version information, and the placed codeword stream.

use qrforge::capacity::CapacityEntry;
use qrforge::codewords::{assemble, EncodingPlan};
use qrforge::interleave::interleave;
use qrforge::placement::PlacementCursor;
use qrforge::{encode, encode_with, ECLevel, EncodeOptions, Mask, Mode, Module, QrError, QrSymbol, Segment};

const FINDER_BLOCK: [&str; 8] = [
    "11111110",
    "10000010",
    "10111010",
    "10111010",
    "10111010",
    "10000010",
    "11111110",
    "00000000",
];

fn bch_remainder(mut value: u32, generator: u32, gen_degree: u32, data_bits: u32) -> u32 {
    for i in (0..data_bits).rev() {
        if value & (1 << (i + gen_degree)) != 0 {
            value ^= generator << i;
        }
    }
    value
}

/// All 32 valid format words, keyed by (EC bits, mask).
fn format_table() -> Vec<(u8, u8, u16)> {
    let mut table = Vec::new();
    for data in 0u32..32 {
        let rem = bch_remainder(data << 10, 0b101_0011_0111, 10, 5);
        let word = (((data << 10) | rem) ^ 0x5412) as u16;
        table.push(((data >> 3) as u8, (data & 7) as u8, word));
    }
    table
}

/// Nearest valid format word by Hamming distance, as a reader would decode it.
fn decode_format(bits: u16) -> Option<(ECLevel, Mask)> {
    let (ec, mask, word) = format_table()
        .into_iter()
        .min_by_key(|&(_, _, w)| (w ^ bits).count_ones())?;
    if (word ^ bits).count_ones() > 3 {
        return None;
    }
    Some((ECLevel::from_format_bits(ec)?, Mask::new(mask)))
}

fn read_format_copies(qr: &QrSymbol) -> (u16, u16) {
    let size = qr.size();
    let bit = |row: usize, col: usize, i: usize| u16::from(qr.get(row, col)) << i;
    let mut first = 0u16;
    for i in 0..6 {
        first |= bit(i, 8, i);
    }
    first |= bit(7, 8, 6) | bit(8, 8, 7) | bit(8, 7, 8);
    for i in 9..15 {
        first |= bit(8, 14 - i, i);
    }
    let mut second = 0u16;
    for i in 0..8 {
        second |= bit(8, size - 1 - i, i);
    }
    for i in 8..15 {
        second |= bit(size - 15 + i, 8, i);
    }
    (first, second)
}

fn read_version_copies(qr: &QrSymbol) -> (u32, u32) {
    let size = qr.size();
    let (mut a, mut b) = (0u32, 0u32);
    for i in 0..18 {
        let far = size - 11 + i % 3;
        let near = i / 3;
        a |= u32::from(qr.get(near, far)) << i;
        b |= u32::from(qr.get(far, near)) << i;
    }
    (a, b)
}

fn assert_structure(qr: &QrSymbol) {
    let size = qr.size();
    assert_eq!(size, 4 * qr.version().value() as usize + 17);
    for (r, line) in FINDER_BLOCK.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            let dark = ch == '1';
            assert_eq!(qr.get(r, c), dark);
            assert_eq!(qr.get(r, size - 1 - c), dark);
            assert_eq!(qr.get(size - 1 - r, c), dark);
        }
    }
    for i in 8..size - 8 {
        assert_eq!(qr.get(6, i), i % 2 == 0, "timing row at {}", i);
        assert_eq!(qr.get(i, 6), i % 2 == 0, "timing column at {}", i);
    }
    assert!(qr.get(size - 8, 8), "dark module");
}

/// Undoes the mask on the data modules and reads them back in placement order.
fn read_codewords(qr: &QrSymbol) -> Vec<u8> {
    let matrix = qr.matrix();
    let mut bytes = Vec::new();
    let mut current = 0u8;
    let mut nbits = 0;
    for (row, col) in PlacementCursor::new(matrix.size()) {
        if let Module::Data(dark) = matrix.module(row, col) {
            let bit = dark ^ qr.mask().applies(row, col);
            current = (current << 1) | u8::from(bit);
            nbits += 1;
            if nbits == 8 {
                bytes.push(current);
                current = 0;
                nbits = 0;
            }
        }
    }
    bytes
}

#[test]
fn hello_world_quartile() {
    let qr = encode("HELLO WORLD", ECLevel::Q).unwrap();
    assert_eq!(qr.mode(), Mode::Alphanumeric);
    assert_eq!(qr.version().value(), 1);
    assert_eq!(qr.size(), 21);
    for (r, line) in FINDER_BLOCK.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            assert_eq!(qr.get(r, c), ch == '1', "({}, {})", r, c);
        }
    }
    assert_structure(&qr);
}

#[test]
fn placed_stream_matches_interleaved_codewords() {
    let digits = "8675309".repeat(40);
    let lorem = "Lorem ipsum dolor sit amet. ".repeat(12);
    for (text, ecl) in [
        ("HELLO WORLD", ECLevel::Q),
        ("https://example.com/some/longer/path?with=query", ECLevel::M),
        (digits.as_str(), ECLevel::H),
        (lorem.as_str(), ECLevel::L),
    ] {
        let qr = encode(text, ecl).unwrap();
        let seg = Segment::encode(text).unwrap();
        let entry = CapacityEntry::get(qr.version(), ecl);
        let plan = EncodingPlan::new(seg.mode(), entry);
        let expected = interleave(entry, &assemble(&plan, &seg));
        assert_eq!(read_codewords(&qr), expected, "{:?}", text);
    }
}

#[test]
fn format_info_round_trips() {
    for ecl in ECLevel::ALL {
        for mask in Mask::ALL {
            let options = EncodeOptions::new().ec_level(ecl).mask(Some(mask));
            let qr = encode_with("format check", &options).unwrap();
            let (first, second) = read_format_copies(&qr);
            assert_eq!(first, second);
            assert_eq!(decode_format(first), Some((ecl, mask)));
        }
    }
}

#[test]
fn format_info_matches_automatic_mask() {
    let qr = encode("automatic", ECLevel::H).unwrap();
    let (first, _) = read_format_copies(&qr);
    assert_eq!(decode_format(first), Some((ECLevel::H, qr.mask())));
}

#[test]
fn version_info_written_from_version_7() {
    let options = EncodeOptions::new().ec_level(ECLevel::L).version_range(7, 40);
    let qr = encode_with("v7", &options).unwrap();
    assert_eq!(qr.version().value(), 7);
    let (a, b) = read_version_copies(&qr);
    assert_eq!(a, b);
    assert_eq!(a, 0x07c94);
    assert_eq!(a >> 12, 7);
    assert_eq!(bch_remainder(a, 0b1_1111_0010_0101, 12, 6), 0);

    let qr = encode(&"A".repeat(1500), ECLevel::M).unwrap();
    let (a, b) = read_version_copies(&qr);
    assert_eq!(a, b);
    assert_eq!(a >> 12, u32::from(qr.version().value()));
    assert_eq!(bch_remainder(a, 0b1_1111_0010_0101, 12, 6), 0);
}

#[test]
fn digit_strings_encode_at_every_level() {
    for ecl in ECLevel::ALL {
        for len in [1usize, 2, 3, 4, 17, 41, 100, 552, 1000, 3057] {
            let text: String = (0..len).map(|i| char::from(b'0' + (i % 10) as u8)).collect();
            let qr = encode(&text, ecl).unwrap();
            assert_eq!(qr.mode(), Mode::Numeric);
            assert_eq!(qr.size(), 4 * qr.version().value() as usize + 17);
        }
    }
}

#[test]
fn numeric_capacity_limit_at_low() {
    let qr = encode(&"9".repeat(7089), ECLevel::L).unwrap();
    assert_eq!(qr.version().value(), 40);
    assert_structure(&qr);
    assert!(matches!(
        encode(&"9".repeat(7090), ECLevel::L),
        Err(QrError::InputTooLarge { .. })
    ));
}

#[test]
fn empty_input_is_structurally_valid() {
    let qr = encode("", ECLevel::M).unwrap();
    assert_eq!(qr.version().value(), 1);
    assert_eq!(qr.mode(), Mode::Numeric);
    assert_structure(&qr);
    let seg = Segment::encode("").unwrap();
    let entry = CapacityEntry::get(qr.version(), ECLevel::M);
    let data = assemble(&EncodingPlan::new(seg.mode(), entry), &seg);
    assert!(data[3..].iter().all(|&b| b == 0xec || b == 0x11));
}

#[test]
fn oversized_byte_input_at_high() {
    let text = "x".repeat(2954);
    assert!(matches!(encode(&text, ECLevel::H), Err(QrError::InputTooLarge { .. })));
    // Byte-mode ceiling at H is 1273
    assert_eq!(encode(&"x".repeat(1273), ECLevel::H).unwrap().version().value(), 40);
    assert!(encode(&"x".repeat(1274), ECLevel::H).is_err());
}

#[test]
fn utf8_input_round_trips_through_placement() {
    let text = "Kerim B\u{fc}y\u{fc}kaky\u{fc}z \u{2713} \u{1f600}";
    let qr = encode(text, ECLevel::M).unwrap();
    assert_eq!(qr.mode(), Mode::Utf8);
    let seg = Segment::encode(text).unwrap();
    assert_eq!(seg.num_chars(), text.len());
    let entry = CapacityEntry::get(qr.version(), ECLevel::M);
    let expected = interleave(entry, &assemble(&EncodingPlan::new(seg.mode(), entry), &seg));
    assert_eq!(read_codewords(&qr), expected);
}

#[test]
fn automatic_mask_matches_reference_choice() {
    for (text, ecl, mask) in [("HELLO WORLD", ECLevel::L, 7), ("a", ECLevel::H, 6)] {
        let qr = encode(text, ecl).unwrap();
        assert_eq!(qr.mask(), Mask::new(mask), "{:?} at {:?}", text, ecl);
        let seq = encode_with(text, &EncodeOptions::new().ec_level(ecl).parallel_masks(false)).unwrap();
        assert_eq!(seq.mask(), Mask::new(mask));
    }
}

#[test]
fn encoding_is_deterministic() {
    let a = encode("same input, same symbol", ECLevel::Q).unwrap();
    let b = encode("same input, same symbol", ECLevel::Q).unwrap();
    assert_eq!(a, b);
}
