//! # qrforge
//!
//! A Rust library for turning text into QR Code symbols.
//!
//! `qrforge` encodes a string into a QR Code Model 2 symbol: a square grid of dark and light
//! modules ready to be drawn by any renderer. It supports versions 1 to 40, the four error
//! correction levels, and numeric, alphanumeric, Latin-1 byte and UTF-8 payloads. The matrix can
//! be rendered as SVG, as an in-memory image buffer, as a PNG file, or as console text.
//!
//! ## Features
//!
//! - Pick the cheapest mode for the whole input: numeric, alphanumeric, byte or UTF-8.
//! - Select the smallest version that fits, optionally within a version range.
//! - Reed–Solomon error correction over GF(256) with block interleaving.
//! - Automatic mask selection using the four standard penalty rules, scored in parallel.
//! - Render to SVG, PNG, `image` buffers or ASCII art.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrforge = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qrforge::{encode, ECLevel};
//!
//! let qr = encode("HELLO WORLD", ECLevel::Q).unwrap();
//! assert_eq!(qr.size(), 21);
//! let dark_modules = (0..qr.size())
//!     .flat_map(|row| (0..qr.size()).map(move |col| (row, col)))
//!     .filter(|&(row, col)| qr.get(row, col))
//!     .count();
//! assert!(dark_modules > 0);
//! ```
//!
//! Render an SVG:
//!
//! ```rust
//! use qrforge::helper::{to_svg_string, RenderOptions};
//! use qrforge::{encode, ECLevel};
//!
//! let qr = encode("https://example.com", ECLevel::M).unwrap();
//! let svg = to_svg_string(&qr, &RenderOptions::default());
//! assert!(svg.contains("<path"));
//! ```
//!
//! ## Modules
//!
//! - [`segment`]: Mode detection and payload bit packing.
//! - [`capacity`]: Capacity table and version selection.
//! - [`codewords`]: Data codeword assembly.
//! - [`reed_solomon`]: GF(256) arithmetic and EC codewords.
//! - [`interleave`]: Block splitting and interleaving.
//! - [`matrix`]: The module grid and function patterns.
//! - [`placement`]: Zigzag data placement.
//! - [`mask`]: Masking, penalty scoring, format and version information.
//! - [`qrcode`]: The encode pipeline.
//! - [`helper`]: Utilities for rendering QR codes in various formats.

#![forbid(unsafe_code)]

pub mod capacity;
pub mod codewords;
pub mod error;
pub mod helper;
pub mod interleave;
pub mod mask;
pub mod matrix;
pub mod placement;
pub mod qrcode;
pub mod reed_solomon;
pub mod segment;

pub use capacity::{CapacityEntry, ECLevel, Version};
pub use error::{QrError, RenderError};
pub use mask::Mask;
pub use matrix::{Matrix, Module};
pub use qrcode::{encode, encode_bytes, encode_with, EncodeOptions, QrSymbol};
pub use segment::{Mode, Segment};
