use crate::error::RenderError;
use crate::qrcode::QrSymbol;

use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;

/*---- Utilities ----*/

/// Quiet zone, module scale and colors for the renderers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderOptions {
    /// Light border width, in modules.
    pub border: usize,
    /// Pixels per module side for raster output.
    pub module_px: u32,
    /// Luma value of dark modules.
    pub dark: u8,
    /// Luma value of light modules and the border.
    pub light: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            border: 4,
            module_px: 8,
            dark: 0,
            light: 255,
        }
    }
}

impl RenderOptions {
    pub fn border(mut self, border: usize) -> Self {
        self.border = border;
        self
    }

    pub fn module_px(mut self, module_px: u32) -> Self {
        self.module_px = module_px.max(1);
        self
    }
}

/// `#RRGGBB` for a gray level.
fn svg_gray(luma: u8) -> String {
    format!("#{0:02X}{0:02X}{0:02X}", luma)
}

// Returns a string of SVG code for an image depicting the given QR Code, with
// the given number of border modules. Each horizontal run of dark modules is
// one subpath, filled with the options' dark level over a light background.
// The string always uses Unix newlines (\n).
pub fn to_svg_string(qr: &QrSymbol, options: &RenderOptions) -> String {
    let border = options.border;
    let dimension = qr.size() + border * 2;
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += &format!(
        "\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        svg_gray(options.light)
    );
    result += "\t<path d=\"";
    let mut first = true;
    for row in 0..qr.size() {
        let mut col = 0;
        while col < qr.size() {
            if !qr.get(row, col) {
                col += 1;
                continue;
            }
            let start = col;
            while col < qr.size() && qr.get(row, col) {
                col += 1;
            }
            if !first {
                result += " ";
            }
            first = false;
            result += &format!(
                "M{},{}h{}v1h-{}z",
                start + border,
                row + border,
                col - start,
                col - start
            );
        }
    }
    result += &format!("\" fill=\"{}\"/>\n", svg_gray(options.dark));
    result += "</svg>\n";
    result
}

/// Renders the symbol as text, two characters per module, for terminals.
pub fn to_ascii_string(qr: &QrSymbol, border: usize) -> String {
    let span = qr.size() + border * 2;
    let mut result = String::with_capacity(span * (span * 2 + 1) * 3);
    for y in 0..span {
        for x in 0..span {
            let dark = y >= border && x >= border && qr.get(y - border, x - border);
            let c = if dark { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given symbol to the console with a 4-module border.
pub fn print_qr(qr: &QrSymbol) {
    println!("{}", to_ascii_string(qr, 4));
}

/// Rasterizes the symbol: every module becomes a `module_px`-square block,
/// surrounded by `border` modules of light pixels.
///
/// # Example
///
/// ```
/// use qrforge::helper::{to_image_buffer, RenderOptions};
/// use qrforge::{encode, ECLevel};
///
/// let qr = encode("Hello, World!", ECLevel::L).unwrap();
/// let img = to_image_buffer(&qr, &RenderOptions::default().module_px(1)).unwrap();
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
///
/// # Errors
///
/// [`RenderError::DimensionsTooLarge`] if the border and scale make the image
/// side or pixel count overflow.
pub fn to_image_buffer(qr: &QrSymbol, options: &RenderOptions) -> Result<GrayImage, RenderError> {
    let scale = options.module_px.max(1);
    let side = image_side(qr.size(), options.border, scale).ok_or(RenderError::DimensionsTooLarge {
        modules: qr.size(),
        border: options.border,
        module_px: scale,
    })?;
    let border = options.border;
    let mut img = GrayImage::from_pixel(side, side, Luma([options.light]));

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let (col, row) = ((x / scale) as usize, (y / scale) as usize);
        if row >= border && col >= border && qr.get(row - border, col - border) {
            *pixel = Luma([options.dark]);
        }
    }
    Ok(img)
}

// Side length in pixels, if it and the whole pixel buffer fit.
fn image_side(size: usize, border: usize, scale: u32) -> Option<u32> {
    let modules = border.checked_mul(2)?.checked_add(size)?;
    let side = u32::try_from(modules).ok()?.checked_mul(scale)?;
    let side_px = usize::try_from(side).ok()?;
    side_px.checked_mul(side_px)?;
    Some(side)
}

/// Rasterizes the symbol and writes it as a PNG, creating parent directories.
///
/// # Errors
///
/// Returns a [`RenderError`] if the image is too large, the directory cannot be
/// created, or the image cannot be encoded or written.
pub fn save_png(qr: &QrSymbol, path: impl AsRef<Path>, options: &RenderOptions) -> Result<(), RenderError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let img = to_image_buffer(qr, options)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    tracing::debug!(path = %path.display(), side = img.width(), "png written");
    Ok(())
}
