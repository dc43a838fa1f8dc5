use image::Luma;
use qrforge::helper::{save_png, to_ascii_string, to_image_buffer, to_svg_string, RenderOptions};
use qrforge::{encode, ECLevel};
use std::env;
use std::fs;

#[test]
fn image_matches_matrix() {
    let qr = encode("render me", ECLevel::Q).unwrap();
    let options = RenderOptions::default().border(2).module_px(4);
    let img = to_image_buffer(&qr, &options).unwrap();
    let side = (qr.size() as u32 + 4) * 4;
    assert_eq!(img.dimensions(), (side, side));
    for row in 0..qr.size() {
        for col in 0..qr.size() {
            let x = (col as u32 + 2) * 4 + 1;
            let y = (row as u32 + 2) * 4 + 2;
            let expected = if qr.get(row, col) { 0 } else { 255 };
            assert_eq!(img.get_pixel(x, y), &Luma([expected]), "({}, {})", row, col);
        }
    }
}

#[test]
fn custom_colors() {
    let qr = encode("1", ECLevel::L).unwrap();
    let options = RenderOptions {
        dark: 40,
        light: 220,
        ..RenderOptions::default().module_px(1)
    };
    let img = to_image_buffer(&qr, &options).unwrap();
    assert_eq!(img.get_pixel(0, 0), &Luma([220]));
    assert_eq!(img.get_pixel(4, 4), &Luma([40]));
}

#[test]
fn svg_has_one_subpath_per_dark_run() {
    let qr = encode("HELLO WORLD", ECLevel::M).unwrap();
    let svg = to_svg_string(&qr, &RenderOptions::default().border(0));
    let mut runs = 0;
    for row in 0..qr.size() {
        let mut prev = false;
        for col in 0..qr.size() {
            let dark = qr.get(row, col);
            if dark && !prev {
                runs += 1;
            }
            prev = dark;
        }
    }
    assert_eq!(svg.matches('M').count(), runs);
    assert!(svg.contains("viewBox=\"0 0 21 21\""));
}

#[test]
fn ascii_rows_follow_matrix() {
    let qr = encode("ascii", ECLevel::L).unwrap();
    let text = to_ascii_string(&qr, 0);
    for (row, line) in text.lines().enumerate() {
        let cells: Vec<char> = line.chars().collect();
        for col in 0..qr.size() {
            assert_eq!(cells[col * 2] != ' ', qr.get(row, col));
        }
    }
}

#[test]
fn save_png_creates_directories() {
    let dir = env::temp_dir().join(format!("qrforge-render-{}", std::process::id()));
    let path = dir.join("nested").join("hello.png");
    let qr = encode("https://example.com", ECLevel::M).unwrap();
    save_png(&qr, &path, &RenderOptions::default()).unwrap();

    let loaded = image::open(&path).unwrap().to_luma8();
    assert_eq!(loaded, to_image_buffer(&qr, &RenderOptions::default()).unwrap());
    fs::remove_dir_all(&dir).unwrap();
}
