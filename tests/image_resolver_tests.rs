use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use training_report_server::assembly::images::{ImageFailureKind, ImageKind};
use training_report_server::assembly::request::ImageEntry;
use training_report_server::assembly::resolve_image_groups;

fn encoded_image(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, image::Rgb([180, 200, 220]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

fn slot(number: u32, bytes: Vec<u8>, caption: &str) -> ImageEntry {
    ImageEntry {
        slot: number,
        binary_content: bytes,
        caption: caption.to_string(),
    }
}

#[test]
fn jpeg_and_png_uploads_resolve() {
    let mut raw = HashMap::new();
    raw.insert(
        "gallery".to_string(),
        vec![
            slot(1, encoded_image(ImageFormat::Png), "Opening"),
            slot(2, encoded_image(ImageFormat::Jpeg), ""),
        ],
    );

    let resolution = resolve_image_groups(raw, 1024 * 1024);
    let gallery = &resolution.groups["gallery"];
    assert!(resolution.failures.is_empty());
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery[0].kind, ImageKind::Png);
    assert_eq!(gallery[0].caption, "Opening");
    assert_eq!(gallery[1].kind, ImageKind::Jpeg);
}

#[test]
fn non_image_payload_fails_its_slot_only() {
    let mut raw = HashMap::new();
    raw.insert(
        "gallery".to_string(),
        vec![
            slot(1, encoded_image(ImageFormat::Png), ""),
            slot(2, b"%PDF-1.4 not a photo".to_vec(), ""),
            slot(3, encoded_image(ImageFormat::Jpeg), ""),
        ],
    );

    let resolution = resolve_image_groups(raw, 1024 * 1024);
    assert_eq!(resolution.groups["gallery"].len(), 2);
    assert_eq!(resolution.failures.len(), 1);
    let failure = &resolution.failures[0];
    assert_eq!(failure.group, "gallery");
    assert_eq!(failure.slot, 2);
    assert!(matches!(failure.kind, ImageFailureKind::InvalidFormat));
}

#[test]
fn oversized_upload_reports_too_large_and_siblings_resolve() {
    let png = encoded_image(ImageFormat::Png);
    let limit = png.len();

    let mut big = encoded_image(ImageFormat::Png);
    big.extend(std::iter::repeat(0u8).take(limit));

    let mut raw = HashMap::new();
    raw.insert(
        "annexure3".to_string(),
        vec![slot(1, big, ""), slot(2, png, "Attendance sheet")],
    );

    let resolution = resolve_image_groups(raw, limit);
    assert_eq!(resolution.groups["annexure3"].len(), 1);
    assert_eq!(resolution.groups["annexure3"][0].slot, 2);
    assert_eq!(resolution.failures.len(), 1);
    assert!(matches!(
        resolution.failures[0].kind,
        ImageFailureKind::TooLarge { .. }
    ));
}

#[test]
fn slot_gaps_resolve_in_ascending_order() {
    let mut raw = HashMap::new();
    raw.insert(
        "gallery".to_string(),
        vec![
            slot(9, encoded_image(ImageFormat::Png), ""),
            slot(4, encoded_image(ImageFormat::Jpeg), ""),
            slot(6, encoded_image(ImageFormat::Png), ""),
        ],
    );

    let resolution = resolve_image_groups(raw, 1024 * 1024);
    let slots: Vec<u32> = resolution.groups["gallery"].iter().map(|i| i.slot).collect();
    assert_eq!(slots, vec![4, 6, 9]);
}
