//! Image resolution and validation.
//!
//! The form submits the photo gallery and each annexure as numbered slots
//! (`<group>_image_<n>`), any of which may have been removed client-side, so
//! slot numbers can have gaps. A slot is included iff it carries a payload;
//! every included payload must sniff as JPEG or PNG and fit the configured
//! size limit. Validation failures are aggregated per slot instead of
//! aborting the sibling slots - whether any failure is fatal is the
//! caller's policy.

use std::collections::HashMap;
use std::fmt;

use image::ImageFormat;
use serde::Serialize;
use utoipa::ToSchema;

use super::request::ImageEntry;

/// Accepted upload kinds, with the extension the compile context uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }
}

/// A validated image ready for embedding.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub slot: u32,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
    pub caption: String,
}

/// Why a slot failed validation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageFailureKind {
    InvalidFormat,
    TooLarge { limit_bytes: usize, actual_bytes: usize },
}

/// One failed slot, named so the user can fix the exact upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageFailure {
    pub group: String,
    pub slot: u32,
    #[serde(flatten)]
    pub kind: ImageFailureKind,
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ImageFailureKind::InvalidFormat => write!(
                f,
                "{} image {} is not a JPEG or PNG",
                self.group, self.slot
            ),
            ImageFailureKind::TooLarge {
                limit_bytes,
                actual_bytes,
            } => write!(
                f,
                "{} image {} is {} bytes, over the {} byte limit",
                self.group, self.slot, actual_bytes, limit_bytes
            ),
        }
    }
}

/// Outcome of resolving every submitted image group.
#[derive(Debug, Default)]
pub struct ImageResolution {
    pub groups: HashMap<String, Vec<ResolvedImage>>,
    pub failures: Vec<ImageFailure>,
}

impl ImageResolution {
    pub fn resolved_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Validate and order every image group. Slots come back sorted ascending by
/// slot number; groups whose every slot was empty resolve to empty
/// sequences.
pub fn resolve_image_groups(
    raw: HashMap<String, Vec<ImageEntry>>,
    max_image_bytes: usize,
) -> ImageResolution {
    let mut resolution = ImageResolution::default();

    for (group, mut slots) in raw {
        slots.sort_by_key(|slot| slot.slot);

        let mut resolved = Vec::new();
        for entry in slots {
            if entry.binary_content.is_empty() {
                continue;
            }
            match validate_image(&group, &entry, max_image_bytes) {
                Ok(kind) => resolved.push(ResolvedImage {
                    slot: entry.slot,
                    kind,
                    bytes: entry.binary_content,
                    caption: entry.caption.trim().to_string(),
                }),
                Err(failure) => {
                    log::warn!("rejected upload: {failure}");
                    resolution.failures.push(failure);
                }
            }
        }
        resolution.groups.insert(group, resolved);
    }

    resolution
}

fn validate_image(
    group: &str,
    entry: &ImageEntry,
    max_image_bytes: usize,
) -> Result<ImageKind, ImageFailure> {
    if entry.binary_content.len() > max_image_bytes {
        return Err(ImageFailure {
            group: group.to_string(),
            slot: entry.slot,
            kind: ImageFailureKind::TooLarge {
                limit_bytes: max_image_bytes,
                actual_bytes: entry.binary_content.len(),
            },
        });
    }

    match image::guess_format(&entry.binary_content) {
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        _ => Err(ImageFailure {
            group: group.to_string(),
            slot: entry.slot,
            kind: ImageFailureKind::InvalidFormat,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest byte prefixes the format sniffer recognizes.
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

    fn entry(slot: u32, bytes: &[u8]) -> ImageEntry {
        ImageEntry {
            slot,
            binary_content: bytes.to_vec(),
            caption: String::new(),
        }
    }

    #[test]
    fn valid_slots_survive_an_invalid_sibling() {
        let mut raw = HashMap::new();
        raw.insert(
            "gallery".to_string(),
            vec![
                entry(1, PNG_MAGIC),
                entry(2, b"not an image"),
                entry(3, JPEG_MAGIC),
            ],
        );

        let resolution = resolve_image_groups(raw, 1024);
        assert_eq!(resolution.groups["gallery"].len(), 2);
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].slot, 2);
    }

    #[test]
    fn oversized_slot_is_named_in_the_failure() {
        let mut raw = HashMap::new();
        let mut big = PNG_MAGIC.to_vec();
        big.resize(64, 0);
        raw.insert("annexure1".to_string(), vec![ImageEntry {
            slot: 4,
            binary_content: big,
            caption: String::new(),
        }]);

        let resolution = resolve_image_groups(raw, 32);
        assert!(resolution.groups["annexure1"].is_empty());
        let failure = &resolution.failures[0];
        assert_eq!(failure.group, "annexure1");
        assert_eq!(failure.slot, 4);
        assert!(matches!(
            failure.kind,
            ImageFailureKind::TooLarge { limit_bytes: 32, .. }
        ));
    }

    #[test]
    fn slots_are_ordered_and_gaps_tolerated() {
        let mut raw = HashMap::new();
        raw.insert(
            "gallery".to_string(),
            vec![entry(7, JPEG_MAGIC), entry(2, PNG_MAGIC)],
        );

        let resolution = resolve_image_groups(raw, 1024);
        let slots: Vec<u32> = resolution.groups["gallery"].iter().map(|i| i.slot).collect();
        assert_eq!(slots, vec![2, 7]);
    }

    #[test]
    fn empty_payload_slots_are_skipped_silently() {
        let mut raw = HashMap::new();
        raw.insert("gallery".to_string(), vec![entry(1, b"")]);
        let resolution = resolve_image_groups(raw, 1024);
        assert!(resolution.groups["gallery"].is_empty());
        assert!(resolution.failures.is_empty());
    }
}
