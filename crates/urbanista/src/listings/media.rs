use mime::Mime;

use super::domain::{MediaDraft, MediaKind};

/// Default per-file cap, matching the original 2 MB upload rule.
pub const DEFAULT_MEDIA_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Image subtypes accepted for listing photos.
const IMAGE_SUBTYPES: [&str; 3] = ["jpeg", "png", "gif"];

/// Rejections raised while validating declared media metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaViolation {
    #[error("storage key is required")]
    StorageKeyRequired,
    #[error("unparseable content type '{0}'")]
    InvalidContentType(String),
    #[error("content type '{content_type}' is not allowed for {kind} media")]
    KindMismatch {
        content_type: String,
        kind: &'static str,
    },
    #[error("media exceeds the {max}-byte cap ({found} bytes declared)")]
    TooLarge { max: u64, found: u64 },
}

/// Policy applied to each declared attachment. The service records metadata
/// only; blobs live in external storage.
#[derive(Debug, Clone, Copy)]
pub struct MediaPolicy {
    pub max_bytes: u64,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MEDIA_MAX_BYTES,
        }
    }
}

impl MediaPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn validate(&self, draft: &MediaDraft) -> Result<(), MediaViolation> {
        if draft.storage_key.trim().is_empty() {
            return Err(MediaViolation::StorageKeyRequired);
        }

        let mime: Mime = draft
            .content_type
            .parse()
            .map_err(|_| MediaViolation::InvalidContentType(draft.content_type.clone()))?;

        let allowed = match draft.kind {
            MediaKind::Image => {
                mime.type_() == mime::IMAGE && IMAGE_SUBTYPES.contains(&mime.subtype().as_str())
            }
            MediaKind::Video => mime.type_() == mime::VIDEO,
            // Plans arrive either as PDF exports or as scanned images.
            MediaKind::Plan => mime == mime::APPLICATION_PDF || mime.type_() == mime::IMAGE,
        };
        if !allowed {
            return Err(MediaViolation::KindMismatch {
                content_type: draft.content_type.clone(),
                kind: draft.kind.label(),
            });
        }

        if draft.bytes > self.max_bytes {
            return Err(MediaViolation::TooLarge {
                max: self.max_bytes,
                found: draft.bytes,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_draft() -> MediaDraft {
        MediaDraft {
            storage_key: "listings/lst-000001/facade.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: 512 * 1024,
            kind: MediaKind::Image,
        }
    }

    #[test]
    fn accepts_allowed_image_types() {
        let policy = MediaPolicy::default();
        for subtype in ["image/jpeg", "image/png", "image/gif"] {
            let mut draft = image_draft();
            draft.content_type = subtype.to_string();
            assert_eq!(policy.validate(&draft), Ok(()));
        }
    }

    #[test]
    fn rejects_mismatched_kinds() {
        let policy = MediaPolicy::default();

        let mut draft = image_draft();
        draft.content_type = "image/webp".to_string();
        assert!(matches!(
            policy.validate(&draft),
            Err(MediaViolation::KindMismatch { .. })
        ));

        draft.content_type = "video/mp4".to_string();
        assert!(matches!(
            policy.validate(&draft),
            Err(MediaViolation::KindMismatch { .. })
        ));

        draft.kind = MediaKind::Video;
        assert_eq!(policy.validate(&draft), Ok(()));

        draft.kind = MediaKind::Plan;
        draft.content_type = "application/pdf".to_string();
        assert_eq!(policy.validate(&draft), Ok(()));
    }

    #[test]
    fn enforces_byte_cap_and_storage_key() {
        let policy = MediaPolicy::new(1024);

        let mut draft = image_draft();
        assert_eq!(
            policy.validate(&draft),
            Err(MediaViolation::TooLarge {
                max: 1024,
                found: 512 * 1024
            })
        );

        draft.bytes = 512;
        draft.storage_key = "   ".to_string();
        assert_eq!(policy.validate(&draft), Err(MediaViolation::StorageKeyRequired));
    }

    #[test]
    fn rejects_garbage_content_types() {
        let policy = MediaPolicy::default();
        let mut draft = image_draft();
        draft.content_type = "not a mime".to_string();
        assert!(matches!(
            policy.validate(&draft),
            Err(MediaViolation::InvalidContentType(_))
        ));
    }
}
