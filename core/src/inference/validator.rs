use crate::interface::UploadMeta;
use crate::prelude::{RetinaError, RetinaResult};

/// Media types an upload may declare.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// Largest accepted upload, 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Checks upload metadata before anything is computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadValidator;

impl UploadValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, meta: &UploadMeta) -> RetinaResult<()> {
        if !ACCEPTED_MEDIA_TYPES.contains(&meta.media_type.as_str()) {
            return Err(RetinaError::UnsupportedFileType {
                media_type: meta.media_type.clone(),
            });
        }
        if meta.size > MAX_UPLOAD_BYTES {
            return Err(RetinaError::FileTooLarge { size: meta.size });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(media_type: &str, size: u64) -> UploadMeta {
        UploadMeta {
            name: "retina_4.png".into(),
            media_type: media_type.into(),
            size,
        }
    }

    #[test]
    fn rejects_gif() {
        let err = UploadValidator::new()
            .validate(&meta("image/gif", 1024))
            .unwrap_err();
        assert!(matches!(err, RetinaError::UnsupportedFileType { .. }));
        assert_eq!(err.to_string(), "Unsupported file type. Use JPG or PNG.");
    }

    #[test]
    fn accepts_small_png_and_jpeg_variants() {
        let validator = UploadValidator::new();
        assert!(validator.validate(&meta("image/png", 1024 * 1024)).is_ok());
        assert!(validator.validate(&meta("image/jpeg", 10)).is_ok());
        assert!(validator.validate(&meta("image/jpg", 10)).is_ok());
    }

    #[test]
    fn size_limit_is_inclusive() {
        let validator = UploadValidator::new();
        assert!(validator.validate(&meta("image/png", MAX_UPLOAD_BYTES)).is_ok());
        let err = validator
            .validate(&meta("image/png", MAX_UPLOAD_BYTES + 1))
            .unwrap_err();
        assert!(matches!(err, RetinaError::FileTooLarge { .. }));
    }

    #[test]
    fn rejects_six_mebibyte_png() {
        let err = UploadValidator::new()
            .validate(&meta("image/png", 6 * 1024 * 1024))
            .unwrap_err();
        assert_eq!(err.to_string(), "File too large. Max 5MB.");
    }

    #[test]
    fn type_is_checked_before_size() {
        let err = UploadValidator::new()
            .validate(&meta("image/gif", 6 * 1024 * 1024))
            .unwrap_err();
        assert!(matches!(err, RetinaError::UnsupportedFileType { .. }));
    }
}
