//! Acceptance rules for selected files and job options
//!
//! Every check is a total function: it returns a [`ValidationError`] with a
//! user-facing message and never touches job or collection state. File rules
//! run in a fixed order and the first failure wins:
//!
//! 1. size ceiling (10MB for image kinds, 25MB per file for PDF kinds)
//! 2. MIME type whitelist for the kind
//! 3. image header decode (image kinds only), rejecting zero dimensions
//!
//! Cardinality and option rules are checked at submission time.

use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::types::file::{ImageDimensions, SelectedFile};
use crate::types::job::{JobKind, MediaFamily};
use crate::types::options::{JobOptions, TargetFormat};

/// Types accepted by compress and resize
const WEB_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Types accepted by convert (anything the decoder understands)
const DECODABLE_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

const PDF_TYPE: &str = "application/pdf";

/// Validation rules for one job kind
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    kind: JobKind,
    max_file_bytes: u64,
    max_page: u32,
    max_target_size_kb: u32,
}

impl ValidationPolicy {
    /// Policy with the default limits
    pub fn for_kind(kind: JobKind) -> Self {
        Self::from_limits(kind, &LimitsConfig::default())
    }

    pub fn from_limits(kind: JobKind, limits: &LimitsConfig) -> Self {
        Self {
            kind,
            max_file_bytes: limits.max_bytes_for(kind),
            max_page: limits.max_page,
            max_target_size_kb: limits.max_target_size_kb,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Run the per-file rules
    pub fn validate_file(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        self.check_file(file).map(|_| ())
    }

    /// Validate a file and attach its decoded dimensions (image kinds)
    pub fn admit(&self, file: SelectedFile) -> Result<SelectedFile, ValidationError> {
        match self.check_file(&file)? {
            Some(dimensions) => Ok(file.with_dimensions(dimensions)),
            None => Ok(file),
        }
    }

    /// Admit a whole batch or nothing
    pub fn admit_batch(&self, files: Vec<SelectedFile>) -> Result<Vec<SelectedFile>, ValidationError> {
        files.into_iter().map(|f| self.admit(f)).collect()
    }

    /// Checks run when the user asks to submit
    pub fn validate_submission(
        &self,
        inputs: &[SelectedFile],
        options: &JobOptions,
    ) -> Result<(), ValidationError> {
        if options.kind() != self.kind {
            return Err(ValidationError::OptionsMismatch {
                expected: self.kind,
                actual: options.kind(),
            });
        }

        if self.kind.is_multi_file() {
            if inputs.len() < 2 {
                return Err(ValidationError::NotEnoughFiles);
            }
        } else {
            match inputs.len() {
                0 => return Err(ValidationError::NoFile),
                1 => {}
                _ => return Err(ValidationError::TooManyFiles { kind: self.kind }),
            }
        }

        for file in inputs {
            self.validate_file(file)?;
        }

        self.validate_options(inputs, options)
    }

    /// Option rules for the kind
    pub fn validate_options(
        &self,
        inputs: &[SelectedFile],
        options: &JobOptions,
    ) -> Result<(), ValidationError> {
        match options {
            JobOptions::CompressImage(o) => {
                if !(1..=100).contains(&o.quality) {
                    return Err(ValidationError::QualityOutOfRange);
                }
                if let Some(kb) = o.target_size_kb {
                    if kb == 0 || kb > self.max_target_size_kb {
                        return Err(ValidationError::TargetSizeOutOfRange {
                            max_kb: self.max_target_size_kb,
                        });
                    }
                }
            }
            JobOptions::ConvertImage(o) => {
                let source = inputs
                    .first()
                    .and_then(|f| f.extension())
                    .and_then(|ext| TargetFormat::from_extension(&ext));
                if source == Some(o.target_format) {
                    return Err(ValidationError::SameFormat {
                        format: o.target_format.extension().to_string(),
                    });
                }
            }
            JobOptions::ResizeImage(o) => {
                if o.width < 1 || o.height < 1 {
                    return Err(ValidationError::InvalidDimensions);
                }
            }
            JobOptions::ExtractPdf(o) => {
                if o.start_page < 1 {
                    return Err(ValidationError::StartPageTooLow);
                }
                if o.end_page < o.start_page {
                    return Err(ValidationError::PageRangeInverted);
                }
                if o.start_page > self.max_page || o.end_page > self.max_page {
                    return Err(ValidationError::PageOutOfRange { max: self.max_page });
                }
            }
            JobOptions::CompressPdf(_) | JobOptions::MergePdf => {}
        }
        Ok(())
    }

    fn check_file(&self, file: &SelectedFile) -> Result<Option<ImageDimensions>, ValidationError> {
        let named = self.kind.is_multi_file();

        if file.size_bytes() > self.max_file_bytes {
            let limit_mb = self.max_file_bytes.div_ceil(1024 * 1024);
            return Err(if named {
                ValidationError::NamedFileTooLarge {
                    name: file.name().to_string(),
                    limit_mb,
                }
            } else {
                ValidationError::FileTooLarge { limit_mb }
            });
        }

        match self.kind.family() {
            MediaFamily::Pdf => {
                if file.mime() != PDF_TYPE {
                    return Err(if named {
                        ValidationError::NamedNotPdf {
                            name: file.name().to_string(),
                        }
                    } else {
                        ValidationError::NotPdf
                    });
                }
                Ok(None)
            }
            MediaFamily::Image => {
                let accepted = match self.kind {
                    JobKind::ConvertImage => DECODABLE_IMAGE_TYPES,
                    _ => WEB_IMAGE_TYPES,
                };
                if !accepted.contains(&file.mime()) {
                    return Err(ValidationError::UnsupportedImage {
                        mime: file.mime().to_string(),
                    });
                }
                decode_dimensions(&file.data()).map(Some)
            }
        }
    }
}

/// Read width and height from an image header
pub fn decode_dimensions(data: &[u8]) -> Result<ImageDimensions, ValidationError> {
    let (width, height) = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| ValidationError::UndecodableImage)?
        .into_dimensions()
        .map_err(|_| ValidationError::UndecodableImage)?;

    if width == 0 || height == 0 {
        return Err(ValidationError::ZeroDimension);
    }
    Ok(ImageDimensions::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pdf_file, png_file, sized_file};
    use crate::types::options::{
        CompressImageOptions, ConvertImageOptions, ExtractPdfOptions, ResizeImageOptions,
    };

    const MB: usize = 1024 * 1024;

    #[test]
    fn test_size_ceiling_per_family() {
        let pdf_policy = ValidationPolicy::for_kind(JobKind::CompressPdf);
        let big_pdf = sized_file("scan.pdf", 30 * MB);
        let err = pdf_policy.validate_file(&big_pdf).unwrap_err();
        assert_eq!(err, ValidationError::FileTooLarge { limit_mb: 25 });
        assert!(err.to_string().contains("exceeds 25MB limit"));

        let ok_pdf = sized_file("scan.pdf", 20 * MB);
        assert!(pdf_policy.validate_file(&ok_pdf).is_ok());

        let image_policy = ValidationPolicy::for_kind(JobKind::CompressImage);
        let big_image = sized_file("photo.jpg", 11 * MB);
        assert_eq!(
            image_policy.validate_file(&big_image),
            Err(ValidationError::FileTooLarge { limit_mb: 10 })
        );
    }

    #[test]
    fn test_size_limit_message_rounds_up() {
        let limits = LimitsConfig {
            pdf_max_bytes: 512 * 1024,
            ..LimitsConfig::default()
        };
        let policy = ValidationPolicy::from_limits(JobKind::CompressPdf, &limits);
        let err = policy.validate_file(&sized_file("scan.pdf", MB)).unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 1MB limit.");

        let limits = LimitsConfig {
            pdf_max_bytes: 5 * 1024 * 1024 / 2,
            ..LimitsConfig::default()
        };
        let policy = ValidationPolicy::from_limits(JobKind::CompressPdf, &limits);
        assert_eq!(
            policy.validate_file(&sized_file("scan.pdf", 3 * MB)),
            Err(ValidationError::FileTooLarge { limit_mb: 3 })
        );
    }

    #[test]
    fn test_size_rule_runs_before_type_rule() {
        let policy = ValidationPolicy::for_kind(JobKind::ExtractPdf);
        let big_text = sized_file("notes.txt", 26 * MB);
        assert_eq!(
            policy.validate_file(&big_text),
            Err(ValidationError::FileTooLarge { limit_mb: 25 })
        );
    }

    #[test]
    fn test_pdf_type_must_match_exactly() {
        let policy = ValidationPolicy::for_kind(JobKind::CompressPdf);
        let mislabelled = SelectedFile::new("doc.pdf", b"%PDF".to_vec(), Some("application/x-pdf".into()));
        assert_eq!(policy.validate_file(&mislabelled), Err(ValidationError::NotPdf));

        let merge = ValidationPolicy::for_kind(JobKind::MergePdf);
        let text = SelectedFile::new("notes.txt", b"hello".to_vec(), None);
        assert_eq!(
            merge.validate_file(&text),
            Err(ValidationError::NamedNotPdf { name: "notes.txt".into() })
        );
    }

    #[test]
    fn test_image_whitelist_depends_on_kind() {
        let gif = SelectedFile::new("anim.gif", b"GIF89a".to_vec(), None);
        assert_eq!(
            ValidationPolicy::for_kind(JobKind::CompressImage).validate_file(&gif),
            Err(ValidationError::UnsupportedImage { mime: "image/gif".into() })
        );
        // convert accepts gif, but these bytes are not a decodable image
        assert_eq!(
            ValidationPolicy::for_kind(JobKind::ConvertImage).validate_file(&gif),
            Err(ValidationError::UndecodableImage)
        );
    }

    #[test]
    fn test_admit_attaches_dimensions() {
        let policy = ValidationPolicy::for_kind(JobKind::ResizeImage);
        let file = policy.admit(png_file("wide.png", 64, 48)).unwrap();
        assert_eq!(file.dimensions(), Some(ImageDimensions::new(64, 48)));
    }

    #[test]
    fn test_admit_batch_is_all_or_nothing() {
        let policy = ValidationPolicy::for_kind(JobKind::MergePdf);
        let batch = vec![pdf_file("a.pdf"), sized_file("huge.pdf", 26 * MB), pdf_file("c.pdf")];
        assert_eq!(
            policy.admit_batch(batch).unwrap_err(),
            ValidationError::NamedFileTooLarge { name: "huge.pdf".into(), limit_mb: 25 }
        );
    }

    #[test]
    fn test_merge_cardinality_checked_at_submission() {
        let policy = ValidationPolicy::for_kind(JobKind::MergePdf);
        let one = vec![pdf_file("a.pdf")];
        assert_eq!(
            policy.validate_submission(&one, &JobOptions::MergePdf),
            Err(ValidationError::NotEnoughFiles)
        );
        let two = vec![pdf_file("a.pdf"), pdf_file("b.pdf")];
        assert!(policy.validate_submission(&two, &JobOptions::MergePdf).is_ok());
    }

    #[test]
    fn test_single_file_cardinality() {
        let policy = ValidationPolicy::for_kind(JobKind::CompressPdf);
        let options = JobOptions::default_for(JobKind::CompressPdf).unwrap();
        assert_eq!(policy.validate_submission(&[], &options), Err(ValidationError::NoFile));
        assert_eq!(
            policy.validate_submission(&[pdf_file("a.pdf"), pdf_file("b.pdf")], &options),
            Err(ValidationError::TooManyFiles { kind: JobKind::CompressPdf })
        );
    }

    #[test]
    fn test_page_range_rules() {
        let policy = ValidationPolicy::for_kind(JobKind::ExtractPdf);
        let inputs = vec![pdf_file("book.pdf")];
        let range = |start_page, end_page| {
            JobOptions::ExtractPdf(ExtractPdfOptions { start_page, end_page })
        };

        assert_eq!(
            policy.validate_submission(&inputs, &range(5, 3)),
            Err(ValidationError::PageRangeInverted)
        );
        assert_eq!(
            policy.validate_submission(&inputs, &range(0, 3)),
            Err(ValidationError::StartPageTooLow)
        );
        assert_eq!(
            policy.validate_submission(&inputs, &range(10, 1001)),
            Err(ValidationError::PageOutOfRange { max: 1000 })
        );
        assert!(policy.validate_submission(&inputs, &range(3, 3)).is_ok());
    }

    #[test]
    fn test_image_option_rules() {
        let compress = ValidationPolicy::for_kind(JobKind::CompressImage);
        let inputs = vec![png_file("a.png", 4, 4)];
        let bad_quality = JobOptions::CompressImage(CompressImageOptions {
            quality: 0,
            ..Default::default()
        });
        assert_eq!(
            compress.validate_submission(&inputs, &bad_quality),
            Err(ValidationError::QualityOutOfRange)
        );
        let bad_target = JobOptions::CompressImage(CompressImageOptions {
            target_size_kb: Some(20_000),
            ..Default::default()
        });
        assert_eq!(
            compress.validate_submission(&inputs, &bad_target),
            Err(ValidationError::TargetSizeOutOfRange { max_kb: 10240 })
        );

        let resize = ValidationPolicy::for_kind(JobKind::ResizeImage);
        let zero = JobOptions::ResizeImage(ResizeImageOptions {
            width: 0,
            height: 100,
            maintain_aspect_ratio: true,
        });
        assert_eq!(
            resize.validate_submission(&inputs, &zero),
            Err(ValidationError::InvalidDimensions)
        );

        let convert = ValidationPolicy::for_kind(JobKind::ConvertImage);
        let same = JobOptions::ConvertImage(ConvertImageOptions {
            target_format: TargetFormat::Png,
        });
        assert_eq!(
            convert.validate_submission(&inputs, &same),
            Err(ValidationError::SameFormat { format: "png".into() })
        );
    }

    #[test]
    fn test_options_must_match_kind() {
        let policy = ValidationPolicy::for_kind(JobKind::MergePdf);
        let inputs = vec![pdf_file("a.pdf"), pdf_file("b.pdf")];
        let options = JobOptions::default_for(JobKind::CompressPdf).unwrap();
        assert_eq!(
            policy.validate_submission(&inputs, &options),
            Err(ValidationError::OptionsMismatch {
                expected: JobKind::MergePdf,
                actual: JobKind::CompressPdf,
            })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_dimensions(b"definitely not an image"), Err(ValidationError::UndecodableImage));
    }
}
