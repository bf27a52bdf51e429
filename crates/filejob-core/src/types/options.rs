//! Operation options, one variant per job kind

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::job::JobKind;

/// Options for image compression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressImageOptions {
    /// Encoder quality, 1-100
    pub quality: u8,
    /// Keep the source format instead of letting the service pick one
    pub preserve_format: bool,
    /// Desired output size; `None` lets the service optimise freely
    pub target_size_kb: Option<u32>,
}

impl Default for CompressImageOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            preserve_format: true,
            target_size_kb: None,
        }
    }
}

/// Output format for image conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Bmp,
    Tiff,
    Gif,
    Ico,
    Pdf,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 8] = [
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Webp,
        TargetFormat::Bmp,
        TargetFormat::Tiff,
        TargetFormat::Gif,
        TargetFormat::Ico,
        TargetFormat::Pdf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Tiff => "tiff",
            TargetFormat::Gif => "gif",
            TargetFormat::Ico => "ico",
            TargetFormat::Pdf => "pdf",
        }
    }

    /// Detect a format from a file extension (`jpeg` and `tif` are aliases)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(TargetFormat::Jpg),
            "png" => Some(TargetFormat::Png),
            "webp" => Some(TargetFormat::Webp),
            "bmp" => Some(TargetFormat::Bmp),
            "tif" | "tiff" => Some(TargetFormat::Tiff),
            "gif" => Some(TargetFormat::Gif),
            "ico" => Some(TargetFormat::Ico),
            "pdf" => Some(TargetFormat::Pdf),
            _ => None,
        }
    }

    /// Suggested conversion targets for a source format
    pub fn recommended_for(source: Option<TargetFormat>) -> &'static [TargetFormat] {
        use TargetFormat::*;
        match source {
            Some(Jpg) => &[Webp, Png],
            Some(Png) => &[Webp, Jpg],
            Some(Webp) => &[Jpg, Png],
            Some(Bmp) | Some(Tiff) => &[Jpg, Png, Webp],
            Some(Gif) => &[Png, Webp, Jpg],
            _ => &[Jpg, Png, Webp],
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown target format: {}", s))
    }
}

/// Options for image conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertImageOptions {
    pub target_format: TargetFormat,
}

/// Options for image resizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeImageOptions {
    pub width: u32,
    pub height: u32,
    pub maintain_aspect_ratio: bool,
}

/// PDF compression strength
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(CompressionLevel::Low),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            other => Err(format!("unknown compression level: {}", other)),
        }
    }
}

/// Options for PDF compression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressPdfOptions {
    pub compression_level: CompressionLevel,
}

/// Options for page extraction (1-based, inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractPdfOptions {
    pub start_page: u32,
    pub end_page: u32,
}

impl Default for ExtractPdfOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: 1,
        }
    }
}

/// Kind-specific options of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum JobOptions {
    CompressImage(CompressImageOptions),
    ConvertImage(ConvertImageOptions),
    ResizeImage(ResizeImageOptions),
    CompressPdf(CompressPdfOptions),
    ExtractPdf(ExtractPdfOptions),
    /// Merge order is carried by the job's inputs
    MergePdf,
}

impl JobOptions {
    pub fn kind(&self) -> JobKind {
        match self {
            JobOptions::CompressImage(_) => JobKind::CompressImage,
            JobOptions::ConvertImage(_) => JobKind::ConvertImage,
            JobOptions::ResizeImage(_) => JobKind::ResizeImage,
            JobOptions::CompressPdf(_) => JobKind::CompressPdf,
            JobOptions::ExtractPdf(_) => JobKind::ExtractPdf,
            JobOptions::MergePdf => JobKind::MergePdf,
        }
    }

    /// Multipart text fields sent alongside the file parts
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            JobOptions::CompressImage(o) => {
                let mut fields = vec![
                    ("quality", o.quality.to_string()),
                    ("preserve_format", o.preserve_format.to_string()),
                ];
                if let Some(kb) = o.target_size_kb {
                    fields.push(("target_size_kb", kb.to_string()));
                }
                fields
            }
            JobOptions::ConvertImage(o) => {
                vec![("target_format", o.target_format.extension().to_string())]
            }
            JobOptions::ResizeImage(o) => vec![
                ("width", o.width.to_string()),
                ("height", o.height.to_string()),
                ("maintain_aspect_ratio", o.maintain_aspect_ratio.to_string()),
            ],
            JobOptions::CompressPdf(o) => {
                vec![("compression_level", o.compression_level.as_str().to_string())]
            }
            JobOptions::ExtractPdf(o) => vec![
                ("start_page", o.start_page.to_string()),
                ("end_page", o.end_page.to_string()),
            ],
            JobOptions::MergePdf => Vec::new(),
        }
    }

    /// Default options for a kind, where every field has a sensible default
    pub fn default_for(kind: JobKind) -> Option<Self> {
        match kind {
            JobKind::CompressImage => Some(JobOptions::CompressImage(Default::default())),
            JobKind::CompressPdf => Some(JobOptions::CompressPdf(Default::default())),
            JobKind::ExtractPdf => Some(JobOptions::ExtractPdf(Default::default())),
            JobKind::MergePdf => Some(JobOptions::MergePdf),
            JobKind::ConvertImage | JobKind::ResizeImage => None,
        }
    }
}
