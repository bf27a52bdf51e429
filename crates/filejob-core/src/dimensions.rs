//! Width/height fields coupled by an aspect-ratio lock.
//!
//! The ratio is taken from the source image once, reduced by GCD, and never
//! recomputed from edited values, so repeated edits do not drift.

use serde::Serialize;

use crate::error::ValidationError;
use crate::types::file::ImageDimensions;
use crate::types::options::ResizeImageOptions;

/// A width:height ratio in lowest terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Reduce `width:height` by their GCD. `None` if either side is zero.
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let divisor = gcd(width, height);
        Some(Self {
            width: width / divisor,
            height: height / divisor,
        })
    }

    /// Height proportional to `width`, rounded half away from zero
    pub fn height_for(&self, width: u32) -> u32 {
        scale(width, self.height, self.width)
    }

    /// Width proportional to `height`, rounded half away from zero
    pub fn width_for(&self, height: u32) -> u32 {
        scale(height, self.width, self.height)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (value as f64 * numerator as f64 / denominator as f64).round();
    if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Named target size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Common output sizes
pub const PRESETS: &[Preset] = &[
    Preset { name: "HD", width: 1920, height: 1080 },
    Preset { name: "Instagram Square", width: 1080, height: 1080 },
    Preset { name: "Facebook Cover", width: 820, height: 312 },
    Preset { name: "Twitter Header", width: 1500, height: 500 },
    Preset { name: "YouTube Thumbnail", width: 1280, height: 720 },
    Preset { name: "iPad", width: 1024, height: 768 },
    Preset { name: "iPhone", width: 375, height: 667 },
    Preset { name: "Web Banner", width: 728, height: 90 },
];

impl Preset {
    /// Case-insensitive lookup by name
    pub fn find(name: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Resize fields with an optional aspect-ratio lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSolver {
    width: u32,
    height: u32,
    lock_aspect: bool,
    base_ratio: Option<AspectRatio>,
    original: Option<ImageDimensions>,
}

impl Default for DimensionSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DimensionSolver {
    /// Empty fields, lock on, no ratio known yet
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            lock_aspect: true,
            base_ratio: None,
            original: None,
        }
    }

    /// Start from a decoded source image
    pub fn from_source(original: ImageDimensions) -> Self {
        Self {
            width: original.width,
            height: original.height,
            lock_aspect: true,
            base_ratio: AspectRatio::from_dimensions(original.width, original.height),
            original: Some(original),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_locked(&self) -> bool {
        self.lock_aspect
    }

    pub fn base_ratio(&self) -> Option<AspectRatio> {
        self.base_ratio
    }

    pub fn original(&self) -> Option<ImageDimensions> {
        self.original
    }

    /// Set the width; under the lock the height follows
    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        if let Some(ratio) = self.locked_ratio() {
            self.height = ratio.height_for(width);
        }
    }

    /// Set the height; under the lock the width follows
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        if let Some(ratio) = self.locked_ratio() {
            self.width = ratio.width_for(height);
        }
    }

    /// Overwrite both fields regardless of the lock. The base ratio is kept,
    /// so later edits under the lock follow the source proportions again.
    pub fn apply_preset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn apply(&mut self, preset: &Preset) {
        self.apply_preset(preset.width, preset.height);
    }

    /// Flip the lock without reconciling the current fields
    pub fn toggle_lock(&mut self) -> bool {
        self.lock_aspect = !self.lock_aspect;
        self.lock_aspect
    }

    pub fn set_lock(&mut self, locked: bool) {
        self.lock_aspect = locked;
    }

    /// Restore the native dimensions of the source
    pub fn reset_to_original(&mut self) {
        if let Some(original) = self.original {
            self.width = original.width;
            self.height = original.height;
        }
    }

    /// Both fields must be at least 1 before submission
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.width < 1 || self.height < 1 {
            return Err(ValidationError::InvalidDimensions);
        }
        Ok(())
    }

    pub fn to_options(&self) -> Result<ResizeImageOptions, ValidationError> {
        self.validate()?;
        Ok(ResizeImageOptions {
            width: self.width,
            height: self.height,
            maintain_aspect_ratio: self.lock_aspect,
        })
    }

    fn locked_ratio(&self) -> Option<AspectRatio> {
        if self.lock_aspect {
            self.base_ratio
        } else {
            None
        }
    }
}
