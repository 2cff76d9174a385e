use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default pileup width in pixels (bases).
pub const DEFAULT_WIDTH: usize = 221;

/// Default number of channels per image row.
pub const DEFAULT_NUM_CHANNELS: usize = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("multi_allelic_mode cannot be UNSPECIFIED")]
    UnspecifiedMultiAllelicMode,
    #[error("Pileup width must be odd and positive, got {0}")]
    InvalidWidth(usize),
    #[error("Pileup images need at least one channel")]
    NoChannels,
    #[error("diff_channel {channel} is out of range for {num_channels} channels")]
    DiffChannelOutOfRange { channel: usize, num_channels: usize },
    #[error("Unknown value '{value}' for {field}")]
    UnknownValue { field: &'static str, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which allele combinations get their own image at multi-allelic sites.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MultiAllelicMode {
    #[default]
    Unspecified,
    NoHetAltImages,
    AddHetAltImages,
}

/// How alt-aligned rows are merged into the pileup.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AltAlignedPileup {
    #[default]
    None,
    BaseChannels,
    DiffChannels,
}

/// Variant types that trigger alt-alignment.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypesToAltAlign {
    None,
    #[default]
    Indels,
    All,
}

/// Order of pixels within a row of the flat pileup buffer.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PixelLayout {
    /// `[position][channel]`: all channels of a pixel are adjacent.
    Interleaved,
    /// `[channel][position]`: each channel's pixels are contiguous.
    #[default]
    Planar,
}

macro_rules! string_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ConfigError::UnknownValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

string_enum!(MultiAllelicMode, "multi_allelic_mode", {
    Unspecified => "UNSPECIFIED",
    NoHetAltImages => "NO_HET_ALT_IMAGES",
    AddHetAltImages => "ADD_HET_ALT_IMAGES",
});

string_enum!(AltAlignedPileup, "alt_aligned_pileup", {
    None => "none",
    BaseChannels => "base_channels",
    DiffChannels => "diff_channels",
});

string_enum!(TypesToAltAlign, "types_to_alt_align", {
    None => "none",
    Indels => "indels",
    All => "all",
});

string_enum!(PixelLayout, "pixel_layout", {
    Interleaved => "interleaved",
    Planar => "planar",
});

///
/// Options controlling how pileup images are built.
///
/// Loaded from TOML with [`PileupImageOptions::from_toml_str`] or
/// `PileupImageOptions::try_from(path)`; missing keys take their defaults.
/// Call [`PileupImageOptions::validate`] before processing any variant.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PileupImageOptions {
    pub width: usize,
    pub num_channels: usize,
    pub multi_allelic_mode: MultiAllelicMode,
    pub alt_aligned_pileup: AltAlignedPileup,
    pub types_to_alt_align: TypesToAltAlign,
    pub pixel_layout: PixelLayout,
    /// channel copied from alt-aligned rows in `diff_channels` mode; last channel when unset
    pub diff_channel: Option<usize>,
}

impl Default for PileupImageOptions {
    fn default() -> Self {
        PileupImageOptions {
            width: DEFAULT_WIDTH,
            num_channels: DEFAULT_NUM_CHANNELS,
            multi_allelic_mode: MultiAllelicMode::default(),
            alt_aligned_pileup: AltAlignedPileup::default(),
            types_to_alt_align: TypesToAltAlign::default(),
            pixel_layout: PixelLayout::default(),
            diff_channel: None,
        }
    }
}

impl PileupImageOptions {
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    ///
    /// Reject configurations that can never produce a valid image.
    ///
    pub fn validate(&self) -> ConfigResult<()> {
        if self.multi_allelic_mode == MultiAllelicMode::Unspecified {
            return Err(ConfigError::UnspecifiedMultiAllelicMode);
        }
        if self.width == 0 || self.width % 2 == 0 {
            return Err(ConfigError::InvalidWidth(self.width));
        }
        if self.num_channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        if let Some(channel) = self.diff_channel {
            if channel >= self.num_channels {
                return Err(ConfigError::DiffChannelOutOfRange {
                    channel,
                    num_channels: self.num_channels,
                });
            }
        }
        Ok(())
    }

    pub fn alt_alignment_enabled(&self) -> bool {
        self.alt_aligned_pileup != AltAlignedPileup::None
            && self.types_to_alt_align != TypesToAltAlign::None
    }

    /// Bases on either side of the variant covered by the window.
    pub fn half_width(&self) -> usize {
        self.width.saturating_sub(1) / 2
    }

    pub fn diff_channel_index(&self) -> usize {
        self.diff_channel
            .unwrap_or(self.num_channels.saturating_sub(1))
    }
}

impl TryFrom<&Path> for PileupImageOptions {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        Self::from_toml_str(&toml_str)
    }
}
