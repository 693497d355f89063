//! Optional TOML palette overrides for the Macroquad backend.
//!
//! The built-in palette reproduces the campaign's original look; a theme file
//! may override individual entries without repeating the rest:
//!
//! ```toml
//! version = 1
//!
//! [colors]
//! background = "#1a202c"
//! path = "#4a5568"
//! ```

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use social_defence_rendering::Color;
use thiserror::Error;

const SUPPORTED_THEME_VERSION: u32 = 1;

/// Palette applied to the playfield chrome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    /// Solid color used to clear each frame.
    pub background: Color,
    /// Color of the path ribbon.
    pub path: Color,
    /// Color of the placement grid lines.
    pub grid: Color,
    /// Background color of the control panel.
    pub panel: Color,
    /// Backdrop of enemy health bars.
    pub health_track: Color,
    /// Fill of enemy health bars.
    pub health_fill: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(0x1a, 0x20, 0x2c),
            path: Color::from_rgb_u8(0x4a, 0x55, 0x68),
            grid: Color::new(1.0, 1.0, 1.0, 0.05),
            panel: Color::from_rgb_u8(0x1e, 0x29, 0x3b),
            health_track: Color::from_rgb_u8(0x4a, 0x55, 0x68),
            health_fill: Color::from_rgb_u8(0x48, 0xbb, 0x78),
        }
    }
}

impl Theme {
    /// Loads a theme from the TOML file at the provided path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses a theme from TOML contents, applying defaults for omitted keys.
    pub fn from_toml(contents: &str) -> Result<Self, ThemeError> {
        let manifest: ThemeManifest = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_THEME_VERSION {
            return Err(ThemeError::UnsupportedVersion {
                version: manifest.version,
            });
        }

        let mut theme = Self::default();
        for (name, literal) in &manifest.colors {
            let color = parse_hex_color(literal)
                .ok_or_else(|| ThemeError::InvalidColor(literal.clone()))?;
            match name.as_str() {
                "background" => theme.background = color,
                "path" => theme.path = color,
                "grid" => theme.grid = color,
                "panel" => theme.panel = color,
                "health_track" => theme.health_track = color,
                "health_fill" => theme.health_fill = color,
                other => {
                    return Err(ThemeError::UnknownEntry(other.to_owned()));
                }
            }
        }

        Ok(theme)
    }
}

#[derive(Debug, Deserialize)]
struct ThemeManifest {
    version: u32,
    #[serde(default)]
    colors: HashMap<String, String>,
}

/// Errors that can occur while loading a theme file.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The theme file could not be read from disk.
    #[error("failed to read theme file at {path}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The theme file was not valid TOML.
    #[error("failed to parse theme file")]
    Parse(#[from] toml::de::Error),
    /// The theme file declared an unsupported version.
    #[error("unsupported theme version {version}; expected {SUPPORTED_THEME_VERSION}")]
    UnsupportedVersion {
        /// Version declared by the file.
        version: u32,
    },
    /// A colour literal could not be parsed as `#rrggbb`.
    #[error("invalid colour literal `{0}`")]
    InvalidColor(String),
    /// The theme file named an entry that does not exist.
    #[error("unknown theme entry `{0}`")]
    UnknownEntry(String),
}

fn parse_hex_color(literal: &str) -> Option<Color> {
    let digits = literal.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let red = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let green = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let blue = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color::from_rgb_u8(red, green, blue))
}
