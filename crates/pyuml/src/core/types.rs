//! Core type definitions shared by extraction and rendering
//!
//! This module contains the small vocabulary types used throughout pyuml:
//! class stereotypes and the image formats understood by the drawing step.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::UmlError;

/// UML classification of a class box
///
/// Rendered verbatim as the first word of a class block:
/// ```text
/// abstract Shape {
/// ...
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stereotype {
    #[default]
    Class,
    Interface,
    Abstract,
}

impl Stereotype {
    /// Keyword used in the diagram notation
    pub fn as_str(&self) -> &'static str {
        match self {
            Stereotype::Class => "class",
            Stereotype::Interface => "interface",
            Stereotype::Abstract => "abstract",
        }
    }

    /// Get all valid stereotype names
    pub fn variants() -> &'static [&'static str] {
        &["class", "interface", "abstract"]
    }
}

impl FromStr for Stereotype {
    type Err = UmlError;

    // Matching is exact: the keyword lands in the output unchanged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(Stereotype::Class),
            "interface" => Ok(Stereotype::Interface),
            "abstract" => Ok(Stereotype::Abstract),
            other => Err(UmlError::invalid_stereotype(other)),
        }
    }
}

impl fmt::Display for Stereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format requested from the image rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
    /// PlantUML's ASCII-art output
    Txt,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
            ImageFormat::Txt => "txt",
        }
    }

    /// Guess the format from an output file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.to_lowercase().parse().ok()
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            "txt" => Ok(ImageFormat::Txt),
            _ => Err(format!("Unknown image format: {}", s)),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
