use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A property of an observed element that queries can compare against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Property {
    Width,
    Height,
    AspectRatio,
    Orientation,
    Children,
    Characters,
}

impl Property {
    /// Every watchable property, in canonical order
    pub const ALL: [Property; 6] = [
        Property::Width,
        Property::Height,
        Property::AspectRatio,
        Property::Orientation,
        Property::Children,
        Property::Characters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Width => "width",
            Property::Height => "height",
            Property::AspectRatio => "aspect-ratio",
            Property::Orientation => "orientation",
            Property::Children => "children",
            Property::Characters => "characters",
        }
    }

    /// Width and height, which are mirrored with a `px` suffix
    pub fn is_dimension(&self) -> bool {
        matches!(self, Property::Width | Property::Height)
    }

    /// Properties derived from the element's content box
    pub fn depends_on_box(&self) -> bool {
        matches!(
            self,
            Property::Width | Property::Height | Property::Orientation | Property::AspectRatio
        )
    }

    /// Counts default to zero when an element never reported them
    pub fn is_count(&self) -> bool {
        matches!(self, Property::Children | Property::Characters)
    }

    /// Name of the custom property mirroring this value, e.g. `--ea-width`
    pub fn custom_property_name(&self) -> String {
        format!("--ea-{}", self.as_str())
    }

    /// Comma separated list of every property name, for error messages
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(Property::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "width" => Ok(Property::Width),
            "height" => Ok(Property::Height),
            "aspect-ratio" => Ok(Property::AspectRatio),
            "orientation" => Ok(Property::Orientation),
            "children" => Ok(Property::Children),
            "characters" => Ok(Property::Characters),
            _ => Err(QueryError::unknown_property(s)),
        }
    }
}

/// Orientation of an element's content box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            "square" => Ok(Orientation::Square),
            _ => Err(QueryError::unknown_orientation(s)),
        }
    }
}
