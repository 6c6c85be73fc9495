use crate::error::QueryError;
use crate::property::Property;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative and absolute CSS length units other than `px`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Cap,
    Ch,
    Em,
    Ex,
    Ic,
    Lh,
    Rem,
    Rlh,
    Vb,
    Vh,
    Vi,
    Vw,
    Vmin,
    Vmax,
    Mm,
    Q,
    Cm,
    In,
    Pt,
    Pc,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 20] = [
        LengthUnit::Cap,
        LengthUnit::Ch,
        LengthUnit::Em,
        LengthUnit::Ex,
        LengthUnit::Ic,
        LengthUnit::Lh,
        LengthUnit::Rem,
        LengthUnit::Rlh,
        LengthUnit::Vb,
        LengthUnit::Vh,
        LengthUnit::Vi,
        LengthUnit::Vw,
        LengthUnit::Vmin,
        LengthUnit::Vmax,
        LengthUnit::Mm,
        LengthUnit::Q,
        LengthUnit::Cm,
        LengthUnit::In,
        LengthUnit::Pt,
        LengthUnit::Pc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Cap => "cap",
            LengthUnit::Ch => "ch",
            LengthUnit::Em => "em",
            LengthUnit::Ex => "ex",
            LengthUnit::Ic => "ic",
            LengthUnit::Lh => "lh",
            LengthUnit::Rem => "rem",
            LengthUnit::Rlh => "rlh",
            LengthUnit::Vb => "vb",
            LengthUnit::Vh => "vh",
            LengthUnit::Vi => "vi",
            LengthUnit::Vw => "vw",
            LengthUnit::Vmin => "vmin",
            LengthUnit::Vmax => "vmax",
            LengthUnit::Mm => "mm",
            LengthUnit::Q => "q",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
            LengthUnit::Pt => "pt",
            LengthUnit::Pc => "pc",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == lower)
            .ok_or_else(|| QueryError::unknown_unit(s))
    }
}

/// Measurement axis of a percentage, which resolves against the containing block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    /// Axis a `%` literal refers to when it qualifies `property`
    pub fn for_property(property: Property) -> Option<Axis> {
        match property {
            Property::Width => Some(Axis::Width),
            Property::Height => Some(Axis::Height),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }

    /// Symbol used in measurement tables: `w%` or `h%`
    pub fn percent_symbol(&self) -> &'static str {
        match self {
            Axis::Width => "w%",
            Axis::Height => "h%",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a measurement table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKey {
    Length(LengthUnit),
    Percent(Axis),
}

impl From<LengthUnit> for UnitKey {
    fn from(unit: LengthUnit) -> Self {
        UnitKey::Length(unit)
    }
}

impl From<Axis> for UnitKey {
    fn from(axis: Axis) -> Self {
        UnitKey::Percent(axis)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKey::Length(unit) => f.write_str(unit.as_str()),
            UnitKey::Percent(axis) => f.write_str(axis.percent_symbol()),
        }
    }
}

impl FromStr for UnitKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w%" => Ok(UnitKey::Percent(Axis::Width)),
            "h%" => Ok(UnitKey::Percent(Axis::Height)),
            other => other.parse::<LengthUnit>().map(UnitKey::Length),
        }
    }
}
