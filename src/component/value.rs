//! Typed property values.
//!
//! Every property held by a [`PropertyStore`](crate::component::PropertyStore)
//! is a [`PropertyValue`]. Values coming from the client arrive as raw strings
//! and are coerced through [`ValueKind::coerce`]; values going to the client
//! are rendered with their [`Display`](std::fmt::Display) implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("`{0}` is not an integer")]
    InvalidInteger(String),
    #[error("`{0}` is not a boolean")]
    InvalidBoolean(String),
    #[error("`{0}` is not an extent")]
    InvalidExtent(String),
    #[error("`{0}` is not a #rrggbb color")]
    InvalidColor(String),
    #[error("`{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentUnit {
    Px,
    Percent,
    Em,
    Pt,
}

impl ExtentUnit {
    fn suffix(&self) -> &'static str {
        match self {
            ExtentUnit::Px => "px",
            ExtentUnit::Percent => "%",
            ExtentUnit::Em => "em",
            ExtentUnit::Pt => "pt",
        }
    }
}

/// A length with a unit, e.g. `120px` or `50%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub value: i32,
    pub unit: ExtentUnit,
}

impl Extent {
    pub fn new(value: i32, unit: ExtentUnit) -> Self {
        Self { value, unit }
    }

    pub fn px(value: i32) -> Self {
        Self::new(value, ExtentUnit::Px)
    }

    pub fn percent(value: i32) -> Self {
        Self::new(value, ExtentUnit::Percent)
    }
}

impl FromStr for Extent {
    type Err = ValueError;

    /// A bare number is taken as pixels, which is what clients send for
    /// dragged positions.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let units = [
            ("px", ExtentUnit::Px),
            ("%", ExtentUnit::Percent),
            ("em", ExtentUnit::Em),
            ("pt", ExtentUnit::Pt),
        ];
        let (number, unit) = units
            .iter()
            .find_map(|(suffix, unit)| s.strip_suffix(suffix).map(|n| (n, *unit)))
            .unwrap_or((s, ExtentUnit::Px));

        number
            .trim()
            .parse::<i32>()
            .map(|value| Extent::new(value, unit))
            .map_err(|_| ValueError::InvalidExtent(raw.to_string()))
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidColor(raw.to_string());
        let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The value of a single component property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Extent(Extent),
    Color(Color),
    Date(Date),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Text(_) => ValueKind::Text,
            PropertyValue::Integer(_) => ValueKind::Integer,
            PropertyValue::Boolean(_) => ValueKind::Boolean,
            PropertyValue::Extent(_) => ValueKind::Extent,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Date(_) => ValueKind::Date,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_extent(&self) -> Option<Extent> {
        match self {
            PropertyValue::Extent(e) => Some(*e),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Boolean(b) => write!(f, "{b}"),
            PropertyValue::Extent(e) => write!(f, "{e}"),
            PropertyValue::Color(c) => write!(f, "{c}"),
            PropertyValue::Date(d) => f.write_str(&d.format(DATE_FORMAT).map_err(|_| fmt::Error)?),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Extent> for PropertyValue {
    fn from(e: Extent) -> Self {
        PropertyValue::Extent(e)
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        PropertyValue::Color(c)
    }
}

impl From<Date> for PropertyValue {
    fn from(d: Date) -> Self {
        PropertyValue::Date(d)
    }
}

/// The expected type of a property, used to coerce raw client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Boolean,
    Extent,
    Color,
    Date,
}

impl ValueKind {
    /// Parse a raw client-submitted string into a value of this kind.
    pub fn coerce(&self, raw: &str) -> Result<PropertyValue, ValueError> {
        match self {
            ValueKind::Text => Ok(PropertyValue::Text(raw.to_string())),
            ValueKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(PropertyValue::Integer)
                .map_err(|_| ValueError::InvalidInteger(raw.to_string())),
            ValueKind::Boolean => {
                let s = raw.trim();
                if s.eq_ignore_ascii_case("true") {
                    Ok(PropertyValue::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(PropertyValue::Boolean(false))
                } else {
                    Err(ValueError::InvalidBoolean(raw.to_string()))
                }
            }
            ValueKind::Extent => raw.parse::<Extent>().map(PropertyValue::Extent),
            ValueKind::Color => raw.parse::<Color>().map(PropertyValue::Color),
            ValueKind::Date => Date::parse(raw.trim(), DATE_FORMAT)
                .map(PropertyValue::Date)
                .map_err(|_| ValueError::InvalidDate(raw.to_string())),
        }
    }
}
