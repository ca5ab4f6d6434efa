//! Table-level state that is not stored per object.
//!
//! # Responsibility
//! - Define background, board properties, and pan/zoom value types.
//! - Parse raw board-settings form text into validated `BoardProperties`.
//!
//! # Invariants
//! - `BoardProperties::width_px`/`height_px` are always derived from the
//!   user-facing size and unit, never taken from callers.
//! - A scale ratio of zero is only accepted when the raw text is a literal
//!   zero; text that merely evaluates to zero is rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_TABLE_COLOR: &str = "#FFFFFF";
const CSS_PIXELS_PER_INCH: f64 = 96.0;
const CENTIMETERS_PER_INCH: f64 = 2.54;

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("decimal pattern is valid")
});
static LITERAL_ZERO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(0+\.?0*|\.0+)$").expect("zero pattern is valid"));

/// Table background: a solid color or an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    Color(String),
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(DEFAULT_TABLE_COLOR.to_string())
    }
}

impl Background {
    pub fn value(&self) -> &str {
        match self {
            Self::Color(value) | Self::Image(value) => value,
        }
    }

    pub fn validate(&self) -> Result<(), TableValidationError> {
        if self.value().trim().is_empty() {
            return Err(TableValidationError::EmptyBackground);
        }
        Ok(())
    }
}

/// Length units accepted for board size and map scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "px")]
    Pixel,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "m")]
    Meter,
}

impl LengthUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pixel => "px",
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Inch => "in",
            Self::Foot => "ft",
            Self::Meter => "m",
        }
    }

    /// CSS reference pixels per one unit.
    pub fn pixels_per_unit(self) -> f64 {
        match self {
            Self::Pixel => 1.0,
            Self::Millimeter => CSS_PIXELS_PER_INCH / (CENTIMETERS_PER_INCH * 10.0),
            Self::Centimeter => CSS_PIXELS_PER_INCH / CENTIMETERS_PER_INCH,
            Self::Inch => CSS_PIXELS_PER_INCH,
            Self::Foot => CSS_PIXELS_PER_INCH * 12.0,
            Self::Meter => CSS_PIXELS_PER_INCH * 100.0 / CENTIMETERS_PER_INCH,
        }
    }
}

pub fn parse_length_unit(value: &str) -> Result<LengthUnit, TableValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "px" => Ok(LengthUnit::Pixel),
        "mm" => Ok(LengthUnit::Millimeter),
        "cm" => Ok(LengthUnit::Centimeter),
        "in" => Ok(LengthUnit::Inch),
        "ft" => Ok(LengthUnit::Foot),
        "m" => Ok(LengthUnit::Meter),
        other => Err(TableValidationError::UnknownUnit(other.to_string())),
    }
}

/// Physical board size plus the map scale shown to players.
///
/// `scale_ratio` reads as "one `unit_for_dimensions` on the board equals
/// `scale_ratio` `unit_for_ratio` in the game world".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardProperties {
    pub width_user: f64,
    pub height_user: f64,
    pub unit_for_dimensions: LengthUnit,
    pub scale_ratio: f64,
    pub unit_for_ratio: LengthUnit,
    #[serde(default)]
    pub width_px: f64,
    #[serde(default)]
    pub height_px: f64,
}

impl Default for BoardProperties {
    fn default() -> Self {
        Self {
            width_user: 1000.0,
            height_user: 1000.0,
            unit_for_dimensions: LengthUnit::Pixel,
            scale_ratio: 1.0,
            unit_for_ratio: LengthUnit::Meter,
            width_px: 1000.0,
            height_px: 1000.0,
        }
    }
}

impl BoardProperties {
    /// Builds validated properties with derived pixel size.
    pub fn new(
        width_user: f64,
        height_user: f64,
        unit_for_dimensions: LengthUnit,
        scale_ratio: f64,
        unit_for_ratio: LengthUnit,
    ) -> Result<Self, TableValidationError> {
        Self {
            width_user,
            height_user,
            unit_for_dimensions,
            scale_ratio,
            unit_for_ratio,
            width_px: 0.0,
            height_px: 0.0,
        }
        .normalized()
    }

    pub fn validate(&self) -> Result<(), TableValidationError> {
        if !(self.width_user.is_finite() && self.width_user > 0.0) {
            return Err(TableValidationError::InvalidBoardDimension("widthUser"));
        }
        if !(self.height_user.is_finite() && self.height_user > 0.0) {
            return Err(TableValidationError::InvalidBoardDimension("heightUser"));
        }
        if !(self.scale_ratio.is_finite() && self.scale_ratio >= 0.0) {
            return Err(TableValidationError::InvalidScaleRatio);
        }
        Ok(())
    }

    /// Validates, then recomputes the derived pixel size. A size whose pixel
    /// value overflows is rejected.
    pub fn normalized(mut self) -> Result<Self, TableValidationError> {
        self.validate()?;
        let factor = self.unit_for_dimensions.pixels_per_unit();
        self.width_px = (self.width_user * factor).round();
        self.height_px = (self.height_user * factor).round();
        if !self.width_px.is_finite() {
            return Err(TableValidationError::InvalidBoardDimension("widthUser"));
        }
        if !self.height_px.is_finite() {
            return Err(TableValidationError::InvalidBoardDimension("heightUser"));
        }
        Ok(self)
    }
}

/// Raw board-settings form input, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSettingsForm {
    pub width: String,
    pub height: String,
    pub unit_for_dimensions: String,
    pub scale_ratio: String,
    pub unit_for_ratio: String,
}

impl BoardSettingsForm {
    pub fn parse(&self) -> Result<BoardProperties, TableValidationError> {
        let width_user = parse_decimal("width", &self.width)?;
        let height_user = parse_decimal("height", &self.height)?;
        let unit_for_dimensions = parse_length_unit(&self.unit_for_dimensions)?;
        let scale_ratio = parse_scale_ratio(&self.scale_ratio)?;
        let unit_for_ratio = parse_length_unit(&self.unit_for_ratio)?;
        BoardProperties::new(
            width_user,
            height_user,
            unit_for_dimensions,
            scale_ratio,
            unit_for_ratio,
        )
    }
}

fn parse_decimal(field: &'static str, input: &str) -> Result<f64, TableValidationError> {
    let trimmed = input.trim();
    let unparsed = || TableValidationError::UnparsedNumber {
        field,
        input: input.to_string(),
    };
    if !DECIMAL_RE.is_match(trimmed) {
        return Err(unparsed());
    }
    trimmed.parse::<f64>().map_err(|_| unparsed())
}

fn parse_scale_ratio(input: &str) -> Result<f64, TableValidationError> {
    let value = parse_decimal("scaleRatio", input)?;
    if value == 0.0 && !LITERAL_ZERO_RE.is_match(input.trim()) {
        return Err(TableValidationError::AmbiguousZeroScale(input.to_string()));
    }
    Ok(value)
}

/// Viewport offset and magnification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanZoomState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for PanZoomState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl PanZoomState {
    pub fn validate(&self) -> Result<(), TableValidationError> {
        if !self.pan_x.is_finite() {
            return Err(TableValidationError::InvalidPanZoom("panX"));
        }
        if !self.pan_y.is_finite() {
            return Err(TableValidationError::InvalidPanZoom("panY"));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(TableValidationError::InvalidPanZoom("zoom"));
        }
        Ok(())
    }
}

/// Validation failures for table-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableValidationError {
    EmptyBackground,
    InvalidBoardDimension(&'static str),
    InvalidScaleRatio,
    UnparsedNumber { field: &'static str, input: String },
    AmbiguousZeroScale(String),
    UnknownUnit(String),
    InvalidPanZoom(&'static str),
}

impl Display for TableValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBackground => write!(f, "background value must not be empty"),
            Self::InvalidBoardDimension(field) => {
                write!(f, "board `{field}` must be a finite number > 0")
            }
            Self::InvalidScaleRatio => write!(f, "scale ratio must be a finite number >= 0"),
            Self::UnparsedNumber { field, input } => {
                write!(f, "`{field}` is not a number: `{input}`")
            }
            Self::AmbiguousZeroScale(input) => {
                write!(f, "scale ratio `{input}` evaluates to zero but is not a literal 0")
            }
            Self::UnknownUnit(value) => write!(f, "unknown length unit: {value}"),
            Self::InvalidPanZoom(field) => write!(f, "pan/zoom `{field}` is out of range"),
        }
    }
}

impl Error for TableValidationError {}
