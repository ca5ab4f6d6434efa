//! Placeable object domain model.
//!
//! # Responsibility
//! - Define the canonical `VttObject` record and its nested value types.
//! - Define typed patches and the field-level merge shared by create/update.
//!
//! # Invariants
//! - `id` is stable and never reused for another object.
//! - `width` and `height` are always >= `MIN_DIMENSION` once normalized.
//! - `data` is always a JSON object; patches carrying anything else are
//!   rejected by `ObjectPatch::validate` before any merge happens.
//! - Nested records (`appearance`, `data`, `scripts`) merge key-by-key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one placeable object.
pub type ObjectId = Uuid;

/// Smallest width/height an object may have, in board units.
pub const MIN_DIMENSION: f64 = 1.0;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#CCCCCC";
pub const DEFAULT_BORDER_COLOR: &str = "#000000";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_BORDER_WIDTH: f64 = 1.0;
pub const DEFAULT_OBJECT_TYPE: &str = "generic";

/// Closed set of drawable outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Rectangle,
    Circle,
}

impl Shape {
    /// Stable string id used in payloads and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
        }
    }

    /// Width and height used when the caller does not supply them.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Rectangle => (100.0, 100.0),
            Self::Circle => (50.0, 50.0),
        }
    }
}

/// Parses one shape from its payload string.
pub fn parse_shape(value: &str) -> Result<Shape, ObjectValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "rectangle" => Ok(Shape::Rectangle),
        "circle" => Ok(Shape::Circle),
        other => Err(ObjectValidationError::UnknownShape(other.to_string())),
    }
}

/// Visual styling of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appearance {
    pub background_color: String,
    /// Empty when no image is attached.
    pub image_url: String,
    pub border_color: String,
    pub border_width: f64,
    pub text_color: String,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub show_label: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            image_url: String::new(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            border_width: DEFAULT_BORDER_WIDTH,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            text: String::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            show_label: false,
        }
    }
}

/// Named behavior hooks. Stored as opaque text, never executed by core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scripts {
    pub on_click: String,
}

/// Canonical record for one placeable object (token, tile, marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VttObject {
    pub id: ObjectId,
    /// Informational classification; no behavior keys off it.
    #[serde(rename = "type", default = "default_object_type")]
    pub object_type: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, unconstrained.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_index: i64,
    pub shape: Shape,
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default = "default_movable")]
    pub is_movable: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub scripts: Scripts,
    #[serde(default)]
    pub name: String,
}

fn default_object_type() -> String {
    DEFAULT_OBJECT_TYPE.to_string()
}

fn default_movable() -> bool {
    true
}

impl VttObject {
    /// Builds the complete default record for `shape`.
    ///
    /// `ordinal` is the store size at creation time and feeds the
    /// placeholder name `Object N`.
    pub fn with_defaults(id: ObjectId, shape: Shape, ordinal: usize) -> Self {
        let (width, height) = shape.default_size();
        Self {
            id,
            object_type: default_object_type(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
            shape,
            appearance: Appearance::default(),
            is_movable: true,
            data: Map::new(),
            scripts: Scripts::default(),
            name: placeholder_name(ordinal),
        }
    }

    /// Validates record-level invariants for externally supplied objects.
    pub fn validate(&self) -> Result<(), ObjectValidationError> {
        if self.id.is_nil() {
            return Err(ObjectValidationError::NilId);
        }
        require_finite("x", self.x)?;
        require_finite("y", self.y)?;
        require_finite("rotation", self.rotation)?;
        require_non_negative("appearance.borderWidth", self.appearance.border_width)?;
        require_non_negative("appearance.fontSize", self.appearance.font_size)?;
        Ok(())
    }

    /// Clamps width/height into the valid range.
    pub fn normalize_dimensions(&mut self) {
        self.width = clamp_dimension(self.width);
        self.height = clamp_dimension(self.height);
    }
}

/// Name given to objects created or imported without one.
pub fn placeholder_name(ordinal: usize) -> String {
    format!("Object {ordinal}")
}

/// Clamps one dimension to `MIN_DIMENSION`; NaN and infinities clamp too.
pub fn clamp_dimension(value: f64) -> f64 {
    if !value.is_finite() || value < MIN_DIMENSION {
        MIN_DIMENSION
    } else {
        value
    }
}

/// Partial update for `Appearance`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearancePatch {
    pub background_color: Option<String>,
    pub image_url: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<f64>,
    pub text_color: Option<String>,
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub show_label: Option<bool>,
}

impl AppearancePatch {
    pub fn validate(&self) -> Result<(), ObjectValidationError> {
        if let Some(value) = self.border_width {
            require_non_negative("appearance.borderWidth", value)?;
        }
        if let Some(value) = self.font_size {
            require_non_negative("appearance.fontSize", value)?;
        }
        Ok(())
    }

    pub fn merge_into(&self, target: &mut Appearance) {
        merge_field(&mut target.background_color, &self.background_color);
        merge_field(&mut target.image_url, &self.image_url);
        merge_field(&mut target.border_color, &self.border_color);
        merge_field(&mut target.border_width, &self.border_width);
        merge_field(&mut target.text_color, &self.text_color);
        merge_field(&mut target.text, &self.text);
        merge_field(&mut target.font_family, &self.font_family);
        merge_field(&mut target.font_size, &self.font_size);
        merge_field(&mut target.show_label, &self.show_label);
    }
}

/// Partial update for `Scripts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptsPatch {
    pub on_click: Option<String>,
}

impl ScriptsPatch {
    pub fn merge_into(&self, target: &mut Scripts) {
        merge_field(&mut target.on_click, &self.on_click);
    }
}

/// Caller-supplied field set for create/update.
///
/// `id` exists only so payloads echoing an id deserialize; it is never
/// applied. `data` stays an untyped JSON value until `validate` confirms it
/// is an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectPatch {
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i64>,
    pub shape: Option<Shape>,
    pub appearance: Option<AppearancePatch>,
    pub is_movable: Option<bool>,
    pub data: Option<Value>,
    pub scripts: Option<ScriptsPatch>,
    pub name: Option<String>,
}

impl ObjectPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a patch from a JSON payload.
    ///
    /// Type mismatches such as `"x": "left"` surface as
    /// `ObjectValidationError::MalformedPatch`.
    pub fn from_json_value(value: Value) -> Result<Self, ObjectValidationError> {
        serde_json::from_value(value)
            .map_err(|err| ObjectValidationError::MalformedPatch(err.to_string()))
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn appearance(mut self, appearance: AppearancePatch) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn on_click(mut self, script: impl Into<String>) -> Self {
        self.scripts = Some(ScriptsPatch {
            on_click: Some(script.into()),
        });
        self
    }

    /// Checks every supplied field before any merge touches a record.
    ///
    /// NaN width/height is accepted here because it clamps during merge.
    pub fn validate(&self) -> Result<(), ObjectValidationError> {
        if let Some(value) = self.x {
            require_finite("x", value)?;
        }
        if let Some(value) = self.y {
            require_finite("y", value)?;
        }
        if let Some(value) = self.rotation {
            require_finite("rotation", value)?;
        }
        if let Some(appearance) = &self.appearance {
            appearance.validate()?;
        }
        if let Some(data) = &self.data {
            if !data.is_object() {
                return Err(ObjectValidationError::DataNotObject {
                    found: json_kind(data),
                });
            }
        }
        Ok(())
    }

    /// Field-level merge of this patch over `target`.
    ///
    /// Callers must run `validate` first. `id` is never touched.
    pub fn merge_into(&self, target: &mut VttObject) {
        merge_field(&mut target.object_type, &self.object_type);
        merge_field(&mut target.x, &self.x);
        merge_field(&mut target.y, &self.y);
        merge_field(&mut target.width, &self.width);
        merge_field(&mut target.height, &self.height);
        merge_field(&mut target.rotation, &self.rotation);
        merge_field(&mut target.z_index, &self.z_index);
        merge_field(&mut target.shape, &self.shape);
        merge_field(&mut target.is_movable, &self.is_movable);
        merge_field(&mut target.name, &self.name);
        if let Some(appearance) = &self.appearance {
            appearance.merge_into(&mut target.appearance);
        }
        if let Some(scripts) = &self.scripts {
            scripts.merge_into(&mut target.scripts);
        }
        if let Some(Value::Object(entries)) = &self.data {
            for (key, value) in entries {
                target.data.insert(key.clone(), value.clone());
            }
        }
        target.normalize_dimensions();
    }
}

fn merge_field<T: Clone>(target: &mut T, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *target = value.clone();
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ObjectValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ObjectValidationError::NonFiniteGeometry(field))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ObjectValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ObjectValidationError::InvalidAppearance(field))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Object-level validation failures. Raised before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectValidationError {
    NilId,
    NonFiniteGeometry(&'static str),
    InvalidAppearance(&'static str),
    DataNotObject { found: &'static str },
    UnknownShape(String),
    MalformedPatch(String),
}

impl Display for ObjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "object id must not be nil"),
            Self::NonFiniteGeometry(field) => {
                write!(f, "geometry field `{field}` must be a finite number")
            }
            Self::InvalidAppearance(field) => {
                write!(f, "appearance field `{field}` must be a finite number >= 0")
            }
            Self::DataNotObject { found } => {
                write!(f, "object data must be a JSON object, got {found}")
            }
            Self::UnknownShape(value) => write!(f, "unknown shape: {value}"),
            Self::MalformedPatch(message) => write!(f, "malformed object payload: {message}"),
        }
    }
}

impl Error for ObjectValidationError {}

#[cfg(test)]
mod tests {
    use super::{clamp_dimension, json_kind, parse_shape, ObjectValidationError, Shape};
    use serde_json::json;

    #[test]
    fn clamp_dimension_handles_nan_infinity_and_small_values() {
        assert_eq!(clamp_dimension(f64::NAN), 1.0);
        assert_eq!(clamp_dimension(f64::INFINITY), 1.0);
        assert_eq!(clamp_dimension(-5.0), 1.0);
        assert_eq!(clamp_dimension(0.5), 1.0);
        assert_eq!(clamp_dimension(42.5), 42.5);
    }

    #[test]
    fn parse_shape_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(parse_shape(" Circle ").expect("circle parse"), Shape::Circle);
        assert_eq!(
            parse_shape("hexagon").expect_err("hexagon is not a shape"),
            ObjectValidationError::UnknownShape("hexagon".to_string())
        );
    }

    #[test]
    fn json_kind_names_every_variant() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1])), "array");
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!({})), "object");
    }
}
