//! Runtime configuration.
//!
//! # Responsibility
//! - Describe logging settings and the initial table-level state.
//! - Decode configuration from JSON text; every field has a default.
//!
//! # Invariants
//! - A config that decodes successfully still has to pass `validate` before
//!   a runtime is built from it.

use crate::logging::default_log_level;
use crate::model::table::{Background, BoardProperties, PanZoomState, TableValidationError};
use crate::service::table_service::TableState;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` keeps logging off.
    pub log_dir: Option<String>,
    pub default_background: Background,
    pub default_board_properties: BoardProperties,
    pub default_pan_zoom: PanZoomState,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_background: Background::default(),
            default_board_properties: BoardProperties::default(),
            default_pan_zoom: PanZoomState::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_background.validate()?;
        self.default_board_properties.validate()?;
        self.default_pan_zoom.validate()?;
        Ok(())
    }

    /// Initial facade table state with derived board pixel size.
    pub fn initial_table_state(&self) -> Result<TableState, ConfigError> {
        Ok(TableState {
            background: self.default_background.clone(),
            board_properties: self.default_board_properties.clone().normalized()?,
            pan_zoom: self.default_pan_zoom,
            selected_object_id: None,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Table(TableValidationError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid runtime config json: {err}"),
            Self::Table(err) => write!(f, "invalid runtime config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Table(err) => Some(err),
        }
    }
}

impl From<TableValidationError> for ConfigError {
    fn from(value: TableValidationError) -> Self {
        Self::Table(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RuntimeConfig};
    use crate::model::table::{Background, LengthUnit};

    #[test]
    fn empty_json_object_yields_defaults() {
        let config = RuntimeConfig::from_json_str("{}").expect("empty config");
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = RuntimeConfig::from_json_str(
            r##"{
                "logLevel": "warn",
                "defaultBackground": {"type": "color", "value": "#224422"},
                "defaultBoardProperties": {
                    "widthUser": 24, "heightUser": 36, "unitForDimensions": "in",
                    "scaleRatio": 5, "unitForRatio": "ft"
                }
            }"##,
        )
        .expect("partial config");

        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.default_background,
            Background::Color("#224422".to_string())
        );
        let table = config.initial_table_state().expect("table state");
        assert_eq!(table.board_properties.unit_for_dimensions, LengthUnit::Inch);
        assert_eq!(table.board_properties.width_px, 24.0 * 96.0);
        assert_eq!(table.board_properties.height_px, 36.0 * 96.0);
    }

    #[test]
    fn rejects_zero_zoom() {
        let err = RuntimeConfig::from_json_str(
            r#"{"defaultPanZoom": {"panX": 0, "panY": 0, "zoom": 0}}"#,
        )
        .expect_err("zero zoom must be rejected");
        assert!(matches!(err, ConfigError::Table(_)));
    }
}
