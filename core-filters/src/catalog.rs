//! Filter catalog and factory
//!
//! The catalog is the way to construct a new [`CameraFilter`]. It checks
//! that the image primitive knows the kind, that the parameter bag matches
//! the kind exactly and that every scalar lies within its declared range.

use crate::error::{FilterError, Result};
use crate::models::{
    wrong_type, CameraFilter, Color, FilterId, FilterKind, FilterSettings, ParameterKey,
    ParameterRange, ParameterValue, Parameters, POSTERIZE_LEVELS_MAX,
};
use bridge_traits::FilterBackend;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Declared parameter of a kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub key: ParameterKey,
    /// `None` for color parameters, whose components are always in `[0, 1]`
    pub range: Option<ParameterRange>,
}

/// Catalog entry for one filter kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindSpec {
    pub kind: FilterKind,
    pub system_name: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

/// Validating filter factory
#[derive(Clone)]
pub struct FilterCatalog {
    backend: Arc<dyn FilterBackend>,
    levels_range: ParameterRange,
}

impl FilterCatalog {
    pub fn new(backend: Arc<dyn FilterBackend>) -> Self {
        Self {
            backend,
            levels_range: ParameterKey::Levels
                .default_range()
                .unwrap_or(ParameterRange::new(0.0, POSTERIZE_LEVELS_MAX)),
        }
    }

    /// Override the lower bound for posterize levels. The upper bound stays
    /// at 10.
    pub fn with_levels_min(self, min: f32) -> Self {
        self.with_levels_range(ParameterRange::new(min, POSTERIZE_LEVELS_MAX))
    }

    pub fn with_levels_range(mut self, range: ParameterRange) -> Self {
        self.levels_range = range;
        self
    }

    pub fn backend(&self) -> &Arc<dyn FilterBackend> {
        &self.backend
    }

    /// Range the catalog enforces for `key`
    pub fn range(&self, key: ParameterKey) -> Option<ParameterRange> {
        match key {
            ParameterKey::Levels => Some(self.levels_range),
            other => other.default_range(),
        }
    }

    /// Kinds the image primitive supports, with their parameters
    pub fn kinds(&self) -> Vec<KindSpec> {
        FilterKind::ALL
            .into_iter()
            .filter(|kind| self.backend.supports(kind.system_name()))
            .map(|kind| KindSpec {
                kind,
                system_name: kind.system_name(),
                parameters: kind
                    .parameter_keys()
                    .iter()
                    .map(|&key| ParameterSpec {
                        key,
                        range: self.range(key),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Construct a filter from a parameter bag
    ///
    /// # Errors
    ///
    /// - [`FilterError::UnsupportedKind`] if the primitive rejects the kind
    /// - [`FilterError::UnexpectedParameter`] / [`FilterError::MissingParameter`]
    ///   if the bag does not match the kind exactly
    /// - [`FilterError::WrongParameterType`] / [`FilterError::OutOfRange`]
    ///   for bad values
    pub fn build(
        &self,
        id: FilterId,
        display_name: impl Into<String>,
        kind: FilterKind,
        parameters: &Parameters,
    ) -> Result<CameraFilter> {
        if !self.backend.supports(kind.system_name()) {
            return Err(FilterError::UnsupportedKind(kind.system_name().to_string()));
        }

        if let Some(extra) = parameters.keys().find(|key| !kind.accepts(**key)) {
            return Err(FilterError::UnexpectedParameter {
                kind: kind.as_str().to_string(),
                parameter: extra.as_str().to_string(),
            });
        }

        let scalar = |key: ParameterKey| -> Result<f32> {
            let value = self.require(kind, parameters, key)?;
            let v = value.as_scalar().ok_or_else(|| wrong_type(key))?;
            match self.range(key) {
                Some(range) => range.check(key, v),
                None => Ok(v),
            }
        };
        let color = |key: ParameterKey| -> Result<Color> {
            let value = self.require(kind, parameters, key)?;
            let c = value.as_color().ok_or_else(|| wrong_type(key))?;
            check_color(c)
        };

        let settings = match kind {
            FilterKind::Sepia => FilterSettings::Sepia {
                intensity: scalar(ParameterKey::Intensity)?,
            },
            FilterKind::Vintage => FilterSettings::Vintage,
            FilterKind::BlackWhite => FilterSettings::BlackWhite,
            FilterKind::Monochrome => FilterSettings::Monochrome {
                color: color(ParameterKey::Color)?,
                intensity: scalar(ParameterKey::Intensity)?,
            },
            FilterKind::Posterize => FilterSettings::Posterize {
                levels: scalar(ParameterKey::Levels)?,
            },
            FilterKind::Blur => FilterSettings::Blur {
                radius: scalar(ParameterKey::Radius)?,
            },
        };

        let filter = CameraFilter::new(id, display_name, settings);
        debug!(filter_id = %filter.id(), kind = %kind, "Constructed filter");
        Ok(filter)
    }

    /// Construct a filter from typed settings, validating ranges
    pub fn from_settings(
        &self,
        display_name: impl Into<String>,
        settings: FilterSettings,
    ) -> Result<CameraFilter> {
        self.build(
            FilterId::new(),
            display_name,
            settings.kind(),
            &settings.parameters(),
        )
    }

    pub fn sepia(&self, display_name: impl Into<String>, intensity: f32) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::Sepia { intensity })
    }

    pub fn vintage(&self, display_name: impl Into<String>) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::Vintage)
    }

    pub fn black_white(&self, display_name: impl Into<String>) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::BlackWhite)
    }

    pub fn monochrome(
        &self,
        display_name: impl Into<String>,
        color: Color,
        intensity: f32,
    ) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::Monochrome { color, intensity })
    }

    pub fn posterize(&self, display_name: impl Into<String>, levels: f32) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::Posterize { levels })
    }

    pub fn blur(&self, display_name: impl Into<String>, radius: f32) -> Result<CameraFilter> {
        self.from_settings(display_name, FilterSettings::Blur { radius })
    }

    /// Change one parameter of an existing filter using the catalog's ranges.
    /// On error the filter is left untouched.
    pub fn set_parameter(
        &self,
        filter: &mut CameraFilter,
        key: ParameterKey,
        value: ParameterValue,
    ) -> Result<()> {
        let kind = filter.kind();
        if !kind.accepts(key) {
            return Err(FilterError::UnexpectedParameter {
                kind: kind.as_str().to_string(),
                parameter: key.as_str().to_string(),
            });
        }

        let value = match (value, self.range(key)) {
            (ParameterValue::Scalar(v), Some(range)) => ParameterValue::Scalar(range.check(key, v)?),
            (ParameterValue::Color(c), None) => ParameterValue::Color(check_color(c)?),
            _ => return Err(wrong_type(key)),
        };
        filter.settings_mut().put(key, value)
    }

    fn require<'a>(
        &self,
        kind: FilterKind,
        parameters: &'a Parameters,
        key: ParameterKey,
    ) -> Result<&'a ParameterValue> {
        parameters
            .get(&key)
            .ok_or_else(|| FilterError::MissingParameter {
                kind: kind.as_str().to_string(),
                parameter: key.as_str().to_string(),
            })
    }
}

impl fmt::Debug for FilterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCatalog")
            .field("levels_range", &self.levels_range)
            .finish()
    }
}

pub(crate) fn check_color(color: Color) -> Result<Color> {
    match color
        .components()
        .into_iter()
        .find(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
    {
        Some(bad) => Err(FilterError::OutOfRange {
            parameter: ParameterKey::Color.as_str().to_string(),
            value: bad,
            min: 0.0,
            max: 1.0,
        }),
        None => Ok(color),
    }
}
