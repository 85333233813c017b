//! Domain models for camera filters
//!
//! A filter is an identity, a display name and a [`FilterSettings`] value.
//! The settings enum carries exactly the parameters its kind needs, so a
//! partially configured filter cannot be represented.

use crate::catalog::check_color;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for a filter
///
/// New filters get a UUID v4; identifiers read back from a store are kept
/// verbatim since other clients may have written them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterId(String);

impl FilterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string().to_uppercase())
    }

    pub fn from_string(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains(['/', '.', '#', '$', '[', ']']) {
            return Err(FilterError::InvalidRecord {
                id: s.to_string(),
                message: "filter id must be non-empty and must not contain / . # $ [ ]"
                    .to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FilterId {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_string(&value)
    }
}

impl From<FilterId> for String {
    fn from(id: FilterId) -> Self {
        id.0
    }
}

impl Default for FilterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Kinds and parameters
// =============================================================================

/// Supported filter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Sepia,
    /// Photo-effect transfer
    Vintage,
    /// Photo-effect tonal
    #[serde(rename = "black-and-white")]
    BlackWhite,
    Monochrome,
    Posterize,
    #[serde(rename = "box-blur")]
    Blur,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::BlackWhite,
        FilterKind::Monochrome,
        FilterKind::Posterize,
        FilterKind::Blur,
    ];

    /// Name of the image primitive implementing this kind
    pub fn system_name(&self) -> &'static str {
        match self {
            FilterKind::Sepia => "CISepiaTone",
            FilterKind::Vintage => "CIPhotoEffectTransfer",
            FilterKind::BlackWhite => "CIPhotoEffectTonal",
            FilterKind::Monochrome => "CIColorMonochrome",
            FilterKind::Posterize => "CIColorPosterize",
            FilterKind::Blur => "CIBoxBlur",
        }
    }

    pub fn from_system_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.system_name() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Sepia => "sepia",
            FilterKind::Vintage => "vintage",
            FilterKind::BlackWhite => "black-and-white",
            FilterKind::Monochrome => "monochrome",
            FilterKind::Posterize => "posterize",
            FilterKind::Blur => "box-blur",
        }
    }

    /// Parameters this kind requires, no more and no fewer
    pub fn parameter_keys(&self) -> &'static [ParameterKey] {
        match self {
            FilterKind::Sepia => &[ParameterKey::Intensity],
            FilterKind::Vintage | FilterKind::BlackWhite => &[],
            FilterKind::Monochrome => &[ParameterKey::Color, ParameterKey::Intensity],
            FilterKind::Posterize => &[ParameterKey::Levels],
            FilterKind::Blur => &[ParameterKey::Radius],
        }
    }

    pub fn accepts(&self, key: ParameterKey) -> bool {
        self.parameter_keys().contains(&key)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.system_name() == s)
            .ok_or_else(|| FilterError::UnsupportedKind(s.to_string()))
    }
}

/// Tunable parameter names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKey {
    Color,
    Intensity,
    Radius,
    Levels,
}

impl ParameterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKey::Color => "color",
            ParameterKey::Intensity => "intensity",
            ParameterKey::Radius => "radius",
            ParameterKey::Levels => "levels",
        }
    }

    /// Input key understood by the image primitive and the store
    pub fn input_key(&self) -> &'static str {
        match self {
            ParameterKey::Color => bridge_traits::filter::INPUT_COLOR,
            ParameterKey::Intensity => bridge_traits::filter::INPUT_INTENSITY,
            ParameterKey::Radius => bridge_traits::filter::INPUT_RADIUS,
            ParameterKey::Levels => bridge_traits::filter::INPUT_LEVELS,
        }
    }

    /// Declared range for scalar parameters; `None` for color.
    pub fn default_range(&self) -> Option<ParameterRange> {
        match self {
            ParameterKey::Color => None,
            ParameterKey::Intensity => Some(INTENSITY_RANGE),
            ParameterKey::Radius => Some(RADIUS_RANGE),
            ParameterKey::Levels => Some(ParameterRange::new(POSTERIZE_LEVELS_MIN, POSTERIZE_LEVELS_MAX)),
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval of accepted scalar values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
}

impl ParameterRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub(crate) fn check(&self, key: ParameterKey, value: f32) -> Result<f32> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(FilterError::OutOfRange {
                parameter: key.as_str().to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const INTENSITY_RANGE: ParameterRange = ParameterRange::new(0.0, 1.0);
pub const RADIUS_RANGE: ParameterRange = ParameterRange::new(0.0, 20.0);
/// Lower bound for posterize levels unless the catalog is configured otherwise
pub const POSTERIZE_LEVELS_MIN: f32 = 0.0;
pub const POSTERIZE_LEVELS_MAX: f32 = 10.0;

// =============================================================================
// Color
// =============================================================================

/// RGBA color, components in `[0, 1]`
///
/// The string form is the primitive's vector notation: space separated
/// components in shortest decimal form, e.g. cyan is `"0 1 1 1"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const ZERO: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const CYAN: Color = Color::rgba(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgba(1.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn components(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_valid(&self) -> bool {
        self.components()
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts 3 or 4 components, optionally wrapped in `[ ]`. Alpha
    /// defaults to 1.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let components = inner
            .split_whitespace()
            .map(|part| {
                part.parse::<f32>()
                    .map_err(|_| format!("'{}' is not a number", part))
            })
            .collect::<std::result::Result<Vec<f32>, String>>()?;

        match components.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(format!(
                "expected 3 or 4 components, got {}",
                components.len()
            )),
        }
    }
}

// =============================================================================
// Parameter values
// =============================================================================

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(f32),
    Color(Color),
}

impl ParameterValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParameterValue::Scalar(v) => Some(*v),
            ParameterValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParameterValue::Color(c) => Some(*c),
            ParameterValue::Scalar(_) => None,
        }
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Color> for ParameterValue {
    fn from(value: Color) -> Self {
        ParameterValue::Color(value)
    }
}

/// Parameter bag keyed by name
pub type Parameters = BTreeMap<ParameterKey, ParameterValue>;

// =============================================================================
// Settings
// =============================================================================

/// Kind plus the parameters that kind requires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterSettings {
    Sepia {
        intensity: f32,
    },
    Vintage,
    #[serde(rename = "black-and-white")]
    BlackWhite,
    Monochrome {
        color: Color,
        intensity: f32,
    },
    Posterize {
        levels: f32,
    },
    #[serde(rename = "box-blur")]
    Blur {
        radius: f32,
    },
}

impl FilterSettings {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSettings::Sepia { .. } => FilterKind::Sepia,
            FilterSettings::Vintage => FilterKind::Vintage,
            FilterSettings::BlackWhite => FilterKind::BlackWhite,
            FilterSettings::Monochrome { .. } => FilterKind::Monochrome,
            FilterSettings::Posterize { .. } => FilterKind::Posterize,
            FilterSettings::Blur { .. } => FilterKind::Blur,
        }
    }

    /// The parameters as a bag; keys match `kind().parameter_keys()`.
    pub fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        if let Some(intensity) = self.intensity() {
            parameters.insert(ParameterKey::Intensity, intensity.into());
        }
        if let Some(color) = self.color() {
            parameters.insert(ParameterKey::Color, color.into());
        }
        if let Some(radius) = self.radius() {
            parameters.insert(ParameterKey::Radius, radius.into());
        }
        if let Some(levels) = self.levels() {
            parameters.insert(ParameterKey::Levels, levels.into());
        }
        parameters
    }

    pub fn intensity(&self) -> Option<f32> {
        match self {
            FilterSettings::Sepia { intensity } | FilterSettings::Monochrome { intensity, .. } => {
                Some(*intensity)
            }
            _ => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            FilterSettings::Monochrome { color, .. } => Some(*color),
            _ => None,
        }
    }

    pub fn radius(&self) -> Option<f32> {
        match self {
            FilterSettings::Blur { radius } => Some(*radius),
            _ => None,
        }
    }

    pub fn levels(&self) -> Option<f32> {
        match self {
            FilterSettings::Posterize { levels } => Some(*levels),
            _ => None,
        }
    }

    /// Store `value` under `key`. The key must belong to this kind and the
    /// value must have the matching type; ranges are the caller's concern.
    /// Check every parameter against its default range
    pub(crate) fn validate(&self) -> Result<()> {
        for (key, value) in self.parameters() {
            match value {
                ParameterValue::Scalar(v) => {
                    if let Some(range) = key.default_range() {
                        range.check(key, v)?;
                    }
                }
                ParameterValue::Color(c) => {
                    check_color(c)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn put(&mut self, key: ParameterKey, value: ParameterValue) -> Result<()> {
        let kind = self.kind();
        let unexpected = || FilterError::UnexpectedParameter {
            kind: kind.as_str().to_string(),
            parameter: key.as_str().to_string(),
        };

        match (self, key, value) {
            (FilterSettings::Sepia { intensity }, ParameterKey::Intensity, ParameterValue::Scalar(v))
            | (
                FilterSettings::Monochrome { intensity, .. },
                ParameterKey::Intensity,
                ParameterValue::Scalar(v),
            ) => *intensity = v,
            (FilterSettings::Monochrome { color, .. }, ParameterKey::Color, ParameterValue::Color(c)) => {
                *color = c
            }
            (FilterSettings::Posterize { levels }, ParameterKey::Levels, ParameterValue::Scalar(v)) => {
                *levels = v
            }
            (FilterSettings::Blur { radius }, ParameterKey::Radius, ParameterValue::Scalar(v)) => {
                *radius = v
            }
            _ if !kind.accepts(key) => return Err(unexpected()),
            _ => return Err(wrong_type(key)),
        }
        Ok(())
    }
}

pub(crate) fn wrong_type(key: ParameterKey) -> FilterError {
    FilterError::WrongParameterType {
        parameter: key.as_str().to_string(),
        expected: if key == ParameterKey::Color {
            "color".to_string()
        } else {
            "number".to_string()
        },
    }
}

// =============================================================================
// Filter entity
// =============================================================================

/// A user-defined camera filter
///
/// Built through [`FilterCatalog`](crate::catalog::FilterCatalog). Setters
/// validate against the default ranges; the catalog's
/// [`set_parameter`](crate::catalog::FilterCatalog::set_parameter) applies
/// its own configured ranges instead. Deserialized filters are checked
/// against the default ranges as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FilterFields")]
pub struct CameraFilter {
    id: FilterId,
    display_name: String,
    settings: FilterSettings,
}

#[derive(Deserialize)]
struct FilterFields {
    id: FilterId,
    display_name: String,
    settings: FilterSettings,
}

impl TryFrom<FilterFields> for CameraFilter {
    type Error = FilterError;

    fn try_from(fields: FilterFields) -> Result<Self> {
        fields.settings.validate()?;
        Ok(Self::new(fields.id, fields.display_name, fields.settings))
    }
}

impl CameraFilter {
    pub(crate) fn new(id: FilterId, display_name: impl Into<String>, settings: FilterSettings) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            settings,
        }
    }

    pub fn id(&self) -> &FilterId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> FilterKind {
        self.settings.kind()
    }

    pub fn system_name(&self) -> &'static str {
        self.kind().system_name()
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    pub fn parameters(&self) -> Parameters {
        self.settings.parameters()
    }

    pub fn intensity(&self) -> Option<f32> {
        self.settings.intensity()
    }

    pub fn color(&self) -> Option<Color> {
        self.settings.color()
    }

    pub fn radius(&self) -> Option<f32> {
        self.settings.radius()
    }

    pub fn levels(&self) -> Option<f32> {
        self.settings.levels()
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        self.set_scalar(ParameterKey::Intensity, intensity)
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        self.set_scalar(ParameterKey::Radius, radius)
    }

    pub fn set_levels(&mut self, levels: f32) -> Result<()> {
        self.set_scalar(ParameterKey::Levels, levels)
    }

    pub fn set_color(&mut self, color: Color) -> Result<()> {
        let color = check_color(color)?;
        self.settings.put(ParameterKey::Color, color.into())
    }

    fn set_scalar(&mut self, key: ParameterKey, value: f32) -> Result<()> {
        if let Some(range) = key.default_range() {
            if self.kind().accepts(key) {
                range.check(key, value)?;
            }
        }
        self.settings.put(key, value.into())
    }

    pub(crate) fn settings_mut(&mut self) -> &mut FilterSettings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_system_names_round_trip() {
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::from_system_name(kind.system_name()), Some(kind));
            assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
        }
        assert_eq!(FilterKind::from_system_name("CIGaussianBlur"), None);
        assert_eq!(FilterKind::Monochrome.system_name(), "CIColorMonochrome");
    }

    #[test]
    fn test_color_string_form() {
        assert_eq!(Color::CYAN.to_string(), "0 1 1 1");
        assert_eq!(Color::ZERO.to_string(), "0 0 0 0");
        assert_eq!(Color::rgba(0.5, 0.25, 1.0, 1.0).to_string(), "0.5 0.25 1 1");

        assert_eq!("0 1 1 1".parse::<Color>().unwrap(), Color::CYAN);
        assert_eq!("[0 1 1]".parse::<Color>().unwrap(), Color::CYAN);
        assert!("0 1".parse::<Color>().is_err());
        assert!("0 one 1 1".parse::<Color>().is_err());
    }

    #[test]
    fn test_settings_parameters_match_kind() {
        let settings = [
            FilterSettings::Sepia { intensity: 0.4 },
            FilterSettings::Vintage,
            FilterSettings::BlackWhite,
            FilterSettings::Monochrome {
                color: Color::CYAN,
                intensity: 1.0,
            },
            FilterSettings::Posterize { levels: 6.0 },
            FilterSettings::Blur { radius: 10.0 },
        ];

        for s in settings {
            let keys: Vec<ParameterKey> = s.parameters().keys().copied().collect();
            let mut expected = s.kind().parameter_keys().to_vec();
            expected.sort();
            assert_eq!(keys, expected, "{}", s.kind());
        }
    }

    #[test]
    fn test_setters_validate_kind_and_range() {
        let mut filter = CameraFilter::new(
            FilterId::new(),
            "Warm",
            FilterSettings::Sepia { intensity: 0.5 },
        );

        filter.set_intensity(0.8).unwrap();
        assert_eq!(filter.intensity(), Some(0.8));

        assert!(matches!(
            filter.set_intensity(1.5),
            Err(FilterError::OutOfRange { .. })
        ));
        assert!(matches!(
            filter.set_radius(3.0),
            Err(FilterError::UnexpectedParameter { .. })
        ));
        assert!(matches!(
            filter.set_color(Color::CYAN),
            Err(FilterError::UnexpectedParameter { .. })
        ));

        filter.set_display_name("Warmer");
        assert_eq!(filter.display_name(), "Warmer");
    }

    #[test]
    fn test_set_color_reports_offending_component() {
        let mut filter = CameraFilter::new(
            FilterId::new(),
            "Cyan",
            FilterSettings::Monochrome {
                color: Color::CYAN,
                intensity: 1.0,
            },
        );

        let err = filter.set_color(Color::rgba(0.2, 1.5, 0.3, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            FilterError::OutOfRange { ref parameter, value, .. } if parameter == "color" && value == 1.5
        ));
        assert_eq!(filter.color(), Some(Color::CYAN));

        filter.set_color(Color::rgb(0.2, 0.4, 0.6)).unwrap();
        assert_eq!(filter.color(), Some(Color::rgb(0.2, 0.4, 0.6)));
    }

    #[test]
    fn test_deserialize_checks_ranges_and_id() {
        let accepted: CameraFilter = serde_json::from_str(
            r#"{"id":"F-1","display_name":"Warm","settings":{"kind":"sepia","intensity":0.5}}"#,
        )
        .unwrap();
        assert_eq!(accepted.id().as_str(), "F-1");
        assert_eq!(accepted.intensity(), Some(0.5));

        let out_of_range = serde_json::from_str::<CameraFilter>(
            r#"{"id":"F-1","display_name":"Hot","settings":{"kind":"sepia","intensity":5.0}}"#,
        )
        .unwrap_err();
        assert!(out_of_range.to_string().contains("intensity"));

        let bad_color = serde_json::from_str::<CameraFilter>(
            r#"{"id":"F-1","display_name":"Tint","settings":{"kind":"monochrome","color":{"r":0.0,"g":2.0,"b":1.0,"a":1.0},"intensity":1.0}}"#,
        );
        assert!(bad_color.is_err());

        let bad_id = serde_json::from_str::<CameraFilter>(
            r#"{"id":"a/b.c","display_name":"x","settings":{"kind":"sepia","intensity":0.5}}"#,
        );
        assert!(bad_id.is_err());
        assert!(serde_json::from_str::<FilterId>(r#""a/b.c""#).is_err());
    }

    #[test]
    fn test_filter_id_validation() {
        assert!(FilterId::from_string("3F2504E0-4F89-11D3-9A0C-0305E82C3301").is_ok());
        assert!(FilterId::from_string("").is_err());
        assert!(FilterId::from_string("a/b").is_err());
        assert_ne!(FilterId::new(), FilterId::new());
    }
}
