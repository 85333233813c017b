//! Image Filter Primitive
//!
//! The host's image pipeline exposed as named filters. A request carries the
//! primitive's system name (`CISepiaTone`, `CIBoxBlur`, ...) and the inputs
//! keyed the way the primitive expects them (`inputIntensity`, `inputRadius`,
//! `inputLevels`, `inputColor`).

use image::DynamicImage;
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Input key for intensity-like scalars in `[0, 1]`
pub const INPUT_INTENSITY: &str = "inputIntensity";
/// Input key for the blur radius
pub const INPUT_RADIUS: &str = "inputRadius";
/// Input key for the posterize level count
pub const INPUT_LEVELS: &str = "inputLevels";
/// Input key for an RGBA tint
pub const INPUT_COLOR: &str = "inputColor";

/// A single filter input value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterInput {
    Scalar(f32),
    /// RGBA, components in `[0, 1]`
    Color([f32; 4]),
}

impl FilterInput {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            FilterInput::Scalar(value) => Some(*value),
            FilterInput::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            FilterInput::Color(rgba) => Some(*rgba),
            FilterInput::Scalar(_) => None,
        }
    }
}

/// A named filter invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub system_name: String,
    pub inputs: HashMap<String, FilterInput>,
}

impl FilterRequest {
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            inputs: HashMap::new(),
        }
    }

    pub fn input(mut self, key: impl Into<String>, value: FilterInput) -> Self {
        self.inputs.insert(key.into(), value);
        self
    }

    pub fn scalar(&self, key: &str) -> Option<f32> {
        self.inputs.get(key).and_then(FilterInput::as_scalar)
    }

    pub fn color(&self, key: &str) -> Option<[f32; 4]> {
        self.inputs.get(key).and_then(FilterInput::as_color)
    }
}

impl fmt::Display for FilterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.inputs.keys().collect();
        keys.sort();
        write!(f, "{}(", self.system_name)?;
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.inputs[*key] {
                FilterInput::Scalar(v) => write!(f, "{}={}", key, v)?,
                FilterInput::Color([r, g, b, a]) => write!(f, "{}=[{} {} {} {}]", key, r, g, b, a)?,
            }
        }
        f.write_str(")")
    }
}

/// Image filter primitive
///
/// Stateless: every call receives the full parameter set, so a parameter
/// change on a filter entity shows up on the next render.
///
/// # Output
///
/// `Ok(None)` means the primitive produced no image for otherwise well-formed
/// input (an empty source, parameters the primitive cannot honour). `Err` is
/// reserved for backend faults.
pub trait FilterBackend: Send + Sync {
    /// Whether the primitive knows the given system name
    fn supports(&self, system_name: &str) -> bool;

    /// Render `image` through the named filter
    fn render(&self, request: &FilterRequest, image: &DynamicImage) -> Result<Option<DynamicImage>>;
}
