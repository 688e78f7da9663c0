//! Parameter registry: every configurable field, its kind, default and range.
//!
//! The registry is static data. Defaults are stored as raw strings and go
//! through the same [`Registry::validate`] path as user input, so a default
//! can never hold a value a directive could not.

use crate::error::{BuildError, UnknownDirectiveError, ValidationError};
use core::fmt;

/// Parameter names as they appear on the flag surface.
pub mod names {
    // Geometry
    pub const SCALE: &str = "scale";
    pub const DIAMETER: &str = "diameter";
    pub const TOLERANCE: &str = "tolerance";
    pub const LENGTH: &str = "length";
    pub const WIDTH: &str = "width";
    pub const THICKNESS: &str = "thickness";

    // Pore counts
    pub const PORES_INDIVIDUAL: &str = "pores-individual";
    pub const PORES_COMPARATIVE: &str = "pores-comparative";
    pub const PORES_DENSITY: &str = "pores-density";
    pub const PORES_MATRIX: &str = "pores-matrix";
    pub const PORES_HYBRID: &str = "pores-hybrid";
    pub const PORES_ALL: &str = "pores-all";

    // Pore sizes
    pub const MIN_PORE_RADIUS: &str = "min-pore-radius";
    pub const MAX_PORE_RADIUS: &str = "max-pore-radius";

    // Matrix fill
    pub const MATRIX_X_BOUNDS: &str = "matrix-x-bounds";
    pub const MATRIX_Y_BOUNDS: &str = "matrix-y-bounds";
    pub const MATRIX_Z_BOUNDS: &str = "matrix-z-bounds";
    pub const MATRIX_LEN_NORM: &str = "matrix-len-norm";
    pub const MATRIX_WIDTH_NORM: &str = "matrix-width-norm";
    pub const MATRIX_BASE_SIZE: &str = "matrix-base-size";
    pub const MATRIX_SIZE_VAR: &str = "matrix-size-var";
    pub const MATRIX_PARTICLES: &str = "matrix-particles";
    pub const MATRIX_ALPHA: &str = "matrix-alpha";
    pub const MATRIX_FILL_COLOR: &str = "matrix-fill-color";

    // Hybrid particles
    pub const HYBRID_MAIN_PARTICLES: &str = "hybrid-main-particles";
    pub const HYBRID_COMBINED_PARTICLES: &str = "hybrid-combined-particles";

    // Default positioning bounds
    pub const DEFAULT_X_BOUNDS: &str = "default-x-bounds";
    pub const DEFAULT_Y_BOUNDS: &str = "default-y-bounds";
    pub const DEFAULT_Z_BOUNDS: &str = "default-z-bounds";

    // Pore colors
    pub const MICROPORE_COLOR: &str = "micropore-color";
    pub const MESOPORE_COLOR: &str = "mesopore-color";
    pub const MACROPORE_COLOR: &str = "macropore-color";

    // Rendering
    pub const FIGURE_SIZE: &str = "figure-size";
    pub const DPI: &str = "dpi";
    pub const ELEVATION: &str = "elevation";
    pub const AZIMUTH: &str = "azimuth";
    pub const ALPHA: &str = "alpha";
    pub const FORMAT: &str = "format";
    pub const VIEW_X_LIMITS: &str = "view-x-limits";
    pub const VIEW_Y_LIMITS: &str = "view-y-limits";
    pub const VIEW_Z_LIMITS: &str = "view-z-limits";
    pub const CAMERA_POSITION: &str = "camera-position";

    // Positioning
    pub const JITTER_STRENGTH: &str = "jitter-strength";

    // Advanced analysis
    pub const ADVANCED_ANALYSIS: &str = "advanced-analysis";
    pub const ADVANCED_COLORMAP: &str = "advanced-colormap";
    pub const ADVANCED_TICK_COUNT: &str = "advanced-tick-count";
    pub const ADVANCED_BINS: &str = "advanced-bins";
}

/// The five per-visualization pore counts that `pores-all` expands into.
pub const PORE_COUNT_PARAMETERS: [&str; 5] = [
    names::PORES_INDIVIDUAL,
    names::PORES_COMPARATIVE,
    names::PORES_DENSITY,
    names::PORES_MATRIX,
    names::PORES_HYBRID,
];

/// Output formats accepted by the rendering layer.
pub const OUTPUT_FORMATS: [&str; 5] = ["png", "jpg", "jpeg", "pdf", "svg"];

/// Colormaps known to the advanced analysis plots.
pub const COLORMAPS: [&str; 9] = [
    "jet", "viridis", "plasma", "inferno", "magma", "cividis", "coolwarm", "rainbow", "turbo",
];

/// Named colors accepted in place of a hex code.
const NAMED_COLORS: [&str; 20] = [
    "black", "white", "red", "green", "blue", "yellow", "cyan", "magenta", "orange", "purple",
    "pink", "brown", "gray", "grey", "lightgray", "darkgray", "navy", "teal", "gold", "silver",
];

const FLAG_TRUE: [&str; 4] = ["true", "yes", "1", "on"];
const FLAG_FALSE: [&str; 4] = ["false", "no", "0", "off"];

/// Semantic type of a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    /// Non-negative integer
    Integer,
    /// Any finite number
    Float,
    /// Free-form string, restricted by the allowed set when one is given
    Text,
    /// Two comma-separated numbers; `ordered` pairs require first < second
    Pair { ordered: bool },
    /// Three comma-separated numbers
    Triple,
    /// Hex code or named color
    Color,
    /// Boolean switch (true/false, yes/no, 1/0, on/off)
    Flag,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParameterKind::Integer => write!(f, "integer"),
            ParameterKind::Float => write!(f, "float"),
            ParameterKind::Text => write!(f, "string"),
            ParameterKind::Pair { ordered: true } => write!(f, "pair(min,max)"),
            ParameterKind::Pair { ordered: false } => write!(f, "pair(w,h)"),
            ParameterKind::Triple => write!(f, "triple(x,y,z)"),
            ParameterKind::Color => write!(f, "color"),
            ParameterKind::Flag => write!(f, "flag"),
        }
    }
}

/// A validated parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(u64),
    Float(f64),
    Text(String),
    Pair(f64, f64),
    Triple(f64, f64, f64),
    Color(String),
    Flag(bool),
}

impl Value {
    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Value::Pair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn as_triple(&self) -> Option<(f64, f64, f64)> {
        match self {
            Value::Triple(x, y, z) => Some((*x, *y, *z)),
            _ => None,
        }
    }

    /// String view of text and color values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Color(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) | Value::Color(s) => write!(f, "{s}"),
            Value::Pair(a, b) => write!(f, "{a},{b}"),
            Value::Triple(x, y, z) => write!(f, "{x},{y},{z}"),
            Value::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Declaration of one configurable field.
#[derive(Clone, Debug)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterKind,
    /// Raw default; `None` for parameters that are absent unless a directive sets them
    pub default: Option<&'static str>,
    /// Inclusive lower bound for numbers and for each element of a pair
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers and for each element of a pair
    pub max: Option<f64>,
    /// Allowed values for text parameters; empty means unrestricted
    pub allowed: &'static [&'static str],
    pub help: &'static str,
}

impl ParameterSpec {
    const fn new(name: &'static str, kind: ParameterKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            default: None,
            min: None,
            max: None,
            allowed: &[],
            help,
        }
    }

    const fn default(mut self, raw: &'static str) -> Self {
        self.default = Some(raw);
        self
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    const fn allowed(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    /// Human-readable valid range, used in error messages and listings.
    pub fn describe_range(&self) -> String {
        if !self.allowed.is_empty() {
            return format!("one of {{{}}}", self.allowed.join(", "));
        }
        match (self.kind, self.min, self.max) {
            (ParameterKind::Flag, _, _) => "true or false".to_string(),
            (ParameterKind::Color, _, _) => "a hex color (#RGB, #RRGGBB) or a named color".to_string(),
            (ParameterKind::Pair { ordered: true }, Some(lo), Some(hi)) => {
                format!("\"min,max\" with min < max, each within [{lo}, {hi}]")
            }
            (ParameterKind::Pair { ordered: false }, Some(lo), Some(hi)) => {
                format!("\"w,h\" with each within [{lo}, {hi}]")
            }
            (ParameterKind::Triple, Some(lo), Some(hi)) => {
                format!("\"x,y,z\" with each within [{lo}, {hi}]")
            }
            (_, Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
            _ => "any value".to_string(),
        }
    }

    /// Parse and check a raw value against this declaration.
    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        let raw = raw.trim();
        match self.kind {
            ParameterKind::Integer => self.parse_integer(raw).map(Value::Integer),
            ParameterKind::Float => self.parse_number(raw).map(Value::Float),
            ParameterKind::Text => self.parse_text(raw).map(Value::Text),
            ParameterKind::Pair { ordered } => self.parse_pair(raw, ordered),
            ParameterKind::Triple => self.parse_triple(raw),
            ParameterKind::Color => self.parse_color(raw).map(Value::Color),
            ParameterKind::Flag => self.parse_flag(raw).map(Value::Flag),
        }
    }

    fn reject(&self, raw: &str, reason: impl Into<String>) -> ValidationError {
        ValidationError::new(self.name, raw, reason)
    }

    fn check_range(&self, raw: &str, value: f64) -> Result<(), ValidationError> {
        let below = self.min.is_some_and(|lo| value < lo);
        let above = self.max.is_some_and(|hi| value > hi);
        if below || above {
            return Err(self.reject(raw, format!("must be within {}", self.describe_range())));
        }
        Ok(())
    }

    fn parse_float(&self, raw: &str) -> Result<f64, ValidationError> {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.reject(raw, "not a number")),
        }
    }

    fn parse_number(&self, raw: &str) -> Result<f64, ValidationError> {
        let value = self.parse_float(raw)?;
        self.check_range(raw, value)?;
        Ok(value)
    }

    fn parse_integer(&self, raw: &str) -> Result<u64, ValidationError> {
        // Accept "600" as well as an integral float such as "600.0"
        let value = match raw.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                let v = raw
                    .parse::<f64>()
                    .map_err(|_| self.reject(raw, "not a non-negative integer"))?;
                if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
                    return Err(self.reject(raw, "not a non-negative integer"));
                }
                v as u64
            }
        };
        self.check_range(raw, value as f64)?;
        Ok(value)
    }

    fn parse_text(&self, raw: &str) -> Result<String, ValidationError> {
        if raw.is_empty() {
            return Err(self.reject(raw, "must not be empty"));
        }
        if self.allowed.is_empty() {
            return Ok(raw.to_string());
        }
        let lowered = raw.to_ascii_lowercase();
        if self.allowed.contains(&lowered.as_str()) {
            Ok(lowered)
        } else {
            Err(self.reject(raw, format!("must be {}", self.describe_range())))
        }
    }

    fn parse_pair(&self, raw: &str, ordered: bool) -> Result<Value, ValidationError> {
        let fields: Vec<&str> = raw.split(',').map(|s| s.trim()).collect();
        if fields.len() != 2 {
            return Err(self.reject(raw, format!("expected {}", self.describe_range())));
        }
        let first = self.parse_float(fields[0])?;
        let second = self.parse_float(fields[1])?;
        self.check_range(raw, first)?;
        self.check_range(raw, second)?;
        if ordered && first >= second {
            return Err(self.reject(raw, "first value must be smaller than the second"));
        }
        Ok(Value::Pair(first, second))
    }

    fn parse_triple(&self, raw: &str) -> Result<Value, ValidationError> {
        let fields: Vec<&str> = raw.split(',').map(|s| s.trim()).collect();
        if fields.len() != 3 {
            return Err(self.reject(raw, format!("expected {}", self.describe_range())));
        }
        let mut xyz = [0.0; 3];
        for (slot, field) in xyz.iter_mut().zip(&fields) {
            *slot = self.parse_float(field)?;
            self.check_range(raw, *slot)?;
        }
        Ok(Value::Triple(xyz[0], xyz[1], xyz[2]))
    }

    fn parse_color(&self, raw: &str) -> Result<String, ValidationError> {
        if is_hex_color(raw) {
            return Ok(raw.to_string());
        }
        let lowered = raw.to_ascii_lowercase();
        if NAMED_COLORS.contains(&lowered.as_str()) {
            Ok(lowered)
        } else {
            Err(self.reject(raw, format!("must be {}", self.describe_range())))
        }
    }

    fn parse_flag(&self, raw: &str) -> Result<bool, ValidationError> {
        let lowered = raw.to_ascii_lowercase();
        if FLAG_TRUE.contains(&lowered.as_str()) {
            Ok(true)
        } else if FLAG_FALSE.contains(&lowered.as_str()) {
            Ok(false)
        } else {
            Err(self.reject(raw, format!("must be {}", self.describe_range())))
        }
    }
}

/// `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
fn is_hex_color(raw: &str) -> bool {
    match raw.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

use names::*;
use ParameterKind::*;

static PARAMETERS: &[ParameterSpec] = &[
    // Board geometry
    ParameterSpec::new(SCALE, Float, "Global linear scale factor applied to the default board")
        .default("1.0")
        .range(0.01, 10.0),
    ParameterSpec::new(DIAMETER, Float, "Circular specimen diameter (mm)").range(1.0, 100.0),
    ParameterSpec::new(TOLERANCE, Float, "Specimen diameter tolerance (± mm)").range(0.1, 10.0),
    ParameterSpec::new(LENGTH, Float, "Board length along X (mm)")
        .default("160.0")
        .range(10.0, 1000.0),
    ParameterSpec::new(WIDTH, Float, "Board width along Y (mm)")
        .default("160.0")
        .range(10.0, 1000.0),
    ParameterSpec::new(THICKNESS, Float, "Board thickness along Z (mm)")
        .default("40.0")
        .range(1.0, 200.0),
    // Pore counts
    ParameterSpec::new(PORES_INDIVIDUAL, Integer, "Pores in individual sample models")
        .default("600")
        .range(10.0, 5000.0),
    ParameterSpec::new(PORES_COMPARATIVE, Integer, "Pores per sample in comparative models")
        .default("400")
        .range(10.0, 5000.0),
    ParameterSpec::new(PORES_DENSITY, Integer, "Pores in density distribution models")
        .default("500")
        .range(10.0, 5000.0),
    ParameterSpec::new(PORES_MATRIX, Integer, "Pores in matrix material models")
        .default("800")
        .range(10.0, 5000.0),
    ParameterSpec::new(PORES_HYBRID, Integer, "Pores in hybrid pore-matrix models")
        .default("800")
        .range(10.0, 5000.0),
    ParameterSpec::new(PORES_ALL, Integer, "Set all five pore counts at once").range(10.0, 5000.0),
    // Pore sizes
    ParameterSpec::new(MIN_PORE_RADIUS, Float, "Smallest rendered pore radius")
        .default("0.03")
        .range(0.001, 1.0),
    ParameterSpec::new(MAX_PORE_RADIUS, Float, "Largest rendered pore radius")
        .default("0.08")
        .range(0.01, 2.0),
    // Matrix fill
    ParameterSpec::new(MATRIX_X_BOUNDS, Pair { ordered: true }, "Matrix fill region along X")
        .default("-1.95,1.95")
        .range(-100.0, 100.0),
    ParameterSpec::new(MATRIX_Y_BOUNDS, Pair { ordered: true }, "Matrix fill region along Y")
        .default("-1.95,1.95")
        .range(-100.0, 100.0),
    ParameterSpec::new(MATRIX_Z_BOUNDS, Pair { ordered: true }, "Matrix fill region along Z")
        .default("-0.45,0.45")
        .range(-100.0, 100.0),
    ParameterSpec::new(MATRIX_LEN_NORM, Float, "Matrix particle distribution length norm")
        .default("1.95")
        .range(0.001, 100.0),
    ParameterSpec::new(MATRIX_WIDTH_NORM, Float, "Matrix particle distribution width norm")
        .default("1.95")
        .range(0.001, 100.0),
    ParameterSpec::new(MATRIX_BASE_SIZE, Float, "Base size of matrix particles")
        .default("2.0")
        .range(0.001, 100.0),
    ParameterSpec::new(MATRIX_SIZE_VAR, Float, "Size variation of matrix particles")
        .default("2.5")
        .range(0.0, 100.0),
    ParameterSpec::new(MATRIX_PARTICLES, Integer, "Base number of matrix particles")
        .default("15000")
        .range(100.0, 1_000_000.0),
    ParameterSpec::new(MATRIX_ALPHA, Float, "Matrix particle transparency")
        .default("0.5")
        .range(0.0, 1.0),
    ParameterSpec::new(MATRIX_FILL_COLOR, Color, "Matrix fill color").default("#cccccc"),
    // Hybrid particles
    ParameterSpec::new(HYBRID_MAIN_PARTICLES, Integer, "Matrix particles in single-sample hybrid models")
        .default("15000")
        .range(100.0, 1_000_000.0),
    ParameterSpec::new(HYBRID_COMBINED_PARTICLES, Integer, "Matrix particles per sample in combined hybrid models")
        .default("10000")
        .range(100.0, 1_000_000.0),
    // Placement region for pores and particles
    ParameterSpec::new(DEFAULT_X_BOUNDS, Pair { ordered: true }, "Default placement bounds along X")
        .default("-1.95,1.95")
        .range(-100.0, 100.0),
    ParameterSpec::new(DEFAULT_Y_BOUNDS, Pair { ordered: true }, "Default placement bounds along Y")
        .default("-1.95,1.95")
        .range(-100.0, 100.0),
    ParameterSpec::new(DEFAULT_Z_BOUNDS, Pair { ordered: true }, "Default placement bounds along Z")
        .default("-0.45,0.45")
        .range(-100.0, 100.0),
    // Pore colors
    ParameterSpec::new(MICROPORE_COLOR, Color, "Micropore color").default("#FF1493"),
    ParameterSpec::new(MESOPORE_COLOR, Color, "Mesopore color").default("#FFFF00"),
    ParameterSpec::new(MACROPORE_COLOR, Color, "Macropore color").default("#00FFFF"),
    // Rendering
    ParameterSpec::new(FIGURE_SIZE, Pair { ordered: false }, "Figure size in inches (W,H)")
        .default("12,8")
        .range(1.0, 100.0),
    ParameterSpec::new(DPI, Integer, "Output resolution")
        .default("300")
        .range(72.0, 1200.0),
    ParameterSpec::new(ELEVATION, Float, "Camera elevation angle (degrees)")
        .default("30")
        .range(-90.0, 90.0),
    ParameterSpec::new(AZIMUTH, Float, "Camera azimuth angle (degrees)")
        .default("60")
        .range(0.0, 360.0),
    ParameterSpec::new(ALPHA, Float, "Pore sphere transparency")
        .default("0.9")
        .range(0.0, 1.0),
    ParameterSpec::new(FORMAT, Text, "Output file format")
        .default("png")
        .allowed(&OUTPUT_FORMATS),
    ParameterSpec::new(VIEW_X_LIMITS, Pair { ordered: true }, "Fixed X axis limits of the 3D view")
        .range(-100.0, 100.0),
    ParameterSpec::new(VIEW_Y_LIMITS, Pair { ordered: true }, "Fixed Y axis limits of the 3D view")
        .range(-100.0, 100.0),
    ParameterSpec::new(VIEW_Z_LIMITS, Pair { ordered: true }, "Fixed Z axis limits of the 3D view")
        .range(-100.0, 100.0),
    ParameterSpec::new(CAMERA_POSITION, Triple, "Camera position in normalized coordinates")
        .default("3,1,1")
        .range(-100.0, 100.0),
    // Positioning
    ParameterSpec::new(JITTER_STRENGTH, Float, "Pore position jitter")
        .default("0.01")
        .range(0.0, 1.0),
    // Advanced analysis
    ParameterSpec::new(ADVANCED_ANALYSIS, Flag, "Enable advanced statistical analysis").default("false"),
    ParameterSpec::new(ADVANCED_COLORMAP, Text, "Colormap of the volume colorbar")
        .default("jet")
        .allowed(&COLORMAPS),
    ParameterSpec::new(ADVANCED_TICK_COUNT, Integer, "Ticks on the volume colorbar")
        .default("8")
        .range(2.0, 50.0),
    ParameterSpec::new(ADVANCED_BINS, Integer, "Bins of the diameter histogram")
        .default("30")
        .range(5.0, 200.0),
];

/// Lookup surface over the static parameter table.
#[derive(Clone, Copy, Debug)]
pub struct Registry {
    specs: &'static [ParameterSpec],
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// The registry of all pore-modeling parameters.
    pub fn builtin() -> Self {
        Self { specs: PARAMETERS }
    }

    pub fn specs(&self) -> impl Iterator<Item = &'static ParameterSpec> {
        self.specs.iter()
    }

    pub fn spec_for(&self, name: &str) -> Result<&'static ParameterSpec, UnknownDirectiveError> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| UnknownDirectiveError {
                name: name.to_string(),
            })
    }

    /// Validate a raw value for the named parameter.
    pub fn validate(&self, name: &str, raw: &str) -> Result<Value, BuildError> {
        let spec = self.spec_for(name)?;
        Ok(spec.validate(raw)?)
    }

    /// Validated default of the named parameter, `None` for optional parameters.
    pub fn default_value(&self, name: &str) -> Result<Option<Value>, BuildError> {
        let spec = self.spec_for(name)?;
        match spec.default {
            Some(raw) => Ok(Some(spec.validate(raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_passes_its_own_validation() {
        let registry = Registry::builtin();
        for spec in registry.specs() {
            if let Some(raw) = spec.default {
                assert!(
                    spec.validate(raw).is_ok(),
                    "default '{raw}' of {} is invalid",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn names_are_unique() {
        let registry = Registry::builtin();
        let mut seen = std::collections::HashSet::new();
        for spec in registry.specs() {
            assert!(seen.insert(spec.name), "duplicate parameter {}", spec.name);
        }
        assert!(seen.len() >= 40);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.spec_for("pores-everything").unwrap_err(),
            UnknownDirectiveError {
                name: "pores-everything".to_string()
            }
        );
        assert!(matches!(
            registry.validate("bogus", "1"),
            Err(BuildError::UnknownDirective(_))
        ));
    }

    #[test]
    fn integers() {
        let registry = Registry::builtin();
        assert_eq!(registry.validate(names::DPI, "600").unwrap(), Value::Integer(600));
        assert_eq!(registry.validate(names::DPI, "600.0").unwrap(), Value::Integer(600));
        assert!(registry.validate(names::DPI, "600.5").is_err());
        assert!(registry.validate(names::DPI, "-300").is_err());
        assert!(registry.validate(names::DPI, "lots").is_err());

        // Inclusive range
        assert!(registry.validate(names::DPI, "72").is_ok());
        assert!(registry.validate(names::DPI, "1200").is_ok());
        let err = registry.validate(names::DPI, "1201").unwrap_err();
        match err {
            BuildError::Validation(e) => {
                assert_eq!(e.parameter, "dpi");
                assert_eq!(e.value, "1201");
                assert!(e.reason.contains("[72, 1200]"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn floats() {
        let registry = Registry::builtin();
        assert_eq!(registry.validate(names::SCALE, "0.5").unwrap(), Value::Float(0.5));
        assert!(registry.validate(names::SCALE, "0.001").is_err());
        assert!(registry.validate(names::SCALE, "NaN").is_err());
        assert!(registry.validate(names::ELEVATION, "-90").is_ok());
        assert!(registry.validate(names::ELEVATION, "-91").is_err());
        assert!(registry.validate(names::AZIMUTH, "360").is_ok());
    }

    #[test]
    fn pairs() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.validate(names::MATRIX_X_BOUNDS, "-1.5, 1.5").unwrap(),
            Value::Pair(-1.5, 1.5)
        );
        assert!(registry.validate(names::MATRIX_X_BOUNDS, "1.5,-1.5").is_err());
        assert!(registry.validate(names::MATRIX_X_BOUNDS, "1.5,1.5").is_err());
        assert!(registry.validate(names::MATRIX_X_BOUNDS, "1.5").is_err());
        assert!(registry.validate(names::MATRIX_X_BOUNDS, "a,b").is_err());

        // Figure sizes are not ordered pairs
        assert_eq!(
            registry.validate(names::FIGURE_SIZE, "12,8").unwrap(),
            Value::Pair(12.0, 8.0)
        );
        assert!(registry.validate(names::FIGURE_SIZE, "0,8").is_err());
    }

    #[test]
    fn triples() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.validate(names::CAMERA_POSITION, "1, 1, 3").unwrap(),
            Value::Triple(1.0, 1.0, 3.0)
        );
        assert!(registry.validate(names::CAMERA_POSITION, "1,1").is_err());
        assert!(registry.validate(names::CAMERA_POSITION, "1,1,x").is_err());
        assert!(registry.validate(names::CAMERA_POSITION, "1,1,500").is_err());
        assert_eq!(registry.default_value(names::VIEW_X_LIMITS).unwrap(), None);
    }

    #[test]
    fn colors() {
        let registry = Registry::builtin();
        assert!(registry.validate(names::MICROPORE_COLOR, "#FF1493").is_ok());
        assert!(registry.validate(names::MICROPORE_COLOR, "#abc").is_ok());
        assert_eq!(
            registry.validate(names::MICROPORE_COLOR, "Black").unwrap(),
            Value::Color("black".to_string())
        );
        assert!(registry.validate(names::MICROPORE_COLOR, "#GGGGGG").is_err());
        assert!(registry.validate(names::MICROPORE_COLOR, "FF1493").is_err());
        assert!(registry.validate(names::MICROPORE_COLOR, "chartreuse-ish").is_err());
    }

    #[test]
    fn enumerations_and_flags() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.validate(names::FORMAT, "PDF").unwrap(),
            Value::Text("pdf".to_string())
        );
        assert!(registry.validate(names::FORMAT, "gif").is_err());
        assert_eq!(
            registry.validate(names::ADVANCED_ANALYSIS, "yes").unwrap(),
            Value::Flag(true)
        );
        assert_eq!(
            registry.validate(names::ADVANCED_ANALYSIS, "0").unwrap(),
            Value::Flag(false)
        );
        assert!(registry.validate(names::ADVANCED_ANALYSIS, "maybe").is_err());
    }

    #[test]
    fn optional_parameters_have_no_default() {
        let registry = Registry::builtin();
        assert_eq!(registry.default_value(names::DIAMETER).unwrap(), None);
        assert_eq!(
            registry.default_value(names::LENGTH).unwrap(),
            Some(Value::Float(160.0))
        );
    }
}
