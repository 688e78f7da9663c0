//! Override resolution: registry defaults, then a preset, then explicit directives.

use crate::error::{BuildError, ConsistencyError, UnknownDirectiveError, ValidationError};
use crate::params::{names, Registry, Value, PORE_COUNT_PARAMETERS};
use crate::presets::PresetBook;
use core::fmt;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Where a directive came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Provenance {
    Preset,
    Explicit,
}

/// Where an effective value came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Default,
    Preset,
    Explicit,
}

impl From<Provenance> for Source {
    fn from(p: Provenance) -> Self {
        match p {
            Provenance::Preset => Source::Preset,
            Provenance::Explicit => Source::Explicit,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::Preset => write!(f, "preset"),
            Source::Explicit => write!(f, "explicit"),
        }
    }
}

/// A single `(parameter, raw value)` override request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideDirective {
    pub parameter: String,
    pub raw: String,
    pub provenance: Provenance,
}

impl OverrideDirective {
    pub fn new(parameter: &str, raw: &str, provenance: Provenance) -> Self {
        Self {
            parameter: parameter.trim_start_matches("--").to_string(),
            raw: raw.to_string(),
            provenance,
        }
    }

    pub fn explicit(parameter: &str, raw: &str) -> Self {
        Self::new(parameter, raw, Provenance::Explicit)
    }
}

/// Parse `--name value` and `--name=value` tokens into explicit directives.
///
/// The token after a bare `--name` is always taken as its value, so negative
/// numbers such as `--elevation -30` parse as expected.
pub fn parse_flags<S: AsRef<str>>(args: &[S]) -> Result<Vec<OverrideDirective>, BuildError> {
    let mut directives = Vec::new();
    let mut tokens = args.iter().map(|s| s.as_ref());
    while let Some(token) = tokens.next() {
        let Some(flag) = token.strip_prefix("--") else {
            return Err(UnknownDirectiveError {
                name: token.to_string(),
            }
            .into());
        };
        let (name, raw) = match flag.split_once('=') {
            Some((name, raw)) => (name, raw.to_string()),
            None => match tokens.next() {
                Some(raw) => (flag, raw.to_string()),
                None => return Err(ValidationError::new(flag, "", "missing value").into()),
            },
        };
        directives.push(OverrideDirective::explicit(name, &raw));
    }
    Ok(directives)
}

/// One effective override after precedence has been applied.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveOverride {
    pub parameter: &'static str,
    pub value: Value,
    pub source: Source,
}

/// The merged view of defaults, preset and explicit directives.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Name of the preset that was applied, if any
    pub preset: Option<String>,
    defaults: HashMap<&'static str, Value>,
    /// Effective overrides in the order of their final write
    overrides: Vec<EffectiveOverride>,
}

impl Resolution {
    /// Registry defaults with no overrides applied.
    pub fn defaults(registry: &Registry) -> Result<Self, BuildError> {
        let mut defaults = HashMap::new();
        for spec in registry.specs() {
            if let Some(value) = registry.default_value(spec.name)? {
                defaults.insert(spec.name, value);
            }
        }
        Ok(Self {
            preset: None,
            defaults,
            overrides: Vec::new(),
        })
    }

    fn apply(&mut self, parameter: &'static str, value: Value, source: Source) {
        if let Some(pos) = self.overrides.iter().position(|o| o.parameter == parameter) {
            let previous = self.overrides.remove(pos);
            debug!(
                "--{parameter} {value} ({source}) replaces {old} ({old_source})",
                old = previous.value,
                old_source = previous.source
            );
        } else {
            debug!("--{parameter} {value} ({source})");
        }
        self.overrides.push(EffectiveOverride {
            parameter,
            value,
            source,
        });
    }

    /// Effective overrides, in the order they were last written.
    pub fn overrides(&self) -> &[EffectiveOverride] {
        &self.overrides
    }

    /// Whether a directive (preset or explicit) set this parameter.
    pub fn is_set(&self, name: &str) -> bool {
        self.overrides.iter().any(|o| o.parameter == name)
    }

    pub fn source(&self, name: &str) -> Source {
        self.overrides
            .iter()
            .find(|o| o.parameter == name)
            .map_or(Source::Default, |o| o.source)
    }

    /// Effective value: the override if present, otherwise the registry default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.overrides
            .iter()
            .find(|o| o.parameter == name)
            .map(|o| &o.value)
            .or_else(|| self.defaults.get(name))
    }

    fn require(&self, name: &str) -> Result<&Value, ConsistencyError> {
        self.value(name)
            .ok_or_else(|| ConsistencyError::new(&[name], "no value and no default"))
    }

    fn mismatch(name: &str, expected: &str) -> ConsistencyError {
        ConsistencyError::new(&[name], format!("expected a {expected} value"))
    }

    pub fn number(&self, name: &str) -> Result<f64, ConsistencyError> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| Self::mismatch(name, "numeric"))
    }

    pub fn count(&self, name: &str) -> Result<u64, ConsistencyError> {
        self.require(name)?
            .as_u64()
            .ok_or_else(|| Self::mismatch(name, "integer"))
    }

    pub fn pair(&self, name: &str) -> Result<(f64, f64), ConsistencyError> {
        self.require(name)?
            .as_pair()
            .ok_or_else(|| Self::mismatch(name, "pair"))
    }

    pub fn triple(&self, name: &str) -> Result<(f64, f64, f64), ConsistencyError> {
        self.require(name)?
            .as_triple()
            .ok_or_else(|| Self::mismatch(name, "triple"))
    }

    pub fn text(&self, name: &str) -> Result<String, ConsistencyError> {
        self.require(name)?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Self::mismatch(name, "string"))
    }

    pub fn flag(&self, name: &str) -> Result<bool, ConsistencyError> {
        self.require(name)?
            .as_flag()
            .ok_or_else(|| Self::mismatch(name, "flag"))
    }

    /// Numeric value of a parameter that has no default, if a directive set it.
    pub fn optional_number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(Value::as_f64)
    }

    /// Pair value of a parameter that has no default, if a directive set it.
    pub fn optional_pair(&self, name: &str) -> Option<(f64, f64)> {
        self.value(name).and_then(Value::as_pair)
    }
}

/// Merge `preset` and `explicit` directives over the registry defaults.
///
/// Precedence is explicit > preset > default. Within one provenance the last
/// directive for a parameter wins.
pub fn resolve(
    registry: &Registry,
    presets: &PresetBook,
    preset: Option<&str>,
    explicit: &[OverrideDirective],
) -> Result<Resolution, BuildError> {
    let mut resolution = Resolution::defaults(registry)?;

    let mut directives = Vec::new();
    if let Some(name) = preset {
        let bundle = presets.get(name)?;
        trace!("Applying preset {} ({} directives)", bundle.name, bundle.entries.len());
        resolution.preset = Some(bundle.name.clone());
        directives.extend(bundle.directives());
    }
    directives.extend(explicit.iter().cloned());

    for directive in &directives {
        let spec = registry.spec_for(&directive.parameter)?;
        let value = spec.validate(&directive.raw)?;
        let source = Source::from(directive.provenance);
        if spec.name == names::PORES_ALL {
            for target in PORE_COUNT_PARAMETERS {
                resolution.apply(target, value.clone(), source);
            }
        } else {
            resolution.apply(spec.name, value, source);
        }
    }

    Ok(resolution)
}
