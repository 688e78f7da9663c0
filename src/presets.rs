//! Named bundles of override directives.

use crate::error::UnknownPresetError;
use crate::overrides::{OverrideDirective, Provenance};
use crate::params::names::*;

/// A named, ordered bundle of directives.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: String,
    pub description: String,
    /// `(parameter, raw value)` in application order
    pub entries: Vec<(String, String)>,
}

impl Preset {
    pub fn new(name: &str, description: &str, entries: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// The bundle as preset-provenance directives, in declared order.
    pub fn directives(&self) -> Vec<OverrideDirective> {
        self.entries
            .iter()
            .map(|(parameter, raw)| OverrideDirective::new(parameter, raw, Provenance::Preset))
            .collect()
    }

    /// The same bundle tagged as explicit directives.
    pub fn as_explicit(&self) -> Vec<OverrideDirective> {
        self.entries
            .iter()
            .map(|(parameter, raw)| OverrideDirective::explicit(parameter, raw))
            .collect()
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("default", "Standard 160×160×40 mm board", &[]),
        Preset::new(
            "small-specimen",
            "Circular 10 ± 1 mm specimen, high-resolution output",
            &[
                (DIAMETER, "10"),
                (TOLERANCE, "1"),
                (THICKNESS, "10"),
                (MIN_PORE_RADIUS, "0.01"),
                (MAX_PORE_RADIUS, "0.4"),
                (ELEVATION, "25"),
                (AZIMUTH, "45"),
                (FIGURE_SIZE, "10,8"),
                (DPI, "600"),
            ],
        ),
        Preset::new(
            "fast",
            "Reduced pore and particle counts for quick previews",
            &[
                (PORES_ALL, "200"),
                (MATRIX_PARTICLES, "3000"),
                (HYBRID_MAIN_PARTICLES, "3000"),
                (HYBRID_COMBINED_PARTICLES, "2000"),
                (DPI, "150"),
            ],
        ),
        Preset::new(
            "publication",
            "High-resolution vector-friendly output",
            &[(DPI, "600"), (FIGURE_SIZE, "16,12"), (FORMAT, "pdf")],
        ),
        Preset::new(
            "large-board",
            "320×320×80 mm board",
            &[(LENGTH, "320"), (WIDTH, "320"), (THICKNESS, "80")],
        ),
        Preset::new(
            "tall",
            "Vertical 40×40×160 mm prism",
            &[
                (LENGTH, "40"),
                (WIDTH, "40"),
                (THICKNESS, "160"),
                (MATRIX_X_BOUNDS, "-0.45,0.45"),
                (MATRIX_Y_BOUNDS, "-0.45,0.45"),
                (MATRIX_Z_BOUNDS, "-1.95,1.95"),
                (MATRIX_LEN_NORM, "0.45"),
                (MATRIX_WIDTH_NORM, "0.45"),
                (DEFAULT_X_BOUNDS, "-0.45,0.45"),
                (DEFAULT_Y_BOUNDS, "-0.45,0.45"),
                (DEFAULT_Z_BOUNDS, "-1.95,1.95"),
                (VIEW_X_LIMITS, "-0.7,0.7"),
                (VIEW_Y_LIMITS, "-0.7,0.7"),
                (VIEW_Z_LIMITS, "-2.2,2.2"),
                (CAMERA_POSITION, "1,1,3"),
                (ELEVATION, "20"),
                (AZIMUTH, "30"),
                (PORES_INDIVIDUAL, "200"),
                (PORES_COMPARATIVE, "150"),
                (PORES_DENSITY, "150"),
                (PORES_MATRIX, "300"),
                (PORES_HYBRID, "300"),
                (MATRIX_PARTICLES, "10000"),
                (HYBRID_MAIN_PARTICLES, "5000"),
                (HYBRID_COMBINED_PARTICLES, "3000"),
            ],
        ),
        Preset::new(
            "color",
            "Single blue pore color",
            &[
                (MICROPORE_COLOR, "#1F77B4"),
                (MESOPORE_COLOR, "#1F77B4"),
                (MACROPORE_COLOR, "#1F77B4"),
                (MATRIX_FILL_COLOR, "#CCCCCC"),
                (MATRIX_ALPHA, "0.3"),
            ],
        ),
        Preset::new(
            "color2",
            "Red, blue and orange pore classes",
            &[
                (MICROPORE_COLOR, "#D62728"),
                (MESOPORE_COLOR, "#1F77B4"),
                (MACROPORE_COLOR, "#FF7F0E"),
            ],
        ),
        Preset::new(
            "advanced",
            "Enable advanced statistical analysis",
            &[(ADVANCED_ANALYSIS, "true")],
        ),
        Preset::new(
            "dimension",
            "Standard board dimensions with advanced analysis",
            &[
                (LENGTH, "160"),
                (WIDTH, "160"),
                (THICKNESS, "40"),
                (ADVANCED_ANALYSIS, "true"),
                (ADVANCED_TICK_COUNT, "10"),
            ],
        ),
        Preset::new(
            "dim100",
            "100×100×100 mm cube with advanced analysis",
            &[
                (LENGTH, "100"),
                (WIDTH, "100"),
                (THICKNESS, "100"),
                (MATRIX_X_BOUNDS, "-1.2,1.2"),
                (MATRIX_Y_BOUNDS, "-1.2,1.2"),
                (MATRIX_Z_BOUNDS, "-1.2,1.2"),
                (MATRIX_LEN_NORM, "1.2"),
                (MATRIX_WIDTH_NORM, "1.2"),
                (DEFAULT_X_BOUNDS, "-1.2,1.2"),
                (DEFAULT_Y_BOUNDS, "-1.2,1.2"),
                (DEFAULT_Z_BOUNDS, "-1.2,1.2"),
                (VIEW_X_LIMITS, "-1.5,1.5"),
                (VIEW_Y_LIMITS, "-1.5,1.5"),
                (VIEW_Z_LIMITS, "-1.5,1.5"),
                (CAMERA_POSITION, "2,2,2"),
                // Counts follow the volume ratio 100³ / (160² × 40) = 0.9765625
                (PORES_INDIVIDUAL, "585"),
                (PORES_COMPARATIVE, "390"),
                (PORES_DENSITY, "488"),
                (PORES_MATRIX, "781"),
                (PORES_HYBRID, "781"),
                (MATRIX_PARTICLES, "14648"),
                (HYBRID_MAIN_PARTICLES, "7812"),
                (HYBRID_COMBINED_PARTICLES, "4882"),
                (MIN_PORE_RADIUS, "0.04"),
                (MAX_PORE_RADIUS, "0.1"),
                (ELEVATION, "35"),
                (AZIMUTH, "45"),
                (ADVANCED_ANALYSIS, "true"),
                (ADVANCED_TICK_COUNT, "10"),
            ],
        ),
    ]
}

/// The set of presets a build can refer to by name.
#[derive(Clone, Debug)]
pub struct PresetBook {
    presets: Vec<Preset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetBook {
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Add a custom preset, replacing any existing preset of the same name.
    pub fn register(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Look up a preset; `_` and `-` are interchangeable in the name.
    pub fn get(&self, name: &str) -> Result<&Preset, UnknownPresetError> {
        let wanted = name.trim().replace('_', "-");
        self.presets
            .iter()
            .find(|p| p.name == wanted)
            .ok_or_else(|| UnknownPresetError {
                name: name.to_string(),
                available: self
                    .presets
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Registry;

    #[test]
    fn builtin_presets_are_all_present() {
        let book = PresetBook::builtin();
        for name in [
            "default",
            "small-specimen",
            "fast",
            "publication",
            "large-board",
            "tall",
            "color",
            "color2",
            "advanced",
            "dimension",
            "dim100",
        ] {
            assert!(book.get(name).is_ok(), "missing preset {name}");
        }
        assert!(book.get("small_specimen").is_ok());
    }

    #[test]
    fn preset_entries_are_valid_directives() {
        let registry = Registry::builtin();
        for preset in PresetBook::builtin().presets() {
            for (parameter, raw) in &preset.entries {
                assert!(
                    registry.validate(parameter, raw).is_ok(),
                    "preset {} has invalid entry --{parameter} {raw}",
                    preset.name
                );
            }
        }
    }

    #[test]
    fn unknown_preset_lists_alternatives() {
        let err = PresetBook::builtin().get("huge").unwrap_err();
        assert_eq!(err.name, "huge");
        assert!(err.available.contains("tall"));
    }

    #[test]
    fn custom_presets_replace_by_name() {
        let mut book = PresetBook::builtin();
        book.register(Preset::new("custom", "mine", &[(DPI, "450")]));
        assert_eq!(book.get("custom").unwrap().entries.len(), 1);

        book.register(Preset::new("custom", "mine again", &[(DPI, "500"), (ALPHA, "0.5")]));
        assert_eq!(book.get("custom").unwrap().entries.len(), 2);
        assert_eq!(
            book.presets().iter().filter(|p| p.name == "custom").count(),
            1
        );
    }

    #[test]
    fn directives_carry_preset_provenance() {
        let book = PresetBook::builtin();
        let tall = book.get("tall").unwrap();
        let directives = tall.directives();
        assert_eq!(directives.len(), tall.entries.len());
        assert!(directives.iter().all(|d| d.provenance == Provenance::Preset));
        assert_eq!(directives[0].parameter, LENGTH);
    }
}
