//! # poreconfig
//!
//! Configuration engine for 3D pore-structure models of CSA cement boards.
//!
//! A build starts from the parameter registry defaults, applies an optional
//! named preset, then explicit `--name value` directives, and derives board
//! geometry, pore and particle counts, coordinate bounds and render settings
//! from the result. Scaling follows one of two paths: a global scale factor
//! (linear quantities × s, counts × s³, adapted DPI) or a circular specimen
//! diameter converted to an equal-area square board.
//!
//! The output is an immutable [`MaterialConfiguration`], published through a
//! [`ConfigHandle`] and consumed through the [`ConfigProvider`] trait.

pub mod bounds;
pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod overrides;
pub mod params;
pub mod presets;
pub mod provider;
pub mod scaling;

// Re-export key public types
pub use builder::{BuildRequest, ConfigBuilder};
pub use config::{MaterialConfiguration, VisualizationKind};
pub use error::{BuildError, ConsistencyError, ExportError, UnknownDirectiveError, UnknownPresetError, ValidationError};
pub use export::{config_to_df, parameters_to_df, write_df_to_file, DataFrameFileType};
pub use overrides::{parse_flags, OverrideDirective, Provenance};
pub use params::Registry;
pub use presets::{Preset, PresetBook};
pub use provider::{BuildState, ConfigHandle, ConfigProvider};

/// Build a configuration from an optional preset and command-line style flags.
///
/// # Example
///
/// ```
/// use poreconfig::build_from_flags;
///
/// let config = build_from_flags(Some("tall"), &["--thickness", "200"]).unwrap();
/// assert_eq!(config.board_dimensions(), (40.0, 40.0, 200.0));
/// ```
pub fn build_from_flags<S: AsRef<str>>(
    preset: Option<&str>,
    flags: &[S],
) -> Result<MaterialConfiguration, BuildError> {
    let request = BuildRequest::from_flags(preset, flags)?;
    ConfigBuilder::default().build(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_requests_agree() {
        let from_flags = build_from_flags(None, &["--scale=0.5", "--dpi", "450"]).unwrap();
        let request = BuildRequest::new().set("scale", "0.5").set("dpi", "450");
        let from_request = ConfigBuilder::default().build(&request).unwrap();
        assert_eq!(from_flags, from_request);
        assert_eq!(from_flags.render.dpi, 450);
    }

    #[test]
    fn custom_presets_resolve_like_their_flags() {
        let mut builder = ConfigBuilder::default();
        builder.presets_mut().register(Preset::new(
            "thin-fast",
            "Thin board with small counts",
            &[("thickness", "10"), ("pores-all", "100"), ("dpi", "150")],
        ));
        let via_preset = builder
            .build(&BuildRequest::new().with_preset("thin-fast"))
            .unwrap();
        let via_flags = builder
            .build(&BuildRequest::from_flags(None, &["--thickness", "10", "--pores-all", "100", "--dpi", "150"]).unwrap())
            .unwrap();
        assert_eq!(via_preset, via_flags);
        assert_eq!(via_preset.pore_count(VisualizationKind::Density), 100);
    }
}
