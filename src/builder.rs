//! Assembles a [`MaterialConfiguration`] from a build request.
//!
//! A build runs resolve, scale, normalize and validate in order. Either every
//! stage succeeds and a complete configuration comes out, or the first failure
//! is returned and nothing is produced.

use crate::bounds;
use crate::config::{
    AdvancedParams, FrameStyle, MaterialConfiguration, MatrixParams, ParticleSizeParams, PoreColors,
    PoreStyle, RenderSettings,
};
use crate::error::{BuildError, ConsistencyError};
use crate::overrides::{self, parse_flags, OverrideDirective, Resolution};
use crate::params::names::*;
use crate::params::Registry;
use crate::presets::PresetBook;
use crate::scaling::{self, ScalingContext, MAX_DPI, MIN_DPI};
use tracing::trace;

const MATRIX_BATCH_SIZE: usize = 1000;
const MATRIX_COLOR_INTENSITY_BASE: f64 = 0.3;
const MATRIX_COLOR_INTENSITY_VARIATION: f64 = 0.5;
const SPHERE_RESOLUTION: (u32, u32) = (12, 8);
const Z_DEPTH_BONUS: f64 = 0.1;

/// An optional preset plus explicit directives in command order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildRequest {
    pub preset: Option<String>,
    pub directives: Vec<OverrideDirective>,
}

impl BuildRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, name: &str) -> Self {
        self.preset = Some(name.to_string());
        self
    }

    /// Append an explicit directive.
    pub fn set(mut self, parameter: &str, raw: &str) -> Self {
        self.directives.push(OverrideDirective::explicit(parameter, raw));
        self
    }

    /// A request from `--name value` style flags.
    pub fn from_flags<S: AsRef<str>>(preset: Option<&str>, flags: &[S]) -> Result<Self, BuildError> {
        Ok(Self {
            preset: preset.map(str::to_string),
            directives: parse_flags(flags)?,
        })
    }
}

/// Builds configurations against a registry and a preset book.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    registry: Registry,
    presets: PresetBook,
}

impl ConfigBuilder {
    pub fn new(registry: Registry, presets: PresetBook) -> Self {
        Self { registry, presets }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn presets(&self) -> &PresetBook {
        &self.presets
    }

    /// For registering custom presets.
    pub fn presets_mut(&mut self) -> &mut PresetBook {
        &mut self.presets
    }

    pub fn resolve(&self, request: &BuildRequest) -> Result<Resolution, BuildError> {
        overrides::resolve(
            &self.registry,
            &self.presets,
            request.preset.as_deref(),
            &request.directives,
        )
    }

    /// Derive and validate a configuration from resolved directives.
    pub fn assemble(&self, res: &Resolution) -> Result<MaterialConfiguration, BuildError> {
        let ctx = ScalingContext::from_resolution(res)?;
        let board = scaling::derive_board(res, &ctx)?;
        let pore_sizes = scaling::derive_pore_sizes(res, &ctx)?;
        let counts = scaling::derive_counts(res, &ctx)?;
        let view_limits = scaling::derive_view_limits(res, &ctx)?;
        let layout = bounds::normalize(res, &ctx, &board)?;

        let advanced = if res.flag(ADVANCED_ANALYSIS)? {
            Some(AdvancedParams::new(
                &res.text(ADVANCED_COLORMAP)?,
                res.count(ADVANCED_TICK_COUNT)?,
                res.count(ADVANCED_BINS)?,
                &pore_sizes,
            ))
        } else {
            None
        };

        let config = MaterialConfiguration {
            board,
            specimen: scaling::derive_specimen(res, &ctx),
            pore_sizes,
            counts,
            pore_colors: PoreColors {
                micropore: res.text(MICROPORE_COLOR)?,
                mesopore: res.text(MESOPORE_COLOR)?,
                macropore: res.text(MACROPORE_COLOR)?,
            },
            pore_style: PoreStyle::default(),
            view_limits,
            default_bounds: layout.default_bounds,
            normalized: layout.normalized,
            matrix: MatrixParams {
                fill: layout.matrix_fill,
                length_norm: layout.matrix_length_norm,
                width_norm: layout.matrix_width_norm,
                base_particle_size: res.number(MATRIX_BASE_SIZE)?,
                particle_size_variation: res.number(MATRIX_SIZE_VAR)?,
                particle_alpha: res.number(MATRIX_ALPHA)?,
                fill_color: res.text(MATRIX_FILL_COLOR)?,
                batch_size: MATRIX_BATCH_SIZE,
                color_intensity_base: MATRIX_COLOR_INTENSITY_BASE,
                color_intensity_variation: MATRIX_COLOR_INTENSITY_VARIATION,
            },
            particle_sizes: ParticleSizeParams::default(),
            positioning: layout.positioning(),
            render: RenderSettings {
                figure_size: res.pair(FIGURE_SIZE)?,
                dpi: scaling::derive_dpi(res, &ctx)?,
                elevation: res.number(ELEVATION)?,
                azimuth: res.number(AZIMUTH)?,
                alpha: res.number(ALPHA)?,
                output_format: res.text(FORMAT)?,
                camera_position: layout.camera_position,
                sphere_resolution: SPHERE_RESOLUTION,
                sort_particles: true,
                z_depth_bonus: Z_DEPTH_BONUS,
                frame: FrameStyle::default(),
            },
            advanced,
        };

        check_invariants(&config)?;
        trace!("Assembled configuration\n{config}");
        Ok(config)
    }

    pub fn build(&self, request: &BuildRequest) -> Result<MaterialConfiguration, BuildError> {
        let res = self.resolve(request)?;
        self.assemble(&res)
    }

    /// The configuration made of registry defaults only.
    pub fn build_defaults(&self) -> Result<MaterialConfiguration, BuildError> {
        self.build(&BuildRequest::new())
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), ConsistencyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConsistencyError::new(
            &[field],
            format!("{value} is outside [0, 1]"),
        ))
    }
}

/// Cross-field checks on a fully derived configuration.
pub fn check_invariants(config: &MaterialConfiguration) -> Result<(), ConsistencyError> {
    let sizes = &config.pore_sizes;
    if sizes.min_radius >= sizes.max_radius {
        return Err(ConsistencyError::new(
            &[MIN_PORE_RADIUS, MAX_PORE_RADIUS],
            format!(
                "minimum radius {} must be smaller than maximum radius {}",
                sizes.min_radius, sizes.max_radius
            ),
        ));
    }

    let b = &config.board;
    for (field, mm) in [(LENGTH, b.length_mm), (WIDTH, b.width_mm), (THICKNESS, b.thickness_mm)] {
        if mm.is_nan() || mm <= 0.0 {
            return Err(ConsistencyError::new(&[field], format!("{mm} mm is not positive")));
        }
    }

    config.view_limits.check([VIEW_X_LIMITS, VIEW_Y_LIMITS, VIEW_Z_LIMITS])?;
    config
        .matrix
        .fill
        .check([MATRIX_X_BOUNDS, MATRIX_Y_BOUNDS, MATRIX_Z_BOUNDS])?;
    config
        .default_bounds
        .check([DEFAULT_X_BOUNDS, DEFAULT_Y_BOUNDS, DEFAULT_Z_BOUNDS])?;
    config.normalized.spatial.check([LENGTH, WIDTH, THICKNESS])?;

    let dpi = config.render.dpi;
    if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
        return Err(ConsistencyError::new(
            &[DPI],
            format!("{dpi} is outside [{MIN_DPI}, {MAX_DPI}]"),
        ));
    }

    unit_interval(ALPHA, config.render.alpha)?;
    unit_interval(MATRIX_ALPHA, config.matrix.particle_alpha)?;
    unit_interval("frame-alpha", config.render.frame.alpha)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use crate::config::VisualizationKind;
    use approx::assert_relative_eq;

    fn build(preset: Option<&str>, flags: &[&str]) -> Result<MaterialConfiguration, BuildError> {
        let request = BuildRequest::from_flags(preset, flags)?;
        ConfigBuilder::default().build(&request)
    }

    #[test]
    fn identity() {
        let config = build(None, &[]).unwrap();
        assert_eq!(config, ConfigBuilder::default().build_defaults().unwrap());
        assert_eq!(config.board_dimensions(), (160.0, 160.0, 40.0));
        assert_eq!(config.normalized_scales(), (2.0, 2.0, 0.5));
        assert_eq!(config.pore_count(VisualizationKind::Individual), 600);
        assert_eq!(config.counts.matrix_particles, 15000);
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.render.figure_size, (12.0, 8.0));
        assert_eq!(config.view_limits.x, Bounds { min: -2.2, max: 2.2 });
        assert_eq!(config.matrix.fill.z, Bounds { min: -0.45, max: 0.45 });
        assert_eq!(config.pore_colors.micropore, "#FF1493");
        assert!(config.specimen.is_none());
        assert!(config.advanced.is_none());
    }

    #[test]
    fn scale_idempotence() {
        let unscaled = build(None, &[]).unwrap();
        let scaled = build(None, &["--scale", "1.0"]).unwrap();
        assert_eq!(scaled, unscaled);
    }

    #[test]
    fn volume_scaling_law() {
        let config = build(None, &["--scale", "0.5"]).unwrap();
        assert_eq!(config.counts.pores.individual, 75);
        assert_eq!(config.board_dimensions(), (80.0, 80.0, 20.0));
        assert_relative_eq!(config.pore_sizes.max_radius, 0.04, epsilon = 1e-12);
        assert_relative_eq!(config.view_limits.z.max, 0.35, epsilon = 1e-12);
    }

    #[test]
    fn dpi_adaptation_law() {
        assert_eq!(build(None, &["--scale", "0.3"]).unwrap().render.dpi, 1000);
        assert_eq!(build(None, &["--scale", "3.0"]).unwrap().render.dpi, 200);
        assert_eq!(build(None, &["--scale", "1.5"]).unwrap().render.dpi, 300);
        assert_eq!(build(None, &["--scale", "0.25"]).unwrap().render.dpi, 1200);

        // 300 / 0.2 = 1500 exceeds the valid range
        match build(None, &["--scale", "0.2"]).unwrap_err() {
            BuildError::Consistency(e) => assert!(e.involves(DPI)),
            other => panic!("unexpected error {other:?}"),
        }
        // An explicit dpi lifts the rejection
        assert_eq!(build(None, &["--scale", "0.2", "--dpi", "1200"]).unwrap().render.dpi, 1200);
    }

    #[test]
    fn diameter_conversion() {
        let config = build(None, &["--diameter", "10"]).unwrap();
        assert_relative_eq!(config.board.length_mm, 11.2838, epsilon = 1e-4);
        assert_relative_eq!(config.board.length_scale, 2.0 * 0.070524, epsilon = 1e-5);
        let specimen = config.specimen.unwrap();
        assert_eq!(specimen.diameter_mm, 10.0);
        assert_eq!(specimen.tolerance_mm, None);
    }

    #[test]
    fn invariant_rejection() {
        let err = build(None, &["--min-pore-radius", "0.08", "--max-pore-radius", "0.03"]).unwrap_err();
        match err {
            BuildError::Consistency(e) => {
                assert!(e.involves(MIN_PORE_RADIUS));
                assert!(e.involves(MAX_PORE_RADIUS));
            }
            other => panic!("unexpected error {other:?}"),
        }

        // Equal radii are rejected as well
        assert!(build(None, &["--min-pore-radius", "0.05", "--max-pore-radius", "0.05"]).is_err());
    }

    #[test]
    fn precedence() {
        let tall = build(Some("tall"), &[]).unwrap();
        let config = build(Some("tall"), &["--thickness", "200"]).unwrap();
        assert_eq!(config.board.thickness_mm, 200.0);
        assert_eq!(config.board.length_mm, 40.0);
        assert_eq!(config.board.width_mm, 40.0);
        assert_eq!(config.matrix.fill, tall.matrix.fill);
        assert_eq!(config.counts, tall.counts);
        assert_eq!(config.render.elevation, 20.0);
        assert_eq!(config.view_limits, tall.view_limits);
        assert_eq!(config.default_bounds, tall.default_bounds);
    }

    #[test]
    fn tall_preset_reorients_the_view() {
        let config = build(Some("tall"), &[]).unwrap();
        assert_eq!(config.view_limits.x, Bounds { min: -0.7, max: 0.7 });
        assert_eq!(config.view_limits.z, Bounds { min: -2.2, max: 2.2 });
        assert_eq!(config.default_bounds.z, Bounds { min: -1.95, max: 1.95 });
        assert_eq!(config.render.camera_position, nalgebra::Vector3::new(1.0, 1.0, 3.0));
        assert_eq!(config.board.aspect_ratio(), [1.0, 1.0, 4.0]);
    }

    #[test]
    fn dim100_preset_follows_its_cube_volume() {
        let config = build(Some("dim100"), &[]).unwrap();
        let volume = config.board.dimension_scale_factors().volume_scale;
        assert_eq!(volume, 0.9765625);
        assert_eq!(config.counts.pores.individual, (600.0 * volume) as u64);
        assert_eq!(config.counts.pores.comparative, 390);
        assert_eq!(config.counts.pores.hybrid, 781);
        assert_eq!(config.counts.matrix_particles, 14648);
        assert_eq!(config.counts.hybrid.main_particles, 7812);
        assert_eq!(config.counts.hybrid.combined_particles, 4882);
        assert_eq!(config.view_limits.x, Bounds { min: -1.5, max: 1.5 });
        assert_eq!(config.default_bounds.y, Bounds { min: -1.2, max: 1.2 });
        assert_eq!(config.render.camera_position, nalgebra::Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn presets_match_their_explicit_flags() {
        let builder = ConfigBuilder::default();
        for preset in builder.presets().presets() {
            let via_preset = builder
                .build(&BuildRequest::new().with_preset(&preset.name))
                .unwrap();
            let via_flags = builder
                .build(&BuildRequest {
                    preset: None,
                    directives: preset.as_explicit(),
                })
                .unwrap();
            assert_eq!(via_preset, via_flags, "preset {} differs", preset.name);
        }
    }

    #[test]
    fn small_specimen_preset() {
        let config = build(Some("small-specimen"), &[]).unwrap();
        let specimen = config.specimen.unwrap();
        assert_eq!(specimen.tolerance_mm, Some(1.0));
        assert_eq!(config.board.thickness_mm, 10.0);
        assert_eq!(config.render.dpi, 600);
        assert_relative_eq!(config.view_limits.z.max, 0.175, epsilon = 1e-12);
        // Counts follow the specimen volume down to their floors
        assert_eq!(config.counts.pores.individual, 50);
        assert_eq!(config.counts.pores.comparative, 30);
        assert_eq!(config.counts.matrix_particles, 1000);
    }

    #[test]
    fn advanced_params_follow_the_flag() {
        let config = build(Some("dim100"), &[]).unwrap();
        let advanced = config.advanced.unwrap();
        assert_eq!(advanced.tick_count, 10);
        assert_eq!(advanced.colormap, "jet");
        assert_relative_eq!(advanced.micropore_max_radius, 0.06, epsilon = 1e-12);
        assert_relative_eq!(advanced.mesopore_max_radius, 0.08, epsilon = 1e-12);

        let config = build(Some("dim100"), &["--advanced-analysis", "false"]).unwrap();
        assert!(config.advanced.is_none());
    }

    #[test]
    fn color_directives() {
        let config = build(Some("color"), &["--macropore-color", "red"]).unwrap();
        assert_eq!(config.pore_colors.micropore, "#1F77B4");
        assert_eq!(config.pore_colors.macropore, "red");
        assert_eq!(config.matrix.fill_color, "#CCCCCC");
        assert_eq!(config.matrix.particle_alpha, 0.3);
    }

    #[test]
    fn invariants_catch_hand_built_configurations() {
        let mut config = build(None, &[]).unwrap();
        config.render.frame.alpha = 1.5;
        assert!(check_invariants(&config).unwrap_err().involves("frame-alpha"));

        let mut config = build(None, &[]).unwrap();
        config.render.dpi = 2000;
        assert!(check_invariants(&config).unwrap_err().involves(DPI));

        let mut config = build(None, &[]).unwrap();
        config.board.width_mm = 0.0;
        assert!(check_invariants(&config).unwrap_err().involves(WIDTH));

        let mut config = build(None, &[]).unwrap();
        config.default_bounds.z = Bounds { min: 0.4, max: -0.4 };
        assert!(check_invariants(&config).unwrap_err().involves("default-z-bounds"));
    }
}
