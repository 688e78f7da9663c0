//! Coordinate-space bounds derived from board geometry and the scaling context.
//!
//! All spatial quantities live in normalized coordinates where the default
//! 160 mm board spans `[-2, 2]`. Matrix-fill and default positioning bounds
//! follow a global scale factor; camera position and jitter follow whichever
//! scale factor is active.

use crate::config::{BoardGeometry, PositioningParams};
use crate::error::{BuildError, ConsistencyError};
use crate::overrides::Resolution;
use crate::params::names::*;
use crate::scaling::ScalingContext;
use core::cmp::Ordering;
use core::fmt;
use nalgebra::Vector3;

/// Margin applied to the normalized length and width.
pub const XY_MARGIN: f64 = 0.975;
/// Margin applied to the normalized thickness.
pub const Z_MARGIN: f64 = 0.9;

const Z_JITTER_FACTOR: f64 = 0.5;

/// An interval along one axis with `min < max`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Build a bounds pair, rejecting inverted or degenerate intervals.
    pub fn ordered(field: &str, min: f64, max: f64) -> Result<Self, ConsistencyError> {
        if !matches!(min.partial_cmp(&max), Some(Ordering::Less)) {
            return Err(ConsistencyError::new(
                &[field],
                format!("bounds ({min}, {max}) are not ordered"),
            ));
        }
        Ok(Self { min, max })
    }

    /// `(-half, half)`; `half` must be positive.
    pub fn symmetric(field: &str, half: f64) -> Result<Self, ConsistencyError> {
        Self::ordered(field, -half, half)
    }

    pub fn from_pair(field: &str, (min, max): (f64, f64)) -> Result<Self, ConsistencyError> {
        Self::ordered(field, min, max)
    }

    /// Multiply both ends by a positive factor.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.min, self.max)
    }
}

/// Bounds along the three board axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordinateBounds {
    pub x: Bounds,
    pub y: Bounds,
    pub z: Bounds,
}

impl CoordinateBounds {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x.scaled(factor),
            y: self.y.scaled(factor),
            z: self.z.scaled(factor),
        }
    }

    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        self.x.contains(x) && self.y.contains(y) && self.z.contains(z)
    }

    /// Check the ordering of all three axes, reporting `names[i]` on failure.
    pub fn check(&self, names: [&str; 3]) -> Result<(), ConsistencyError> {
        for (bounds, name) in [self.x, self.y, self.z].iter().zip(names) {
            Bounds::ordered(name, bounds.min, bounds.max)?;
        }
        Ok(())
    }
}

impl fmt::Display for CoordinateBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x={} y={} z={}", self.x, self.y, self.z)
    }
}

/// Bounds derived directly from the board's millimetre dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormalizedBounds {
    pub length_norm: f64,
    pub width_norm: f64,
    pub thickness_norm: f64,
    pub spatial: CoordinateBounds,
}

impl NormalizedBounds {
    pub fn from_board(board: &BoardGeometry) -> Result<Self, ConsistencyError> {
        let length_norm = board.length_mm / 80.0;
        let width_norm = board.width_mm / 80.0;
        let thickness_norm = board.thickness_mm / 20.0;
        Ok(Self {
            length_norm,
            width_norm,
            thickness_norm,
            spatial: CoordinateBounds {
                x: Bounds::symmetric(LENGTH, length_norm * XY_MARGIN)?,
                y: Bounds::symmetric(WIDTH, width_norm * XY_MARGIN)?,
                z: Bounds::symmetric(THICKNESS, thickness_norm * Z_MARGIN)?,
            },
        })
    }
}

/// Everything the bounds stage contributes to a configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialLayout {
    pub normalized: NormalizedBounds,
    pub default_bounds: CoordinateBounds,
    pub matrix_fill: CoordinateBounds,
    pub matrix_length_norm: f64,
    pub matrix_width_norm: f64,
    pub camera_position: Vector3<f64>,
    pub jitter_strength: f64,
    /// Per-axis jitter; z is damped by the z jitter factor
    pub jitter: Vector3<f64>,
}

impl SpatialLayout {
    pub fn positioning(&self) -> PositioningParams {
        PositioningParams {
            jitter_strength: self.jitter_strength,
            jitter: self.jitter,
            z_jitter_factor: Z_JITTER_FACTOR,
            ..PositioningParams::default()
        }
    }
}

/// A bounds pair: the directive value if set, else the default, scaled under
/// a global scale.
fn fill_bounds(res: &Resolution, ctx: &ScalingContext, name: &str) -> Result<Bounds, BuildError> {
    let pair = res.pair(name)?;
    let bounds = Bounds::from_pair(name, pair)?;
    if ctx.is_global() && !res.is_set(name) {
        Ok(bounds.scaled(ctx.scale_factor))
    } else {
        Ok(bounds)
    }
}

fn fill_norm(res: &Resolution, ctx: &ScalingContext, name: &str) -> Result<f64, BuildError> {
    let norm = res.number(name)?;
    if ctx.is_global() && !res.is_set(name) {
        Ok(norm * ctx.scale_factor)
    } else {
        Ok(norm)
    }
}

/// Derive the bounds stage from the resolved directives and board geometry.
pub fn normalize(
    res: &Resolution,
    ctx: &ScalingContext,
    board: &BoardGeometry,
) -> Result<SpatialLayout, BuildError> {
    let normalized = NormalizedBounds::from_board(board)?;

    let matrix_fill = CoordinateBounds {
        x: fill_bounds(res, ctx, MATRIX_X_BOUNDS)?,
        y: fill_bounds(res, ctx, MATRIX_Y_BOUNDS)?,
        z: fill_bounds(res, ctx, MATRIX_Z_BOUNDS)?,
    };

    let default_bounds = CoordinateBounds {
        x: fill_bounds(res, ctx, DEFAULT_X_BOUNDS)?,
        y: fill_bounds(res, ctx, DEFAULT_Y_BOUNDS)?,
        z: fill_bounds(res, ctx, DEFAULT_Z_BOUNDS)?,
    };

    // Camera and jitter follow the active factor on either scaling path
    let factor = ctx.active_factor();
    let (cx, cy, cz) = res.triple(CAMERA_POSITION)?;
    let camera_position = if res.is_set(CAMERA_POSITION) {
        Vector3::new(cx, cy, cz)
    } else {
        Vector3::new(cx, cy, cz) * factor
    };
    let base_jitter = res.number(JITTER_STRENGTH)?;
    let jitter_strength = if res.is_set(JITTER_STRENGTH) {
        base_jitter
    } else {
        base_jitter * factor
    };
    let jitter = Vector3::new(
        jitter_strength,
        jitter_strength,
        jitter_strength * Z_JITTER_FACTOR,
    );

    Ok(SpatialLayout {
        normalized,
        default_bounds,
        matrix_fill,
        matrix_length_norm: fill_norm(res, ctx, MATRIX_LEN_NORM)?,
        matrix_width_norm: fill_norm(res, ctx, MATRIX_WIDTH_NORM)?,
        camera_position,
        jitter_strength,
        jitter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{parse_flags, resolve};
    use crate::params::Registry;
    use crate::presets::PresetBook;
    use crate::scaling;
    use approx::assert_relative_eq;

    fn normalize_flags(flags: &[&str]) -> Result<SpatialLayout, BuildError> {
        let directives = parse_flags(flags)?;
        let res = resolve(&Registry::builtin(), &PresetBook::builtin(), None, &directives)?;
        let ctx = ScalingContext::from_resolution(&res)?;
        let board = scaling::derive_board(&res, &ctx)?;
        normalize(&res, &ctx, &board)
    }

    fn layout(flags: &[&str]) -> SpatialLayout {
        normalize_flags(flags).unwrap()
    }

    #[test]
    fn inverted_pairs_are_rejected() {
        let err = Bounds::ordered(MATRIX_X_BOUNDS, 1.0, -1.0).unwrap_err();
        assert!(err.involves(MATRIX_X_BOUNDS));
        assert!(Bounds::ordered(MATRIX_X_BOUNDS, 1.0, 1.0).is_err());
        assert!(Bounds::symmetric(LENGTH, 0.0).is_err());

        let flipped = CoordinateBounds {
            x: Bounds { min: -1.0, max: 1.0 },
            y: Bounds { min: 1.0, max: -1.0 },
            z: Bounds { min: -1.0, max: 1.0 },
        };
        let err = flipped.check(["x", "y", "z"]).unwrap_err();
        assert_eq!(err.fields, vec!["y".to_string()]);
    }

    #[test]
    fn default_board_normalization() {
        let layout = layout(&[]);
        assert_eq!(layout.normalized.length_norm, 2.0);
        assert_eq!(layout.normalized.thickness_norm, 2.0);
        assert_relative_eq!(layout.normalized.spatial.x.max, 1.95, epsilon = 1e-12);
        assert_relative_eq!(layout.normalized.spatial.z.max, 1.8, epsilon = 1e-12);
        assert_eq!(layout.matrix_fill.x, Bounds { min: -1.95, max: 1.95 });
        assert_eq!(layout.matrix_fill.z, Bounds { min: -0.45, max: 0.45 });
        assert_eq!(layout.camera_position, Vector3::new(3.0, 1.0, 1.0));
        assert_eq!(layout.jitter, Vector3::new(0.01, 0.01, 0.005));
    }

    #[test]
    fn global_scale_moves_every_spatial_quantity() {
        let layout = layout(&["--scale", "0.5"]);
        assert_relative_eq!(layout.matrix_fill.x.max, 0.975, epsilon = 1e-12);
        assert_relative_eq!(layout.matrix_fill.z.min, -0.225, epsilon = 1e-12);
        assert_relative_eq!(layout.default_bounds.y.max, 0.975, epsilon = 1e-12);
        assert_relative_eq!(layout.matrix_length_norm, 0.975, epsilon = 1e-12);
        assert_relative_eq!(layout.camera_position.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(layout.jitter_strength, 0.005, epsilon = 1e-12);
        assert_relative_eq!(layout.normalized.length_norm, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn explicit_bounds_are_not_rescaled() {
        let layout = layout(&["--scale", "2", "--matrix-x-bounds", "-1,1", "--jitter-strength", "0.02"]);
        assert_eq!(layout.matrix_fill.x, Bounds { min: -1.0, max: 1.0 });
        assert_relative_eq!(layout.matrix_fill.y.max, 3.9, epsilon = 1e-12);
        assert_eq!(layout.jitter_strength, 0.02);
    }

    #[test]
    fn dimension_overrides_leave_fill_bounds_verbatim() {
        let layout = layout(&["--length", "320", "--thickness", "10"]);
        assert_eq!(layout.matrix_fill.x, Bounds { min: -1.95, max: 1.95 });
        assert_eq!(layout.default_bounds.z, Bounds { min: -0.45, max: 0.45 });
        assert_relative_eq!(layout.normalized.length_norm, 4.0, epsilon = 1e-12);
        assert_relative_eq!(layout.normalized.spatial.z.max, 0.45, epsilon = 1e-12);
    }

    #[test]
    fn explicit_placement_bounds_survive_a_global_scale() {
        let layout = layout(&["--scale", "0.5", "--default-z-bounds", "-1.95,1.95", "--camera-position", "1,1,3"]);
        assert_eq!(layout.default_bounds.z, Bounds { min: -1.95, max: 1.95 });
        assert_relative_eq!(layout.default_bounds.x.max, 0.975, epsilon = 1e-12);
        assert_eq!(layout.camera_position, Vector3::new(1.0, 1.0, 3.0));

        let err = normalize_flags(&["--default-x-bounds", "1,-1"]).unwrap_err();
        assert!(matches!(err, BuildError::Validation(_)));
    }

    #[test]
    fn diameter_scales_camera_but_not_fill_bounds() {
        let layout = layout(&["--diameter", "10"]);
        let factor = scaling::equivalent_side(10.0) / 160.0;
        assert_relative_eq!(layout.camera_position.x, 3.0 * factor, epsilon = 1e-12);
        assert_eq!(layout.matrix_fill.x, Bounds { min: -1.95, max: 1.95 });
    }
}
