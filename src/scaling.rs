//! Scaling laws: global scale, circular specimen diameter and direct dimensions.
//!
//! A build follows at most one scaling path. Under a global scale `s` every
//! spatial quantity is multiplied by `s` and every count by the volume ratio
//! `s³`. Under a diameter the board becomes the equal-area square of the
//! specimen and counts follow that square's volume ratio. Any field a
//! directive sets is taken as-is and never rescaled.

use crate::bounds::{Bounds, CoordinateBounds};
use crate::config::{BoardGeometry, HybridParams, ParticleCounts, PoreCounts, PoreSizeRange, SpecimenSpec};
use crate::error::{BuildError, ConsistencyError};
use crate::overrides::Resolution;
use crate::params::names::*;
use core::fmt;
use std::f64::consts::PI;
use tracing::debug;

/// Board length and width that map to a half-extent of 2.0 normalized units.
pub const REFERENCE_LENGTH_MM: f64 = 160.0;
/// Board thickness that maps to a half-extent of 0.5 normalized units.
pub const REFERENCE_THICKNESS_MM: f64 = 40.0;
/// Millimetres per normalized unit on every axis (160 mm ↔ 2.0, 40 mm ↔ 0.5).
pub const MM_PER_UNIT: f64 = 80.0;

/// DPI the adaptation rule starts from.
pub const BASE_DPI: f64 = 300.0;
pub const MIN_DPI: u64 = 72;
pub const MAX_DPI: u64 = 1200;

/// Half-extents of the 3D view on the default board.
const VIEW_HALF_XY: f64 = 2.2;
const VIEW_HALF_Z: f64 = 0.7;
/// Extra room around a circular specimen's equivalent square.
const SPECIMEN_VIEW_MARGIN: f64 = 1.1;

/// Lower limits applied to shrinking counts when the volume ratio is below 1.
pub const COUNT_FLOORS: [(&str, u64); 8] = [
    (PORES_INDIVIDUAL, 50),
    (PORES_COMPARATIVE, 30),
    (PORES_DENSITY, 40),
    (PORES_MATRIX, 60),
    (PORES_HYBRID, 60),
    (MATRIX_PARTICLES, 1000),
    (HYBRID_MAIN_PARTICLES, 500),
    (HYBRID_COMBINED_PARTICLES, 300),
];

/// Which derivation path a build takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalePath {
    /// Neither `scale` nor `diameter` was given
    Identity,
    /// `scale = s`
    Global,
    /// `diameter = d`
    Diameter,
}

impl fmt::Display for ScalePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalePath::Identity => write!(f, "identity"),
            ScalePath::Global => write!(f, "global scale"),
            ScalePath::Diameter => write!(f, "specimen diameter"),
        }
    }
}

/// Build-scoped scaling state. Never stored in the final configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScalingContext {
    pub path: ScalePath,
    /// `s` on the global path, `side / 160` on the diameter path, 1 otherwise
    pub scale_factor: f64,
    /// `scale_factor³`
    pub volume_ratio: f64,
    pub equivalent_side: Option<f64>,
}

impl Default for ScalingContext {
    fn default() -> Self {
        Self {
            path: ScalePath::Identity,
            scale_factor: 1.0,
            volume_ratio: 1.0,
            equivalent_side: None,
        }
    }
}

impl ScalingContext {
    /// Pick the scaling path from the resolved directives.
    pub fn from_resolution(res: &Resolution) -> Result<Self, ConsistencyError> {
        let scale_set = res.is_set(SCALE);
        let diameter = res.optional_number(DIAMETER);

        if scale_set && diameter.is_some() {
            return Err(ConsistencyError::new(
                &[SCALE, DIAMETER],
                "a global scale and a specimen diameter cannot be combined",
            ));
        }
        // A tolerance only describes a specimen diameter
        if res.is_set(TOLERANCE) && diameter.is_none() {
            return Err(ConsistencyError::new(
                &[TOLERANCE, DIAMETER],
                "a tolerance needs a specimen diameter",
            ));
        }

        let ctx = if let Some(d) = diameter {
            let side = equivalent_side(d);
            let sf = side / REFERENCE_LENGTH_MM;
            Self {
                path: ScalePath::Diameter,
                scale_factor: sf,
                volume_ratio: sf.powi(3),
                equivalent_side: Some(side),
            }
        } else if scale_set {
            let s = res.number(SCALE)?;
            Self {
                path: ScalePath::Global,
                scale_factor: s,
                volume_ratio: s.powi(3),
                equivalent_side: None,
            }
        } else {
            Self::default()
        };

        debug!(
            "Scaling path {} (factor {:.5}, volume ratio {:.5})",
            ctx.path, ctx.scale_factor, ctx.volume_ratio
        );
        Ok(ctx)
    }

    pub fn is_global(&self) -> bool {
        self.path == ScalePath::Global
    }

    /// Factor for quantities that follow either scaling path.
    pub fn active_factor(&self) -> f64 {
        self.scale_factor
    }
}

/// Side of the square whose area equals that of a circle of diameter `d`.
pub fn equivalent_side(diameter: f64) -> f64 {
    diameter / PI.sqrt() * 2.0
}

pub fn count_floor(name: &str) -> Option<u64> {
    COUNT_FLOORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, floor)| *floor)
}

/// `floor(base × volume_ratio)`, held at `floor` when the volume shrinks.
pub fn scaled_count(base: u64, volume_ratio: f64, floor: u64) -> u64 {
    let scaled = (base as f64 * volume_ratio).floor() as u64;
    if volume_ratio < 1.0 {
        scaled.max(floor)
    } else {
        scaled
    }
}

/// DPI for a global scale `s`.
///
/// Small scales get sharper output. Scales above 2 lower the DPI, down to 150.
pub fn adapt_dpi(s: f64) -> u64 {
    if s < 0.5 {
        (BASE_DPI / s).round() as u64
    } else if s > 2.0 {
        ((BASE_DPI / (s * 0.5)).round() as u64).max(150)
    } else {
        BASE_DPI as u64
    }
}

/// Board length/width in mm for one planar axis.
fn planar_mm(res: &Resolution, ctx: &ScalingContext, name: &str) -> Result<f64, BuildError> {
    let value = res.number(name)?;
    if res.is_set(name) {
        return Ok(value);
    }
    Ok(match (ctx.path, ctx.equivalent_side) {
        (ScalePath::Global, _) => value * ctx.scale_factor,
        (ScalePath::Diameter, Some(side)) => side,
        _ => value,
    })
}

/// A numeric value multiplied by `s` under a global scale unless a directive set it.
fn spatial(res: &Resolution, ctx: &ScalingContext, name: &str) -> Result<f64, BuildError> {
    let value = res.number(name)?;
    if ctx.is_global() && !res.is_set(name) {
        Ok(value * ctx.scale_factor)
    } else {
        Ok(value)
    }
}

pub fn derive_board(res: &Resolution, ctx: &ScalingContext) -> Result<BoardGeometry, BuildError> {
    let length_mm = planar_mm(res, ctx, LENGTH)?;
    let width_mm = planar_mm(res, ctx, WIDTH)?;
    let thickness_mm = spatial(res, ctx, THICKNESS)?;
    Ok(BoardGeometry {
        length_mm,
        width_mm,
        thickness_mm,
        length_scale: length_mm / MM_PER_UNIT,
        width_scale: width_mm / MM_PER_UNIT,
        thickness_scale: thickness_mm / MM_PER_UNIT,
    })
}

pub fn derive_pore_sizes(res: &Resolution, ctx: &ScalingContext) -> Result<PoreSizeRange, BuildError> {
    Ok(PoreSizeRange {
        min_radius: spatial(res, ctx, MIN_PORE_RADIUS)?,
        max_radius: spatial(res, ctx, MAX_PORE_RADIUS)?,
    })
}

fn count(res: &Resolution, ctx: &ScalingContext, name: &str) -> Result<u64, BuildError> {
    let base = res.count(name)?;
    if ctx.path == ScalePath::Identity || res.is_set(name) {
        return Ok(base);
    }
    let floor = count_floor(name).unwrap_or(0);
    Ok(scaled_count(base, ctx.volume_ratio, floor))
}

pub fn derive_counts(res: &Resolution, ctx: &ScalingContext) -> Result<ParticleCounts, BuildError> {
    Ok(ParticleCounts {
        pores: PoreCounts {
            individual: count(res, ctx, PORES_INDIVIDUAL)?,
            comparative: count(res, ctx, PORES_COMPARATIVE)?,
            density: count(res, ctx, PORES_DENSITY)?,
            matrix: count(res, ctx, PORES_MATRIX)?,
            hybrid: count(res, ctx, PORES_HYBRID)?,
        },
        matrix_particles: count(res, ctx, MATRIX_PARTICLES)?,
        hybrid: HybridParams {
            main_particles: count(res, ctx, HYBRID_MAIN_PARTICLES)?,
            combined_particles: count(res, ctx, HYBRID_COMBINED_PARTICLES)?,
        },
    })
}

/// The configured DPI, or the adapted one under a global scale.
///
/// An adapted value outside [`MIN_DPI`, `MAX_DPI`] is returned unchanged for
/// the invariant check to reject.
pub fn derive_dpi(res: &Resolution, ctx: &ScalingContext) -> Result<u64, BuildError> {
    let dpi = res.count(DPI)?;
    if ctx.is_global() && !res.is_set(DPI) {
        Ok(adapt_dpi(ctx.scale_factor))
    } else {
        Ok(dpi)
    }
}

/// Axis limits of the 3D view.
///
/// `view-*-limits` directives fix an axis outright. Otherwise a thickness
/// directive fixes the z limits at `±0.7 × thickness / 40`.
pub fn derive_view_limits(res: &Resolution, ctx: &ScalingContext) -> Result<CoordinateBounds, BuildError> {
    let half_xy = match ctx.path {
        ScalePath::Global => VIEW_HALF_XY * ctx.scale_factor,
        ScalePath::Diameter => VIEW_HALF_XY * ctx.scale_factor * SPECIMEN_VIEW_MARGIN,
        ScalePath::Identity => VIEW_HALF_XY,
    };
    let half_z = if res.is_set(THICKNESS) {
        VIEW_HALF_Z * res.number(THICKNESS)? / REFERENCE_THICKNESS_MM
    } else if ctx.is_global() {
        VIEW_HALF_Z * ctx.scale_factor
    } else {
        VIEW_HALF_Z
    };
    let axis = |name: &str, half: f64| match res.optional_pair(name) {
        Some(pair) => Bounds::from_pair(name, pair),
        None => Bounds::symmetric(name, half),
    };
    Ok(CoordinateBounds {
        x: axis(VIEW_X_LIMITS, half_xy)?,
        y: axis(VIEW_Y_LIMITS, half_xy)?,
        z: axis(VIEW_Z_LIMITS, half_z)?,
    })
}

/// The circular specimen record, present only on the diameter path.
pub fn derive_specimen(res: &Resolution, ctx: &ScalingContext) -> Option<SpecimenSpec> {
    let side = ctx.equivalent_side?;
    Some(SpecimenSpec {
        diameter_mm: res.optional_number(DIAMETER)?,
        tolerance_mm: res.optional_number(TOLERANCE),
        equivalent_side_mm: side,
    })
}
