//! The immutable configuration snapshot and its parameter groups.

use crate::bounds::{CoordinateBounds, NormalizedBounds};
use crate::scaling::{REFERENCE_LENGTH_MM, REFERENCE_THICKNESS_MM};
use core::fmt;
use core::str::FromStr;
use nalgebra::{Point3, Vector3};

/// Wireframe edges as index pairs into [`BoardGeometry::corners`].
pub const BOARD_EDGES: [(usize, usize); 12] = [
    // Bottom face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    // Top face
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    // Verticals
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Physical board size and its half-extents in normalized coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoardGeometry {
    pub length_mm: f64,
    pub width_mm: f64,
    pub thickness_mm: f64,
    /// Half-length in normalized units
    pub length_scale: f64,
    /// Half-width in normalized units
    pub width_scale: f64,
    /// Half-thickness in normalized units
    pub thickness_scale: f64,
}

/// Board size relative to the 160×160×40 mm reference board.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DimensionScaleFactors {
    pub volume_scale: f64,
    pub length_scale: f64,
    pub width_scale: f64,
    pub thickness_scale: f64,
}

impl BoardGeometry {
    /// The 8 corners, bottom face first, counter-clockwise from `(-x, -y)`.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (l, w, t) = (self.length_scale, self.width_scale, self.thickness_scale);
        [
            Point3::new(-l, -w, -t),
            Point3::new(l, -w, -t),
            Point3::new(l, w, -t),
            Point3::new(-l, w, -t),
            Point3::new(-l, -w, t),
            Point3::new(l, -w, t),
            Point3::new(l, w, t),
            Point3::new(-l, w, t),
        ]
    }

    pub fn edges(&self) -> [(Point3<f64>, Point3<f64>); 12] {
        let corners = self.corners();
        BOARD_EDGES.map(|(a, b)| (corners[a], corners[b]))
    }

    /// Whether a point in normalized coordinates lies inside the board (surface included).
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        p.x.abs() <= self.length_scale
            && p.y.abs() <= self.width_scale
            && p.z.abs() <= self.thickness_scale
    }

    /// Plot box aspect `[1, 1, thickness / length]`.
    pub fn aspect_ratio(&self) -> [f64; 3] {
        [1.0, 1.0, self.thickness_mm / self.length_mm]
    }

    pub fn dimension_scale_factors(&self) -> DimensionScaleFactors {
        let reference_volume = REFERENCE_LENGTH_MM * REFERENCE_LENGTH_MM * REFERENCE_THICKNESS_MM;
        DimensionScaleFactors {
            volume_scale: self.length_mm * self.width_mm * self.thickness_mm / reference_volume,
            length_scale: self.length_mm / REFERENCE_LENGTH_MM,
            width_scale: self.width_mm / REFERENCE_LENGTH_MM,
            thickness_scale: self.thickness_mm / REFERENCE_THICKNESS_MM,
        }
    }
}

/// A circular specimen converted to an equal-area square board.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpecimenSpec {
    pub diameter_mm: f64,
    pub tolerance_mm: Option<f64>,
    pub equivalent_side_mm: f64,
}

/// Radius range of rendered pores; `min_radius < max_radius`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PoreSizeRange {
    pub min_radius: f64,
    pub max_radius: f64,
}

/// The kind of model a pore count is used for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VisualizationKind {
    Individual,
    Comparative,
    Density,
    Matrix,
    Hybrid,
}

impl FromStr for VisualizationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "comparative" => Ok(Self::Comparative),
            "density" => Ok(Self::Density),
            "matrix" => Ok(Self::Matrix),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown visualization kind '{other}'")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoreCounts {
    pub individual: u64,
    pub comparative: u64,
    pub density: u64,
    pub matrix: u64,
    pub hybrid: u64,
}

impl PoreCounts {
    pub fn get(&self, kind: VisualizationKind) -> u64 {
        match kind {
            VisualizationKind::Individual => self.individual,
            VisualizationKind::Comparative => self.comparative,
            VisualizationKind::Density => self.density,
            VisualizationKind::Matrix => self.matrix,
            VisualizationKind::Hybrid => self.hybrid,
        }
    }
}

/// Matrix particles drawn alongside pores in hybrid models.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HybridParams {
    pub main_particles: u64,
    pub combined_particles: u64,
}

/// Every pore and particle count of a build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParticleCounts {
    pub pores: PoreCounts,
    pub matrix_particles: u64,
    pub hybrid: HybridParams,
}

/// Pore size classes used for coloring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoreClass {
    Micro,
    Meso,
    Macro,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoreColors {
    pub micropore: String,
    pub mesopore: String,
    pub macropore: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoreStyle {
    pub alpha: f64,
    pub edge_width: f64,
    pub edge_color: String,
}

impl Default for PoreStyle {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            edge_width: 0.5,
            edge_color: "black".to_string(),
        }
    }
}

/// Sand/dust matrix that fills the board around the pores.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixParams {
    pub fill: CoordinateBounds,
    pub length_norm: f64,
    pub width_norm: f64,
    pub base_particle_size: f64,
    pub particle_size_variation: f64,
    pub particle_alpha: f64,
    pub fill_color: String,
    pub batch_size: usize,
    pub color_intensity_base: f64,
    pub color_intensity_variation: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParticleSizeParams {
    pub base_size: f64,
    pub size_variation: f64,
    pub color_intensity_base: f64,
    pub color_intensity_variation: f64,
    pub pore_color_intensity_base: f64,
    pub pore_color_intensity_variation: f64,
}

impl Default for ParticleSizeParams {
    fn default() -> Self {
        Self {
            base_size: 0.8,
            size_variation: 1.5,
            color_intensity_base: 0.25,
            color_intensity_variation: 0.25,
            pore_color_intensity_base: 0.3,
            pore_color_intensity_variation: 0.4,
        }
    }
}

/// Margins and jitter used when placing pores inside the board.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositioningParams {
    pub edge_margin_factor: f64,
    pub z_margin_factor: f64,
    pub diagonal_pore_ratio: f64,
    pub jitter_strength: f64,
    pub z_jitter_factor: f64,
    /// `(strength, strength, strength × z_jitter_factor)`
    pub jitter: Vector3<f64>,
    pub edge_position_factor: f64,
    pub corner_position_factor: f64,
}

impl Default for PositioningParams {
    fn default() -> Self {
        Self {
            edge_margin_factor: 0.95,
            z_margin_factor: 0.8,
            diagonal_pore_ratio: 0.25,
            jitter_strength: 0.01,
            z_jitter_factor: 0.5,
            jitter: Vector3::new(0.01, 0.01, 0.005),
            edge_position_factor: 0.9,
            corner_position_factor: 0.85,
        }
    }
}

/// Board outline drawn around each model.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStyle {
    pub color: String,
    pub line_width: f64,
    pub alpha: f64,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            color: "#FF8C00".to_string(),
            line_width: 1.5,
            alpha: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Figure width and height in inches
    pub figure_size: (f64, f64),
    pub dpi: u64,
    pub elevation: f64,
    pub azimuth: f64,
    pub alpha: f64,
    pub output_format: String,
    pub camera_position: Vector3<f64>,
    /// Azimuthal and polar sphere resolution
    pub sphere_resolution: (u32, u32),
    pub sort_particles: bool,
    pub z_depth_bonus: f64,
    pub frame: FrameStyle,
}

/// Parameters of the statistical plots, present only when advanced analysis is on.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvancedParams {
    pub colormap: String,
    pub tick_count: u64,
    pub bins_count: u64,
    pub jitter_amount: f64,
    pub stats_position: (f64, f64),
    pub colorbar_formatter: String,
    /// Upper radius of the micropore class
    pub micropore_max_radius: f64,
    /// Upper radius of the mesopore class
    pub mesopore_max_radius: f64,
}

impl AdvancedParams {
    /// Split the pore size range into three equal classes.
    pub fn new(colormap: &str, tick_count: u64, bins_count: u64, sizes: &PoreSizeRange) -> Self {
        let step = (sizes.max_radius - sizes.min_radius) / 3.0;
        Self {
            colormap: colormap.to_string(),
            tick_count,
            bins_count,
            jitter_amount: 1.5,
            stats_position: (0.5, 0.98),
            colorbar_formatter: ":.4f".to_string(),
            micropore_max_radius: sizes.min_radius + step,
            mesopore_max_radius: sizes.min_radius + 2.0 * step,
        }
    }

    pub fn classify(&self, radius: f64) -> PoreClass {
        if radius < self.micropore_max_radius {
            PoreClass::Micro
        } else if radius < self.mesopore_max_radius {
            PoreClass::Meso
        } else {
            PoreClass::Macro
        }
    }
}

/// A complete, validated configuration. Never mutated after it is built.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialConfiguration {
    pub board: BoardGeometry,
    pub specimen: Option<SpecimenSpec>,
    pub pore_sizes: PoreSizeRange,
    pub counts: ParticleCounts,
    pub pore_colors: PoreColors,
    pub pore_style: PoreStyle,
    /// Axis limits of the 3D view
    pub view_limits: CoordinateBounds,
    /// Default placement bounds
    pub default_bounds: CoordinateBounds,
    pub normalized: NormalizedBounds,
    pub matrix: MatrixParams,
    pub particle_sizes: ParticleSizeParams,
    pub positioning: PositioningParams,
    pub render: RenderSettings,
    pub advanced: Option<AdvancedParams>,
}

impl MaterialConfiguration {
    /// Length, width and thickness in mm.
    pub fn board_dimensions(&self) -> (f64, f64, f64) {
        (self.board.length_mm, self.board.width_mm, self.board.thickness_mm)
    }

    pub fn normalized_scales(&self) -> (f64, f64, f64) {
        (self.board.length_scale, self.board.width_scale, self.board.thickness_scale)
    }

    pub fn visualization_limits(&self) -> &CoordinateBounds {
        &self.view_limits
    }

    pub fn coordinate_bounds(&self) -> &CoordinateBounds {
        &self.default_bounds
    }

    pub fn normalized_bounds(&self) -> &NormalizedBounds {
        &self.normalized
    }

    pub fn particle_counts(&self) -> &ParticleCounts {
        &self.counts
    }

    pub fn pore_count(&self, kind: VisualizationKind) -> u64 {
        self.counts.pores.get(kind)
    }

    pub fn positioning_parameters(&self) -> &PositioningParams {
        &self.positioning
    }

    pub fn particle_size_parameters(&self) -> &ParticleSizeParams {
        &self.particle_sizes
    }

    pub fn matrix_parameters(&self) -> &MatrixParams {
        &self.matrix
    }

    pub fn is_point_inside_board(&self, x: f64, y: f64, z: f64) -> bool {
        self.board.contains_point(&Point3::new(x, y, z))
    }
}

impl fmt::Display for MaterialConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.board;
        writeln!(
            f,
            "board: {:.2} x {:.2} x {:.2} mm",
            b.length_mm, b.width_mm, b.thickness_mm
        )?;
        writeln!(
            f,
            "normalized scales: ({:.4}, {:.4}, {:.4})",
            b.length_scale, b.width_scale, b.thickness_scale
        )?;
        if let Some(specimen) = &self.specimen {
            match specimen.tolerance_mm {
                Some(t) => writeln!(f, "specimen: {} ± {t} mm diameter", specimen.diameter_mm)?,
                None => writeln!(f, "specimen: {} mm diameter", specimen.diameter_mm)?,
            }
        }
        let p = &self.counts.pores;
        writeln!(
            f,
            "pores: individual={} comparative={} density={} matrix={} hybrid={}",
            p.individual, p.comparative, p.density, p.matrix, p.hybrid
        )?;
        writeln!(
            f,
            "particles: matrix={} hybrid-main={} hybrid-combined={}",
            self.counts.matrix_particles,
            self.counts.hybrid.main_particles,
            self.counts.hybrid.combined_particles
        )?;
        writeln!(
            f,
            "pore radius: {} - {}",
            self.pore_sizes.min_radius, self.pore_sizes.max_radius
        )?;
        writeln!(f, "view limits: {}", self.view_limits)?;
        write!(
            f,
            "render: {}x{} in @ {} dpi, {}",
            self.render.figure_size.0,
            self.render.figure_size.1,
            self.render.dpi,
            self.render.output_format
        )?;
        if self.advanced.is_some() {
            write!(f, "\nadvanced analysis: enabled")?;
        }
        Ok(())
    }
}
