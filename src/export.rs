//! Tabular views of the registry, a resolution and a configuration.

use crate::config::MaterialConfiguration;
use crate::error::ExportError;
use crate::overrides::Resolution;
use crate::params::Registry;
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Convert the parameter registry into a Polars DataFrame.
///
/// Columns: name, kind, default, range, help. Parameters without a default
/// have a null `default`.
pub fn parameters_to_df(registry: &Registry) -> PolarsResult<DataFrame> {
    let specs: Vec<_> = registry.specs().collect();
    df!(
        "name" => specs.iter().map(|s| s.name).collect::<Vec<&str>>(),
        "kind" => specs.iter().map(|s| s.kind.to_string()).collect::<Vec<String>>(),
        "default" => specs.iter().map(|s| s.default).collect::<Vec<Option<&str>>>(),
        "range" => specs.iter().map(|s| s.describe_range()).collect::<Vec<String>>(),
        "help" => specs.iter().map(|s| s.help).collect::<Vec<&str>>(),
    )
}

/// The effective overrides of a resolution with their source.
pub fn overrides_to_df(res: &Resolution) -> PolarsResult<DataFrame> {
    let overrides = res.overrides();
    df!(
        "parameter" => overrides.iter().map(|o| o.parameter).collect::<Vec<&str>>(),
        "value" => overrides.iter().map(|o| o.value.to_string()).collect::<Vec<String>>(),
        "source" => overrides.iter().map(|o| o.source.to_string()).collect::<Vec<String>>(),
    )
}

fn pair(a: f64, b: f64) -> String {
    format!("{a},{b}")
}

/// Flatten a configuration into `(field, value)` rows, grouped by section.
pub fn config_fields(config: &MaterialConfiguration) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut push = |field: &str, value: String| rows.push((field.to_string(), value));

    let b = &config.board;
    push("board.length_mm", b.length_mm.to_string());
    push("board.width_mm", b.width_mm.to_string());
    push("board.thickness_mm", b.thickness_mm.to_string());
    push("board.length_scale", b.length_scale.to_string());
    push("board.width_scale", b.width_scale.to_string());
    push("board.thickness_scale", b.thickness_scale.to_string());
    if let Some(specimen) = &config.specimen {
        push("specimen.diameter_mm", specimen.diameter_mm.to_string());
        if let Some(t) = specimen.tolerance_mm {
            push("specimen.tolerance_mm", t.to_string());
        }
        push("specimen.equivalent_side_mm", specimen.equivalent_side_mm.to_string());
    }

    let c = &config.counts;
    push("pores.individual", c.pores.individual.to_string());
    push("pores.comparative", c.pores.comparative.to_string());
    push("pores.density", c.pores.density.to_string());
    push("pores.matrix", c.pores.matrix.to_string());
    push("pores.hybrid", c.pores.hybrid.to_string());
    push("pores.min_radius", config.pore_sizes.min_radius.to_string());
    push("pores.max_radius", config.pore_sizes.max_radius.to_string());
    push("pores.micropore_color", config.pore_colors.micropore.clone());
    push("pores.mesopore_color", config.pore_colors.mesopore.clone());
    push("pores.macropore_color", config.pore_colors.macropore.clone());

    for (axis, bounds) in [
        ("x", &config.view_limits.x),
        ("y", &config.view_limits.y),
        ("z", &config.view_limits.z),
    ] {
        push(&format!("view.{axis}_limits"), pair(bounds.min, bounds.max));
    }
    for (axis, bounds) in [
        ("x", &config.default_bounds.x),
        ("y", &config.default_bounds.y),
        ("z", &config.default_bounds.z),
    ] {
        push(&format!("positioning.{axis}_bounds"), pair(bounds.min, bounds.max));
    }
    let n = &config.normalized;
    push("normalized.length_norm", n.length_norm.to_string());
    push("normalized.width_norm", n.width_norm.to_string());
    push("normalized.thickness_norm", n.thickness_norm.to_string());

    let m = &config.matrix;
    for (axis, bounds) in [("x", &m.fill.x), ("y", &m.fill.y), ("z", &m.fill.z)] {
        push(&format!("matrix.{axis}_bounds"), pair(bounds.min, bounds.max));
    }
    push("matrix.length_norm", m.length_norm.to_string());
    push("matrix.width_norm", m.width_norm.to_string());
    push("matrix.base_particle_size", m.base_particle_size.to_string());
    push("matrix.particle_size_variation", m.particle_size_variation.to_string());
    push("matrix.particles", c.matrix_particles.to_string());
    push("matrix.particle_alpha", m.particle_alpha.to_string());
    push("matrix.fill_color", m.fill_color.clone());
    push("hybrid.main_particles", c.hybrid.main_particles.to_string());
    push("hybrid.combined_particles", c.hybrid.combined_particles.to_string());

    let p = &config.positioning;
    push("positioning.jitter_strength", p.jitter_strength.to_string());
    push(
        "positioning.jitter",
        format!("{},{},{}", p.jitter.x, p.jitter.y, p.jitter.z),
    );

    let r = &config.render;
    push("render.figure_size", pair(r.figure_size.0, r.figure_size.1));
    push("render.dpi", r.dpi.to_string());
    push("render.elevation", r.elevation.to_string());
    push("render.azimuth", r.azimuth.to_string());
    push("render.alpha", r.alpha.to_string());
    push("render.format", r.output_format.clone());
    push(
        "render.camera_position",
        format!(
            "{},{},{}",
            r.camera_position.x, r.camera_position.y, r.camera_position.z
        ),
    );

    if let Some(a) = &config.advanced {
        push("advanced.colormap", a.colormap.clone());
        push("advanced.tick_count", a.tick_count.to_string());
        push("advanced.bins_count", a.bins_count.to_string());
        push("advanced.micropore_max_radius", a.micropore_max_radius.to_string());
        push("advanced.mesopore_max_radius", a.mesopore_max_radius.to_string());
    }
    rows
}

/// Convert a configuration into a two-column (field, value) DataFrame.
pub fn config_to_df(config: &MaterialConfiguration) -> PolarsResult<DataFrame> {
    let rows = config_fields(config);
    df!(
        "field" => rows.iter().map(|(f, _)| f.as_str()).collect::<Vec<&str>>(),
        "value" => rows.iter().map(|(_, v)| v.as_str()).collect::<Vec<&str>>(),
    )
}

/// Write a DataFrame to a file; the extension follows `file_type`.
///
/// Returns the path that was written.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<PathBuf, ExportError> {
    let path = file_path.with_extension(file_type.extension());
    let mut file = std::fs::File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(path)
}

/// Table formats accepted by `--output-format`.
#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum DataFrameFileType {
    Csv,
    Parquet,
    /// One JSON array of row objects
    Json,
    /// One JSON object per line
    #[value(name = "ndjson")]
    NDJson,
}

impl DataFrameFileType {
    /// File extension written by [`write_df_to_file`].
    pub fn extension(&self) -> &'static str {
        match self {
            DataFrameFileType::Csv => "csv",
            DataFrameFileType::Parquet => "parquet",
            DataFrameFileType::Json => "json",
            DataFrameFileType::NDJson => "ndjson",
        }
    }
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildRequest, ConfigBuilder};

    #[test]
    fn registry_table_has_one_row_per_parameter() {
        let registry = Registry::builtin();
        let df = parameters_to_df(&registry).unwrap();
        assert_eq!(df.height(), registry.specs().count());
        assert_eq!(df.width(), 5);
        // diameter has no default
        assert!(df.column("default").unwrap().null_count() >= 3);
    }

    #[test]
    fn config_table_includes_optional_sections() {
        let builder = ConfigBuilder::default();
        let plain = config_to_df(&builder.build_defaults().unwrap()).unwrap();
        let advanced = config_to_df(
            &builder
                .build(&BuildRequest::new().with_preset("small-specimen").set("advanced-analysis", "on"))
                .unwrap(),
        )
        .unwrap();
        assert!(advanced.height() > plain.height());

        let fields = config_fields(&builder.build_defaults().unwrap());
        assert!(fields.contains(&("render.dpi".to_string(), "300".to_string())));
        assert!(fields.contains(&("matrix.z_bounds".to_string(), "-0.45,0.45".to_string())));
    }

    #[test]
    fn overrides_table_keeps_sources() {
        let builder = ConfigBuilder::default();
        let request = BuildRequest::new().with_preset("fast").set("dpi", "200");
        let res = builder.resolve(&request).unwrap();
        let df = overrides_to_df(&res).unwrap();
        // pores-all expands into five rows
        assert_eq!(df.height(), 9);
    }

    #[test]
    fn write_csv() {
        let mut df = config_to_df(&ConfigBuilder::default().build_defaults().unwrap()).unwrap();
        let target = std::env::temp_dir().join(format!("poreconfig-export-{}", std::process::id()));
        let written = write_df_to_file(&mut df, &target, DataFrameFileType::Csv).unwrap();
        assert_eq!(written.extension().unwrap(), DataFrameFileType::Csv.extension());
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("field,value"));
        std::fs::remove_file(written).unwrap();
    }
}
