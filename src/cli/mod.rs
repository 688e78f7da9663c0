pub(crate) mod params;
pub(crate) mod presets;
pub(crate) mod resolve;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
