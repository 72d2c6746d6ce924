use chrono::{Datelike, Local};
use std::path::PathBuf;

fn dated_output_path(stem: &str, extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("{}-{:02}{:02}{:02}.{}", stem, year, month, day, extension);
    PathBuf::from("output").join(filename)
}

/// Generate default Parquet filename with format: aq-measurements-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    dated_output_path("aq-measurements", "parquet")
}

/// Generate default marker map filename with format: aq-stations-{YYMMDD}.geojson
pub fn generate_default_geojson_filename() -> PathBuf {
    dated_output_path("aq-stations", "geojson")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_parquet_filename() {
        let filename = generate_default_parquet_filename();
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output"));
        assert!(filename_str.ends_with(".parquet"));

        let file_part = filename.file_name().unwrap().to_string_lossy();
        assert!(file_part.starts_with("aq-measurements-"));
        // "aq-measurements-" + YYMMDD + ".parquet"
        assert_eq!(file_part.len(), "aq-measurements-".len() + 6 + ".parquet".len());
    }

    #[test]
    fn test_generate_default_geojson_filename() {
        let filename = generate_default_geojson_filename();
        let file_part = filename.file_name().unwrap().to_string_lossy();

        assert!(file_part.starts_with("aq-stations-"));
        assert!(file_part.ends_with(".geojson"));
        assert_eq!(filename.parent().unwrap(), std::path::Path::new("output"));
    }
}
