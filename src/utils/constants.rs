/// Input column names
pub const COLUMN_STATION: &str = "station";
pub const COLUMN_DATETIME: &str = "datetime";
pub const COLUMN_PM25: &str = "PM2.5";
pub const COLUMN_PM10: &str = "PM10";
pub const COLUMN_TEMP: &str = "TEMP";
pub const COLUMN_DEWP: &str = "DEWP";
pub const COLUMN_WSPM: &str = "WSPM";
pub const COLUMN_RAIN: &str = "RAIN";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    COLUMN_STATION,
    COLUMN_DATETIME,
    COLUMN_PM25,
    COLUMN_PM10,
    COLUMN_TEMP,
    COLUMN_DEWP,
    COLUMN_WSPM,
    COLUMN_RAIN,
];

/// Cell values read as an absent measurement
pub const MISSING_VALUE_MARKERS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

/// Accepted datetime layouts, tried in order
pub const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Severity policy
pub const DEFAULT_SEVERITY_THRESHOLD: f64 = 175.0;

/// Chart defaults
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Map defaults (Beijing)
pub const DEFAULT_MAP_CENTER_LAT: f64 = 39.9;
pub const DEFAULT_MAP_CENTER_LON: f64 = 116.4;
pub const DEFAULT_MAP_ZOOM: u8 = 10;
pub const DEFAULT_SUSPECT_DISTANCE_KM: f64 = 100.0;

/// Marker colours
pub const MARKER_COLOR_HIGH: &str = "red";
pub const MARKER_COLOR_NORMAL: &str = "green";

/// Environment prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "AQ_DASHBOARD";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
