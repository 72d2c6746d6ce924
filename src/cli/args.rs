use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aq-dashboard")]
#[command(about = "Exploratory analysis of multi-station air-quality measurements")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,
}

/// Where the measurements come from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(
        short,
        long = "input",
        required = true,
        num_args = 1..,
        help = "Input CSV files, one or more"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value_t = ',', help = "Field delimiter of the input files")]
    pub delimiter: char,

    #[arg(long, default_value_t = num_cpus::get())]
    pub max_workers: usize,
}

/// Dashboard controls; omitted values default to every station and the
/// full span of the data
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(short, long = "station", help = "Station to include (repeatable)")]
    pub stations: Vec<String>,

    #[arg(long, help = "First day to include (YYYY-MM-DD)")]
    pub start: Option<NaiveDate>,

    #[arg(long, help = "Last day to include (YYYY-MM-DD)")]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every dashboard table for a station and date selection
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, help = "Also write the dashboard view as JSON")]
        json: Option<PathBuf>,
    },

    /// Build the station marker map and export it as GeoJSON
    Map {
        #[command(flatten)]
        input: InputArgs,

        #[arg(
            short,
            long,
            help = "Output GeoJSON path [default: output/aq-stations-{YYMMDD}.geojson]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Write the filtered measurements to Parquet
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(
            short,
            long,
            help = "Output Parquet path [default: output/aq-measurements-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,
    },

    /// Describe the loaded dataset
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summary_with_filters() {
        let cli = Cli::parse_from([
            "aq-dashboard",
            "--quiet",
            "summary",
            "-i",
            "a.csv",
            "b.csv",
            "--station",
            "Dongsi",
            "--station",
            "Tiantan",
            "--start",
            "2014-01-01",
        ]);

        assert!(cli.quiet);
        match cli.command {
            Commands::Summary { input, filter, json } => {
                assert_eq!(input.inputs.len(), 2);
                assert_eq!(filter.stations, vec!["Dongsi", "Tiantan"]);
                assert_eq!(filter.start, NaiveDate::from_ymd_opt(2014, 1, 1));
                assert!(filter.end.is_none());
                assert!(json.is_none());
            }
            _ => panic!("expected summary command"),
        }
    }

    #[test]
    fn test_delimiter_flag() {
        let cli = Cli::parse_from(["aq-dashboard", "info", "-i", "a.csv", "--delimiter", ";"]);

        match cli.command {
            Commands::Info { input } => assert_eq!(input.delimiter, ';'),
            _ => panic!("expected info command"),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Cli::try_parse_from([
            "aq-dashboard",
            "export",
            "-i",
            "a.csv",
            "--end",
            "31/12/2014",
        ]);

        assert!(result.is_err());
    }
}
