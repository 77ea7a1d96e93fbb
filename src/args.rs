use std::path::PathBuf;

use clap::Parser;

use satellite_fetcher::{Config, DEFAULT_SIZE, DEFAULT_ZOOM};

/// Downloads a satellite image for every id/lat/long row of a csv or spreadsheet,
/// skipping ids whose image is already in the output folder.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Input table (.xlsx and other spreadsheets, anything else is read as csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Folder the <id>.jpg images are written to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Mapbox access token
    #[arg(short, long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Zoom level of the requested images
    #[arg(short, long, default_value_t = DEFAULT_ZOOM, value_parser = clap::value_parser!(u8).range(0..=22))]
    pub zoom: u8,

    /// Image size in pixels, as WIDTHxHEIGHT
    #[arg(short, long, default_value = DEFAULT_SIZE)]
    pub size: String,

    /// Log every skipped and saved image
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            input: args.input,
            output: args.output,
            credential: args.token,
            zoom: args.zoom,
            size: args.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use satellite_fetcher::Config;

    use super::Args;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from([
            "satellite-fetcher",
            "-i",
            "houses.xlsx",
            "-o",
            "images",
            "-t",
            "pk.test",
        ])
        .unwrap();

        assert!(!args.verbose);

        let config = Config::from(args);

        assert_eq!(config.input.to_str(), Some("houses.xlsx"));
        assert_eq!(config.output.to_str(), Some("images"));
        assert_eq!(config.credential, "pk.test");
        assert_eq!(config.zoom, 16);
        assert_eq!(config.size, "400x400");
    }

    #[test]
    fn test_zoom_out_of_range() {
        let args = Args::try_parse_from([
            "satellite-fetcher",
            "--input",
            "houses.csv",
            "--output",
            "images",
            "--token",
            "pk.test",
            "--zoom",
            "30",
        ]);

        assert!(args.is_err());
    }
}
