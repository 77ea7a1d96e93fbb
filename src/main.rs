mod args;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use args::Args;
use satellite_fetcher::Config;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config: Config = args.into();

    satellite_fetcher::run(&config)?;

    Ok(())
}
