pub mod imagery;
pub mod records;

use std::path::PathBuf;

use log::debug;

pub use imagery::{
    FetchError, ImageFetcher, Notice, Outcome, Response, TileFetcher, TileRequest, UReqFetcher,
    DEFAULT_SIZE, DEFAULT_ZOOM,
};
pub use records::{load_records, InputError, InputFormat, Record};

/// Everything a batch run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub credential: String,
    pub zoom: u8,
    pub size: String,
}

impl Config {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            credential: credential.into(),
            zoom: DEFAULT_ZOOM,
            size: DEFAULT_SIZE.to_string(),
        }
    }
}

/// Downloads an image for every record of `config.input` that has none yet.
///
/// Only a broken input table or an unusable output folder stops the run. A
/// failing record is logged and left for the next run.
pub fn run(config: &Config) -> Result<(), InputError> {
    let records = load_records(&config.input)?;

    debug!(
        "Loaded {} records from {}",
        records.len(),
        config.input.display()
    );

    let request = TileRequest::new(config.credential.as_str())
        .zoom(config.zoom)
        .size(config.size.as_str());

    ImageFetcher::new(&config.output, request)?.run(&records);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{run, Config, InputError};

    #[test]
    fn test_bad_input_stops_before_output_folder() {
        let dir = TempDir::new().unwrap();

        let input = dir.path().join("houses.csv");
        fs::write(&input, "name,lat\nhome,10.0\n").unwrap();

        let output = dir.path().join("images");

        // Act

        let error = run(&Config::new(&input, &output, "pk.test")).unwrap_err();

        // Assert

        assert!(matches!(error, InputError::MissingColumns(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_with_only_existing_images() {
        let dir = TempDir::new().unwrap();

        let input = dir.path().join("houses.csv");
        fs::write(&input, "id,lat,long\n1,10.0,20.0\n2,11.0,21.0\n").unwrap();

        let output = dir.path().join("images");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("1.jpg"), b"first").unwrap();
        fs::write(output.join("2.jpg"), b"second").unwrap();

        // Act

        run(&Config::new(&input, &output, "pk.test")).unwrap();

        // Assert

        assert_eq!(fs::read(output.join("1.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(output.join("2.jpg")).unwrap(), b"second");
    }
}
