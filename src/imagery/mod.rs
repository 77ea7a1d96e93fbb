mod fetcher;

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;
use url::Url;

use crate::records::{InputError, Record};

pub use fetcher::{UReqFetcher, REQUEST_TIMEOUT};

pub const DEFAULT_ZOOM: u8 = 16;
pub const DEFAULT_SIZE: &str = "400x400";
pub const PROGRESS_INTERVAL: usize = 50;

const STATIC_IMAGES_URL: &str = "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static";
const BEARING: u16 = 0;
const IMAGE_EXTENSION: &str = "jpg";

#[derive(Debug)]
pub enum Response {
    Ok(Vec<u8>),
    Status(u16),
    InvalidBody(String),
    NetworkError(String),
}

impl Response {
    pub fn ok(body: Vec<u8>) -> Self {
        Self::Ok(body)
    }

    pub fn status(code: u16) -> Self {
        Self::Status(code)
    }

    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::InvalidBody(reason.into())
    }

    pub fn network_error(reason: impl Into<String>) -> Self {
        Self::NetworkError(reason.into())
    }
}

pub trait TileFetcher {
    fn fetch(&self, url: &str) -> Response;
}

impl<T: TileFetcher + ?Sized> TileFetcher for &T {
    fn fetch(&self, url: &str) -> Response {
        (**self).fetch(url)
    }
}

/// Parameters shared by every static image request of a run.
#[derive(Debug, Clone)]
pub struct TileRequest {
    credential: String,
    zoom: u8,
    size: String,
}

impl TileRequest {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            zoom: DEFAULT_ZOOM,
            size: DEFAULT_SIZE.to_string(),
        }
    }

    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn url_for(&self, record: &Record) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!(
            "{}/{},{},{},{}/{}",
            STATIC_IMAGES_URL, record.long, record.lat, self.zoom, BEARING, self.size
        ))?;

        url.query_pairs_mut()
            .append_pair("access_token", &self.credential);

        Ok(url)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{status}")]
    Rejected { status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    InvalidBody(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to a single record.
#[derive(Debug)]
pub enum Outcome {
    Written(PathBuf),
    Skipped(PathBuf),
    Failed(FetchError),
}

#[derive(Debug)]
pub enum Notice<'a> {
    Started { total: usize },
    Failed { id: &'a str, error: &'a FetchError },
    Progress { processed: usize, total: usize },
    Finished,
}

impl fmt::Display for Notice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Started { total } => write!(f, "Starting download for {} rows...", total),
            Notice::Failed {
                id,
                error: FetchError::Rejected { status },
            } => write!(f, "Failed ID {}: {}", id, status),
            Notice::Failed { id, error } => write!(f, "Error at ID {}: {}", id, error),
            Notice::Progress { processed, total } => {
                write!(f, "Progress: {}/{} images processed.", processed, total)
            }
            Notice::Finished => write!(f, "Download process finished!"),
        }
    }
}

fn log_notice(notice: Notice<'_>) {
    match notice {
        Notice::Failed { .. } => error!("{}", notice),
        _ => info!("{}", notice),
    }
}

pub struct ImageFetcher<T: TileFetcher> {
    fetcher: T,
    output: PathBuf,
    request: TileRequest,
}

impl<T> ImageFetcher<T>
where
    T: TileFetcher,
{
    pub fn with_fetcher(
        output: impl AsRef<Path>,
        request: TileRequest,
        fetcher: T,
    ) -> Result<Self, InputError> {
        let output = output.as_ref().to_path_buf();

        fs::create_dir_all(&output).map_err(|source| InputError::OutputFolder {
            path: output.clone(),
            source,
        })?;

        Ok(ImageFetcher {
            fetcher,
            output,
            request,
        })
    }

    pub fn output_path(&self, record: &Record) -> PathBuf {
        self.output.join(format!("{}.{}", record.id, IMAGE_EXTENSION))
    }

    /// Fetches one record unless its image is already on disk.
    pub fn fetch_record(&self, record: &Record) -> Outcome {
        let path = self.output_path(record);

        if path.exists() {
            return Outcome::Skipped(path);
        }

        match self.download(record, &path) {
            Ok(()) => Outcome::Written(path),
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Processes every record in order, logging failures and progress.
    pub fn run(&self, records: &[Record]) {
        self.run_with(records, log_notice);
    }

    pub fn run_with<F>(&self, records: &[Record], mut notify: F)
    where
        F: FnMut(Notice<'_>),
    {
        let total = records.len();

        notify(Notice::Started { total });

        for (index, record) in records.iter().enumerate() {
            match self.fetch_record(record) {
                Outcome::Written(path) => debug!("Saved {}", path.display()),

                Outcome::Skipped(path) => {
                    debug!("Skipping ID {}: {} exists", record.id, path.display())
                }

                Outcome::Failed(error) => notify(Notice::Failed {
                    id: &record.id,
                    error: &error,
                }),
            }

            let processed = index + 1;

            if processed % PROGRESS_INTERVAL == 0 {
                notify(Notice::Progress { processed, total });
            }
        }

        notify(Notice::Finished);
    }

    fn download(&self, record: &Record, path: &Path) -> Result<(), FetchError> {
        let url = self.request.url_for(record)?;

        match self.fetcher.fetch(url.as_str()) {
            Response::Ok(body) => write_image(path, &body),
            Response::Status(status) => Err(FetchError::Rejected { status }),
            Response::InvalidBody(reason) => Err(FetchError::InvalidBody(reason)),
            Response::NetworkError(reason) => Err(FetchError::Transport(reason)),
        }
    }
}

impl ImageFetcher<UReqFetcher> {
    pub fn new(output: impl AsRef<Path>, request: TileRequest) -> Result<Self, InputError> {
        ImageFetcher::with_fetcher(output, request, UReqFetcher::new())
    }
}

// A half written file would be mistaken for a finished one on the next run
fn write_image(path: &Path, body: &[u8]) -> Result<(), FetchError> {
    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(body));

    written.map_err(|source| {
        if source.kind() != io::ErrorKind::AlreadyExists {
            let _ = fs::remove_file(path);
        }

        FetchError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
use fetcher::MockFetcher;
