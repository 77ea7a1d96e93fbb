mod ureq_fetcher;

use super::{Response, TileFetcher};

pub use ureq_fetcher::{UReqFetcher, REQUEST_TIMEOUT};

#[cfg(test)]
mod mock_fetcher;

#[cfg(test)]
pub use mock_fetcher::MockFetcher;
