use std::cell::RefCell;

use super::{Response, TileFetcher};

/// Replays canned responses in order and remembers every url it was asked for.
pub struct MockFetcher {
    responses: RefCell<Vec<Response>>,
    requests: RefCell<Vec<String>>,
}

impl TileFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Response {
        self.requests.borrow_mut().push(url.to_string());

        let mut responses = self.responses.borrow_mut();

        if responses.is_empty() {
            Response::network_error("no mocked response left")
        } else {
            responses.remove(0)
        }
    }
}

impl MockFetcher {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: RefCell::new(responses),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}
