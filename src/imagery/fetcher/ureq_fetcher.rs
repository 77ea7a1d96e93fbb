use std::io::Read;
use std::time::Duration;

use ureq::Error::{Status, Transport};
use ureq::{Agent, AgentBuilder};

use super::{Response, TileFetcher};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct UReqFetcher {
    agent: Agent,
}

impl TileFetcher for UReqFetcher {
    fn fetch(&self, url: &str) -> Response {
        let response = self.agent.get(url).call();

        match response {
            Ok(response) if response.status() == 200 => {
                let body = response
                    .into_reader()
                    .bytes()
                    .collect::<Result<Vec<u8>, _>>();

                match body {
                    Ok(body) => Response::ok(body),
                    Err(err) => Response::invalid_body(err.to_string()),
                }
            }

            // ureq only reports 4xx/5xx as errors, anything else short of 200 lands here
            Ok(response) => Response::status(response.status()),

            Err(Status(code, _)) => Response::status(code),

            Err(Transport(transport)) => Response::network_error(transport.to_string()),
        }
    }
}

impl UReqFetcher {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = AgentBuilder::new().timeout(timeout).build();

        UReqFetcher { agent }
    }
}

impl Default for UReqFetcher {
    fn default() -> Self {
        Self::new()
    }
}
