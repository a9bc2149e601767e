use std::io::{self, Write};
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::FetchError;

pub trait DatabaseClient {
    fn download(&self, url: &Url, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

pub struct HttpDatabaseClient {
    client: Client,
}

impl HttpDatabaseClient {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("rrna-db-fetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FetchError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        url: &Url,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, FetchError> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(FetchError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        })
    }
}

impl DatabaseClient for HttpDatabaseClient {
    fn download(&self, url: &Url, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        tracing::debug!(%url, status = response.status().as_u16(), "database response");
        let mut response = Self::handle_status(url, response)?;
        let written = io::copy(&mut response, sink).map_err(|err| {
            if err.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()) {
                FetchError::Http(err.to_string())
            } else {
                FetchError::Filesystem(err.to_string())
            }
        })?;
        sink.flush()
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        Ok(written)
    }
}
