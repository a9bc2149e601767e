use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    url: Url,
    filename: String,
}

impl DatabaseEntry {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for DatabaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl FromStr for DatabaseEntry {
    type Err = FetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(value.trim())
            .map_err(|err| FetchError::InvalidUrl(format!("{value}: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(value.to_string()));
        }
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .map(|segment| segment.to_string())
            .ok_or_else(|| FetchError::InvalidUrl(value.to_string()))?;
        Ok(Self { url, filename })
    }
}
