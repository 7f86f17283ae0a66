use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::error::ModelError;

/// Simple enum for media types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Movie media type
    Movie,
    /// TV show media type
    Tv,
}

impl MediaType {
    /// Lowercase wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Movie
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(ModelError::InvalidMediaType(other.to_string())),
        }
    }
}
