pub mod loader;

use std::{fmt, future::Future, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::{error::Error, TranscriptDocument};

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Produces transcript documents for a video.
pub trait TranscriptLoader {
    fn load(
        &self,
        video: &VideoUrl,
    ) -> impl Future<Output = anyhow::Result<Vec<TranscriptDocument>>> + Send;
}

/// A validated `https://www.youtube.com/watch?v=<id>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUrl {
    url: String,
    video_id: String,
}

impl VideoUrl {
    pub const WATCH_PREFIX: &'static str = "https://www.youtube.com/watch?v=";

    pub fn parse(input: &str) -> Result<Self, Error> {
        let url = input.trim();
        let Some(rest) = url.strip_prefix(Self::WATCH_PREFIX) else {
            return Err(Error::InvalidInput(format!(
                "expected a URL starting with {}",
                Self::WATCH_PREFIX
            )));
        };

        // drop any further query parameters or fragment
        let video_id = rest.split(['&', '#']).next().unwrap_or_default();
        if !VIDEO_ID_RE.is_match(video_id) {
            return Err(Error::InvalidInput(format!(
                "missing or malformed video id in {url}"
            )));
        }

        Ok(Self {
            url: url.to_string(),
            video_id: video_id.to_string(),
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl FromStr for VideoUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VideoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
