use std::ops::Deref;

use anyhow::Context;
use itertools::Itertools;
use serde_json::Value;

use crate::{
    parser::{
        parse_caption_tracks, parse_timed_text, parse_video_details, select_caption_track,
        WatchPage,
    },
    types::CaptionTrack,
    yt::{TranscriptLoader, VideoUrl},
    TranscriptDocument,
};

/// Loads the caption track published with a video as one transcript document.
pub struct CaptionLoader {
    client: reqwest::Client,
    languages: Vec<String>,
    add_video_info: bool,
}

impl Default for CaptionLoader {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Deref for CaptionLoader {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl CaptionLoader {
    const FALLBACK_LANGUAGE: &'static str = "en";

    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            languages: vec![Self::FALLBACK_LANGUAGE.to_string()],
            add_video_info: false,
        }
    }

    /// Caption languages to try, in order of preference.
    pub fn with_languages<I, L>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let languages = languages
            .into_iter()
            .map(Into::into)
            .filter(|l: &String| !l.trim().is_empty())
            .collect::<Vec<_>>();
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    /// Also attach title, author, length and view count to the document metadata.
    pub fn with_video_info(mut self, add_video_info: bool) -> Self {
        self.add_video_info = add_video_info;
        self
    }

    #[tracing::instrument(skip(self), fields(video_id = %video.video_id()))]
    async fn fetch_watch_page(&self, video: &VideoUrl) -> anyhow::Result<WatchPage> {
        let watch_page = self
            .get(video.as_str())
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(watch_page.into())
    }

    #[tracing::instrument(skip_all, fields(language = %track.language_code))]
    async fn fetch_timed_text(&self, track: &CaptionTrack) -> anyhow::Result<String> {
        let xml = self
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(xml)
    }

    fn pick_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        select_caption_track(tracks, &self.languages).or_else(|| {
            select_caption_track(tracks, &[Self::FALLBACK_LANGUAGE.to_string()])
        })
    }

    /// Joins the timed-text segments of `track` into one annotated document.
    /// `None` when the track holds no text.
    fn build_document(
        &self,
        video: &VideoUrl,
        player_response: &Value,
        track: &CaptionTrack,
        timed_text: &str,
    ) -> Option<TranscriptDocument> {
        let transcript = parse_timed_text(timed_text)
            .into_iter()
            .map(|segment| segment.text)
            .join(" ");

        if transcript.is_empty() {
            return None;
        }

        let mut document = TranscriptDocument::new(transcript)
            .with_metadata("source", video.video_id())
            .with_metadata("language", &track.language_code);

        if self.add_video_info {
            if let Some(details) = parse_video_details(player_response) {
                let fields = [
                    ("title", details.title),
                    ("author", details.author),
                    ("length_seconds", details.length_seconds),
                    ("view_count", details.view_count),
                ];
                for (key, value) in fields {
                    if let Some(value) = value {
                        document = document.with_metadata(key, value);
                    }
                }
            }
        }

        Some(document)
    }
}

impl TranscriptLoader for CaptionLoader {
    async fn load(&self, video: &VideoUrl) -> anyhow::Result<Vec<TranscriptDocument>> {
        let page = self
            .fetch_watch_page(video)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch watch page"))
            .context("Failed to fetch watch page")?;

        let player_response = page
            .player_response::<Value>()
            .context("Failed to read player response")?;

        let tracks = parse_caption_tracks(&player_response)?;
        if tracks.is_empty() {
            tracing::warn!(video_id = %video.video_id(), "Video has no captions");
            return Ok(Vec::new());
        }

        let track = self.pick_track(&tracks).with_context(|| {
            format!(
                "No transcript in {:?}, available: {}",
                self.languages,
                tracks.iter().map(|t| t.language_code.as_str()).join(", ")
            )
        })?;

        let xml = self
            .fetch_timed_text(track)
            .await
            .context("Failed to fetch captions")?;

        let Some(document) = self.build_document(video, &player_response, track, &xml) else {
            tracing::warn!(video_id = %video.video_id(), "Caption track is empty");
            return Ok(Vec::new());
        };

        tracing::info!(
            video_id = %video.video_id(),
            chars = document.content().len(),
            "Loaded transcript"
        );

        Ok(vec![document])
    }
}
