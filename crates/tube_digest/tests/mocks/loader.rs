use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tube_digest::{
    yt::{TranscriptLoader, VideoUrl},
    TranscriptDocument,
};

#[derive(Clone, Default)]
pub struct MockTranscriptLoader {
    pub documents: Vec<TranscriptDocument>,
    /// Video ids requested so far.
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

impl MockTranscriptLoader {
    pub fn new(contents: &[&str]) -> Self {
        Self {
            documents: contents
                .iter()
                .map(|c| TranscriptDocument::new(*c).with_metadata("source", "mock"))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn slow(contents: &[&str], delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(contents)
        }
    }
}

impl TranscriptLoader for MockTranscriptLoader {
    async fn load(&self, video: &VideoUrl) -> anyhow::Result<Vec<TranscriptDocument>> {
        self.calls.lock().unwrap().push(video.video_id().to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.documents.clone())
    }
}
