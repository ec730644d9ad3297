use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("No transcript documents to summarize")]
    EmptyDocumentSet,
    #[error("Failed to load transcript: {0}")]
    TranscriptUnavailable(#[from] LoadError),
    #[error("Summarization engine error: {0}")]
    SummarizationEngine(#[from] EngineError),
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),
}

/// Why a transcript could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Source(String),
}

/// Failures raised while a chain talks to the summarization engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Upstream(String),
    #[error("summaries did not fit the collapse limit after {0} rounds")]
    Unconverged(usize),
}

impl Error {
    /// Short human readable message that is safe to show to end users.
    pub fn advisory(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Please provide a valid YouTube video URL!",
            Error::EmptyDocumentSet | Error::TranscriptUnavailable(_) => {
                "Could not retrieve a transcript for this video."
            }
            Error::SummarizationEngine(_) => {
                "Something went wrong while summarizing the video. Please try again later."
            }
            Error::UnsupportedEncoding(_) | Error::MissingCredential(_) => {
                "The summarizer is not configured correctly. Please contact the operator."
            }
        }
    }

    /// Whether a loader or engine call ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::TranscriptUnavailable(LoadError::Timeout(_))
                | Error::SummarizationEngine(EngineError::Timeout(_))
        )
    }

    /// Whether the failure comes from process configuration rather than the request.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedEncoding(_) | Error::MissingCredential(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisories_hide_details() {
        let err = Error::SummarizationEngine(EngineError::Upstream(
            "API error: 429 - rate_limit_error".into(),
        ));
        assert!(!err.advisory().contains("429"));

        let err = Error::TranscriptUnavailable(LoadError::Source("connection reset by peer".into()));
        assert_eq!(err.advisory(), Error::EmptyDocumentSet.advisory());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(Error::MissingCredential("ANTHROPIC_API_KEY").is_configuration());
        assert!(Error::UnsupportedEncoding("gpt2".into()).is_configuration());
        assert!(!Error::EmptyDocumentSet.is_configuration());
    }

    #[test]
    fn test_engine_error_converts() {
        let err: Error = EngineError::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(
            err,
            Error::SummarizationEngine(EngineError::Timeout(_))
        ));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_load_timeout_keeps_its_kind() {
        let err: Error = LoadError::Timeout(Duration::from_secs(60)).into();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Failed to load transcript: timed out after 60s");
        assert_eq!(err.advisory(), Error::EmptyDocumentSet.advisory());

        let err: Error = LoadError::Source("captions disabled".into()).into();
        assert!(!err.is_timeout());
    }
}
