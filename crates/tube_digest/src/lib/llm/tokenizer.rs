//! # Token estimation
//!
//! Counts tokens the way OpenAI-style BPE tokenizers do, so transcript sizes can be
//! compared against a model's context window.

use std::{fmt, str::FromStr};

use another_tiktoken_rs::CoreBPE;

use crate::error::Error;

/// Anything that can measure text in model tokens.
pub trait TokenCounter {
    fn count_tokens(&self, text: &str) -> usize;
}

impl<T: TokenCounter + ?Sized> TokenCounter for std::sync::Arc<T> {
    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }
}

/// Tokenizer schemes understood by [`TokenEstimator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Cl100kBase,
    P50kBase,
    P50kEdit,
    R50kBase,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::P50kEdit => "p50k_edit",
            Encoding::R50kBase => "r50k_base",
        }
    }

    fn load(&self) -> anyhow::Result<CoreBPE> {
        match self {
            Encoding::Cl100kBase => another_tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => another_tiktoken_rs::p50k_base(),
            Encoding::P50kEdit => another_tiktoken_rs::p50k_edit(),
            Encoding::R50kBase => another_tiktoken_rs::r50k_base(),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cl100k_base" => Ok(Encoding::Cl100kBase),
            "p50k_base" => Ok(Encoding::P50kBase),
            "p50k_edit" => Ok(Encoding::P50kEdit),
            "r50k_base" => Ok(Encoding::R50kBase),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BPE backed token counter. Loading the ranks is the expensive part,
/// so build one per process and share it.
pub struct TokenEstimator {
    encoding: Encoding,
    bpe: CoreBPE,
}

impl fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl TokenEstimator {
    pub fn new(encoding: Encoding) -> Result<Self, Error> {
        let bpe = encoding
            .load()
            .inspect_err(|e| tracing::error!(error = %e, %encoding, "Failed to load tokenizer"))
            .map_err(|e| Error::UnsupportedEncoding(format!("{encoding}: {e}")))?;

        Ok(Self { encoding, bpe })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl TokenCounter for TokenEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        // special token markers inside transcripts are plain text
        self.bpe.encode_ordinary(text).len()
    }
}

/// Counts the tokens of `text` under the scheme named by `encoding`.
///
/// Builds a fresh [`TokenEstimator`] on every call; hot paths should keep one around.
pub fn estimate_tokens(text: &str, encoding: &str) -> Result<usize, Error> {
    let encoding = encoding.parse::<Encoding>()?;
    if text.is_empty() {
        return Ok(0);
    }
    Ok(TokenEstimator::new(encoding)?.count_tokens(text))
}
