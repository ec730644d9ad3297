pub mod chain;
pub mod config;
mod dispatcher;
mod document;
pub mod error;
mod llm;
pub mod parser;
pub mod tracing;
pub mod types;
pub mod web;
pub mod yt;

pub use dispatcher::{builder::SummaryDispatcherBuilder, SummaryDispatcher, SummaryResult};
pub use document::TranscriptDocument;
pub use error::{EngineError, Error, LoadError};
pub use llm::{anthropic, tokenizer};
pub use llm::summarizer::{Summarizer, SummaryResponse};
