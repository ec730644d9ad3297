pub mod loader;
pub mod summarizer;
pub mod token_counter;
