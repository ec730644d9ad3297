use std::sync::{Arc, Mutex};
use tube_digest::tokenizer::TokenCounter;

/// Reports the same count for every text and records what it measured.
#[derive(Clone)]
pub struct FixedTokenCounter {
    pub count: usize,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FixedTokenCounter {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl TokenCounter for FixedTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        self.calls.lock().unwrap().push(text.to_string());
        self.count
    }
}

/// One token per whitespace separated word.
#[derive(Clone, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
