pub mod anthropic;
pub mod summarizer;
pub mod tokenizer;

const CONCISE_SUMMARY_PROMPT: &str = include_str!("./prompts/concise_summary.txt");
const COMBINE_SUMMARIES_PROMPT: &str = include_str!("./prompts/combine_summaries.txt");

/// Prompt used for single pass summaries and for each map step.
pub fn concise_summary_prompt(text: &str) -> String {
    CONCISE_SUMMARY_PROMPT.replace("{text}", text)
}

/// Prompt used when folding partial summaries into one.
pub fn combine_summaries_prompt(text: &str) -> String {
    COMBINE_SUMMARIES_PROMPT.replace("{text}", text)
}
