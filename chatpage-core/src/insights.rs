use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{Insights, Turn};

const MAX_TRANSCRIPT_CHARS: usize = 12_000;
const MAX_TITLE_WORDS: usize = 5;
const TRUNCATION_MARKER: &str = "[Transcript truncated for length]";

const PROMPT_HEADER: &[&str] = &[
    "Summarize this conversation transcript.",
    "Return exactly two lines and no markdown:",
    "Title: <descriptive title with 5 words or fewer>",
    "Summary: <2-4 complete sentences focused on key topic and outcome>",
    "If the transcript is incomplete, summarize only what is present.",
    "",
    "Transcript:",
];

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^Title:\s*(.+)$").expect("valid regex"));
static SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^Summary:\s*([\s\S]+)$").expect("valid regex"));
static EDGE_QUOTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^['"“”‘’]+|['"“”‘’]+$"#).expect("valid regex"));

pub fn build_insights_prompt(turns: &[Turn]) -> String {
    let mut prompt = PROMPT_HEADER.join("\n");
    prompt.push('\n');
    prompt.push_str(&transcript_for_model(turns));
    prompt
}

fn transcript_for_model(turns: &[Turn]) -> String {
    let combined = turns
        .iter()
        .map(|turn| format!("{}:\n{}", turn.role.to_string().to_uppercase(), turn.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    match combined.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        Some((cut, _)) => format!("{}\n\n{TRUNCATION_MARKER}", &combined[..cut]),
        None => combined,
    }
}

pub fn parse_insights(raw: &str) -> Option<Insights> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (Some(title), Some(summary)) = (TITLE_RE.captures(raw), SUMMARY_RE.captures(raw)) else {
        debug!("insights response lacks Title/Summary lines");
        return None;
    };

    let title = clean_title(&title[1])?;
    let summary = summary[1].trim();
    if summary.is_empty() {
        return None;
    }

    Some(Insights {
        title,
        summary: summary.to_string(),
    })
}

pub fn clean_title(raw: &str) -> Option<String> {
    let unquoted = EDGE_QUOTES_RE.replace_all(raw.trim(), "");
    let title = unquoted
        .split_whitespace()
        .take(MAX_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}
