use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::AssistantEvent;

const MIN_RUN_LEN: usize = 3;
const PREFIX_TOKENS: usize = 2;
const FENCE: &str = "```";

static EVENT_DECORATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s>*+•\-]*(?:[✓✔☑✅]\s*)?").expect("valid regex"));
static EVENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            planning
            | preparing
            | drafting
            | subagent\s*:
            | research\b
            | review(?:ed|ing|s)?\b
            | ask(?:ed|ing)\s+\d+\s+questions?\b
            | fetched\s+(?:https?|file)://
            | read(?:ing)?\s+(?:file\b | \[ | \S+\.\w+)
            | search(?:ed|ing)\s+for\b
            | starting:\s*\*?[^*(]+?\*?\s*\(\d+/\d+\)
            | completed:\s*\*?[^*(]+?\*?\s*\(\d+/\d+\)
            | generating\s+patch
        )",
    )
    .expect("valid regex")
});
static PREFIX_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:['’\-]\w+)*").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantBody {
    pub events: Vec<AssistantEvent>,
    pub narrative: String,
}

pub fn normalize_event_line(line: &str) -> &str {
    let trimmed = line.trim();
    EVENT_DECORATION_RE
        .find(trimmed)
        .map_or(trimmed, |m| &trimmed[m.end()..])
        .trim()
}

pub fn is_event_line(line: &str) -> bool {
    EVENT_RE.is_match(normalize_event_line(line))
}

fn leading_tokens(line: &str) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = PREFIX_TOKEN_RE
        .find_iter(line)
        .take(PREFIX_TOKENS)
        .map(|m| m.as_str())
        .collect();
    (tokens.len() == PREFIX_TOKENS).then_some(tokens)
}

pub fn prefix_key(line: &str) -> Option<String> {
    leading_tokens(line).map(|tokens| tokens.join(" ").to_lowercase())
}

/// Separates status lines from narrative and compacts repeated status runs.
///
/// Lines inside fenced code blocks are always narrative.
pub fn extract_events(content: &str) -> AssistantBody {
    let mut narrative = Vec::new();
    let mut event_lines = Vec::new();
    let mut in_fence = false;

    for line in content.split('\n') {
        if line.trim().starts_with(FENCE) {
            in_fence = !in_fence;
            narrative.push(line);
            continue;
        }

        if !in_fence && is_event_line(line) {
            event_lines.push(normalize_event_line(line));
        } else {
            narrative.push(line);
        }
    }

    let events = group_event_runs(&event_lines);
    if !event_lines.is_empty() {
        debug!(
            event_lines = event_lines.len(),
            events = events.len(),
            "compacted assistant events"
        );
    }

    AssistantBody {
        events,
        narrative: narrative.join("\n").trim().to_string(),
    }
}

pub fn group_event_runs(lines: &[&str]) -> Vec<AssistantEvent> {
    let keys: Vec<Option<String>> = lines.iter().map(|&line| prefix_key(line)).collect();
    let mut events = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let run_len = match &keys[index] {
            Some(_) => keys[index..]
                .iter()
                .take_while(|candidate| **candidate == keys[index])
                .count(),
            None => 1,
        };

        if run_len >= MIN_RUN_LEN
            && let Some(tokens) = leading_tokens(lines[index])
        {
            let run = &lines[index..index + run_len];
            events.push(AssistantEvent {
                summary: format!("{}… ({run_len})", tokens.join(" ")),
                details: run.iter().map(ToString::to_string).collect(),
            });
            index += run_len;
            continue;
        }

        events.push(AssistantEvent::single(lines[index]));
        index += 1;
    }

    events
}
