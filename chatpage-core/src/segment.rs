use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Role, Turn};

struct HeaderPattern {
    regex: Regex,
    role: Role,
}

// Order matters: first match wins, and several entries are prefixes of later ones.
static HEADER_PATTERNS: Lazy<Vec<HeaderPattern>> = Lazy::new(|| {
    [
        (r"(?i)^\s*(?:>\s*)?you\s*[:\-]\s*(.*)$", Role::User),
        (r"(?i)^#{1,6}\s*user\s*[:\-]?\s*(.*)$", Role::User),
        (
            r"(?i)^\s*(?:>\s*)?(?:github\s+)?copilot\s*[:\-]\s*(.*)$",
            Role::Assistant,
        ),
        (
            r"(?i)^#{1,6}\s*(?:assistant|copilot)\s*[:\-]?\s*(.*)$",
            Role::Assistant,
        ),
        (r"(?i)^#{1,6}\s*system\s*[:\-]?\s*(.*)$", Role::System),
        (r"(?i)^\s*(?:>\s*)?user\s*[:\-]\s*(.*)$", Role::User),
        (r"(?i)^user\s*[:\-]\s*(.*)$", Role::User),
        (r"(?i)^(?:assistant|copilot)\s*[:\-]\s*(.*)$", Role::Assistant),
        (r"(?i)^system\s*[:\-]\s*(.*)$", Role::System),
    ]
    .into_iter()
    .map(|(pattern, role)| HeaderPattern {
        regex: Regex::new(pattern).expect("valid regex"),
        role,
    })
    .collect()
});

/// Splits a raw transcript into ordered, role-tagged turns.
///
/// Never fails: empty input yields no turns, and non-empty input without any
/// recognizable header yields a single [`Role::Unknown`] turn holding the
/// whole normalized text.
pub fn segment(raw: &str) -> Vec<Turn> {
    let normalized = normalize_line_endings(raw);
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut builder = TurnBuilder::default();
    for line in normalized.split('\n') {
        match match_header(line) {
            Some((role, first_line)) => builder.start(role, first_line),
            None => builder.push(line),
        }
    }

    let turns = builder.finish();
    if turns.is_empty() {
        return vec![Turn::new(Role::Unknown, normalized)];
    }

    turns
}

pub(crate) fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

fn match_header(line: &str) -> Option<(Role, &str)> {
    HEADER_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.regex.captures(line)?;
        let first_line = captures.get(1).map_or("", |m| m.as_str()).trim();
        Some((pattern.role, first_line))
    })
}

struct TurnBuilder<'a> {
    role: Role,
    buffer: Vec<&'a str>,
    turns: Vec<Turn>,
}

impl Default for TurnBuilder<'_> {
    fn default() -> Self {
        Self {
            role: Role::Unknown,
            buffer: Vec::new(),
            turns: Vec::new(),
        }
    }
}

impl<'a> TurnBuilder<'a> {
    fn start(&mut self, role: Role, first_line: &'a str) {
        // Unlabelled text ahead of the first assistant header is the user's opening message.
        if role == Role::Assistant
            && self.role == Role::Unknown
            && self.turns.is_empty()
            && self.buffer.iter().any(|line| !line.trim().is_empty())
        {
            self.role = Role::User;
        }

        self.flush();
        self.role = role;
        if !first_line.is_empty() {
            self.buffer.push(first_line);
        }
    }

    fn push(&mut self, line: &'a str) {
        self.buffer.push(line);
    }

    fn flush(&mut self) {
        let content = self.buffer.join("\n");
        let content = content.trim();
        if !content.is_empty() {
            self.turns.push(Turn::new(self.role, content));
        }
        self.buffer.clear();
    }

    fn finish(mut self) -> Vec<Turn> {
        self.flush();
        self.turns
    }
}
