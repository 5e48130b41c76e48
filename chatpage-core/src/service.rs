use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ChatpageError, Result};
use crate::insights::parse_insights;
use crate::model::{Insights, RenderOptions, Turn};
use crate::render::render_document;
use crate::segment::segment;

const EXPORT_FILE_PREFIX: &str = "copilot-chat-export-";
const STDIN_NAME: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    Stdin,
    File(PathBuf),
}

impl TranscriptSource {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(STDIN_NAME) => Self::Stdin,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

pub fn read_transcript(source: &TranscriptSource) -> Result<String> {
    match source {
        TranscriptSource::File(path) => read_utf8_file(path),
        TranscriptSource::Stdin => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|source| ChatpageError::Stdin { source })?;
            String::from_utf8(bytes).map_err(|_| ChatpageError::NonUtf8Input {
                path: PathBuf::from(STDIN_NAME),
            })
        }
    }
}

fn read_utf8_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| ChatpageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|_| ChatpageError::NonUtf8Input {
        path: path.to_path_buf(),
    })
}

pub fn segment_transcript(raw: &str) -> Result<Vec<Turn>> {
    if raw.trim().is_empty() {
        return Err(ChatpageError::EmptyTranscript);
    }

    let turns = segment(raw);
    debug!(turns = turns.len(), "segmented transcript");
    Ok(turns)
}

pub fn export_document(raw: &str, options: &RenderOptions) -> Result<String> {
    let turns = segment_transcript(raw)?;
    Ok(render_document(&turns, options))
}

pub fn turns_to_raw_json(turns: &[Turn]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(turns)
        .map_err(|err| ChatpageError::Serialization(err.to_string()))?;
    json.push('\n');
    Ok(json)
}

pub fn read_insights(path: &Path) -> Result<Option<Insights>> {
    let raw = read_utf8_file(path)?;
    let insights = parse_insights(&raw);
    if insights.is_none() {
        warn!(path = %path.display(), "ignoring insights response without Title/Summary lines");
    }
    Ok(insights)
}

pub fn write_document(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ChatpageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, html).map_err(|source| ChatpageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = html.len(), "wrote document");
    Ok(())
}

pub fn default_file_name(stamp: &str) -> String {
    let stamp: String = stamp
        .chars()
        .map(|ch| if ch == ':' || ch == '.' { '-' } else { ch })
        .collect();
    format!("{EXPORT_FILE_PREFIX}{stamp}.html")
}
