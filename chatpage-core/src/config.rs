use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use dirs::home_dir;

use crate::error::{ChatpageError, Result};

pub const OUTPUT_DIR_ENV: &str = "CHATPAGE_OUTPUT_DIR";
pub const TITLE_PREFIX_ENV: &str = "CHATPAGE_TITLE_PREFIX";
pub const DEFAULT_TITLE_PREFIX: &str = "Copilot Chat Export";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub title_prefix: String,
}

impl ExportSettings {
    pub fn from_env_or_cwd() -> Result<Self> {
        // Precedence:
        // 1) CHATPAGE_OUTPUT_DIR
        // 2) current working directory
        // 3) home directory
        let output_dir = match non_empty_var(OUTPUT_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()
                .ok()
                .or_else(home_dir)
                .ok_or(ChatpageError::HomeDirectoryNotFound)?,
        };

        let title_prefix = non_empty_var(TITLE_PREFIX_ENV)
            .and_then(|prefix| prefix.into_string().ok())
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE_PREFIX.to_string());

        Ok(Self {
            output_dir,
            title_prefix,
        })
    }

    pub fn default_title(&self, generated_at: &str) -> String {
        format!("{} — {generated_at}", self.title_prefix)
    }
}

fn non_empty_var(key: &str) -> Option<OsString> {
    env::var_os(key).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::{DEFAULT_TITLE_PREFIX, ExportSettings};

    #[test]
    fn default_title_joins_prefix_and_stamp() {
        let settings = ExportSettings {
            output_dir: PathBuf::from("/tmp"),
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
        };

        assert_eq!(
            settings.default_title("2026-02-23 13:00:00"),
            "Copilot Chat Export — 2026-02-23 13:00:00"
        );
    }
}
