use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatpageError {
    #[error("no transcript text was captured")]
    EmptyTranscript,

    #[error("transcript is not valid UTF-8: {path}")]
    NonUtf8Input { path: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cannot determine an output directory")]
    HomeDirectoryNotFound,

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read transcript from stdin: {source}")]
    Stdin {
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ChatpageError>;
