pub mod config;
pub mod error;
pub mod events;
pub mod insights;
pub mod markdown;
pub mod model;
pub mod render;
pub mod segment;
pub mod service;

pub use config::ExportSettings;
pub use error::{ChatpageError, Result};
pub use events::{AssistantBody, extract_events};
pub use insights::{build_insights_prompt, parse_insights};
pub use markdown::{render_inline, render_markdown};
pub use model::{AssistantEvent, Insights, RenderOptions, Role, Turn};
pub use render::render_document;
pub use segment::segment;
pub use service::{
    TranscriptSource, default_file_name, export_document, read_insights, read_transcript,
    segment_transcript, turns_to_raw_json, write_document,
};
