use std::path::PathBuf;
use std::process::ExitCode;

use chatpage_core::{
    ExportSettings, RenderOptions, TranscriptSource, build_insights_prompt, default_file_name,
    read_insights, read_transcript, render_document, segment_transcript, turns_to_raw_json,
    write_document,
};
use chrono::{Local, SecondsFormat, Utc};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "chatpage",
    version,
    about = "Turn a copied chat transcript into a styled HTML page"
)]
struct Cli {
    /// Transcript file to read; omit or pass `-` to read stdin
    input: Option<String>,

    /// Write the page to this path instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    output: Option<PathBuf>,

    /// Save under CHATPAGE_OUTPUT_DIR (or the current directory) with a timestamped name
    #[arg(long)]
    save: bool,

    /// Page title; defaults to the insights title, then "<prefix> — <generated at>"
    #[arg(long)]
    title: Option<String>,

    /// Summary text shown above the conversation
    #[arg(long)]
    summary: Option<String>,

    /// Saved generator response with `Title:` and `Summary:` lines
    #[arg(long, value_name = "FILE")]
    insights: Option<PathBuf>,

    /// Print the title/summary prompt for this transcript instead of a page
    #[arg(long, conflicts_with_all = ["turns", "output", "save"])]
    prompt: bool,

    /// Print the segmented turns as JSON instead of a page
    #[arg(long, conflicts_with_all = ["output", "save"])]
    turns: bool,

    /// Log debug details to stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "chatpage=debug,chatpage_core=debug"
        } else {
            "warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> chatpage_core::Result<()> {
    let source = TranscriptSource::from_arg(cli.input.as_deref());
    debug!(?source, "reading transcript");
    let raw = read_transcript(&source)?;
    let turns = segment_transcript(&raw)?;

    if cli.turns {
        let raw_json = turns_to_raw_json(&turns)?;
        print!("{raw_json}");
        return Ok(());
    }

    if cli.prompt {
        println!("{}", build_insights_prompt(&turns));
        return Ok(());
    }

    let settings = ExportSettings::from_env_or_cwd()?;
    let insights = match cli.insights.as_deref() {
        Some(path) => read_insights(path)?,
        None => None,
    };

    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let title = cli
        .title
        .or_else(|| insights.as_ref().map(|insights| insights.title.clone()))
        .unwrap_or_else(|| settings.default_title(&generated_at));
    let summary = cli
        .summary
        .or_else(|| insights.map(|insights| insights.summary));

    let options = RenderOptions {
        title,
        generated_at,
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        summary,
    };
    let html = render_document(&turns, &options);

    if cli.save {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let path = settings.output_dir.join(default_file_name(&stamp));
        write_document(&path, &html)?;
        println!("{}", path.display());
    } else if let Some(path) = cli.output {
        write_document(&path, &html)?;
    } else {
        print!("{html}");
    }

    Ok(())
}
