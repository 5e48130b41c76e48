use crate::events::extract_events;
use crate::markdown::{escape_html, render_inline, render_markdown};
use crate::model::{AssistantEvent, RenderOptions, Role, Turn};

const EMPTY_PLACEHOLDER: &str = "No messages were detected in this transcript.";

const STYLESHEET: &str = r#"
    :root {
      color-scheme: dark;
      --bg: #0d1117;
      --panel: #161b22;
      --text: #e5e7eb;
      --muted: #9ca3af;
      --border: #30363d;
      --accent: #22c55e;
      --link: #93c5fd;
      --user-border: rgba(59, 130, 246, 0.45);
      --user-bg: rgba(29, 78, 216, 0.35);
      --system-bg: rgba(234, 179, 8, 0.12);
      --code-bg: #0b1220;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--text);
      font-family: "Segoe UI", Inter, system-ui, -apple-system, sans-serif;
      line-height: 1.45;
    }

    .wrap { max-width: 1024px; margin: 0 auto; padding: 20px; }

    .top {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
      margin-bottom: 14px;
      padding: 12px 14px;
      background: rgba(22, 27, 34, 0.9);
      border: 1px solid var(--border);
      border-radius: 10px;
      position: sticky;
      top: 10px;
    }

    .top h1 { margin: 0; font-size: 16px; font-weight: 600; }
    .meta { color: var(--muted); font-size: 12px; white-space: nowrap; }

    .summary {
      margin-bottom: 14px;
      padding: 10px 12px;
      border: 1px solid var(--border);
      border-left: 3px solid var(--accent);
      border-radius: 10px;
      background: var(--panel);
    }

    .summary h2 { margin: 0 0 6px; font-size: 13px; color: var(--muted); text-transform: uppercase; }

    .thread { display: flex; flex-direction: column; gap: 12px; }

    .turn { display: flex; flex-direction: column; gap: 6px; width: 100%; }
    .turn.user { align-items: flex-end; }

    .speaker { color: var(--muted); font-size: 11px; letter-spacing: 0.04em; }

    .message {
      width: 100%;
      padding: 10px 12px;
      border: 1px solid var(--border);
      border-radius: 10px;
      background: var(--panel);
    }

    .turn.user .message {
      width: fit-content;
      max-width: min(820px, 84%);
      border-color: var(--user-border);
      border-radius: 12px;
      background: var(--user-bg);
    }

    .turn.system .message { background: var(--system-bg); }

    .events { display: flex; flex-direction: column; gap: 6px; }

    .event {
      border: 1px solid var(--border);
      border-radius: 8px;
      background: rgba(22, 27, 34, 0.85);
      overflow: hidden;
    }

    .event summary {
      list-style: none;
      cursor: pointer;
      padding: 8px 10px;
      color: var(--muted);
      font-size: 12px;
      display: flex;
      gap: 8px;
    }

    .event summary::before { content: "\2713"; color: var(--accent); font-weight: 700; }
    .event summary::-webkit-details-marker { display: none; }

    .event ul { margin: 0; padding: 0 16px 10px 34px; color: var(--muted); font-size: 12px; }
    .event li { margin: 2px 0; word-break: break-word; }

    .message p { margin: 0 0 10px; white-space: pre-wrap; word-break: break-word; }
    .message p:last-child { margin-bottom: 0; }

    .message h1, .message h2, .message h3,
    .message h4, .message h5, .message h6 { margin: 0 0 8px; line-height: 1.25; }
    .message h1 { font-size: 20px; }
    .message h2 { font-size: 18px; }
    .message h3 { font-size: 16px; }
    .message h4, .message h5, .message h6 { font-size: 14px; }

    .message ul, .message ol { margin: 0 0 10px; padding-left: 20px; }
    .message li { margin: 2px 0; }

    .message blockquote {
      margin: 0 0 10px;
      padding: 8px 10px;
      border-left: 3px solid var(--border);
      background: rgba(11, 18, 32, 0.45);
      border-radius: 6px;
    }

    a { color: var(--link); text-decoration: underline; }

    pre {
      margin: 0 0 10px;
      padding: 10px;
      border: 1px solid var(--border);
      background: var(--code-bg);
      border-radius: 8px;
      overflow-x: auto;
    }

    code {
      font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, "Liberation Mono", monospace;
      font-size: 12px;
    }

    .empty { color: var(--muted); text-align: center; }

    @media (max-width: 760px) {
      .wrap { padding: 12px; }
      .top { flex-direction: column; align-items: flex-start; }
      .turn.user .message { max-width: 92%; }
    }
"#;

pub fn render_document(turns: &[Turn], options: &RenderOptions) -> String {
    let title = escape_html(&options.title);

    let mut meta = format!("Generated {}", escape_html(&options.generated_at));
    if let Some(version) = options.version.as_deref().map(str::trim)
        && !version.is_empty()
    {
        meta.push_str(&format!(" &middot; v{}", escape_html(version)));
    }

    let mut output = String::new();
    output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    output.push_str("  <meta charset=\"UTF-8\" />\n");
    output.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
    );
    output.push_str(&format!("  <title>{title}</title>\n"));
    output.push_str(&format!("  <style>{STYLESHEET}  </style>\n"));
    output.push_str("</head>\n<body>\n  <div class=\"wrap\">\n");
    output.push_str("    <header class=\"top\">\n");
    output.push_str(&format!("      <h1>{title}</h1>\n"));
    output.push_str(&format!("      <div class=\"meta\">{meta}</div>\n"));
    output.push_str("    </header>\n");

    if let Some(summary) = options.summary.as_deref().map(str::trim)
        && !summary.is_empty()
    {
        output.push_str(&format!(
            "    <section class=\"summary\"><h2>Summary</h2>{}</section>\n",
            render_markdown(summary)
        ));
    }

    output.push_str("    <main class=\"thread\">\n");
    if turns.is_empty() {
        output.push_str(&format!("      <p class=\"empty\">{EMPTY_PLACEHOLDER}</p>\n"));
    }
    for turn in turns {
        output.push_str(&render_turn(turn));
    }
    output.push_str("    </main>\n  </div>\n</body>\n</html>\n");

    output
}

fn render_turn(turn: &Turn) -> String {
    let body = match turn.role {
        Role::Assistant => render_assistant_body(&turn.content),
        Role::User | Role::System | Role::Unknown => message_section(&turn.content),
    };

    format!(
        "      <article class=\"turn {}\">\n        <div class=\"speaker\">{}</div>\n{body}      </article>\n",
        turn.role,
        escape_html(&turn.label)
    )
}

fn render_assistant_body(content: &str) -> String {
    let body = extract_events(content);

    let mut output = String::new();
    if !body.events.is_empty() {
        let events: String = body.events.iter().map(render_event).collect();
        output.push_str(&format!(
            "        <section class=\"events\">{events}</section>\n"
        ));
    }
    if !body.narrative.is_empty() {
        output.push_str(&message_section(&body.narrative));
    }
    output
}

fn message_section(markdown: &str) -> String {
    format!(
        "        <section class=\"message\">{}</section>\n",
        render_markdown(markdown)
    )
}

fn render_event(event: &AssistantEvent) -> String {
    let details = if event.details.is_empty() {
        String::new()
    } else {
        let items: String = event
            .details
            .iter()
            .map(|detail| format!("<li>{}</li>", render_inline(detail)))
            .collect();
        format!("<ul>{items}</ul>")
    };

    format!(
        "<details class=\"event\"><summary>{}</summary>{details}</details>",
        render_inline(&event.summary)
    )
}
