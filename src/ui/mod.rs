//! Terminal output for the CLI.
//!
//! [`TerminalView`] is the [`SearchView`] used by `mystery-scout search`:
//! status lines while searching, then the rendered cards as colored text,
//! JSON, or an HTML fragment.

use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write};

use crate::client::{ControlState, SearchView};
use crate::models::SearchKind;
use crate::render::{escape_html, AuthorCard, EssayCard, ResultsPanel, WORKS_HEADING};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Loading => "◐",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Loading,
    Search,
}

/// Icon for a search kind
pub fn kind_icon(kind: SearchKind) -> &'static str {
    match kind {
        SearchKind::AuthorList => "🕵",
        SearchKind::SubgenreEssay => "📖",
    }
}

/// Format a status line, colored when `color` is set
pub fn status_line(status: Status, msg: &str, color: bool) -> String {
    let icon = status_icon(status);
    if !color {
        return format!("{} {}", icon, msg);
    }
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg.red()),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Info => format!("{} {}", icon.cyan().bold(), msg),
        Status::Loading => format!("{} {}", icon.cyan(), msg),
        Status::Search => format!("{} {}", icon.yellow(), msg),
    }
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    eprintln!("{}", status_line(status, msg, std::io::stderr().is_terminal()));
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "─".repeat(80).dimmed());
}

/// How search results are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored cards for the terminal
    #[default]
    Text,
    /// The raw payload as returned by the server
    Json,
    /// The card grid as an HTML fragment
    Html,
}

/// Text rendering of one author card
///
/// Collapsed cards show only name and dates plus the toggle hint.
pub fn format_author_card(card: &AuthorCard, expanded: bool, color: bool) -> String {
    let author = card.author();
    let position = card.id().trim_start_matches("details-");
    let mut out = if color {
        format!(
            "{:>3}. {} {}\n",
            position,
            author.name.bold().blue(),
            format!("({})", author.dates).yellow()
        )
    } else {
        format!("{:>3}. {} ({})\n", position, author.name, author.dates)
    };

    if expanded {
        out.push_str(&format!("     {}\n", author.description));
        let heading = if color {
            WORKS_HEADING.bold().to_string()
        } else {
            WORKS_HEADING.to_string()
        };
        out.push_str(&format!("     {}\n", heading));
        for work in &author.works {
            out.push_str(&format!("       • {}\n", work));
        }
    } else {
        let hint = format!("[{}]", card.toggle_label());
        if color {
            out.push_str(&format!("     {}\n", hint.dimmed()));
        } else {
            out.push_str(&format!("     {}\n", hint));
        }
    }
    out
}

/// Text rendering of an essay: one block per paragraph
///
/// `<i>` emphasis becomes italics when colored and is dropped otherwise.
pub fn format_essay(card: &EssayCard, color: bool) -> String {
    card.paragraphs()
        .into_iter()
        .map(|paragraph| emphasize(paragraph, color))
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

fn emphasize(paragraph: &str, color: bool) -> String {
    let mut out = String::with_capacity(paragraph.len());
    let mut rest = paragraph;
    while let Some(start) = rest.find("<i>") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let (inner, tail) = match after.find("</i>") {
            Some(end) => (&after[..end], &after[end + 4..]),
            None => (after, ""),
        };
        if color {
            out.push_str(&inner.italic().to_string());
        } else {
            out.push_str(inner);
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}

/// [`SearchView`] writing to a terminal (or any writer)
///
/// Status lines are only written in text format so that JSON and HTML
/// output stay machine-readable.
pub struct TerminalView<W: Write + Send> {
    out: W,
    format: OutputFormat,
    color: bool,
    expand_all: bool,
}

impl TerminalView<std::io::Stdout> {
    /// View on stdout, colored when stdout is a terminal
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format).color(is_terminal())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            color: false,
            expand_all: true,
        }
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Show author details without waiting for a toggle
    pub fn expand_all(mut self, expand_all: bool) -> Self {
        self.expand_all = expand_all;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn status(&mut self, status: Status, msg: &str) {
        if self.format == OutputFormat::Text {
            let _ = writeln!(self.out, "{}", status_line(status, msg, self.color));
        }
    }
}

impl<W: Write + Send> SearchView for TerminalView<W> {
    fn set_selector_enabled(&mut self, enabled: bool) {
        tracing::trace!(enabled, "Subgenre selector");
    }

    fn clear_selection(&mut self) {
        tracing::trace!("Subgenre selection cleared");
    }

    fn set_control(&mut self, kind: SearchKind, state: ControlState) {
        if state == ControlState::Busy {
            let label = format!("{} {}", kind_icon(kind), state.label(kind));
            self.status(Status::Loading, &label);
        }
    }

    fn show_loading(&mut self, heading: &str) {
        if self.format == OutputFormat::Text {
            let title = format!("━━━ {} ━━━", heading);
            let _ = if self.color {
                writeln!(self.out, "\n{}", title.bold().cyan())
            } else {
                writeln!(self.out, "\n{}", title)
            };
        }
    }

    fn show_results(&mut self, panel: &ResultsPanel) {
        let rendered = match self.format {
            OutputFormat::Text => match panel {
                ResultsPanel::Authors(cards) => cards
                    .iter()
                    .map(|card| {
                        format_author_card(card, self.expand_all || card.is_expanded(), self.color)
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                ResultsPanel::Essay(card) => format_essay(card, self.color),
            },
            OutputFormat::Json => match serde_json::to_string_pretty(&panel.to_result()) {
                Ok(json) => json + "\n",
                Err(e) => {
                    tracing::error!("Failed to serialize results: {}", e);
                    return;
                }
            },
            OutputFormat::Html => panel.to_html() + "\n",
        };
        let _ = self.out.write_all(rendered.as_bytes());

        if let ResultsPanel::Authors(cards) = panel {
            let msg = format!("{} escritores encontrados", cards.len());
            self.status(Status::Success, &msg);
        }
    }

    fn show_error(&mut self, message: &str) {
        let _ = match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "{}",
                status_line(Status::Error, message, self.color)
            ),
            OutputFormat::Json => writeln!(self.out, "{}", serde_json::json!({ "error": message })),
            OutputFormat::Html => writeln!(
                self.out,
                "<p class=\"error-message\">{}</p>",
                escape_html(message)
            ),
        };
    }

    fn card_toggled(&mut self, card: &AuthorCard) {
        if self.format == OutputFormat::Text {
            let text = format_author_card(card, card.is_expanded(), self.color);
            let _ = self.out.write_all(text.as_bytes());
        }
    }
}
