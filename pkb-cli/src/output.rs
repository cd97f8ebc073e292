//! Text and JSON rendering of command results

use std::fmt::{Display, Write as _};
use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use clap::ValueEnum;
use pkb_core::{Entry, TagUsage};
use serde::Serialize;

/// Characters of content shown in list and search results
pub const PREVIEW_CHARS: usize = 120;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON (pretty-printed)
    Json,
}

/// Rendering options for one invocation
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub format: OutputFormat,
    /// Emit ANSI styling in text output
    pub color: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    /// Entry listing (list-entries, search)
    pub fn entries(&self, entries: &[Entry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(entries),
            OutputFormat::Text if entries.is_empty() => Ok("No entries found.".to_owned()),
            OutputFormat::Text => Ok(entries
                .iter()
                .map(|entry| self.entry_summary(entry))
                .collect::<Vec<_>>()
                .join("\n\n")),
        }
    }

    /// Full entry (show)
    pub fn entry(&self, entry: &Entry) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(entry);
        }

        let mut out = String::new();
        writeln!(out, "{}", entry.title)?;
        writeln!(out, "{}", self.dim(&metadata(entry)))?;
        if let Some(by) = &entry.created_by {
            writeln!(out, "{}", self.dim(&format!("by {by} · id {}", entry.id)))?;
        }
        writeln!(out)?;
        out.push_str(&entry.content);
        Ok(out)
    }

    /// Confirmation for add-entry
    pub fn created(&self, entry: &Entry) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(entry);
        }

        let mut out = format!("Entry created (id: {})", entry.id);
        if !entry.tags.is_empty() {
            write!(out, "\nTags: {}", entry.tags.join(", "))?;
        }
        Ok(out)
    }

    pub fn tags(&self, tags: &[TagUsage]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(tags),
            OutputFormat::Text if tags.is_empty() => Ok("No tags found.".to_owned()),
            OutputFormat::Text => Ok(tags
                .iter()
                .map(|tag| format!("{} ({})", tag.name, tag.usage_count))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Plain status line; JSON mode wraps it as `{"status": ...}`
    pub fn status(&self, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({ "status": message })),
            OutputFormat::Text => Ok(message.to_owned()),
        }
    }

    fn entry_summary(&self, entry: &Entry) -> String {
        format!(
            "{}\n  {}\n  {}",
            entry.title,
            self.dim(&metadata(entry)),
            preview(&entry.content, PREVIEW_CHARS)
        )
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[2m{text}\x1b[0m")
        } else {
            text.to_owned()
        }
    }
}

/// Print `text` and a newline to stdout.
pub fn emit(text: &str) -> io::Result<()> {
    write_out(&mut io::stdout().lock(), format!("{text}\n").as_bytes())
}

/// Write `bytes` to `out` and flush.
pub fn write_out<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}

/// The reader of stdout went away (`pkb ... | head`); not a failure.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io| io.kind() == io::ErrorKind::BrokenPipe)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `type · timestamp · #tag #tag`
fn metadata(entry: &Entry) -> String {
    let mut line = format!(
        "{} · {}",
        entry.entry_type,
        format_timestamp(&entry.created_at.with_timezone(&Local))
    );
    if !entry.tags.is_empty() {
        let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{t}")).collect();
        line.push_str(" · ");
        line.push_str(&tags.join(" "));
    }
    line
}

pub fn format_timestamp<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Single-line preview of `content`, cut to `max` characters.
///
/// Whitespace runs (newlines included) collapse to one space. The cut lands
/// on a char boundary and is marked with `...`.
pub fn preview(content: &str, max: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(title: &str, content: &str, tags: &[&str]) -> Entry {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        Entry {
            id: Uuid::nil(),
            title: title.into(),
            content: content.into(),
            entry_type: "note".into(),
            created_at: ts,
            updated_at: ts,
            created_by: Some("user".into()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn text() -> Renderer {
        Renderer::new(OutputFormat::Text, false)
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_pipe_is_recognized() {
        let err = write_out(&mut ClosedPipe, b"rust (3)\n").unwrap_err();
        let err = anyhow::Error::from(err).context("printing tags");
        assert!(is_broken_pipe(&err));

        let other = anyhow::Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!is_broken_pipe(&other));
    }

    #[test]
    fn write_out_writes_everything() {
        let mut buf = Vec::new();
        write_out(&mut buf, b"No entries found.\n").unwrap();
        assert_eq!(buf, b"No entries found.\n");
    }

    #[test]
    fn preview_keeps_short_content() {
        assert_eq!(preview("short", 120), "short");
        assert_eq!(preview("line one\n\nline  two", 120), "line one line two");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let content = "é".repeat(130);
        let cut = preview(&content, PREVIEW_CHARS);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert!(cut.ends_with("..."));

        let exact = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact, PREVIEW_CHARS), exact);
    }

    #[test]
    fn timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-09 14:05");
    }

    #[test]
    fn empty_results_have_messages() {
        assert_eq!(text().entries(&[]).unwrap(), "No entries found.");
        assert_eq!(text().tags(&[]).unwrap(), "No tags found.");
    }

    #[test]
    fn entry_block_has_title_metadata_and_preview() {
        let rendered = text().entries(&[entry("Rust notes", "Ownership\nrules", &["rust", "lang"])]).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Rust notes");
        assert!(lines[1].trim_start().starts_with("note · "));
        assert!(lines[1].ends_with("#rust #lang"));
        assert_eq!(lines[2], "  Ownership rules");
    }

    #[test]
    fn entries_are_separated_by_blank_lines() {
        let rendered = text()
            .entries(&[entry("a", "x", &[]), entry("b", "y", &[])])
            .unwrap();
        assert_eq!(rendered.matches("\n\n").count(), 1);
    }

    #[test]
    fn dim_only_with_color() {
        let colored = Renderer::new(OutputFormat::Text, true)
            .entries(&[entry("a", "x", &[])])
            .unwrap();
        assert!(colored.contains("\x1b[2m"));
        assert!(!text().entries(&[entry("a", "x", &[])]).unwrap().contains('\x1b'));
    }

    #[test]
    fn created_lists_tags() {
        let out = text().created(&entry("a", "x", &["a", "b"])).unwrap();
        assert_eq!(
            out,
            "Entry created (id: 00000000-0000-0000-0000-000000000000)\nTags: a, b"
        );
    }

    #[test]
    fn show_prints_full_content() {
        let long = "word ".repeat(60);
        let out = text().entry(&entry("Long", &long, &[])).unwrap();
        assert!(out.ends_with(&long));
        assert!(out.contains("by user"));
    }

    #[test]
    fn tag_lines() {
        let tags = vec![
            TagUsage { name: "rust".into(), usage_count: 3 },
            TagUsage { name: "sql".into(), usage_count: 1 },
        ];
        assert_eq!(text().tags(&tags).unwrap(), "rust (3)\nsql (1)");
    }

    #[test]
    fn json_uses_type_field() {
        let json = Renderer::new(OutputFormat::Json, false)
            .entries(&[entry("a", "x", &["t"])])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["type"], "note");
        assert_eq!(value[0]["tags"][0], "t");
    }
}
