//! Table of contents accumulated while the page is laid out.
//!
//! Each recorded heading yields the block to place in the page and an entry
//! `(level, label, anchor)`; the list is rendered once, after every section
//! has been added.

use crate::page::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }

    fn indent(&self) -> usize {
        match self {
            HeadingLevel::H1 => 0,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: HeadingLevel,
    pub label: String,
    pub anchor: String,
}

#[derive(Debug, Clone, Default)]
pub struct Toc {
    entries: Vec<TocEntry>,
}

/// Lowercased label with every run of non-alphanumeric ASCII replaced by `-`.
pub fn anchor_id(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

impl Toc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, text: &str) -> Block {
        self.record(HeadingLevel::H1, text)
    }

    pub fn header(&mut self, text: &str) -> Block {
        self.record(HeadingLevel::H2, text)
    }

    pub fn subheader(&mut self, text: &str) -> Block {
        self.record(HeadingLevel::H3, text)
    }

    fn record(&mut self, level: HeadingLevel, text: &str) -> Block {
        let anchor = anchor_id(text);
        self.entries.push(TocEntry { level, label: text.to_string(), anchor: anchor.clone() });
        Block::Heading { level, text: text.to_string(), anchor }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Markdown list of links, indented by heading level.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{}* <a href='#{}'>{}</a>",
                    " ".repeat(e.level.indent()),
                    e.anchor,
                    crate::page::escape_html(&e.label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
