//! Page model: an ordered list of blocks rendered to one Markdown document
//! plus the chart artifacts it links to.

use crate::figure::Figure;
use crate::toc::{anchor_id, HeadingLevel, Toc};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        let cell = |s: &str| s.replace('|', "\\|").replace('\n', " ");
        let mut out = String::new();
        out.push_str(&format!(
            "| {} |\n",
            self.headers.iter().map(|h| cell(h.as_str())).collect::<Vec<_>>().join(" | ")
        ));
        out.push_str(&format!("|{}\n", " --- |".repeat(self.headers.len().max(1))));
        for row in &self.rows {
            out.push_str(&format!(
                "| {} |\n",
                row.iter().map(|c| cell(c.as_str())).collect::<Vec<_>>().join(" | ")
            ));
        }
        out.trim_end().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: HeadingLevel, text: String, anchor: String },
    Markdown(String),
    Text(String),
    Image { path: String, caption: Option<String> },
    Table(Table),
    Chart { figure: Figure, file_stem: String },
    TocPlaceholder,
}

impl Block {
    /// Anchored heading that is not listed in the table of contents.
    pub fn heading(level: HeadingLevel, text: &str) -> Self {
        Block::Heading { level, text: text.to_string(), anchor: anchor_id(text) }
    }

    pub fn markdown(text: &str) -> Self {
        Block::Markdown(text.to_string())
    }

    pub fn image(path: &str, caption: Option<&str>) -> Self {
        Block::Image { path: path.to_string(), caption: caption.map(str::to_string) }
    }

    fn render(&self, toc: &Toc) -> String {
        match self {
            Block::Heading { level, text, anchor } => {
                format!("<{tag} id='{anchor}'>{text}</{tag}>", tag = level.tag(), anchor = anchor, text = escape_html(text))
            }
            Block::Markdown(s) | Block::Text(s) => s.clone(),
            Block::Image { path, caption: Some(caption) } => format!("![{}]({})\n\n*{}*", caption, path, caption),
            Block::Image { path, caption: None } => format!("![]({})", path),
            Block::Table(table) => table.to_markdown(),
            Block::Chart { figure, file_stem } => format!(
                "<iframe src='{stem}.html' title='{title}' width='100%' height='540' frameborder='0'></iframe>\n\n\
                 [Open chart: {title}]({stem}.html) · [figure data]({stem}.json)",
                stem = file_stem,
                title = escape_html(&figure.layout.title.text),
            ),
            Block::TocPlaceholder => toc.render(),
        }
    }
}

/// File written next to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub markdown: String,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    blocks: Vec<Block>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Render every block in order; the placeholder receives the finished TOC.
    pub fn render(&self, toc: &Toc) -> serde_json::Result<Rendered> {
        let markdown = self
            .blocks
            .iter()
            .map(|b| b.render(toc))
            .collect::<Vec<_>>()
            .join("\n\n")
            + "\n";

        let mut artifacts = Vec::new();
        for block in &self.blocks {
            if let Block::Chart { figure, file_stem } = block {
                artifacts.push(Artifact { name: format!("{}.json", file_stem), contents: figure.to_json()? });
                artifacts.push(Artifact { name: format!("{}.html", file_stem), contents: figure.to_html()? });
            }
        }
        Ok(Rendered { markdown, artifacts })
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_markdown_escapes_pipes() {
        let table = Table {
            headers: vec!["Symbol".into(), "Name".into()],
            rows: vec![vec!["BRK.B".into(), "Berkshire | Hathaway".into()]],
        };
        assert_eq!(
            table.to_markdown(),
            "| Symbol | Name |\n| --- | --- |\n| BRK.B | Berkshire \\| Hathaway |"
        );
    }

    #[test]
    fn placeholder_is_filled_after_later_headings() {
        let mut toc = Toc::new();
        let mut page = Page::new();
        page.push(Block::heading(HeadingLevel::H1, "Stock Picker Project"));
        page.push(Block::TocPlaceholder);
        page.push(toc.subheader("Authors"));
        let rendered = page.render(&toc).unwrap();
        assert!(rendered.markdown.starts_with("<h1 id='stock-picker-project'>Stock Picker Project</h1>"));
        assert!(rendered.markdown.contains("* <a href='#authors'>Authors</a>\n\n<h3 id='authors'>Authors</h3>"));
        assert!(rendered.artifacts.is_empty());
    }

    #[test]
    fn chart_block_emits_json_and_html() {
        let mut page = Page::new();
        page.push(Block::Chart { figure: Figure::new("Forecast"), file_stem: "forecast".into() });
        let rendered = page.render(&Toc::new()).unwrap();
        let names: Vec<_> = rendered.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["forecast.json", "forecast.html"]);
        assert!(rendered.markdown.contains("forecast.html"));
    }

    #[test]
    fn image_caption_rendered_below() {
        let toc = Toc::new();
        assert_eq!(
            Block::image("layout.png", Some("Dashboard Layout")).render(&toc),
            "![Dashboard Layout](layout.png)\n\n*Dashboard Layout*"
        );
    }
}
