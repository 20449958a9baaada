//! Report assembly.
//!
//! Handlers accumulate ordered sections while walking their decision tree;
//! the sections render to markdown only at the protocol boundary. Sections
//! are append-only and never reordered, so the report reads in execution
//! order.

use serde::Serialize;

use aicd_types::HaltReason;
use aicd_util::markdown;

/// One rendered block of the final response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Section {
    Heading { level: u8, text: String },
    Quote { text: String },
    Paragraph { text: String },
    Bullets { items: Vec<String> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    Code { language: Option<String>, body: String },
    Rule,
}

/// Append-only ordered section list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report opened with a level-1 title.
    pub fn titled(title: &str) -> Self {
        let mut report = Self::new();
        report.heading(1, title);
        report
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) {
        self.sections.push(Section::Heading { level, text: text.into() });
    }

    pub fn quote(&mut self, text: impl Into<String>) {
        self.sections.push(Section::Quote { text: text.into() });
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.sections.push(Section::Paragraph { text: text.into() });
    }

    pub fn bullets<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(Section::Bullets {
            items: items.into_iter().map(Into::into).collect(),
        });
    }

    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) {
        self.sections.push(Section::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        });
    }

    pub fn code(&mut self, language: Option<&str>, body: impl Into<String>) {
        self.sections.push(Section::Code {
            language: language.map(str::to_string),
            body: body.into(),
        });
    }

    pub fn rule(&mut self) {
        self.sections.push(Section::Rule);
    }

    /// Fold a pre-rendered markdown fragment in as a paragraph. Used for
    /// external output that is already formatted.
    pub fn raw(&mut self, fragment: impl Into<String>) {
        self.text(fragment);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Append every section of another report, preserving order.
    pub fn extend(&mut self, other: Report) {
        self.sections.extend(other.sections);
    }

    /// Render to markdown. The only place sections become text.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| match section {
                Section::Heading { level, text } => format!("{} {}", "#".repeat(usize::from(*level)), text),
                Section::Quote { text } => format!("> {text}"),
                Section::Paragraph { text } => text.clone(),
                Section::Bullets { items } => items.iter().map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n"),
                Section::Table { headers, rows } => {
                    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
                    markdown::format_table(&header_refs, rows)
                }
                Section::Code { language, body } => markdown::code_block(language.as_deref(), body),
                Section::Rule => "---".to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The unit every tool handler returns: the assembled report plus the
/// machine-readable halt signal, when the decision tree stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerReport {
    pub report: Report,
    pub halted: Option<HaltReason>,
}

impl HandlerReport {
    /// A run that reached the end of its decision tree.
    pub fn completed(report: Report) -> Self {
        Self { report, halted: None }
    }

    /// A planned early stop.
    pub fn halted(report: Report, reason: HaltReason) -> Self {
        Self {
            report,
            halted: Some(reason),
        }
    }
}
