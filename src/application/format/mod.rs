//! Document codecs: converting outline trees to and from text.
//!
//! A direct structural encoding (JSON) and two outline-markup encodings:
//! OPML, which keeps every node attribute, and Markdown bullet lists, which
//! keep titles and shape only.

mod json;
mod markdown;
mod opml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::ApplicationResult;
use crate::domain::Tree;

pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use opml::OpmlFormat;

/// Import/export interface implemented by every document codec.
pub trait OutlineFormat {
    fn kind(&self) -> FormatKind;

    /// Parse document text into a tree.
    fn import_content(&self, content: &str) -> ApplicationResult<Tree>;

    /// Render a tree as document text.
    fn export_outline(&self, tree: &Tree) -> ApplicationResult<String>;
}

/// Available document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    Json,
    Markdown,
    Opml,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Opml => "opml",
        }
    }

    /// File extensions recognized for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Markdown => &["md", "markdown"],
            Self::Opml => &["opml"],
        }
    }

    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        [Self::Json, Self::Markdown, Self::Opml]
            .into_iter()
            .find(|kind| kind.extensions().contains(&extension.as_str()))
    }

    /// Codec for this format, configured by `options`.
    pub fn codec(&self, options: &ExportOptions) -> Box<dyn OutlineFormat> {
        match self {
            Self::Json => Box::new(JsonFormat::new(options.json_pretty)),
            Self::Markdown => Box::new(MarkdownFormat::new(options.markdown_indent)),
            Self::Opml => Box::new(OpmlFormat::new()),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "opml" => Ok(Self::Opml),
            other => Err(format!(
                "unknown format '{other}' (expected json, markdown or opml)"
            )),
        }
    }
}

/// Rendering options shared by the codecs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Pretty-print JSON output
    pub json_pretty: bool,
    /// Spaces per nesting level in Markdown output (clamped to 2..=4)
    pub markdown_indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            json_pretty: true,
            markdown_indent: 2,
        }
    }
}
