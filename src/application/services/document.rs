//! Outline document service
//!
//! Loads, renders and saves outline trees through the configured codecs.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::format::FormatKind;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::Tree;
use crate::infrastructure::traits::FileSystem;

/// Service for reading and writing outline documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Pick the format for `path`.
    ///
    /// An explicit override wins, then the file extension, then the
    /// configured default.
    pub fn detect_format(&self, path: &Path, explicit: Option<FormatKind>) -> FormatKind {
        explicit
            .or_else(|| FormatKind::from_path(path))
            .unwrap_or(self.settings.format)
    }

    /// Read and parse the outline stored at `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, format: Option<FormatKind>) -> ApplicationResult<Tree> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("outline not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let kind = self.detect_format(path, format);
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read outline", path)?;
        let tree = self.parse(&content, kind)?;
        debug!(
            "load: {} nodes from {} as {}",
            tree.node_count(),
            path.display(),
            kind
        );
        Ok(tree)
    }

    /// Parse document text in the given format.
    pub fn parse(&self, content: &str, kind: FormatKind) -> ApplicationResult<Tree> {
        kind.codec(&self.settings.export).import_content(content)
    }

    /// Render `tree` as document text.
    pub fn render(&self, tree: &Tree, kind: FormatKind) -> ApplicationResult<String> {
        kind.codec(&self.settings.export).export_outline(tree)
    }

    /// Render `tree` and write it to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(
        &self,
        path: &Path,
        tree: &Tree,
        format: Option<FormatKind>,
    ) -> ApplicationResult<()> {
        let kind = self.detect_format(path, format);
        let mut content = self.render(tree, kind)?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write outline", path)?;
        debug!("save: {} nodes to {} as {}", tree.node_count(), path.display(), kind);
        Ok(())
    }
}
