//! Direct structural encoding as a JSON array of nodes.

use tracing::instrument;

use crate::application::error_ext::FormatResultExt;
use crate::application::format::{FormatKind, OutlineFormat};
use crate::application::ApplicationResult;
use crate::domain::Tree;

/// `[{"title": "..", "collapsed": true, "children": [..]}]`; `collapsed` is
/// omitted when false and `children` is omitted for leaves.
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutlineFormat for JsonFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    #[instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn import_content(&self, content: &str) -> ApplicationResult<Tree> {
        serde_json::from_str(content).for_format(FormatKind::Json)
    }

    #[instrument(level = "debug", skip_all)]
    fn export_outline(&self, tree: &Tree) -> ApplicationResult<String> {
        if self.pretty {
            serde_json::to_string_pretty(tree).for_format(FormatKind::Json)
        } else {
            serde_json::to_string(tree).for_format(FormatKind::Json)
        }
    }
}
