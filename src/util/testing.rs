//! Test support: one-time logging setup and sample outlines.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Node, Tree};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_test_writer()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// A small two-level outline used across tests:
///
/// ```text
/// Groceries [0]
/// ├── Fruit [0.children.0]
/// │   ├── Apples [0.children.0.children.0]
/// │   └── Pears [0.children.0.children.1]
/// └── Bread [0.children.1]
/// Chores [1] (collapsed)
/// └── Laundry [1.children.0]
/// Notes [2]
/// ```
pub fn sample_outline() -> Tree {
    Tree::new([
        Node::new("Groceries").with_children([
            Node::new("Fruit").with_children([Node::new("Apples"), Node::new("Pears")]),
            Node::new("Bread"),
        ]),
        Node::new("Chores")
            .with_children([Node::new("Laundry")])
            .with_collapsed(true),
        Node::new("Notes"),
    ])
}
