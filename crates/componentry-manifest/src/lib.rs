//! # componentry-manifest
//!
//! Host-side loader for component manifests.
//!
//! Handles:
//! - **Manifest**: serde model of modules and data-only component entries.
//! - **Graph**: module dependency graph and load order.
//! - **Loader**: reading a manifest into a declaration set for `rebuild`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod graph;
pub mod loader;
pub mod manifest;

pub use loader::{load_manifest, parse_manifest};
