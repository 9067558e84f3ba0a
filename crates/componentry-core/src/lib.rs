//! # componentry-core
//!
//! Composable components resolved from a work context.
//!
//! Handles:
//! - **Declaration**: authored units of behaviour, grouped per module.
//! - **Compose**: merging declarations into component types by C3
//!   linearization, with in-place extension and derivation.
//! - **Registry**: immutable registries and the process-wide registry,
//!   published atomically on rebuild.
//! - **Context**: work contexts carrying the collection, the entity type,
//!   and extra attributes through chained resolutions.
//! - **Resolve**: lookups by name or by criteria.
//!
//! ```
//! use std::sync::Arc;
//!
//! use componentry_common::config::RegistryConfig;
//! use componentry_core::compose::rebuild;
//! use componentry_core::context::{NamedCollection, WorkContext};
//! use componentry_core::declaration::{Declaration, DeclarationSet};
//! use serde_json::json;
//!
//! let mut set = DeclarationSet::with_base();
//! set.declare(
//!     "greetings",
//!     Declaration::component()
//!         .name("greeter")
//!         .usage("greet")
//!         .method("greet", |_, args| Ok(json!(format!("hello {args}")))),
//! );
//! let registry = rebuild(&set, &RegistryConfig::default()).unwrap();
//!
//! let work = WorkContext::builder(Arc::new(NamedCollection::new("shop")), "res.partner")
//!     .registry(Arc::new(registry))
//!     .build();
//! let greeter = work.resolve_one(Some("greet"), None).unwrap();
//! assert_eq!(greeter.call("greet", json!(1)).unwrap(), json!("hello 1"));
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod component;
pub mod component_type;
pub mod compose;
pub mod context;
pub mod declaration;
mod linearize;
pub mod registry;
pub mod resolve;
