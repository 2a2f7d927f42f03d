//! formlog: a schema-driven data-entry form backed by a flat JSON record log.
//!
//! The schema declares the fields and when each one is shown, the
//! visibility evaluator and normalizer turn raw answers into a typed record,
//! and the store appends it to a single JSON array on disk.

pub mod config;
pub mod error;
pub mod form;
pub mod interactive;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod store;
pub mod visibility;

pub use error::{ImportError, SchemaError, StoreError};
pub use form::FormState;
pub use normalize::{normalize, normalize_at};
pub use record::{FieldValue, Record};
pub use schema::{FieldDescriptor, FieldKind, Schema, Visibility};
pub use store::Store;
pub use visibility::{is_visible, visible_fields};
