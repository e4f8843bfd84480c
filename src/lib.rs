//! Record Schemas
//!
//! Describes the structure of binary-serialized records so that downstream
//! sinks (warehouse loaders and the like) can map every field to a storage
//! type without per-dataset code.
//!
//! ## Features
//!
//! - **Schema model**: named field lists keyed by a stable 1-based position,
//!   always handed out in position order
//! - **Canonical JSON codec**: exact round-tripping of field types and SQL
//!   mapping hints, plus opaque sink metadata
//! - **Registry plumbing**: a byte-level client contract with in-memory and
//!   directory-backed implementations
//!
//! ## Flow
//!
//! ```text
//! RegistryClient::fetch ──► codec::decode ──► Schema ──► codec::encode ──► RegistryClient::publish
//! ```

pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod field;
pub mod registry;
pub mod schema;

pub use checksum::Checksum;
pub use codec::{decode, encode};
pub use config::{OutputFormat, SchemaConfig};
pub use error::{Result, SchemaError};
pub use field::{SchemaField, SqlHint};
pub use registry::{DirectoryRegistry, MemoryRegistry, RegistryClient, SchemaStore, SearchResult};
pub use schema::Schema;
