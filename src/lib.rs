//! ```text
//! Webhook / manual reindex / bootstrap trigger
//!                   │
//!                   ▼
//!   ingest::Processor ──► ingest::Reconciler ──► provider::StorageProvider
//!                   │              │                   (Drive v3 REST)
//!                   │              └─► store::MetadataStore::upsert_metadata
//!                   │
//!                   ▼ (leaf documents)
//!   export text ──► ingest::chunk_text ──► ingest::Annotator ──► embed::Embedder
//!                                                   │
//!                                                   ▼
//!                     store::MetadataStore::replace_chunks (delete + insert)
//! ```
//!
//! # grovesync
//!
//! Incremental mirror of a remote document tree into a queryable metadata
//! and chunk store. Each inbound trigger runs one reconciliation to
//! completion: the tree walker re-derives every node's materialized path
//! and upserts its metadata, and leaf documents are exported as text,
//! chunked on paragraph boundaries, optionally annotated with embedding
//! vectors, and written back as a full chunk-set replacement.
//!
//! The chunk store is the end of the line for this crate: vector search and
//! retrieval ranking live downstream.

pub mod config;
pub mod embed;
pub mod ingest;
pub mod provider;
pub mod server;
pub mod store;
pub mod types;

pub use config::WorkerConfig;
pub use ingest::{Annotator, Processor, Reconciler};
pub use types::SyncError;
