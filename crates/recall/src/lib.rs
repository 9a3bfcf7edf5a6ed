//! # Recall
//!
//! **A local-first semantic retrieval engine for document question
//! answering.**
//!
//! Recall indexes uploaded documents (PDF or plain text) into a SQLite-backed
//! vector store and answers questions by retrieving the most relevant
//! passages and assembling them as LLM-ready context.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────────┐   ┌──────────────┐
//! │  Extract  │──▶│   Pipeline     │──▶│    SQLite     │
//! │ PDF / txt │   │ Chunk + Embed │   │ chunk vectors │
//! └───────────┘   └───────────────┘   └──────┬───────┘
//!                                            │
//!                                       ┌──────▼───────┐
//!                                       │  CLI (rcl)   │
//!                                       │search/context│
//!                                       └──────────────┘
//! ```
//!
//! The retrieval algorithms (chunking, search, rerank, context assembly,
//! lifecycle) live in `recall-core` and operate through its `VectorStore`
//! and `Embedder` traits. This crate supplies the concrete collaborators
//! and the `rcl` CLI:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migration (idempotent) |
//! | [`sqlite_store`] | `VectorStore` implementation over SQLite |
//! | [`embedding`] | OpenAI-compatible HTTP embedding provider |
//! | [`extract`] | PDF / plain-text extraction and document ids |
//! | [`ingest`] | `rcl add`: extract → replace → index |
//! | [`search_cmd`] | `rcl search` / `rcl context` rendering |
//! | [`stats`] | `rcl stats` rendering |

pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod migrate;
pub mod search_cmd;
pub mod sqlite_store;
pub mod stats;

pub use sqlite_store::SqliteStore;
