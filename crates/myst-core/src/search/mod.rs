//! Full-text search over secret metadata.
//!
//! - **traits**: the `SearchIndex` contract the manager depends on
//! - **fts**: SQLite FTS5 implementation in its own database file
//! - **query**: safe translation of user text into match expressions

pub mod fts;
pub mod query;
pub mod traits;

pub use fts::FtsIndex;
pub use traits::SearchIndex;
