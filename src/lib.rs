//! # Case Intelligence
//!
//! Staged AI assessment of legal case documents with a local case history.
//!
//! A document's text goes through five remote analysis stages
//! (classification, risk, strength, precedents, timeline). Each stage's
//! payload is decoded from whatever encoding the service produced and folded
//! into one workspace, even when individual stages return nothing usable.
//! Completed analyses are kept in a bounded history next to per-case notes
//! with debounced autosave and a bookmark set.
//!
//! ## Architecture
//!
//! ```text
//! document text → CasePipeline → AnalysisService (HTTP)
//!                      ↓               ↓ raw payload
//!                CaseWorkspace ←── decode
//!                      ↓
//!   HistoryCache / NotesController / BookmarkRegistry → KeyValueStore (SQLite)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use case_intelligence::{CaseSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let session = CaseSession::connect(config).await?;
//!     let snapshot = session.analyze("fir.txt", "FIR filed under theft").await?;
//!     println!("{}", session.summary().await);
//!     Ok(())
//! }
//! ```

/// Remote analysis service client and wire types.
pub mod api;
/// Bookmarked cases.
pub mod bookmarks;
/// Case data model.
pub mod case;
/// Configuration management.
pub mod config;
/// Decoding of stage payloads.
pub mod decode;
/// Error types and result aliases.
pub mod error;
/// Evidence uploaded during a session.
pub mod evidence;
/// Bounded case history.
pub mod history;
/// Per-case notes with autosave.
pub mod notes;
/// Staged analysis pipeline and workspace state.
pub mod pipeline;
/// Session wiring.
pub mod session;
/// Key-value persistence.
pub mod storage;
/// Derived text views.
pub mod views;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::CaseSession;
