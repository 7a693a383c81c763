//! Reading Tracker
//!
//! Tracks reading progress for a personal library. Books carry a page count,
//! a bookmark and a status that is kept consistent with the bookmark, along
//! with start and completion timestamps.
//!
//! ```no_run
//! use reading_tracker::{BookService, CreateBookRequest, TrackerConfig};
//!
//! # async fn example() -> reading_tracker::Result<()> {
//! let config = TrackerConfig::from_env()?;
//! let service = BookService::open(&config).await?;
//!
//! let book = service.create(CreateBookRequest::new("Dune", "Frank Herbert", 500)).await?;
//! service.update_progress(&book.book.id, 120).await?;
//!
//! service.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod reading;
pub mod storage;

pub use config::TrackerConfig;
pub use error::{ErrorKind, FieldViolation, Result, TrackerError};
pub use reading::{BookService, BookStats, CreateBookRequest, ListBooksQuery, UpdateBookRequest};
pub use storage::{Book, BookResponse, ReadingStatus};
