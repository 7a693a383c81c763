//! Database models for Reading Tracker
//!
//! # SQLite Adaptations
//! - Identifiers are UUID v4 strings
//! - `ReadingStatus` stored as its snake_case literal
//! - DateTime stored as TEXT in RFC 3339 format
//! - Booleans stored as INTEGER 0/1

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENUMS
// ============================================================================

/// Reading status of a book, a cached classification of its progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::NotStarted,
        ReadingStatus::InProgress,
        ReadingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::NotStarted => "not_started",
            ReadingStatus::InProgress => "in_progress",
            ReadingStatus::Completed => "completed",
        }
    }

    /// Classify a page position against the book length
    pub fn from_progress(current_page: i64, total_pages: i64) -> Self {
        if current_page <= 0 {
            ReadingStatus::NotStarted
        } else if current_page < total_pages {
            ReadingStatus::InProgress
        } else {
            ReadingStatus::Completed
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status literal is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown status '{}', expected one of not_started, in_progress, completed",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ReadingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// DERIVED PROGRESS
// ============================================================================

/// Progress as a percentage rounded to 2 decimals, 0.0 for an empty book
pub fn progress_percentage(current_page: i64, total_pages: i64) -> f64 {
    if total_pages <= 0 {
        return 0.0;
    }
    round2(current_page as f64 / total_pages as f64 * 100.0)
}

/// Pages left to read, never negative
pub fn pages_remaining(current_page: i64, total_pages: i64) -> i64 {
    (total_pages - current_page).max(0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Book entity - the only record type
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    /// Primary key (UUID v4)
    pub id: String,

    pub title: String,
    pub author: String,

    // Progress
    pub total_pages: i64,
    pub current_page: i64,
    pub status: ReadingStatus,

    // Metadata
    #[sqlx(default)]
    pub cover_url: Option<String>,
    #[sqlx(default)]
    pub genre: Option<String>,
    #[sqlx(default)]
    pub notes: Option<String>,
    #[sqlx(default)]
    pub rating: Option<f64>,
    pub is_favorite: bool,

    // Timestamps
    #[sqlx(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.current_page, self.total_pages)
    }

    pub fn pages_remaining(&self) -> i64 {
        pages_remaining(self.current_page, self.total_pages)
    }
}

/// Book as returned to callers, with derived progress fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookResponse {
    #[serde(flatten)]
    pub book: Book,
    pub progress_percentage: f64,
    pub pages_remaining: i64,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let progress_percentage = book.progress_percentage();
        let pages_remaining = book.pages_remaining();
        Self {
            book,
            progress_percentage,
            pages_remaining,
        }
    }
}

/// Raw progress columns used by the statistics fold
///
/// `status` is read as plain text so values outside the known set can be
/// counted rather than failing the whole query.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProgressRow {
    pub status: String,
    pub current_page: i64,
    pub total_pages: i64,
}

// ============================================================================
// VALIDATED INPUTS
// ============================================================================

/// Validated fields for a new book
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub total_pages: i64,
    pub current_page: i64,
    pub status: ReadingStatus,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub notes: Option<String>,
    pub rating: Option<f64>,
    pub is_favorite: bool,
}

impl NewBook {
    pub fn new<T: Into<String>, A: Into<String>>(title: T, author: A, total_pages: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            total_pages,
            current_page: 0,
            status: ReadingStatus::NotStarted,
            cover_url: None,
            genre: None,
            notes: None,
            rating: None,
            is_favorite: false,
        }
    }
}

/// Validated sparse update
///
/// Outer `None` leaves the field untouched. For nullable metadata the inner
/// `None` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub total_pages: Option<i64>,
    pub current_page: Option<i64>,
    pub status: Option<ReadingStatus>,
    pub cover_url: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub rating: Option<Option<f64>>,
    pub is_favorite: Option<bool>,
}

impl BookPatch {
    /// True when the patch names no field at all
    pub fn is_empty(&self) -> bool {
        *self == BookPatch::default()
    }
}
