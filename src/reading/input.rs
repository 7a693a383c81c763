//! Request shapes and boundary validation
//!
//! Raw requests arrive with loosely typed fields (status as a string, every
//! field optional). `validate` turns them into the typed inputs the reconciler
//! consumes, or into an `InvalidInput` error listing every violated constraint.
//! Nothing here touches storage.

use crate::error::{FieldViolation, Result, TrackerError};
use crate::storage::models::{BookPatch, NewBook, ReadingStatus};
use crate::storage::queries::BookFilter;
use serde::{Deserialize, Deserializer};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_AUTHOR_LEN: usize = 255;
pub const MAX_GENRE_LEN: usize = 100;
pub const MAX_COVER_URL_LEN: usize = 500;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accumulates violations so one response reports all of them
#[derive(Debug, Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: &str, constraint: impl Into<String>) {
        self.0.push(FieldViolation::new(field, constraint));
    }

    fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, "is required");
        }
        value
    }

    fn text(&mut self, field: &str, value: &str, max_len: usize, allow_blank: bool) {
        if !allow_blank && value.is_empty() {
            self.push(field, "must not be empty");
        }
        if value.chars().count() > max_len {
            self.push(field, format!("must be at most {} characters", max_len));
        }
    }

    fn total_pages(&mut self, value: i64) {
        if value <= 0 {
            self.push("total_pages", "must be greater than 0");
        }
    }

    fn current_page(&mut self, value: i64) {
        if value < 0 {
            self.push("current_page", "must be greater than or equal to 0");
        }
    }

    fn rating(&mut self, value: f64) {
        if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
            self.push("rating", format!("must be between {} and {}", MIN_RATING, MAX_RATING));
        }
    }

    fn status(&mut self, field: &str, value: &str) -> Option<ReadingStatus> {
        match value.parse::<ReadingStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                self.push(field, "must be one of not_started, in_progress, completed");
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(TrackerError::invalid_input(self.0))
        }
    }
}

// ============================================================================
// CREATE
// ============================================================================

/// Fields accepted when adding a book
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub total_pages: Option<i64>,
    #[serde(default)]
    pub current_page: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl CreateBookRequest {
    pub fn new<T: Into<String>, A: Into<String>>(title: T, author: A, total_pages: i64) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            total_pages: Some(total_pages),
            ..Default::default()
        }
    }

    pub fn validate(self) -> Result<NewBook> {
        let mut violations = Violations::default();

        let title = violations.required("title", self.title);
        if let Some(title) = &title {
            violations.text("title", title, MAX_TITLE_LEN, false);
        }
        let author = violations.required("author", self.author);
        if let Some(author) = &author {
            violations.text("author", author, MAX_AUTHOR_LEN, false);
        }
        let total_pages = violations.required("total_pages", self.total_pages);
        if let Some(total_pages) = total_pages {
            violations.total_pages(total_pages);
        }

        let current_page = self.current_page.unwrap_or(0);
        violations.current_page(current_page);

        let status = self
            .status
            .as_deref()
            .and_then(|raw| violations.status("status", raw))
            .unwrap_or_default();
        if let Some(cover_url) = &self.cover_url {
            violations.text("cover_url", cover_url, MAX_COVER_URL_LEN, true);
        }
        if let Some(genre) = &self.genre {
            violations.text("genre", genre, MAX_GENRE_LEN, true);
        }
        if let Some(rating) = self.rating {
            violations.rating(rating);
        }

        violations.finish(NewBook {
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            total_pages: total_pages.unwrap_or_default(),
            current_page,
            status,
            cover_url: self.cover_url,
            genre: self.genre,
            notes: self.notes,
            rating: self.rating,
            is_favorite: self.is_favorite.unwrap_or(false),
        })
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// Sparse update; absent fields are left untouched
///
/// Unknown keys are ignored. Nullable metadata (`cover_url`, `genre`, `notes`,
/// `rating`) can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub total_pages: Option<i64>,
    #[serde(default)]
    pub current_page: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rating: Option<Option<f64>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl UpdateBookRequest {
    /// Parse a JSON body, reporting malformed JSON as invalid input
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| TrackerError::invalid_field("body", format!("is not valid JSON: {}", e)))
    }

    pub fn validate(self) -> Result<BookPatch> {
        let mut violations = Violations::default();

        if let Some(title) = &self.title {
            violations.text("title", title, MAX_TITLE_LEN, false);
        }
        if let Some(author) = &self.author {
            violations.text("author", author, MAX_AUTHOR_LEN, false);
        }
        if let Some(total_pages) = self.total_pages {
            violations.total_pages(total_pages);
        }
        if let Some(current_page) = self.current_page {
            violations.current_page(current_page);
        }
        let status = self
            .status
            .as_deref()
            .and_then(|raw| violations.status("status", raw));
        if let Some(Some(cover_url)) = &self.cover_url {
            violations.text("cover_url", cover_url, MAX_COVER_URL_LEN, true);
        }
        if let Some(Some(genre)) = &self.genre {
            violations.text("genre", genre, MAX_GENRE_LEN, true);
        }
        if let Some(Some(rating)) = self.rating {
            violations.rating(rating);
        }

        violations.finish(BookPatch {
            title: self.title,
            author: self.author,
            total_pages: self.total_pages,
            current_page: self.current_page,
            status,
            cover_url: self.cover_url,
            genre: self.genre,
            notes: self.notes,
            rating: self.rating,
            is_favorite: self.is_favorite,
        })
    }
}

// ============================================================================
// PROGRESS / LIST
// ============================================================================

/// Validate a requested page; overshoot is left for the reconciler to cap
pub fn validate_page(current_page: i64) -> Result<i64> {
    let mut violations = Violations::default();
    violations.current_page(current_page);
    violations.finish(current_page)
}

/// Query for listing books
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListBooksQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Validated listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub filter: BookFilter,
    pub offset: i64,
    pub limit: i64,
}

impl ListBooksQuery {
    /// Validate, using `default_limit` when no limit was given
    pub fn validate(self, default_limit: i64) -> Result<ListParams> {
        let mut violations = Violations::default();

        let offset = self.skip.unwrap_or(0);
        if offset < 0 {
            violations.push("skip", "must be greater than or equal to 0");
        }
        let limit = self.limit.unwrap_or(default_limit);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            violations.push("limit", format!("must be between 1 and {}", MAX_PAGE_SIZE));
        }
        let status = self
            .status
            .as_deref()
            .and_then(|raw| violations.status("status", raw));
        let search = self.search.filter(|s| !s.is_empty());

        violations.finish(ListParams {
            filter: BookFilter { status, search },
            offset,
            limit,
        })
    }
}
