// Reading Tracker - Personal reading progress tracker
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Book state reconciliation
//!
//! Pure functions that take a book (or validated creation input), a requested
//! change and the current time, and return the next consistent book. They never
//! touch storage and never fail; inputs are validated beforehand.
//!
//! # Rules
//! - `current_page` always ends up inside `[0, total_pages]`
//! - `started_at` is only cleared by a progress update back to page 0
//! - `completed_at` is cleared by a progress update below the last page
//! - `updated_at` is refreshed by every mutation

use crate::storage::models::{Book, BookPatch, NewBook, ReadingStatus};
use chrono::{DateTime, Utc};

/// Cap a page number into `[0, total_pages]` without panicking on odd totals
fn clamp_page(page: i64, total_pages: i64) -> i64 {
    page.min(total_pages).max(0)
}

/// Build a new book from validated input
pub fn create_book(id: String, input: NewBook, now: DateTime<Utc>) -> Book {
    let total_pages = input.total_pages;
    let mut current_page = clamp_page(input.current_page, total_pages);
    let status = input.status;

    let mut started_at = None;
    let mut completed_at = None;
    match status {
        ReadingStatus::InProgress => started_at = Some(now),
        ReadingStatus::Completed => {
            // Completed implies fully read
            completed_at = Some(now);
            current_page = total_pages;
        }
        ReadingStatus::NotStarted => {}
    }

    Book {
        id,
        title: input.title,
        author: input.author,
        total_pages,
        current_page,
        status,
        cover_url: input.cover_url,
        genre: input.genre,
        notes: input.notes,
        rating: input.rating,
        is_favorite: input.is_favorite,
        started_at,
        completed_at,
        created_at: now,
        updated_at: now,
    }
}

/// Apply a sparse update
///
/// An explicit status wins over progress derivation. When the patch carries both
/// `status` and `current_page` they are stored as given.
pub fn apply_update(existing: Book, patch: BookPatch, now: DateTime<Utc>) -> Book {
    let BookPatch {
        title,
        author,
        total_pages,
        current_page,
        status,
        cover_url,
        genre,
        notes,
        rating,
        is_favorite,
    } = patch;

    let mut book = existing;
    let effective_total = total_pages.unwrap_or(book.total_pages);

    if let Some(requested) = status {
        if requested != book.status {
            match requested {
                ReadingStatus::InProgress => {
                    book.started_at.get_or_insert(now);
                }
                ReadingStatus::Completed => {
                    book.completed_at = Some(now);
                    if current_page.is_none() {
                        book.current_page = effective_total;
                    }
                }
                ReadingStatus::NotStarted => {}
            }
        }
        book.status = requested;
    } else if let Some(page) = current_page {
        let derived = ReadingStatus::from_progress(page, effective_total);
        match derived {
            ReadingStatus::InProgress => {
                book.started_at.get_or_insert(now);
            }
            ReadingStatus::Completed => {
                book.completed_at.get_or_insert(now);
            }
            ReadingStatus::NotStarted => {}
        }
        book.status = derived;
    }

    if let Some(title) = title {
        book.title = title;
    }
    if let Some(author) = author {
        book.author = author;
    }
    if let Some(total_pages) = total_pages {
        book.total_pages = total_pages;
    }
    if let Some(page) = current_page {
        book.current_page = page;
    }
    if let Some(cover_url) = cover_url {
        book.cover_url = cover_url;
    }
    if let Some(genre) = genre {
        book.genre = genre;
    }
    if let Some(notes) = notes {
        book.notes = notes;
    }
    if let Some(rating) = rating {
        book.rating = rating;
    }
    if let Some(is_favorite) = is_favorite {
        book.is_favorite = is_favorite;
    }

    book.current_page = clamp_page(book.current_page, book.total_pages);
    book.updated_at = now;
    book
}

/// Move the bookmark to `requested_page`
///
/// Overshoot is capped at the last page. Status is recomputed from the page
/// alone, whatever was stored before.
pub fn apply_progress(existing: Book, requested_page: i64, now: DateTime<Utc>) -> Book {
    let mut book = existing;
    let page = clamp_page(requested_page, book.total_pages);

    book.current_page = page;
    book.status = ReadingStatus::from_progress(page, book.total_pages);

    match book.status {
        ReadingStatus::NotStarted => {
            book.started_at = None;
            book.completed_at = None;
        }
        ReadingStatus::InProgress => {
            book.started_at.get_or_insert(now);
            book.completed_at = None;
        }
        ReadingStatus::Completed => {
            book.started_at.get_or_insert(now);
            book.completed_at.get_or_insert(now);
        }
    }

    book.updated_at = now;
    book
}

/// Replace the notes text
pub fn apply_notes(existing: Book, notes: String, now: DateTime<Utc>) -> Book {
    Book {
        notes: Some(notes),
        updated_at: now,
        ..existing
    }
}
