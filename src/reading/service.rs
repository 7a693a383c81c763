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


//! Book service
//!
//! The entry point front ends call. Each operation validates its request,
//! loads the current record, runs the reconciler and persists the result.
//!
//! # Consistency
//! Mutations hold the service write lock and run inside one sqlx transaction,
//! so a read-modify-write either commits whole or leaves the record untouched.
//! Last committer wins between callers.

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::reading::input::{
    validate_page, CreateBookRequest, ListBooksQuery, UpdateBookRequest, MAX_PAGE_SIZE,
};
use crate::reading::reconciler;
use crate::reading::stats::BookStats;
use crate::storage::models::{Book, BookResponse};
use crate::storage::{queries, Database};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Service banner, the equivalent of a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

/// Reading progress operations over one database handle
#[derive(Debug)]
pub struct BookService {
    db: Database,
    write_lock: Mutex<()>,
    default_page_size: i64,
}

impl BookService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
            default_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Open the configured database and wrap it in a service
    pub async fn open(config: &TrackerConfig) -> Result<Self> {
        let db = Database::new(&config.database_path).await?;
        Ok(Self::new(db).with_default_page_size(config.default_page_size))
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Release the database handle
    pub async fn close(self) -> Result<()> {
        self.db.close().await
    }

    pub fn health(&self) -> ServiceInfo {
        ServiceInfo {
            name: "Reading Progress Tracker",
            status: "running",
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Add a book
    pub async fn create(&self, request: CreateBookRequest) -> Result<BookResponse> {
        let input = request.validate()?;

        let _guard = self.write_lock.lock().await;
        let book = reconciler::create_book(Uuid::new_v4().to_string(), input, Utc::now());
        let book = queries::save_book(self.db.pool(), book).await?;

        log::info!("created book {} ({:?}, {})", book.id, book.title, book.status);
        Ok(book.into())
    }

    /// List books, most recently updated first
    pub async fn list(&self, query: ListBooksQuery) -> Result<Vec<BookResponse>> {
        let params = query.validate(self.default_page_size)?;
        let books =
            queries::list_books(self.db.pool(), &params.filter, params.offset, params.limit).await?;

        log::debug!("listed {} books", books.len());
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<BookResponse> {
        queries::find_book_by_id(self.db.pool(), id)
            .await?
            .map(BookResponse::from)
            .ok_or_else(|| TrackerError::not_found(id))
    }

    /// Apply a sparse update
    pub async fn update(&self, id: &str, request: UpdateBookRequest) -> Result<BookResponse> {
        let patch = request.validate()?;
        if patch.is_empty() {
            log::debug!("update of book {} names no field, refreshing updated_at only", id);
        }
        let book = self
            .mutate(id, move |book, now| reconciler::apply_update(book, patch, now))
            .await?;

        log::info!("updated book {} (status {})", book.id, book.status);
        Ok(book.into())
    }

    /// Move the bookmark; pages past the end are capped
    pub async fn update_progress(&self, id: &str, current_page: i64) -> Result<BookResponse> {
        let page = validate_page(current_page)?;
        let book = self
            .mutate(id, move |book, now| reconciler::apply_progress(book, page, now))
            .await?;

        log::info!(
            "book {} at page {}/{} ({})",
            book.id,
            book.current_page,
            book.total_pages,
            book.status
        );
        Ok(book.into())
    }

    pub async fn update_notes(&self, id: &str, notes: String) -> Result<BookResponse> {
        let book = self
            .mutate(id, move |book, now| reconciler::apply_notes(book, notes, now))
            .await?;

        log::info!("updated notes of book {}", book.id);
        Ok(book.into())
    }

    /// Remove a book; unknown ids are reported as NotFound
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !queries::delete_book(self.db.pool(), id).await? {
            return Err(TrackerError::not_found(id));
        }

        log::info!("deleted book {}", id);
        Ok(())
    }

    pub async fn stats(&self) -> Result<BookStats> {
        let rows = queries::list_progress_rows(self.db.pool()).await?;
        Ok(BookStats::from_rows(&rows))
    }

    pub async fn favorites(&self) -> Result<Vec<BookResponse>> {
        let books = queries::list_favorite_books(self.db.pool()).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Delete every book, returning how many were removed
    pub async fn clear(&self) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let removed = queries::clear_books(self.db.pool()).await?;

        log::warn!("cleared library, {} books removed", removed);
        Ok(removed)
    }

    /// Read, transform and write one book as a single unit
    ///
    /// Returning early (missing record, failed write) drops the transaction,
    /// which rolls it back.
    async fn mutate<F>(&self, id: &str, transform: F) -> Result<Book>
    where
        F: FnOnce(Book, DateTime<Utc>) -> Book,
    {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.pool().begin().await?;

        let existing = queries::find_book_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| TrackerError::not_found(id))?;

        let next = transform(existing, Utc::now());
        let saved = queries::save_book(&mut *tx, next).await?;
        tx.commit().await?;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::ReadingStatus;

    async fn service() -> BookService {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        BookService::new(db)
    }

    #[tokio::test]
    async fn test_dune_lifecycle() {
        let service = service().await;

        let created = service
            .create(CreateBookRequest::new("Dune", "Herbert", 500))
            .await
            .unwrap();
        assert_eq!(created.book.status, ReadingStatus::NotStarted);
        assert_eq!(created.book.current_page, 0);
        assert_eq!(created.progress_percentage, 0.0);
        assert_eq!(created.pages_remaining, 500);

        let finished = service.update_progress(&created.book.id, 500).await.unwrap();
        assert_eq!(finished.book.status, ReadingStatus::Completed);
        assert_eq!(finished.book.current_page, 500);
        assert!(finished.book.completed_at.is_some());
        assert!(finished.book.started_at.is_some());
        assert_eq!(finished.progress_percentage, 100.0);

        let reset = service.update_progress(&created.book.id, 0).await.unwrap();
        assert_eq!(reset.book.status, ReadingStatus::NotStarted);
        assert!(reset.book.started_at.is_none());
        assert!(reset.book.completed_at.is_none());

        let stored = service.get(&created.book.id).await.unwrap();
        assert_eq!(stored, reset);
        assert_eq!(stored.book.created_at, created.book.created_at);
    }

    #[tokio::test]
    async fn test_operations_on_missing_id_are_not_found() {
        let service = service().await;
        service
            .create(CreateBookRequest::new("Emma", "Austen", 300))
            .await
            .unwrap();

        let missing = "00000000-0000-4000-8000-000000000000";
        assert!(service.get(missing).await.unwrap_err().is_not_found());
        assert!(service
            .update(missing, UpdateBookRequest::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.update_progress(missing, 3).await.unwrap_err().is_not_found());
        assert!(service
            .update_notes(missing, "n".to_string())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.delete(missing).await.unwrap_err().is_not_found());

        assert_eq!(service.stats().await.unwrap().total_books, 1);
    }

    #[tokio::test]
    async fn test_invalid_requests_do_not_touch_storage() {
        let service = service().await;
        let book = service
            .create(CreateBookRequest::new("Emma", "Austen", 300))
            .await
            .unwrap();

        let err = service
            .create(CreateBookRequest::new("", "Austen", 300))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = service.update_progress(&book.book.id, -1).await.unwrap_err();
        assert!(err.is_invalid_input());

        let request = UpdateBookRequest {
            status: Some("finished".to_string()),
            ..Default::default()
        };
        let err = service.update(&book.book.id, request).await.unwrap_err();
        assert!(err.is_invalid_input());

        let stored = service.get(&book.book.id).await.unwrap();
        assert_eq!(stored, book);
        assert_eq!(service.stats().await.unwrap().total_books, 1);
    }

    #[tokio::test]
    async fn test_update_completed_forces_last_page() {
        let service = service().await;
        let book = service
            .create(CreateBookRequest::new("Emma", "Austen", 300))
            .await
            .unwrap();

        let request = UpdateBookRequest {
            status: Some("completed".to_string()),
            ..Default::default()
        };
        let updated = service.update(&book.book.id, request).await.unwrap();
        assert_eq!(updated.book.current_page, 300);
        assert_eq!(updated.pages_remaining, 0);
        assert!(updated.book.updated_at >= book.book.updated_at);
    }

    #[tokio::test]
    async fn test_update_from_json_body_clears_metadata() {
        let service = service().await;
        let mut request = CreateBookRequest::new("Emma", "Austen", 300);
        request.genre = Some("Classic".to_string());
        request.rating = Some(4.0);
        let book = service.create(request).await.unwrap();

        let request = UpdateBookRequest::from_json(r#"{"genre":null,"is_favorite":true}"#).unwrap();
        let updated = service.update(&book.book.id, request).await.unwrap();
        assert!(updated.book.genre.is_none());
        assert_eq!(updated.book.rating, Some(4.0));
        assert!(updated.book.is_favorite);

        let unchanged = service
            .update(&book.book.id, UpdateBookRequest::from_json("{}").unwrap())
            .await
            .unwrap();
        assert_eq!(
            Book {
                updated_at: updated.book.updated_at,
                ..unchanged.book
            },
            updated.book
        );
    }

    #[tokio::test]
    async fn test_notes_and_delete() {
        let service = service().await;
        let book = service
            .create(CreateBookRequest::new("Emma", "Austen", 300))
            .await
            .unwrap();

        let noted = service
            .update_notes(&book.book.id, "Box Hill picnic".to_string())
            .await
            .unwrap();
        assert_eq!(noted.book.notes.as_deref(), Some("Box Hill picnic"));
        assert_eq!(noted.book.status, book.book.status);

        service.delete(&book.book.id).await.unwrap();
        assert!(service.get(&book.book.id).await.unwrap_err().is_not_found());
        assert!(service.delete(&book.book.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_stats_scenario() {
        let service = service().await;
        assert_eq!(service.stats().await.unwrap(), BookStats::default());

        let mut first = CreateBookRequest::new("First", "A", 200);
        first.current_page = Some(100);
        let mut second = CreateBookRequest::new("Second", "B", 200);
        second.current_page = Some(200);
        let first = service.create(first).await.unwrap();
        let second = service.create(second).await.unwrap();

        // Without an explicit status both start out as not_started
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.total_pages_read, 300);
        assert_eq!(stats.average_progress, 75.0);
        assert_eq!(stats.books_not_started, 2);
        assert_eq!(stats.books_in_progress, 0);
        assert_eq!(stats.books_completed, 0);

        service.update_progress(&first.book.id, 100).await.unwrap();
        service.update_progress(&second.book.id, 200).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.average_progress, 75.0);
        assert_eq!(stats.books_not_started, 0);
        assert_eq!(stats.books_in_progress, 1);
        assert_eq!(stats.books_completed, 1);
    }

    #[tokio::test]
    async fn test_create_without_status_is_not_started() {
        let service = service().await;
        let mut request = CreateBookRequest::new("Emma", "Austen", 300);
        request.current_page = Some(150);

        let created = service.create(request).await.unwrap();
        assert_eq!(created.book.status, ReadingStatus::NotStarted);
        assert_eq!(created.book.current_page, 150);
        assert!(created.book.started_at.is_none());
        assert_eq!(created.progress_percentage, 50.0);
    }

    #[tokio::test]
    async fn test_list_validation_and_page_size() {
        let service = service().await.with_default_page_size(2);
        for title in ["A", "B", "C"] {
            service
                .create(CreateBookRequest::new(title, "Author", 10))
                .await
                .unwrap();
        }

        assert_eq!(service.list(ListBooksQuery::default()).await.unwrap().len(), 2);

        let query = ListBooksQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(service.list(query).await.unwrap_err().is_invalid_input());
    }

    #[tokio::test]
    async fn test_health() {
        let service = service().await;
        let info = service.health();
        assert_eq!(info.status, "running");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
