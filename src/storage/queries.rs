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


//! Database query functions
//!
//! Repository functions for the `Books` table. Every function is generic over
//! the sqlx executor, so the same query runs against the pool for reads or
//! inside a transaction for read-modify-write sequences.
//!
//! # Query Patterns
//! - Async/await for all database operations
//! - Runtime-checked sqlx queries (no build-time database needed)
//! - Listing order is most recently updated first

use crate::error::Result;
use crate::storage::models::*;
use sqlx::{Executor, QueryBuilder, Sqlite};

/// Filter for `list_books`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub status: Option<ReadingStatus>,
    /// Case-insensitive substring matched against title or author
    pub search: Option<String>,
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Find book by ID
pub async fn find_book_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Book>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(book)
}

/// Insert a book, or fully replace the stored row when the id already exists
pub async fn save_book<'e, E>(executor: E, book: Book) -> Result<Book>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO Books (
            id, title, author, total_pages, current_page, status,
            cover_url, genre, notes, rating, is_favorite,
            started_at, completed_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            author = excluded.author,
            total_pages = excluded.total_pages,
            current_page = excluded.current_page,
            status = excluded.status,
            cover_url = excluded.cover_url,
            genre = excluded.genre,
            notes = excluded.notes,
            rating = excluded.rating,
            is_favorite = excluded.is_favorite,
            started_at = excluded.started_at,
            completed_at = excluded.completed_at,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&book.id)
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.total_pages)
    .bind(book.current_page)
    .bind(book.status)
    .bind(&book.cover_url)
    .bind(&book.genre)
    .bind(&book.notes)
    .bind(book.rating)
    .bind(book.is_favorite)
    .bind(book.started_at)
    .bind(book.completed_at)
    .bind(book.created_at)
    .bind(book.updated_at)
    .execute(executor)
    .await?;

    Ok(book)
}

/// Delete a book
///
/// Returns `true` if a row was removed.
pub async fn delete_book<'e, E>(executor: E, id: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM Books WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List books matching `filter` with offset pagination
pub async fn list_books<'e, E>(
    executor: E,
    filter: &BookFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Book>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM Books WHERE 1 = 1");

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(search) = &filter.search {
        // SQLite lower() only folds ASCII, so fold the needle the same way
        let needle = search.to_ascii_lowercase();
        query
            .push(" AND (instr(lower(title), ")
            .push_bind(needle.clone())
            .push(") > 0 OR instr(lower(author), ")
            .push_bind(needle)
            .push(") > 0)");
    }

    query
        .push(" ORDER BY updated_at DESC, rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let books = query.build_query_as::<Book>().fetch_all(executor).await?;

    Ok(books)
}

/// List favorite books, most recently updated first
pub async fn list_favorite_books<'e, E>(executor: E) -> Result<Vec<Book>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let books = sqlx::query_as::<_, Book>(
        "SELECT * FROM Books WHERE is_favorite = 1 ORDER BY updated_at DESC, rowid DESC",
    )
    .fetch_all(executor)
    .await?;

    Ok(books)
}

/// Load the raw progress columns of every book for statistics
pub async fn list_progress_rows<'e, E>(executor: E) -> Result<Vec<ProgressRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ProgressRow>(
        "SELECT status, current_page, total_pages FROM Books",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Count total books
pub async fn count_books<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Books")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Delete every book
///
/// Returns the number of removed rows. Irreversible.
pub async fn clear_books<'e, E>(executor: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM Books").execute(executor).await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_book(id: &str, title: &str, author: &str, minute: u32) -> Book {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap();
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            total_pages: 300,
            current_page: 0,
            status: ReadingStatus::NotStarted,
            cover_url: None,
            genre: None,
            notes: None,
            rating: None,
            is_favorite: false,
            started_at: None,
            completed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_book() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let mut book = sample_book("b1", "Dune", "Frank Herbert", 0);
        book.rating = Some(4.5);
        book.genre = Some("Science Fiction".to_string());
        book.started_at = Some(book.created_at + Duration::days(1));
        save_book(db.pool(), book.clone()).await.expect("Failed to save book");

        let found = find_book_by_id(db.pool(), "b1")
            .await
            .expect("Failed to find book")
            .expect("Book missing");
        assert_eq!(found, book);

        assert!(find_book_by_id(db.pool(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_row() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let book = sample_book("b1", "Dune", "Frank Herbert", 0);
        save_book(db.pool(), book.clone()).await.unwrap();

        let mut changed = book.clone();
        changed.title = "Dune Messiah".to_string();
        changed.notes = Some("sequel".to_string());
        save_book(db.pool(), changed.clone()).await.unwrap();

        assert_eq!(count_books(db.pool()).await.unwrap(), 1);
        let found = find_book_by_id(db.pool(), "b1").await.unwrap().unwrap();
        assert_eq!(found, changed);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        save_book(db.pool(), sample_book("b1", "Dune", "Herbert", 0)).await.unwrap();

        assert!(delete_book(db.pool(), "b1").await.unwrap());
        assert!(!delete_book(db.pool(), "b1").await.unwrap());
        assert_eq!(count_books(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let mut emma = sample_book("b1", "Emma", "Jane Austen", 1);
        emma.status = ReadingStatus::InProgress;
        let persuasion = sample_book("b2", "Persuasion", "Jane Austen", 3);
        let mut dune = sample_book("b3", "Dune", "Frank Herbert", 2);
        dune.status = ReadingStatus::InProgress;
        for book in [emma, persuasion, dune] {
            save_book(db.pool(), book).await.unwrap();
        }

        let all = list_books(db.pool(), &BookFilter::default(), 0, 100).await.unwrap();
        let ids: Vec<_> = all.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["b2", "b3", "b1"]);

        let filter = BookFilter {
            search: Some("AUSTEN".to_string()),
            ..Default::default()
        };
        let austen = list_books(db.pool(), &filter, 0, 100).await.unwrap();
        assert_eq!(austen.len(), 2);

        let filter = BookFilter {
            search: Some("un".to_string()),
            ..Default::default()
        };
        let by_title = list_books(db.pool(), &filter, 0, 100).await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "b3");

        let filter = BookFilter {
            status: Some(ReadingStatus::InProgress),
            search: Some("jane".to_string()),
        };
        let combined = list_books(db.pool(), &filter, 0, 100).await.unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id, "b1");

        let page = list_books(db.pool(), &BookFilter::default(), 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "b3");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        save_book(db.pool(), sample_book("b1", "100% Wolf", "Jayne Lyons", 0)).await.unwrap();
        save_book(db.pool(), sample_book("b2", "Wolf Hall", "Hilary Mantel", 1)).await.unwrap();

        let filter = BookFilter {
            search: Some("0% w".to_string()),
            ..Default::default()
        };
        let found = list_books(db.pool(), &filter, 0, 100).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b1");
    }

    #[tokio::test]
    async fn test_favorites_and_clear() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let mut a = sample_book("b1", "Emma", "Austen", 1);
        a.is_favorite = true;
        let b = sample_book("b2", "Dune", "Herbert", 2);
        let mut c = sample_book("b3", "Ulysses", "Joyce", 3);
        c.is_favorite = true;
        for book in [a, b, c] {
            save_book(db.pool(), book).await.unwrap();
        }

        let favorites = list_favorite_books(db.pool()).await.unwrap();
        let ids: Vec<_> = favorites.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["b3", "b1"]);

        assert_eq!(list_progress_rows(db.pool()).await.unwrap().len(), 3);
        assert_eq!(clear_books(db.pool()).await.unwrap(), 3);
        assert_eq!(count_books(db.pool()).await.unwrap(), 0);
    }
}
