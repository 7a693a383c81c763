//! Reading statistics
//!
//! A pure fold over the progress columns of every book. Recomputed on every
//! request; the collection is expected to be small.

use crate::storage::models::{round2, ProgressRow, ReadingStatus};
use serde::{Deserialize, Serialize};

/// Snapshot of the whole library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookStats {
    pub total_books: i64,
    pub books_in_progress: i64,
    pub books_completed: i64,
    pub books_not_started: i64,
    pub total_pages_read: i64,
    /// Mean per-book progress percentage, rounded to 2 decimals
    pub average_progress: f64,
}

impl BookStats {
    /// Fold rows into a snapshot
    ///
    /// Rows whose status is not a known literal still count towards
    /// `total_books`, the page sum and the average, but land in no bucket.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a ProgressRow>,
    {
        let mut stats = BookStats::default();
        let mut progress_sum = 0.0_f64;

        for row in rows {
            stats.total_books += 1;
            stats.total_pages_read += row.current_page;
            if row.total_pages > 0 {
                progress_sum += row.current_page as f64 * 100.0 / row.total_pages as f64;
            }

            match row.status.parse::<ReadingStatus>() {
                Ok(ReadingStatus::NotStarted) => stats.books_not_started += 1,
                Ok(ReadingStatus::InProgress) => stats.books_in_progress += 1,
                Ok(ReadingStatus::Completed) => stats.books_completed += 1,
                Err(e) => log::warn!("excluding row from status buckets: {}", e),
            }
        }

        if stats.total_books > 0 {
            stats.average_progress = round2(progress_sum / stats.total_books as f64);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, current_page: i64, total_pages: i64) -> ProgressRow {
        ProgressRow {
            status: status.to_string(),
            current_page,
            total_pages,
        }
    }

    #[test]
    fn test_empty_collection() {
        let stats = BookStats::from_rows(&Vec::<ProgressRow>::new());
        assert_eq!(stats, BookStats::default());
        assert_eq!(stats.average_progress, 0.0);
    }

    #[test]
    fn test_average_of_two_books() {
        let rows = [row("in_progress", 100, 200), row("completed", 200, 200)];
        let stats = BookStats::from_rows(&rows);

        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.books_in_progress, 1);
        assert_eq!(stats.books_completed, 1);
        assert_eq!(stats.books_not_started, 0);
        assert_eq!(stats.total_pages_read, 300);
        assert_eq!(stats.average_progress, 75.0);
    }

    #[test]
    fn test_average_is_rounded() {
        let rows = [row("in_progress", 1, 3), row("not_started", 0, 10), row("in_progress", 1, 3)];
        let stats = BookStats::from_rows(&rows);
        // (33.333.. + 0 + 33.333..) / 3
        assert_eq!(stats.average_progress, 22.22);
    }

    #[test]
    fn test_zero_page_book_contributes_zero() {
        let rows = [row("completed", 0, 0), row("completed", 50, 50)];
        let stats = BookStats::from_rows(&rows);
        assert_eq!(stats.average_progress, 50.0);
    }

    #[test]
    fn test_unknown_status_only_counts_in_total() {
        let rows = [row("not_started", 0, 100), row("abandoned", 40, 100)];
        let stats = BookStats::from_rows(&rows);

        assert_eq!(stats.total_books, 2);
        assert_eq!(
            stats.books_not_started + stats.books_in_progress + stats.books_completed,
            1
        );
        assert_eq!(stats.total_pages_read, 40);
        assert_eq!(stats.average_progress, 20.0);
    }
}
