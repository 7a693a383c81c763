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


//! Database storage and models
//!
//! This module handles all database operations using SQLite through sqlx.
//!
//! # Database Schema
//! - Books: one row per tracked book, progress and timestamps inline
//! - _migrations: applied schema steps
//!
//! # Usage Example
//! ```no_run
//! use reading_tracker::storage::{Database, queries};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./reading_tracker.db").await?;
//!
//! let book = queries::find_book_by_id(db.pool(), "2f1c7d0e-0000-4000-8000-000000000000").await?;
//! println!("{:?}", book);
//!
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use models::{Book, BookPatch, BookResponse, NewBook, ProgressRow, ReadingStatus};
pub use queries::BookFilter;
