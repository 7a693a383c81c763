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


//! Reading progress domain
//!
//! - `input`: request shapes and boundary validation
//! - `reconciler`: pure state transitions keeping status, page and timestamps consistent
//! - `stats`: library-wide statistics fold
//! - `service`: the operations front ends call, wiring the above to storage

pub mod input;
pub mod reconciler;
pub mod service;
pub mod stats;

// Re-export commonly used types
pub use input::{CreateBookRequest, ListBooksQuery, UpdateBookRequest};
pub use service::{BookService, ServiceInfo};
pub use stats::BookStats;
