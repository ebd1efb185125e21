//! Statistics layer: everything a page derives from a filtered table.
//!
//! All functions are pure; they borrow a [`Table`](crate::data::model::Table)
//! and return owned results. Shortfalls (too few rows, too few columns) come
//! back as [`DashError`](crate::error::DashError) values or as notices on a
//! [`Partial`](crate::error::Partial), never as panics.

pub mod aggregate;
pub mod correlation;
pub mod describe;
pub mod distribution;
