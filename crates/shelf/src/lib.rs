//! Shelf - Personalized Book Recommendations
//!
//! Picks a handful of books similar to one the reader liked, using a
//! precomputed similarity model, the reader's genre and length preferences,
//! and the ratings they have given before.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod ratings;
pub mod selector;
pub mod similarity;
