//! Per-user book ratings in a single SQLite table.
//!
//! Every operation opens its own connection and drops it before returning.
//! The table carries no key constraint; `(user_id, book_title)` uniqueness
//! comes from the check-then-update-or-insert in [`RatingStore::upsert`].

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::StorageError;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS ratings (user_id TEXT, book_title TEXT, rating INTEGER)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
  pub user_id: String,
  pub book_title: String,
  pub rating: u8,
}

/// Check that a raw rating is within 1..=5
pub fn validate_rating(rating: i64) -> Result<u8, StorageError> {
  u8::try_from(rating)
    .ok()
    .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
    .ok_or_else(|| StorageError::invalid_rating(rating))
}

/// Anything that can report a user's rating history
pub trait RatingHistory {
  /// All ratings by `user_id`. Never fails; unreadable history is empty history.
  fn history(&self, user_id: &str) -> Vec<Rating>;
}

impl RatingHistory for [Rating] {
  fn history(&self, user_id: &str) -> Vec<Rating> {
    self.iter().filter(|r| r.user_id == user_id).cloned().collect()
  }
}

impl RatingHistory for Vec<Rating> {
  fn history(&self, user_id: &str) -> Vec<Rating> {
    self.as_slice().history(user_id)
  }
}

/// Handle on the rating database file
#[derive(Debug, Clone)]
pub struct RatingStore {
  path: PathBuf,
}

impl RatingStore {
  /// Open the store at `path`, creating the file and the ratings table if needed
  pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|e| StorageError::directory(parent, e))?;
    }

    let store = Self::at(path);
    let conn = store.connect()?;
    conn.execute_batch(SCHEMA_SQL).map_err(StorageError::Schema)?;
    tracing::debug!(path = %store.path.display(), "rating store ready");
    Ok(store)
  }

  /// Handle on `path` for reading only. Nothing is created or written until an upsert.
  pub fn at(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn connect(&self) -> Result<Connection, StorageError> {
    let conn = Connection::open(&self.path).map_err(|e| StorageError::open(&self.path, e))?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(|e| StorageError::open(&self.path, e))?;
    Ok(conn)
  }

  /// Insert a rating, or overwrite the existing one for the same user and title
  pub fn upsert(&self, user_id: &str, book_title: &str, rating: i64) -> Result<(), StorageError> {
    let rating = validate_rating(rating)?;
    let mut conn = self.connect()?;

    let tx = conn
      .transaction_with_behavior(TransactionBehavior::Immediate)
      .map_err(StorageError::Write)?;

    let existing = tx
      .query_row(
        "SELECT 1 FROM ratings WHERE user_id = ?1 AND book_title = ?2 LIMIT 1",
        params![user_id, book_title],
        |_| Ok(()),
      )
      .optional()
      .map_err(StorageError::Write)?;

    if existing.is_some() {
      tx.execute(
        "UPDATE ratings SET rating = ?1 WHERE user_id = ?2 AND book_title = ?3",
        params![rating, user_id, book_title],
      )
      .map_err(StorageError::Write)?;
    } else {
      tx.execute(
        "INSERT INTO ratings (user_id, book_title, rating) VALUES (?1, ?2, ?3)",
        params![user_id, book_title, rating],
      )
      .map_err(StorageError::Write)?;
    }

    tx.commit().map_err(StorageError::Write)?;
    tracing::debug!(user_id, book_title, rating, "saved rating");
    Ok(())
  }

  /// All ratings by `user_id`, oldest first.
  ///
  /// A database that cannot be read yields an empty list. Single rows that do
  /// not hold a valid rating are skipped and the rest are kept.
  pub fn query(&self, user_id: &str) -> Vec<Rating> {
    match self.try_query(user_id) {
      Ok(ratings) => ratings,
      Err(e) => {
        tracing::warn!(error = %e, path = %self.path.display(), "could not read ratings, treating as none");
        Vec::new()
      }
    }
  }

  fn try_query(&self, user_id: &str) -> rusqlite::Result<Vec<Rating>> {
    let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(
      "SELECT user_id, book_title, rating FROM ratings WHERE user_id = ?1 ORDER BY rowid",
    )?;

    // Columns are read loosely so one bad row cannot hide the others
    let rows = stmt.query_map(params![user_id], |row| {
      Ok((row.get::<_, Option<String>>(1).ok().flatten(), row.get::<_, Option<i64>>(2).ok().flatten()))
    })?;

    let mut ratings = Vec::new();
    for row in rows {
      let (book_title, raw) = row?;
      match (book_title, raw.and_then(|r| validate_rating(r).ok())) {
        (Some(book_title), Some(rating)) => {
          ratings.push(Rating { user_id: user_id.to_string(), book_title, rating });
        }
        (book_title, _) => {
          tracing::warn!(user_id, ?book_title, ?raw, "skipping unusable rating row");
        }
      }
    }
    Ok(ratings)
  }

  /// Delete every rating for every user. Returns how many rows were removed.
  pub fn reset(&self) -> Result<usize, StorageError> {
    let conn = self.connect()?;
    let removed = conn.execute("DELETE FROM ratings", []).map_err(StorageError::Write)?;
    tracing::debug!(removed, "cleared ratings");
    Ok(removed)
  }
}

impl RatingHistory for RatingStore {
  fn history(&self, user_id: &str) -> Vec<Rating> {
    self.query(user_id)
  }
}
