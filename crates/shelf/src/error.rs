use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures writing to the rating store. Read failures never surface as errors.
#[derive(Error, Debug)]
pub enum StorageError {
  #[error("Failed to open rating database at {path}: {source}")]
  Open { path: PathBuf, source: rusqlite::Error },

  #[error("Failed to initialize ratings table: {0}")]
  Schema(rusqlite::Error),

  #[error("Failed to write rating: {0}")]
  Write(rusqlite::Error),

  #[error("Rating must be between 1 and 5, got {rating}")]
  InvalidRating { rating: i64 },

  #[error("Failed to create directory {path}: {source}")]
  Directory { path: PathBuf, source: std::io::Error },
}

impl StorageError {
  pub fn open(path: &Path, source: rusqlite::Error) -> Self {
    Self::Open { path: path.to_path_buf(), source }
  }

  pub fn invalid_rating(rating: i64) -> Self {
    Self::InvalidRating { rating }
  }

  pub fn directory(path: &Path, source: std::io::Error) -> Self {
    Self::Directory { path: path.to_path_buf(), source }
  }
}

/// Failures loading the catalog or similarity artifacts
#[derive(Error, Debug)]
pub enum ArtifactError {
  #[error("Failed to read {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },

  #[error("Failed to parse {path}: {source}")]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("Could not tell which similarity shape {path} holds (expected `vectors` or `matrix`)")]
  UnknownShape { path: PathBuf },

  #[error("Similarity artifact is malformed: {message}")]
  Malformed { message: String },

  #[error("Duplicate catalog title: {title}")]
  DuplicateTitle { title: String },
}

impl ArtifactError {
  pub fn read(path: &Path, source: std::io::Error) -> Self {
    Self::Read { path: path.to_path_buf(), source }
  }

  pub fn parse(path: &Path, source: serde_json::Error) -> Self {
    Self::Parse { path: path.to_path_buf(), source }
  }

  pub fn unknown_shape(path: &Path) -> Self {
    Self::UnknownShape { path: path.to_path_buf() }
  }

  pub fn malformed(message: impl Into<String>) -> Self {
    Self::Malformed { message: message.into() }
  }

  pub fn duplicate_title(title: impl Into<String>) -> Self {
    Self::DuplicateTitle { title: title.into() }
  }
}

/// Reasons a liked-books blend produces no recommendations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlendError {
  #[error("No books found for the genre '{genre}'")]
  UnknownGenre { genre: String },

  #[error("None of the liked books are found in the dataset")]
  NoLikedBooksIndexed,
}

impl BlendError {
  pub fn unknown_genre(genre: impl Into<String>) -> Self {
    Self::UnknownGenre { genre: genre.into() }
  }
}
