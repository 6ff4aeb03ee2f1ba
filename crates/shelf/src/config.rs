use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::oracle::OracleKind;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Upper bound on `neighbor_count`; the model is scanned in full for every query
pub const MAX_NEIGHBOR_COUNT: usize = 10_000;

/// Runtime settings, read from `<shelf home>/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShelfConfig {
  /// Catalog artifact; relative paths resolve against the shelf home
  pub catalog_path: PathBuf,
  /// Similarity artifact; relative paths resolve against the shelf home
  pub similarity_path: PathBuf,
  /// Shape of the similarity artifact. Detected from the file when unset.
  pub similarity_kind: Option<OracleKind>,
  /// SQLite rating database; relative paths resolve against the shelf home
  pub ratings_path: PathBuf,
  pub neighbor_count: usize,
  pub max_results: usize,
  pub short_book_max_pages: u32,
  pub placeholder_thumbnail: String,
  pub min_books_per_genre: usize,
  pub dislike_threshold: u8,
  pub like_threshold: u8,
}

impl Default for ShelfConfig {
  fn default() -> Self {
    Self {
      catalog_path: PathBuf::from("books.json"),
      similarity_path: PathBuf::from("similarity.json"),
      similarity_kind: None,
      ratings_path: PathBuf::from("user_ratings.db"),
      neighbor_count: 14,
      max_results: 6,
      short_book_max_pages: 300,
      placeholder_thumbnail: "https://via.placeholder.com/120".to_string(),
      min_books_per_genre: 10,
      dislike_threshold: 2,
      like_threshold: 4,
    }
  }
}

impl ShelfConfig {
  /// Load the config from the shelf home, falling back to defaults when no file exists
  pub fn load() -> Result<Self> {
    let home = get_shelf_home()?;
    Self::load_from(&home)
  }

  /// Load the config stored in `home`, resolving relative artifact paths against it
  pub fn load_from(home: &Path) -> Result<Self> {
    let file_path = home.join(CONFIG_FILE_NAME);

    let config = if file_path.exists() {
      let content = fs::read_to_string(&file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
      serde_yaml::from_str::<ShelfConfig>(&content)
        .with_context(|| format!("Invalid config in {}", file_path.display()))?
    } else {
      ShelfConfig::default()
    };

    config.validate()?;
    Ok(config.resolved_against(home))
  }

  fn validate(&self) -> Result<()> {
    if self.max_results == 0 {
      return Err(anyhow!("max_results must be at least 1"));
    }
    if !(1..=MAX_NEIGHBOR_COUNT).contains(&self.neighbor_count) {
      return Err(anyhow!(
        "neighbor_count must be between 1 and {MAX_NEIGHBOR_COUNT}, got {}",
        self.neighbor_count
      ));
    }
    if self.dislike_threshold >= self.like_threshold {
      return Err(anyhow!(
        "dislike_threshold ({}) must be below like_threshold ({})",
        self.dislike_threshold,
        self.like_threshold
      ));
    }
    Ok(())
  }

  fn resolved_against(mut self, home: &Path) -> Self {
    self.catalog_path = resolve(home, &self.catalog_path);
    self.similarity_path = resolve(home, &self.similarity_path);
    self.ratings_path = resolve(home, &self.ratings_path);
    self
  }
}

fn resolve(home: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    home.join(path)
  }
}

/// Get the shelf home directory (~/.shelf)
pub fn get_shelf_home() -> Result<PathBuf> {
  // Allow tests or callers to override the home directory via env var
  if let Ok(custom_home) = std::env::var("SHELF_HOME") {
    return Ok(PathBuf::from(custom_home));
  }

  let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
  Ok(home.join(".shelf"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_missing_file_yields_defaults_under_home() -> Result<()> {
    let temp = TempDir::new()?;
    let config = ShelfConfig::load_from(temp.path())?;

    assert_eq!(config.neighbor_count, 14);
    assert_eq!(config.max_results, 6);
    assert_eq!(config.ratings_path, temp.path().join("user_ratings.db"));
    assert!(config.similarity_kind.is_none());
    Ok(())
  }

  #[test]
  fn test_partial_file_overrides_only_named_fields() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(
      temp.path().join(CONFIG_FILE_NAME),
      "similarity_kind: pairwise\nmax_results: 4\ncatalog_path: /data/books.json\n",
    )?;

    let config = ShelfConfig::load_from(temp.path())?;
    assert_eq!(config.similarity_kind, Some(OracleKind::Pairwise));
    assert_eq!(config.max_results, 4);
    assert_eq!(config.catalog_path, PathBuf::from("/data/books.json"));
    assert_eq!(config.short_book_max_pages, 300);
    Ok(())
  }

  #[test]
  fn test_inverted_thresholds_are_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(CONFIG_FILE_NAME), "dislike_threshold: 4\nlike_threshold: 3\n")?;

    let result = ShelfConfig::load_from(temp.path());
    assert!(result.unwrap_err().to_string().contains("dislike_threshold"));
    Ok(())
  }

  #[test]
  fn test_neighbor_count_is_bounded() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(CONFIG_FILE_NAME), format!("neighbor_count: {}\n", usize::MAX))?;

    let result = ShelfConfig::load_from(temp.path());
    assert!(result.unwrap_err().to_string().contains("neighbor_count"));
    Ok(())
  }
}
