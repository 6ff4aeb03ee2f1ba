use anyhow::{anyhow, Context, Result};
use colored::*;
use std::path::Path;

use crate::catalog::{Catalog, LengthPreference};
use crate::config::{self, ShelfConfig};
use crate::oracle::Oracle;
use crate::ratings::RatingStore;
use crate::selector::{Recommendation, SelectRequest, Selection, Selector, SelectorSettings};

/// Everything a recommendation needs, loaded once per command
pub struct Shelf {
  pub config: ShelfConfig,
  pub catalog: Catalog,
  pub oracle: Oracle,
  pub ratings: RatingStore,
}

impl Shelf {
  /// Load config, catalog, similarity model and rating store from the shelf home
  pub fn load() -> Result<Self> {
    let home = config::get_shelf_home()?;
    Self::load_from(&home)
  }

  pub fn load_from(home: &Path) -> Result<Self> {
    let config = ShelfConfig::load_from(home)?;
    let catalog = load_catalog(&config)?;
    let oracle = Oracle::load(&config.similarity_path, config.similarity_kind)
      .context("Failed to load the similarity model")?;
    // Reading never touches the schema, so an unusable rating file only costs personalization
    let ratings = RatingStore::at(&config.ratings_path);
    Ok(Self { config, catalog, oracle, ratings })
  }

  pub fn selector(&self) -> Selector<'_> {
    Selector::new(&self.catalog, &self.oracle, &self.ratings, SelectorSettings::from(&self.config))
  }
}

fn load_catalog(config: &ShelfConfig) -> Result<Catalog> {
  Catalog::load(&config.catalog_path, &config.placeholder_thumbnail).context("Failed to load the book catalog")
}

/// List genres with enough books to recommend from
pub fn list_genres(min_books: Option<usize>) -> Result<()> {
  let config = ShelfConfig::load()?;
  let catalog = load_catalog(&config)?;
  let genres = catalog.genres(min_books.unwrap_or(config.min_books_per_genre));

  if genres.is_empty() {
    bentley::info!("No genres have enough books yet");
    return Ok(());
  }

  for (genre, count) in genres {
    println!("{} {}", genre.cyan(), format!("({count})").dimmed());
  }
  Ok(())
}

/// List the books in a genre
pub fn list_books(genre: &str) -> Result<()> {
  let config = ShelfConfig::load()?;
  let catalog = load_catalog(&config)?;

  let mut found = false;
  for entry in catalog.in_genre(genre) {
    found = true;
    println!("{} {}", entry.title.yellow(), format!("({} pages)", entry.num_pages).dimmed());
  }

  if !found {
    println!("No books found for the genre '{}'", genre.yellow());
  }
  Ok(())
}

/// Recommend books similar to `title` for `user_id`
pub fn recommend(
  title: &str,
  user_id: &str,
  genre: &str,
  length: Option<LengthPreference>,
  seed: Option<u64>,
  json: bool,
) -> Result<()> {
  let shelf = Shelf::load()?;
  let request = SelectRequest { seed_book: title, user_id, genre, length, rng_seed: seed };
  let selection = shelf.selector().select(&request);

  if json {
    println!("{}", serde_json::to_string_pretty(&selection)?);
    return Ok(());
  }

  display_selection(&selection);
  Ok(())
}

fn display_selection(selection: &Selection) {
  if let Some(notice) = selection.notice {
    bentley::warn!(notice.message());
  }

  if selection.is_empty() {
    println!("No books to recommend based on your preferences and ratings.");
    return;
  }

  println!("{}", "Recommended books for you:".bold());
  display_recommendations(&selection.books);
}

fn display_recommendations(books: &[Recommendation]) {
  for (i, book) in books.iter().enumerate() {
    println!("  {}. {}", i + 1, book.title.yellow());
    println!("     {}", book.thumbnail.dimmed());
  }
}

/// Recommend books close to several liked titles within a genre
pub fn recommend_liked(liked: &[String], genre: &str) -> Result<()> {
  let shelf = Shelf::load()?;

  match shelf.selector().select_for_liked(liked, genre) {
    Ok(books) if books.is_empty() => {
      println!("No similar books found in '{}'", genre.yellow());
    }
    Ok(books) => {
      println!("{}", "Recommended books for you:".bold());
      display_recommendations(&books);
    }
    Err(e) => {
      bentley::error!(&e.to_string());
    }
  }
  Ok(())
}

/// Save a rating, replacing any earlier rating of the same book by the same user
pub fn rate(user_id: &str, title: &str, rating: i64) -> Result<()> {
  let config = ShelfConfig::load()?;
  let catalog = load_catalog(&config)?;
  if !catalog.contains(title) {
    return Err(anyhow!("Book '{}' is not in the catalog", title));
  }

  let store = RatingStore::open(&config.ratings_path)?;
  store.upsert(user_id, title, rating)?;

  bentley::success!(&format!("Your rating for '{title}' has been saved"));
  Ok(())
}

/// Show every rating a user has given
pub fn show_ratings(user_id: &str) -> Result<()> {
  let config = ShelfConfig::load()?;
  let ratings = RatingStore::at(&config.ratings_path).query(user_id);

  if ratings.is_empty() {
    bentley::info!(&format!("No ratings found for {user_id}"));
    return Ok(());
  }

  for rating in ratings {
    let stars = "★".repeat(rating.rating as usize);
    println!("{} {}", stars.yellow(), rating.book_title);
  }
  Ok(())
}

/// Delete all ratings for all users
pub fn reset_ratings() -> Result<()> {
  let config = ShelfConfig::load()?;
  let store = RatingStore::open(&config.ratings_path)?;
  let removed = store.reset()?;

  bentley::stamped(
    bentley::Level::Success,
    &format!("Database cleared successfully! ({removed} ratings removed)"),
  );
  Ok(())
}
