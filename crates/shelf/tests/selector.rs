mod common;

use anyhow::Result;
use shelf::catalog::LengthPreference;
use shelf::ratings::RatingStore;
use shelf::selector::{Notice, SelectRequest, Selector, SelectorSettings};
use std::collections::HashSet;
use tempfile::TempDir;

fn store(temp: &TempDir) -> Result<RatingStore> {
  Ok(RatingStore::open(temp.path().join("user_ratings.db"))?)
}

fn request<'a>(seed_book: &'a str, genre: &'a str, rng_seed: u64) -> SelectRequest<'a> {
  SelectRequest { seed_book, user_id: "reader", genre, length: None, rng_seed: Some(rng_seed) }
}

#[test]
fn test_every_seed_yields_at_most_six_catalog_titles() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  store.upsert("reader", "SPQR", 5)?;
  store.upsert("reader", "Hyperion", 1)?;

  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  for seed_entry in catalog.entries() {
    for genre in ["Fiction", "History", "Poetry", "Nature", "Cooking"] {
      let selection = selector.select(&request(&seed_entry.title, genre, 11));
      assert!(selection.books.len() <= 6, "{} / {genre}", seed_entry.title);
      for book in &selection.books {
        assert!(catalog.contains(&book.title), "{} is not in the catalog", book.title);
        assert!(book.thumbnail.starts_with("http"));
      }
    }
  }
  Ok(())
}

#[test]
fn test_absent_seed_yields_empty_selection() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  let selection = selector.select(&request("A Book Nobody Indexed", "Fiction", 1));
  assert!(selection.is_empty());
  assert!(selection.notice.is_none());
  Ok(())
}

#[test]
fn test_disliked_title_never_recommended() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  let before = selector.select(&request("Dune", "Fiction", 3));
  assert!(before.books.iter().any(|b| b.title == "Hyperion"));

  store.upsert("reader", "Hyperion", 1)?;
  for rng_seed in 0..50 {
    for genre in ["Fiction", "Cooking"] {
      let selection = selector.select(&request("Dune", genre, rng_seed));
      assert!(selection.books.iter().all(|b| b.title != "Hyperion"));
    }
  }
  Ok(())
}

#[test]
fn test_fiction_fallback_scenario() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::fiction_scenario();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  let selection = selector.select(&SelectRequest {
    seed_book: "X",
    user_id: "reader",
    genre: "Fiction",
    length: None,
    rng_seed: None,
  });

  assert_eq!(selection.books.len(), 6);
  assert_eq!(selection.notice, Some(Notice::PersonalizationUnavailable));
  for book in &selection.books {
    assert_eq!(catalog.get(&book.title).unwrap().categories, "Fiction");
  }
  Ok(())
}

#[test]
fn test_fallback_is_non_empty_when_genre_has_books() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  // Walden is far from everything, so none of Dune's neighbors are Nature books
  let selection = selector.select(&request("Dune", "Nature", 5));
  assert_eq!(selection.books.len(), 1);
  assert_eq!(selection.books[0].title, "Walden");
  assert_eq!(selection.notice, Some(Notice::PersonalizationUnavailable));
  Ok(())
}

#[test]
fn test_unpersonalized_selection_follows_similarity_rank() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  let selection = selector.select(&request("Dune", "Fiction", 9));
  let titles: Vec<&str> = selection.books.iter().map(|b| b.title.as_str()).collect();
  assert_eq!(
    titles,
    vec!["Hyperion", "Solaris", "Neuromancer", "Foundation", "The Left Hand of Darkness", "Kindred"]
  );
  Ok(())
}

#[test]
fn test_length_preference_applies_before_genre_widening() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  let long = selector.select(&SelectRequest { length: Some(LengthPreference::Long), ..request("Dune", "Fiction", 1) });
  for book in &long.books {
    assert!(catalog.get(&book.title).unwrap().num_pages > 300);
  }
  assert!(!long.is_empty());

  // No short History books near Dune, so the History neighbors come back regardless of length
  let short = selector.select(&SelectRequest { length: Some(LengthPreference::Short), ..request("Dune", "History", 1) });
  let titles: HashSet<&str> = short.books.iter().map(|b| b.title.as_str()).collect();
  assert_eq!(titles, HashSet::from(["SPQR", "Guns, Germs, and Steel", "The Histories"]));
  Ok(())
}

#[test]
fn test_liked_titles_are_promoted_into_the_pool() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  store.upsert("reader", "Walden", 5)?;

  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let settings = SelectorSettings { max_results: 20, ..SelectorSettings::default() };
  let selector = Selector::new(&catalog, &oracle, &store, settings);

  let selection = selector.select(&request("Dune", "History", 2));
  let titles: HashSet<&str> = selection.books.iter().map(|b| b.title.as_str()).collect();
  assert_eq!(titles, HashSet::from(["Walden", "SPQR", "Guns, Germs, and Steel", "The Histories"]));
  Ok(())
}

#[test]
fn test_liked_blend_through_knn_model() -> Result<()> {
  let temp = TempDir::new()?;
  let store = store(&temp)?;
  let library = common::mixed_library();
  let catalog = library.catalog();
  let oracle = library.oracle();
  let selector = Selector::new(&catalog, &oracle, &store, SelectorSettings::default());

  // Mean position of SPQR (6) and The Histories (8) is 7
  let liked = vec!["SPQR".to_string(), "The Histories".to_string()];
  let books = selector.select_for_liked(&liked, "history")?;
  let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
  assert_eq!(titles, vec!["Guns, Germs, and Steel"]);
  Ok(())
}
