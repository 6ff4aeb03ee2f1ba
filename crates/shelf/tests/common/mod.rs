#![allow(dead_code)]

use shelf::catalog::{Catalog, CatalogEntry};
use shelf::oracle::{KnnIndex, Metric, Oracle};
use std::fs;
use std::path::Path;

pub const PLACEHOLDER: &str = "https://via.placeholder.com/120";

pub fn entry(title: &str, categories: &str, num_pages: u32) -> CatalogEntry {
  CatalogEntry {
    title: title.to_string(),
    categories: categories.to_string(),
    num_pages,
    thumbnail: Some(format!("https://covers.example/{}.jpg", title.replace(' ', "_"))),
  }
}

/// A one-dimensional library: each book sits at a point on a line, so
/// distances (and therefore neighbor order) are easy to reason about.
pub struct Library {
  pub books: Vec<(CatalogEntry, f32)>,
}

impl Library {
  pub fn new() -> Self {
    Self { books: Vec::new() }
  }

  pub fn add(mut self, title: &str, categories: &str, num_pages: u32, position: f32) -> Self {
    self.books.push((entry(title, categories, num_pages), position));
    self
  }

  pub fn catalog(&self) -> Catalog {
    Catalog::new(self.books.iter().map(|(e, _)| e.clone()).collect(), PLACEHOLDER).unwrap()
  }

  pub fn oracle(&self) -> Oracle {
    let titles = self.books.iter().map(|(e, _)| e.title.clone()).collect();
    let vectors = self.books.iter().map(|(_, p)| vec![*p]).collect();
    Oracle::Knn(KnnIndex::new(titles, vectors, Metric::Euclidean).unwrap())
  }

  /// Write `books.json` and a k-NN `similarity.json` into `dir`
  pub fn write_artifacts(&self, dir: &Path) {
    let entries: Vec<&CatalogEntry> = self.books.iter().map(|(e, _)| e).collect();
    fs::write(dir.join("books.json"), serde_json::to_string(&entries).unwrap()).unwrap();

    let similarity = serde_json::json!({
      "titles": self.books.iter().map(|(e, _)| e.title.clone()).collect::<Vec<_>>(),
      "vectors": self.books.iter().map(|(_, p)| vec![*p]).collect::<Vec<_>>(),
    });
    fs::write(dir.join("similarity.json"), similarity.to_string()).unwrap();
  }
}

/// Seed "X" (History) with 14 History neighbors close by and 20 Fiction books far away
pub fn fiction_scenario() -> Library {
  let mut library = Library::new().add("X", "History", 250, 0.0);
  for i in 1..=14 {
    library = library.add(&format!("History {i}"), "History", 200 + i * 20, i as f32);
  }
  for i in 1..=20 {
    library = library.add(&format!("Fiction {i}"), "Fiction", 150 + i * 15, 100.0 + i as f32);
  }
  library
}

/// A mixed library where the seed's close neighbors span several genres and lengths
pub fn mixed_library() -> Library {
  Library::new()
    .add("Dune", "Fiction", 412, 0.0)
    .add("Hyperion", "Fiction", 482, 1.0)
    .add("Solaris", "Fiction", 204, 2.0)
    .add("Neuromancer", "Fiction", 271, 3.0)
    .add("Foundation", "Fiction", 255, 4.0)
    .add("The Left Hand of Darkness", "Fiction", 304, 5.0)
    .add("SPQR", "History", 608, 6.0)
    .add("Guns, Germs, and Steel", "History", 480, 7.0)
    .add("The Histories", "History", 716, 8.0)
    .add("Leaves of Grass", "Poetry", 145, 9.0)
    .add("Ariel", "Poetry", 96, 10.0)
    .add("Kindred", "Fiction", 264, 11.0)
    .add("Beloved", "Fiction", 324, 12.0)
    .add("Emma", "Fiction", 474, 13.0)
    .add("Middlemarch", "Fiction", 880, 14.0)
    .add("Ulysses", "Fiction", 730, 15.0)
    .add("Orlando", "Fiction", 333, 16.0)
    .add("Walden", "Nature", 352, 40.0)
}
