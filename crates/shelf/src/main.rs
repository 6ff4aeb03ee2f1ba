use anyhow::Result;
use clap::{Parser, Subcommand};
use shelf::catalog::LengthPreference;
use shelf::commands;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - Personalized Book Recommendations\nSimilar books, filtered by genre and shaped by your ratings")]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List genres with enough books to recommend from
  Genres {
    /// Minimum number of books a genre needs (defaults to the configured threshold)
    #[arg(short, long)]
    min_books: Option<usize>,
  },
  /// List the books in a genre
  Books {
    /// Genre to list
    genre: String,
  },
  /// Recommend books similar to one you liked
  Recommend {
    /// Title of the book you liked
    title: String,
    /// Genre to recommend from
    #[arg(short, long)]
    genre: String,
    /// Whose ratings to take into account
    #[arg(short, long, env = "SHELF_USER", default_value = "User1")]
    user: String,
    /// Prefer short or long books
    #[arg(short, long, value_enum)]
    length: Option<LengthPreference>,
    /// Fix the random sampling so the same request gives the same books
    #[arg(long)]
    seed: Option<u64>,
    /// Print the selection as JSON
    #[arg(long)]
    json: bool,
  },
  /// Recommend books close to several liked books
  Liked {
    /// Genre to recommend from (case-insensitive, partial match)
    #[arg(short, long)]
    genre: String,
    /// Titles of the books you liked
    #[arg(required = true)]
    titles: Vec<String>,
  },
  /// Rate a book from 1 to 5
  Rate {
    /// Title of the book to rate
    title: String,
    /// Rating from 1 (disliked) to 5 (loved)
    #[arg(value_parser = clap::value_parser!(i64).range(1..=5))]
    rating: i64,
    /// Who is rating
    #[arg(short, long, env = "SHELF_USER", default_value = "User1")]
    user: String,
  },
  /// Show the ratings a user has given
  Ratings {
    /// Whose ratings to show
    #[arg(short, long, env = "SHELF_USER", default_value = "User1")]
    user: String,
  },
  /// Delete every stored rating
  Reset,
}

fn handle(command: Command) -> Result<()> {
  match command {
    Command::Genres { min_books } => commands::list_genres(min_books),
    Command::Books { genre } => commands::list_books(&genre),
    Command::Recommend { title, genre, user, length, seed, json } => {
      commands::recommend(&title, &user, &genre, length, seed, json)
    }
    Command::Liked { genre, titles } => commands::recommend_liked(&titles, &genre),
    Command::Rate { title, rating, user } => commands::rate(&user, &title, rating),
    Command::Ratings { user } => commands::show_ratings(&user),
    Command::Reset => commands::reset_ratings(),
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  shelf::logging::init(cli.verbose);

  handle(cli.command)
}
