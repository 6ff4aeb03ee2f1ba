//! Clears every stored rating and exits. No flags, no confirmation.

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "shelf_reset")]
#[command(about = "Delete all stored book ratings")]
#[command(version)]
struct Args {}

fn main() -> Result<()> {
  Args::parse();
  shelf::logging::init(false);

  shelf::commands::reset_ratings()
}
