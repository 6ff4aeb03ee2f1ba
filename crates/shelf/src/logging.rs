use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Install the tracing subscriber for the shelf binaries.
///
/// `RUST_LOG` wins when set.
pub fn init(verbose: bool) {
  let default = if verbose { "shelf=debug,warn" } else { "shelf=info,warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  // A second init (tests driving several commands in one process) is harmless.
  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .try_init();
}
