//! Defaults and caps shared by the library, the HTTP server and the CLI.
//!
//! Runtime configuration (data directory, bind address, stemming) is handled
//! through CLI arguments and environment variables in the binaries.

/// Number of recommendations returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound on `top_n` accepted at the API boundary.
pub const MAX_TOP_N: usize = 100;

/// A title/author filter matching more records than this reports "too many".
pub const FILTER_MAX_MATCHES: usize = 50;

/// Default result limit for the top-rated listing.
pub const DEFAULT_TOP_RATED_LIMIT: usize = 50;

/// Upper bound on the top-rated listing limit.
pub const MAX_TOP_RATED_LIMIT: usize = 500;

/// Catalogs at least this large are scored on the rayon pool.
///
/// Below it the sequential loop is faster than splitting the work.
pub const PARALLEL_SCORING_MIN_ITEMS: usize = 4096;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default directory holding `books.csv`, `tags.csv` and `book_tags.csv`.
pub const DEFAULT_DATA_DIR: &str = "./data";
