use anyhow::Result;
use bookrec_core::config::{DEFAULT_DATA_DIR, DEFAULT_TOP_N, DEFAULT_TOP_RATED_LIMIT};
use bookrec_core::{CsvSource, FilterOutcome, ItemId, RecommendationService, ScoredItem, TermId, TextFilter, TokenizerOptions, TopRatedQuery, Vocabulary};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "bookrec")]
#[command(about = "Content-based book recommendations over a CSV catalog", long_about = None)]
struct Cli {
    /// Directory with books.csv, tags.csv and book_tags.csv
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data: String,
    /// Stem terms before indexing
    #[arg(long, global = true, default_value_t = false)]
    stem: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print catalog and vocabulary sizes
    Stats,
    /// Books most similar to a book id
    Recommend {
        book_id: ItemId,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },
    /// Books most similar to free text
    Query {
        text: String,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },
    /// Case-insensitive title/author substring filter
    Search {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Highest rated books, optionally within a year range
    Top {
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
        #[arg(long, default_value_t = DEFAULT_TOP_RATED_LIMIT)]
        limit: usize,
    },
}

#[derive(Serialize)]
struct Stats {
    items: usize,
    terms: usize,
    zero_vectors: usize,
    /// Most widespread terms with their document frequency
    common_terms: Vec<(String, u32)>,
    build_s: f64,
    built_at: String,
}

#[derive(Serialize)]
struct ScoredBook<'a> {
    book_id: ItemId,
    score: f32,
    title: &'a str,
    authors: &'a str,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let start = Instant::now();
    let service = RecommendationService::from_source(&CsvSource::new(&cli.data), TokenizerOptions { stem: cli.stem })?;
    let build_s = start.elapsed().as_secs_f64();

    match cli.command {
        Commands::Stats => {
            let index = service.index();
            let stats = Stats {
                items: index.len(),
                terms: index.vocabulary().len(),
                zero_vectors: index.entries().iter().filter(|e| e.vector.is_zero()).count(),
                common_terms: common_terms(index.vocabulary(), 10),
                build_s,
                built_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
            };
            print_json(&stats)
        }
        Commands::Recommend { book_id, top_n } => {
            if service.record(book_id).is_none() {
                tracing::warn!(book_id, "unknown book id");
            }
            print_json(&scored_books(&service, &service.similar(book_id, top_n)))
        }
        Commands::Query { text, top_n } => print_json(&scored_books(&service, &service.similar_to_text(&text, top_n))),
        Commands::Search { title, author } => match service.filter(&TextFilter::new(title, author)) {
            FilterOutcome::Matches(books) => print_json(&books),
            FilterOutcome::TooMany { count } => {
                print_json(&serde_json::json!({ "too_many": true, "count": count }))
            }
        },
        Commands::Top { start_year, end_year, limit } => {
            let query = TopRatedQuery { start_year, end_year, limit, ..TopRatedQuery::default() };
            print_json(&service.top_rated(&query))
        }
    }
}

fn common_terms(vocab: &Vocabulary, n: usize) -> Vec<(String, u32)> {
    let mut by_df: Vec<(String, u32)> = vocab
        .terms()
        .into_iter()
        .enumerate()
        .map(|(id, term)| (term.to_string(), vocab.df(id as TermId).unwrap_or(0)))
        .collect();
    by_df.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    by_df.truncate(n);
    by_df
}

fn scored_books<'a>(service: &'a RecommendationService, scored: &[ScoredItem]) -> Vec<ScoredBook<'a>> {
    scored
        .iter()
        .filter_map(|s| {
            let record = service.records().get(s.position)?;
            Some(ScoredBook { book_id: s.item_id, score: s.score, title: record.title_or_empty(), authors: record.authors_or_empty() })
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
