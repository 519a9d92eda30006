use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use storyline_core::{CorpusIndex, IdfScheme, IndexStats, Weighting};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a TF-IDF index over movie storylines and inspect or query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print a JSON report
    Stats {
        #[command(flatten)]
        build: BuildArgs,
        /// Number of highest-idf terms to list
        #[arg(long, default_value_t = 10)]
        top_terms: usize,
    },
    /// Build the index and print the best matches for a storyline
    Recommend {
        #[command(flatten)]
        build: BuildArgs,
        /// Free-text storyline to match
        #[arg(long)]
        query: String,
        /// Number of results
        #[arg(long, default_value_t = storyline_core::DEFAULT_TOP_N)]
        k: usize,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Corpus file (CSV, JSON, JSONL) or directory
    #[arg(long, env = "CORPUS_PATH", default_value = "./imdb_2024_movies.csv")]
    input: String,
    /// Use 1 + ln(tf) instead of the raw term count
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
    /// Inverse document frequency formula
    #[arg(long, value_enum, default_value_t = IdfArg::Smooth)]
    idf: IdfArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum IdfArg {
    /// ln((1 + N) / (1 + df)) + 1
    Smooth,
    /// ln(N / df)
    Plain,
}

impl BuildArgs {
    fn weighting(&self) -> Weighting {
        let idf = match self.idf {
            IdfArg::Smooth => IdfScheme::Smooth,
            IdfArg::Plain => IdfScheme::Plain,
        };
        Weighting { sublinear_tf: self.sublinear_tf, idf }
    }

    fn build(&self) -> Result<CorpusIndex> {
        let index = CorpusIndex::from_source(&self.input, self.weighting())?;
        Ok(index)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    created_at: String,
    weighting: Weighting,
    #[serde(flatten)]
    stats: IndexStats,
    top_terms: Vec<TermReport<'a>>,
}

#[derive(Serialize)]
struct TermReport<'a> {
    term: &'a str,
    df: u32,
    idf: f64,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { build, top_terms } => stats(&build, top_terms),
        Commands::Recommend { build, query, k } => recommend(&build, &query, k),
    }
}

fn stats(args: &BuildArgs, top_terms: usize) -> Result<()> {
    let index = args.build()?;
    let mut terms: Vec<TermReport> = index
        .terms()
        .iter()
        .filter_map(|t| Some(TermReport { term: t, df: index.document_frequency(t)?, idf: index.idf(t)? }))
        .collect();
    // highest idf first; vocabulary order breaks ties
    terms.sort_by(|a, b| b.idf.partial_cmp(&a.idf).unwrap_or(std::cmp::Ordering::Equal));
    terms.truncate(top_terms);

    let report = Report {
        input: &args.input,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        weighting: index.weighting(),
        stats: index.stats(),
        top_terms: terms,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn recommend(args: &BuildArgs, query: &str, k: usize) -> Result<()> {
    let index = args.build()?;
    let hits = index.search(query, k);
    if hits.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        if let Some(doc) = index.document(hit.doc_id) {
            println!("{}. {} (score {:.4})", rank + 1, doc.title, hit.score);
            println!("   Storyline: {}\n", doc.raw_text);
        }
    }
    tracing::info!(input = %args.input, k, hits = hits.len(), "recommend complete");
    Ok(())
}
