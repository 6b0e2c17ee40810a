//! `topdocs` CLI: build an in-memory index from a corpus file and query it.
//!
//! The corpus format is one document per line; line numbers become document
//! ids (status `Actual`, no ratings).

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use topdocs::tokenizer::split_into_words;
#[cfg(feature = "cli")]
use topdocs::{
    paginate, remove_duplicates, DocumentStatus, Policy, SearchConfig, SearchIndex,
    MAX_RESULT_DOCUMENT_COUNT,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(author, version, about = "TF-IDF document search CLI", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank documents of a corpus file against a query.
    Search {
        /// Path to a corpus file (one document per line).
        #[arg(short, long)]
        input: PathBuf,

        /// Space-separated stop words.
        #[arg(long, default_value = "")]
        stop_words: String,

        /// Cap on returned documents.
        #[arg(short = 'k', long, default_value_t = MAX_RESULT_DOCUMENT_COUNT)]
        max_results: usize,

        /// Rank with the data-parallel pipeline.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Page size for output (0 prints one flat list).
        #[arg(long, default_value_t = 0)]
        page_size: usize,

        /// Query words (prefix a word with `-` to exclude it).
        query: Vec<String>,
    },

    /// Show which query words hit one document of a corpus file.
    Match {
        /// Path to a corpus file (one document per line).
        #[arg(short, long)]
        input: PathBuf,

        /// Space-separated stop words.
        #[arg(long, default_value = "")]
        stop_words: String,

        /// Document id (line number, starting at 0).
        #[arg(long)]
        doc_id: i64,

        /// Query words (prefix a word with `-` to exclude it).
        query: Vec<String>,
    },

    /// Report and drop documents that duplicate an earlier word set.
    Dedup {
        /// Path to a corpus file (one document per line).
        #[arg(short, long)]
        input: PathBuf,

        /// Space-separated stop words.
        #[arg(long, default_value = "")]
        stop_words: String,
    },
}

#[cfg(feature = "cli")]
fn load_index(
    input: &Path,
    stop_words: &str,
    config: SearchConfig,
) -> Result<SearchIndex, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let mut index = SearchIndex::with_config(split_into_words(stop_words), config)?;
    for (i, line) in text.lines().enumerate() {
        index.add_document(i as i64, line, DocumentStatus::Actual, &[])?;
    }
    Ok(index)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "cli")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();

        let args = Args::parse();

        match args.command {
            Commands::Search {
                input,
                stop_words,
                max_results,
                parallel,
                page_size,
                query,
            } => {
                let config = SearchConfig {
                    max_results,
                    ..SearchConfig::default()
                };
                let index = load_index(&input, &stop_words, config)?;
                let policy = if parallel {
                    Policy::Parallel
                } else {
                    Policy::Sequential
                };
                let results = index.find_top_documents_policy(policy, &query.join(" "))?;

                if results.is_empty() {
                    println!("No documents matched");
                } else if page_size > 0 {
                    for (page_no, page) in paginate(&results, page_size).iter().enumerate() {
                        println!("-- page {}", page_no + 1);
                        for document in *page {
                            println!("{document}");
                        }
                    }
                } else {
                    for document in &results {
                        println!("{document}");
                    }
                }
            }
            Commands::Match {
                input,
                stop_words,
                doc_id,
                query,
            } => {
                let index = load_index(&input, &stop_words, SearchConfig::default())?;
                let (words, status) = index.match_document(&query.join(" "), doc_id)?;
                if let Some(text) = index.document_text(doc_id) {
                    println!("document {doc_id}: {text}");
                }
                println!(
                    "{} words matched document {doc_id} (status {status:?})",
                    words.len()
                );
                for word in words {
                    println!("  {word}");
                }
            }
            Commands::Dedup { input, stop_words } => {
                let mut index = load_index(&input, &stop_words, SearchConfig::default())?;
                let removed = remove_duplicates(&mut index, &mut std::io::stdout())?;
                println!(
                    "ok: removed {} duplicates ({} documents left)",
                    removed.len(),
                    index.document_count()
                );
            }
        }
    }

    #[cfg(not(feature = "cli"))]
    println!("CLI feature is disabled. Build with --features cli to enable.");

    Ok(())
}
