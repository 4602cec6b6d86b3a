use anyhow::Result;
use clap::{Parser, Subcommand};
use llm::{suggest_titles_or_offline, TextGenerator};
use storycore::corpus::{chat_context, insights, recommend};
use storycore::store::new_record;
use storycore::suggest::{extract_keywords, extract_tags, parse_tag_list, suggest_incidents, DEFAULT_TAGS};
use storycore::{SemanticIndex, StoryStore};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "storyctl")]
#[command(about = "Save stories, search them, and get writing suggestions", long_about = None)]
struct Cli {
    /// Story store (JSONL) path
    #[arg(long, global = true, default_value = "./data/stories.jsonl")]
    store: String,
    /// Print JSON instead of bullet lists
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a story to the store
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        body: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Add tags detected in the body from the default value list
        #[arg(long, default_value_t = false)]
        auto_tag: bool,
    },
    /// Rank saved stories against a query
    Search {
        query: String,
        #[arg(long, default_value_t = 5)]
        k: usize,
    },
    /// Recommend stories and, when a model is configured, answer the question
    Chat {
        query: String,
    },
    /// Suggest titles for a draft
    Titles {
        #[arg(default_value = "")]
        text: String,
    },
    /// Brainstorm incident ideas for a role
    Incidents {
        #[arg(long, default_value = "Manager")]
        role: String,
        /// Comma-separated keywords
        #[arg(long, default_value = "")]
        keywords: String,
        /// Draft body to pull keywords from when none are given
        #[arg(long)]
        body: Option<String>,
    },
    /// Detect value tags in a text
    Tags {
        text: String,
        /// Comma-separated candidate tags (defaults to the built-in value list)
        #[arg(long)]
        candidates: Option<String>,
    },
    /// Summary statistics of the store
    Insights,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let store = StoryStore::new(&cli.store);

    match cli.command {
        Commands::Add { title, body, tags, auto_tag } => {
            let mut tags = parse_tag_list(&tags);
            if auto_tag {
                for t in extract_tags(&body, DEFAULT_TAGS) {
                    if !tags.contains(&t) { tags.push(t); }
                }
            }
            let record = new_record(&title, &body, tags);
            store.append(&record)?;
            tracing::info!(id = %record.id, store = %cli.store, "saved story");
            if cli.json { println!("{}", serde_json::to_string_pretty(&record)?); } else { println!("{}", record.id); }
        }
        Commands::Search { query, k } => {
            let records = store.list()?;
            let mut idx = SemanticIndex::new();
            idx.fit_records(&records);
            let recs = recommend(&idx, &records, &query, k);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&recs)?);
            } else {
                for r in recs { println!("{:.3}\t{}\t{}", r.score, r.title, r.preview); }
            }
        }
        Commands::Chat { query } => {
            let records = store.list()?;
            let mut idx = SemanticIndex::new();
            idx.fit_records(&records);
            let recs = recommend(&idx, &records, &query, 5);
            let answer = TextGenerator::from_env().chat_answer(&query, &chat_context(&records)).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "recommendations": recs, "answer": answer }))?);
            } else {
                for r in recs { println!("{:.3}\t{}", r.score, r.title); }
                if !answer.is_empty() { println!("\n{answer}"); }
            }
        }
        Commands::Titles { text } => {
            let titles = suggest_titles_or_offline(&TextGenerator::from_env(), &text).await;
            print_list(&titles, cli.json)?;
        }
        Commands::Incidents { role, keywords, body } => {
            let mut keywords = parse_tag_list(&keywords);
            if keywords.is_empty() {
                if let Some(body) = &body { keywords = extract_keywords(body); }
            }
            let ideas = suggest_incidents(&role, &keywords, &mut rand::thread_rng());
            print_list(&ideas, cli.json)?;
        }
        Commands::Tags { text, candidates } => {
            let tags = match candidates {
                Some(c) => extract_tags(&text, &parse_tag_list(&c)),
                None => extract_tags(&text, DEFAULT_TAGS),
            };
            print_list(&tags, cli.json)?;
        }
        Commands::Insights => {
            let stats = insights(&store.list()?);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total stories: {}", stats.total_stories);
                println!("Average story length (chars): {}", stats.average_length);
                for (tag, count) in stats.tag_counts { println!("{tag}\t{count}"); }
            }
        }
    }
    Ok(())
}

fn print_list(items: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for i in items { println!("• {i}"); }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_store_flag() {
        let cli = Cli::try_parse_from(["storyctl", "search", "customer", "--k", "3", "--store", "/tmp/s.jsonl"]).unwrap();
        assert_eq!(cli.store, "/tmp/s.jsonl");
        assert!(matches!(cli.command, Commands::Search { k: 3, .. }));
    }

    #[test]
    fn titles_text_is_optional() {
        let cli = Cli::try_parse_from(["storyctl", "titles"]).unwrap();
        assert!(matches!(cli.command, Commands::Titles { ref text } if text.is_empty()));
    }
}
