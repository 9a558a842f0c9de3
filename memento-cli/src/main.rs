use clap::{Parser, Subcommand};
use colored::Colorize;
use memento::prelude::*;
use serde_json::json;
use tracing::error;

#[derive(Parser)]
#[command(name = "memento-cli")]
#[command(about = "Memento memory service CLI", long_about = None)]
#[command(version = memento::VERSION)]
struct Cli {
    /// Custom data directory for storage
    #[arg(long, short, global = true)]
    data_dir: Option<String>,

    /// Storage backend (file, sqlite)
    #[arg(long, short, global = true, default_value = "file")]
    backend: String,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    output: String,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (suppress all logging output)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a memory from natural language or structured fields
    Store {
        /// User identifier
        #[arg(long, short)]
        user: String,

        /// Memory text ("Hey Memento, remember that ...")
        text: String,

        /// Explicit category (overrides parsed category)
        #[arg(long)]
        category: Option<String>,

        /// Explicit tags, comma-separated (overrides parsed hashtags)
        #[arg(long)]
        tags: Option<String>,

        /// Explicit importance 1-10 (overrides parsed importance)
        #[arg(long)]
        importance: Option<u8>,
    },
    /// Recall memories with natural language or explicit filters
    Recall {
        /// User identifier
        #[arg(long, short)]
        user: String,

        /// Query text ("what did I tell you about work last week?")
        #[arg(default_value = "")]
        query: String,

        /// Explicit category filter
        #[arg(long)]
        category: Option<String>,

        /// Restrict to the last N days
        #[arg(long)]
        days_back: Option<u32>,

        /// Maximum number of results
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Show memory statistics for a user
    Summary {
        /// User identifier
        #[arg(long, short)]
        user: String,
    },
    /// Parse a command without storing anything (diagnostic)
    Parse {
        /// Text to parse
        text: String,
    },
    /// List all users with stored memories
    Users,
    /// Display version information
    Version,
}

fn output_error(error_msg: &str, output_format: &str) {
    if output_format == "json" {
        let reply = json!({
            "error": true,
            "message": error_msg,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&reply).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        error!("{}", error_msg);
        eprintln!("{} {}", "error:".red().bold(), error_msg);
    }
}

fn resolve_backend(name: &str) -> memento::Result<StorageBackend> {
    match name {
        "sqlite" => Ok(StorageBackend::Sqlite),
        "file" => Ok(StorageBackend::File),
        other => Err(MementoError::Configuration(format!(
            "unknown backend '{other}' (expected 'file' or 'sqlite')"
        ))),
    }
}

/// Build a recall request from the explicit flags, letting natural language
/// fill anything the flags left open. Flags always win over parsed values.
fn merge_recall_request(
    query: &str,
    category: Option<String>,
    days_back: Option<u32>,
    limit: Option<usize>,
) -> RecallRequest {
    let mut request = RecallRequest {
        query: None,
        category,
        days_back,
        limit,
    };

    if !query.trim().is_empty() {
        if let ParsedCommand::Recall {
            query: parsed_query,
            category: parsed_category,
            days_back: parsed_days,
            ..
        } = memento::parser::parse(query)
        {
            request.query = Some(parsed_query);
            if request.category.is_none() {
                request.category = parsed_category.map(|c| c.to_string());
            }
            if request.days_back.is_none() {
                request.days_back = parsed_days;
            }
        } else {
            request.query = Some(query.to_string());
        }
    }

    request
}

async fn build_service(cli: &Cli) -> memento::Result<MemoryService> {
    let mut builder = ConfigBuilder::defaults().with_backend(resolve_backend(&cli.backend)?);
    if let Some(dir) = &cli.data_dir {
        builder = builder.with_data_dir(dir);
    }
    if cli.quiet || cli.output == "json" {
        builder = builder.with_quiet_logging();
    } else if cli.verbose {
        builder = builder.with_log_level(LogLevel::Debug);
    }

    memento::init(builder.build()?).await
}

fn print_records(records: &[MemoryRecord], output: &str) {
    if output == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        );
        return;
    }

    if records.is_empty() {
        println!("{}", "No memories found.".dimmed());
        return;
    }

    for (i, record) in records.iter().enumerate() {
        println!(
            "{} {}",
            format!("{}.", i + 1).bold(),
            record.content.as_str()
        );
        print!(
            "   {} {}  {} {}  {} {}/10",
            "id:".dimmed(),
            record.id,
            "category:".dimmed(),
            record.category,
            "importance:".dimmed(),
            record.importance
        );
        if !record.tags.is_empty() {
            print!("  {} {}", "tags:".dimmed(), record.tags.join(", "));
        }
        println!();
        println!(
            "   {} {}",
            "created:".dimmed(),
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}

async fn run(cli: Cli) -> memento::Result<()> {
    match &cli.command {
        Commands::Version => {
            println!("memento-cli {}", memento::VERSION);
            Ok(())
        }
        Commands::Parse { text } => {
            let service = build_service(&cli).await?;
            let parsed = service.parse(text);
            println!(
                "{}",
                serde_json::to_string_pretty(&parsed)
                    .unwrap_or_else(|_| "{}".to_string())
            );
            Ok(())
        }
        Commands::Store {
            user,
            text,
            category,
            tags,
            importance,
        } => {
            let service = build_service(&cli).await?;
            let adapter = ToolAdapter::new(service);
            let call = ToolCall::StoreMemory {
                user_id: user.clone(),
                text: Some(text.clone()),
                content: None,
                category: category.clone(),
                tags: tags
                    .as_ref()
                    .map(|t| t.split(',').map(|s| s.trim().to_string()).collect()),
                importance: *importance,
                metadata: None,
            };
            let reply = adapter.dispatch(call).await?;

            if cli.output == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&reply).unwrap_or_else(|_| "{}".to_string())
                );
            } else {
                println!(
                    "{} memory #{} stored in {}",
                    "ok:".green().bold(),
                    reply["memory_id"],
                    reply["category"].as_str().unwrap_or("general")
                );
            }
            Ok(())
        }
        Commands::Recall {
            user,
            query,
            category,
            days_back,
            limit,
        } => {
            let service = build_service(&cli).await?;
            let request = merge_recall_request(query, category.clone(), *days_back, *limit);
            let records = service.recall(user, request).await?;
            print_records(&records, &cli.output);
            Ok(())
        }
        Commands::Summary { user } => {
            let service = build_service(&cli).await?;
            let stats = service.summary(user).await?;

            if cli.output == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&stats).unwrap_or_else(|_| "{}".to_string())
                );
            } else {
                println!("{}", format!("Memory summary for {user}").bold());
                println!("  total:      {}", stats.total);
                println!("  last 7d:    {}", stats.recent_7d);
                if let Some(newest) = stats.newest {
                    println!("  newest:     {}", newest.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                if let Some(oldest) = stats.oldest {
                    println!("  oldest:     {}", oldest.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                if !stats.by_category.is_empty() {
                    println!("  categories:");
                    for (category, count) in &stats.by_category {
                        println!("    {category}: {count}");
                    }
                }
            }
            Ok(())
        }
        Commands::Users => {
            let service = build_service(&cli).await?;
            let users = service.list_users().await?;

            if cli.output == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "users": users,
                        "user_count": users.len(),
                    }))
                    .unwrap_or_else(|_| "{}".to_string())
                );
            } else if users.is_empty() {
                println!("{}", "No users with stored memories.".dimmed());
            } else {
                for user in users {
                    println!("{user}");
                }
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = cli.output.clone();

    if let Err(e) = run(cli).await {
        output_error(&e.to_string(), &output);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_resolve() {
        assert!(matches!(resolve_backend("file"), Ok(StorageBackend::File)));
        assert!(matches!(
            resolve_backend("sqlite"),
            Ok(StorageBackend::Sqlite)
        ));
        assert!(matches!(
            resolve_backend("rocksdb"),
            Err(MementoError::Configuration(_))
        ));
    }

    #[test]
    fn recall_flags_win_over_parsed_values() {
        let request = merge_recall_request(
            "what did I tell you about work last week?",
            Some("personal".to_string()),
            Some(3),
            Some(5),
        );

        // The parser would say work/14; the explicit flags take precedence.
        assert_eq!(request.query.as_deref(), Some("about work"));
        assert_eq!(request.category.as_deref(), Some("personal"));
        assert_eq!(request.days_back, Some(3));
        assert_eq!(request.limit, Some(5));
    }

    #[test]
    fn natural_language_fills_open_flags() {
        let request =
            merge_recall_request("what did I tell you about work last week?", None, None, None);

        assert_eq!(request.query.as_deref(), Some("about work"));
        assert_eq!(request.category.as_deref(), Some("work"));
        assert_eq!(request.days_back, Some(14));
        assert_eq!(request.limit, None);
    }

    #[test]
    fn non_recall_text_becomes_a_raw_query() {
        let request = merge_recall_request("grocery list", None, None, None);
        assert_eq!(request.query.as_deref(), Some("grocery list"));
        assert_eq!(request.category, None);
        assert_eq!(request.days_back, None);
    }

    #[test]
    fn empty_query_keeps_only_the_flags() {
        let request = merge_recall_request("  ", Some("work".to_string()), None, Some(3));
        assert_eq!(request.query, None);
        assert_eq!(request.category.as_deref(), Some("work"));
        assert_eq!(request.limit, Some(3));
    }

    #[test]
    fn store_flags_parse() {
        let cli = Cli::try_parse_from([
            "memento-cli",
            "--backend",
            "sqlite",
            "--data-dir",
            "/tmp/m",
            "store",
            "--user",
            "alice",
            "remember that x",
            "--tags",
            "a,b",
            "--importance",
            "7",
        ])
        .expect("parse");

        assert_eq!(cli.backend, "sqlite");
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/m"));
        match cli.command {
            Commands::Store {
                user,
                text,
                tags,
                importance,
                ..
            } => {
                assert_eq!(user, "alice");
                assert_eq!(text, "remember that x");
                assert_eq!(tags.as_deref(), Some("a,b"));
                assert_eq!(importance, Some(7));
            }
            other => panic!("expected store, got a different command: {other:?}"),
        }
    }

    #[test]
    fn recall_defaults_to_an_empty_query() {
        let cli = Cli::try_parse_from(["memento-cli", "recall", "--user", "alice"])
            .expect("parse");
        match cli.command {
            Commands::Recall { user, query, .. } => {
                assert_eq!(user, "alice");
                assert_eq!(query, "");
            }
            other => panic!("expected recall, got a different command: {other:?}"),
        }
    }
}
