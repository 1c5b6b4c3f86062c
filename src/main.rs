use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use feedstream::config::{find_config_file, get_config, load_config, Config};
use feedstream::facade::{DEFAULT_PAGE, DEFAULT_SIZE, UNBOUNDED};
use feedstream::models::{Feed, FeedPost, QueryBuilder, SortOrder, Visibility};
use feedstream::FeedClient;
use futures_util::StreamExt;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// feedstream - Browse, search and post to a social feed from the command line
#[derive(Parser, Debug)]
#[command(name = "feedstream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse, search and post to a social feed", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Print items as JSON, one per line
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a single page of the feed
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
    },

    /// Stream feed items across pages
    Stream {
        /// Maximum number of items (default: everything)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Search feed items
    Search {
        /// Free text to search for
        text: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Maximum owner distance in kilometers
        #[arg(long)]
        max_distance_km: Option<f64>,

        #[arg(long, value_enum)]
        sort: Option<Sort>,

        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,
    },

    /// Publish a post on the current account's wall
    Post {
        message: String,

        #[arg(long, value_enum, default_value_t = Audience::Public)]
        visibility: Audience,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Sort {
    Date,
    Distance,
    Relevance,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Audience {
    Public,
    Friend,
    Private,
}

fn print_feed(feed: &Feed, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(feed)?);
    } else {
        let owner = feed
            .owner
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_default();
        println!(
            "{}\t{}\t{}",
            feed.id,
            owner,
            feed.message.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { level };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("feedstream={}", level)),
    );

    // logs go to stderr so item output stays pipeable
    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => get_config()?,
    };

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let client = FeedClient::from_config(&config)?;

    match cli.command {
        Commands::List { page, size } => {
            let mut items = client.list(page, size);
            while let Some(feed) = items.next().await {
                print_feed(&feed?, cli.json)?;
            }
        }
        Commands::Stream { limit } => {
            let mut items = client.stream(limit.unwrap_or(UNBOUNDED));
            let mut total = 0usize;
            while let Some(feed) = items.next().await {
                print_feed(&feed?, cli.json)?;
                total += 1;
            }
            if !cli.quiet {
                eprintln!("{} item(s)", total);
            }
        }
        Commands::Search {
            text,
            first_name,
            last_name,
            max_distance_km,
            sort,
            page,
            size,
        } => {
            let mut builder = QueryBuilder::new();
            if let Some(text) = text {
                builder = builder.set_text_to_search(text);
            }
            if let Some(first_name) = first_name {
                builder = builder.set_owner_first_name(first_name);
            }
            if let Some(last_name) = last_name {
                builder = builder.set_owner_last_name(last_name);
            }
            if let Some(km) = max_distance_km {
                builder = builder.set_owner_living_location_maximum_distance_in_kilometers(km);
            }
            if let Some(sort) = sort {
                builder = builder.set_order(match sort {
                    Sort::Date => SortOrder::Date,
                    Sort::Distance => SortOrder::Distance,
                    Sort::Relevance => SortOrder::Relevance,
                });
            }
            let query = builder.build();

            let mut results = client.search(&query, page, size);
            while let Some(result) = results.next().await {
                let result = result?;
                if !cli.quiet {
                    eprintln!("{} match(es)", result.matched_count);
                }
                for feed in &result.data {
                    print_feed(feed, cli.json)?;
                }
            }
        }
        Commands::Post {
            message,
            visibility,
        } => {
            let post = FeedPost::new(message).visibility(match visibility {
                Audience::Public => Visibility::Public,
                Audience::Friend => Visibility::Friend,
                Audience::Private => Visibility::Private,
            });

            let mut posted = client.send_wall_post(post);
            let mut any = false;
            while let Some(feed) = posted.next().await {
                print_feed(&feed?, cli.json)?;
                any = true;
            }
            if !any {
                anyhow::bail!("no current account; nothing was posted");
            }
        }
    }

    Ok(())
}
