mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sgsearch_client::{PatternType, SearchClient};
use sgsearch_config::Config;

#[derive(Parser)]
#[command(name = "sgs", about = "Search code on a Sourcegraph instance", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Instance URL (e.g. https://sourcegraph.com)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Access token sent with every request
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search and print the matches
    Search {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Treat the query as a regular expression
        #[arg(short, long, conflicts_with = "structural")]
        regex: bool,

        /// Treat the query as a structural pattern
        #[arg(short, long)]
        structural: bool,

        /// Match case exactly (literal queries only)
        #[arg(short, long)]
        case_sensitive: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Print at most this many results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sgsearch=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    tracing::debug!(path = %Config::config_path().display(), "Loaded config");
    if let Some(project) = Config::load_project(&std::env::current_dir()?)? {
        config = Config::merge(&config, &project);
    }
    if let Some(url) = cli.url {
        config.location.url = url;
    }
    if let Some(token) = cli.token {
        config.location.token = Some(token);
    }

    match cli.command {
        Commands::Search {
            query,
            regex,
            structural,
            case_sensitive,
            json,
            limit,
        } => {
            let query = query.join(" ");
            let pattern_type = if regex {
                PatternType::Regexp
            } else if structural {
                PatternType::Structural
            } else {
                config.search.pattern_type
            };
            let case_sensitive = case_sensitive || config.search.case_sensitive;
            let limit = limit.or(config.search.max_results);

            let client = SearchClient::from_config(&config)?;
            let search = match pattern_type {
                PatternType::Literal => client.literal_search(&query, case_sensitive).await?,
                PatternType::Regexp => client.regex_search(&query).await?,
                PatternType::Structural => client.structural_search(&query).await?,
            };

            if json {
                println!("{}", output::render_json(&search, limit)?);
            } else {
                println!("{}", output::render_text(&search, limit));
            }
        }
        Commands::Config => {
            let path = Config::config_path();
            println!("Config path: {}", path.display());
            if config.location.token.is_some() {
                config.location.token = Some("********".to_string());
            }
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
