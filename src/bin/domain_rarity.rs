use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::{info, warn};

use domain_rarity::config::{AppConfig, CONFIG_PATH, CONFIG_PATH_VAR};
use domain_rarity::market::summarize;
use domain_rarity::rarity::RarityScorer;
use domain_rarity::recommend::recommend;
use domain_rarity::reporter;
use domain_rarity::strategy::{
    DEFAULT_RECENT_RATIO, DEFAULT_WINDOW_DAYS, StrategyConfig,
};
use domain_rarity::trending::TrendingRanker;
use domain_rarity::types::DomainRecord;

#[derive(Parser)]
#[command(name = "domain-rarity", about = "Domain rarity scoring and trending rankings")]
struct Args {
    /// Config file (defaults to $DOMAIN_RARITY_CONFIG or ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a single domain
    Score {
        /// Domain name, e.g. crypto.sol
        name: String,

        /// Tokenization timestamp (RFC 3339)
        #[arg(long)]
        tokenized_at: Option<DateTime<Utc>>,

        /// Number of recorded activity events
        #[arg(long)]
        activity: Option<u64>,

        /// Number of recorded sales
        #[arg(long)]
        sales: Option<u64>,
    },
    /// Rank domains read from a JSON file (or stdin) by trending score
    Rank {
        /// JSON array of domain records; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Maximum number of domains to return
        #[arg(long)]
        limit: Option<usize>,

        /// Override the configured pre-filter strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
    /// Market summary over domains read from a JSON file (or stdin)
    Summary {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Recommend domains similar to NAME from a JSON file (or stdin)
    Recommend {
        name: String,

        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Simple,
    RecencyWindow,
    RecentMix,
}

impl From<StrategyArg> for StrategyConfig {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Simple => StrategyConfig::Simple,
            StrategyArg::RecencyWindow => StrategyConfig::RecencyWindow {
                window_days: DEFAULT_WINDOW_DAYS,
            },
            StrategyArg::RecentMix => StrategyConfig::RecentMix {
                window_days: DEFAULT_WINDOW_DAYS,
                recent_ratio: DEFAULT_RECENT_RATIO,
            },
        }
    }
}

/// Accepted input shapes: a bare array or the indexer's paginated `items`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsInput {
    List(Vec<DomainRecord>),
    Page { items: Vec<DomainRecord> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Score {
            name,
            tokenized_at,
            activity,
            sales,
        } => {
            let scorer = RarityScorer::new(config.rarity)?;
            let domain = DomainRecord {
                tokenized_at,
                activity_count: activity,
                sales_count: sales,
                ..DomainRecord::new(name)
            };
            let breakdown = scorer.score(&domain)?;
            reporter::report_score(&breakdown);
        }
        Command::Rank {
            input,
            limit,
            strategy,
        } => {
            let mut rank_config = config.trending;
            if let Some(s) = strategy {
                rank_config.strategy = s.into();
            }
            let ranker = TrendingRanker::new(rank_config)?;
            let domains = load_records(input.as_deref())?;
            let limit = limit.unwrap_or(config.settings.default_limit);
            info!(
                "Ranking {} domains (strategy={}, limit={limit})",
                domains.len(),
                ranker.filter_name()
            );
            let ranked = ranker.rank_now(&domains, limit);
            reporter::report_ranking(&ranked);
        }
        Command::Summary { input } => {
            let domains = load_records(input.as_deref())?;
            reporter::report_summary(&summarize(&domains));
        }
        Command::Recommend { name, input, limit } => {
            let scorer = RarityScorer::new(config.rarity)?;
            let domains = load_records(input.as_deref())?;
            let target = domains
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(&name))
                .cloned()
                .unwrap_or_else(|| DomainRecord::new(name));
            let limit = limit.unwrap_or(config.settings.default_limit);
            let recs = recommend(&target, &domains, limit, &scorer, Utc::now())?;
            reporter::report_recommendations(&recs);
        }
    }

    Ok(())
}

/// Load the config from `--config`, `$DOMAIN_RARITY_CONFIG`, or the default
/// path. A missing default file falls back to built-in defaults; an explicit
/// path must exist.
fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let from_env = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    let path = explicit.map(Path::to_path_buf).or(from_env);

    match path {
        Some(path) => {
            let config = AppConfig::load(&path)?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                let config = AppConfig::load(default_path)?;
                info!("Loaded config from {}", default_path.display());
                Ok(config)
            } else {
                warn!("No {CONFIG_PATH} found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

fn load_records(path: Option<&Path>) -> Result<Vec<DomainRecord>> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let input: RecordsInput =
        serde_json::from_str(&contents).context("failed to parse domain records")?;
    Ok(match input {
        RecordsInput::List(records) | RecordsInput::Page { items: records } => records,
    })
}
