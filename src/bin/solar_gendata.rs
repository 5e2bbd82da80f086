// Sample data loader: seeds the topic catalog and generated readings into the store
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use solar_telemetry::application::sample_data::{default_topics, generate, parse_options, Overrides};
use solar_telemetry::domain::TopicMetadata;
use solar_telemetry::infrastructure::config::load_config;
use solar_telemetry::infrastructure::sql_repository::SqlRepository;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "solar-gendata", about = "Load sample solar telemetry into the store")]
struct Cli {
    /// Database URL; defaults to `database.url` from the service configuration
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the UW Alder, Elm, Maple and Mercer topics.
    ///
    /// Existing topics with the same id are renamed.
    Topics,

    /// Generate sinusoidal readings from a JSON file of ranges and store them.
    Data {
        /// JSON list of `{start, end, topic_id, sample_rate, period,
        /// amplitude_cos, amplitude_sin, amplitude_offset, spread}` entries
        #[arg(long)]
        input_file: PathBuf,

        /// Use this topic for every entry
        #[arg(long)]
        topic_id: Option<i64>,

        /// Samples per second for every entry
        #[arg(long)]
        sample_rate: Option<f64>,

        /// Noise half-width for every entry
        #[arg(long)]
        spread: Option<f64>,

        /// Seed the noise for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Attach a metadata note to a topic.
    Meta {
        #[arg(long)]
        topic_id: i64,

        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if config.database.url.contains(":memory:") {
        tracing::warn!("Writing to an in-memory database; nothing will persist");
    }

    let repository = SqlRepository::connect(&config.database).await?;
    repository.migrate().await?;

    match cli.command {
        Commands::Topics => {
            let topics = default_topics();
            for topic in &topics {
                repository.insert_topic(topic).await?;
            }
            tracing::info!("Wrote {} topics to {}", topics.len(), config.database.url);
        }
        Commands::Data {
            input_file,
            topic_id,
            sample_rate,
            spread,
            seed,
        } => {
            let json = std::fs::read_to_string(&input_file)
                .with_context(|| format!("Failed to read {}", input_file.display()))?;
            let overrides = Overrides {
                topic_id,
                sample_rate,
                spread,
            };
            let options = parse_options(&json, &overrides)
                .with_context(|| format!("Invalid generation options in {}", input_file.display()))?;
            if options.is_empty() {
                tracing::info!("No ranges in {}", input_file.display());
                return Ok(());
            }
            for o in &options {
                tracing::info!("Generating data with {:?}", o);
            }

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let rows = generate(&options, &mut rng);
            repository.insert_observations(&rows).await?;
            tracing::info!("Wrote {} readings to {}", rows.len(), config.database.url);
        }
        Commands::Meta { topic_id, text } => {
            repository
                .insert_metadata(&TopicMetadata::new(topic_id, text))
                .await?;
            tracing::info!("Added metadata to topic {}", topic_id);
        }
    }

    Ok(())
}
