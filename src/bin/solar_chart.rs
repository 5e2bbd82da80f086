// Command-line chart client: fetch, downsample and print telemetry series
use std::sync::Arc;

use anyhow::Context;
use chrono::DateTime;
use clap::Parser;
use solar_telemetry::application::chart_loader::ChartLoader;
use solar_telemetry::domain::observation::parse_timestamp;
use solar_telemetry::domain::{DataQuery, Granularity, SampleRate};
use solar_telemetry::infrastructure::api_client::ApiClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "solar-chart", about = "Print downsampled solar telemetry series")]
struct Args {
    /// Base URL of the telemetry service
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Topic id to chart; repeat for several. Defaults to the first topic.
    #[arg(long = "topic")]
    topics: Vec<i64>,

    /// Start of the range (ISO-8601). Defaults to the earliest stored reading.
    #[arg(long)]
    start: Option<String>,

    /// End of the range (ISO-8601). Defaults to the latest stored reading.
    #[arg(long)]
    end: Option<String>,

    /// Fraction of readings the server keeps, in [0, 1]
    #[arg(long, default_value = "0.05")]
    sample_rate: String,

    /// Keep one reading per year, month, day, hour, minute, second or millisecond
    #[arg(long)]
    granularity: Option<String>,

    /// Print the topic catalog and exit
    #[arg(long)]
    list_topics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    // Reject bad options before touching the network.
    let sample_rate: SampleRate = args.sample_rate.parse()?;
    let granularity = args
        .granularity
        .as_deref()
        .map(str::parse::<Granularity>)
        .transpose()?;

    let loader = ChartLoader::new(Arc::new(ApiClient::new(args.url.clone())));
    let (topics, bounds) = loader
        .catalog()
        .await
        .with_context(|| format!("Failed to reach {}", args.url))?;

    if args.list_topics {
        for topic in &topics {
            println!("{:>6}  {:<40}  {}", topic.topic_id, topic.meter(), topic.metric());
        }
        return Ok(());
    }

    let topic_ids = if args.topics.is_empty() {
        topics.first().map(|t| vec![t.topic_id]).unwrap_or_default()
    } else {
        args.topics.clone()
    };

    let start = match &args.start {
        Some(s) => parse_timestamp("start", s)?,
        None => bounds.earliest.context("No data stored; pass --start")?,
    };
    let end = match &args.end {
        Some(s) => parse_timestamp("end", s)?,
        None => bounds.latest.context("No data stored; pass --end")?,
    };

    let query = DataQuery::new(topic_ids, start, end, sample_rate, granularity)?;
    tracing::info!("Querying {:?}", query);

    let Some(series) = loader.load(&query, &topics).await? else {
        return Ok(());
    };

    if series.is_empty() {
        println!("No readings in range.");
    }
    for s in series {
        println!("# {} ({} points)", s.name, s.points.len());
        for point in s.points {
            let when = DateTime::from_timestamp_millis(point.time_ms)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
                .unwrap_or_else(|| point.time_ms.to_string());
            println!("{}  {}", when, point.value);
        }
    }

    Ok(())
}
