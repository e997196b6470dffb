mod api;
mod server;

use channel_intel::analysis::{AnalysisReport, BatchAnalyzer, CancelToken};
use channel_intel::config::AppConfig;
use channel_intel::extract::extract_target_info;
use channel_intel::record::load_records;
use channel_intel::youtube::{extract_channel_id, extract_video_id, is_valid_youtube_url};
use channel_intel::{
    export, extract, format_float, format_number, format_percent, Error, IdentifierCategory, Result,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "channel-intel", about = "Identifier extraction and engagement scoring for video metadata")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract contact handles and profile links from text
    Extract(ExtractArgs),
    /// Score a JSON file of video/channel records
    Analyze(AnalyzeArgs),
    /// Derive a target profile from the first channel record
    Target(RecordsArgs),
    /// Resolve a YouTube URL to its video or channel id
    Resolve(ResolveArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct ExtractArgs {
    #[arg(long)]
    text: Option<String>,
    /// Only print one category
    #[arg(long)]
    category: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Csv,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    records: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
struct RecordsArgs {
    records: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ResolveArgs {
    url: String,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = AppConfig::load(cli.config)?;
    if let Some(path) = config_path.as_ref().filter(|path| path.exists()) {
        info!(path = %path.display(), "config loaded");
    }

    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Analyze(args) => run_analyze(args, &config).await,
        Command::Target(args) => run_target(&args.records),
        Command::Resolve(args) => run_resolve(&args.url),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let text = read_text(args.text)?;
    let identifiers = extract(&text);

    if let Some(name) = args.category {
        let category: IdentifierCategory = name.parse()?;
        for value in identifiers.get(category) {
            println!("{}", value);
        }
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&identifiers)?);
    Ok(())
}

async fn run_analyze(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let records = load_records(&args.records)?;

    if matches!(args.format, OutputFormat::Csv) {
        return export::write_records_csv(io::stdout().lock(), &records, &config.export.csv_separator);
    }

    let analyzer = BatchAnalyzer::from_config(config);
    let cancel = CancelToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let report = tokio::task::spawn_blocking(move || {
        analyzer.run(&records, &cancel, |event| {
            info!(percent = event.percent, "{}", event.message);
        })
    })
    .await
    .map_err(|err| Error::InvalidInput(format!("analysis task failed: {}", err)))?;

    match args.format {
        OutputFormat::Json => export::write_report_json(io::stdout().lock(), &report),
        _ => {
            print_summary(&report);
            Ok(())
        }
    }
}

fn print_summary(report: &AnalysisReport) {
    let summary = &report.summary;
    if report.cancelled {
        println!("Analysis cancelled after {} records.", summary.total_videos);
    }
    println!("Videos analyzed: {}", summary.total_videos);
    println!(
        "Totals: views {} | likes {} | comments {}",
        format_number(summary.total_views),
        format_number(summary.total_likes),
        format_number(summary.total_comments)
    );
    println!(
        "Average engagement rate: {}",
        format_percent(summary.average_engagement_rate)
    );
    println!(
        "Engagement distribution: high {} | medium {} | low {}",
        summary.engagement_distribution.high,
        summary.engagement_distribution.medium,
        summary.engagement_distribution.low
    );

    if !summary.top_performers.is_empty() {
        println!("\nTop performers:");
        for top in &summary.top_performers {
            println!("- {} ({}) {}", top.title, top.id, format_float(top.performance_score, 2));
        }
    }

    println!("\nPer video:");
    for video in &report.videos {
        println!(
            "- {}: engagement {} ({}) | virality {} | performance {} ({}) | growth {}",
            video.id,
            format_float(video.engagement.engagement_score, 2),
            video.engagement.engagement_level.label(),
            format_float(video.engagement.virality_score, 2),
            format_float(video.performance.performance_score, 2),
            video.performance.performance_category.label(),
            format_float(video.performance.growth_potential, 2)
        );
    }
}

fn run_target(path: &Path) -> Result<()> {
    let records = load_records(path)?;
    let target = extract_target_info(&records);
    if target.is_empty() {
        return Err(Error::InvalidInput("no channel record found".to_string()));
    }
    println!("{}", serde_json::to_string_pretty(&target)?);
    Ok(())
}

fn run_resolve(url: &str) -> Result<()> {
    if let Some(channel_id) = extract_channel_id(url) {
        println!("channel {}", channel_id);
        return Ok(());
    }
    if let Some(video_id) = extract_video_id(url) {
        println!("video {}", video_id);
        return Ok(());
    }
    if is_valid_youtube_url(url) {
        return Err(Error::InvalidInput(format!("unsupported YouTube URL: {}", url)));
    }
    Err(Error::InvalidInput(format!("not a YouTube URL or id: {}", url)))
}

fn read_text(arg: Option<String>) -> Result<String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "channel_intel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
