use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use geo_shopper::core::export::{render_csv, render_xlsx};
use geo_shopper::core::flatten::item_rows;
use geo_shopper::domain::model::SearchRequest;
use geo_shopper::domain::ports::Storage;
use geo_shopper::utils::logger;
use geo_shopper::utils::validation::{validate_path, Validate};
use geo_shopper::{AppState, ConfigArgs, LocalStorage};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Xlsx,
    Csv,
}

#[derive(Parser)]
#[command(name = "search_export")]
#[command(about = "Run one market search and write the results to a spreadsheet")]
struct Args {
    #[command(flatten)]
    common: ConfigArgs,

    /// Search text in any language
    #[arg(short, long)]
    query: String,

    /// Market code, e.g. sk or de
    #[arg(short, long)]
    geolocation: String,

    /// Keep single-seller products instead of multi-seller ones
    #[arg(long)]
    single_source: bool,

    #[arg(long, value_enum, default_value = "xlsx")]
    format: Format,

    /// Directory the export is written to
    #[arg(short, long, default_value = "./output")]
    output_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = args.common.load().context("failed to load configuration")?;

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(args.common.verbose);
    } else {
        logger::init_logger(args.common.verbose);
    }

    config.validate().context("invalid configuration")?;
    validate_path("output_path", &args.output_path)?;

    let state = AppState::from_config(&config)?;
    let request = SearchRequest::new(args.query.as_str(), args.geolocation.as_str());

    let result_set = if args.single_source {
        state.search.search_single_source(&request).await?
    } else {
        state.search.search_multi_source(&request).await?
    };

    tracing::info!(
        "📦 {} product(s) found in {} for '{}'",
        result_set.total_results,
        result_set.geolocation,
        result_set.translated_query
    );

    let rows: Vec<_> = result_set
        .results
        .iter()
        .flat_map(|item| item_rows(item, &result_set.geolocation, &result_set.translated_query))
        .collect();
    state.buffer.append_many(rows).await?;

    let records = state.buffer.snapshot().await;
    let document = match args.format {
        Format::Xlsx => render_xlsx(&records, Utc::now())?,
        Format::Csv => render_csv(&records, Utc::now())?,
    };

    let storage = LocalStorage::new(args.output_path.clone());
    storage
        .write_file(&document.filename, &document.bytes)
        .await
        .with_context(|| format!("failed to write {}", document.filename))?;

    let written = storage.full_path(&document.filename);
    tracing::info!("✅ Exported {} row(s)", records.len());
    tracing::info!("📁 Output saved to: {}", written);
    println!("📁 Output saved to: {}", written);
    Ok(())
}
