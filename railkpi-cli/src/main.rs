//! RailKPI CLI: metric pages, overview, comparisons, exports and the province map.
//!
//! Commands:
//! - `page`: render one time-series metric page, optionally over a sub-range
//! - `overview`: KPI cards and one-line insights for every metric
//! - `compare`: leading indicators, this period vs last
//! - `safety`: one quarter of lagging safety incidents
//! - `export`: write a metric, the comparison or the safety table as CSV
//! - `geo`: join regional indicators to province boundaries

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use railkpi_core::geo::{self, FeatureFill};
use railkpi_core::{
    feature_fills, CsvProvider, MetricKey, MetricShape, RegionalIndicator, SampleProvider,
    SeriesProvider,
};
use railkpi_runner::{
    build_overview, export_comparison_csv, export_json, export_overview_json, export_quarter_csv,
    export_series_csv, export_table_csv, render_page, safety_quarter, save_page_artifacts,
    DashboardConfig, OverviewReport, PageReport, PageRequest, SafetyQuarterView, TargetStatus,
};

#[derive(Parser)]
#[command(name = "railkpi", about = "RailKPI CLI: railway KPI derived metrics")]
struct Cli {
    /// Directory of `<metric>.csv` files. Uses the built-in sample data when absent.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter (e.g. `debug`, `railkpi_core=trace`). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a time-series metric page.
    Page {
        /// Metric key (e.g. derailment-rate, terminal-dwell).
        metric: MetricKey,

        /// First period label to include (e.g. Jan).
        #[arg(long)]
        from: Option<String>,

        /// Last period label to include (e.g. Jun).
        #[arg(long)]
        to: Option<String>,

        /// Overlay a trailing moving average.
        #[arg(long, default_value_t = false)]
        moving_average: bool,

        /// Moving-average window. Defaults to the page's configured window.
        #[arg(long)]
        window: Option<usize>,

        /// Dashboard TOML config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save report.json and series.csv under this directory.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// KPI cards and insights across all metrics.
    Overview {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Leading indicators, this period vs last.
    Compare {
        /// Only these categories (repeatable).
        #[arg(long = "only")]
        only: Vec<String>,
    },
    /// One quarter of lagging safety incidents.
    Safety {
        /// Quarter label. Defaults to the third quarter.
        #[arg(long)]
        quarter: Option<String>,

        /// Write the quarter as CSV to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export a metric as CSV: a metric key, `proactive` or `safety`.
    Export {
        #[arg(value_parser = parse_export_target)]
        target: MetricKey,

        /// Output file. Prints to stdout when absent.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Join regional leading indicators to province boundaries.
    Geo {
        /// Boundary GeoJSON file or URL. Falls back to `[geo]` in the config.
        #[arg(long)]
        boundaries: Option<String>,

        /// Dashboard TOML config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_export_target(s: &str) -> Result<MetricKey, String> {
    match s {
        "proactive" => Ok(MetricKey::ProactiveIndicators),
        "safety" => Ok(MetricKey::SafetyIncidents),
        other => other.parse(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let provider = make_provider(cli.data_dir.as_deref());
    debug!(provider = provider.name(), "using data provider");

    match cli.command {
        Commands::Page {
            metric,
            from,
            to,
            moving_average,
            window,
            config,
            json,
            save,
        } => {
            let request = PageRequest {
                metric_key: metric,
                from,
                to,
                show_moving_average: moving_average,
                window,
            };
            run_page(provider.as_ref(), &request, config.as_deref(), json, save.as_deref())
        }
        Commands::Overview { json } => run_overview(provider.as_ref(), json),
        Commands::Compare { only } => run_compare(provider.as_ref(), &only),
        Commands::Safety { quarter, out } => {
            run_safety(provider.as_ref(), quarter.as_deref(), out.as_deref())
        }
        Commands::Export { target, out } => run_export(provider.as_ref(), target, out.as_deref()),
        Commands::Geo { boundaries, config } => {
            run_geo(provider.as_ref(), boundaries.as_deref(), config.as_deref())
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("bad log filter '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn make_provider(data_dir: Option<&Path>) -> Box<dyn SeriesProvider> {
    match data_dir {
        Some(dir) => Box::new(CsvProvider::new(dir)),
        None => Box::new(SampleProvider::new()),
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(p) => DashboardConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(DashboardConfig::default()),
    }
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_page(
    provider: &dyn SeriesProvider,
    request: &PageRequest,
    config_path: Option<&Path>,
    json: bool,
    save: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let page = config.page(request.metric_key);
    let report = render_page(provider, &page, request)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_page_summary(&report);
    }

    if let Some(dir) = save {
        let run_dir = save_page_artifacts(&report, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_overview(provider: &dyn SeriesProvider, json: bool) -> Result<()> {
    let report = build_overview(provider)?;
    if json {
        println!("{}", export_overview_json(&report)?);
    } else {
        print_overview(&report);
    }
    Ok(())
}

fn run_compare(provider: &dyn SeriesProvider, only: &[String]) -> Result<()> {
    let full = provider.comparison(MetricKey::ProactiveIndicators)?;
    let comparison = if only.is_empty() { full } else { full.filter(only) };
    if comparison.is_empty() {
        bail!("no indicators match {only:?}");
    }

    println!();
    println!("=== {} ===", MetricKey::ProactiveIndicators.info().title);
    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>9} {:>7}",
        "Indicator", "Last", "This", "Change", "Change %", "Ratio"
    );
    for row in comparison.rows() {
        let ratio = row
            .ratio()
            .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
        println!(
            "{:<24} {:>8} {:>8} {:>+8} {:>+8.1}% {:>7}",
            row.category,
            row.last,
            row.this,
            row.change(),
            row.pct_change(),
            ratio
        );
    }
    println!();
    println!(
        "Total:          {} -> {} ({:+})",
        comparison.total_last(),
        comparison.total_this(),
        comparison.total_change()
    );
    if let Some(avg) = comparison.average_ratio() {
        println!("Avg Ratio:      {avg:.2}");
    }
    if let Some(row) = comparison.biggest_increase() {
        println!("Biggest Rise:   {} ({:+})", row.category, row.change());
    }
    if let Some(row) = comparison.biggest_decrease() {
        println!("Biggest Fall:   {} ({:+})", row.category, row.change());
    }
    Ok(())
}

fn run_safety(provider: &dyn SeriesProvider, quarter: Option<&str>, out: Option<&Path>) -> Result<()> {
    let table = provider.table(MetricKey::SafetyIncidents)?;
    let view = safety_quarter(&table, quarter)?;
    print_quarter(&view);

    if let Some(path) = out {
        let csv = export_quarter_csv(&view)?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved to: {}", path.display());
    }
    Ok(())
}

fn run_export(provider: &dyn SeriesProvider, key: MetricKey, out: Option<&Path>) -> Result<()> {
    let csv = match key.info().shape {
        MetricShape::Series => export_series_csv(&provider.full_series(key)?)?,
        MetricShape::Comparison => export_comparison_csv(&provider.comparison(key)?)?,
        MetricShape::Table => export_table_csv(&provider.table(key)?)?,
    };
    match out {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved {key} to: {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn run_geo(
    provider: &dyn SeriesProvider,
    boundaries: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let geo_config = match (boundaries, config.geo) {
        (Some(location), Some(mut g)) => {
            g.boundaries_url = location.to_string();
            g
        }
        (Some(location), None) => railkpi_runner::GeoConfig::new(location),
        (None, Some(g)) => g,
        (None, None) => bail!("no boundaries given: pass --boundaries or set [geo] in the config"),
    };

    let source = geo_config.source()?;
    let collection = source
        .load()
        .with_context(|| format!("failed to load boundaries from {}", source.describe()))?;
    let rows = provider.regional(MetricKey::ProactiveIndicators)?;

    let index = geo::BoundaryIndex::new(&collection);
    let joined = geo::join_rows(rows.iter(), |r| r.region.as_str(), &index);
    let fills = feature_fills(&collection, &rows, |r| r.region.as_str(), &geo_config.palette());

    print_fills(&fills);
    let unmatched: Vec<&str> = joined
        .iter()
        .filter(|j| !j.is_matched())
        .map(|j| j.row.region.as_str())
        .collect();
    if !unmatched.is_empty() {
        println!();
        println!("Unmatched regions: {}", unmatched.join(", "));
    }
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_page_summary(report: &PageReport) {
    let d = &report.derived;
    let first = report.series.first().map(|(l, _)| l).unwrap_or("-");
    let last = report.series.last().map(|(l, _)| l).unwrap_or("-");

    println!();
    println!("=== {} ===", report.label());
    println!("Provider:       {}", report.provider);
    println!("Periods:        {first} to {last} ({})", report.series.len());
    println!("Current:        {}", d.current);
    println!("Previous:       {}", d.previous);
    println!("Delta:          {:+.2} ({:+.2}%)", d.delta, d.delta_pct);
    println!("Average:        {:.2}", d.period_average);
    println!("Min / Max:      {} / {}", d.range_min, d.range_max);
    println!("Trend:          {}", report.trend);
    if let Some(t) = &report.target {
        let status = match t.status {
            TargetStatus::Met => "met",
            TargetStatus::Missed => "missed",
        };
        println!("Target:         {} ({status}, margin {:+.1})", t.target, t.margin);
    }
    if let Some(split) = &report.availability {
        println!(
            "Fleet:          {}% available / {}% in maintenance",
            split.available, split.in_maintenance
        );
    }
    if let Some(overlay) = &report.overlay {
        println!();
        println!("--- {}-period moving average ---", d.window);
        for ((label, value), ma) in report.series.points().zip(overlay) {
            println!("{label:<10} {value:>10} {ma:>10.3}");
        }
    }
}

fn print_overview(report: &OverviewReport) {
    println!();
    println!("=== Overview ===");
    for card in &report.cards {
        println!("{:<28} {}", card.title, card.display_value());
    }
    println!();
    println!("--- Insights ---");
    for insight in &report.insights {
        println!("- {}", insight.text);
    }
}

fn print_quarter(view: &SafetyQuarterView) {
    println!();
    println!("=== {} ===", view.quarter);
    for (category, value) in view.counts.points() {
        println!("{category:<36} {value:>6}");
    }
    println!();
    println!("Total:          {}", view.total);
    println!("Top Category:   {} ({})", view.top_category, view.top_value);
    println!("Min / Max:      {} / {}", view.min, view.max);
}

fn print_fills(fills: &[FeatureFill<'_, RegionalIndicator>]) {
    println!();
    println!("=== Province Map ===");
    for fill in fills {
        let indicators: Vec<&str> = fill.rows.iter().map(|r| r.indicator.as_str()).collect();
        let detail = if indicators.is_empty() {
            "(no data)".to_string()
        } else {
            indicators.join(", ")
        };
        println!("{:<24} {:<8} {detail}", fill.name, fill.color);
    }
}
