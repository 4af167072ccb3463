//! RailKPI Runner: page rendering, overview insights, dashboard config, export.
//!
//! This crate builds on `railkpi-core` to provide:
//! - One config-driven render path for every time-series metric page
//! - Overview KPI cards, insights and the safety quarter view
//! - TOML dashboard configuration
//! - CSV/JSON export and artifact bundles

pub mod config;
pub mod export;
pub mod overview;
pub mod page;

pub use config::{ColorScheme, ConfigError, DashboardConfig, GeoConfig, PageConfig};
pub use export::{
    export_comparison_csv, export_json, export_overview_json, export_quarter_csv,
    export_series_csv, export_table_csv, import_json, import_series_csv, load_page_artifacts,
    save_page_artifacts,
};
pub use overview::{
    build_overview, default_quarter, safety_quarter, Insight, KpiCard, OverviewReport,
    ProactiveSummary, SafetyQuarterView, SpanChange, DEFAULT_QUARTER_INDEX,
};
pub use page::{
    render_page, AvailabilitySplit, PageError, PageReport, PageRequest, TargetCheck, TargetStatus,
    SCHEMA_VERSION,
};
