use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use guestflow::analytics::importer::DatasetImporter;
use guestflow::analytics::report::views::{FunnelReportSummary, Recommendation};
use guestflow::analytics::report::FunnelReport;
use guestflow::config::{AnalyticsConfig, AppConfig};
use guestflow::error::AppError;
use guestflow::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Guest Inquiry Funnel Analyzer",
    about = "Compute booking funnel analytics over guest inquiry exports, as a CLI or HTTP service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run funnel analytics over CSV exports from the command line
    Funnel {
        #[command(subcommand)]
        command: FunnelCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum FunnelCommand {
    /// Generate the funnel report for one set of exports
    Report(FunnelReportArgs),
}

#[derive(Args, Debug)]
struct FunnelReportArgs {
    /// Path to the contacts (inquiries) CSV export
    #[arg(long)]
    contacts: PathBuf,
    /// Path to the listings CSV export
    #[arg(long)]
    listings: PathBuf,
    /// Path to the users CSV export
    #[arg(long)]
    users: PathBuf,
    /// Override the minimum inquiry count for the neighborhood breakdown
    #[arg(long)]
    min_inquiries: Option<usize>,
    /// Include templated recommendations below the report
    #[arg(long)]
    insights: bool,
}

#[derive(Debug, Deserialize)]
struct FunnelReportRequest {
    contacts_csv: String,
    listings_csv: String,
    users_csv: String,
    #[serde(default)]
    min_inquiries: Option<usize>,
    #[serde(default)]
    include_insights: bool,
}

#[derive(Debug, Serialize)]
struct FunnelReportResponse {
    #[serde(flatten)]
    summary: FunnelReportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<Vec<Recommendation>>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Funnel {
            command: FunnelCommand::Report(args),
        } => run_funnel_report(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = build_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "guest funnel analytics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/funnel/report", post(funnel_report_endpoint))
        .with_state(state)
}

fn run_funnel_report(args: FunnelReportArgs) -> Result<(), AppError> {
    let FunnelReportArgs {
        contacts,
        listings,
        users,
        min_inquiries,
        insights,
    } = args;

    let mut analytics = AppConfig::load()?.analytics;
    if let Some(min) = min_inquiries {
        analytics.min_neighborhood_inquiries = min;
    }

    let dataset = DatasetImporter::from_paths(&contacts, &listings, &users)?;
    let report = dataset.report(&analytics);

    render_funnel_report(&report, &analytics);

    if insights {
        render_recommendations(&report.insights(&analytics));
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn funnel_report_endpoint(
    Json(payload): Json<FunnelReportRequest>,
) -> Result<Json<FunnelReportResponse>, AppError> {
    let FunnelReportRequest {
        contacts_csv,
        listings_csv,
        users_csv,
        min_inquiries,
        include_insights,
    } = payload;

    let mut analytics = AnalyticsConfig::default();
    if let Some(min) = min_inquiries {
        analytics.min_neighborhood_inquiries = min;
    }

    let dataset = DatasetImporter::from_readers(
        Cursor::new(contacts_csv.into_bytes()),
        Cursor::new(listings_csv.into_bytes()),
        Cursor::new(users_csv.into_bytes()),
    )?;
    let report = dataset.report(&analytics);

    let insights = if include_insights {
        Some(report.insights(&analytics))
    } else {
        None
    };

    Ok(Json(FunnelReportResponse {
        summary: report.summary(),
        insights,
    }))
}

fn render_funnel_report(report: &FunnelReport, analytics: &AnalyticsConfig) {
    println!("Guest inquiry funnel report");
    println!("Inquiries analyzed: {}", report.total_inquiries);

    println!("\nOverall metrics");
    println!("- booking rate: {}", fmt_rate(report.booking_rate));
    println!("- response rate: {}", fmt_rate(report.response_rate));
    println!("- acceptance rate: {}", fmt_rate(report.acceptance_rate));
    println!(
        "- avg response time: {}",
        fmt_hours(report.avg_response_time_hours)
    );
    println!(
        "- avg accept time: {}",
        fmt_hours(report.avg_accept_time_hours)
    );
    println!("- users with a profile: {}", fmt_rate(report.profile_rate));

    println!("\nFunnel stages");
    for entry in &report.stage_distribution {
        println!(
            "- {}: {} ({})",
            entry.stage.label(),
            entry.count,
            fmt_rate(Some(entry.share))
        );
    }

    println!("\nFunnel by contact channel");
    for row in &report.channel_funnel {
        let stages = row
            .stages
            .iter()
            .map(|entry| format!("{} {}", entry.stage.label(), fmt_rate(Some(entry.share))))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "- {}: {} ({} inquiries)",
            row.channel.label(),
            stages,
            row.inquiries
        );
    }

    println!("\nConversion by contact channel");
    for entry in &report.channel_conversion {
        println!(
            "- {}: {} ({} inquiries)",
            entry.group.label(),
            fmt_rate(Some(entry.booking_rate)),
            entry.inquiries
        );
    }

    println!("\nConversion by guest stage");
    for entry in &report.user_stage_conversion {
        println!(
            "- {}: {} ({} inquiries)",
            entry.group.label(),
            fmt_rate(Some(entry.booking_rate)),
            entry.inquiries
        );
    }

    println!("\nConversion by room type");
    for entry in &report.room_type_conversion {
        println!(
            "- {}: {} ({} inquiries)",
            entry.group.label(),
            fmt_rate(Some(entry.booking_rate)),
            entry.inquiries
        );
    }

    println!(
        "\nNeighborhoods (at least {} inquiries)",
        analytics.min_neighborhood_inquiries
    );
    if report.neighborhood_conversion.is_empty() {
        println!("- none above the threshold");
    } else {
        for entry in &report.neighborhood_conversion {
            println!(
                "- {}: {} ({} inquiries)",
                entry.group.label(),
                fmt_rate(Some(entry.booking_rate)),
                entry.inquiries
            );
        }
    }
}

fn render_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("\nRecommendations: none");
        return;
    }

    println!("\nRecommendations");
    for recommendation in recommendations {
        println!("- {}", recommendation.insight);
        println!("  action: {}", recommendation.action);
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate * 100.0),
        None => "n/a".to_string(),
    }
}

fn fmt_hours(hours: Option<f64>) -> String {
    match hours {
        Some(hours) => format!("{hours:.1}h"),
        None => "n/a".to_string(),
    }
}
