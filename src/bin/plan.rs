//! Build a weekly outreach plan from a company file and print it as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outreach_planner::cluster::{cluster_by_proximity, DEFAULT_MIN_POINTS};
use outreach_planner::config::{LocationSchedule, ScheduleSource};
use outreach_planner::estimator::{CancelToken, DistanceEstimator};
use outreach_planner::geocode::{geocode_missing, GeocoderConfig, MapsGeocoder};
use outreach_planner::haversine::HaversineEstimator;
use outreach_planner::models::{CompanyId, Coordinates};
use outreach_planner::osrm::{OsrmClient, OsrmConfig};
use outreach_planner::route::RouteOptions;
use outreach_planner::schedule::{PlannerOptions, WeeklyPlanner};
use outreach_planner::store::InMemoryCompanyStore;
use outreach_planner::traits::CompanyStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON array of company records
    #[arg(long)]
    companies: PathBuf,

    /// Location schedule (TOML). Uses the stock Wisconsin schedule if omitted.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Comma-separated company ids to plan. Defaults to every company.
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,

    /// OSRM base URL for road distances
    #[arg(long)]
    osrm_url: Option<String>,

    /// Geocoding API key; companies without coordinates are geocoded first
    #[arg(long, env = "GEOCODER_API_KEY")]
    geocoder_key: Option<String>,

    /// Default start point as "lat,lng"
    #[arg(long, value_parser = parse_origin)]
    origin: Option<Coordinates>,

    /// Timeout for every external call, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Maximum concurrent distance lookups
    #[arg(long, default_value_t = 4)]
    max_concurrent: usize,

    #[arg(long, default_value_t = false)]
    return_to_origin: bool,

    #[arg(long, default_value_t = false)]
    two_opt: bool,

    /// Print density-based proximity clusters instead of a weekly plan,
    /// using this neighborhood radius in degrees (0.05 is a good start)
    #[arg(long)]
    proximity_eps: Option<f64>,

    /// Minimum companies within the radius to seed a proximity cluster
    #[arg(long, default_value_t = DEFAULT_MIN_POINTS)]
    proximity_min_points: usize,
}

fn parse_origin(value: &str) -> Result<Coordinates, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| "expected lat,lng".to_string())?;
    let lat: f64 = lat.trim().parse().map_err(|err| format!("bad latitude: {err}"))?;
    let lng: f64 = lng.trim().parse().map_err(|err| format!("bad longitude: {err}"))?;
    Ok((lat, lng))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let schedule = match &cli.schedule {
        Some(path) => ScheduleSource::open(path)
            .with_context(|| format!("invalid location schedule {}", path.display()))?
            .current(),
        None => Arc::new(LocationSchedule::wisconsin_default()),
    };

    let mut store = InMemoryCompanyStore::from_json_file(&cli.companies)
        .with_context(|| format!("failed to load companies from {}", cli.companies.display()))?;

    if let Some(key) = &cli.geocoder_key {
        let geocoder = MapsGeocoder::new(GeocoderConfig {
            api_key: key.clone(),
            timeout_secs: cli.timeout_secs,
            ..Default::default()
        })?;
        let failures = geocode_missing(store.companies_mut(), &geocoder);
        info!(failures, "geocoding pass finished");
    }

    let ids: Vec<CompanyId> = if cli.ids.is_empty() {
        store.ids()
    } else {
        cli.ids.iter().map(|id| CompanyId::new(id.trim())).collect()
    };
    if ids.is_empty() {
        bail!("no companies to plan");
    }

    if let Some(eps) = cli.proximity_eps {
        let mut selected = Vec::with_capacity(ids.len());
        for id in &ids {
            let Some(company) = store.get(id)? else {
                bail!("unknown company id: {id}");
            };
            selected.push(company);
        }
        let clustering = cluster_by_proximity(&selected, eps, cli.proximity_min_points);
        let buckets: Vec<serde_json::Value> = clustering
            .labelled()
            .into_iter()
            .map(|(label, members)| {
                let ids: Vec<&str> = members.iter().map(|company| company.id.as_str()).collect();
                serde_json::json!({ "region": label, "company_ids": ids })
            })
            .collect();
        let unlocated: Vec<&str> = clustering
            .unlocated
            .iter()
            .map(|company| company.id.as_str())
            .collect();
        let output = serde_json::json!({ "clusters": buckets, "unlocated": unlocated });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let fallback = HaversineEstimator::default();
    let estimator = match &cli.osrm_url {
        Some(url) => {
            let client = OsrmClient::new(OsrmConfig {
                base_url: url.clone(),
                timeout_secs: cli.timeout_secs,
                ..Default::default()
            })?;
            DistanceEstimator::with_service(Arc::new(client), fallback)
        }
        None => DistanceEstimator::fallback_only(fallback),
    }
    .max_concurrent_lookups(cli.max_concurrent);

    let options = PlannerOptions {
        origin: cli.origin,
        route: RouteOptions {
            return_to_origin: cli.return_to_origin,
            two_opt: cli.two_opt,
            ..Default::default()
        },
    };
    let planner = WeeklyPlanner::new(schedule, estimator, options);

    let plan = planner.optimize(&store, &ids, &CancelToken::new())?;
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
