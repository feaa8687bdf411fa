use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

use flightboard::config::ServiceConfig;
use flightboard::engine::WindowConfig;
use flightboard::model::{BookingRecord, RosterRule, Span};
use flightboard::service::{DayBoard, SchedulingService};
use flightboard::source::InMemorySource;

/// Input file: one tenant's bookings and roster for a day, plus an optional
/// candidate booking to check.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default = "default_tenant")]
    tenant: String,
    day: NaiveDate,
    #[serde(default)]
    window: Option<WindowConfig>,
    #[serde(default)]
    bookings: Vec<BookingRecord>,
    #[serde(default)]
    roster: Vec<RosterRule>,
    #[serde(default)]
    candidate: Option<Span>,
    #[serde(default)]
    exclude: Option<Ulid>,
}

fn default_tenant() -> String {
    "default".into()
}

#[derive(Debug, Serialize)]
struct UnavailableReport {
    aircraft: Vec<String>,
    instructors: Vec<String>,
    clashes: Vec<Ulid>,
}

#[derive(Debug, Serialize)]
struct Report {
    slot_labels: Vec<String>,
    board: DayBoard,
    #[serde(skip_serializing_if = "Option::is_none")]
    unavailable: Option<UnavailableReport>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: flightboard <scenario.json>")?;
    let scenario: Scenario = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

    let mut config = ServiceConfig::from_env();
    if let Some(window) = scenario.window {
        config.window = window;
    }
    flightboard::observability::init(config.metrics_port)?;

    info!("flightboard scenario {path}");
    info!("  tenant: {}", scenario.tenant);
    info!("  day: {}", scenario.day);
    info!("  bookings: {}", scenario.bookings.len());
    info!("  roster rules: {}", scenario.roster.len());

    let source = InMemorySource::new();
    for record in scenario.bookings {
        source.insert(&scenario.tenant, record);
    }
    let service = SchedulingService::new(source, config);

    let board = service
        .day_board(&scenario.tenant, scenario.day, &scenario.roster)
        .await?;

    let unavailable = match scenario.candidate {
        Some(candidate) => {
            let unavailable = service
                .unavailable_resources(&scenario.tenant, candidate, scenario.exclude)
                .await?;
            let clashes = service
                .clashes(&scenario.tenant, candidate, scenario.exclude)
                .await?;
            let mut aircraft: Vec<String> = unavailable.aircraft.into_iter().collect();
            let mut instructors: Vec<String> = unavailable.instructors.into_iter().collect();
            aircraft.sort();
            instructors.sort();
            Some(UnavailableReport {
                aircraft,
                instructors,
                clashes,
            })
        }
        None => None,
    };

    let report = Report {
        slot_labels: board.slots.iter().map(|s| s.label()).collect(),
        board,
        unavailable,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
