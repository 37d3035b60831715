use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use staycal::config::Config;
use staycal::engine::{
    Availability, Engine, EngineError, MonthView, RangeSelector, describe_stay, explain_incomplete,
};
use staycal::model::{BookingRequest, BookingStatus, CalendarDate, DateRange, Requester, parse_date};
use staycal::notify::NotifyHub;
use staycal::store::JsonFileStore;

/// Guesthouse bookings: calendars, requests and manager decisions.
///
/// Data lives as JSON files under `STAYCAL_DATA_DIR` (default `./data`).
/// `STAYCAL_TODAY=YYYY-MM-DD` pins the date used as "today".
#[derive(Parser)]
#[command(version, about, name = "staycal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill empty collections with the demo catalogue
    Seed,
    /// List active houses
    Houses,
    /// Show a month of availability for a house
    Calendar {
        #[arg(long)]
        house: String,
        /// YYYY-MM, defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
    },
    /// List bookings grouped by status
    Bookings,
    /// Request a booking (check-in and check-out are clicked in that order)
    Request {
        #[arg(long)]
        house: String,
        #[arg(long, value_parser = parse_day)]
        from: CalendarDate,
        #[arg(long, value_parser = parse_day)]
        to: CalendarDate,
        #[arg(long, default_value_t = 1)]
        guests: u32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Approve a pending booking
    Approve { id: String },
    /// Deny a booking
    Deny { id: String },
    /// Block a range of days for a house
    Holiday {
        #[arg(long)]
        house: String,
        #[arg(long, value_parser = parse_day)]
        from: CalendarDate,
        #[arg(long, value_parser = parse_day)]
        to: CalendarDate,
    },
    /// Check a user's credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn parse_day(s: &str) -> Result<CalendarDate, String> {
    parse_date(s).map_err(|_| format!("expected YYYY-MM-DD, got {s:?}"))
}

#[derive(Debug, Clone, Copy)]
struct Month {
    year: i32,
    month: u32,
}

fn parse_month(s: &str) -> Result<Month, String> {
    let err = || format!("expected YYYY-MM, got {s:?}");
    let (y, m) = s.split_once('-').ok_or_else(err)?;
    let year = y.parse().map_err(|_| err())?;
    let month = m.parse().map_err(|_| err())?;
    if !(1..=12).contains(&month) {
        return Err(err());
    }
    Ok(Month { year, month })
}

async fn show_calendar(
    engine: &Engine,
    house: &str,
    month: Option<Month>,
    today: CalendarDate,
) -> Result<(), EngineError> {
    use chrono::Datelike;

    let mut availability = Availability::loading(house);
    let occupancy = engine.load_availability(house).await?;
    availability.apply(occupancy);

    let Month { year, month } = month.unwrap_or(Month {
        year: today.year(),
        month: today.month(),
    });
    let view = MonthView::build(year, month, &availability, &Default::default(), today)
        .ok_or(EngineError::InvalidInput("month out of range"))?;
    print!("{view}");
    println!("legend: x booked, h holiday, - past, * today");
    Ok(())
}

async fn request_booking(
    engine: &Engine,
    request: BookingRequest,
    range: DateRange,
    today: CalendarDate,
) -> Result<(), EngineError> {
    let mut availability = Availability::loading(request.house_id.as_str());
    availability.apply(engine.load_availability(&request.house_id).await?);

    let selector = RangeSelector::new(true);
    selector.click(range.from, &availability, today);
    let selection = selector.click(range.to, &availability, today);
    if !selection.is_complete() {
        return Err(explain_incomplete(&range, &availability, today));
    }

    let booking = engine.create_booking(request, &selection, today).await?;
    println!("requested {} for {}: {}", booking.id, booking.house_title, describe_stay(&booking.range));
    println!("status: {}", booking.status);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    staycal::observability::init(config.metrics_port);

    std::fs::create_dir_all(&config.data_dir)?;
    let store = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let engine = Engine::new(store, Arc::new(NotifyHub::new()));
    let today = config.today();
    info!("data_dir: {}, today: {today}", config.data_dir.display());

    match args.command {
        Command::Seed => {
            let seeded = staycal::seed::seed_if_empty(&engine).await?;
            if seeded.is_empty() {
                println!("nothing to seed");
            }
            for c in seeded {
                println!("seeded {c}");
            }
        }
        Command::Houses => {
            for h in engine.houses().await? {
                println!("{:<24} {:<24} sleeps {}", h.id, h.title, h.capacity);
            }
        }
        Command::Calendar { house, month } => show_calendar(&engine, &house, month, today).await?,
        Command::Bookings => {
            let grouped = engine.bookings_by_status().await?;
            for (label, list) in [
                ("pending", &grouped.pending),
                ("approved", &grouped.approved),
                ("denied", &grouped.denied),
            ] {
                println!("{label} ({})", list.len());
                for b in list {
                    println!(
                        "  {:<28} {:<24} {} guests={} {} <{}>",
                        b.id, b.house_id, b.range, b.guests, b.requester.name, b.requester.email
                    );
                }
            }
        }
        Command::Request {
            house,
            from,
            to,
            guests,
            name,
            email,
            notes,
        } => {
            let request = BookingRequest {
                house_id: house,
                guests,
                requester: Requester {
                    name,
                    email,
                    user_id: None,
                },
                notes,
            };
            request_booking(&engine, request, DateRange::new(from, to), today).await?;
        }
        Command::Approve { id } => {
            let b = engine.update_booking_status(&id, BookingStatus::Approved).await?;
            println!("{} approved ({} {})", b.id, b.house_id, b.range);
        }
        Command::Deny { id } => {
            let b = engine.update_booking_status(&id, BookingStatus::Denied).await?;
            println!("{} denied ({} {})", b.id, b.house_id, b.range);
        }
        Command::Holiday { house, from, to } => {
            let h = engine.add_holiday(&house, DateRange::new(from, to)).await?;
            println!("holiday {} blocks {} on {}", h.id, h.range, h.house_id);
        }
        Command::Login { email, password } => match engine.login(&email, &password).await? {
            Some(user) => println!("ok: {} ({:?})", user.name, user.role),
            None => println!("invalid email or password"),
        },
    }
    Ok(())
}
