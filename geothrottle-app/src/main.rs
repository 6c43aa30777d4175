use anyhow::Context;
use clap::Parser;
use geothrottle::{
    location::StaticLocationProvider,
    logging,
    prelude::*,
    request::completion_channel,
    screen::ScreenServices,
};

/// Walk a straight line from a starting point, resolving the map center as it moves
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Starting latitude
    #[arg(long, default_value_t = 51.5007)]
    lat: f64,

    /// Starting longitude
    #[arg(long, default_value_t = -0.1246, allow_hyphen_values = true)]
    lng: f64,

    /// Minimum movement in metres before the address is looked up again
    #[arg(long, default_value_t = 50.0)]
    threshold: f64,

    /// Number of location fixes to simulate
    #[arg(long, default_value_t = 20)]
    steps: usize,

    /// Distance walked (northwards) between fixes
    #[arg(long, default_value_t = 15.0)]
    step_meters: f64,

    /// Delay between fixes
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Ask for walking directions back to the start at the end of the walk
    #[arg(long)]
    directions: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let mut options = ScreenOptions::default();
    options.throttle = ThrottleConfig::with_threshold(args.threshold)?;

    let (geocode_tx, geocode_rx) = completion_channel();
    let (route_tx, route_rx) = completion_channel();
    let services = ScreenServices {
        geocoder: NominatimGeocoder::new(options.geocoder.clone(), geocode_tx)
            .context("building geocoder")?,
        geocode_completions: geocode_rx,
        router: OsrmRouter::new(options.router.clone(), route_tx).context("building router")?,
        route_completions: route_rx,
    };

    let start = LatLng::new(args.lat, args.lng);
    let mut screen = MapScreen::new(
        options,
        StaticLocationProvider::authorized(start),
        services,
        Box::new(|outcome: AddressOutcome| match outcome {
            AddressOutcome::Resolved(address) => println!("📍 {}", address),
            AddressOutcome::NoAddressFound => println!("📍 no address available"),
            AddressOutcome::ResolutionFailed(err) => println!("⚠️  lookup failed: {}", err),
        }),
        Box::new(|outcome: RouteOutcome| match outcome {
            RouteOutcome::Found(route) => println!(
                "🧭 {:.0} m, about {} min",
                route.distance_meters,
                route.expected_travel_time.as_secs() / 60
            ),
            RouteOutcome::NoRoute => println!("🧭 no route"),
            RouteOutcome::Failed(err) => println!("⚠️  directions failed: {}", err),
        }),
    )?;

    let action = screen.activate();
    log::info!("location check: {:?}", action);

    let interval = Duration::from_millis(args.interval_ms);
    let mut position = start;
    for step in 1..=args.steps {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted at step {}", step);
                break;
            }
        }

        position = position.offset_meters(args.step_meters, 0.0);
        screen.location_mut().set_position(position);
        screen.on_locations_updated(&[position]);
        screen.tick();
        log::debug!("step {}: center {}", step, position);
    }

    if args.directions {
        screen.pan_to(start);
        screen.tick();
        screen.request_directions(TransportType::Walking)?;
    }

    // Give the last lookups a moment to land
    let deadline = Instant::now() + Duration::from_secs(5);
    while (screen.throttle().state() == ThrottleState::Resolving
        || screen.directions().is_routing())
        && Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(100)).await;
        screen.pump_completions();
    }

    screen.teardown();
    Ok(())
}
