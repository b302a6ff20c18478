//! CLI probe.
//!
//! # Responsibility
//! - Verify `voyager_core` linkage and the configured database end to end.
//! - Print a one-line summary of the current days view.

use voyager_core::{AggregateResult, CoreConfig, Gateway, ItineraryRepository};

#[tokio::main]
async fn main() {
    println!("voyager_core ping={}", voyager_core::ping());
    println!("voyager_core version={}", voyager_core::core_version());

    let config = CoreConfig::from_env();
    if let Err(err) = voyager_core::init_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let gateway = match Gateway::open(&config.db_path) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", config.db_path.display());
            std::process::exit(1);
        }
    };
    log::info!(
        "event=cli_probe module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let repo = ItineraryRepository::new(gateway);
    match repo.load_days().await {
        AggregateResult::Success(days) => {
            let activities: usize = days
                .iter()
                .map(|day| day.activities.as_ref().map_or(0, Vec::len))
                .sum();
            let upcoming = days.iter().filter(|day| !day.is_expired()).count();
            println!(
                "days={} upcoming={upcoming} activities={activities}",
                days.len()
            );
        }
        AggregateResult::Empty => println!("days=0"),
        AggregateResult::Error(message) => {
            eprintln!("failed to load days: {message}");
            std::process::exit(1);
        }
    }
}
