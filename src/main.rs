use clap::Parser;
use tokio_util::sync::CancellationToken;

use hpb_harvest::Harvest;
use hpb_harvest::config::HarvestConfig;
use hpb_harvest::records::HarvestResult;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Starting harvest for URL: {}", args.url);

    let mut config = match &args.config {
        Some(path) => match HarvestConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => HarvestConfig::default(),
    };

    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    // Ctrl-C ends the harvest after the page in flight, keeping what was
    // collected so far
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ::log::info!("Interrupt received, finishing current page");
                cancel.cancel();
            }
        });
    }

    let mut harvest = Harvest::new(&args.url)
        .with_config(config)
        .with_cancellation(cancel);
    if let Some(max_pages) = args.max_pages {
        harvest = harvest.with_max_pages(max_pages);
    }

    let start_time = std::time::Instant::now();

    let result = match harvest.run().await {
        Ok(result) => result,
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Harvested {} salons in {:.2} seconds",
        result.items.len(),
        start_time.elapsed().as_secs_f64()
    );

    if result.items.is_empty() {
        ::log::error!("No salons found for {}", args.url);
        std::process::exit(1);
    }

    if args.json {
        print_json(&result);
    } else {
        print_summary(&result);
    }
}

/// Prints the result as JSON with the derived price fields materialized
fn print_json(result: &HarvestResult) {
    let salons: Vec<serde_json::Value> = result
        .items
        .iter()
        .map(|salon| {
            let stats = salon.price_stats();
            serde_json::json!({
                "name": salon.name,
                "url": salon.url,
                "counters": salon.counters,
                "prices": salon.prices,
                "min_price": stats.min,
                "max_price": stats.max,
                "average_price": stats.average,
            })
        })
        .collect();

    let output = serde_json::json!({
        "title": result.title,
        "salon_count": result.items.len(),
        "salons": salons,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => ::log::error!("Failed to serialize result: {}", e),
    }
}

/// Prints a human-readable listing, one salon per line
fn print_summary(result: &HarvestResult) {
    println!("{} ({} salons)", result.title, result.items.len());

    for salon in &result.items {
        let counters = salon
            .counters
            .iter()
            .map(|(name, count)| format!("{} {}", name, count))
            .collect::<Vec<_>>()
            .join(", ");

        match salon.price_stats().average {
            Some(average) => println!(
                "  {} [{}] prices {:?} avg {}",
                salon.name, counters, salon.prices, average
            ),
            None => println!("  {} [{}]", salon.name, counters),
        }
    }
}
