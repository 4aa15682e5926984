mod telemetry;

use clap::Parser;
use rand::Rng;
use std::time::Duration;
use telemetry::Reading;
use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(about = "Posts synthetic sensor readings to the readings ingestor")]
struct Args {
    /// Base URL of the ingestor
    #[arg(long, env = "INGESTOR_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Number of simulated devices
    #[arg(long, env = "DEVICES", default_value_t = 10)]
    devices: usize,

    /// Seconds between two rounds of readings
    #[arg(long, env = "INTERVAL_SECS", default_value_t = 5)]
    interval_secs: u64,

    /// Temperature above which a reading is flagged as an alert
    #[arg(long, env = "ALERT_THRESHOLD", default_value_t = 35.0)]
    alert_threshold: f64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let endpoint = format!("{}/api/v1/readings/ingest", args.url.trim_end_matches('/'));
    info!("Starting readings simulator");
    info!(
        "Target: {}, Devices: {}, Interval: {}s",
        endpoint, args.devices, args.interval_secs
    );

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let round: Vec<Reading> = {
                    let mut rng = rand::thread_rng();
                    (0..args.devices)
                        .map(|i| generate_reading(&mut rng, format!("sim-{}", i), args.alert_threshold))
                        .collect()
                };

                for reading in round {
                    match client.post(&endpoint).form(&reading).send().await {
                        Ok(resp) if resp.status().is_success() => {
                            sent += 1;
                            debug!("Posted reading for {}", reading.device_id);
                        }
                        Ok(resp) => {
                            warn!("Ingestor answered {} for {}", resp.status(), reading.device_id);
                        }
                        Err(e) => {
                            error!("Failed to post reading for {}: {}", reading.device_id, e);
                        }
                    }
                }

                info!("Posted {} readings so far", sent);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, posted {} readings", sent);
                break;
            }
        }
    }
}

fn generate_reading(rng: &mut impl Rng, device_id: String, alert_threshold: f64) -> Reading {
    let temperature = if rng.gen_bool(0.05) {
        rng.gen_range(35.0..50.0) // 5% heat spikes
    } else {
        rng.gen_range(22.0..32.0)
    };

    let humidity = if rng.gen_bool(0.05) {
        rng.gen_range(0.0..100.0) // 5% outliers
    } else {
        rng.gen_range(40.0..80.0)
    };

    Reading {
        device_id,
        temperature,
        humidity,
        alert: u8::from(temperature > alert_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_follows_threshold() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let reading = generate_reading(&mut rng, "sim-0".to_string(), 30.0);
            assert_eq!(reading.alert == 1, reading.temperature > 30.0);
        }
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["simulator"]).unwrap();
        assert_eq!(args.devices, 10);
        assert_eq!(args.interval_secs, 5);
    }
}
