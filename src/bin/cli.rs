//! Availability CLI
//!
//! Command-line interface for a running availability server:
//! - Mark ranges or single units available
//! - Query ranges at any resolution
//! - List entities and check status
//! - Generate a config file

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "availability")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track binary availability over time")]
#[command(long_about = "Mark entities available or unavailable over time ranges and\nquery them at any resolution, from seconds to days.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8083", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark a time range available (or unavailable with --off)
    Set {
        /// Entity id
        id: String,
        /// Range start. Supports: "now", "today", ISO 8601, Unix timestamp
        from: String,
        /// Range end (exclusive)
        to: String,
        /// Mark the range unavailable
        #[arg(long)]
        off: bool,
    },

    /// Query a time range
    Get {
        /// Entity id
        id: String,
        /// Range start (default: now minus --last)
        #[arg(long)]
        from: Option<String>,
        /// Range end (default: now)
        #[arg(long)]
        to: Option<String>,
        /// Window length when --from is omitted (e.g., 2h, 1d, 1w)
        #[arg(short, long, default_value = "1d")]
        last: String,
        /// Reporting resolution (sec, min, 5min, 15min, hour, day, <n>s)
        #[arg(short, long)]
        resolution: Option<String>,
        /// Reduction policy for coarser resolutions (all, any, majority)
        #[arg(short, long)]
        policy: Option<String>,
    },

    /// Read or write the unit containing one instant
    At {
        /// Entity id
        id: String,
        /// Instant (default: now)
        #[arg(short, long)]
        time: Option<String>,
        /// Write this value instead of reading
        #[arg(long)]
        set: Option<bool>,
    },

    /// List all entities
    List,

    /// Show system status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = reqwest::Client::new();
    let base = format!("{}/api/v1/availability", cli.api_url.trim_end_matches('/'));

    match cli.command {
        Commands::Set { id, from, to, off } => {
            let from = parse_time(&from)?;
            let to = parse_time(&to)?;

            let body = serde_json::json!({
                "from": from,
                "to": to,
                "available": !off,
            });

            let response = client
                .put(entity_url(&base, &id, "range"))
                .json(&body)
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let ack = expect_success(response).await?;

            println!(
                "Marked {} {} from {} to {} (aligned to {})",
                id,
                if off { "unavailable" } else { "available" },
                from.to_rfc3339(),
                to.to_rfc3339(),
                ack["resolution"].as_str().unwrap_or("-")
            );
        }

        Commands::Get {
            id,
            from,
            to,
            last,
            resolution,
            policy,
        } => {
            let to = match to {
                Some(t) => parse_time(&t)?,
                None => Utc::now(),
            };
            let from = match from {
                Some(f) => parse_time(&f)?,
                None => to
                    .checked_sub_signed(parse_duration(&last)?)
                    .with_context(|| format!("Window of {} reaches before the earliest time", last))?,
            };

            let mut query = vec![("from", from.to_rfc3339()), ("to", to.to_rfc3339())];
            if let Some(r) = resolution {
                query.push(("resolution", r));
            }
            if let Some(p) = policy {
                query.push(("policy", p));
            }

            let response = client
                .get(entity_url(&base, &id, "range"))
                .query(&query)
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let data = expect_success(response).await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                _ => print_range(&data),
            }
        }

        Commands::At { id, time, set } => {
            let at = match time {
                Some(t) => parse_time(&t)?,
                None => Utc::now(),
            };

            match set {
                Some(available) => {
                    let body = serde_json::json!({ "at": at, "available": available });
                    let response = client
                        .put(entity_url(&base, &id, "at"))
                        .json(&body)
                        .send()
                        .await
                        .with_context(|| connect_hint(&cli.api_url))?;
                    expect_success(response).await?;
                    println!("Set {} at {} to {}", id, at.to_rfc3339(), available);
                }
                None => {
                    let response = client
                        .get(entity_url(&base, &id, "at"))
                        .query(&[("at", at.to_rfc3339())])
                        .send()
                        .await
                        .with_context(|| connect_hint(&cli.api_url))?;
                    let data = expect_success(response).await?;

                    match cli.format.as_str() {
                        "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                        _ => println!(
                            "{} at {}: {}",
                            id,
                            at.to_rfc3339(),
                            if data["available"].as_bool().unwrap_or(false) {
                                "available"
                            } else {
                                "unavailable"
                            }
                        ),
                    }
                }
            }
        }

        Commands::List => {
            let response = client
                .get(&base)
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let data = expect_success(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            let entries = data["availabilities"].as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                println!("No entities yet.");
                println!();
                println!("Mark your first range with:");
                println!("  availability set room-1 2024-01-01T09:00:00Z 2024-01-01T17:00:00Z");
            } else {
                println!("{:<24} {:<10} {:<10} {}", "ID", "Res", "Segments", "Bytes");
                println!("{}", "-".repeat(56));

                for entry in entries {
                    println!(
                        "{:<24} {:<10} {:<10} {}",
                        entry["id"].as_str().unwrap_or("-"),
                        entry["resolution"].as_str().unwrap_or("-"),
                        entry["segments"].as_u64().unwrap_or(0),
                        entry["size_bytes"].as_u64().unwrap_or(0)
                    );
                }
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url.trim_end_matches('/')))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;
            let health = expect_success(response).await?;

            println!("Availability v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!(
                "API Status: {}",
                health["status"].as_str().unwrap_or("unknown")
            );
            println!();
            println!("Store:");
            println!("  Entities: {}", health["entities"].as_u64().unwrap_or(0));
            println!("  Segments: {}", health["segments"].as_u64().unwrap_or(0));
            println!("  Bytes: {}", health["size_bytes"].as_u64().unwrap_or(0));

            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!();
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = availability::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Entity sub-resource URL with the id percent-encoded as one path segment
fn entity_url(base: &str, id: &str, tail: &str) -> String {
    format!("{}/{}/{}", base, urlencoding::encode(id), tail)
}

fn connect_hint(api_url: &str) -> String {
    format!(
        "Cannot connect to availability API at {} (start it with: cargo run --bin availability-api)",
        api_url
    )
}

async fn expect_success(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["error"]["message"].as_str().unwrap_or("no details");
        bail!("Request failed ({}): {}", status, message);
    }
    Ok(response.json().await?)
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    match s.trim() {
        "now" => Ok(Utc::now()),
        "today" => Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .context("Cannot compute start of today"),
        other => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(other) {
                Ok(dt.with_timezone(&Utc))
            } else if let Ok(ts) = other.parse::<i64>() {
                DateTime::from_timestamp(ts, 0)
                    .with_context(|| format!("Timestamp out of range: {}", ts))
            } else {
                bail!("Invalid time format: {}. Use: now, today, ISO 8601, Unix seconds", other)
            }
        }
    }
}

fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let duration = if let Some(hours) = s.strip_suffix('h') {
        Duration::try_hours(hours.parse()?)
    } else if let Some(days) = s.strip_suffix('d') {
        Duration::try_days(days.parse()?)
    } else if let Some(weeks) = s.strip_suffix('w') {
        Duration::try_weeks(weeks.parse()?)
    } else {
        bail!("Invalid duration format: {}. Use: 2h, 7d, 4w", s)
    };

    duration.with_context(|| format!("Duration out of range: {}", s))
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

/// One line per unit: start time and a bar for available units
fn print_range(data: &serde_json::Value) {
    let units = match data["available"].as_array() {
        Some(u) if !u.is_empty() => u,
        _ => {
            println!("No data for the selected time range");
            return;
        }
    };

    let from = data["from"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let to = data["to"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    println!(
        "Resolution: {} (stored at {})",
        data["resolution"].as_str().unwrap_or("-"),
        data["internal_resolution"].as_str().unwrap_or("-")
    );
    println!("{}", "-".repeat(40));

    let step = match (from, to) {
        (Some(f), Some(t)) => Some((f, (t - f) / units.len() as i32)),
        _ => None,
    };

    for (i, unit) in units.iter().enumerate() {
        let label = step
            .map(|(f, s)| (f + s * i as i32).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| i.to_string());
        let mark = if unit.as_u64() == Some(1) { "#" } else { "." };
        println!("{:<20} {}", label, mark);
    }

    println!("{}", "-".repeat(40));
    println!(
        "Available: {}/{} units",
        data["count"].as_u64().unwrap_or(0),
        units.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        let t = parse_time("2024-03-04T09:00:00Z").unwrap();
        assert_eq!(t.timestamp(), 1709542800);
        assert_eq!(parse_time("1709542800").unwrap(), t);
        assert!(parse_time("next tuesday").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert!(parse_duration("3y").is_err());
        assert!(parse_duration("99999999999999h").is_err());
        assert!(parse_duration("-99999999999999w").is_err());
    }

    #[test]
    fn test_entity_url() {
        let base = "http://localhost:8083/api/v1/availability";
        assert_eq!(
            entity_url(base, "room-1", "range"),
            "http://localhost:8083/api/v1/availability/room-1/range"
        );
        assert_eq!(
            entity_url(base, "a/b?c#d e", "at"),
            "http://localhost:8083/api/v1/availability/a%2Fb%3Fc%23d%20e/at"
        );
    }
}
