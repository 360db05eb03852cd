//! Skycast CLI host.
//!
//! Composes the two gateways: fetches weather, hands the snapshot to the
//! agent helper, and forwards user lines as queries. The gateways never
//! reference each other; this binary is the only composition point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use skycast_agent::{AgentGateway, ServiceSpec, START_WAIT};
use skycast_config::{
    config_dir, config_file_path, load_config, validate, SkycastConfig,
};
use skycast_core::AgentEvent;
use skycast_weather::WeatherGateway;

#[derive(Parser)]
#[command(name = "skycast")]
#[command(about = "Skycast — weather backend with a conversational helper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print current weather for the configured (or given) city
    Weather {
        /// City to fetch instead of the configured one
        #[arg(short, long)]
        city: Option<String>,
    },
    /// Start the AI helper and chat about the current weather
    Chat {
        /// Path to the helper service script
        #[arg(long)]
        service: PathBuf,
    },
    /// Validate the persisted settings
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = config_file_path(&config_dir());
    let settings = load_config(&config_path).await?;

    match cli.command {
        Commands::Weather { city } => run_weather(settings, config_path, city).await,
        Commands::Chat { service } => run_chat(settings, config_path, service).await,
        Commands::Check => run_check(&settings),
    }
}

async fn run_weather(
    settings: SkycastConfig,
    config_path: PathBuf,
    city: Option<String>,
) -> Result<()> {
    let weather = WeatherGateway::new(settings, config_path);
    if let Some(city) = city {
        weather.set_city(&city).await;
    }
    weather.fetch_weather().await?;

    let snap = weather.snapshot().await;
    println!("{}: {}", weather.city().await, snap.description);
    println!(
        "  {:.1}{} (feels like {:.1}{})",
        snap.temperature, snap.unit, snap.feels_like, snap.unit
    );
    println!(
        "  High {:.1}{} / Low {:.1}{} · humidity {}% · wind {:.1} · UV {}",
        snap.high, snap.unit, snap.low, snap.unit, snap.humidity, snap.wind_speed, snap.uv_index
    );
    Ok(())
}

async fn run_chat(
    settings: SkycastConfig,
    config_path: PathBuf,
    service: PathBuf,
) -> Result<()> {
    let agent = AgentGateway::new(ServiceSpec::python(service));
    agent.start().await?;
    agent.wait_ready(START_WAIT).await?;

    let weather = WeatherGateway::new(settings, config_path);
    match weather.fetch_weather().await {
        Ok(()) => {
            let snapshot = weather.snapshot().await;
            let city = weather.city().await;
            agent.submit_weather_context(&city, &snapshot).await?;
        }
        Err(e) => warn!(error = %e, "Starting chat without weather context"),
    }

    let mut events = agent.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AgentEvent::ResponseReceived { text } => println!("skycast> {}", text),
                AgentEvent::ErrorChanged { error } if !error.is_empty() => {
                    eprintln!("error: {}", error)
                }
                _ => {}
            }
        }
    });

    println!("Ask about the weather. /clear resets the transcript, /quit exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line == "/quit" {
            break;
        }
        if line == "/clear" {
            agent.clear_history().await;
            continue;
        }
        if let Err(e) = agent.submit_query(&line).await {
            warn!(error = %e, "Query rejected");
        }
    }

    agent.stop().await;
    Ok(())
}

fn run_check(settings: &SkycastConfig) -> Result<()> {
    let report = validate(settings);
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }
    if report.is_valid() {
        println!("Settings OK");
        Ok(())
    } else {
        anyhow::bail!("settings are invalid")
    }
}
