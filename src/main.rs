use anyhow::Result;
use clap::Parser;
use pitch_assist::{CallSession, Config, SessionConfig};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "pitch-assist", about = "Live call assistant streaming client")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/pitch-assist")]
    config: String,

    /// Override the generated session id
    #[arg(long)]
    session_id: Option<String>,

    /// Stop automatically after this many seconds (default: run until Ctrl-C)
    #[arg(long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let mut session_config = SessionConfig::from_config(&cfg);
    if let Some(session_id) = args.session_id {
        session_config.session_id = session_id;
    }

    info!("Session: {}", session_config.session_id);
    info!("Endpoint: {}", session_config.endpoint);

    let session = CallSession::new(session_config);
    session.start().await?;

    match args.duration {
        Some(secs) => {
            info!("Capturing for {}s", secs);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        }
        None => {
            info!("Capturing until Ctrl-C");
            tokio::signal::ctrl_c().await?;
        }
    }

    let stats = session.stop().await?;

    let transcript = session.transcript().await;
    if transcript.is_empty() {
        println!("(no transcript)");
    } else {
        println!("--- Transcript ---");
        for segment in &transcript {
            let marker = if segment.is_final { " " } else { "~" };
            println!("{} [{:>7.1}s] {}", marker, segment.start, segment.text);
        }
    }

    let analysis = session.analysis().await;
    if let Some(location) = &analysis.script_location {
        println!("Script location: {}", location);
    }
    for point in &analysis.key_points {
        println!("  * {}", point);
    }

    info!(
        "Session finished: {:.1}s, {} frames sent, {} dropped, {} segments, {} objections, {} errors",
        stats.duration_secs,
        stats.frames_sent,
        stats.frames_dropped,
        stats.segment_count,
        stats.objection_count,
        stats.error_count
    );

    Ok(())
}
