use anyhow::{anyhow, Result};
use check_icmp::config::Config;
use check_icmp::ping::{CorrelationEvent, PingResult, PingStatus, Pinger};
use clap::Parser;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

mod cli;

use cli::Args;

const EXIT_OK: i32 = 0;
const EXIT_WARNING: i32 = 1;
const EXIT_CRITICAL: i32 = 2;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn print_event(event: &CorrelationEvent) {
    match event {
        CorrelationEvent::Sender { sequence, .. } => println!("sent icmp_seq={}", sequence),
        CorrelationEvent::Receiver(reply) => match reply.ttl {
            Some(ttl) => println!(
                "{} bytes from {}: icmp_seq={} ttl={}",
                reply.size, reply.source, reply.sequence, ttl
            ),
            None => println!(
                "{} bytes from {}: icmp_seq={}",
                reply.size, reply.source, reply.sequence
            ),
        },
    }
}

fn millis(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => format!("{:.3}ms", d.as_secs_f64() * 1000.0),
        None => String::from("-"),
    }
}

/// Monitoring style summary line and exit code.
fn summarize(host: &str, result: &PingResult) -> (String, i32) {
    let stats = &result.statistics;
    let (label, code) = match result.status {
        PingStatus::Error => ("CRITICAL", EXIT_CRITICAL),
        _ if stats.received == 0 => ("CRITICAL", EXIT_CRITICAL),
        PingStatus::Done if stats.loss_percent == 0.0 => ("OK", EXIT_OK),
        _ => ("WARNING", EXIT_WARNING),
    };
    let mut line = format!(
        "{} - {}: rta {}, lost {:.0}% ({} sent, {} received",
        label,
        host,
        millis(stats.avg_rtt),
        stats.loss_percent,
        stats.transmitted,
        stats.received
    );
    if stats.duplicates > 0 {
        line.push_str(&format!(", {} duplicates", stats.duplicates));
    }
    line.push(')');
    if let (Some(min), Some(max)) = (stats.min_rtt, stats.max_rtt) {
        line.push_str(&format!(" min/max {}/{}", millis(Some(min)), millis(Some(max))));
    }
    if let Some(error) = &result.error {
        line.push_str(&format!(" error: {}", error));
    }
    (line, code)
}

/// Status line for a run that produced no result.
fn critical(host: &str, error: &anyhow::Error) -> (String, i32) {
    (format!("CRITICAL - {}: {}", host, error), EXIT_CRITICAL)
}

async fn run_check(args: &Args) -> Result<PingResult> {
    let pinger = Pinger::from_config(Config::from(args));
    let mut progress_rx = pinger.get_progress_receiver();
    let printer = tokio::spawn(async move {
        loop {
            match progress_rx.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = pinger.ping_async().await;
    // Closing the progress channel lets the printer finish.
    drop(pinger);
    printer
        .await
        .map_err(|e| anyhow!("progress printer failed: {}", e))?;
    Ok(outcome?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let (line, code) = match run_check(&args).await {
        Ok(result) => summarize(&args.host, &result),
        Err(e) => {
            log::error!("{}", e);
            critical(&args.host, &e)
        }
    };
    println!("{}", line);
    std::process::exit(code);
}
