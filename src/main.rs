mod config;
mod error;
mod i18n;
mod plugins;
mod tracker;

use clap::{Arg, ArgAction, ArgMatches, Command};
use config::TrackerConfig;
use i18n::{get_messages, Locale, Messages};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use plugins::registry::{PluginRegistry, SelectionInput, SelectionOrigin, SimulateCliConfig};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracker::engine::Tracker;
use tracker::events::TrackerEvent;
use tracker::model::{UploadId, UploadStatus};
use tracker::steps::FixedStep;
use tracker::view;

fn build_cli(registry: &PluginRegistry) -> Command {
    let simulate = Command::new("simulate")
        .about("Upload documents and watch them being processed")
        .arg(
            Arg::new("paths")
                .help("Files or directories to upload, as picked in a file dialog")
                .action(ArgAction::Append)
                .num_args(0..),
        )
        .arg(
            Arg::new("interval_ms")
                .long("interval-ms")
                .help("Milliseconds between two progress steps of one upload")
                .default_value("500")
                .num_args(1),
        )
        .arg(
            Arg::new("max_step")
                .long("max-step")
                .help("Largest progress increment per step, in percent")
                .default_value("20")
                .num_args(1),
        )
        .arg(
            Arg::new("fixed_step")
                .long("fixed-step")
                .help("Use this exact increment for every step instead of random ones")
                .conflicts_with("seed")
                .num_args(1),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for the progress increments (reproducible runs)")
                .num_args(1),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .help("Interface language (en, zh)")
                .default_value("en")
                .num_args(1),
        );

    let simulate = registry.augment_simulate_command(simulate);

    Command::new("study-intake")
        .about("Study material upload panel - simulated document processing")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(simulate)
}

fn fixed_step(m: &ArgMatches) -> anyhow::Result<Option<f64>> {
    let step = m.get_one::<String>("fixed_step").map(|s| s.parse::<f64>()).transpose()?;
    if let Some(v) = step {
        if !(v.is_finite() && v > 0.0) {
            anyhow::bail!("--fixed-step must be a positive number, got {}", v);
        }
    }
    Ok(step)
}

fn tracker_config(m: &ArgMatches) -> anyhow::Result<TrackerConfig> {
    let interval_ms: u64 = m.get_one::<String>("interval_ms").map(|s| s.parse::<u64>()).transpose()?.unwrap_or(config::DEFAULT_TICK_MS);
    let max_step: f64 = m.get_one::<String>("max_step").map(|s| s.parse::<f64>()).transpose()?.unwrap_or(config::DEFAULT_MAX_STEP);
    let seed: Option<u64> = m.get_one::<String>("seed").map(|s| s.parse::<u64>()).transpose()?;
    let locale = m.get_one::<String>("locale").map(|s| Locale::from_str(s)).unwrap_or_default();

    if !(max_step.is_finite() && max_step > 0.0) {
        anyhow::bail!("--max-step must be a positive number, got {}", max_step);
    }

    Ok(TrackerConfig {
        tick: Duration::from_millis(interval_ms.max(1)),
        max_step,
        seed,
        locale,
        ..TrackerConfig::default()
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let registry = PluginRegistry::with_defaults();
    let app = build_cli(&registry);
    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("simulate", m)) => {
            let config = tracker_config(m)?;
            let fixed = fixed_step(m)?;
            let messages = get_messages(config.locale);

            let mut cfg = SimulateCliConfig::default();
            if let Some(paths) = m.get_many::<String>("paths") {
                cfg.inputs
                    .extend(paths.map(|p| SelectionInput::new(p.clone(), SelectionOrigin::Picker)));
            }
            registry.apply_simulate_matches(m, &mut cfg)?;

            println!("{}", messages.panel_title);
            println!("{}", messages.panel_subtitle);
            println!("{} ({})", messages.drop_hint, messages.accept_hint);
            println!();

            let report = registry.resolve_all(&cfg.inputs, &cfg.resolve_ctx).await;
            for w in &report.warnings {
                println!("[{}] {}", messages.info_prefix, w);
            }
            for e in &report.errors {
                println!("[{}] {}", messages.error_prefix, e);
            }
            if report.files.is_empty() {
                anyhow::bail!("no documents selected");
            }

            let tracker = match fixed {
                Some(step) => Tracker::with_steps(config, Box::new(FixedStep(step))),
                None => Tracker::new(config),
            };
            // closes the tracker on every exit path, including early errors
            let _panel = tracker.guard();
            let ui_task = tokio::spawn(render_events(tracker.subscribe(), messages, styles()?));

            let count = report.files.len();
            for file in report.files {
                tracker.intake(file).await?;
            }
            tracing::info!(count, "{}", messages.session_started);

            tokio::select! {
                _ = tracker.wait_idle() => {}
                r = tokio::signal::ctrl_c() => {
                    r?;
                }
            }
            // the panel goes away either way; stop whatever is still running
            tracker.shutdown().await;

            let _ = ui_task.await;

            let uploads = tracker.uploads().await;
            let finished = uploads.iter().all(|u| u.status == UploadStatus::Completed);
            println!();
            println!("{}", if finished { messages.session_finished } else { messages.session_cancelled });
            println!();
            println!("{} - {}", messages.list_title, messages.list_subtitle);
            for card in view::project_all(&uploads, messages) {
                println!("{}", view::render_card(&card, messages));
            }
            println!();
            println!("{}", messages.tips_title);
            for tip in messages.tips {
                println!("  {} {}", view::StatusIcon::Check.glyph(), tip);
            }
        }
        _ => {}
    }

    Ok(())
}

struct Styles {
    pending: ProgressStyle,
    bar: ProgressStyle,
}

fn styles() -> anyhow::Result<Styles> {
    Ok(Styles {
        pending: ProgressStyle::with_template("{spinner:.green} {prefix} {wide_msg}")?.tick_chars("|/-\\ "),
        bar: ProgressStyle::with_template("{prefix} {bar:40.cyan/blue} {pos:>3}% {wide_msg}")?,
    })
}

async fn render_events(mut rx: broadcast::Receiver<TrackerEvent>, messages: &'static Messages, styles: Styles) {
    let mp = MultiProgress::new();
    let mut bars: HashMap<UploadId, ProgressBar> = HashMap::new();

    loop {
        let evt = match rx.recv().await {
            Ok(e) => e,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "renderer fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match evt {
            TrackerEvent::UploadAdded { upload_id, name, size_label, mime_type } => {
                let pb = mp.add(ProgressBar::new(100));
                pb.set_style(styles.pending.clone());
                pb.set_prefix(format!("[{name}]"));
                pb.enable_steady_tick(Duration::from_millis(120));
                pb.set_message(format!("{} • {}", size_label, mime_type));
                bars.insert(upload_id, pb);
            }
            TrackerEvent::Progress { upload_id, progress } => {
                if let Some(pb) = bars.get(&upload_id) {
                    if pb.position() == 0 {
                        pb.set_style(styles.bar.clone());
                        pb.set_message(messages.processing_label);
                    }
                    pb.set_position(progress.round() as u64);
                }
            }
            TrackerEvent::StatusChanged { upload_id, status } => {
                if let Some(pb) = bars.get(&upload_id) {
                    let badge = view::status_badge(status, messages);
                    if status.is_terminal() {
                        pb.finish_with_message(badge.label);
                    } else {
                        pb.set_message(badge.label);
                    }
                }
            }
            TrackerEvent::Notification(n) => {
                let _ = mp.println(format!("[{}] {}: {}", messages.toast_prefix, n.title, n.description));
            }
            TrackerEvent::AllSettled => {
                tracing::debug!("all uploads settled");
            }
            TrackerEvent::TornDown { cancelled } => {
                if cancelled > 0 {
                    let _ = mp.println(format!("[{}] {} ({})", messages.info_prefix, messages.session_cancelled, cancelled));
                }
                for pb in bars.values() {
                    if !pb.is_finished() {
                        pb.abandon_with_message(messages.session_cancelled);
                    }
                }
                break;
            }
        }
    }
}
