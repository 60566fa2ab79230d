use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use clap::Parser;
use log::{error, info, warn};
use ttir_capture::{
    create_transport, CaptureConfig, CaptureSession, DeviceKind, SessionRegistry,
};
use ttir_core::PopError;

#[derive(Parser, Debug)]
#[command(
    name = "ttir-capture",
    version = env!("CARGO_PKG_VERSION"),
    about = "Capture IR pulse/space events from a TechnoTrend USB receiver",
    long_about = None,
)]
struct Cli {
    /// Приёмник: sim, ttusb
    #[arg(short, long, default_value = "sim")]
    device: String,
    /// Кол-во одновременных запросов приёма (минимум 2)
    #[arg(short = 'n', long, default_value = "2")]
    transfers: usize,
    /// Ограничение захвата (секунды). По умолчанию: до Ctrl+C
    #[arg(short = 't', long)]
    duration: Option<u64>,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value = "5")]
    stats_interval: u64,
    /// Тихий режим (только ошибки; события всё равно печатаются)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let device_kind: DeviceKind = match cli.device.parse() {
        Ok(d) => d,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let config = CaptureConfig {
        device: device_kind,
        num_transfers: cli.transfers,
        duration_secs: cli.duration,
        stats_interval_secs: cli.stats_interval,
    };

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let transport = match create_transport(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to open receiver: {e}");
            std::process::exit(1);
        }
    };

    let mut registry = SessionRegistry::new(4);
    let session_id = match registry.register("ttusbir-0") {
        Ok(id) => id,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let (mut session, reader) = match CaptureSession::attach(&config, transport) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to attach receiver: {e}");
            registry.unregister(session_id);
            std::process::exit(1);
        }
    };

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C — принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received — closing session and detaching...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    // Выводим конфигурацию
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Session       : {session_id}");
    info!("  Device        : {}", session.info().name);
    if let Some(serial) = &session.info().serial {
        info!("  Serial        : {serial}");
    }
    info!("  Transfers     : {}", config.num_transfers);
    match config.duration_secs {
        Some(secs) => info!("  Duration      : {secs}s"),
        None => info!("  Duration      : until Ctrl+C"),
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();
    let metrics = session.metrics();
    let stats_interval = Duration::from_secs(config.stats_interval_secs.max(1));
    let mut next_stats = session_start + stats_interval;

    session.open();

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        if let Some(limit) = config.duration_secs {
            if session_start.elapsed() >= Duration::from_secs(limit) {
                info!("Duration limit reached");
                break;
            }
        }

        if !cli.quiet && Instant::now() >= next_stats {
            info!(
                "{} events, {:.1}/s, {} dropped",
                metrics.events_emitted.load(Ordering::Relaxed),
                metrics.event_rate_hz(&session_start),
                metrics.events_dropped.load(Ordering::Relaxed),
            );
            next_stats += stats_interval;
        }

        // mode2-вывод: по строке на событие
        match reader.read_timeout(Duration::from_millis(100)) {
            Ok(ev) => println!("{ev}"),
            Err(PopError::Empty) => {}
            Err(PopError::Closed) => {
                error!("Event ring closed unexpectedly");
                break;
            }
        }
    }

    session.close();
    session.detach();
    registry.unregister(session_id);

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if metrics.events_dropped.load(Ordering::Relaxed) > 0 {
        warn!(
            "⚠ {} events dropped ({:.2}% loss). Consider reading the ring faster",
            metrics.events_dropped.load(Ordering::Relaxed),
            summary.drop_rate_pct
        );
    }

    if metrics.submit_errors.load(Ordering::Relaxed) > 0 {
        warn!(
            "⚠ {} submit errors occurred. The receiver may have been unplugged.",
            metrics.submit_errors.load(Ordering::Relaxed)
        );
        std::process::exit(1);
    }

    info!("✓ Capture complete");
}
