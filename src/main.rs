use mimalloc::MiMalloc;
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::{Context, Result};
use cl_advisor::utils::settings::{resolve_settings, save_settings};
use cl_advisor::{
    advise, write_report, CachedSnapshot, DeviceReport, OpenClProbe, ProbingSnapshot,
    SnapshotProvider,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Советы по локальной памяти OpenCL-устройств
#[derive(Parser, Debug)]
#[command(name = "cl_advisor")]
#[command(version)]
struct Args {
    /// Файл настроек (по умолчанию cl_advisor.json, если он есть)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Путь к снимку топологии
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Пересоздать снимок, даже если он уже есть
    #[arg(long, conflicts_with = "no_probe")]
    refresh: bool,

    /// Только читать готовый снимок, не запускать зонд
    #[arg(long)]
    no_probe: bool,

    /// Вывести отчёты в JSON
    #[arg(long)]
    json: bool,

    /// Подробный отчёт и отладочные логи
    #[arg(short, long)]
    verbose: bool,

    /// Сохранить действующие настройки в файл и выйти
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = resolve_settings(args.config.as_deref())?;
    if let Some(snapshot) = args.snapshot {
        settings.snapshot_path = snapshot;
    }

    if let Some(path) = args.write_config {
        save_settings(&settings, &path)?;
        info!(path = %path.display(), "настройки сохранены");
        return Ok(());
    }

    let provider: Box<dyn SnapshotProvider> = if args.no_probe {
        Box::new(CachedSnapshot::new(&settings.snapshot_path))
    } else {
        Box::new(
            ProbingSnapshot::new(&settings.snapshot_path, OpenClProbe::from_settings(&settings))
                .refresh(args.refresh),
        )
    };
    let topology = provider
        .load()
        .context("не удалось получить топологию OpenCL")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let reports: Vec<DeviceReport> = advise(&topology).collect();
        serde_json::to_writer_pretty(&mut out, &reports)?;
        writeln!(out)?;
    } else {
        write_report(&topology, &mut out, args.verbose)?;
    }
    out.flush()?;
    Ok(())
}
