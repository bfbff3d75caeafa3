use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Receiver;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use firtap::audio::{AudioSource, DeviceSource};
use firtap::config::{FirConfig, parse_coefficients};
use firtap::filter::{ChannelSink, CoefficientPublisher, DiagnosticEvent, FirFilter};
use firtap::save_wav;

#[derive(Parser, Debug)]
#[command(name = "firtap")]
#[command(about = "Live block FIR filter on the default input device", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (runs until input closes otherwise)
    #[arg(short = 'd', long)]
    duration: Option<f32>,

    /// Save the filtered signal to a mono WAV file on exit
    #[arg(short = 'r', long)]
    record: Option<PathBuf>,

    /// Level report interval in seconds
    #[arg(long, default_value = "1.0")]
    report_interval: f32,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.config {
        Some(path) => FirConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FirConfig::default(),
    };

    let (mut filter, publisher) = FirFilter::with_publisher();
    if let Some(taps) = config.filter.resolve()? {
        filter.set_bulk(&taps)?;
    }

    let (diag_tx, diag_rx) = crossbeam_channel::bounded(64);
    if config.diagnostics.report_denormals {
        filter.set_diagnostic_sink(Box::new(ChannelSink::new(diag_tx)));
    }

    println!("=== firtap - block FIR filter ===");
    println!("Sample rate: {} Hz", config.audio.sample_rate);
    println!("Block size: {} samples", config.audio.block_size);
    println!(
        "Input channel: {} of {}",
        config.audio.channel, config.audio.channels
    );
    println!("Taps: {}", filter.num_taps());
    println!("Type a coefficient list on stdin to replace the filter.");
    println!();

    spawn_control_reader(publisher);

    let mut source = DeviceSource::new(&config.audio)?;
    let recorded = run_processing_loop(&mut source, &mut filter, &diag_rx, &args)?;

    if let Some(path) = &args.record {
        let name = path.to_string_lossy().to_string();
        save_wav(&name, &recorded, source.sample_rate())
            .with_context(|| format!("Failed to write {}", name))?;
        println!("Wrote {} samples to {}", recorded.len(), name);
    }

    Ok(())
}

/// Reads coefficient lists from stdin and publishes them to the filter
///
/// A single value becomes a one-tap gain; anything else replaces the list.
fn spawn_control_reader(publisher: CoefficientPublisher) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let result = parse_coefficients(&line).and_then(|taps| match taps.as_slice() {
                [gain] => publisher.publish_scalar(*gain),
                _ => publisher.publish_bulk(&taps),
            });
            match result {
                Ok(()) => log::info!("Coefficient update queued"),
                Err(e) => log::warn!("Coefficient update ignored: {}", e),
            }
        }
    });
}

fn run_processing_loop(
    source: &mut dyn AudioSource,
    filter: &mut FirFilter,
    diag_rx: &Receiver<DiagnosticEvent>,
    args: &Args,
) -> anyhow::Result<Vec<f64>> {
    let started = Instant::now();
    let deadline = args.duration.map(Duration::from_secs_f32);
    let report_interval = Duration::from_secs_f32(args.report_interval);
    let mut last_report = Instant::now();

    let mut recorded = Vec::new();
    let mut output = Vec::new();
    let mut energy_in = 0.0f64;
    let mut energy_out = 0.0f64;
    let mut count = 0usize;

    while let Some(block) = source.next_block()? {
        output.resize(block.len(), 0.0);
        if let Err(e) = filter.process_block(&block, &mut output) {
            log::error!("Block rejected: {}", e);
            continue;
        }

        energy_in += block.iter().map(|s| s * s).sum::<f64>();
        energy_out += output.iter().map(|s| s * s).sum::<f64>();
        count += block.len();
        if args.record.is_some() {
            recorded.extend_from_slice(&output);
        }

        for event in diag_rx.try_iter() {
            log::warn!("saw denormal ({}): {:e}", event.count, event.sample);
        }

        if last_report.elapsed() >= report_interval && count > 0 {
            let rms_in = (energy_in / count as f64).sqrt();
            let rms_out = (energy_out / count as f64).sqrt();
            log::info!(
                "RMS in {:.4} out {:.4} ({:+.1} dB), taps {}",
                rms_in,
                rms_out,
                20.0 * (rms_out / rms_in.max(f64::MIN_POSITIVE)).log10(),
                filter.num_taps()
            );
            energy_in = 0.0;
            energy_out = 0.0;
            count = 0;
            last_report = Instant::now();
        }

        if deadline.is_some_and(|d| started.elapsed() >= d) {
            break;
        }
    }

    Ok(recorded)
}
