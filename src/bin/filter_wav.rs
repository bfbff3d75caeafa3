use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::PathBuf;

use firtap::audio::{AudioSource, WavFileSource};
use firtap::config::{FirConfig, parse_coefficients};
use firtap::filter::{FirFilter, LogSink};
use firtap::save_wav;

#[derive(Parser, Debug)]
#[command(name = "filter_wav")]
#[command(about = "Run a WAV file through the block FIR filter", long_about = None)]
struct Args {
    /// WAV file to filter
    input: PathBuf,

    /// Write the filtered channel to this mono WAV file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Coefficient list, e.g. "0.25,0.5,0.25" (overrides the config)
    #[arg(long)]
    coefficients: Option<String>,

    /// Coefficient text file (overrides the config)
    #[arg(long)]
    coefficients_file: Option<PathBuf>,

    /// Single-tap gain (overrides any coefficient list)
    #[arg(long)]
    gain: Option<f64>,

    /// Channel of the input file to filter
    #[arg(long)]
    channel: Option<usize>,

    /// Samples per processing block (1-512)
    #[arg(short = 'b', long)]
    block_size: Option<usize>,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct LevelSummary {
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl LevelSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FilterReport {
    filename: String,
    sample_rate: u32,
    num_taps: usize,
    block_size: usize,
    blocks: usize,
    sample_count: usize,
    input_block_rms: Option<LevelSummary>,
    output_block_rms: Option<LevelSummary>,
    output_peak: f64,
    denormal_events: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => FirConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FirConfig::default(),
    };
    if let Some(channel) = args.channel {
        config.audio.channel = channel;
    }
    if let Some(block_size) = args.block_size {
        config.audio.block_size = block_size;
    }
    if let Some(text) = &args.coefficients {
        config.filter.coefficients =
            Some(parse_coefficients(text).context("Invalid --coefficients")?);
    }
    if let Some(path) = &args.coefficients_file {
        config.filter.coefficients = None;
        config.filter.coefficients_file = Some(path.clone());
    }
    // Channel count is only known once the file is open.
    config.audio.channels = config.audio.channels.max(min_channels(config.audio.channel)?);
    config.validate()?;

    let mut filter = build_filter(&config, args.gain)?;

    let report = run(&args, &config, &mut filter)?;

    match args.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Smallest channel count that contains the 0-based `channel`
fn min_channels(channel: usize) -> anyhow::Result<u16> {
    u16::try_from(channel)
        .ok()
        .and_then(|c| c.checked_add(1))
        .with_context(|| format!("Channel {} is out of range", channel))
}

fn build_filter(config: &FirConfig, gain: Option<f64>) -> anyhow::Result<FirFilter> {
    let mut filter = FirFilter::new();
    if let Some(taps) = config
        .filter
        .resolve()
        .context("Failed to load coefficients")?
    {
        filter.set_bulk(&taps)?;
    }
    if let Some(gain) = gain {
        filter.set_scalar(gain);
    }
    if config.diagnostics.report_denormals {
        filter.set_diagnostic_sink(Box::new(LogSink));
    }
    log::info!("Filter has {} taps", filter.num_taps());
    Ok(filter)
}

fn run(args: &Args, config: &FirConfig, filter: &mut FirFilter) -> anyhow::Result<FilterReport> {
    let mut source = WavFileSource::new(&args.input, config.audio.block_size, config.audio.channel)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    log::info!(
        "{}: {} samples at {} Hz",
        args.input.display(),
        source.len(),
        source.sample_rate()
    );

    let mut input_stats: Stats<f32> = Stats::new();
    let mut output_stats: Stats<f32> = Stats::new();
    let mut filtered = Vec::with_capacity(source.len());
    let mut output = vec![0.0; config.audio.block_size];
    let mut blocks = 0;
    let mut output_peak = 0.0f64;

    while let Some(block) = source.next_block()? {
        let out = &mut output[..block.len()];
        filter.process_block(&block, out)?;

        input_stats.update(rms(&block) as f32);
        output_stats.update(rms(out) as f32);
        output_peak = out.iter().fold(output_peak, |peak, &s| peak.max(s.abs()));
        filtered.extend_from_slice(out);
        blocks += 1;
    }

    let output_file = match &args.output {
        Some(path) => {
            let name = path.to_string_lossy().to_string();
            save_wav(&name, &filtered, source.sample_rate())
                .with_context(|| format!("Failed to write {}", name))?;
            Some(name)
        }
        None => None,
    };

    Ok(FilterReport {
        filename: args
            .input
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| args.input.display().to_string()),
        sample_rate: source.sample_rate(),
        num_taps: filter.num_taps(),
        block_size: config.audio.block_size,
        blocks,
        sample_count: filtered.len(),
        input_block_rms: LevelSummary::from_stats(&input_stats),
        output_block_rms: LevelSummary::from_stats(&output_stats),
        output_peak,
        denormal_events: filter.denormal_count(),
        output_file,
    })
}

fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

fn print_text(report: &FilterReport) {
    println!("=== {} ===", report.filename);
    println!("Sample rate: {} Hz", report.sample_rate);
    println!("Taps: {}", report.num_taps);
    println!(
        "Processed {} samples in {} blocks of up to {}",
        report.sample_count, report.blocks, report.block_size
    );
    if let Some(ref level) = report.input_block_rms {
        println!(
            "Input block RMS:  mean {:.4}, std {:.4}, min {:.4}, max {:.4}",
            level.mean, level.std_dev, level.min, level.max
        );
    }
    if let Some(ref level) = report.output_block_rms {
        println!(
            "Output block RMS: mean {:.4}, std {:.4}, min {:.4}, max {:.4}",
            level.mean, level.std_dev, level.min, level.max
        );
    }
    println!("Output peak: {:.4}", report.output_peak);
    if report.denormal_events > 0 {
        println!("Denormal blocks: {}", report.denormal_events);
    }
    if let Some(ref file) = report.output_file {
        println!("Wrote {}", file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_channels() {
        assert_eq!(min_channels(0).unwrap(), 1);
        assert_eq!(min_channels(3).unwrap(), 4);
        assert_eq!(min_channels(65534).unwrap(), u16::MAX);
    }

    #[test]
    fn test_min_channels_rejects_out_of_range() {
        assert!(min_channels(65535).is_err());
        assert!(min_channels(1 << 20).is_err());
    }
}
