//! Configuration for the firtap host adapters.
//!
//! The filter core needs no configuration beyond its coefficients; these
//! settings describe how the bundled binaries feed it. A config file is TOML:
//!
//! ```toml
//! [audio]
//! sample_rate = 8000
//! block_size = 256
//!
//! [filter]
//! coefficients = [0.25, 0.5, 0.25]
//!
//! [diagnostics]
//! report_denormals = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::MAX_INPUT_LEN;
use crate::error::{FirError, Result};
use crate::filter::coefficients::validate_len;

/// Top-level configuration
///
/// # Example
/// ```
/// use firtap::config::FirConfig;
///
/// let config = FirConfig::from_toml_str("[audio]\nblock_size = 128\n").unwrap();
/// assert_eq!(config.audio.block_size, 128);
/// assert_eq!(config.audio.sample_rate, 8000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirConfig {
    /// Audio input configuration
    pub audio: AudioConfig,
    /// Initial filter coefficients
    pub filter: FilterConfig,
    /// Denormal reporting
    pub diagnostics: DiagnosticsConfig,
}

/// Audio input configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz (the default filter is designed for 8000)
    pub sample_rate: u32,
    /// Samples per processing block, at most `MAX_INPUT_LEN`
    pub block_size: usize,
    /// Number of interleaved channels delivered by the source
    pub channels: u16,
    /// Index of the channel to filter
    pub channel: usize,
}

/// Filter coefficient source
///
/// `coefficients` takes precedence over `coefficients_file`. With neither
/// set, the filter keeps its default bandpass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Inline coefficient list
    pub coefficients: Option<Vec<f64>>,
    /// Text file of coefficients, see [`parse_coefficients`]
    pub coefficients_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Log a warning whenever a block starts with a denormal sample
    pub report_denormals: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            block_size: MAX_INPUT_LEN,
            channels: 1,
            channel: 0,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            report_denormals: true,
        }
    }
}

impl FirConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FirError::Config(format!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FirError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.audio.block_size == 0 || self.audio.block_size > MAX_INPUT_LEN {
            return Err(FirError::Config(format!(
                "block_size must be between 1 and {}, got {}",
                MAX_INPUT_LEN, self.audio.block_size
            )));
        }
        if self.audio.channels == 0 {
            return Err(FirError::Config("channels must be at least 1".into()));
        }
        if self.audio.channel >= self.audio.channels as usize {
            return Err(FirError::Config(format!(
                "channel {} out of range for {} channel(s)",
                self.audio.channel, self.audio.channels
            )));
        }
        if self.audio.sample_rate == 0 {
            return Err(FirError::Config("sample_rate must be positive".into()));
        }
        Ok(())
    }
}

impl FilterConfig {
    /// Load the configured coefficient list, if any
    pub fn resolve(&self) -> Result<Option<Vec<f64>>> {
        if let Some(taps) = &self.coefficients {
            return Ok(Some(taps.clone()));
        }
        match &self.coefficients_file {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| FirError::Config(format!("{}: {}", path.display(), e)))?;
                parse_coefficients(&content).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Parse a textual coefficient list
///
/// Values are separated by commas and/or whitespace; `#` starts a comment
/// that runs to the end of the line.
///
/// # Example
/// ```
/// use firtap::config::parse_coefficients;
///
/// let taps = parse_coefficients("0.25, 0.5  # centre\n0.25").unwrap();
/// assert_eq!(taps, vec![0.25, 0.5, 0.25]);
/// ```
pub fn parse_coefficients(text: &str) -> Result<Vec<f64>> {
    let taps = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| FirError::InvalidCoefficient(token.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    validate_len(taps.len())?;
    Ok(taps)
}
