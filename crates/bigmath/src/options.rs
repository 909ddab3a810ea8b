//! Facade configuration.

use serde::{Deserialize, Serialize};

use bigmath_core::{Execution, PiAlgorithm, DEFAULT_BBP_THREADS, DEFAULT_FFT_THRESHOLD, DEFAULT_PRECISION};

/// Environment variable holding the default precision in bits.
pub const ENV_PRECISION: &str = "BIGMATH_PRECISION";
/// Environment variable enabling threaded kernels (`1`/`true`/`yes`/`on`).
pub const ENV_THREADED: &str = "BIGMATH_THREADED";
/// Environment variable naming the π algorithm.
pub const ENV_PI_ALGORITHM: &str = "BIGMATH_PI_ALGORITHM";
/// Environment variable with the FFT multiplication threshold in bits
/// (`off` disables FFT multiplication).
pub const ENV_FFT_THRESHOLD: &str = "BIGMATH_FFT_THRESHOLD";

/// Error raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options of a [`BigMath`](crate::BigMath) facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Precision (bits after the point) used when a call gives none.
    pub default_precision: i64,
    /// Sequential or threaded kernels.
    pub execution: Execution,
    /// Algorithm used to compute π for the constant cache.
    pub pi_algorithm: PiAlgorithm,
    /// Worker count of the BBP and quadrature π algorithms.
    pub bbp_threads: usize,
    /// Operand size (in bits) from which `multiply` uses the FFT engine;
    /// `None` keeps every product on the integer multiplier.
    pub fft_threshold: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_precision: DEFAULT_PRECISION,
            execution: Execution::Sequential,
            pi_algorithm: PiAlgorithm::default(),
            bbp_threads: DEFAULT_BBP_THREADS,
            fft_threshold: None,
        }
    }
}

impl Options {
    /// Fill a zero thread count or FFT threshold with the defaults. The
    /// precision is kept as given: zero is valid, and a negative value makes
    /// every call that relies on it fail.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.bbp_threads == 0 {
            self.bbp_threads = DEFAULT_BBP_THREADS;
        }
        if self.fft_threshold == Some(0) {
            self.fft_threshold = Some(DEFAULT_FFT_THRESHOLD);
        }
        self
    }

    /// Reject a negative default precision.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.default_precision < 0 {
            return Err(invalid("default_precision", &self.default_precision.to_string()));
        }
        Ok(self)
    }

    /// Defaults overridden by the `BIGMATH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(value) = lookup(ENV_PRECISION) {
            options.default_precision = value
                .trim()
                .parse()
                .ok()
                .filter(|precision: &i64| *precision >= 0)
                .ok_or_else(|| invalid(ENV_PRECISION, &value))?;
        }
        if let Some(value) = lookup(ENV_THREADED) {
            let threaded = parse_flag(&value).ok_or_else(|| invalid(ENV_THREADED, &value))?;
            options.execution = Execution::from_flag(threaded);
        }
        if let Some(value) = lookup(ENV_PI_ALGORITHM) {
            options.pi_algorithm =
                PiAlgorithm::from_name(&value).map_err(|_| invalid(ENV_PI_ALGORITHM, &value))?;
        }
        if let Some(value) = lookup(ENV_FFT_THRESHOLD) {
            options.fft_threshold = match value.trim() {
                "" | "off" | "none" => None,
                bits => Some(bits.parse().map_err(|_| invalid(ENV_FFT_THRESHOLD, &value))?),
            };
        }
        Ok(options.normalize())
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.normalize().validate()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}
