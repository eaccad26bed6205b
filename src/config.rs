use crate::constants::{
    DEFAULT_TOKEN_ENV, FETCH_TIMEOUT_SECS, MAX_WINDOW_WIDTH, PULSOID_API_URL, TICK_RATE_MS,
};
use crate::error::{PulseError, Result};
use crate::logging::LoggingConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub midi: MidiConfig,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    pub data_source: DataSourceConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MidiConfig {
    pub port_name: String,
    // 配置文件里是 1..16，加载后转成 0..15
    #[serde(default = "default_channel")]
    pub channel: u8,
    #[serde(default = "default_tempo_cc")]
    pub tempo_change_cc: u8,
    #[serde(default = "default_rapid_growth_cc")]
    pub rapid_growth_cc: u8,
    #[serde(default)]
    pub decrease_cc: Option<u8>,
    #[serde(default = "default_min_tempo", rename = "min_tempo_bpm")]
    pub min_tempo: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default = "default_window_width")]
    pub window_width: i64,
    #[serde(default = "default_threshold", rename = "rapid_growth_threshold_bpm")]
    pub rapid_growth_threshold: i32,
    /// Reserved. Parsed for compatibility with existing config files,
    /// no suppression is applied.
    #[serde(default, rename = "rapid_growth_cooldown_seconds")]
    pub rapid_growth_cooldown: u64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            rapid_growth_threshold: default_threshold(),
            rapid_growth_cooldown: 0,
        }
    }
}

impl SmoothingConfig {
    /// Window width as a processor capacity; non-positive values become 0
    /// and are clamped to 1 by the processor.
    pub fn width(&self) -> usize {
        usize::try_from(self.window_width).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Pulsoid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub pulsoid: PulsoidConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvConfig {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub start_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PulsoidConfig {
    #[serde(default = "default_pulsoid_url")]
    pub url: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for PulsoidConfig {
    fn default() -> Self {
        Self {
            url: default_pulsoid_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
        }
    }
}

impl DispatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_channel() -> u8 {
    1
}
fn default_tempo_cc() -> u8 {
    1
}
fn default_rapid_growth_cc() -> u8 {
    2
}
fn default_min_tempo() -> i32 {
    50
}
fn default_window_width() -> i64 {
    5
}
fn default_threshold() -> i32 {
    5
}
fn default_pulsoid_url() -> String {
    PULSOID_API_URL.to_string()
}
fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}
fn default_timeout() -> u64 {
    FETCH_TIMEOUT_SECS
}
fn default_interval() -> u64 {
    TICK_RATE_MS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parses and validates; the MIDI channel comes back 0-based.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(raw)?;
        config.validate()?;
        config.midi.channel -= 1;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.midi.channel) {
            return Err(PulseError::config("midi.channel must be between 1 and 16"));
        }

        let mut controllers = vec![
            ("midi.tempo_change_cc", self.midi.tempo_change_cc),
            ("midi.rapid_growth_cc", self.midi.rapid_growth_cc),
        ];
        if let Some(cc) = self.midi.decrease_cc {
            controllers.push(("midi.decrease_cc", cc));
        }
        for (name, cc) in controllers {
            if cc > 127 {
                return Err(PulseError::config(format!("{name} must be between 0 and 127")));
            }
        }

        if self.smoothing.window_width > MAX_WINDOW_WIDTH {
            return Err(PulseError::config(format!(
                "smoothing.window_width must be at most {MAX_WINDOW_WIDTH}"
            )));
        }

        if self.dispatch.interval_ms == 0 {
            return Err(PulseError::config("dispatch.interval_ms must be positive"));
        }

        match self.data_source.kind {
            SourceKind::Csv if self.data_source.csv.path.as_os_str().is_empty() => {
                return Err(PulseError::config("data_source.csv.path is required"));
            }
            SourceKind::Pulsoid if self.data_source.pulsoid.url.is_empty() => {
                return Err(PulseError::config("data_source.pulsoid.url is required"));
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[midi]
port_name = "IAC Driver Bus 1"

[data_source]
type = "csv"

[data_source.csv]
path = "heartrate.csv"
"#;

    #[test]
    fn test_defaults_and_zero_based_channel() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.midi.channel, 0);
        assert_eq!(config.midi.tempo_change_cc, 1);
        assert_eq!(config.midi.rapid_growth_cc, 2);
        assert_eq!(config.midi.decrease_cc, None);
        assert_eq!(config.midi.min_tempo, 50);
        assert_eq!(config.smoothing.width(), 5);
        assert_eq!(config.smoothing.rapid_growth_threshold, 5);
        assert_eq!(config.dispatch.interval(), Duration::from_secs(1));
        assert_eq!(config.data_source.kind, SourceKind::Csv);
        assert_eq!(config.data_source.pulsoid.timeout_secs, 10);
    }

    #[test]
    fn test_full_config() {
        let raw = r#"
[midi]
port_name = "loopMIDI"
channel = 16
tempo_change_cc = 20
rapid_growth_cc = 21
decrease_cc = 22
min_tempo_bpm = 45

[smoothing]
window_width = 10
rapid_growth_threshold_bpm = 8
rapid_growth_cooldown_seconds = 30

[data_source]
type = "pulsoid"

[data_source.pulsoid]
token_env = "MY_TOKEN"
timeout_secs = 3

[dispatch]
interval_ms = 250
"#;
        let config = Config::from_toml(raw).unwrap();
        assert_eq!(config.midi.channel, 15);
        assert_eq!(config.midi.decrease_cc, Some(22));
        assert_eq!(config.midi.min_tempo, 45);
        assert_eq!(config.smoothing.width(), 10);
        assert_eq!(config.smoothing.rapid_growth_cooldown, 30);
        assert_eq!(config.data_source.kind, SourceKind::Pulsoid);
        assert_eq!(config.data_source.pulsoid.token_env, "MY_TOKEN");
        assert_eq!(config.data_source.pulsoid.url, PULSOID_API_URL);
        assert_eq!(config.dispatch.interval_ms, 250);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::from_toml(include_str!("../pulse_midi.example.toml")).unwrap();
        assert_eq!(config.midi.port_name, "IAC Driver Bus 1");
        assert_eq!(config.data_source.csv.path, PathBuf::from("heartrate.csv"));
    }

    #[test]
    fn test_channel_out_of_range() {
        for channel in [0, 17] {
            let raw = MINIMAL.replace(
                "port_name = \"IAC Driver Bus 1\"",
                &format!("port_name = \"x\"\nchannel = {channel}"),
            );
            let err = Config::from_toml(&raw).unwrap_err();
            assert!(matches!(err, PulseError::Config(_)), "{err}");
        }
    }

    #[test]
    fn test_controller_out_of_range() {
        let raw = MINIMAL.replace(
            "port_name = \"IAC Driver Bus 1\"",
            "port_name = \"x\"\ntempo_change_cc = 128",
        );
        assert!(matches!(Config::from_toml(&raw), Err(PulseError::Config(_))));
    }

    #[test]
    fn test_non_positive_width_is_accepted() {
        let raw = format!("{MINIMAL}\n[smoothing]\nwindow_width = -3\n");
        let config = Config::from_toml(&raw).unwrap();
        assert_eq!(config.smoothing.width(), 0);
    }

    #[test]
    fn test_oversized_width_rejected() {
        let raw = format!("{MINIMAL}\n[smoothing]\nwindow_width = {}\n", i64::MAX);
        assert!(matches!(Config::from_toml(&raw), Err(PulseError::Config(_))));

        let raw = format!("{MINIMAL}\n[smoothing]\nwindow_width = {MAX_WINDOW_WIDTH}\n");
        let config = Config::from_toml(&raw).unwrap();
        assert_eq!(config.smoothing.width(), MAX_WINDOW_WIDTH as usize);
    }

    #[test]
    fn test_unknown_source_type() {
        let raw = MINIMAL.replace("type = \"csv\"", "type = \"bluetooth\"");
        assert!(matches!(Config::from_toml(&raw), Err(PulseError::ConfigParse(_))));
    }

    #[test]
    fn test_csv_path_required() {
        let raw = MINIMAL.replace("path = \"heartrate.csv\"", "start_index = 2");
        assert!(matches!(Config::from_toml(&raw), Err(PulseError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let raw = format!("{MINIMAL}\n[dispatch]\ninterval_ms = 0\n");
        assert!(matches!(Config::from_toml(&raw), Err(PulseError::Config(_))));
    }
}
