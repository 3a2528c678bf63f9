//! `[log]` section
//!
//! `level` is a tracing filter directive, so per-crate overrides work:
//!
//! ```toml
//! [log]
//! level = "info,tweetcast_tap=debug"
//! format = "json"
//! output = "/var/log/tweetcast.log"
//! color = false
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Default filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

/// Where log lines go
///
/// `"stdout"`, `"stderr"` and `"-"` (stdout) are reserved; any other string
/// is a file path opened for append.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "String")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl From<String> for LogOutput {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "-" | "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            _ => Self::File(PathBuf::from(value)),
        }
    }
}

impl LogOutput {
    /// Whether lines go to a terminal stream rather than a file
    pub fn is_terminal_stream(&self) -> bool {
        !matches!(self, Self::File(_))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, overridden by `--log-level`
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// ANSI colors for console lines; never applied to files
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            color: true,
        }
    }
}

impl LogConfig {
    /// Whether console lines should carry ANSI colors
    pub fn use_color(&self) -> bool {
        self.color && self.format == LogFormat::Console && self.output.is_terminal_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.output, LogOutput::Stdout);
        assert!(config.use_color());
    }

    #[test]
    fn test_level_accepts_directives() {
        let config: LogConfig =
            toml::from_str(r#"level = "warn,tweetcast_sources=trace""#).unwrap();
        assert_eq!(config.level, "warn,tweetcast_sources=trace");
    }

    #[test]
    fn test_output_strings() {
        for (raw, expected) in [
            ("stdout", LogOutput::Stdout),
            ("-", LogOutput::Stdout),
            ("stderr", LogOutput::Stderr),
            ("logs/tweetcast.log", LogOutput::File("logs/tweetcast.log".into())),
        ] {
            assert_eq!(LogOutput::from(raw.to_string()), expected, "{raw}");
        }
    }

    #[test]
    fn test_color_only_on_console_streams() {
        let file: LogConfig = toml::from_str(r#"output = "/tmp/tweetcast.log""#).unwrap();
        assert!(!file.use_color());

        let json: LogConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert!(!json.use_color());

        let off: LogConfig = toml::from_str("color = false").unwrap();
        assert!(!off.use_color());
    }
}
