//! Configuration loading from tratch.toml.
//!
//! The method-name lists drive statement classification inside catch
//! blocks: a call is a logging statement when its extracted name contains
//! one of `log_methods` and none of `not_log_methods`, and similarly for
//! abort and get-cause detection. The defaults reproduce the analyzer's
//! built-in lists and apply whenever tratch.toml is absent or a field is
//! omitted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Runtime configuration for the catch-block analyzer.
#[derive(Debug, Clone)]
pub struct TratchConfig {
    /// Name fragments that mark an invocation as logging.
    pub log_methods: Vec<String>,
    /// Name fragments that veto logging classification.
    pub not_log_methods: Vec<String>,
    /// Name fragments that mark an invocation as aborting the process.
    pub abort_methods: Vec<String>,
    /// Name fragments that mark an access to the exception's cause.
    pub get_cause_methods: Vec<String>,
    /// Output format: "plain" or "json".
    pub output_format: Option<String>,
}

impl Default for TratchConfig {
    fn default() -> Self {
        Self {
            log_methods: to_strings(&[
                "LoggingService.",
                "host.Writer.Write",
                "WriteComment",
                "Trace.Write",
                "TraceUtil.Write",
                "File.WriteAllText",
                "DebugLogException",
                "LogError",
                "Debug.Assert",
                "Debug.Write",
                "LogWarningFromException",
                "LogSyntaxError",
                "WriteLine",
                "stackTrace.Append",
                "Debug",
                "Error",
            ]),
            not_log_methods: to_strings(&[
                "WriteLineIf",
                "TraceUtil.If",
                "html.WriteLine",
                "gen.WriteLine",
                "output.WriteLine",
                "o.WriteLine",
            ]),
            abort_methods: to_strings(&["Exit", "Abort"]),
            get_cause_methods: to_strings(&["InnerException"]),
            output_format: None,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// Raw deserialized shape of tratch.toml; every field optional.
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    log_methods: Option<Vec<String>>,
    not_log_methods: Option<Vec<String>>,
    abort_methods: Option<Vec<String>>,
    get_cause_methods: Option<Vec<String>>,
    output: Option<RawOutput>,
}

#[derive(Debug, Deserialize, Default)]
struct RawOutput {
    format: Option<String>,
}

/// Loads configuration from tratch.toml under `root`, falling back to the
/// built-in defaults for anything unspecified. A missing file yields the
/// defaults.
pub fn load_config(root: &Path) -> Result<TratchConfig> {
    let path = root.join("tratch.toml");
    if !path.exists() {
        return Ok(TratchConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let raw: RawConfig = toml::from_str(&content).context("Invalid tratch.toml")?;

    let mut cfg = TratchConfig::default();
    if let Some(log_methods) = raw.log_methods {
        cfg.log_methods = log_methods;
    }
    if let Some(not_log_methods) = raw.not_log_methods {
        cfg.not_log_methods = not_log_methods;
    }
    if let Some(abort_methods) = raw.abort_methods {
        cfg.abort_methods = abort_methods;
    }
    if let Some(get_cause_methods) = raw.get_cause_methods {
        cfg.get_cause_methods = get_cause_methods;
    }
    if let Some(output) = raw.output {
        cfg.output_format = output.format;
    }
    Ok(cfg)
}
