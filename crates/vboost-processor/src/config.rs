//! Processor configuration and construction.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::error::{ProcessorError, ProcessorResult};
use crate::http::HttpProcessor;
use crate::passthrough::PassthroughProcessor;
use crate::script::ScriptProcessor;
use crate::traits::VideoProcessor;

/// Which processor binding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorMode {
    #[default]
    Http,
    Script,
    Passthrough,
}

impl ProcessorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorMode::Http => "http",
            ProcessorMode::Script => "script",
            ProcessorMode::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for ProcessorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProcessorMode {
    type Err = ProcessorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ProcessorMode::Http),
            "script" => Ok(ProcessorMode::Script),
            "passthrough" => Ok(ProcessorMode::Passthrough),
            other => Err(ProcessorError::config_error(format!(
                "unknown PROCESSOR_MODE {:?} (expected http, script or passthrough)",
                other
            ))),
        }
    }
}

/// Processor configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub mode: ProcessorMode,
    /// Processing service base URL (http mode)
    pub service_url: String,
    /// Script path (script mode)
    pub script: PathBuf,
    /// Interpreter for the script; `None` executes the script directly
    pub interpreter: Option<String>,
    /// Directory for transient input/output files (script mode)
    pub work_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            mode: ProcessorMode::Http,
            service_url: "http://localhost:8000".to_string(),
            script: PathBuf::from("scripts/process_video.py"),
            interpreter: Some("python3".to_string()),
            work_dir: std::env::temp_dir(),
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> ProcessorResult<Self> {
        let defaults = Self::default();

        let mode = match std::env::var("PROCESSOR_MODE") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => defaults.mode,
        };

        // Set-but-empty disables the interpreter
        let interpreter = match std::env::var("PROCESSOR_INTERPRETER") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v.trim().to_string()),
            Err(_) => defaults.interpreter,
        };

        Ok(Self {
            mode,
            service_url: std::env::var("VIDEO_PROCESSOR_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.service_url),
            script: std::env::var("PROCESSOR_SCRIPT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.script),
            interpreter,
            work_dir: std::env::var("PROCESSOR_WORK_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
        })
    }
}

/// Build the configured processor binding.
pub fn create_processor(config: &ProcessorConfig) -> ProcessorResult<Arc<dyn VideoProcessor>> {
    let processor: Arc<dyn VideoProcessor> = match config.mode {
        ProcessorMode::Http => Arc::new(HttpProcessor::new(&config.service_url)?),
        ProcessorMode::Script => Arc::new(ScriptProcessor::new(
            config.script.clone(),
            config.interpreter.clone(),
            config.work_dir.clone(),
        )),
        ProcessorMode::Passthrough => Arc::new(PassthroughProcessor),
    };

    info!(
        mode = %config.mode,
        service_url = %config.service_url,
        "Configured video processor"
    );

    Ok(processor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PROCESSOR_MODE",
        "VIDEO_PROCESSOR_URL",
        "PROCESSOR_SCRIPT",
        "PROCESSOR_INTERPRETER",
        "PROCESSOR_WORK_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ProcessorConfig::from_env().unwrap();
        assert_eq!(config.mode, ProcessorMode::Http);
        assert_eq!(config.service_url, "http://localhost:8000");
        assert_eq!(config.script, PathBuf::from("scripts/process_video.py"));
        assert_eq!(config.interpreter.as_deref(), Some("python3"));
    }

    #[test]
    #[serial]
    fn test_script_mode_without_interpreter() {
        clear_env();
        std::env::set_var("PROCESSOR_MODE", "Script");
        std::env::set_var("PROCESSOR_INTERPRETER", "");
        std::env::set_var("PROCESSOR_SCRIPT", "/opt/enhance");
        std::env::set_var("PROCESSOR_WORK_DIR", "/var/tmp/vboost");

        let config = ProcessorConfig::from_env().unwrap();
        assert_eq!(config.mode, ProcessorMode::Script);
        assert!(config.interpreter.is_none());
        assert_eq!(config.script, PathBuf::from("/opt/enhance"));
        assert_eq!(config.work_dir, PathBuf::from("/var/tmp/vboost"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_mode_is_error() {
        clear_env();
        std::env::set_var("PROCESSOR_MODE", "gpu");
        assert!(matches!(
            ProcessorConfig::from_env(),
            Err(ProcessorError::ConfigError(_))
        ));
        clear_env();
    }

    #[test]
    fn test_create_processor_by_mode() {
        for (mode, name) in [
            (ProcessorMode::Http, "http"),
            (ProcessorMode::Script, "script"),
            (ProcessorMode::Passthrough, "passthrough"),
        ] {
            let config = ProcessorConfig {
                mode,
                ..ProcessorConfig::default()
            };
            assert_eq!(create_processor(&config).unwrap().backend_name(), name);
        }
    }
}
