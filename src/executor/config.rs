// Executor configuration
#![allow(dead_code)]

use crate::executor::error::{ExecutorError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse an environment variable, logging a warning if the value is present but invalid.
pub fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Limits applied to every compile and run step
#[derive(Debug, Clone)]
pub struct ExecutionConstraints {
    /// Deadline for the compile step in seconds
    pub compile_timeout_secs: u64,
    /// Deadline for the run step in seconds
    pub run_timeout_secs: u64,
    /// Maximum bytes kept per output stream
    pub max_output_bytes: usize,
}

impl Default for ExecutionConstraints {
    fn default() -> Self {
        Self {
            compile_timeout_secs: 10,
            run_timeout_secs: 5,
            max_output_bytes: 1048576, // 1MB
        }
    }
}

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Default execution constraints
    pub constraints: ExecutionConstraints,
    /// Python interpreter
    pub python: String,
    /// C compiler
    pub c_compiler: String,
    /// Extra compiler arguments, appended after `-o <artifact>`
    pub c_flags: Vec<String>,
    /// Directory for per-request source files and binaries
    pub scratch_dir: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            constraints: ExecutionConstraints::default(),
            python: String::from("python3"),
            c_compiler: String::from("gcc"),
            c_flags: Vec::new(),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// On-disk overrides, every key optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    scratch_dir: Option<PathBuf>,
    #[serde(default)]
    python: PythonSection,
    #[serde(default)]
    c: CSection,
    #[serde(default)]
    limits: LimitsSection,
}

#[derive(Debug, Default, Deserialize)]
struct PythonSection {
    interpreter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CSection {
    compiler: Option<String>,
    flags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsSection {
    compile_timeout_secs: Option<u64>,
    run_timeout_secs: Option<u64>,
    max_output_bytes: Option<usize>,
}

/// Default location of the TOML config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("codegrade").join("codegrade.toml"))
        .unwrap_or_else(|| PathBuf::from("codegrade.toml"))
}

impl ExecutorConfig {
    /// Load defaults, then the TOML file, then `CODEGRADE_*` environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("CODEGRADE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());

        let mut config = Self::load_file(&path)?;

        config.python = parse_env_var("CODEGRADE_PYTHON", config.python);
        config.c_compiler = parse_env_var("CODEGRADE_CC", config.c_compiler);
        config.scratch_dir = parse_env_var("CODEGRADE_SCRATCH_DIR", config.scratch_dir);
        config.constraints.compile_timeout_secs = parse_env_var(
            "CODEGRADE_COMPILE_TIMEOUT_SECS",
            config.constraints.compile_timeout_secs,
        );
        config.constraints.run_timeout_secs =
            parse_env_var("CODEGRADE_RUN_TIMEOUT_SECS", config.constraints.run_timeout_secs);
        config.constraints.max_output_bytes =
            parse_env_var("CODEGRADE_MAX_OUTPUT_BYTES", config.constraints.max_output_bytes);

        if let Ok(flags) = std::env::var("CODEGRADE_CFLAGS") {
            config.c_flags = flags.split_whitespace().map(String::from).collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the file at `path`, if it exists
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();

        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        config.apply_toml(&content)?;

        debug!(path = %path.display(), "loaded executor config file");
        Ok(config)
    }

    /// Overlay the keys present in a TOML document
    pub fn apply_toml(&mut self, content: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(dir) = file.scratch_dir {
            self.scratch_dir = dir;
        }
        if let Some(python) = file.python.interpreter {
            self.python = python;
        }
        if let Some(cc) = file.c.compiler {
            self.c_compiler = cc;
        }
        if let Some(flags) = file.c.flags {
            self.c_flags = flags;
        }
        if let Some(secs) = file.limits.compile_timeout_secs {
            self.constraints.compile_timeout_secs = secs;
        }
        if let Some(secs) = file.limits.run_timeout_secs {
            self.constraints.run_timeout_secs = secs;
        }
        if let Some(bytes) = file.limits.max_output_bytes {
            self.constraints.max_output_bytes = bytes;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.constraints.run_timeout_secs == 0 {
            return Err(ExecutorError::ConfigInvalid(
                "run timeout must be at least 1 second".into(),
            ));
        }
        if self.constraints.compile_timeout_secs == 0 {
            return Err(ExecutorError::ConfigInvalid(
                "compile timeout must be at least 1 second".into(),
            ));
        }
        if self.constraints.max_output_bytes == 0 {
            return Err(ExecutorError::ConfigInvalid(
                "max output bytes must be positive".into(),
            ));
        }
        if self.python.trim().is_empty() || self.c_compiler.trim().is_empty() {
            return Err(ExecutorError::ConfigInvalid("toolchain path is empty".into()));
        }
        Ok(())
    }
}
