//! Environment bootstrap
//!
//! Prepares a checkout for running the containerized tutor: verifies the
//! container tooling is installed, creates the working directories, and
//! materializes `.env` from its template. Missing prerequisites are fatal
//! and leave the filesystem untouched.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Tools that must be on PATH before setup does anything else
pub const REQUIRED_TOOLS: [&str; 2] = ["docker", "docker-compose"];

/// Directories created by setup
pub const WORKING_DIRS: [&str; 2] = ["data", "storage"];

pub const ENV_FILE: &str = ".env";
pub const ENV_TEMPLATE: &str = ".env.example";

/// Why setup could not complete
#[derive(Debug)]
pub enum SetupError {
    /// A required tool is not on PATH. Maps to exit code 1.
    MissingTool(String),
    Io(std::io::Error),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::MissingTool(tool) => write!(
                f,
                "{} is not installed or not on PATH. Please install it and retry.",
                tool
            ),
            SetupError::Io(e) => write!(f, "setup failed: {}", e),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<std::io::Error> for SetupError {
    fn from(e: std::io::Error) -> Self {
        SetupError::Io(e)
    }
}

/// What a setup run did
#[derive(Debug, Default)]
pub struct SetupReport {
    pub created_dirs: Vec<PathBuf>,
    /// True when `.env` was copied from the template this run
    pub env_file_created: bool,
}

/// Run the bootstrap in `root`, probing the given PATH value for tools.
///
/// Prerequisite checks happen before any filesystem mutation, so a failed
/// run has no side effects and rerunning after a success is idempotent:
/// existing directories are kept and an existing `.env` is never
/// overwritten.
pub fn run_setup(root: &Path, path_var: Option<&OsString>) -> Result<SetupReport, SetupError> {
    for tool in REQUIRED_TOOLS {
        if !tool_on_path(tool, path_var) {
            return Err(SetupError::MissingTool(tool.to_string()));
        }
    }

    let mut report = SetupReport::default();

    for dir in WORKING_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
            report.created_dirs.push(path);
        }
    }

    let env_file = root.join(ENV_FILE);
    let template = root.join(ENV_TEMPLATE);
    if !env_file.exists() && template.exists() {
        std::fs::copy(&template, &env_file)?;
        report.env_file_created = true;
    }

    Ok(report)
}

/// Convenience wrapper over the process environment
pub fn run_setup_in(root: &Path) -> Result<SetupReport, SetupError> {
    let path_var = env::var_os("PATH");
    run_setup(root, path_var.as_ref())
}

/// Scan PATH entries for an executable file with the given name
fn tool_on_path(tool: &str, path_var: Option<&OsString>) -> bool {
    let Some(paths) = path_var else {
        return false;
    };
    env::split_paths(paths).any(|dir| is_executable(&dir.join(tool)))
}

#[cfg(unix)]
fn is_executable(candidate: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    candidate
        .metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(candidate: &Path) -> bool {
    candidate.is_file()
}
