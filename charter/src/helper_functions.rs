use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Output directory for rendered figures, created on demand.
pub fn figure_dir() -> Result<PathBuf> {
    let dir = project_root().join("figure");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create figure directory {}", dir.display()))?;
    Ok(dir)
}
