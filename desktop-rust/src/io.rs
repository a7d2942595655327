use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use grading_common::{CategoryScope, GradingSession, default_export_path};

pub fn open_session(path: &Path, scope: CategoryScope) -> Result<GradingSession> {
    GradingSession::open(path, scope).with_context(|| format!("open {}", path.display()))
}

pub fn export_session(session: &GradingSession, path: &Path) -> Result<()> {
    session
        .export(path)
        .with_context(|| format!("write {}", path.display()))
}

pub fn default_updated_path(source: &Path) -> PathBuf {
    default_export_path(source, "_UPDATED")
}
