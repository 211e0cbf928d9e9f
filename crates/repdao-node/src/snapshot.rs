//! Snapshot persistence between one-shot commands.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use repdao_governance::{GovernanceParams, GovernanceService, GovernanceSnapshot, SystemClock};
use tracing::{debug, info, warn};

/// How long a command waits for another invocation to release the state.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY: Duration = Duration::from_millis(10);

/// Exclusive hold on a state file, backed by a sibling `<state_file>.lock`.
///
/// Held across load, run and save so one-shot commands commit in a single
/// order. The lock file is removed on drop.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
}

impl StateLock {
    /// Acquire the lock for `state_file`, waiting up to [`LOCK_TIMEOUT`].
    pub fn acquire(state_file: &Path) -> anyhow::Result<Self> {
        Self::acquire_with_timeout(state_file, LOCK_TIMEOUT)
    }

    pub fn acquire_with_timeout(state_file: &Path, timeout: Duration) -> anyhow::Result<Self> {
        ensure_parent(state_file)?;
        let path = lock_path(state_file);
        let deadline = Instant::now() + timeout;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!("Acquired state lock {:?}", path);
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        anyhow::bail!(
                            "State file is locked by another command: '{}' (remove it if no other repdao-node is running)",
                            path.display()
                        );
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(e) => {
                    anyhow::bail!("Failed to create lock file '{}': {}", path.display(), e)
                }
            }
        }
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release state lock {:?}: {}", self.path, e);
        }
    }
}

fn lock_path(state_file: &Path) -> PathBuf {
    let mut name = OsString::from(state_file.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Load the service from `path`, or start fresh if the file does not exist.
pub fn load(path: &Path, params: GovernanceParams) -> anyhow::Result<GovernanceService> {
    if !path.exists() {
        info!("No state at {:?}, starting fresh", path);
        return Ok(GovernanceService::new(params)?);
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read state file '{}': {}", path.display(), e))?;
    let snapshot: GovernanceSnapshot = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse state file '{}': {}", path.display(), e))?;

    Ok(GovernanceService::restore(snapshot, params, Arc::new(SystemClock))?)
}

/// Persist the service state to `path`.
///
/// Writes a sibling temp file first and renames it over the target so a
/// crash never leaves a truncated snapshot behind. Callers hold the
/// [`StateLock`] for `path`.
pub fn save(service: &GovernanceService, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;

    let json = serde_json::to_string_pretty(&service.snapshot())?;
    let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
    std::fs::write(&tmp, json)
        .map_err(|e| anyhow::anyhow!("Failed to write state file '{}': {}", tmp.display(), e))?;
    std::fs::rename(&tmp, path)?;

    debug!("State persisted to {:?}", path);
    Ok(())
}

/// Delete persisted state. Returns false if there was nothing to delete.
pub fn reset(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to remove state file '{}': {}", path.display(), e))?;
    info!("Removed state file {:?}", path);
    Ok(true)
}
