use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub api_port: u16,
    pub paths: StudioPaths,
    pub realtime: RealtimeConfig,
}

impl StudioConfig {
    pub fn from_env() -> Result<Self> {
        let paths = StudioPaths::discover()?;
        let api_port = env::var("STUDIO_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let realtime = RealtimeConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            realtime,
        })
    }

    pub fn new(api_port: u16, paths: StudioPaths) -> Self {
        Self {
            api_port,
            paths,
            realtime: RealtimeConfig::default(),
        }
    }
}

/// Capacity of each per-user notification channel. Pushes beyond it are
/// dropped for lagging subscribers; the durable notification row is the
/// source of truth, the push only a cache-invalidation hint.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl RealtimeConfig {
    pub fn from_env() -> Self {
        let channel_capacity = env::var("STUDIO_CHANNEL_CAPACITY")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or(64);
        Self { channel_capacity }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudioPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl StudioPaths {
    pub fn discover() -> Result<Self> {
        if let Ok(base) = env::var("STUDIO_DATA_DIR") {
            if !base.trim().is_empty() {
                return Self::from_base_dir(base);
            }
        }
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("studio.db");
        Ok(Self {
            base,
            data_dir,
            db_path,
        })
    }
}
