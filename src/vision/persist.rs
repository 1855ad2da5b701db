// Best-effort debug persistence of input and output images
// Author: kelexine (https://github.com/kelexine)

use crate::config::OutputConfig;
use crate::metrics;
use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Receives decoded images as a side effect of the pipeline.
///
/// Implementations must never fail the caller; errors are theirs to log.
pub trait ImageSink: Send + Sync {
    fn persist(&self, bytes: Bytes, prefix: &str);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ImageSink for DiscardSink {
    fn persist(&self, _bytes: Bytes, _prefix: &str) {}
}

/// Writes images to a directory with timestamped names.
///
/// Rasters are re-encoded as `<prefix>-<ts>.png`; bytes the decoder rejects
/// are written untouched as `<prefix>-raw-<ts>.bin`.
#[derive(Debug, Clone)]
pub struct DebugImageStore {
    dir: Option<PathBuf>,
}

impl DebugImageStore {
    /// Create the store, making the output directory if needed.
    ///
    /// When the configured directory cannot be created the fallback directory
    /// (or the OS temp dir) is used; if that fails too, persistence is off.
    pub fn new(config: &OutputConfig) -> Self {
        if !config.save_images {
            info!("Debug image persistence disabled");
            return Self { dir: None };
        }

        let fallback = config
            .fallback_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("circuit-relay"));

        for candidate in [PathBuf::from(&config.dir), fallback] {
            match fs::create_dir_all(&candidate) {
                Ok(()) => {
                    info!("Saving debug images to {}", candidate.display());
                    return Self {
                        dir: Some(candidate),
                    };
                }
                Err(e) => warn!("Cannot use output dir {}: {}", candidate.display(), e),
            }
        }

        error!("No writable output directory, debug images will not be saved");
        Self { dir: None }
    }

    /// Store writing into `dir` without any setup.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write one image synchronously and return where it went.
    pub fn save(&self, bytes: &[u8], prefix: &str) -> std::io::Result<PathBuf> {
        let dir = self.dir.as_deref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no output directory")
        })?;
        save_to_dir(dir, bytes, prefix)
    }
}

impl ImageSink for DebugImageStore {
    fn persist(&self, bytes: Bytes, prefix: &str) {
        let Some(dir) = self.dir.clone() else {
            return;
        };
        let prefix = prefix.to_string();

        let job = move || match save_to_dir(&dir, &bytes, &prefix) {
            Ok(path) => {
                metrics::record_persist("saved");
                info!("Saved image -> {}", path.display());
            }
            Err(e) => {
                metrics::record_persist("failed");
                error!("Failed to save {} image: {}", prefix, e);
            }
        };

        // Off the request path when we can
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }
}

fn save_to_dir(dir: &Path, bytes: &[u8], prefix: &str) -> std::io::Result<PathBuf> {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S-%6f");

    match image::load_from_memory(bytes) {
        Ok(img) => {
            let path = dir.join(format!("{}-{}.png", prefix, ts));
            match img.save(&path) {
                Ok(()) => return Ok(path),
                Err(e) => warn!("PNG save failed for {}: {}", path.display(), e),
            }
        }
        Err(e) => debug!("Not a decodable raster ({}), writing raw bytes", e),
    }

    let raw_path = dir.join(format!("{}-raw-{}.bin", prefix, ts));
    fs::write(&raw_path, bytes)?;
    Ok(raw_path)
}
