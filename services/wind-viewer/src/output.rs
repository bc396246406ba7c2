//! Writes rendered layers to the output directory.

use anyhow::{Context, Result};
use renderer::{ColorRamp, Legend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile_layer::MapLayers;
use tokio::sync::watch;
use tracing::{debug, error};

pub const LAYERS_FILE: &str = "layers.json";
pub const LEGEND_FILE: &str = "legend.svg";

pub struct OutputDir {
    dir: PathBuf,
}

impl OutputDir {
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Replace `layers.json` with `layers`.
    pub async fn write_layers(&self, layers: &MapLayers) -> Result<()> {
        let json = serde_json::to_vec_pretty(layers).context("Failed to serialize layers")?;

        // Write then rename so readers never see a partial file
        let tmp = self.dir.join(format!("{}.tmp", LAYERS_FILE));
        let target = self.dir.join(LAYERS_FILE);
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &target)
            .await
            .with_context(|| format!("Failed to replace {}", target.display()))?;

        debug!(generation = layers.generation, path = %target.display(), "Wrote layers");
        Ok(())
    }

    pub async fn write_legend(&self, ramp: &dyn ColorRamp) -> Result<()> {
        let svg = Legend::for_ramp(ramp, 9).to_svg(320, 56);
        let target = self.dir.join(LEGEND_FILE);
        tokio::fs::write(&target, svg)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))
    }
}

/// Write every published layer set until the overlay is dropped.
///
/// Writes run one at a time, so the temporary file is never shared. A value
/// published just before the channel closes is still written.
pub async fn follow_layers(mut layers: watch::Receiver<Arc<MapLayers>>, out: Arc<OutputDir>) {
    while layers.changed().await.is_ok() {
        let current = Arc::clone(&*layers.borrow_and_update());
        if let Err(e) = out.write_layers(&current).await {
            error!(error = %e, "Failed to write layers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::SteppedRamp;

    #[tokio::test]
    async fn test_write_layers_and_legend() {
        let tmp = tempfile::tempdir().unwrap();
        let out = OutputDir::create(tmp.path().join("nested")).await.unwrap();

        let layers = MapLayers {
            generation: 3,
            zoom: 9,
            ..MapLayers::default()
        };
        out.write_layers(&layers).await.unwrap();
        out.write_legend(&SteppedRamp::wind(40.0)).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out.path().join(LAYERS_FILE)).unwrap()).unwrap();
        assert_eq!(json["generation"], 3);
        assert_eq!(json["zoom"], 9);
        assert!(json["arrows"].as_array().unwrap().is_empty());

        let svg = std::fs::read_to_string(out.path().join(LEGEND_FILE)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!out.path().join("layers.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_follow_layers_flushes_last_value_after_close() {
        let tmp = tempfile::tempdir().unwrap();
        let out = Arc::new(OutputDir::create(tmp.path()).await.unwrap());

        let (tx, rx) = watch::channel(Arc::new(MapLayers::default()));
        let writer = tokio::spawn(follow_layers(rx, Arc::clone(&out)));

        for generation in 1..=5 {
            tx.send(Arc::new(MapLayers {
                generation,
                ..MapLayers::default()
            }))
            .unwrap();
        }
        drop(tx);
        writer.await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(out.path().join(LAYERS_FILE)).unwrap()).unwrap();
        assert_eq!(json["generation"], 5);
        assert!(!out.path().join(format!("{}.tmp", LAYERS_FILE)).exists());
    }
}
