//! Main tiling pipeline: load, partition, cut, augment, write.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::augment::{AugmentationParams, TileTransform};
use crate::error::{Error, Result};
use crate::image;
use crate::tiling::{self, ParentImageRecord};

use super::config::{Augmentation, Config};
use super::manifest::Manifest;

/// Outcome of tiling one parent file.
#[derive(Debug, Clone)]
pub struct ProcessedParent {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

/// Pipeline that turns parent frames into tiles and manifests.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing pipeline with config: {config:?}");

        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Tile a single parent file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the tile size does not fit
    /// the parent, or any output cannot be written.
    pub fn process<P: AsRef<Path>>(&self, input_path: P) -> Result<ProcessedParent> {
        let input_path = input_path.as_ref();
        self.process_seeded(input_path, ParentImageRecord::id_for(input_path), self.config.seed)
    }

    /// Tile several independent parent files in parallel.
    ///
    /// Results are returned in input order. With a configured seed, parent `i`
    /// uses `seed + i` so runs are reproducible regardless of scheduling.
    /// Inputs sharing a file stem get distinct parent ids (see [`batch_parent_ids`]),
    /// so their tiles and manifests never overwrite each other.
    #[must_use]
    pub fn process_batch(&self, inputs: &[PathBuf]) -> Vec<Result<ProcessedParent>> {
        let ids = batch_parent_ids(inputs);
        inputs
            .par_iter()
            .zip(ids)
            .enumerate()
            .map(|(index, (input, id))| {
                let seed = self.config.seed.map(|s| s.wrapping_add(index as u64));
                self.process_seeded(input, id, seed)
            })
            .collect()
    }

    fn process_seeded(
        &self,
        input_path: &Path,
        parent_id: String,
        seed: Option<u64>,
    ) -> Result<ProcessedParent> {
        tracing::info!("Processing parent: {}", input_path.display());

        let time_stamp = match &self.config.time_stamp {
            Some(ts) => ts.clone(),
            None => modification_time(input_path)?,
        };

        let layout = self.config.layout();

        let manifest = if self.config.write_pixels {
            let raster = image::load_raster(input_path)?;
            let (height, width) = raster.dim();
            let mut parent =
                ParentImageRecord::from_path(input_path, dim_u32(width)?, dim_u32(height)?, time_stamp);
            parent.id = parent_id;
            parent.is_valid = raster.iter().all(|v| v.is_finite());
            if !parent.is_valid {
                tracing::warn!("Parent {} contains non-finite samples", parent.id);
            }

            let partition = tiling::partition(parent, &layout)?;
            let augmentation = self.augmentation_for(seed);
            if let Some(params) = &augmentation {
                tracing::info!("Applying augmentations: {:?}", params.enabled());
            }

            let transform = augmentation
                .as_ref()
                .map(|p| p as &(dyn TileTransform + Sync));
            let tiles = tiling::write_tiles(
                &raster.view(),
                &partition,
                transform,
                self.config.output_quality,
            )?;
            Manifest::new(&partition, tiles, augmentation)
        } else {
            let (width, height) =
                ::image::image_dimensions(input_path).map_err(|source| Error::ImageLoad {
                    path: input_path.to_path_buf(),
                    source,
                })?;
            let mut parent = ParentImageRecord::from_path(input_path, width, height, time_stamp);
            parent.id = parent_id;
            let partition = tiling::partition(parent, &layout)?;
            let tiles = partition.tiles().to_vec();
            Manifest::new(&partition, tiles, None)
        };

        let manifest_path = Manifest::path_for(&self.config.output_dir, &manifest.parent.id);
        manifest.save(&manifest_path)?;

        tracing::info!(
            "Wrote {} tiles ({} invalid) for {} to {}",
            manifest.tiles.len(),
            manifest.invalid_count(),
            manifest.parent.id,
            manifest_path.display()
        );

        Ok(ProcessedParent {
            manifest,
            manifest_path,
        })
    }

    fn augmentation_for(&self, seed: Option<u64>) -> Option<AugmentationParams> {
        match &self.config.augmentation {
            Augmentation::None => None,
            Augmentation::Fixed(params) => Some(params.clone()),
            Augmentation::Random(instrument) => {
                let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
                Some(AugmentationParams::randomize(*instrument, &mut rng))
            }
        }
    }
}

/// Parent ids for a batch, one per input and pairwise distinct.
///
/// An input whose file stem is unique in the batch keeps the stem. Inputs sharing
/// a stem get `{stem}_{index}`, with `index` the position in `inputs`; the suffix
/// repeats until the id is free.
#[must_use]
pub fn batch_parent_ids(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|p| ParentImageRecord::id_for(p)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }

    let mut taken: HashSet<String> = stems
        .iter()
        .filter(|stem| counts[stem.as_str()] == 1)
        .cloned()
        .collect();

    stems
        .iter()
        .enumerate()
        .map(|(index, stem)| {
            if counts[stem.as_str()] == 1 {
                return stem.clone();
            }
            let mut id = format!("{stem}_{index}");
            while taken.contains(&id) {
                id = format!("{id}_{index}");
            }
            tracing::debug!("Input {index} shares stem {stem}; using parent id {id}");
            taken.insert(id.clone());
            id
        })
        .collect()
}

/// File modification time as an RFC 3339 string.
fn modification_time(path: &Path) -> Result<String> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified).to_rfc3339())
}

fn dim_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::ShapeMismatch {
        expected: "dimension that fits in u32".to_string(),
        actual: len.to_string(),
    })
}
