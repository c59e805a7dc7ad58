use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::acceptance::AcceptanceConfig;
use crate::core::contagion::Neighborhood;
use crate::types::{FexError, FexResult, PatchGridSpec};

/// Recognized configuration options for a feature extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FexConfig {
    /// Pixels per patch edge
    pub patch_size_pixels: usize,
    /// Degrees per pixel
    pub pixel_resolution_deg: f64,
    pub min_valid_pixel_ratio: f64,
    pub min_clumpiness: f64,
    pub contagion_neighborhood: Neighborhood,
}

impl Default for FexConfig {
    fn default() -> Self {
        Self {
            patch_size_pixels: 200,
            pixel_resolution_deg: 0.009,
            min_valid_pixel_ratio: 0.2,
            min_clumpiness: 0.0,
            contagion_neighborhood: Neighborhood::Queen,
        }
    }
}

impl FexConfig {
    pub fn validate(&self) -> FexResult<()> {
        self.grid_spec()?;
        self.acceptance().validate()
    }

    pub fn grid_spec(&self) -> FexResult<PatchGridSpec> {
        PatchGridSpec::new(self.patch_size_pixels, self.pixel_resolution_deg)
    }

    pub fn acceptance(&self) -> AcceptanceConfig {
        AcceptanceConfig {
            min_valid_pixel_ratio: self.min_valid_pixel_ratio,
            min_clumpiness: self.min_clumpiness,
            neighborhood: self.contagion_neighborhood,
        }
    }
}

/// Read and validate a JSON configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> FexResult<FexConfig> {
    let path = path.as_ref();
    log::info!("Reading configuration: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let config: FexConfig = serde_json::from_str(&contents)?;
    config.validate().map_err(|e| match e {
        FexError::InvalidGridSpec(msg) | FexError::Config(msg) => {
            FexError::Config(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    log::debug!("Configuration: {:?}", config);
    Ok(config)
}
