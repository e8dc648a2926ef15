// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drip file loading: reads a file and freezes its campaigns

use crate::parser::{parse_drip_file, DripFile, ParseError};
use drip_core::{CampaignRegistry, Campaigns, ConfigurationError, DeliveryConfig, HandlerCatalog};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a drip file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("invalid campaign definition: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Read and parse a drip file without registering it
pub fn load_drip_file(path: &Path) -> Result<DripFile, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_drip_file(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a drip file and freeze its campaigns
///
/// When `catalog` is given, every step handler must resolve against it.
pub fn load_campaigns(
    path: &Path,
    catalog: Option<HandlerCatalog>,
) -> Result<(DeliveryConfig, Campaigns), LoadError> {
    let file = load_drip_file(path)?;

    let mut registry = match catalog {
        Some(catalog) => CampaignRegistry::new().with_handlers(catalog),
        None => CampaignRegistry::new(),
    };
    file.register(&mut registry)?;
    let campaigns = registry.finish()?;

    tracing::info!(
        path = %path.display(),
        campaigns = campaigns.len(),
        steps = file.step_count(),
        "drip file loaded"
    );
    Ok((file.delivery, campaigns))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
