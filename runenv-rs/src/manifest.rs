//! Run provenance: which inputs a run consumed (by digest), which outputs it
//! produced, and the seed that makes it replayable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::EnvError;

pub const MANIFEST_FILENAME: &str = "run_manifest.json";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InputDigest {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Written alongside the model outputs as `run_manifest.json`. The recorded
/// seed is always the effective one, so an unpinned run can still be
/// replayed by feeding the seed back into the run description.
#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub seed: u64,
    pub replicate: u64,
    pub inputs: Vec<InputDigest>,
    pub outputs: Vec<String>,
}

impl RunManifest {
    pub fn new(seed: u64, replicate: u64) -> Self {
        Self {
            seed,
            replicate,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn record_input(&mut self, name: &str, path: &Path) -> Result<(), EnvError> {
        let sha256 = sha256_hex(path).map_err(|source| EnvError::Digest {
            path: path.to_path_buf(),
            source,
        })?;
        self.inputs.push(InputDigest {
            name: name.to_string(),
            path: path.to_path_buf(),
            sha256,
        });
        Ok(())
    }

    pub fn record_output(&mut self, name: &str) {
        self.outputs.push(name.to_string());
    }
}

pub fn sha256_hex(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
