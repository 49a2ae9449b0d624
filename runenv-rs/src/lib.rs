use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod manifest;

pub use manifest::{InputDigest, RunManifest};

/// Errors raised at the run-environment boundary. All of these are fatal to
/// the run that hits them.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("failed to read run description: {0}")]
    Stdin(#[source] io::Error),

    #[error("run description is not valid JSON: {0}")]
    Description(#[from] serde_json::Error),

    #[error("input block does not match the expected parameters: {0}")]
    Input(#[source] serde_json::Error),

    #[error("no file named {0:?} in the run file map")]
    UnknownFile(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write output {name}: {source}")]
    OutputIo {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output {name}: {source}")]
    OutputCsv {
        name: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize run manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error("failed to digest input {path}: {source}")]
    Digest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A parsed run description.
///
/// The description arrives as JSON (normally on stdin): an `input` block of
/// model parameters, an optional `seed` and `replicate`, a `model.files` map
/// naming the data files the model may read, and an `output` spec selecting
/// a filesystem directory or stdout.
///
/// A `seed` left out of the description means the run is not pinned and the
/// model should seed itself from OS entropy.
pub struct Environment {
    input_json: serde_json::Map<String, Value>,
    pub seed: Option<u64>,
    pub replicate: u64,
    files: HashMap<String, PathBuf>,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = input_json.remove("seed").and_then(|v| v.as_u64());

        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let files = data
            .get("model")
            .and_then(|m| m.get("files"))
            .and_then(|f| f.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), PathBuf::from(s))))
                    .collect()
            })
            .unwrap_or_default();

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Self {
            input_json,
            seed,
            replicate,
            files,
            output,
        }
    }

    pub fn from_stdin() -> Result<Self, EnvError> {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .map_err(EnvError::Stdin)?;
        let data: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    /// Deserialize the input block into the model's parameter type.
    pub fn typed_input<T: DeserializeOwned>(&self) -> Result<T, EnvError> {
        let value = Value::Object(self.input_json.clone());
        serde_json::from_value(value).map_err(EnvError::Input)
    }

    pub fn files(&self) -> &HashMap<String, PathBuf> {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }

    pub fn require_file(&self, name: &str) -> Result<&Path, EnvError> {
        self.file(name)
            .ok_or_else(|| EnvError::UnknownFile(name.to_string()))
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        // Check flat output
        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            if let Some(dir) = output.get("dir").and_then(|v| v.as_str()) {
                return Some(PathBuf::from(dir));
            }
            return None;
        }

        // Check profiled output, resolving the default profile
        if let Some(profiles) = output.get("profile").and_then(|v| v.as_object()) {
            let selected = profiles.get("default").or_else(|| profiles.values().next());
            if let Some(profile) = selected
                && profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem")
                && let Some(dir) = profile.get("dir").and_then(|v| v.as_str())
            {
                return Some(PathBuf::from(dir));
            }
        }

        None
    }

    pub fn write(&self, filename: &str, data: &[u8]) -> Result<(), EnvError> {
        let as_output_err = |source| EnvError::OutputIo {
            name: filename.to_string(),
            source,
        };
        if let Some(dir) = self.output_dir() {
            fs::create_dir_all(&dir).map_err(as_output_err)?;
            fs::write(dir.join(filename), data).map_err(as_output_err)
        } else {
            io::stdout().write_all(data).map_err(as_output_err)
        }
    }

    pub fn write_csv(
        &self,
        filename: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), EnvError> {
        if let Some(dir) = self.output_dir() {
            fs::create_dir_all(&dir).map_err(|source| EnvError::OutputIo {
                name: filename.to_string(),
                source,
            })?;
            let file = fs::File::create(dir.join(filename)).map_err(|source| EnvError::OutputIo {
                name: filename.to_string(),
                source,
            })?;
            write_records(csv::Writer::from_writer(file), filename, headers, rows)
        } else {
            write_records(
                csv::Writer::from_writer(io::stdout()),
                filename,
                headers,
                rows,
            )
        }
    }

    /// Serialize a run manifest next to the other outputs.
    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<(), EnvError> {
        let mut json = serde_json::to_vec_pretty(manifest).map_err(EnvError::Manifest)?;
        json.push(b'\n');
        self.write(manifest::MANIFEST_FILENAME, &json)
    }
}

fn write_records<W: Write>(
    mut wtr: csv::Writer<W>,
    filename: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), EnvError> {
    let as_output_err = |source| EnvError::OutputCsv {
        name: filename.to_string(),
        source,
    };
    wtr.write_record(headers).map_err(as_output_err)?;
    for row in rows {
        wtr.write_record(row).map_err(as_output_err)?;
    }
    wtr.flush().map_err(|source| EnvError::OutputIo {
        name: filename.to_string(),
        source,
    })
}

/// Load a model config file written as TOML.
pub fn load_toml_config<T: DeserializeOwned>(path: &Path) -> Result<T, EnvError> {
    let text = fs::read_to_string(path).map_err(|source| EnvError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| EnvError::ConfigFormat {
        path: path.to_path_buf(),
        source,
    })
}
