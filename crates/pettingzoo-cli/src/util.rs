use std::{fs::File, io, path::Path};

use anyhow::Context as _;
use pettingzoo_genome::Artifact;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Loads a chromosome artifact written by a training run.
pub fn read_artifact_file<P>(path: P) -> anyhow::Result<Artifact>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    Artifact::load(path)
        .with_context(|| format!("Failed to load chromosome artifact: {}", path.display()))
}
