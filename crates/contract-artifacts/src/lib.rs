//! Compiled contract artifacts as emitted by Hardhat (`artifacts/`) and
//! Foundry (`out/`). An artifact store resolves a contract by name to its ABI
//! and creation bytecode.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ethers::{abi::Abi, types::Bytes, utils::hex};
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use tracing::debug;

/// Hardhat stores the creation bytecode as a hex string, Foundry nests it in
/// an object alongside the source map and link references.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(String),
    Foundry { object: String },
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: Abi,
    bytecode: RawBytecode,
}

/// The ABI and creation bytecode of a single compiled contract.
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    pub name: String,
    pub path: PathBuf,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Parses an artifact file's contents. The bytecode must be deployable:
    /// non-empty and free of unlinked library placeholders.
    pub fn from_json(name: &str, path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();
        let raw: RawArtifact = serde_json::from_str(json)
            .wrap_err_with(|| format!("malformed artifact {}", path.display()))?;
        let object = match raw.bytecode {
            RawBytecode::Hardhat(object) => object,
            RawBytecode::Foundry { object } => object,
        };

        let object = object.trim();
        let object = object.strip_prefix("0x").unwrap_or(object);
        if object.is_empty() {
            return Err(eyre!(
                "{} has no creation bytecode (is it an interface or abstract contract?)",
                name
            ));
        }
        // Solidity emits `__$<hash>$__` where a library address still needs
        // to be linked in.
        if object.contains("__") {
            return Err(eyre!("{} references unlinked libraries", name));
        }
        let bytecode = hex::decode(object)
            .wrap_err_with(|| format!("invalid bytecode in {}", path.display()))?;

        Ok(Self {
            name: name.to_string(),
            path,
            abi: raw.abi,
            bytecode: Bytes::from(bytecode),
        })
    }
}

/// A directory of compiled artifacts.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact file for `name`. Exactly one `<name>.json` may
    /// exist anywhere below the root.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        let mut found = Vec::new();
        if self.root.is_dir() {
            find_artifacts(&self.root, name, &mut found)?;
        }
        found.sort();

        match found.len() {
            0 => Err(eyre!(
                "artifact not found: no compiled artifact for {} under {}",
                name,
                self.root.display()
            )),
            1 => Ok(found.remove(0)),
            _ => Err(eyre!(
                "ambiguous artifact name {}: {}",
                name,
                found
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    /// Finds and parses the artifact for `name`.
    pub fn load(&self, name: &str) -> Result<ContractArtifact> {
        let path = self.find(name)?;
        let json = fs::read_to_string(&path)
            .wrap_err_with(|| format!("couldn't read artifact {}", path.display()))?;
        let artifact = ContractArtifact::from_json(name, path, &json)?;
        debug!(
            contract = name,
            path = %artifact.path.display(),
            bytecode_len = artifact.bytecode.len(),
            "loaded artifact"
        );
        Ok(artifact)
    }
}

fn find_artifacts(dir: &Path, name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).wrap_err_with(|| format!("couldn't read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            find_artifacts(&path, name, found)?;
        } else if path.extension().is_some_and(|ext| ext == "json")
            && path.file_stem().is_some_and(|stem| stem == name)
        {
            found.push(path);
        }
    }
    Ok(())
}
