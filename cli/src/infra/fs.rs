//! Filesystem infrastructure: implements `LocalFs` and `ArtifactInstaller`.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::application::ports::{ArtifactInstaller, LocalFs};
use crate::domain::{InstallOutcome, InstallTarget, SupplyError};

/// Production filesystem implementation of the filesystem ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl LocalFs for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn Write>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }

    fn create_dir(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir(path)
    }
}

impl ArtifactInstaller for HostFs {
    fn install_binary(&self, target: &InstallTarget) -> Result<InstallOutcome> {
        let destination = &target.destination;
        let present = destination
            .try_exists()
            .map_err(install_failed(destination))?;
        if present {
            debug!(path = %destination.display(), "binary already installed, skipping");
            return Ok(InstallOutcome::AlreadyPresent);
        }

        // The final path only ever holds a complete copy.
        let staging = partial_path(destination);
        copy_file(&target.source, &staging)?;
        std::fs::rename(&staging, destination).map_err(install_failed(destination))?;
        match sha256_file(destination) {
            Ok(digest) => debug!(path = %destination.display(), sha256 = %digest, "binary installed"),
            Err(err) => warn!(path = %destination.display(), error = %err, "cannot hash installed binary"),
        }
        Ok(InstallOutcome::Installed)
    }

    fn install_tree(&self, target: &InstallTarget) -> Result<usize> {
        let root = &target.source;
        if !root.is_dir() {
            warn!(path = %root.display(), "source tree missing, nothing to install");
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                SupplyError::InstallFailed {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
            copy_file(entry.path(), &target.destination.join(relative))?;
            copied += 1;
        }
        debug!(
            from = %root.display(),
            to = %target.destination.display(),
            files = copied,
            "tree installed"
        );
        Ok(copied)
    }
}

/// Copy one file, creating the destination's parent directories and
/// carrying the source's permission bits over.
///
/// The error names whichever side failed.
fn copy_file(source: &Path, destination: &Path) -> Result<(), SupplyError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(install_failed(parent))?;
    }
    let mut reader = File::open(source).map_err(install_failed(source))?;
    let permissions = reader
        .metadata()
        .map_err(install_failed(source))?
        .permissions();
    let mut writer = File::create(destination).map_err(install_failed(destination))?;
    std::io::copy(&mut reader, &mut writer).map_err(install_failed(destination))?;
    writer
        .set_permissions(permissions)
        .map_err(install_failed(destination))?;
    Ok(())
}

fn install_failed(path: &Path) -> impl FnOnce(std::io::Error) -> SupplyError + '_ {
    move |source| SupplyError::InstallFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// `<destination>.partial`
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Compute the SHA256 hex digest of a file.
///
/// Reads the file in 64 KB chunks to avoid loading large files into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file.read(&mut buf).context("reading file")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
