//! Delivery of artifacts to the user.
//!
//! Delivery happens in three steps: stage a temporary reference to the bytes,
//! trigger the download under the configured name, and revoke the reference.
//! The revoke runs from a drop guard, so it happens even when the trigger
//! fails.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::transport::Artifact;

/// Destination for delivered artifacts
pub trait ArtifactSink: Send + Sync {
    /// Temporary client-local handle on staged bytes
    type Ref;

    fn create_ref(&self, artifact: &Artifact) -> io::Result<Self::Ref>;

    /// Hand the staged bytes to the user under `file_name`; returns where
    /// they ended up.
    fn trigger(&self, reference: &Self::Ref, file_name: &str) -> io::Result<PathBuf>;

    /// Release the staged bytes. The reference itself is dropped right after.
    fn revoke(&self, reference: &Self::Ref);
}

/// Revokes the held reference when dropped
struct RevokeGuard<'a, S: ArtifactSink> {
    sink: &'a S,
    reference: S::Ref,
}

impl<S: ArtifactSink> RevokeGuard<'_, S> {
    fn reference(&self) -> &S::Ref {
        &self.reference
    }
}

impl<S: ArtifactSink> Drop for RevokeGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.revoke(&self.reference);
    }
}

/// Stage, trigger and always revoke.
///
/// Blocking; async callers run it on the blocking pool.
pub fn deliver<S: ArtifactSink>(
    sink: &S,
    artifact: &Artifact,
    file_name: &str,
) -> io::Result<PathBuf> {
    let guard = RevokeGuard {
        sink,
        reference: sink.create_ref(artifact)?,
    };
    let saved = sink.trigger(guard.reference(), file_name);
    drop(guard);
    saved
}

/// Saves artifacts into a directory, browser style: a taken name gets a
/// ` (n)` suffix instead of being overwritten.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

/// How many ` (n)` suffixes to try before giving up
const MAX_NAME_ATTEMPTS: u32 = 1000;

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn create_unique(&self, file_name: &str) -> io::Result<(PathBuf, File)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = self.dir.join(numbered_name(file_name, attempt));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("No free file name for {} in {}", file_name, self.dir.display()),
        ))
    }
}

impl ArtifactSink for DirectorySink {
    type Ref = NamedTempFile;

    fn create_ref(&self, artifact: &Artifact) -> io::Result<NamedTempFile> {
        std::fs::create_dir_all(&self.dir)?;
        let mut staged = tempfile::Builder::new()
            .prefix(".portal-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staged.write_all(&artifact.bytes)?;
        staged.flush()?;
        Ok(staged)
    }

    fn trigger(&self, reference: &NamedTempFile, file_name: &str) -> io::Result<PathBuf> {
        let (destination, mut target) = self.create_unique(file_name)?;
        let copied = File::open(reference.path()).and_then(|mut source| {
            io::copy(&mut source, &mut target)?;
            target.sync_all()
        });
        if let Err(e) = copied {
            drop(target);
            let _ = std::fs::remove_file(&destination);
            return Err(e);
        }
        Ok(destination)
    }

    fn revoke(&self, reference: &NamedTempFile) {
        let path = reference.path();
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Failed to remove staged artifact {}: {}", path.display(), e);
        }
    }
}

/// `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn numbered_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!(
            "{} ({}){}",
            &file_name[..dot],
            attempt,
            &file_name[dot..]
        ),
        _ => format!("{} ({})", file_name, attempt),
    }
}
