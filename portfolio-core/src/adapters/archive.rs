//! tar.gz archive writer for synthesized backups

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, Header};

use crate::domain::result::{Error, Result};

/// Name of the placeholder entry written when no artifacts exist
pub const PLACEHOLDER_NAME: &str = "BACKUP_PLACEHOLDER.txt";

/// What went into an archive
#[derive(Debug, Default)]
pub struct ArchiveManifest {
    /// Artifacts that were added, relative to the source root
    pub included: Vec<PathBuf>,
    /// Configured artifacts that did not exist
    pub missing: Vec<PathBuf>,
    pub placeholder: bool,
    pub size_bytes: u64,
}

/// Pack `artifacts` (relative to `root`) into a gzip-compressed tarball at `dest`.
///
/// Directories are added recursively. When none of the artifacts exist, a
/// small placeholder file is archived instead so every backup is a valid
/// tarball.
pub fn write_archive(
    dest: &Path,
    root: &Path,
    artifacts: &[PathBuf],
    placeholder_text: &str,
) -> Result<ArchiveManifest> {
    let file = File::create(dest)
        .map_err(|e| Error::filesystem(format!("cannot create {}: {}", dest.display(), e)))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut manifest = ArchiveManifest::default();
    for artifact in artifacts {
        let source = root.join(artifact);
        if source.is_dir() {
            builder.append_dir_all(artifact, &source)?;
        } else if source.is_file() {
            builder.append_path_with_name(&source, artifact)?;
        } else {
            manifest.missing.push(artifact.clone());
            continue;
        }
        manifest.included.push(artifact.clone());
    }

    if manifest.included.is_empty() {
        let data = placeholder_text.as_bytes();
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(chrono::Utc::now().timestamp().max(0) as u64);
        header.set_cksum();
        builder.append_data(&mut header, PLACEHOLDER_NAME, data)?;
        manifest.placeholder = true;
    }

    let encoder = builder.into_inner()?;
    let mut file = encoder.finish()?;
    file.flush()?;
    drop(file);

    manifest.size_bytes = fs::metadata(dest)?.len();
    Ok(manifest)
}
