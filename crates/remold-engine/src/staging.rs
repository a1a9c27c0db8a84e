//! Output-folder staging.
//!
//! The transformation never touches the original application: a working copy
//! is staged under `<parent>/<appName>-transformed-<timestamp>` and all
//! utilities run against it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use remold_api::Transformation;
use tracing::{debug, info};

use crate::error::StagingError;

/// Names and prepares the working directory, records it on the
/// transformation, and returns it.
pub(crate) fn prepare_output_folder(
    transformation: &mut Transformation,
) -> Result<PathBuf, StagingError> {
    debug!("preparing output folder");

    let application_folder = transformation.application().folder().to_path_buf();
    info!("original application folder: {}", application_folder.display());

    let parent = output_parent(transformation)?;
    let folder_name = format!(
        "{}-transformed-{}",
        transformation.application().name(),
        Local::now().format("%Y%m%d%H%M%S%3f")
    );
    let target = parent.join(folder_name);
    info!("transformed application folder: {}", target.display());

    fs::create_dir(&target).map_err(|e| StagingError::CreateFolder(target.clone(), e))?;
    copy_dir_all(&application_folder, &target).map_err(|e| StagingError::CopyTree {
        from: application_folder.clone(),
        to: target.clone(),
        source: e,
    })?;

    transformation.set_transformed_location(target.clone());
    debug!("transformed application folder is prepared");
    Ok(target)
}

fn output_parent(transformation: &Transformation) -> Result<PathBuf, StagingError> {
    if let Some(folder) = transformation.configuration().get_output_folder() {
        if !folder.exists() {
            return Err(StagingError::InvalidOutputFolder(folder.to_path_buf()));
        }
        return Ok(folder.to_path_buf());
    }
    match transformation.application().folder().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => std::env::current_dir().map_err(StagingError::OutputParent),
    }
}

fn copy_dir_all(src: &Path, dest: &Path) -> Result<(), std::io::Error> {
    if !dest.exists() {
        fs::create_dir_all(dest)?;
    }
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<(), std::io::Error> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<(), std::io::Error> {
    // No symlink privileges assumed; copy what the link points at.
    fs::copy(src, dest).map(|_| ())
}
