//! Recursive, mode-preserving copies of static files and directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("source is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("refusing to write through symlink: {}", .0.display())]
    SymlinkTarget(PathBuf),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> CopyError + '_ {
    move |source| CopyError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn refuse_symlink(path: &Path) -> Result<(), CopyError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            Err(CopyError::SymlinkTarget(path.to_path_buf()))
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CopyError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Copy one file, creating the destination's parent directories.
///
/// Permission bits follow the source. Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, CopyError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(io_at(parent))?;
    }
    fs::copy(src, dst).map_err(io_at(src))
}

/// Copy the directory `src` to `dst`, recursively.
///
/// `dst` itself becomes the copy of `src` (its contents land directly inside
/// it). Directory permissions are applied after their contents are written so
/// read-only source directories do not block the copy. Returns the number of
/// files copied. Existing symlinks inside `dst` are never written through.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, CopyError> {
    let meta = fs::metadata(src).map_err(io_at(src))?;
    if !meta.is_dir() {
        return Err(CopyError::NotADirectory(src.to_path_buf()));
    }

    refuse_symlink(dst)?;
    fs::create_dir_all(dst).map_err(io_at(dst))?;
    let mut dir_permissions = vec![(dst.to_path_buf(), meta.permissions())];
    let mut files = 0;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        refuse_symlink(&target)?;

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_at(&target))?;
            let perms = entry.metadata()?.permissions();
            dir_permissions.push((target, perms));
        } else {
            fs::copy(entry.path(), &target).map_err(io_at(entry.path()))?;
            files += 1;
        }
    }

    // Innermost first, so a read-only parent is applied after its children.
    for (dir, perms) in dir_permissions.into_iter().rev() {
        fs::set_permissions(&dir, perms).map_err(io_at(&dir))?;
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("404.html");
        fs::write(&src, "<h1>missing</h1>").unwrap();

        let dst = tmp.path().join("out/nested/404.html");
        let bytes = copy_file(&src, &dst).unwrap();

        assert_eq!(bytes, 16);
        assert_eq!(fs::read_to_string(dst).unwrap(), "<h1>missing</h1>");
    }

    #[test]
    fn copy_file_missing_source_names_path() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("nope.css");
        let err = copy_file(&src, &tmp.path().join("out.css")).unwrap_err();
        assert!(err.to_string().contains("nope.css"));
    }

    #[test]
    fn copy_dir_recurses() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("assets");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("styles.css"), "body{}").unwrap();
        fs::write(src.join("nested/styles.css"), "p{}").unwrap();

        let dst = tmp.path().join("dist/assets");
        let files = copy_dir(&src, &dst).unwrap();

        assert_eq!(files, 2);
        assert_eq!(fs::read_to_string(dst.join("styles.css")).unwrap(), "body{}");
        assert_eq!(fs::read_to_string(dst.join("nested/styles.css")).unwrap(), "p{}");
    }

    #[test]
    fn copy_dir_keeps_empty_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("assets");
        fs::create_dir_all(src.join("empty")).unwrap();

        let dst = tmp.path().join("dist/assets");
        assert_eq!(copy_dir(&src, &dst).unwrap(), 0);
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn copy_dir_rejects_file_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("file.txt");
        fs::write(&src, "x").unwrap();
        assert!(matches!(
            copy_dir(&src, &tmp.path().join("out")),
            Err(CopyError::NotADirectory(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_does_not_follow_symlinks_in_destination() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.css");
        fs::write(&victim, "ORIGINAL").unwrap();

        let src = tmp.path().join("assets");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("style.css"), "body{}").unwrap();

        let dst = tmp.path().join("dist/assets");
        fs::create_dir_all(&dst).unwrap();
        std::os::unix::fs::symlink(&victim, dst.join("style.css")).unwrap();

        assert!(matches!(copy_dir(&src, &dst), Err(CopyError::SymlinkTarget(_))));
        assert_eq!(fs::read_to_string(&victim).unwrap(), "ORIGINAL");
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("run.sh");
        fs::write(&src, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        let dst = tmp.path().join("out/run.sh");
        copy_file(&src, &dst).unwrap();

        let mode = fs::metadata(dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }
}
