use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All files under `root`, relative to it. Each directory lists its files
/// first, then its subdirectories, both in file-name order.
///
/// Directories named in `skip_dirs` (directly under `root`) are not
/// entered, and the running executable is never listed.
pub fn list_files(root: &Path, skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.canonicalize().ok());

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then(a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() == 1 && e.file_type().is_dir() && is_skipped(e.path(), skip_dirs))
        })
    {
        let entry = entry.with_context(|| format!("Cannot read {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(exe) = &exe {
            if entry.path().canonicalize().ok().as_ref() == Some(exe) {
                continue;
            }
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(rel);
    }
    Ok(files)
}

fn is_skipped(path: &Path, skip_dirs: &[&str]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| skip_dirs.contains(&n))
}

/// Recreate `src` (directories and files) under `dest`.
///
/// The tree is listed before anything is copied, so `dest` may live
/// inside `src`.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let entries: Vec<walkdir::DirEntry> = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_type().is_dir() && e.path() == dest))
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Cannot list {}", src.display()))?;

    ensure_dir(dest)?;
    let mut copied = 0usize;
    for entry in entries {
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy one file, creating the destination's parent folders.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dest)
        .with_context(|| format!("Copy failed: {} → {}", src.display(), dest.display()))?;
    Ok(())
}

pub fn delete_files(root: &Path, rels: &[PathBuf]) -> Result<()> {
    for rel in rels {
        let path = root.join(rel);
        fs::remove_file(&path).with_context(|| format!("Cannot delete {}", path.display()))?;
    }
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Cannot create folder {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn tmpdir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "photo_renumber_fs_test_{}_{id}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn list_files_is_recursive_relative_and_sorted() {
        let tmp = tmpdir();
        touch(&tmp.join("b.jpg"), "b");
        touch(&tmp.join("a.jpg"), "a");
        touch(&tmp.join("trip/day1/c.mp4"), "c");

        let files = list_files(&tmp, &[]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.jpg"),
                PathBuf::from("trip/day1/c.mp4"),
            ]
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn list_files_puts_files_before_subdirectories() {
        let tmp = tmpdir();
        touch(&tmp.join("a/inner.jpg"), "i");
        touch(&tmp.join("a/z.jpg"), "z");
        touch(&tmp.join("a/deeper/d.jpg"), "d");
        touch(&tmp.join("b.jpg"), "b");

        let files = list_files(&tmp, &[]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("b.jpg"),
                PathBuf::from("a/inner.jpg"),
                PathBuf::from("a/z.jpg"),
                PathBuf::from("a/deeper/d.jpg"),
            ]
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn list_files_skips_named_top_level_dirs() {
        let tmp = tmpdir();
        touch(&tmp.join("a.jpg"), "a");
        touch(&tmp.join("BACKUP/a.jpg"), "a");
        touch(&tmp.join("trip/BACKUP/kept.jpg"), "k");

        let files = list_files(&tmp, &["BACKUP"]).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("a.jpg"), PathBuf::from("trip/BACKUP/kept.jpg")]
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn list_files_empty_dir() {
        let tmp = tmpdir();
        assert!(list_files(&tmp, &[]).unwrap().is_empty());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn copy_tree_into_own_subfolder() {
        let tmp = tmpdir();
        touch(&tmp.join("a.jpg"), "a");
        touch(&tmp.join("trip/b.jpg"), "b");
        fs::create_dir_all(tmp.join("empty")).unwrap();

        let copied = copy_tree(&tmp, &tmp.join("BACKUP")).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(tmp.join("BACKUP/a.jpg")).unwrap(), "a");
        assert_eq!(fs::read_to_string(tmp.join("BACKUP/trip/b.jpg")).unwrap(), "b");
        assert!(tmp.join("BACKUP/empty").is_dir());
        assert!(!tmp.join("BACKUP/BACKUP").exists());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn copy_file_creates_parents() {
        let tmp = tmpdir();
        touch(&tmp.join("a.txt"), "hello");
        copy_file(&tmp.join("a.txt"), &tmp.join("x/y/z.txt")).unwrap();
        assert_eq!(fs::read_to_string(tmp.join("x/y/z.txt")).unwrap(), "hello");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn delete_files_removes_only_listed() {
        let tmp = tmpdir();
        touch(&tmp.join("a.txt"), "a");
        touch(&tmp.join("sub/b.txt"), "b");
        delete_files(&tmp, &[PathBuf::from("sub/b.txt")]).unwrap();
        assert!(tmp.join("a.txt").exists());
        assert!(!tmp.join("sub/b.txt").exists());
        assert!(tmp.join("sub").is_dir());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn delete_missing_file_errors() {
        let tmp = tmpdir();
        assert!(delete_files(&tmp, &[PathBuf::from("ghost.txt")]).is_err());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tmpdir();
        ensure_dir(&tmp.join("a/b/c")).unwrap();
        ensure_dir(&tmp.join("a/b/c")).unwrap();
        assert!(tmp.join("a/b/c").is_dir());
        let _ = fs::remove_dir_all(&tmp);
    }
}
