use std::path::{Path, PathBuf};

/// Map a backed-up file to its renamed location in the working tree.
///
/// `root_marker` is stripped from the front of `original` when present, so
/// `BACKUP/trip/IMG_1.jpg` becomes `trip/<new_file_name>`. Paths that do not
/// start with the marker keep their directories as they are.
pub fn rewrite(original: &Path, new_file_name: &str, root_marker: &Path) -> PathBuf {
    let relative = original.strip_prefix(root_marker).unwrap_or(original);
    match relative.parent() {
        Some(dir) => dir.join(new_file_name),
        None => PathBuf::from(new_file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{MediaFile, OrderOptions, order};
    use std::collections::HashSet;

    #[test]
    fn strips_marker_and_replaces_file_name() {
        let p = rewrite(
            Path::new("BACKUP/2024/trip/IMG_0001.jpg"),
            "2024-03-01 001.jpg",
            Path::new("BACKUP"),
        );
        assert_eq!(p, PathBuf::from("2024/trip/2024-03-01 001.jpg"));
    }

    #[test]
    fn top_level_file_lands_at_root() {
        let p = rewrite(Path::new("BACKUP/a.txt"), "001.txt", Path::new("BACKUP"));
        assert_eq!(p, PathBuf::from("001.txt"));
    }

    #[test]
    fn already_stripped_path_keeps_directories() {
        let marker = Path::new("BACKUP");
        let once = rewrite(Path::new("BACKUP/x/y/a.jpg"), "001.jpg", marker);
        let twice = rewrite(&once, "002.jpg", marker);
        assert_eq!(once, PathBuf::from("x/y/001.jpg"));
        assert_eq!(twice, PathBuf::from("x/y/002.jpg"));
    }

    #[test]
    fn marker_only_matches_whole_components() {
        let p = rewrite(
            Path::new("BACKUP_old/a.jpg"),
            "001.jpg",
            Path::new("BACKUP"),
        );
        assert_eq!(p, PathBuf::from("BACKUP_old/001.jpg"));
    }

    #[test]
    fn ordered_set_rewrites_to_distinct_paths() {
        let files = vec![
            MediaFile::new("BACKUP/a/1.jpg", Some("2024-01-01 10:00:00")),
            MediaFile::new("BACKUP/a/2.jpg", Some("2024-01-01 10:00:00")),
            MediaFile::new("BACKUP/b/3.jpg", Some("2024-01-01 10:00:00")),
            MediaFile::new("BACKUP/a/4.txt", None),
            MediaFile::new("BACKUP/b/5.txt", None),
        ];
        let out = order(
            &files,
            OrderOptions {
                sort_by_date: true,
                show_date_in_name: true,
            },
        );
        let paths: HashSet<PathBuf> = out
            .iter()
            .map(|s| rewrite(&s.original_path, &s.new_file_name, Path::new("BACKUP")))
            .collect();
        assert_eq!(paths.len(), files.len());
        assert!(paths.contains(&PathBuf::from("a/2024-01-01 001.jpg")));
        assert!(paths.contains(&PathBuf::from("b/2024-01-01 003.jpg")));
        assert!(paths.contains(&PathBuf::from("b/002.txt")));
    }
}
