use anyhow::Result;
use std::fs::DirEntry;
use std::path::{Path, PathBuf};

const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mkv", "avi"];

// AppleDouble resource-fork droppings; neither videos nor cleanup candidates.
const METADATA_PREFIX: &str = "._";

/// Recursively partition a directory tree into video files and everything
/// else, skipping platform metadata entries entirely.
pub fn find_files(source: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut videos = Vec::new();
    let mut non_videos = Vec::new();
    walk(source, &mut videos, &mut non_videos)?;
    Ok((videos, non_videos))
}

fn walk(dir: &Path, videos: &mut Vec<PathBuf>, non_videos: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<DirEntry> = dir.read_dir()?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(METADATA_PREFIX)
        {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            walk(&path, videos, non_videos)?;
        } else if is_video(&path) {
            videos.push(path);
        } else {
            non_videos.push(path);
        }
    }

    Ok(())
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod finder_tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    #[test]
    fn partitions_videos_from_the_rest() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("movie.mp4"));
        touch(&dir.path().join("show.mkv"));
        touch(&dir.path().join("clip.avi"));
        touch(&dir.path().join("doc.txt"));

        let (videos, non_videos) = find_files(dir.path()).unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(non_videos.len(), 1);
        assert!(non_videos[0].ends_with("doc.txt"));
    }

    #[test]
    fn walks_nested_directories() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("subdir");
        fs::create_dir(&sub).unwrap();
        touch(&sub.join("movie.avi"));
        touch(&sub.join("readme.md"));

        let (videos, non_videos) = find_files(dir.path()).unwrap();
        assert_eq!(videos.len(), 1);
        assert!(videos[0].ends_with("subdir/movie.avi"));
        assert_eq!(non_videos.len(), 1);
        assert!(non_videos[0].ends_with("subdir/readme.md"));
    }

    #[test]
    fn extensions_match_case_insensitively() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("movie.MP4"));
        touch(&dir.path().join("show.MkV"));

        let (videos, non_videos) = find_files(dir.path()).unwrap();
        assert_eq!(videos.len(), 2);
        assert!(non_videos.is_empty());
    }

    #[test]
    fn metadata_entries_appear_in_neither_set() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("._movie.mp4"));
        touch(&dir.path().join("._DS_junk"));
        touch(&dir.path().join("movie.mp4"));

        let (videos, non_videos) = find_files(dir.path()).unwrap();
        assert_eq!(videos.len(), 1);
        assert!(videos[0].ends_with("movie.mp4"));
        assert!(non_videos.is_empty());
    }

    #[test]
    fn empty_tree_yields_empty_sets() {
        let dir = tempdir().unwrap();
        let (videos, non_videos) = find_files(dir.path()).unwrap();
        assert!(videos.is_empty());
        assert!(non_videos.is_empty());
    }

    #[test]
    fn entries_come_back_sorted_by_name() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.mp4"));
        touch(&dir.path().join("a.mp4"));
        touch(&dir.path().join("c.mp4"));

        let (videos, _) = find_files(dir.path()).unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.mp4", "b.mp4", "c.mp4"]);
    }
}
