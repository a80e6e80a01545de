//! Tile collection from the filesystem.
//!
//! Labeled splits follow the `background/`/`event/` layout: one
//! subdirectory per class, PNG tiles inside. Deployment input is any
//! directory tree of PNG tiles. Collection order is sorted by path so
//! runs over the same tree are deterministic.

use crate::constants::CLASS_DIRS;
use crate::error::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Ground-truth class of a labeled tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileClass {
    /// Background clutter; the drop class.
    Background,
    /// An event worth downlinking; the keep class.
    Event,
}

impl TileClass {
    /// Class index as emitted in decision records.
    pub fn index(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Event => 1,
        }
    }

    /// Whether this is the event (keep) class.
    pub fn is_event(self) -> bool {
        matches!(self, Self::Event)
    }
}

/// Collect labeled tiles from a validation split root.
///
/// Reads `<root>/background/*.png` and `<root>/event/*.png`, each sorted
/// by file name. A missing class directory contributes no tiles rather
/// than erroring, so degenerate single-class splits are representable.
pub fn collect_labeled_tiles(root: &Path) -> Result<Vec<(PathBuf, TileClass)>> {
    let mut tiles = Vec::new();

    for (idx, name) in CLASS_DIRS.iter().enumerate() {
        let class = if idx == 0 {
            TileClass::Background
        } else {
            TileClass::Event
        };
        let dir = root.join(name);
        if !dir.is_dir() {
            warn!("Class directory missing: {}", dir.display());
            continue;
        }

        let mut class_tiles = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && is_tile_file(&path) {
                class_tiles.push(path);
            }
        }
        class_tiles.sort();
        tiles.extend(class_tiles.into_iter().map(|p| (p, class)));
    }

    Ok(tiles)
}

/// Recursively collect unlabeled tiles under a directory, sorted by path.
pub fn collect_tiles(root: &Path) -> Result<Vec<PathBuf>> {
    let mut tiles = Vec::new();
    collect_tiles_recursive(root, &mut tiles)?;
    tiles.sort();
    Ok(tiles)
}

fn collect_tiles_recursive(dir: &Path, tiles: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_tiles_recursive(&path, tiles)?;
        } else if is_tile_file(&path) {
            tiles.push(path);
        }
    }
    Ok(())
}

/// Check if a file is a supported tile image.
fn is_tile_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OsStr::new(crate::constants::TILE_EXTENSION)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_tile_file() {
        assert!(is_tile_file(Path::new("tile_0001.png")));
        assert!(is_tile_file(Path::new("TILE.PNG")));
        assert!(!is_tile_file(Path::new("tile.jpg")));
        assert!(!is_tile_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_collect_labeled_tiles_sorted_per_class() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("background")).unwrap();
        std::fs::create_dir(dir.path().join("event")).unwrap();
        touch(&dir.path().join("background/b2.png"));
        touch(&dir.path().join("background/b1.png"));
        touch(&dir.path().join("event/e1.png"));
        touch(&dir.path().join("event/skip.txt"));

        let tiles = collect_labeled_tiles(dir.path()).unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0].1, TileClass::Background);
        assert!(tiles[0].0.ends_with("b1.png"));
        assert!(tiles[1].0.ends_with("b2.png"));
        assert_eq!(tiles[2].1, TileClass::Event);
    }

    #[test]
    fn test_collect_labeled_tiles_missing_class_dir() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("event")).unwrap();
        touch(&dir.path().join("event/e1.png"));

        let tiles = collect_labeled_tiles(dir.path()).unwrap();
        assert_eq!(tiles.len(), 1);
        assert!(tiles[0].1.is_event());
    }

    #[test]
    fn test_collect_tiles_recursive_sorted() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pass2")).unwrap();
        touch(&dir.path().join("pass2/t1.png"));
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("skip.bin"));

        let tiles = collect_tiles(dir.path()).unwrap();
        assert_eq!(tiles.len(), 2);
        assert!(tiles[0].ends_with("a.png"));
        assert!(tiles[1].ends_with("pass2/t1.png"));
    }

    #[test]
    fn test_tile_class_index() {
        assert_eq!(TileClass::Background.index(), 0);
        assert_eq!(TileClass::Event.index(), 1);
    }
}
