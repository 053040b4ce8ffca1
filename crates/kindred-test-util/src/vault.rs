use std::path::{Path, PathBuf};

/// Write a note at `rel` under `root`, creating parent folders.
///
/// Returns the absolute path of the written file.
pub fn write_note(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Read a note back as a string.
pub fn read_note(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}
