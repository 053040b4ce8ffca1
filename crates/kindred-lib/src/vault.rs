use std::fs;
use std::io::Write as _;
use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use tracing::debug;

use crate::config::NOTE_EXTENSION;
use crate::pipeline::terms::strip_extension;

/// A note addressed by its vault-relative, `/`-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteRef {
    path: String,
}

impl NoteRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name including extension.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without extension, as shown to users.
    pub fn display_name(&self) -> &str {
        strip_extension(self.file_name())
    }

    /// Path without extension, the form used inside note links.
    pub fn link_target(&self) -> &str {
        strip_extension(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rfind('.').map(|idx| &name[idx + 1..])
    }

    /// Whether this note takes part in ranking.
    pub fn is_content_note(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
    }
}

/// The host application's view of the note base.
///
/// The pipeline only touches notes through this trait.
pub trait NoteHost {
    /// The note the user is currently working on.
    fn active_note(&self) -> Option<NoteRef>;

    fn read_note(&self, note: &NoteRef) -> anyhow::Result<String>;

    /// Resolve a vault-relative path to an existing note.
    fn resolve_note(&self, path: &str) -> Option<NoteRef>;

    /// Absolute path of the vault root.
    fn root_path(&self) -> Option<PathBuf>;

    /// Apply `transform` to the note's current content and persist the result
    /// without exposing an intermediate state.
    fn transform_note(
        &self,
        note: &NoteRef,
        transform: &dyn Fn(&str) -> String,
    ) -> anyhow::Result<()>;
}

/// A note base backed by a plain directory.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    active: Option<String>,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: None,
        }
    }

    /// Mark `path` (vault-relative or absolute inside the vault) as the
    /// active note. Paths that do not resolve leave no active note.
    #[must_use]
    pub fn with_active(mut self, path: &Path) -> Self {
        self.active = self.relative_path(path);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an absolute-or-relative filesystem path into a
    /// vault-relative, `/`-separated path.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?
        } else {
            path
        };
        normalize_rel_path(&rel.to_string_lossy())
    }

    fn absolute(&self, note: &NoteRef) -> PathBuf {
        self.root.join(note.path())
    }
}

impl NoteHost for FsVault {
    fn active_note(&self) -> Option<NoteRef> {
        self.active.as_deref().and_then(|p| self.resolve_note(p))
    }

    fn read_note(&self, note: &NoteRef) -> anyhow::Result<String> {
        let path = self.absolute(note);
        fs::read_to_string(&path).with_context(|| format!("read note: {}", path.display()))
    }

    fn resolve_note(&self, path: &str) -> Option<NoteRef> {
        let rel = normalize_rel_path(path)?;
        let note = NoteRef::new(rel);
        self.absolute(&note).is_file().then_some(note)
    }

    fn root_path(&self) -> Option<PathBuf> {
        if self.root.is_dir() {
            fs::canonicalize(&self.root).ok()
        } else {
            None
        }
    }

    fn transform_note(
        &self,
        note: &NoteRef,
        transform: &dyn Fn(&str) -> String,
    ) -> anyhow::Result<()> {
        let path = self.absolute(note);
        let current = self.read_note(note)?;
        let next = transform(&current);
        if next == current {
            debug!(note = note.path(), "Note unchanged, skipping write");
            return Ok(());
        }

        let dir = path.parent().unwrap_or(&self.root);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        tmp.write_all(next.as_bytes())?;
        tmp.persist(&path)
            .with_context(|| format!("write note: {}", path.display()))?;
        debug!(note = note.path(), bytes = next.len(), "Note written");
        Ok(())
    }
}

/// Normalize a relative path to `/` separators, rejecting anything that
/// could escape the vault.
fn normalize_rel_path(raw: &str) -> Option<String> {
    let unified = raw.replace('\\', "/");
    let mut parts = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_with(files: &[(&str, &str)]) -> (tempfile::TempDir, FsVault) {
        let tmp = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let vault = FsVault::new(tmp.path());
        (tmp, vault)
    }

    #[test]
    fn note_ref_names() {
        let note = NoteRef::new("projects/v1.2/Rust Notes.md");
        assert_eq!(note.file_name(), "Rust Notes.md");
        assert_eq!(note.display_name(), "Rust Notes");
        assert_eq!(note.link_target(), "projects/v1.2/Rust Notes");
        assert_eq!(note.extension(), Some("md"));
        assert!(note.is_content_note());
        assert!(!NoteRef::new("img/photo.png").is_content_note());
        assert!(!NoteRef::new("README").is_content_note());
    }

    #[test]
    fn resolve_existing_and_missing_notes() {
        let (_tmp, vault) = vault_with(&[("a/b.md", "hello")]);
        assert_eq!(vault.resolve_note("a/b.md"), Some(NoteRef::new("a/b.md")));
        assert_eq!(vault.resolve_note("./a\\b.md"), Some(NoteRef::new("a/b.md")));
        assert_eq!(vault.resolve_note("a/missing.md"), None);
        assert_eq!(vault.resolve_note("a"), None);
    }

    #[test]
    fn resolve_rejects_escaping_paths() {
        let (_tmp, vault) = vault_with(&[("a/b.md", "hello")]);
        assert_eq!(vault.resolve_note("../b.md"), None);
        assert_eq!(vault.resolve_note("/etc/passwd"), None);
        assert_eq!(vault.resolve_note(""), None);
    }

    #[test]
    fn active_note_accepts_absolute_paths_inside_vault() {
        let (tmp, vault) = vault_with(&[("daily/today.md", "x")]);
        let vault = vault.with_active(&tmp.path().join("daily").join("today.md"));
        assert_eq!(vault.active_note(), Some(NoteRef::new("daily/today.md")));
    }

    #[test]
    fn active_note_missing_file_is_none() {
        let (_tmp, vault) = vault_with(&[]);
        let vault = vault.with_active(Path::new("nope.md"));
        assert_eq!(vault.active_note(), None);
    }

    #[test]
    fn transform_rewrites_content() {
        let (tmp, vault) = vault_with(&[("n.md", "body")]);
        let note = NoteRef::new("n.md");
        vault
            .transform_note(&note, &|current| format!("{current}\nmore"))
            .unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("n.md")).unwrap(),
            "body\nmore"
        );
    }

    #[test]
    fn root_path_of_missing_dir_is_none() {
        let vault = FsVault::new("/definitely/not/a/vault");
        assert!(vault.root_path().is_none());
    }
}
