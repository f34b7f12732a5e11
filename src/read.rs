use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use ignore::WalkBuilder;
use memmap2::Mmap;

use crate::error::TocError;
use crate::host::{Document, DocumentSource};

// Directories never worth descending into when collecting notes.
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target", "dist", "build", ".cache"];

const MARKDOWN_EXTS: &[&str] = &["md", "markdown", "mdown", "mkd"];

/// Read a document as text. Invalid UTF-8 is replaced, not rejected.
pub fn read_document(path: &Path) -> Result<String, TocError> {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TocError::NotFound {
                path: path.to_path_buf(),
                suggestion: suggest_similar(path),
            });
        }
        Err(e) => return Err(TocError::from_io(path, e)),
    };

    if meta.is_dir() {
        return Err(TocError::InvalidArgs(format!(
            "{} is a directory",
            path.display()
        )));
    }

    // Empty check before mmap — mmap on 0-byte file may fail on some platforms
    if meta.len() == 0 {
        return Ok(String::new());
    }

    let file = fs::File::open(path).map_err(|e| TocError::from_io(path, e))?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| TocError::from_io(path, e))?;
    Ok(String::from_utf8_lossy(&mmap[..]).into_owned())
}

/// Serves whichever file is currently selected. A selected file that has
/// since disappeared reads as "nothing selected".
#[derive(Debug, Default)]
pub struct FileSource {
    selected: RwLock<Option<PathBuf>>,
}

impl FileSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            selected: RwLock::new(path),
        }
    }

    pub fn select(&self, path: PathBuf) {
        *self.write_selected() = Some(path);
    }

    pub fn clear(&self) {
        *self.write_selected() = None;
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        match self.selected.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_selected(&self) -> std::sync::RwLockWriteGuard<'_, Option<PathBuf>> {
        match self.selected.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DocumentSource for FileSource {
    fn selected(&self) -> Result<Option<Document>, TocError> {
        let Some(path) = self.selected_path() else {
            return Ok(None);
        };
        match read_document(&path) {
            Ok(body) => Ok(Some(Document {
                id: path.display().to_string(),
                body,
            })),
            Err(TocError::NotFound { .. }) => {
                tracing::debug!(path = %path.display(), "selected file is gone");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Collect Markdown files under `root`, sorted by path.
pub fn markdown_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .filter_entry(|entry| {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                if let Some(name) = entry.file_name().to_str() {
                    return !SKIP_DIRS.contains(&name);
                }
            }
            true
        })
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| is_markdown(path))
        .collect();
    files.sort();
    files
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKDOWN_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Closest sibling file name within three edits, for did-you-mean hints.
/// Ties go to the first name in directory order.
fn suggest_similar(path: &Path) -> Option<String> {
    const MAX_EDITS: usize = 3;

    let wanted = path.file_name()?.to_str()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .map(|name| (edit_distance(wanted, &name), name))
        .filter(|(dist, _)| *dist <= MAX_EDITS)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, name)| name)
}

/// Levenshtein distance over bytes, keeping a single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b = b.as_bytes();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.as_bytes().iter().enumerate() {
        // `diag` holds the previous row's value at column j
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = diag + usize::from(ca != cb);
            diag = row[j + 1];
            row[j + 1] = substitute.min(diag + 1).min(row[j] + 1);
        }
    }
    row[b.len()]
}
