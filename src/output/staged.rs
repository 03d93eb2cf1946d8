/// All-or-nothing output writes.
///
/// Files are queued with their contents, then `commit` runs in three passes:
/// create every target directory, stage every file as a temp file next to
/// its target, and only then rename the temp files into place. A failure in
/// the first two passes leaves no output file behind; staged temp files are
/// removed when dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::SoiError;

#[derive(Debug, Default)]
pub struct OutputBatch {
    files: Vec<(PathBuf, String)>,
}

impl OutputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `contents` for `<dir>/<file_name>` in every dir and returns the
    /// target paths. Nothing is written until `commit`.
    pub fn add(&mut self, contents: &str, dirs: &[PathBuf], file_name: &str) -> Vec<PathBuf> {
        dirs.iter()
            .map(|dir| {
                let path = dir.join(file_name);
                self.files.push((path.clone(), contents.to_string()));
                path
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Writes every queued file, returning the paths in queue order.
    pub fn commit(self) -> Result<Vec<PathBuf>, SoiError> {
        for (path, _) in &self.files {
            std::fs::create_dir_all(parent_dir(path)).map_err(|e| output_error(path, e))?;
        }

        let mut staged = Vec::with_capacity(self.files.len());
        for (path, contents) in &self.files {
            staged.push((stage(path, contents)?, path));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, path) in staged {
            tmp.persist(path).map_err(|e| output_error(path, e.error))?;
            written.push(path.clone());
        }
        Ok(written)
    }
}

fn stage(path: &Path, contents: &str) -> Result<NamedTempFile, SoiError> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(|e| output_error(path, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| output_error(path, e))?;
    Ok(tmp)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn output_error(path: &Path, e: std::io::Error) -> SoiError {
    SoiError::Output {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_writes_every_queued_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut batch = OutputBatch::new();
        let csv = batch.add("a,b\n", &[tmp.path().join("x"), tmp.path().join("y/z")], "t.csv");
        let json = batch.add("{}", &[tmp.path().join("charts")], "c.json");
        assert_eq!(batch.len(), 3);

        let written = batch.commit().unwrap();
        assert_eq!(written, [csv, json].concat());
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "a,b\n");
        assert_eq!(std::fs::read_to_string(&written[2]).unwrap(), "{}");
    }

    #[test]
    fn test_bad_dir_anywhere_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let mut batch = OutputBatch::new();
        let good = batch.add("a,b\n", &[tmp.path().join("data")], "t.csv");
        batch.add("{}", &[blocker.join("figs")], "c.json");

        let result = batch.commit();
        assert!(matches!(result, Err(SoiError::Output { .. })));
        assert!(!good[0].exists());
    }

    #[test]
    fn test_commit_replaces_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("t.csv"), "old").unwrap();

        let mut batch = OutputBatch::new();
        batch.add("new", &[tmp.path().to_path_buf()], "t.csv");
        batch.commit().unwrap();

        assert_eq!(std::fs::read_to_string(tmp.path().join("t.csv")).unwrap(), "new");
        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1, "no temp files left behind");
    }
}
