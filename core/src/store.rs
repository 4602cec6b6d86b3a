use crate::StoryRecord;
use anyhow::Result;
use sha1::{Digest, Sha1};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

/// Append-only JSONL file of story records, one object per line.
#[derive(Debug, Clone)]
pub struct StoryStore {
    pub path: PathBuf,
}

impl StoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Create the file (and parent directories) if missing; existing content is left alone.
    pub fn ensure(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() { create_dir_all(dir)?; }
        }
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }

    pub fn append(&self, record: &StoryRecord) -> Result<()> {
        self.ensure()?;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        f.write_all(line.as_bytes())?;
        Ok(())
    }

    /// All parseable records in file order. Blank and malformed lines are skipped.
    pub fn list(&self) -> Result<Vec<StoryRecord>> {
        self.ensure()?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() { continue; }
            match serde_json::from_str::<StoryRecord>(line) {
                Ok(rec) => records.push(rec),
                Err(e) => tracing::debug!(lineno = lineno + 1, error = %e, "skipping malformed story record"),
            }
        }
        Ok(records)
    }
}

/// Build a record with a fresh hex id derived from its content and the current time.
pub fn new_record(title: &str, body: &str, tags: Vec<String>) -> StoryRecord {
    let title = if title.trim().is_empty() { "Untitled" } else { title.trim() };
    let ts = time::OffsetDateTime::now_utc();
    let mut hasher = Sha1::new();
    hasher.update(title.as_bytes());
    hasher.update(body.as_bytes());
    hasher.update(ts.format(&Rfc3339).unwrap_or_default().as_bytes());
    hasher.update(ts.unix_timestamp_nanos().to_le_bytes());
    let id = format!("{:x}", hasher.finalize());
    StoryRecord { id, title: title.to_string(), body: body.to_string(), tags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = StoryStore::new(dir.path().join("data/stories.jsonl"));
        store.ensure().unwrap();
        store.append(&new_record("t", "b", vec![])).unwrap();
        store.ensure().unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stories.jsonl");
        std::fs::write(
            &path,
            "{\"id\":\"1\",\"title\":\"One\",\"body\":\"first\",\"tags\":[]}\n\nnot json\n{\"id\":\"2\",\"title\":\"Two\",\"body\":\"second\"}\n{\"id\":3}\n",
        )
        .unwrap();
        let recs = StoryStore::new(&path).list().unwrap();
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(recs[1].tags.is_empty());
    }

    #[test]
    fn new_record_defaults_title() {
        let r = new_record("  ", "body", vec!["Ownership".into()]);
        assert_eq!(r.title, "Untitled");
        assert_eq!(r.id.len(), 40);
    }
}
