//! On-disk persistence: atomic whole-file JSON rewrites for the index and
//! doc store, and the append-only JSONL crawl dump.
//!
//! Writes go to `{path}.tmp` first, then rename over the final path, so a
//! reader (or a crashed process) never observes a partially-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::warn;

use crate::core::types::PageRecord;

/// Serialise `value` as pretty-printed JSON and atomically replace `path`
/// with it. Parent directories are created on demand.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value).context("serialising to JSON")?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} → {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Append-only crawl dump: one JSON PageRecord per line, UTF-8 with
/// non-ASCII preserved. Dump failures are absorbed; losing a dump line
/// never stalls the crawl.
pub struct PageDump {
    path: PathBuf,
}

impl PageDump {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, record: &PageRecord) {
        if let Err(e) = self.try_append(record) {
            warn!("dump: failed to append {}: {:#}", record.url, e);
        }
    }

    fn try_append(&self, record: &PageRecord) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let line = serde_json::to_string(record).context("serialising PageRecord")?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        writeln!(file, "{line}").with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
