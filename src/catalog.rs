//! Course catalog - deduplicated course pool persisted as JSON
//!
//! Records come from the portal's `queryKxrw` style responses pasted by the
//! user. Three shapes are understood:
//!
//! - `{"kxrwList": {"list": [...]}}` (available teaching tasks)
//! - `{"yxkcList": [...]}` (already selected courses)
//! - a bare array of items
//!
//! Each item contributes `id`, `kcdm`, `kcmc` and `dgjsmc`.

use crate::error::{ErrorKind, Result};
use crate::model::structs::CourseRecord;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix added by the capture userscript in front of the response body.
pub const CAPTURE_PREFIX: &str = "MY_CAPTURE:";

#[derive(Debug)]
pub struct CourseCatalog {
    path: PathBuf,
    courses: Vec<CourseRecord>,
    seen_pids: HashSet<String>,
}

impl CourseCatalog {
    /// Create an empty catalog backed by `path`. Nothing is read until
    /// [`load_from_disk`](Self::load_from_disk) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            courses: Vec::new(),
            seen_pids: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseRecord> {
        self.courses.iter()
    }

    pub fn get(&self, pid: &str) -> Option<&CourseRecord> {
        self.courses.iter().find(|c| c.pid == pid)
    }

    /// Parse a pasted response and append every new course.
    ///
    /// Returns how many records were added. Malformed JSON is an error and
    /// leaves the catalog untouched.
    pub fn add_from_response(&mut self, raw: &str) -> Result<usize> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        let raw = raw.strip_prefix(CAPTURE_PREFIX).unwrap_or(raw);

        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ErrorKind::ParseError(format!("解析失败: {e}")))?;

        let records: Vec<CourseRecord> = course_items(&value)
            .iter()
            .filter_map(record_from_item)
            .collect();

        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }

        if added > 0 {
            if let Err(e) = self.save() {
                tracing::warn!("保存失败: {e}");
            }
        }
        Ok(added)
    }

    /// Load the persisted list. A missing file is an empty catalog.
    ///
    /// The whole file is parsed before anything is inserted, so a corrupt
    /// file leaves the catalog as it was.
    pub fn load_from_disk(&mut self) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)?;
        let saved: Vec<CourseRecord> = serde_json::from_str(&content)?;

        let mut count = 0;
        for record in saved {
            if !record.pid.is_empty() && self.insert(record) {
                count += 1;
            }
        }
        if count > 0 {
            tracing::info!("加载本地: {count} 门");
        }
        Ok(count)
    }

    /// Write the whole catalog as an indented JSON array.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.courses.serialize(&mut ser)?;

        // Write to a sibling temp file first so a crash never leaves half a list
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)?;

        tracing::info!(path = %self.path.display(), courses = self.courses.len(), "已保存");
        Ok(())
    }

    /// Drop every record and persist the empty list.
    pub fn clear(&mut self) -> Result<()> {
        self.courses.clear();
        self.seen_pids.clear();
        self.save()
    }

    fn insert(&mut self, record: CourseRecord) -> bool {
        if self.seen_pids.contains(&record.pid) {
            return false;
        }
        self.seen_pids.insert(record.pid.clone());
        self.courses.push(record);
        true
    }
}

fn course_items(value: &Value) -> &[Value] {
    if let Some(kxrw) = value.get("kxrwList").filter(|v| v.is_object()) {
        return kxrw["list"].as_array().map(Vec::as_slice).unwrap_or_default();
    }
    if let Some(yxkc) = value.get("yxkcList") {
        return yxkc.as_array().map(Vec::as_slice).unwrap_or_default();
    }
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn record_from_item(item: &Value) -> Option<CourseRecord> {
    let pid = text_field(item, "id")?;
    let course_code = text_field(item, "kcdm")?;
    Some(CourseRecord {
        name: text_field(item, "kcmc").unwrap_or_else(|| "未知".to_string()),
        pid,
        course_code,
        teacher: text_field(item, "dgjsmc").unwrap_or_default(),
    })
}

/// Non-empty string or number field rendered as text.
fn text_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
