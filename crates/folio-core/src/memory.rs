//! In-memory implementations of the folio repository traits.
//!
//! `MemoryPartition` is a complete [`PartitionStore`] over a `Vec`, with
//! injectable failure so tests can exercise partition-unavailable paths.
//! Compiled unconditionally: integration tests in other crates use these
//! types as fixtures, and they double as a backend for ephemeral
//! deployments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::*;

/// In-memory category partition.
pub struct MemoryPartition {
    category: String,
    docs: Mutex<Vec<Manuscript>>,
    failing: AtomicBool,
}

impl MemoryPartition {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            docs: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail with `PartitionUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a fully-formed manuscript, bypassing `insert`. Tests use this
    /// to control `created_at` and lifecycle flags.
    pub fn push(&self, mut manuscript: Manuscript) {
        manuscript.category = self.category.clone();
        self.docs
            .lock()
            .expect("partition lock poisoned")
            .push(manuscript);
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::PartitionUnavailable {
                category: self.category.clone(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn matches(filter: &ManuscriptFilter, m: &Manuscript) -> bool {
        if m.deleted {
            return false;
        }
        if filter.visible_only && !m.visible {
            return false;
        }
        if let Some(q) = &filter.query {
            let q = q.to_lowercase();
            return m.content.to_lowercase().contains(&q)
                || m.keyword.to_lowercase().contains(&q);
        }
        true
    }
}

#[async_trait]
impl PartitionStore for MemoryPartition {
    fn category(&self) -> &str {
        &self.category
    }

    async fn insert(&self, req: CreateManuscriptRequest) -> Result<Uuid> {
        self.check_available()?;
        let id = Uuid::now_v7();
        let manuscript = Manuscript {
            id,
            category: self.category.clone(),
            content: req.content,
            keyword: req.keyword,
            engine: req.engine,
            created_at: Utc::now(),
            updated_at: None,
            deleted: false,
            deleted_at: None,
            visible: true,
            visibility_updated_at: None,
            update_memo: None,
        };
        self.docs
            .lock()
            .expect("partition lock poisoned")
            .push(manuscript);
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Manuscript> {
        self.check_available()?;
        let docs = self.docs.lock().expect("partition lock poisoned");
        docs.iter()
            .find(|m| m.id == id && !m.deleted)
            .cloned()
            .ok_or(Error::ManuscriptNotFound(id))
    }

    async fn find(
        &self,
        filter: &ManuscriptFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Manuscript>> {
        self.check_available()?;
        let docs = self.docs.lock().expect("partition lock poisoned");
        let mut hits: Vec<Manuscript> = docs
            .iter()
            .filter(|m| Self::matches(filter, m))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ManuscriptFilter) -> Result<i64> {
        self.check_available()?;
        let docs = self.docs.lock().expect("partition lock poisoned");
        Ok(docs.iter().filter(|m| Self::matches(filter, m)).count() as i64)
    }

    async fn group_counts(&self, spec: &GroupSpec) -> Result<Vec<GroupCount>> {
        self.check_available()?;
        let docs = self.docs.lock().expect("partition lock poisoned");
        let mut groups: std::collections::HashMap<GroupKey, i64> =
            std::collections::HashMap::new();

        for m in docs.iter().filter(|m| !m.deleted) {
            let key = match spec {
                GroupSpec::KeywordsSince(since) => {
                    if m.created_at < *since {
                        continue;
                    }
                    GroupKey::Keyword(m.keyword.clone())
                }
                GroupSpec::KeywordsMatching(term) => {
                    if !m.keyword.to_lowercase().contains(&term.to_lowercase()) {
                        continue;
                    }
                    GroupKey::Keyword(m.keyword.clone())
                }
                GroupSpec::EnginePerDaySince(since) => {
                    if m.created_at < *since {
                        continue;
                    }
                    GroupKey::EngineDay {
                        engine: m.engine.clone(),
                        day: m.created_at.date_naive(),
                    }
                }
            };
            *groups.entry(key).or_insert(0) += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.check_available()?;
        let mut docs = self.docs.lock().expect("partition lock poisoned");
        match docs.iter_mut().find(|m| m.id == id && !m.deleted) {
            Some(m) => {
                m.deleted = true;
                m.deleted_at = Some(Utc::now());
                Ok(())
            }
            None => Err(Error::ManuscriptNotFound(id)),
        }
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        memo: Option<&str>,
    ) -> Result<Manuscript> {
        self.check_available()?;
        let mut docs = self.docs.lock().expect("partition lock poisoned");
        match docs.iter_mut().find(|m| m.id == id && !m.deleted) {
            Some(m) => {
                m.content = content.to_string();
                m.updated_at = Some(Utc::now());
                m.update_memo = memo.map(String::from);
                Ok(m.clone())
            }
            None => Err(Error::ManuscriptNotFound(id)),
        }
    }

    async fn toggle_visibility(&self, id: Uuid) -> Result<bool> {
        self.check_available()?;
        let mut docs = self.docs.lock().expect("partition lock poisoned");
        match docs.iter_mut().find(|m| m.id == id && !m.deleted) {
            Some(m) => {
                m.visible = !m.visible;
                m.visibility_updated_at = Some(Utc::now());
                Ok(m.visible)
            }
            None => Err(Error::ManuscriptNotFound(id)),
        }
    }
}

/// In-memory [`BookmarkRepository`].
#[derive(Default)]
pub struct MemoryBookmarkStore {
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkRepository for MemoryBookmarkStore {
    async fn create(&self, req: CreateBookmarkRequest) -> Result<Bookmark> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark lock poisoned");
        if let Some(existing) = bookmarks
            .iter()
            .find(|b| b.user_id == req.user_id && b.manuscript_id == req.manuscript_id)
        {
            return Ok(existing.clone());
        }
        let bookmark = Bookmark {
            id: Uuid::now_v7(),
            user_id: req.user_id,
            manuscript_id: req.manuscript_id,
            category: req.category,
            keyword: req.keyword,
            preview: req.preview,
            created_at: Utc::now(),
        };
        bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn delete_by_id(&self, user_id: &str, bookmark_id: Uuid) -> Result<()> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark lock poisoned");
        let before = bookmarks.len();
        bookmarks.retain(|b| !(b.user_id == user_id && b.id == bookmark_id));
        if bookmarks.len() == before {
            return Err(Error::NotFound(format!("bookmark {}", bookmark_id)));
        }
        Ok(())
    }

    async fn delete_by_manuscript(&self, user_id: &str, manuscript_id: Uuid) -> Result<()> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark lock poisoned");
        let before = bookmarks.len();
        bookmarks.retain(|b| !(b.user_id == user_id && b.manuscript_id == manuscript_id));
        if bookmarks.len() == before {
            return Err(Error::NotFound(format!(
                "bookmark for manuscript {}",
                manuscript_id
            )));
        }
        Ok(())
    }

    async fn list(&self, user_id: &str, skip: i64, limit: i64) -> Result<BookmarkPage> {
        let bookmarks = self.bookmarks.lock().expect("bookmark lock poisoned");
        let mut mine: Vec<Bookmark> = bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = mine.len() as i64;
        let page = mine
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok(BookmarkPage {
            bookmarks: page,
            total,
            skip,
            limit,
        })
    }

    async fn check(&self, user_id: &str, manuscript_id: Uuid) -> Result<Option<Uuid>> {
        let bookmarks = self.bookmarks.lock().expect("bookmark lock poisoned");
        Ok(bookmarks
            .iter()
            .find(|b| b.user_id == user_id && b.manuscript_id == manuscript_id)
            .map(|b| b.id))
    }
}

/// In-memory [`HistoryRepository`].
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<SearchHistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for MemoryHistoryStore {
    async fn record(
        &self,
        user_id: &str,
        keyword: &str,
        category: Option<&str>,
    ) -> Result<SearchHistoryEntry> {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        if let Some(existing) = entries
            .iter_mut()
            .find(|e| e.user_id == user_id && e.keyword == keyword)
        {
            existing.searched_at = Utc::now();
            existing.category = category.map(String::from);
            return Ok(existing.clone());
        }
        let entry = SearchHistoryEntry {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            keyword: keyword.to_string(),
            category: category.map(String::from),
            searched_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<SearchHistoryEntry>> {
        let entries = self.entries.lock().expect("history lock poisoned");
        let mut mine: Vec<SearchHistoryEntry> = entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.searched_at.cmp(&a.searched_at));
        mine.truncate(limit.max(0) as usize);
        Ok(mine)
    }

    async fn delete(&self, user_id: &str, keyword: Option<&str>) -> Result<u64> {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        let before = entries.len();
        entries.retain(|e| {
            e.user_id != user_id || keyword.is_some_and(|k| e.keyword != k)
        });
        Ok((before - entries.len()) as u64)
    }
}
