//! JSON file deck store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<owner>/<name>.json           pretty-printed deck
//! <root>/<owner>/<name>.reviews.jsonl  review log, one JSON object per line
//! ```
//!
//! Deck files are written to a uniquely named temporary sibling and renamed
//! into place, so a crash never leaves a half-written deck behind. Writes to
//! one deck are serialised by a per-deck lock; `save_card` reloads the deck
//! under that lock, so concurrent reviews of different cards all land.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use flashdeck_core::error::StoreError;
use flashdeck_core::model::{Card, Deck, DeckKey, DeckSummary, ReviewLog};
use flashdeck_core::traits::DeckStore;

const DECK_EXT: &str = "json";
const REVIEWS_SUFFIX: &str = ".reviews.jsonl";

/// A [`DeckStore`] backed by JSON files on disk.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
    locks: Arc<Mutex<HashMap<DeckKey, Arc<Mutex<()>>>>>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Arc::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner: &str) -> Option<PathBuf> {
        is_safe_component(owner).then(|| self.root.join(owner))
    }

    fn deck_path(&self, key: &DeckKey) -> Result<PathBuf, StoreError> {
        match self.owner_dir(&key.owner) {
            Some(dir) if is_safe_component(&key.name) => {
                Ok(dir.join(format!("{}.{DECK_EXT}", key.name)))
            }
            _ => Err(StoreError::DeckNotFound(key.clone())),
        }
    }

    fn reviews_path(&self, key: &DeckKey) -> Result<PathBuf, StoreError> {
        match self.owner_dir(&key.owner) {
            Some(dir) if is_safe_component(&key.name) => {
                Ok(dir.join(format!("{}{REVIEWS_SUFFIX}", key.name)))
            }
            _ => Err(StoreError::DeckNotFound(key.clone())),
        }
    }

    /// Exclusive write access to one deck, shared by clones of this store.
    async fn lock_deck(&self, key: &DeckKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn read_deck(&self, path: &Path, key: &DeckKey) -> Result<Deck, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::DeckNotFound(key.clone()))
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn write_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        let path = self.deck_path(&deck.key())?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(deck).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension(format!("{DECK_EXT}.{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&path, e));
        }

        tracing::debug!(path = %path.display(), cards = deck.cards.len(), "deck written");
        Ok(())
    }
}

/// Owner and deck names become path components; reject anything that could
/// escape the owner directory.
fn is_safe_component(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && !s.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

#[async_trait]
impl DeckStore for JsonStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self, key: &DeckKey) -> Result<Deck, StoreError> {
        let path = self.deck_path(key)?;
        self.read_deck(&path, key).await
    }

    async fn save_card(&self, key: &DeckKey, card: &Card) -> Result<(), StoreError> {
        let _guard = self.lock_deck(key).await;
        let mut deck = self.load(key).await?;
        let slot = deck
            .card_mut(card.id)
            .ok_or_else(|| StoreError::CardNotFound {
                deck: key.clone(),
                card_id: card.id,
            })?;
        *slot = card.clone();
        self.write_deck(&deck).await
    }

    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        let _guard = self.lock_deck(&deck.key()).await;
        self.write_deck(deck).await
    }

    async fn remove_deck(&self, key: &DeckKey) -> Result<(), StoreError> {
        let path = self.deck_path(key)?;
        let _guard = self.lock_deck(key).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::DeckNotFound(key.clone()))
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        }

        let reviews = self.reviews_path(key)?;
        match tokio::fs::remove_file(&reviews).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&reviews, e)),
        }
    }

    async fn list_decks(&self, owner: &str) -> Result<Vec<DeckSummary>, StoreError> {
        let Some(dir) = self.owner_dir(owner) else {
            return Ok(Vec::new());
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == DECK_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(DeckKey::new(owner, stem));
                }
            }
        }

        let decks =
            futures::future::try_join_all(keys.iter().map(|key| self.load(key))).await?;
        let mut summaries: Vec<DeckSummary> = decks.iter().map(Deck::summary).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn append_review(&self, review: &ReviewLog) -> Result<(), StoreError> {
        let deck_path = self.deck_path(&review.deck)?;
        let _guard = self.lock_deck(&review.deck).await;
        if !tokio::fs::try_exists(&deck_path)
            .await
            .map_err(|e| StoreError::io(&deck_path, e))?
        {
            return Err(StoreError::DeckNotFound(review.deck.clone()));
        }

        let path = self.reviews_path(&review.deck)?;
        let mut line = serde_json::to_string(review).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        file.flush().await.map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    async fn reviews(&self, key: &DeckKey) -> Result<Vec<ReviewLog>, StoreError> {
        let deck_path = self.deck_path(key)?;
        if !tokio::fs::try_exists(&deck_path)
            .await
            .map_err(|e| StoreError::io(&deck_path, e))?
        {
            return Err(StoreError::DeckNotFound(key.clone()));
        }

        let path = self.reviews_path(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: format!("line {}: {e}", i + 1),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flashdeck_core::model::{Caller, ReviewFeedback, SchedulingState};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn deck(owner: &str, name: &str, cards: u64) -> Deck {
        let mut deck = Deck::new(owner, name);
        deck.color = "#123456".into();
        deck.cards = (1..=cards)
            .map(|id| Card {
                id,
                question: format!("q{id}"),
                answer: format!("a{id}"),
                schedule: SchedulingState::new(2.5, day(1)),
            })
            .collect();
        deck
    }

    #[tokio::test]
    async fn deck_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let original = deck("alice", "spanish", 3);

        store.save_deck(&original).await.unwrap();
        assert!(dir.path().join("alice/spanish.json").exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("alice"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let loaded = store.load(&original.key()).await.unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn missing_and_unsafe_keys_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        for key in [
            DeckKey::new("alice", "nothing"),
            DeckKey::new("..", "secrets"),
            DeckKey::new("alice", ".hidden"),
        ] {
            let err = store.load(&key).await.unwrap_err();
            assert!(matches!(err, StoreError::DeckNotFound(_)), "{key}: {err}");
        }
        assert!(store.list_decks("..").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_deck_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("alice")).unwrap();
        std::fs::write(dir.path().join("alice/broken.json"), "{ not json").unwrap();

        let store = JsonStore::new(dir.path());
        let err = store
            .load(&DeckKey::new("alice", "broken"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn list_decks_sorted_and_scoped_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.save_deck(&deck("alice", "zulu", 1)).await.unwrap();
        store.save_deck(&deck("alice", "alpha", 2)).await.unwrap();
        store.save_deck(&deck("bob", "other", 1)).await.unwrap();

        let decks = store.list_decks("alice").await.unwrap();
        let names: Vec<&str> = decks.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zulu"]);
        assert_eq!(decks[0].card_count, 2);
        assert!(store.list_decks("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_card_and_review_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let original = deck("alice", "spanish", 2);
        let key = original.key();
        store.save_deck(&original).await.unwrap();

        let mut card = original.cards[0].clone();
        card.schedule.interval_days = 6;
        store.save_card(&key, &card).await.unwrap();
        assert_eq!(
            store.load(&key).await.unwrap().cards[0].schedule.interval_days,
            6
        );

        let caller = Caller::new("bob");
        for (card_id, success) in [(1, true), (2, false), (1, false)] {
            let feedback = ReviewFeedback {
                card_id,
                success,
                response_time_ms: Some(1500),
            };
            let log = ReviewLog::new(key.clone(), &caller, &feedback, &card, day(3));
            store.append_review(&log).await.unwrap();
        }

        let reviews = store.reviews(&key).await.unwrap();
        let order: Vec<(u64, bool)> = reviews.iter().map(|r| (r.card_id, r.success)).collect();
        assert_eq!(order, vec![(1, true), (2, false), (1, false)]);
        assert_eq!(reviews[0].reviewer, "bob");

        // Log files are not mistaken for decks.
        assert_eq!(store.list_decks("alice").await.unwrap().len(), 1);

        store.remove_deck(&key).await.unwrap();
        assert!(!dir.path().join("alice/spanish.reviews.jsonl").exists());
        assert!(store.reviews(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_card_saves_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let original = deck("alice", "spanish", 8);
        let key = original.key();
        store.save_deck(&original).await.unwrap();

        let handles: Vec<_> = original
            .cards
            .iter()
            .cloned()
            .map(|mut card| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    card.schedule.interval_days = card.id as u32 * 10;
                    store.save_card(&key, &card).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = store.load(&key).await.unwrap();
        for card in &loaded.cards {
            assert_eq!(card.schedule.interval_days, card.id as u32 * 10, "card {}", card.id);
        }
    }

    #[tokio::test]
    async fn append_review_requires_deck() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let orphan = deck("alice", "gone", 1);
        let log = ReviewLog::new(
            orphan.key(),
            &Caller::new("alice"),
            &ReviewFeedback::pass(1),
            &orphan.cards[0],
            day(2),
        );
        assert!(store.append_review(&log).await.unwrap_err().is_not_found());
    }
}
