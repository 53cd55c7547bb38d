use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use postdesk_core::crypto::{DerivedKey, SettingsCipher};
use postdesk_core::settings::{
    AppSettings, AppSettingsPatch, ImportSummary, SettingsCache, SettingsStore, Tone,
    DECRYPT_ERROR_SENTINEL, ENCRYPTED_SENTINEL,
};
use postdesk_core::storage::{Setting, SettingRecord, SettingsBackend, SqliteBackend, ValueKind};
use postdesk_core::{PostdeskError, Result};
use serde_json::{json, Map, Value};

/// In-memory backend that counts reads, can be told to reject writes and
/// can hold each read open for a while after taking its snapshot.
#[derive(Default)]
struct CountingBackend {
    rows: Mutex<BTreeMap<String, Setting>>,
    finds: AtomicUsize,
    reject: Mutex<HashSet<String>>,
    find_delay: Mutex<Duration>,
}

impl CountingBackend {
    fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    fn reject_writes_to(&self, key: &str) {
        self.reject
            .lock()
            .expect("reject lock should not be poisoned")
            .insert(key.to_string());
    }

    fn delay_finds(&self, delay: Duration) {
        *self.find_delay.lock().expect("delay lock") = delay;
    }

    fn wait_for_finds(&self, count: usize) {
        while self.finds() < count {
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl SettingsBackend for CountingBackend {
    fn find(&self, key: &str) -> Result<Option<Setting>> {
        let row = self.rows.lock().expect("rows lock").get(key).cloned();
        self.finds.fetch_add(1, Ordering::SeqCst);
        let delay = *self.find_delay.lock().expect("delay lock");
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(row)
    }

    fn find_all(&self) -> Result<Vec<Setting>> {
        Ok(self.rows.lock().expect("rows lock").values().cloned().collect())
    }

    fn upsert(&self, record: &SettingRecord) -> Result<()> {
        if self.reject.lock().expect("reject lock").contains(&record.key) {
            return Err(PostdeskError::Persistence(format!(
                "write rejected: {}",
                record.key
            )));
        }
        let now = chrono::Utc::now();
        let mut rows = self.rows.lock().expect("rows lock");
        let created_at = rows.get(&record.key).map(|row| row.created_at).unwrap_or(now);
        rows.insert(
            record.key.clone(),
            Setting {
                key: record.key.clone(),
                value: record.value.clone(),
                value_kind: record.value_kind,
                is_encrypted: record.is_encrypted,
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.rows.lock().expect("rows lock").remove(key) {
            Some(_) => Ok(()),
            None => Err(PostdeskError::Persistence(format!(
                "Setting not found: {}",
                key
            ))),
        }
    }

    fn delete_all(&self) -> Result<usize> {
        let mut rows = self.rows.lock().expect("rows lock");
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}

fn cipher(seed: u8) -> SettingsCipher {
    SettingsCipher::new(DerivedKey::from_bytes([seed; 32]))
}

fn counting_store(ttl: Duration) -> (Arc<CountingBackend>, SettingsStore<Arc<CountingBackend>>) {
    let backend = Arc::new(CountingBackend::default());
    let store = SettingsStore::with_cache(
        Arc::clone(&backend),
        cipher(1),
        SettingsCache::with_ttl(ttl),
    );
    (backend, store)
}

#[test]
fn test_repeated_reads_are_served_from_cache() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    store
        .set("max_character_count", &280u32, false)
        .expect("set should succeed");

    for _ in 0..3 {
        assert_eq!(store.get_or("max_character_count", 0u32), 280);
    }
    assert_eq!(backend.finds(), 0, "set should populate the cache");

    store.clear_cache();
    assert_eq!(store.get_or("max_character_count", 0u32), 280);
    assert_eq!(store.get_or("max_character_count", 0u32), 280);
    assert_eq!(backend.finds(), 1);
}

#[test]
fn test_stale_cache_entry_is_reloaded() {
    let (backend, store) = counting_store(Duration::from_millis(30));
    store.set("theme", "dark", false).expect("set should succeed");

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(store.get_or("theme", String::new()), "dark");
    assert_eq!(backend.finds(), 1);
}

#[test]
fn test_encrypted_values_round_trip_and_stay_opaque() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    store
        .set("x_bearer_token", "bearer-secret", true)
        .expect("set should succeed");

    let row = backend
        .find("x_bearer_token")
        .expect("find should succeed")
        .expect("row should exist");
    assert!(row.is_encrypted);
    let stored = row.value.expect("value should be present");
    assert!(!stored.contains("bearer-secret"));

    store.clear_cache();
    assert_eq!(
        store.get::<String>("x_bearer_token").as_deref(),
        Some("bearer-secret")
    );
}

#[test]
fn test_value_sealed_under_another_key_reads_as_default() {
    let backend = Arc::new(CountingBackend::default());
    let first = SettingsStore::new(Arc::clone(&backend), cipher(1));
    first
        .set("openai_api_key", "sk-1", true)
        .expect("set should succeed");

    let second = SettingsStore::new(Arc::clone(&backend), cipher(2));
    assert_eq!(second.get::<String>("openai_api_key"), None);

    let all = second.get_all(true).expect("get_all should succeed");
    assert_eq!(all["openai_api_key"], json!(DECRYPT_ERROR_SENTINEL));
}

#[test]
fn test_facade_persists_credentials_encrypted() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    let patch = AppSettingsPatch {
        news_api_key: Some("abc".to_string()),
        default_tone: Some(Tone::Explanatory),
        ..Default::default()
    };
    store
        .app()
        .update_app_settings(&patch)
        .expect("update should succeed");

    let row = backend
        .find("news_api_key")
        .expect("find should succeed")
        .expect("row should exist");
    assert!(row.is_encrypted);
    assert_eq!(row.value_kind, ValueKind::Text);

    let tone = backend
        .find("default_tone")
        .expect("find should succeed")
        .expect("row should exist");
    assert!(!tone.is_encrypted);
    assert_eq!(tone.value.as_deref(), Some("explanatory"));

    let settings = store.app().get_app_settings();
    assert_eq!(settings.news_api_key.as_deref(), Some("abc"));
    assert_eq!(settings.default_tone, Tone::Explanatory);
}

#[test]
fn test_reset_returns_facade_to_defaults() {
    let (_backend, store) = counting_store(Duration::from_secs(300));
    let patch = AppSettingsPatch {
        compact_mode: Some(true),
        max_backups: Some(12),
        ..Default::default()
    };
    store
        .app()
        .update_app_settings(&patch)
        .expect("update should succeed");
    assert!(store.app().get_app_settings().compact_mode);

    assert_eq!(store.reset().expect("reset should succeed"), 2);
    assert_eq!(store.app().get_app_settings(), AppSettings::default());
}

#[test]
fn test_backup_restore_is_idempotent() {
    let (_backend, store) = counting_store(Duration::from_secs(300));
    store.set("theme", "light", false).expect("set should succeed");
    store.set("flag", "true", false).expect("set should succeed");
    store.set("limits", &json!({"daily": 3}), false).expect("set should succeed");
    store.set("x_api_secret", "s3", true).expect("set should succeed");

    let backup = store.create_backup().expect("backup should succeed");
    let before = store.get_all(false).expect("get_all should succeed");

    store.restore_from_backup(&backup).expect("restore should succeed");
    store.restore_from_backup(&backup).expect("restore should succeed");
    let after = store.get_all(false).expect("get_all should succeed");

    assert_eq!(before, after);
    assert_eq!(after["flag"], json!("true"));
    assert_eq!(after["limits"], json!({"daily": 3}));
    store.clear_cache();
    assert_eq!(store.get::<String>("x_api_secret").as_deref(), Some("s3"));
}

#[test]
fn test_restore_leaves_sentinel_keys_untouched() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    let backup = json!({
        "version": "1.0.0",
        "timestamp": "2026-01-01T00:00:00Z",
        "settings": {
            "theme": "dark",
            "news_api_key": ENCRYPTED_SENTINEL,
            "x_api_key": DECRYPT_ERROR_SENTINEL
        }
    })
    .to_string();

    let summary = store
        .restore_from_backup(&backup)
        .expect("restore should succeed");
    assert_eq!(summary, ImportSummary { applied: 1, skipped: 2 });
    assert!(backend.find("news_api_key").expect("find").is_none());
    assert!(backend.find("x_api_key").expect("find").is_none());
}

#[test]
fn test_partial_import_reports_failed_keys() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    backend.reject_writes_to("max_backups");

    let settings: Map<String, Value> = serde_json::from_value(json!({
        "compact_mode": true,
        "max_backups": 9,
        "theme": "dark"
    }))
    .expect("settings should parse");

    match store.import_settings(&settings, true) {
        Err(PostdeskError::PartialImport { applied, failed }) => {
            assert_eq!(applied, 2);
            assert_eq!(failed, vec!["max_backups".to_string()]);
        }
        other => panic!("expected partial import, got {:?}", other),
    }
    assert!(store.get_or("compact_mode", false));
    assert_eq!(store.get_or("theme", String::new()), "dark");
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("postdesk.db");

    {
        let backend = SqliteBackend::open(&path).expect("open should succeed");
        let store = SettingsStore::new(backend, cipher(9));
        store
            .set("max_character_count", &280u32, false)
            .expect("set should succeed");
        store
            .set("news_api_key", "abc", true)
            .expect("set should succeed");
    }

    let backend = SqliteBackend::open(&path).expect("reopen should succeed");
    let store = SettingsStore::new(backend, cipher(9));
    assert_eq!(store.get_or("max_character_count", 0u32), 280);
    assert_eq!(store.get::<String>("news_api_key").as_deref(), Some("abc"));
}

#[test]
fn test_concurrent_writers_keep_cache_consistent() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .set("session_timeout", &i, false)
                    .expect("set should succeed");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread should finish");
    }

    let cached: u32 = store.get_or("session_timeout", 99);
    let row = backend
        .find("session_timeout")
        .expect("find should succeed")
        .expect("row should exist");
    assert_eq!(row.value, Some(cached.to_string()));
}

/// Starts a cache-missing read of `theme` that stays inside `find` for a
/// while, and returns once that read has taken its snapshot of the row.
fn start_slow_read(
    backend: &Arc<CountingBackend>,
    store: &Arc<SettingsStore<Arc<CountingBackend>>>,
) -> std::thread::JoinHandle<Option<String>> {
    store.clear_cache();
    let before = backend.finds();
    backend.delay_finds(Duration::from_millis(300));

    let reader = {
        let store = Arc::clone(store);
        std::thread::spawn(move || store.get::<String>("theme"))
    };
    backend.wait_for_finds(before + 1);
    reader
}

#[test]
fn test_read_overlapping_set_does_not_cache_old_value() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    let store = Arc::new(store);
    store.set("theme", "dark", false).expect("set should succeed");

    let reader = start_slow_read(&backend, &store);
    store.set("theme", "light", false).expect("set should succeed");
    let seen = reader.join().expect("reader thread should finish");
    assert_eq!(seen.as_deref(), Some("dark"));

    backend.delay_finds(Duration::ZERO);
    assert_eq!(store.get::<String>("theme").as_deref(), Some("light"));
    let row = backend
        .find("theme")
        .expect("find should succeed")
        .expect("row should exist");
    assert_eq!(row.value.as_deref(), Some("light"));
}

#[test]
fn test_read_overlapping_delete_does_not_cache_old_value() {
    let (backend, store) = counting_store(Duration::from_secs(300));
    let store = Arc::new(store);
    store.set("theme", "dark", false).expect("set should succeed");

    let reader = start_slow_read(&backend, &store);
    store.delete("theme").expect("delete should succeed");
    reader.join().expect("reader thread should finish");

    backend.delay_finds(Duration::ZERO);
    assert_eq!(store.get::<String>("theme"), None);
    assert!(backend.find("theme").expect("find should succeed").is_none());
}
