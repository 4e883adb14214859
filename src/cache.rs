//! Short-lived response cache.
//!
//! Entries expire lazily: a read of a stale entry removes it and reports a
//! miss. There is no sweeper and no single-flight; two concurrent misses on
//! the same key both reach the API and the later write wins.

use crate::remote::RemotePayload;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deterministic cache key: tool name plus canonical JSON of the arguments.
pub fn cache_key(tool: &str, arguments: &Value) -> String {
    let mut key = String::with_capacity(tool.len() + 64);
    key.push_str(tool);
    key.push(':');
    write_canonical(arguments, &mut key);
    key
}

/// Serialize with object keys sorted at every depth.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: RemotePayload,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < self.ttl
    }
}

/// In-memory TTL cache, owned by the dispatcher.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<RemotePayload> {
        self.get_at(key, Instant::now())
    }

    /// Read as of `now`. A stale entry is evicted and reported absent.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<RemotePayload> {
        let mut entries = self.entries.lock();
        let live = entries.get(key)?.is_live(now);
        if !live {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    pub fn set(&self, key: impl Into<String>, value: RemotePayload, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Write as of `now`. Overwrites unconditionally.
    pub fn set_at(
        &self,
        key: impl Into<String>,
        value: RemotePayload,
        ttl: Duration,
        now: Instant,
    ) {
        self.entries.lock().insert(
            key.into(),
            CacheEntry {
                value,
                created_at: now,
                ttl,
            },
        );
    }

    /// Drop every entry stored for `tool`. Returns how many were removed.
    pub fn invalidate_tool(&self, tool: &str) -> usize {
        let prefix = format!("{}:", tool);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        before - entries.len()
    }

    /// Number of stored entries, stale ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
