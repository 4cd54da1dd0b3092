//! Remote letter store client.
//!
//! The resolver only ever talks to the [`LetterStore`] trait; the real
//! implementation is a Supabase PostgREST endpoint, and tests swap in
//! [`MemoryStore`]. Not-found is `Ok(None)` so callers can tell it apart
//! from transport failures.

use crate::config::StoreConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterRecord {
    pub letter_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Fields supplied by the letter-authoring flow; everything else is
/// generated or server-defaulted.
#[derive(Debug, Clone, Serialize)]
pub struct NewLetter {
    pub sender_name: String,
    pub recipient_name: String,
    pub message: String,
}

#[async_trait]
pub trait LetterStore: Send + Sync {
    /// Zero-or-one record for the identifier. `Ok(None)` is not-found.
    async fn fetch_by_id(&self, letter_id: &str) -> Result<Option<LetterRecord>>;

    /// Best-effort view counter bump. Callers swallow failures.
    async fn increment_view_count(&self, letter_id: &str) -> Result<()>;

    /// Inserts a new letter and returns its shareable identifier.
    async fn insert(&self, letter: NewLetter) -> Result<String>;
}

/// Client-generated shareable identifier, URL-safe by construction.
pub fn generate_letter_id() -> String {
    (0..10).map(|_| fastrand::alphanumeric()).collect()
}

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(60))
            .user_agent(format!("lovenote/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        })
    }

    fn rows_url(&self, letter_id: Option<&str>) -> String {
        match letter_id {
            Some(id) => format!(
                "{}/rest/v1/{}?letter_id=eq.{}",
                self.base_url,
                self.table,
                urlencoding::encode(id)
            ),
            None => format!("{}/rest/v1/{}", self.base_url, self.table),
        }
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl LetterStore for SupabaseStore {
    async fn fetch_by_id(&self, letter_id: &str) -> Result<Option<LetterRecord>> {
        let url = format!("{}&select=*", self.rows_url(Some(letter_id)));
        let response = self.authed(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("letter store returned {}", response.status()));
        }

        let mut rows: Vec<LetterRecord> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn increment_view_count(&self, letter_id: &str) -> Result<()> {
        // PostgREST has no atomic increment without an RPC; a re-read plus
        // PATCH is fine for a best-effort counter.
        let current = self
            .fetch_by_id(letter_id)
            .await?
            .ok_or_else(|| anyhow!("letter {} disappeared before count update", letter_id))?;

        let response = self
            .authed(self.client.patch(self.rows_url(Some(letter_id))))
            .json(&serde_json::json!({ "view_count": current.view_count + 1 }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "view count update returned {}",
                response.status()
            ));
        }
        Ok(())
    }

    async fn insert(&self, letter: NewLetter) -> Result<String> {
        let letter_id = generate_letter_id();
        let response = self
            .authed(self.client.post(self.rows_url(None)))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({
                "letter_id": letter_id,
                "sender_name": letter.sender_name,
                "recipient_name": letter.recipient_name,
                "message": letter.message,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("letter insert returned {}", response.status()));
        }

        let rows: Vec<LetterRecord> = response.json().await?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("letter insert returned no representation"))?;
        Ok(stored.letter_id)
    }
}

/// In-memory store for tests and offline runs.
#[derive(Default)]
pub struct MemoryStore {
    records: std::sync::Mutex<std::collections::HashMap<String, LetterRecord>>,
    pub fail_fetch: bool,
    pub fail_increment: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LetterRecord) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.letter_id.clone(), record);
        store
    }

    pub fn view_count(&self, letter_id: &str) -> Option<i64> {
        self.records
            .lock()
            .unwrap()
            .get(letter_id)
            .map(|r| r.view_count)
    }
}

#[async_trait]
impl LetterStore for MemoryStore {
    async fn fetch_by_id(&self, letter_id: &str) -> Result<Option<LetterRecord>> {
        if self.fail_fetch {
            return Err(anyhow!("memory store configured to fail"));
        }
        Ok(self.records.lock().unwrap().get(letter_id).cloned())
    }

    async fn increment_view_count(&self, letter_id: &str) -> Result<()> {
        if self.fail_increment {
            return Err(anyhow!("memory store configured to fail increments"));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(letter_id)
            .ok_or_else(|| anyhow!("no record {}", letter_id))?;
        record.view_count += 1;
        Ok(())
    }

    async fn insert(&self, letter: NewLetter) -> Result<String> {
        let letter_id = generate_letter_id();
        let record = LetterRecord {
            letter_id: letter_id.clone(),
            sender_name: Some(letter.sender_name),
            recipient_name: Some(letter.recipient_name),
            title: None,
            message: letter.message,
            view_count: 0,
            created_at: None,
        };
        self.records
            .lock()
            .unwrap()
            .insert(letter_id.clone(), record);
        Ok(letter_id)
    }
}
