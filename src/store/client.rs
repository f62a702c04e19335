use crate::config::Config;
use crate::error::AppError;
use crate::model::{Character, Match, Player, Session};
use governor::{clock::DefaultClock, state::{InMemoryState, NotKeyed}, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{CharacterDoc, MatchDoc, PlayerDoc, SessionDoc};
use super::value::ListDocumentsResponse;
use super::DocumentStore;

const USER_AGENT: &str = concat!("smash_tracker/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: u32 = 300;
const REQUESTS_PER_SECOND: u32 = 10;
const MAX_RETRIES: u32 = 3;

/// Read-only client for the Firestore REST API.
pub struct FirestoreClient {
    base_url: String,
    api_key: Option<String>,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl FirestoreClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let per_second = NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);

        Ok(FirestoreClient {
            base_url: format!("{}/documents", config.store_source()?),
            api_key: config.api_key.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    fn pace(&self) {
        while self.rate_limiter.check().is_err() {
            thread::sleep(Duration::from_millis(50));
        }
    }

    fn execute_request(&self, url: &str, query: &[(&str, String)]) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.pace();

            let mut request = ureq::get(url).set("User-Agent", USER_AGENT);
            for (key, value) in query {
                request = request.query(key, value);
            }

            match request.call() {
                Ok(resp) => {
                    return resp.into_string().map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!("Rate limited by the document store, retrying in {}ms", wait_ms);
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(404, _)) => {
                    // Firestore answers 404 for a missing database, not for empty collections
                    return Err(AppError::StoreError(format!("{} not found", url)));
                }
                Err(ureq::Error::Status(code, resp)) => {
                    let body = resp.into_string().unwrap_or_default();
                    return Err(AppError::StoreError(format!("HTTP {}: {}", code, body.trim())));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    /// Every document of a collection, following page tokens. Documents that
    /// do not fit the expected shape are logged and skipped.
    fn list_documents<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            if let Some(key) = &self.api_key {
                query.push(("key", key.clone()));
            }

            let body = self.execute_request(&url, &query)?;
            let page: ListDocumentsResponse =
                serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))?;

            for doc in page.documents {
                let id = doc.id().to_string();
                match serde_json::from_value(doc.into_json()) {
                    Ok(parsed) => documents.push(parsed),
                    Err(e) => warn!("Skipping malformed document {}/{}: {}", path, id, e),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Fetched {} documents from {}", documents.len(), path);
        Ok(documents)
    }
}

impl DocumentStore for FirestoreClient {
    fn list_players(&self) -> Result<Vec<Player>, AppError> {
        let docs: Vec<PlayerDoc> = self.list_documents("users")?;
        Ok(docs.into_iter().map(Player::from).collect())
    }

    fn list_characters(&self) -> Result<Vec<Character>, AppError> {
        let docs: Vec<CharacterDoc> = self.list_documents("characters")?;
        let mut characters: Vec<Character> = docs.into_iter().map(Character::from).collect();
        characters.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        Ok(characters)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, AppError> {
        let docs: Vec<SessionDoc> = self.list_documents("sessions")?;
        Ok(docs.into_iter().map(Session::from).collect())
    }

    fn list_matches(&self, session: &Session) -> Result<Vec<Match>, AppError> {
        let path = format!("sessions/{}/matches", session.id);
        let docs: Vec<MatchDoc> = self.list_documents(&path)?;
        Ok(docs.into_iter().map(|doc| doc.into_match(&session.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_base_url_from_config() {
        let vars: HashMap<&str, &str> =
            [("SMASH_PROJECT_ID", "smash-lan"), ("SMASH_API_KEY", "k")].into();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        let client = FirestoreClient::new(&config).unwrap();
        assert_eq!(
            client.base_url,
            "https://firestore.googleapis.com/v1/projects/smash-lan/databases/(default)/documents"
        );
        assert_eq!(client.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_client_requires_project() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(matches!(FirestoreClient::new(&config), Err(AppError::ConfigError(_))));
    }
}
