/// Admin session persistence
///
/// The admin key lives in the dashboard URL's `key` query parameter, so a
/// reload or a shared deep link restores the session. No other session
/// storage exists.
use crate::error::{ModError, ModResult};
use reqwest::Url;

/// Key-value store holding the admin key between loads
pub trait SessionStore: Send + Sync {
    /// The bound key, if any. Blank values count as absent.
    fn get_key(&self) -> Option<String>;

    /// Replace the stored key
    fn set_key(&mut self, key: &str);

    /// Remove the key entirely
    fn clear_key(&mut self);

    /// Human-readable location of the session (the current URL)
    fn location(&self) -> String;
}

/// Trim a raw key; blank keys normalize to `None`
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Session kept in a URL's query string
#[derive(Debug, Clone)]
pub struct UrlSession {
    url: Url,
}

impl UrlSession {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(url: &str) -> ModResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| ModError::Validation(format!("Invalid dashboard URL {}: {}", url, e)))?;
        Ok(Self::new(url))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Rewrite the whole query: every existing `key` pair is dropped,
    /// other parameters keep their order.
    fn rewrite_query(&mut self, key: Option<&str>) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(name, _)| name != "key")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        if others.is_empty() && key.is_none() {
            self.url.set_query(None);
            return;
        }

        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(others);
        if let Some(key) = key {
            pairs.append_pair("key", key);
        }
    }
}

impl SessionStore for UrlSession {
    fn get_key(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(name, _)| name == "key")
            .and_then(|(_, value)| normalize_key(&value))
    }

    fn set_key(&mut self, key: &str) {
        match normalize_key(key) {
            Some(key) => self.rewrite_query(Some(&key)),
            None => self.rewrite_query(None),
        }
    }

    fn clear_key(&mut self) {
        self.rewrite_query(None);
    }

    fn location(&self) -> String {
        self.url.to_string()
    }
}
