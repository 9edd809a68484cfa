//! Login session state captured from the browser
//!
//! Cookies only ever accumulate: every observed cookie is upserted by name
//! and nothing is removed until the process exits. The poller never reads
//! the live map, it takes a [`CookieSnapshot`] at the start of each attempt.

use crate::error::{ErrorKind, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A cookie reported by whatever performed the login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEvent {
    pub name: String,
    pub value: String,
}

impl CookieEvent {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receives cookies as they are set on the portal's pages.
pub trait CookieObserver {
    fn on_cookie(&self, name: &str, value: &str);
}

/// Shared, append-only cookie map.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> CookieSnapshot {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        CookieSnapshot(map.clone())
    }
}

impl CookieObserver for SessionCookies {
    fn on_cookie(&self, name: &str, value: &str) {
        tracing::trace!(cookie = name, "cookie captured");
        self.upsert(name, value);
    }
}

/// Point-in-time copy of the session cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSnapshot(BTreeMap<String, String>);

impl CookieSnapshot {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Render as a `Cookie` request header value.
    pub fn to_header_value(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Drain cookie events from a channel into the session until every sender
/// is dropped.
pub fn spawn_cookie_feed<O>(observer: O, mut rx: mpsc::Receiver<CookieEvent>) -> JoinHandle<()>
where
    O: CookieObserver + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            observer.on_cookie(&event.name, &event.value);
        }
    })
}

/// Parse a single `NAME=VALUE` pair.
pub fn parse_cookie_pair(pair: &str) -> Result<CookieEvent> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| ErrorKind::ParseError(format!("cookie `{pair}` is not NAME=VALUE")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ErrorKind::ParseError(format!("cookie `{pair}` has no name")).into());
    }
    Ok(CookieEvent::new(name, value.trim()))
}

/// Parse a browser `Cookie` header such as `a=1; b=2`.
pub fn parse_cookie_header(header: &str) -> Result<Vec<CookieEvent>> {
    header
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_cookie_pair)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_value_by_name() {
        let cookies = SessionCookies::new();
        assert!(cookies.is_empty());
        cookies.upsert("JSESSIONID", "a");
        cookies.upsert("JSESSIONID", "b");
        cookies.on_cookie("route", "r1");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.snapshot().get("JSESSIONID"), Some("b"));
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let cookies = SessionCookies::new();
        cookies.upsert("a", "1");
        let snap = cookies.snapshot();
        cookies.upsert("b", "2");
        assert_eq!(snap.to_header_value(), "a=1");
        assert_eq!(cookies.snapshot().to_header_value(), "a=1; b=2");
    }

    #[test]
    fn header_parsing_splits_pairs() {
        let events = parse_cookie_header("JSESSIONID=abc; route=xyz==; ").unwrap();
        assert_eq!(
            events,
            vec![
                CookieEvent::new("JSESSIONID", "abc"),
                CookieEvent::new("route", "xyz=="),
            ]
        );
        assert!(parse_cookie_header("novalue").is_err());
        assert!(parse_cookie_pair("=x").is_err());
    }

    #[tokio::test]
    async fn feed_drains_channel_into_session() {
        let cookies = SessionCookies::new();
        let (tx, rx) = mpsc::channel(8);
        let feed = spawn_cookie_feed(cookies.clone(), rx);

        tx.send(CookieEvent::new("a", "1")).await.unwrap();
        tx.send(CookieEvent::new("b", "2")).await.unwrap();
        drop(tx);
        feed.await.unwrap();

        assert_eq!(cookies.len(), 2);
    }
}
