//! Cookie-backed user preferences
//!
//! Three values survive across page loads: the selected speed, whether the
//! user hid the captions, and the player mode. Each is written with a
//! ten-year expiry scoped to the site root.

use crate::types::{PlayerMode, SpeedLabel};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

pub const VIDEO_SPEED: &str = "video_speed";
pub const HIDE_CAPTIONS: &str = "hide_captions";
pub const CURRENT_PLAYER_MODE: &str = "current_player_mode";

/// Cookie lifetime in days
pub const EXPIRY_DAYS: i64 = 3650;
/// Cookie path scope
pub const ROOT_PATH: &str = "/";

/// A persisted preference cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
}

impl Cookie {
    /// Long-lived root-scoped cookie
    pub fn persistent(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: Utc::now() + Duration::days(EXPIRY_DAYS),
            path: ROOT_PATH.to_string(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// Storage behind the preferences
pub trait PreferenceStore {
    /// Read a live cookie value
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie
    fn set(&mut self, cookie: Cookie) -> Result<()>;
}

/// In-memory cookie jar.
///
/// Clones share the same jar, so a test can keep a handle after giving one
/// to the bootstrapper.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    cookies: Rc<RefCell<BTreeMap<String, Cookie>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: &str) -> Self {
        self.cookies
            .borrow_mut()
            .insert(name.to_string(), Cookie::persistent(name, value));
        self
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.borrow().get(name).cloned()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .borrow()
            .get(name)
            .filter(|cookie| !cookie.is_expired(Utc::now()))
            .map(|cookie| cookie.value.clone())
    }

    fn set(&mut self, cookie: Cookie) -> Result<()> {
        self.cookies.borrow_mut().insert(cookie.name.clone(), cookie);
        Ok(())
    }
}

/// JSON file cookie jar, written through on every change
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    cookies: BTreeMap<String, Cookie>,
}

impl FilePreferences {
    /// Open a jar, starting empty when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cookies = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), count = cookies.len(), "Opened preference file");
        Ok(Self { path, cookies })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cookies(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.cookies)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired(Utc::now()))
            .map(|cookie| cookie.value.clone())
    }

    fn set(&mut self, cookie: Cookie) -> Result<()> {
        self.cookies.insert(cookie.name.clone(), cookie);
        self.save()
    }
}

/// Typed access to the three preference cookies
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    /// Persisted speed label, raw as stored
    pub fn speed(&self) -> Option<String> {
        self.store.get(VIDEO_SPEED)
    }

    pub fn set_speed(&mut self, speed: &SpeedLabel) {
        self.write(VIDEO_SPEED, speed.as_str());
    }

    /// True only when the stored value is exactly `"true"`
    pub fn hide_captions(&self) -> bool {
        self.store.get(HIDE_CAPTIONS).as_deref() == Some("true")
    }

    pub fn set_hide_captions(&mut self, hide: bool) {
        self.write(HIDE_CAPTIONS, if hide { "true" } else { "false" });
    }

    /// Stored player mode, if it is a known one
    pub fn player_mode(&self) -> Option<PlayerMode> {
        self.store.get(CURRENT_PLAYER_MODE)?.parse().ok()
    }

    pub fn set_player_mode(&mut self, mode: PlayerMode) {
        self.write(CURRENT_PLAYER_MODE, mode.as_str());
    }

    /// Restore the player mode, resetting unknown or absent values to html5
    pub fn ensure_player_mode(&mut self) -> PlayerMode {
        match self.player_mode() {
            Some(mode) => mode,
            None => {
                self.set_player_mode(PlayerMode::Html5);
                PlayerMode::Html5
            }
        }
    }

    fn write(&mut self, name: &str, value: &str) {
        if let Err(e) = self.store.set(Cookie::persistent(name, value)) {
            warn!(cookie = name, error = %e, code = e.error_code(), "Failed to persist preference");
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("speed", &self.speed())
            .field("hide_captions", &self.hide_captions())
            .field("player_mode", &self.player_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_expiry_and_path() {
        let cookie = Cookie::persistent(VIDEO_SPEED, "1.5");
        let days = (cookie.expires - Utc::now()).num_days();
        assert!((EXPIRY_DAYS - 1..=EXPIRY_DAYS).contains(&days));
        assert_eq!(cookie.path, "/");
        assert!(!cookie.is_expired(Utc::now()));
    }

    #[test]
    fn test_memory_store_is_shared() {
        let jar = MemoryPreferences::new();
        let mut prefs = Preferences::new(jar.clone());
        prefs.set_speed(&SpeedLabel::parse("1.25").unwrap());
        assert_eq!(jar.get(VIDEO_SPEED).as_deref(), Some("1.25"));
    }

    #[test]
    fn test_hide_captions_requires_exact_true() {
        let prefs = Preferences::new(MemoryPreferences::new().with(HIDE_CAPTIONS, "TRUE"));
        assert!(!prefs.hide_captions());
        let prefs = Preferences::new(MemoryPreferences::new().with(HIDE_CAPTIONS, "true"));
        assert!(prefs.hide_captions());
    }

    #[test]
    fn test_ensure_player_mode_resets_unknown() {
        let jar = MemoryPreferences::new().with(CURRENT_PLAYER_MODE, "silverlight");
        let mut prefs = Preferences::new(jar.clone());
        assert_eq!(prefs.ensure_player_mode(), PlayerMode::Html5);
        assert_eq!(jar.get(CURRENT_PLAYER_MODE).as_deref(), Some("html5"));
    }

    #[test]
    fn test_ensure_player_mode_keeps_flash() {
        let jar = MemoryPreferences::new().with(CURRENT_PLAYER_MODE, "flash");
        let mut prefs = Preferences::new(jar);
        assert_eq!(prefs.ensure_player_mode(), PlayerMode::Flash);
    }

    #[test]
    fn test_expired_cookie_is_ignored() {
        let mut jar = MemoryPreferences::new();
        let mut cookie = Cookie::persistent(VIDEO_SPEED, "0.75");
        cookie.expires = Utc::now() - Duration::days(1);
        jar.set(cookie).unwrap();
        assert_eq!(jar.get(VIDEO_SPEED), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut store = FilePreferences::open(&path).unwrap();
        store.set(Cookie::persistent(HIDE_CAPTIONS, "true")).unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(HIDE_CAPTIONS).as_deref(), Some("true"));
        assert_eq!(reopened.cookies().count(), 1);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FilePreferences::open(&path).is_err());
    }
}
