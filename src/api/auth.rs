// GDrive Music - Google Drive music library client
// Copyright (C) 2025 GDrive Music contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Session derivation from a captured browser cookie
//!
//! Login happens in a host-owned web view; once it lands on Drive, the host
//! hands over the raw `Cookie` header string. Everything this module needs
//! is inside it:
//!
//! - the session secret (`SAPISID` or `__Secure-3PAPISID`), used to sign
//!   batch requests, see [`crate::api::signing`]
//! - optionally the account e-mail, from `remember=` or `ACCOUNT_CHOOSER=`
//!
//! # Session lifecycle
//!
//! 1. `SessionStore::validate_and_store` parses the cookie and installs a new
//!    [`AuthState`]. Missing secret fails with `MissingCredential`.
//! 2. The API key and music folder id are discovered lazily and written back
//!    with `update_api_key_for` / `update_music_folder_id_for`. The write
//!    only lands if the session it was fetched for is still current.
//! 3. Any 401/403 from Drive, or an explicit logout, clears the session.
//!
//! The store swaps whole immutable `Arc<AuthState>` snapshots, so a reader
//! never sees a half-updated session.
//!
//! # Security Considerations
//!
//! The cookie, the secret and the API key never appear in logs; use
//! [`AuthState::masked_log_entry`].

use crate::error::{DriveError, Result};
use crate::media::models::{Extras, User};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Cookie names carrying the session secret, in no particular priority
const SESSION_SECRET_COOKIES: [&str; 2] = ["SAPISID", "__Secure-3PAPISID"];

/// Extras key holding the raw cookie on a persisted user
pub const COOKIE_EXTRA_KEY: &str = "cookie";

/// Extras key holding the resolved user id on a persisted user
pub const EMAIL_EXTRA_KEY: &str = "email";

/// Display name used when no e-mail could be found
const FALLBACK_DISPLAY_NAME: &str = "Google Drive User";

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex");
}

/// Credentials pulled out of a raw cookie string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieCredentials {
    pub session_secret: String,
    pub email: Option<String>,
}

/// Split a `Cookie` header into trimmed `name=value` pairs
fn cookie_fields(cookie: &str) -> impl Iterator<Item = (&str, &str)> {
    cookie
        .split(';')
        .map(str::trim)
        .filter_map(|part| part.split_once('='))
}

/// Find the session secret: first accepted field wins, empty values count as absent
pub fn extract_session_secret(cookie: &str) -> Option<String> {
    cookie_fields(cookie)
        .find(|(name, _)| SESSION_SECRET_COOKIES.contains(name))
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Best-effort e-mail lookup from `remember=` or `ACCOUNT_CHOOSER=`
pub fn extract_email(cookie: &str) -> Option<String> {
    cookie_fields(cookie).find_map(|(name, value)| match name {
        "remember" => urlencoding::decode(value)
            .ok()
            .map(|v| v.into_owned())
            .filter(|v| v.contains('@')),
        "ACCOUNT_CHOOSER" => urlencoding::decode(value)
            .ok()
            .and_then(|v| EMAIL_REGEX.find(&v).map(|m| m.as_str().to_string())),
        _ => None,
    })
}

/// Parse a raw cookie into credentials
///
/// # Errors
/// `MissingCredential` when no session secret field is present
pub fn parse_cookie(cookie: &str) -> Result<CookieCredentials> {
    let session_secret = extract_session_secret(cookie).ok_or(DriveError::MissingCredential)?;
    Ok(CookieCredentials {
        session_secret,
        email: extract_email(cookie),
    })
}

/// Synthetic user id for accounts whose cookie carries no e-mail
fn synthetic_user_id(session_secret: &str) -> String {
    let prefix: String = session_secret.chars().take(16).collect();
    format!("gdrive_{}", prefix)
}

/// One authenticated session
///
/// Never mutated in place; updates produce a new value that replaces the old
/// one in [`SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub cookie: String,
    pub session_secret: String,
    /// E-mail if known, otherwise `gdrive_<secret prefix>`
    pub user_id: String,
    pub music_folder_id: Option<String>,
    pub api_key: Option<String>,
    /// Distinct per login or restore; kept across copy-on-write updates
    generation: u64,
}

impl AuthState {
    /// Derive a fresh session from a raw cookie
    pub fn derive(cookie: &str) -> Result<Self> {
        let credentials = parse_cookie(cookie)?;
        let user_id = credentials
            .email
            .unwrap_or_else(|| synthetic_user_id(&credentials.session_secret));

        Ok(Self {
            cookie: cookie.to_string(),
            session_secret: credentials.session_secret,
            user_id,
            music_folder_id: None,
            api_key: None,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Rehydrate from a persisted cookie + user id pair.
    /// Incomplete pairs give `None`: partial state is never trusted.
    pub fn restore(cookie: Option<&str>, user_id: Option<&str>) -> Option<Self> {
        let cookie = cookie.filter(|c| !c.is_empty())?;
        let user_id = user_id.filter(|u| !u.is_empty())?;
        let session_secret = extract_session_secret(cookie)?;

        Some(Self {
            cookie: cookie.to_string(),
            session_secret,
            user_id: user_id.to_string(),
            music_folder_id: None,
            api_key: None,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// True when both values descend from the same login or restore
    pub fn same_session(&self, other: &AuthState) -> bool {
        self.generation == other.generation
    }

    pub fn display_name(&self) -> String {
        if self.user_id.contains('@') {
            self.user_id
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        } else if self.user_id.starts_with("gdrive_") {
            FALLBACK_DISPLAY_NAME.to_string()
        } else {
            self.user_id.clone()
        }
    }

    /// Host user record; the extras are what the host persists for restore
    pub fn to_user(&self) -> User {
        let mut extras = Extras::new();
        extras.insert(COOKIE_EXTRA_KEY.to_string(), self.cookie.clone());
        extras.insert(EMAIL_EXTRA_KEY.to_string(), self.user_id.clone());

        User {
            id: self.user_id.clone(),
            name: self.display_name(),
            cover: None,
            extras,
        }
    }

    /// Generate a masked log entry for safe logging
    pub fn masked_log_entry(&self) -> String {
        format!(
            "UserId={}|Secret={}|ApiKey={}|MusicFolder={}",
            mask(&self.user_id),
            mask(&self.session_secret),
            self.api_key.as_deref().map(mask).unwrap_or_else(|| "[none]".to_string()),
            self.music_folder_id.as_deref().unwrap_or("[none]")
        )
    }
}

/// Shows first 2 and last 2 characters, replaces middle with asterisks
fn mask(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        "[empty]".to_string()
    } else if chars.len() <= 4 {
        "****".to_string()
    } else {
        let first_two: String = chars.iter().take(2).collect();
        let last_two: String = chars.iter().skip(chars.len() - 2).collect();
        format!("{}{}{}", first_two, "*".repeat(chars.len() - 4), last_two)
    }
}

/// Holder of the current session, shared by every component
///
/// Readers get an `Arc` snapshot; writers replace the snapshot under a short
/// write lock. No lock is held across an await.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<Option<Arc<AuthState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify a captured cookie and make it the current session
    pub fn validate_and_store(&self, cookie: &str) -> Result<User> {
        let state = AuthState::derive(cookie)?;
        let user = state.to_user();
        info!("Session established: {}", state.masked_log_entry());
        self.replace(Some(state));
        Ok(user)
    }

    /// Restore a session from a user the host persisted earlier
    pub fn restore(&self, user: &User) {
        let cookie = user.extras.get(COOKIE_EXTRA_KEY).map(|s| s.as_str());
        let user_id = user
            .extras
            .get(EMAIL_EXTRA_KEY)
            .map(|s| s.as_str())
            .or(Some(user.id.as_str()));

        let restored = AuthState::restore(cookie, user_id);
        match &restored {
            Some(state) => info!("Session restored: {}", state.masked_log_entry()),
            None => debug!("Persisted user incomplete, staying logged out"),
        }
        self.replace(restored);
    }

    pub fn current(&self) -> Option<Arc<AuthState>> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Current session or `LoginRequired`
    pub fn require(&self) -> Result<Arc<AuthState>> {
        self.current().ok_or(DriveError::LoginRequired)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current().map(|state| state.to_user())
    }

    pub fn cookie(&self) -> Result<String> {
        Ok(self.require()?.cookie.clone())
    }

    pub fn session_secret(&self) -> Result<String> {
        Ok(self.require()?.session_secret.clone())
    }

    pub fn api_key(&self) -> Option<String> {
        self.current().and_then(|s| s.api_key.clone())
    }

    pub fn music_folder_id(&self) -> Option<String> {
        self.current().and_then(|s| s.music_folder_id.clone())
    }

    pub fn update_api_key(&self, key: &str) {
        self.update(|state| state.api_key = Some(key.to_string()));
    }

    pub fn update_music_folder_id(&self, folder_id: &str) {
        self.update(|state| state.music_folder_id = Some(folder_id.to_string()));
    }

    /// Store a key fetched under `fetched_for`, unless the session changed since
    pub fn update_api_key_for(&self, fetched_for: &AuthState, key: &str) -> bool {
        self.update_if_current(fetched_for, |state| state.api_key = Some(key.to_string()))
    }

    /// Store a folder id resolved under `fetched_for`, unless the session changed since
    pub fn update_music_folder_id_for(&self, fetched_for: &AuthState, folder_id: &str) -> bool {
        self.update_if_current(fetched_for, |state| {
            state.music_folder_id = Some(folder_id.to_string())
        })
    }

    pub fn clear(&self) {
        if self.is_authenticated() {
            info!("Clearing session");
        }
        self.replace(None);
    }

    fn replace(&self, state: Option<AuthState>) {
        let mut guard = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = state.map(Arc::new);
    }

    /// Copy-on-write update; a cleared session stays cleared
    fn update<F: FnOnce(&mut AuthState)>(&self, f: F) {
        let mut guard = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(current) = guard.as_ref() {
            let mut next = AuthState::clone(current);
            f(&mut next);
            *guard = Some(Arc::new(next));
        }
    }

    fn update_if_current<F: FnOnce(&mut AuthState)>(&self, expected: &AuthState, f: F) -> bool {
        let mut guard = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(current) if current.same_session(expected) => {
                let mut next = AuthState::clone(current);
                f(&mut next);
                *guard = Some(Arc::new(next));
                true
            }
            _ => {
                debug!("Session changed while fetching; dropping stale value");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIE: &str = "NID=511=abc; SAPISID=AbCdEfGhIjKlMnOpQrSt/xyz; HSID=h1";

    #[test]
    fn test_extract_sapisid() {
        assert_eq!(
            extract_session_secret(COOKIE).as_deref(),
            Some("AbCdEfGhIjKlMnOpQrSt/xyz")
        );
    }

    #[test]
    fn test_extract_secure_3papisid() {
        let cookie = "a=b;__Secure-3PAPISID=zzz-111;c=d";
        assert_eq!(extract_session_secret(cookie).as_deref(), Some("zzz-111"));
    }

    #[test]
    fn test_secret_value_with_equals_kept_whole() {
        let cookie = "SAPISID=abc=def==";
        assert_eq!(extract_session_secret(cookie).as_deref(), Some("abc=def=="));
    }

    #[test]
    fn test_first_secret_field_wins() {
        let cookie = "__Secure-3PAPISID=first; SAPISID=second";
        assert_eq!(extract_session_secret(cookie).as_deref(), Some("first"));
    }

    #[test]
    fn test_similar_names_do_not_match() {
        // APISID and __Secure-1PAPISID are different cookies
        let cookie = "APISID=nope; __Secure-1PAPISID=nope; XSAPISID=nope";
        assert_eq!(extract_session_secret(cookie), None);
        assert!(matches!(parse_cookie(cookie), Err(DriveError::MissingCredential)));
    }

    #[test]
    fn test_missing_secret_fails() {
        assert!(matches!(
            AuthState::derive("NID=1; HSID=2"),
            Err(DriveError::MissingCredential)
        ));
        assert!(matches!(AuthState::derive(""), Err(DriveError::MissingCredential)));
    }

    #[test]
    fn test_email_from_remember() {
        let cookie = format!("{}; remember=jane.doe%40gmail.com", COOKIE);
        assert_eq!(extract_email(&cookie).as_deref(), Some("jane.doe@gmail.com"));
    }

    #[test]
    fn test_email_from_account_chooser() {
        let cookie = "ACCOUNT_CHOOSER=AFx_qI7%3Dbob%40example.org%26x%3D1; SAPISID=s";
        assert_eq!(extract_email(cookie).as_deref(), Some("bob@example.org"));
    }

    #[test]
    fn test_remember_without_at_is_ignored() {
        let cookie = "remember=true; SAPISID=s";
        assert_eq!(extract_email(cookie), None);
    }

    #[test]
    fn test_synthetic_id_without_email() {
        let state = AuthState::derive(COOKIE).unwrap();
        assert_eq!(state.user_id, "gdrive_AbCdEfGhIjKlMnOp");
        assert_eq!(state.display_name(), "Google Drive User");
    }

    #[test]
    fn test_user_extras_round_trip_through_restore() {
        let cookie = format!("{}; remember=jane%40gmail.com", COOKIE);
        let store = SessionStore::new();
        let user = store.validate_and_store(&cookie).unwrap();
        assert_eq!(user.id, "jane@gmail.com");
        assert_eq!(user.name, "jane");
        assert_eq!(user.extras.get(COOKIE_EXTRA_KEY), Some(&cookie));

        let other = SessionStore::new();
        other.restore(&user);
        let restored = other.require().unwrap();
        assert_eq!(restored.user_id, "jane@gmail.com");
        assert_eq!(restored.session_secret, "AbCdEfGhIjKlMnOpQrSt/xyz");
    }

    #[test]
    fn test_restore_incomplete_user_clears() {
        let store = SessionStore::new();
        store.validate_and_store(COOKIE).unwrap();

        let user = User {
            id: String::new(),
            name: "x".into(),
            cover: None,
            extras: Extras::new(),
        };
        store.restore(&user);
        assert!(!store.is_authenticated());
        assert!(matches!(store.cookie(), Err(DriveError::LoginRequired)));
    }

    #[test]
    fn test_updates_replace_snapshot() {
        let store = SessionStore::new();
        store.validate_and_store(COOKIE).unwrap();
        let before = store.current().unwrap();

        store.update_api_key("k".repeat(39).as_str());
        store.update_music_folder_id("folder123");

        let after = store.current().unwrap();
        assert_eq!(before.api_key, None);
        assert_eq!(after.api_key.as_deref().map(str::len), Some(39));
        assert_eq!(after.music_folder_id.as_deref(), Some("folder123"));
    }

    #[test]
    fn test_update_after_clear_is_noop() {
        let store = SessionStore::new();
        store.validate_and_store(COOKIE).unwrap();
        store.clear();
        store.update_api_key("late");
        assert!(store.current().is_none());
        assert_eq!(store.api_key(), None);
    }

    #[test]
    fn test_value_fetched_for_old_session_is_dropped() {
        let store = SessionStore::new();
        store.validate_and_store(COOKIE).unwrap();
        let first = store.current().unwrap();

        store.clear();
        store.validate_and_store("SAPISID=accountB/secret; remember=b%40example.com").unwrap();

        assert!(!store.update_music_folder_id_for(&first, "A_FOLDER"));
        assert!(!store.update_api_key_for(&first, "A_KEY"));
        assert_eq!(store.music_folder_id(), None);
        assert_eq!(store.api_key(), None);
    }

    #[test]
    fn test_same_login_survives_interleaved_updates() {
        let store = SessionStore::new();
        store.validate_and_store(COOKIE).unwrap();
        let snapshot = store.current().unwrap();

        assert!(store.update_api_key_for(&snapshot, "key"));
        // the snapshot predates the key update but is the same login
        assert!(store.update_music_folder_id_for(&snapshot, "folder"));
        assert_eq!(store.api_key().as_deref(), Some("key"));
        assert_eq!(store.music_folder_id().as_deref(), Some("folder"));
    }

    #[test]
    fn test_relogin_with_same_cookie_is_new_session() {
        let a = AuthState::derive(COOKIE).unwrap();
        let b = AuthState::derive(COOKIE).unwrap();
        assert!(!a.same_session(&b));
        assert!(a.same_session(&a.clone()));
    }

    #[test]
    fn test_masked_log_entry_hides_secret() {
        let state = AuthState::derive(COOKIE).unwrap();
        let masked = state.masked_log_entry();
        assert!(!masked.contains("AbCdEfGhIjKlMnOpQrSt/xyz"));
        assert!(masked.contains("Ab"));
    }
}
