//! Session state: bearer token, decoded vehicle, and its on-disk persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{PreconditionError, Result};
use crate::types::VinDecoded;

/// What the user has established so far: a login and, optionally, a decoded VIN
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token returned by login
    #[serde(default)]
    pub access_token: Option<String>,
    /// Vehicle configuration returned by VIN decode
    #[serde(default)]
    pub vehicle_config: Option<String>,
    /// Full VIN decode response, kept for display after a restart
    #[serde(default)]
    pub vin_decode: Option<serde_json::Value>,
}

impl Session {
    /// Record a successful login; any previously decoded vehicle is kept
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    /// Record a successful VIN decode
    pub fn set_vehicle(&mut self, decoded: VinDecoded) {
        self.vehicle_config = Some(decoded.vehicle_configuration);
        self.vin_decode = Some(decoded.response);
    }

    /// Forget everything (logout, or the server reported the session expired)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The credentials every catalog query needs
    ///
    /// # Errors
    ///
    /// Names the first missing prerequisite: the token, then the vehicle configuration.
    pub fn context(&self) -> std::result::Result<SessionContext, PreconditionError> {
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(PreconditionError::MissingSession)?;
        let vehicle_config = self
            .vehicle_config
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(PreconditionError::MissingVehicleConfig)?;

        Ok(SessionContext {
            token: token.to_string(),
            vehicle_config: vehicle_config.to_string(),
        })
    }
}

/// Token plus vehicle configuration, as sent on every catalog query
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Bearer token
    pub token: String,
    /// `X-Vehicle-Configuration` header value
    pub vehicle_config: String,
}

impl SessionContext {
    /// Build a context from known-good values
    pub fn new(token: impl Into<String>, vehicle_config: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            vehicle_config: vehicle_config.into(),
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"***")
            .field("vehicle_config", &self.vehicle_config)
            .finish()
    }
}

/// JSON file holding the [`Session`] between runs
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured session path
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.path.clone())
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session
    ///
    /// A missing file is an empty session. So is an unreadable or corrupt one;
    /// that case is logged and otherwise ignored.
    pub async fn load(&self) -> Session {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved session");
                return Session::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read saved session");
                return Session::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse saved session");
                Session::default()
            }
        }
    }

    /// Persist the session, creating parent directories as needed
    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the saved session; a missing file is not an error
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoded() -> VinDecoded {
        VinDecoded {
            vehicle_configuration: "cfg-123".into(),
            response: json!({ "data": [{ "vehicleConfiguration": "cfg-123" }] }),
        }
    }

    #[test]
    fn test_context_names_missing_prerequisite() {
        let mut session = Session::default();
        assert_eq!(
            session.context().unwrap_err(),
            PreconditionError::MissingSession
        );

        session.set_token("tok");
        assert_eq!(
            session.context().unwrap_err(),
            PreconditionError::MissingVehicleConfig
        );

        session.set_vehicle(decoded());
        let ctx = session.context().unwrap();
        assert_eq!(ctx.token, "tok");
        assert_eq!(ctx.vehicle_config, "cfg-123");
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let session = Session {
            access_token: Some(String::new()),
            ..Default::default()
        };
        assert!(!session.is_authenticated());
        assert_eq!(
            session.context().unwrap_err(),
            PreconditionError::MissingSession
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let ctx = SessionContext::new("secret-token", "cfg");
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("cfg"));
    }

    #[tokio::test]
    async fn test_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().await, Session::default());

        let mut session = Session::default();
        session.set_token("tok");
        session.set_vehicle(decoded());
        store.save(&session).await.unwrap();

        assert_eq!(store.load().await, session);

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_store_from_config_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            path: dir.path().join("state").join("catalog-session.json"),
        };
        let store = SessionStore::from_config(&config);
        assert_eq!(store.path(), config.path.as_path());

        let mut session = Session::default();
        session.set_token("tok");
        store.save(&session).await.unwrap();

        assert!(config.path.exists());
        assert_eq!(SessionStore::new(&config.path).load().await, session);
        assert_eq!(
            SessionStore::from_config(&SessionConfig::default()).path(),
            Path::new("session.json")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{ broken").await.unwrap();

        assert_eq!(SessionStore::new(path).load().await, Session::default());
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut session = Session::default();
        session.set_token("tok");
        session.set_vehicle(decoded());
        session.clear();
        assert_eq!(session, Session::default());
    }
}
