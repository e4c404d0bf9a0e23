//! # Session Service
//!
//! Mock sign-in for a single device. The signed-in [`User`] is persisted
//! through [`SessionStorage`] so it survives restarts, and every change is
//! pushed to subscribers in the order it happened.
//!
//! Subscribers are called synchronously after the state lock is released, so
//! a callback may read the session again without deadlocking.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::User;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use super::commands::session::{LoginCommand, UpdateUserCommand};
use super::error::{ProfileValidationError, TrackerError};
use crate::storage::SessionStorage;

pub const DEFAULT_DISPLAY_NAME: &str = "準媽媽 Sarah";
pub const DEFAULT_EMAIL: &str = "sarah.mom@example.com";
pub const DEFAULT_PHOTO_URL: &str = "https://lh3.googleusercontent.com/aida-public/AB6AXuBpG9yWL_l_8M77rEUq9GkNpEHAXuVpsMnZ5RXhf21TxVJzkQz76-lpHQ_Qm8meorxPOqqBdLHIlq7CN3otV0Pbnt5CE79RgyFLgGML9CuVq6Eq749WnTkQM6NjLIk4_BPUWOG29_vRZQ8Wu_kVOzS9oQjyj_bK7IOpF5hoB9b0pJWmqtIHI-pzo5KIksTy84bJsepe4WJkgdRSrqFUkOXk-cL8tl3TiWNdDw9VRchpr-67yxyP22Hvz9QcbU8Kt9N2mfl_-9vKUA4U";

const MOCK_UID_PREFIX: &str = "google-mock-id-";
const MOCK_UID_SUFFIX_LEN: usize = 9;
const AVATAR_SERVICE_URL: &str = "https://ui-avatars.com/api/";
const MAX_DISPLAY_NAME_CHARS: usize = 100;

/// Artificial delays for sign-in and sign-out, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthLatency {
    pub login_ms: u64,
    pub logout_ms: u64,
}

impl AuthLatency {
    pub fn simulated() -> Self {
        Self {
            login_ms: 800,
            logout_ms: 400,
        }
    }
}

/// Receives the new user, or `None` after sign-out
pub type SessionCallback = Arc<dyn Fn(Option<&User>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct SessionState {
    current_user: Option<User>,
    subscribers: Vec<(SubscriptionId, SessionCallback)>,
    next_subscription: u64,
}

#[derive(Clone)]
pub struct SessionService {
    storage: Arc<dyn SessionStorage>,
    latency: AuthLatency,
    state: Arc<Mutex<SessionState>>,
}

impl SessionService {
    pub fn new(storage: Arc<dyn SessionStorage>, latency: AuthLatency) -> Self {
        Self {
            storage,
            latency,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Restore the persisted user, if any, and announce it
    pub async fn initialize(&self) -> Result<Option<User>> {
        let user = self.storage.load_user().await?;
        match &user {
            Some(user) => info!("Restored session for {}", user.uid),
            None => info!("No persisted session"),
        }
        self.publish(user.clone());
        Ok(user)
    }

    pub async fn login(&self, command: LoginCommand) -> Result<User> {
        tokio::time::sleep(Duration::from_millis(self.latency.login_ms)).await;

        let name = non_empty(command.name);
        let email = non_empty(command.email);
        let photo_url = match &name {
            Some(name) => avatar_url(name),
            None if email.is_some() => avatar_url(DEFAULT_DISPLAY_NAME),
            None => DEFAULT_PHOTO_URL.to_string(),
        };

        let user = User {
            uid: mock_uid(),
            display_name: Some(name.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())),
            email: Some(email.unwrap_or_else(|| DEFAULT_EMAIL.to_string())),
            photo_url: Some(photo_url),
        };

        self.storage.store_user(&user).await?;
        info!("Signed in {} as {:?}", user.uid, user.display_name);

        self.publish(Some(user.clone()));
        Ok(user)
    }

    /// Merge profile changes into the signed-in user
    pub async fn update_profile(&self, command: UpdateUserCommand) -> Result<User> {
        let mut user = self.current_user().ok_or(TrackerError::NotSignedIn)?;

        if let Some(display_name) = command.display_name {
            let display_name = display_name.trim();
            if display_name.is_empty() {
                return Err(ProfileValidationError::EmptyDisplayName.into());
            }
            if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
                return Err(ProfileValidationError::DisplayNameTooLong.into());
            }
            user.display_name = Some(display_name.to_string());
        }
        if let Some(photo_url) = non_empty(command.photo_url) {
            user.photo_url = Some(photo_url);
        }

        self.storage.store_user(&user).await?;
        info!("Updated profile for {}", user.uid);

        self.publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(self.latency.logout_ms)).await;

        self.storage.clear_user().await?;
        if let Some(user) = self.current_user() {
            info!("Signed out {}", user.uid);
        }

        self.publish(None);
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock_state().current_user.clone()
    }

    pub fn require_user(&self) -> Result<User> {
        self.current_user()
            .ok_or_else(|| TrackerError::NotSignedIn.into())
    }

    /// Register a listener; it is called at once with the current user
    pub fn subscribe(&self, callback: SessionCallback) -> SubscriptionId {
        let (id, current) = {
            let mut state = self.lock_state();
            let id = SubscriptionId(state.next_subscription);
            state.next_subscription += 1;
            state.subscribers.push((id, callback.clone()));
            (id, state.current_user.clone())
        };
        callback(current.as_ref());
        id
    }

    /// Returns false when the id was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock_state();
        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        let removed = state.subscribers.len() != before;
        if !removed {
            warn!("Unsubscribe for unknown subscription {:?}", id);
        }
        removed
    }

    fn publish(&self, user: Option<User>) {
        let subscribers: Vec<SessionCallback> = {
            let mut state = self.lock_state();
            state.current_user = user.clone();
            state
                .subscribers
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect()
        };
        for callback in subscribers {
            callback(user.as_ref());
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn mock_uid() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(MOCK_UID_SUFFIX_LEN)
        .collect();
    format!("{}{}", MOCK_UID_PREFIX, suffix)
}

fn avatar_url(name: &str) -> String {
    let params = [
        ("name", name),
        ("background", "4f7870"),
        ("color", "fff"),
        ("size", "128"),
    ];
    reqwest::Url::parse_with_params(AVATAR_SERVICE_URL, &params)
        .map(String::from)
        .unwrap_or_else(|_| DEFAULT_PHOTO_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStorage;

    fn service() -> (SessionService, Arc<InMemorySessionStorage>) {
        let storage = Arc::new(InMemorySessionStorage::new());
        (SessionService::new(storage.clone(), AuthLatency::default()), storage)
    }

    fn recorder(service: &SessionService) -> Arc<Mutex<Vec<Option<String>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        service.subscribe(Arc::new(move |user: Option<&User>| {
            sink.lock().unwrap().push(user.map(|u| u.uid.clone()));
        }));
        seen
    }

    #[tokio::test]
    async fn test_login_with_defaults() {
        let (service, storage) = service();
        let user = service.login(LoginCommand::default()).await.unwrap();

        assert!(user.uid.starts_with("google-mock-id-"));
        assert_eq!(user.uid.len(), "google-mock-id-".len() + 9);
        assert_eq!(user.display_name.as_deref(), Some(DEFAULT_DISPLAY_NAME));
        assert_eq!(user.email.as_deref(), Some(DEFAULT_EMAIL));
        assert_eq!(user.photo_url.as_deref(), Some(DEFAULT_PHOTO_URL));
        assert!(DEFAULT_PHOTO_URL.starts_with("https://lh3.googleusercontent.com/"));
        assert_eq!(storage.load_user().await.unwrap(), Some(user.clone()));
        assert_eq!(service.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_login_with_custom_name_builds_avatar() {
        let (service, _) = service();
        let user = service
            .login(LoginCommand {
                name: Some("Amy Chen".to_string()),
                email: Some("amy@example.com".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.display_name.as_deref(), Some("Amy Chen"));
        assert_eq!(user.email.as_deref(), Some("amy@example.com"));
        let photo_url = user.photo_url.unwrap();
        assert!(photo_url.starts_with("https://ui-avatars.com/api/?name=Amy"));
        assert!(photo_url.contains("background=4f7870"));
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change_in_order() {
        let (service, _) = service();
        let seen = recorder(&service);

        let user = service.login(LoginCommand::default()).await.unwrap();
        service.logout().await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![None, Some(user.uid), None]);
        assert_eq!(service.current_user(), None);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let (service, _) = service();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let id = service.subscribe(Arc::new(move |_: Option<&User>| {
            *sink.lock().unwrap() += 1;
        }));

        assert!(service.unsubscribe(id));
        assert!(!service.unsubscribe(id));
        service.login(LoginCommand::default()).await.unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_callback_may_read_session() {
        let (service, _) = service();
        let reader = service.clone();
        service.subscribe(Arc::new(move |user: Option<&User>| {
            assert_eq!(reader.current_user().as_ref(), user);
        }));
        service.login(LoginCommand::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, storage) = service();
        let result = service
            .update_profile(UpdateUserCommand {
                display_name: Some("Amy".to_string()),
                photo_url: None,
            })
            .await;
        assert_eq!(
            result.unwrap_err().downcast_ref::<TrackerError>(),
            Some(&TrackerError::NotSignedIn)
        );

        let user = service.login(LoginCommand::default()).await.unwrap();
        let updated = service
            .update_profile(UpdateUserCommand {
                display_name: Some("  Amy  ".to_string()),
                photo_url: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.uid, user.uid);
        assert_eq!(updated.display_name.as_deref(), Some("Amy"));
        assert_eq!(updated.photo_url, user.photo_url);
        assert_eq!(storage.load_user().await.unwrap(), Some(updated));

        let empty = service
            .update_profile(UpdateUserCommand {
                display_name: Some("   ".to_string()),
                photo_url: None,
            })
            .await;
        assert_eq!(
            empty.unwrap_err().downcast_ref::<ProfileValidationError>(),
            Some(&ProfileValidationError::EmptyDisplayName)
        );
    }

    #[tokio::test]
    async fn test_initialize_restores_persisted_user() {
        let (first, storage) = service();
        let user = first.login(LoginCommand::default()).await.unwrap();

        let second = SessionService::new(storage, AuthLatency::default());
        assert_eq!(second.current_user(), None);
        assert_eq!(second.initialize().await.unwrap(), Some(user.clone()));
        assert_eq!(second.require_user().unwrap(), user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_latency() {
        let storage = Arc::new(InMemorySessionStorage::new());
        let service = SessionService::new(storage, AuthLatency::simulated());

        let start = tokio::time::Instant::now();
        service.login(LoginCommand::default()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(800));
    }
}
