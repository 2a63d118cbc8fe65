//! In-process stores for tests and local runs without AWS.
//!
//! Both stores can be told to fail or stall, and count the writes they
//! accept so callers can check that nothing was written.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::claims::IdentityStore;
use crate::error::StoreError;
use crate::types::{CustomClaims, ProfileUpdate, UserRecord};
use crate::users::DocumentStore;

#[derive(Default)]
pub struct InMemoryIdentityStore {
    users: Mutex<HashMap<String, CustomClaims>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    lookup_delay: Mutex<Option<Duration>>,
    write_delay: Mutex<Option<Duration>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, uid: &str, claims: CustomClaims) -> Self {
        self.insert_user(uid, claims);
        self
    }

    pub fn insert_user(&self, uid: &str, claims: CustomClaims) {
        lock(&self.users).insert(uid.to_string(), claims);
    }

    pub fn claims(&self, uid: &str) -> Option<CustomClaims> {
        lock(&self.users).get(uid).cloned()
    }

    /// Make every following claims write fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Stall every `get_user` by `delay` before answering
    pub fn set_lookup_delay(&self, delay: Duration) {
        *lock(&self.lookup_delay) = Some(delay);
    }

    /// Stall every claims write by `delay` before applying it
    pub fn set_write_delay(&self, delay: Duration) {
        *lock(&self.write_delay) = Some(delay);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

async fn stall(delay: &Mutex<Option<Duration>>) {
    let delay = *lock(delay);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_user(&self, uid: &str) -> Result<UserRecord, StoreError> {
        stall(&self.lookup_delay).await;
        let claims = lock(&self.users)
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(uid.to_string()))?;
        Ok(UserRecord {
            uid: uid.to_string(),
            claims,
        })
    }

    async fn set_custom_user_claims(&self, uid: &str, claims: &CustomClaims) -> Result<(), StoreError> {
        stall(&self.write_delay).await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Identity("injected claims write failure".into()));
        }
        let mut users = lock(&self.users);
        let entry = users
            .get_mut(uid)
            .ok_or_else(|| StoreError::UserNotFound(uid.to_string()))?;
        *entry = claims.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    profiles: Mutex<HashMap<String, ProfileUpdate>>,
    fail_writes: AtomicBool,
    attempts: AtomicUsize,
    writes: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile for `uid` as a regular user
    pub fn with_profile(self, uid: &str) -> Self {
        lock(&self.profiles).insert(uid.to_string(), ProfileUpdate::from_admin_flag(false));
        self
    }

    pub fn profile(&self, uid: &str) -> Option<ProfileUpdate> {
        lock(&self.profiles).get(uid).copied()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Stall every update by `delay` before applying it
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Updates issued, successful or not
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        stall(&self.delay).await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Document("injected profile write failure".into()));
        }
        let mut profiles = lock(&self.profiles);
        let profile = profiles
            .get_mut(uid)
            .ok_or_else(|| StoreError::ProfileNotFound(uid.to_string()))?;
        *profile = *update;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// A panic while holding the lock leaves the map itself intact
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
