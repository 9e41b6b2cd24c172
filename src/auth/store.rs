//! Credential store
//!
//! Owns the registered user records and the active session, both kept in a
//! [`StorageAdapter`]. Every operation reads the adapter afresh, so two
//! stores over the same adapter contents always agree. Callers only ever
//! receive clones of records.
//!
//! The store is not internally synchronised. A process serving several
//! clients must hold one lock around each call (see `server::core`),
//! otherwise two registrations for the same username can both pass the
//! duplicate check before either writes.

use std::sync::Arc;

use chrono::SubsecRound;
use log::{debug, info, warn};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use super::credentials::PasswordScheme;
use super::model::{SignupDraft, UserRecord};
use super::validator::{self, Field, ValidationErrors};
use crate::error::{AuthError, StorageError};
use crate::storage::{Slot, StorageAdapter};

pub type SharedClock = Arc<dyn Clock + Send + Sync>;

pub struct CredentialStore {
    adapter: Box<dyn StorageAdapter>,
    clock: SharedClock,
    scheme: PasswordScheme,
}

impl CredentialStore {
    pub fn new(
        adapter: Box<dyn StorageAdapter>,
        clock: SharedClock,
        scheme: PasswordScheme,
    ) -> Self {
        Self {
            adapter,
            clock,
            scheme,
        }
    }

    /// Store on the system clock with plaintext passwords.
    pub fn with_adapter(adapter: impl StorageAdapter + 'static) -> Self {
        Self::new(
            Box::new(adapter),
            Arc::new(DefaultClock),
            PasswordScheme::Plaintext,
        )
    }

    pub fn scheme(&self) -> PasswordScheme {
        self.scheme
    }

    /// All records in creation order.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(self.load_users()?)
    }

    /// Creates a record from `draft` and persists the whole collection.
    ///
    /// Does **not** run [`validate_signup`](Self::validate_signup): callers
    /// must validate first, or a malformed draft is stored as-is. Only
    /// username uniqueness is enforced here.
    pub fn register(&mut self, draft: &SignupDraft) -> Result<UserRecord, AuthError> {
        let mut users = self.load_users()?;

        if users.iter().any(|user| user.username == draft.username) {
            warn!("Registration rejected: username {} already exists", draft.username);
            return Err(AuthError::DuplicateUsername(draft.username.clone()));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            username: draft.username.clone(),
            password: self.scheme.protect(&draft.password)?,
            birthday: draft.birthday.clone(),
            gender: draft.gender.clone(),
            created_at: self.clock.utc().trunc_subsecs(3),
        };

        users.push(record.clone());
        self.save_users(&users)?;

        info!(
            "Registered user {} ({} users total)",
            record.username,
            users.len()
        );
        Ok(record)
    }

    /// Signs in the record matching both `username` and `password`,
    /// replacing any active session.
    pub fn login(&mut self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let users = self.load_users()?;

        let Some(user) = users
            .into_iter()
            .find(|user| user.username == username && self.scheme.verify(password, &user.password))
        else {
            info!("Failed sign-in attempt for {username}");
            return Err(AuthError::InvalidCredentials);
        };

        let serialized = serde_json::to_string(&user).map_err(StorageError::Serialize)?;
        self.adapter.write(Slot::CurrentUser, &serialized)?;

        info!("User {} signed in", user.username);
        Ok(user)
    }

    /// The signed-in record, if any.
    pub fn current_session(&self) -> Result<Option<UserRecord>, AuthError> {
        let Some(raw) = self.adapter.read(Slot::CurrentUser)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| {
                StorageError::Corrupt {
                    slot: Slot::CurrentUser,
                    source,
                }
                .into()
            })
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.current_session()?.is_some())
    }

    /// Ends the active session. Calling it while signed out is fine.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.adapter.clear(Slot::CurrentUser)?;
        debug!("Session cleared");
        Ok(())
    }

    /// Runs the signup rules against today's date on the store clock, then
    /// reports an already-registered username on the username field.
    ///
    /// The uniqueness check only runs when the username is otherwise
    /// well-formed, so the format messages keep priority.
    pub fn validate_signup(&self, draft: &SignupDraft) -> Result<ValidationErrors, AuthError> {
        let today = self.clock.local().date_naive();
        let mut errors = validator::validate_signup(draft, today);

        if !errors.contains(Field::Username) && self.username_taken(&draft.username)? {
            errors.insert(Field::Username, "Username already exists");
        }

        Ok(errors)
    }

    pub fn username_taken(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self
            .load_users()?
            .iter()
            .any(|user| user.username == username))
    }

    fn load_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        match self.adapter.read(Slot::Users)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                slot: Slot::Users,
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save_users(&mut self, users: &[UserRecord]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(users).map_err(StorageError::Serialize)?;
        self.adapter.write(Slot::Users, &serialized)
    }
}
