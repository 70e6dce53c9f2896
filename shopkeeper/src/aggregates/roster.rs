//! Roster aggregate: actor accounts and admin approval.
//!
//! Customers self-register; an administrator account instead starts as a
//! queued request that an existing administrator approves or rejects. Spend
//! is credited after each committed checkout and can only ever upgrade the
//! discount tier. The pending request queue is session-scoped; only approved
//! accounts are persisted.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeeper_core::{Effect, SmallVec};
use shopkeeper_macros::Action;

use crate::engine::{EngineAction, EngineEnvironment};
use crate::types::{ActorId, ActorRecord, AdminRequest, Money, Tier};

// ============================================================================
// State
// ============================================================================

/// Roster state: accounts, the name index, and pending admin requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterState {
    /// Accounts keyed by id
    actors: BTreeMap<ActorId, ActorRecord>,
    /// Username → id lookup; usernames are unique
    by_name: HashMap<String, ActorId>,
    /// Next id to assign; ids are never reused
    next_id: u32,
    /// Admin account requests awaiting a decision, oldest first
    pending_admins: Vec<AdminRequest>,
    /// Last validation error, if any
    pub last_error: Option<String>,
}

impl Default for RosterState {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterState {
    /// Creates an empty roster; ids start at 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
            pending_admins: Vec::new(),
            last_error: None,
        }
    }

    /// Rebuilds the roster from persisted records, dropping colliding rows
    #[must_use]
    pub fn from_parts(next_id: u32, records: Vec<ActorRecord>) -> Self {
        let mut state = Self::new();
        let mut highest = 0;
        for record in records {
            if state.actors.contains_key(&record.id) {
                tracing::warn!(id = %record.id, "duplicate actor id in data, dropped");
                continue;
            }
            if state.by_name.contains_key(&record.username) {
                tracing::warn!(username = %record.username, "duplicate username in data, dropped");
                continue;
            }
            highest = highest.max(record.id.value());
            state.index_actor(record);
        }
        state.next_id = next_id.max(highest + 1);
        state
    }

    /// The id the next registered actor will receive
    #[must_use]
    pub const fn next_id(&self) -> ActorId {
        ActorId::new(self.next_id)
    }

    /// Looks up an account by id
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&ActorRecord> {
        self.actors.get(&id)
    }

    /// Looks up an account by username
    #[must_use]
    pub fn actor_by_name(&self, username: &str) -> Option<&ActorRecord> {
        self.by_name.get(username).and_then(|id| self.actors.get(id))
    }

    /// Matches credentials against the roster
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&ActorRecord> {
        self.actor_by_name(username).filter(|record| record.password == password)
    }

    /// All accounts in id order
    #[must_use]
    pub fn records(&self) -> Vec<&ActorRecord> {
        self.actors.values().collect()
    }

    /// Number of accounts
    #[must_use]
    pub fn count(&self) -> usize {
        self.actors.len()
    }

    /// Admin requests awaiting a decision, oldest first
    #[must_use]
    pub fn pending_requests(&self) -> &[AdminRequest] {
        &self.pending_admins
    }

    /// `true` when at least one administrator account exists
    #[must_use]
    pub fn has_admin(&self) -> bool {
        self.actors.values().any(|record| record.is_admin)
    }

    /// Credits committed spend and upgrades the tier it now entitles.
    ///
    /// Tiers never downgrade, a record keeps the highest tier it has reached.
    pub(crate) fn record_spend(&mut self, actor_id: ActorId, amount: Money) {
        if let Some(record) = self.actors.get_mut(&actor_id) {
            record.total_spent = record
                .total_spent
                .checked_add(amount)
                .unwrap_or(Money::from_cents(u64::MAX));
            record.tier = record.tier.max(Tier::for_spend(record.total_spent));
        }
    }

    fn username_taken(&self, username: &str) -> bool {
        self.by_name.contains_key(username)
            || self.pending_admins.iter().any(|request| request.username == username)
    }

    fn index_actor(&mut self, record: ActorRecord) {
        self.by_name.insert(record.username.clone(), record.id);
        self.actors.insert(record.id, record);
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Actions handled by the roster aggregate
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RosterAction {
    // ========== Commands ==========
    /// Command: register an account, or queue an admin request
    #[command]
    RegisterActor {
        /// Requested login name
        username: String,
        /// Requested password
        password: String,
        /// `true` queues an admin request instead of creating an account
        request_admin: bool,
    },
    /// Command: create the bootstrap administrator if none exists yet
    #[command]
    SeedAdmin {
        /// Bootstrap login name
        username: String,
        /// Bootstrap password
        password: String,
    },
    /// Command: change an existing account's password
    #[command]
    ResetPassword {
        /// Account to change
        username: String,
        /// Replacement password
        new_password: String,
    },
    /// Command: approve a queued admin request, creating its account
    #[command]
    ApproveAdminRequest {
        /// Position in the pending queue
        index: usize,
    },
    /// Command: reject and drop a queued admin request
    #[command]
    RejectAdminRequest {
        /// Position in the pending queue
        index: usize,
    },

    // ========== Events ==========
    /// Event: an account was created
    #[event]
    ActorRegistered {
        /// The account as created
        record: ActorRecord,
        /// When it was created
        timestamp: DateTime<Utc>,
    },
    /// Event: an admin request joined the queue
    #[event]
    AdminRequestQueued {
        /// The queued request
        request: AdminRequest,
        /// When it was queued
        timestamp: DateTime<Utc>,
    },
    /// Event: a queued request was approved and its account created
    #[event]
    AdminRequestApproved {
        /// The administrator account as created
        record: ActorRecord,
        /// When it was approved
        timestamp: DateTime<Utc>,
    },
    /// Event: a queued request was rejected
    #[event]
    AdminRequestRejected {
        /// The rejected login name
        username: String,
        /// When it was rejected
        timestamp: DateTime<Utc>,
    },
    /// Event: an account's password changed
    #[event]
    PasswordReset {
        /// The changed account
        actor_id: ActorId,
        /// The new password
        password: String,
        /// When it changed
        timestamp: DateTime<Utc>,
    },
    /// Event: a command failed validation
    #[event]
    ValidationFailed {
        /// What went wrong
        error: String,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the roster aggregate
#[derive(Clone, Copy, Debug, Default)]
pub struct RosterReducer;

impl RosterReducer {
    /// Creates a new roster reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_username(state: &RosterState, username: &str) -> Result<(), String> {
        if username.is_empty() {
            return Err("username cannot be empty".to_string());
        }
        if username.contains('|') {
            return Err("username cannot contain '|'".to_string());
        }
        if state.username_taken(username) {
            return Err(format!("username already in use: {username}"));
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), String> {
        if password.len() < 4 {
            return Err("password must be at least 4 characters".to_string());
        }
        if password.contains('|') {
            return Err("password cannot contain '|'".to_string());
        }
        Ok(())
    }

    fn fail(state: &mut RosterState, error: String) -> SmallVec<[Effect<EngineAction>; 4]> {
        Self::apply_event(state, &RosterAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Processes one roster action against the state
    pub(crate) fn reduce(
        state: &mut RosterState,
        action: RosterAction,
        env: &EngineEnvironment,
    ) -> SmallVec<[Effect<EngineAction>; 4]> {
        match action {
            RosterAction::RegisterActor { username, password, request_admin } => {
                // Validate command
                let username = username.trim().to_string();
                if let Err(error) = Self::validate_username(state, &username) {
                    return Self::fail(state, error);
                }
                if let Err(error) = Self::validate_password(&password) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = if request_admin {
                    RosterAction::AdminRequestQueued {
                        request: AdminRequest { username, password },
                        timestamp: env.clock.now(),
                    }
                } else {
                    RosterAction::ActorRegistered {
                        record: ActorRecord {
                            id: state.next_id(),
                            username,
                            password,
                            tier: Tier::Silver,
                            is_admin: false,
                            total_spent: Money::ZERO,
                        },
                        timestamp: env.clock.now(),
                    }
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            RosterAction::SeedAdmin { username, password } => {
                // Validate command: seeding is idempotent, an existing admin
                // or a taken name makes it a no-op rather than an error
                if state.has_admin() || state.username_taken(&username) {
                    tracing::debug!(%username, "bootstrap admin already present, seed skipped");
                    return SmallVec::new();
                }

                // Create event
                let event = RosterAction::ActorRegistered {
                    record: ActorRecord {
                        id: state.next_id(),
                        username,
                        password,
                        tier: Tier::Silver,
                        is_admin: true,
                        total_spent: Money::ZERO,
                    },
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            RosterAction::ResetPassword { username, new_password } => {
                // Validate command
                let Some(actor_id) = state.actor_by_name(&username).map(|record| record.id) else {
                    return Self::fail(state, format!("no account named {username}"));
                };
                if let Err(error) = Self::validate_password(&new_password) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = RosterAction::PasswordReset {
                    actor_id,
                    password: new_password,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            RosterAction::ApproveAdminRequest { index } => {
                // Validate command
                let Some(request) = state.pending_admins.get(index) else {
                    return Self::fail(state, format!("no pending admin request at {index}"));
                };
                if state.by_name.contains_key(&request.username) {
                    let username = request.username.clone();
                    return Self::fail(
                        state,
                        format!("username already in use: {username}, reject the request"),
                    );
                }

                // Create event
                let event = RosterAction::AdminRequestApproved {
                    record: ActorRecord {
                        id: state.next_id(),
                        username: request.username.clone(),
                        password: request.password.clone(),
                        tier: Tier::Silver,
                        is_admin: true,
                        total_spent: Money::ZERO,
                    },
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            RosterAction::RejectAdminRequest { index } => {
                // Validate command
                let Some(request) = state.pending_admins.get(index) else {
                    return Self::fail(state, format!("no pending admin request at {index}"));
                };

                // Create event
                let event = RosterAction::AdminRequestRejected {
                    username: request.username.clone(),
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            // Events are applied (for replay or external events)
            RosterAction::ActorRegistered { .. }
            | RosterAction::AdminRequestQueued { .. }
            | RosterAction::AdminRequestApproved { .. }
            | RosterAction::AdminRequestRejected { .. }
            | RosterAction::PasswordReset { .. }
            | RosterAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }

    /// Applies an event to the state
    fn apply_event(state: &mut RosterState, action: &RosterAction) {
        match action {
            RosterAction::ActorRegistered { record, .. } => {
                state.last_error = None;
                state.next_id = state.next_id.max(record.id.value() + 1);
                state.index_actor(record.clone());
            },
            RosterAction::AdminRequestQueued { request, .. } => {
                state.last_error = None;
                state.pending_admins.push(request.clone());
            },
            RosterAction::AdminRequestApproved { record, .. } => {
                state.last_error = None;
                state.pending_admins.retain(|request| request.username != record.username);
                state.next_id = state.next_id.max(record.id.value() + 1);
                state.index_actor(record.clone());
            },
            RosterAction::AdminRequestRejected { username, .. } => {
                state.last_error = None;
                state.pending_admins.retain(|request| &request.username != username);
            },
            RosterAction::PasswordReset { actor_id, password, .. } => {
                state.last_error = None;
                if let Some(record) = state.actors.get_mut(actor_id) {
                    record.password.clone_from(password);
                }
            },
            RosterAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            _ => {
                // Commands are not applied to state
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopkeeper_testing::test_clock;

    use super::*;
    use crate::persistence::MemoryLedgerStore;

    fn create_test_env() -> EngineEnvironment {
        EngineEnvironment::new(Arc::new(test_clock()), Arc::new(MemoryLedgerStore::new()))
    }

    fn send(state: &mut RosterState, env: &EngineEnvironment, action: RosterAction) {
        RosterReducer::reduce(state, action, env);
    }

    fn register(state: &mut RosterState, env: &EngineEnvironment, username: &str) {
        send(state, env, RosterAction::RegisterActor {
            username: username.to_string(),
            password: "secret".to_string(),
            request_admin: false,
        });
    }

    #[test]
    fn register_then_authenticate() {
        let env = create_test_env();
        let mut state = RosterState::new();
        register(&mut state, &env, "alice");
        let record = state.authenticate("alice", "secret").unwrap();
        assert_eq!(record.id, ActorId::new(1));
        assert_eq!(record.tier, Tier::Silver);
        assert!(!record.is_admin);
        assert!(state.authenticate("alice", "wrong").is_none());
        assert!(state.authenticate("bob", "secret").is_none());
    }

    #[test]
    fn register_rejects_bad_credentials() {
        let env = create_test_env();
        let mut state = RosterState::new();
        send(&mut state, &env, RosterAction::RegisterActor {
            username: "bob".to_string(),
            password: "abc".to_string(),
            request_admin: false,
        });
        assert!(state.last_error.as_deref().unwrap().contains("at least 4"));
        send(&mut state, &env, RosterAction::RegisterActor {
            username: "a|b".to_string(),
            password: "secret".to_string(),
            request_admin: false,
        });
        assert!(state.last_error.as_deref().unwrap().contains('|'));
        assert_eq!(state.count(), 0);

        register(&mut state, &env, "bob");
        register(&mut state, &env, "bob");
        assert!(state.last_error.as_deref().unwrap().contains("already in use"));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn admin_request_creates_no_account_until_approved() {
        let env = create_test_env();
        let mut state = RosterState::new();
        send(&mut state, &env, RosterAction::RegisterActor {
            username: "root2".to_string(),
            password: "secret".to_string(),
            request_admin: true,
        });
        assert_eq!(state.count(), 0);
        assert_eq!(state.pending_requests().len(), 1);
        assert!(state.authenticate("root2", "secret").is_none());

        send(&mut state, &env, RosterAction::ApproveAdminRequest { index: 0 });
        assert!(state.pending_requests().is_empty());
        let record = state.authenticate("root2", "secret").unwrap();
        assert!(record.is_admin);
        assert_eq!(record.id, ActorId::new(1));
    }

    #[test]
    fn reject_drops_the_request() {
        let env = create_test_env();
        let mut state = RosterState::new();
        send(&mut state, &env, RosterAction::RegisterActor {
            username: "mallory".to_string(),
            password: "secret".to_string(),
            request_admin: true,
        });
        send(&mut state, &env, RosterAction::RejectAdminRequest { index: 0 });
        assert!(state.pending_requests().is_empty());
        assert_eq!(state.count(), 0);

        send(&mut state, &env, RosterAction::ApproveAdminRequest { index: 0 });
        assert!(state.last_error.as_deref().unwrap().contains("no pending"));
    }

    #[test]
    fn queued_username_blocks_registration() {
        let env = create_test_env();
        let mut state = RosterState::new();
        send(&mut state, &env, RosterAction::RegisterActor {
            username: "carol".to_string(),
            password: "secret".to_string(),
            request_admin: true,
        });
        register(&mut state, &env, "carol");
        assert!(state.last_error.as_deref().unwrap().contains("already in use"));
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn seed_admin_is_idempotent() {
        let env = create_test_env();
        let mut state = RosterState::new();
        send(&mut state, &env, RosterAction::SeedAdmin {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        });
        assert!(state.has_admin());
        assert_eq!(state.count(), 1);

        send(&mut state, &env, RosterAction::SeedAdmin {
            username: "admin".to_string(),
            password: "other".to_string(),
        });
        assert_eq!(state.count(), 1);
        assert!(state.authenticate("admin", "admin123").is_some());
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn reset_password_replaces_the_credential() {
        let env = create_test_env();
        let mut state = RosterState::new();
        register(&mut state, &env, "dave");
        send(&mut state, &env, RosterAction::ResetPassword {
            username: "dave".to_string(),
            new_password: "hunter2".to_string(),
        });
        assert!(state.authenticate("dave", "secret").is_none());
        assert!(state.authenticate("dave", "hunter2").is_some());
    }

    #[test]
    fn spend_upgrades_tier_and_never_downgrades() {
        let env = create_test_env();
        let mut state = RosterState::new();
        register(&mut state, &env, "erin");
        let id = ActorId::new(1);

        state.record_spend(id, Money::from_dollars(499));
        assert_eq!(state.actor(id).unwrap().tier, Tier::Silver);

        state.record_spend(id, Money::from_dollars(1));
        assert_eq!(state.actor(id).unwrap().tier, Tier::Gold);

        state.record_spend(id, Money::from_dollars(1500));
        assert_eq!(state.actor(id).unwrap().tier, Tier::Diamond);
        assert_eq!(state.actor(id).unwrap().total_spent, Money::from_dollars(2000));
    }

    #[test]
    fn from_parts_respects_stored_tiers() {
        let record = ActorRecord {
            id: ActorId::new(3),
            username: "frank".to_string(),
            password: "secret".to_string(),
            tier: Tier::Diamond,
            is_admin: false,
            total_spent: Money::from_dollars(100),
        };
        let state = RosterState::from_parts(1, vec![record]);
        assert_eq!(state.next_id(), ActorId::new(4));
        // a stored tier above the spend threshold is kept, never recomputed down
        assert_eq!(state.actor(ActorId::new(3)).unwrap().tier, Tier::Diamond);
    }
}
