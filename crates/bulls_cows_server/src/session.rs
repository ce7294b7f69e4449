//! Game session management.
//!
//! The store keeps one [`Session`] per game id. The map itself sits behind a
//! read-write lock that is only held to look up, insert or evict entries;
//! every session has its own mutex, so guesses on different games never wait
//! on each other while guesses on the same game are applied one at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use bulls_cows::{
    GameState, Guess, GuessError, MAX_ATTEMPTS, RandomSecrets, Score, Secret, SecretSource,
    evaluate,
};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

const SESSION_ID_LEN: usize = 8;

/// Why a guess was refused. No refusal changes the session.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// No session with this id exists (never created, or expired).
    #[display("Game {} not found", _0)]
    NotFound(SessionId),

    /// The session already ended.
    #[display("Game {} is already over ({})", id, state)]
    InvalidState {
        /// Session id.
        id: SessionId,
        /// Terminal state the session is in.
        state: GameState,
    },

    /// The guess is malformed.
    #[display("{}", _0)]
    Validation(GuessError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GuessError> for SessionError {
    fn from(err: GuessError) -> Self {
        Self::Validation(err)
    }
}

/// One game: its secret, progress and timing.
#[derive(Debug)]
struct Session {
    id: SessionId,
    secret: Secret,
    attempts: u32,
    state: GameState,
    created_at: DateTime<Utc>,
    started: Instant,
    last_activity: Instant,
    elapsed_seconds: Option<u64>,
}

impl Session {
    fn new(id: SessionId, secret: Secret) -> Self {
        let now = Instant::now();
        Self {
            id,
            secret,
            attempts: 0,
            state: GameState::Active,
            created_at: Utc::now(),
            started: now,
            last_activity: now,
            elapsed_seconds: None,
        }
    }

    /// Applies one guess. All checks run before anything is mutated.
    fn guess(&mut self, input: &str) -> Result<GuessOutcome, SessionError> {
        if self.state.is_finished() {
            return Err(SessionError::InvalidState {
                id: self.id.clone(),
                state: self.state,
            });
        }
        let guess = Guess::parse(input)?;

        self.attempts += 1;
        let score = evaluate(self.secret.digits(), guess.digits());
        self.state = self.state.after_guess(score, self.attempts);
        self.last_activity = Instant::now();
        if self.state == GameState::Won {
            self.elapsed_seconds = Some(self.started.elapsed().as_secs());
        }

        Ok(GuessOutcome {
            score,
            attempts: self.attempts,
            is_correct: score.is_exact(),
            state: self.state,
            elapsed_seconds: self.elapsed_seconds,
        })
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            attempts: self.attempts,
            remaining: MAX_ATTEMPTS.saturating_sub(self.attempts),
            state: self.state,
            created_at: self.created_at,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}

/// What an accepted guess produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct GuessOutcome {
    /// A/B score of the guess.
    score: Score,
    /// Attempts used, including this guess.
    attempts: u32,
    /// True if the guess matched the secret.
    is_correct: bool,
    /// State after this guess.
    state: GameState,
    /// Whole seconds from creation to the win, if this guess won.
    elapsed_seconds: Option<u64>,
}

/// Read-only view of a session. Never exposes the secret.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionSnapshot {
    /// Session id.
    id: SessionId,
    /// Attempts used so far.
    attempts: u32,
    /// Attempts left before the game is lost.
    remaining: u32,
    /// Current state.
    state: GameState,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// Whole seconds to the win, once won.
    elapsed_seconds: Option<u64>,
}

type SharedSession = Arc<Mutex<Session>>;

fn lock_session(session: &SharedSession) -> MutexGuard<'_, Session> {
    // Sessions are validated before they are mutated, so a poisoned lock
    // still guards a consistent session.
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manages all game sessions.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SharedSession>>>,
    secrets: Arc<dyn SecretSource>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionStore {
    /// Creates a store with random secrets. Sessions idle for `ttl` are
    /// removed by [`SessionStore::sweep_expired`].
    #[instrument]
    pub fn new(ttl: Duration) -> Self {
        Self::with_secrets(ttl, RandomSecrets)
    }

    /// Creates a store drawing secrets from `secrets`.
    #[instrument(skip(secrets))]
    pub fn with_secrets(ttl: Duration, secrets: impl SecretSource + 'static) -> Self {
        info!(?ttl, "Creating session store");
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            secrets: Arc::new(secrets),
            ttl,
        }
    }

    /// Starts a new game and returns its id.
    #[instrument(skip(self))]
    pub fn create_session(&self) -> SessionId {
        let secret = self.secrets.next_secret();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let mut rng = rand::thread_rng();
        let id = loop {
            let candidate: String = (0..SESSION_ID_LEN)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            debug!(session_id = %candidate, "Session id collision, drawing again");
        };

        let session = Session::new(id.clone(), secret);
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));

        info!(session_id = %id, live = sessions.len(), "Created new session");
        id
    }

    fn get(&self, id: &str) -> Result<SharedSession, SessionError> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            SessionError::NotFound(id.to_string())
        })
    }

    /// Submits a guess such as `"0123"` to the game `id`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if no such game exists.
    /// - [`SessionError::InvalidState`] if the game is already won or lost.
    /// - [`SessionError::Validation`] if the guess is not four distinct digits.
    ///
    /// On error neither the attempt count nor the state changes.
    #[instrument(skip(self, guess), fields(session_id = %id))]
    pub fn submit_guess(&self, id: &str, guess: &str) -> Result<GuessOutcome, SessionError> {
        let session = self.get(id)?;
        let mut session = lock_session(&session);

        let outcome = session.guess(guess).inspect_err(|e| {
            warn!(error = %e, "Guess rejected");
        })?;

        info!(
            score = %outcome.score,
            attempts = outcome.attempts,
            state = %outcome.state,
            "Guess accepted"
        );
        Ok(outcome)
    }

    /// Returns a view of the game `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no such game exists.
    #[instrument(skip(self))]
    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.get(id)?;
        let session = lock_session(&session);
        Ok(session.snapshot())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Idle time after which a session is swept.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Removes every session idle for at least the TTL, whatever its state.
    /// Returns the number removed.
    #[instrument(skip(self))]
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| {
            let session = lock_session(session);
            now.saturating_duration_since(session.last_activity) < self.ttl
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, live = sessions.len(), "Expired sessions swept");
        } else {
            debug!(live = sessions.len(), "No expired sessions");
        }
        removed
    }
}

/// Runs [`SessionStore::sweep_expired`] every `interval` until aborted.
pub fn spawn_sweeper(store: SessionStore, interval: Duration) -> tokio::task::JoinHandle<()> {
    info!(?interval, ttl = ?store.ttl(), "Starting session sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.sweep_expired();
        }
    })
}
