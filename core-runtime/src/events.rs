//! # Event Bus System
//!
//! Typed notifications between core modules over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps the per-domain enums ([`AuthEvent`],
//!   [`FilterEvent`])
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Receiver wrapper with predicate filtering
//!
//! ```text
//! ┌──────────────┐   notify   ┌───────────┐   subscribe   ┌────────────┐
//! │ Account mgr  ├───────────>│           ├──────────────>│ Subscriber │
//! └──────────────┘            │ EventBus  │               └────────────┘
//! ┌──────────────┐   notify   │           │   subscribe   ┌────────────┐
//! │ Filter sync  ├───────────>│           ├──────────────>│ Subscriber │
//! └──────────────┘            └───────────┘               └────────────┘
//! ```
//!
//! ## Filter sync notifications
//!
//! Every store operation run through the sync service produces a
//! `Requested` event followed by exactly one `Completed` or `Failed` event,
//! each tagged with its [`SyncOperation`]. Observers interested in a single
//! kind of operation narrow the stream instead of inspecting every event:
//!
//! ```rust
//! use core_runtime::events::{EventBus, SyncOperation};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut deletes = bus.stream().operation(SyncOperation::Delete);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and may keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Account lifecycle
    Auth(AuthEvent),
    /// Filter store operations
    Filter(FilterEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Filter(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Filter(FilterEvent::Failed { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(_) => EventSeverity::Info,
            CoreEvent::Filter(FilterEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Filter(FilterEvent::Requested { .. }) => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Account lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A new account was registered and its user record stored.
    SignedUp { user_id: String },
    /// A user signed in.
    SignedIn {
        user_id: String,
        /// `"password"` or the social provider name.
        method: String,
    },
    /// The current user signed out.
    SignedOut { user_id: String },
    /// Account and user record were removed.
    AccountDeleted { user_id: String },
    /// An account operation failed.
    AuthError {
        user_id: Option<String>,
        message: String,
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SignedUp { .. } => "Account created",
            AuthEvent::SignedIn { .. } => "User signed in",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::AccountDeleted { .. } => "Account deleted",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Filter Events
// ============================================================================

/// Store operation a sync result originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub const ALL: [SyncOperation; 5] = [
        SyncOperation::FetchAll,
        SyncOperation::FetchOne,
        SyncOperation::Create,
        SyncOperation::Update,
        SyncOperation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::FetchAll => "fetch_all",
            SyncOperation::FetchOne => "fetch_one",
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }

    /// Whether the operation changes the store
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            SyncOperation::Create | SyncOperation::Update | SyncOperation::Delete
        )
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a single filter store operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FilterEvent {
    /// Operation handed to the store.
    Requested {
        operation: SyncOperation,
        /// Target filter; `None` for owner-wide fetches.
        filter_id: Option<String>,
    },
    /// Operation finished successfully.
    Completed {
        operation: SyncOperation,
        filter_id: Option<String>,
        /// Number of filters in the payload (0 for delete).
        count: usize,
    },
    /// Operation failed; nothing is retried.
    Failed {
        operation: SyncOperation,
        filter_id: Option<String>,
        message: String,
    },
}

impl FilterEvent {
    pub fn operation(&self) -> SyncOperation {
        match self {
            FilterEvent::Requested { operation, .. }
            | FilterEvent::Completed { operation, .. }
            | FilterEvent::Failed { operation, .. } => *operation,
        }
    }

    /// `true` for `Completed` and `Failed`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FilterEvent::Requested { .. })
    }

    fn description(&self) -> &str {
        match self {
            FilterEvent::Requested { .. } => "Filter operation requested",
            FilterEvent::Completed { .. } => "Filter operation completed",
            FilterEvent::Failed { .. } => "Filter operation failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Publishes an event, treating "nobody is listening" as delivery to
    /// zero subscribers.
    pub fn notify(&self, event: CoreEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new raw subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Creates a new [`EventStream`] subscriber.
    pub fn stream(&self) -> EventStream {
        EventStream::new(self.subscribe())
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
///
/// Dropping the stream ends the subscription.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only deliver events matching `predicate`. Replaces any earlier filter.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only deliver filter events produced by `operation`.
    pub fn operation(self, operation: SyncOperation) -> Self {
        self.filter(move |event| {
            matches!(event, CoreEvent::Filter(e) if e.operation() == operation)
        })
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |f| f(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive; `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
