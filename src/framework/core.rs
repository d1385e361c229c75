//! # Core Store Framework
//!
//! This module defines the generic building blocks shared by both services.
//!
//! ## Key Types
//!
//! - [`StoreEntity`]: The trait that all stored record types must implement.
//! - [`StoreActor`]: The generic single-writer actor that owns a record map.
//! - [`StoreClient`]: The generic client for talking to a store actor.
//! - [`StoreError`]: Common errors (e.g., ActorClosed, NotFound).

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any record type must implement to be managed by a [`StoreActor`].
///
/// # Architecture Note
/// By defining a contract (`StoreEntity`) that both our record types (Order,
/// Transaction) satisfy, we write the store loop *once* and reuse it for both
/// services. The associated `Update` type is a per-field mutation: each variant
/// touches exactly one field, and the store actor applies it inside its own
/// task. That makes every read-modify-write sequence for a store atomic with
/// respect to every other one, so concurrent updates against the same record
/// can never tear or silently overwrite each other.
///
/// Records with no post-insert mutations (like payment transactions) use
/// `Update = ()` and a no-op `apply`.
pub trait StoreEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this record (e.g., String, Uuid).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// A per-field mutation applied by the store actor.
    type Update: Send + Sync + Debug;

    /// Returns the identifier this record is keyed under.
    fn id(&self) -> &Self::Id;

    /// Applies a single mutation to this record.
    fn apply(&mut self, update: Self::Update);
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the store framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Type alias for the one-shot response channel used by store actors.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Outcome of a [`StoreRequest::Insert`].
///
/// `Existing` is returned when the insert carried an alias that was already
/// registered; the record previously stored under that alias comes back
/// instead of a duplicate being created.
#[derive(Debug)]
pub enum InsertOutcome<T> {
    Inserted,
    Existing(T),
}

/// Internal message type sent to a store actor.
///
/// The variants are deliberately narrower than full CRUD: records in this
/// system are never deleted (they live for the process lifetime), and
/// mutations go through the typed `Update` so the actor, not the caller,
/// performs the read-modify-write.
#[derive(Debug)]
pub enum StoreRequest<T: StoreEntity> {
    /// Insert a record, optionally registering an alias (e.g., an
    /// idempotency key) that maps back to the record's id. An insert whose
    /// alias is already registered returns the existing record untouched.
    Insert {
        entity: T,
        alias: Option<String>,
        respond_to: Response<InsertOutcome<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    /// Apply a per-field mutation and return the updated record.
    Apply {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
}

// =============================================================================
// 3. THE GENERIC STORE ACTOR
// =============================================================================

/// The generic single-writer actor that owns a map of records.
///
/// # Concurrency Model
/// Each store runs in its own task and processes messages *sequentially*,
/// so the record map needs no `Mutex` or `RwLock`. Service handlers run
/// concurrently in their worker pools, but every mutation they request is
/// serialized through this single writer. This is what keeps a payment
/// callback racing a direct status update from losing either write: the two
/// `Apply` messages land one after the other, and each touches only its own
/// field.
pub struct StoreActor<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: HashMap<T::Id, T>,
    aliases: HashMap<String, T::Id>,
}

impl<T: StoreEntity> StoreActor<T> {
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: HashMap::new(),
            aliases: HashMap::new(),
        };
        let client = StoreClient::new(sender);
        (actor, client)
    }

    /// Runs the store's event loop, processing messages until the channel
    /// closes (i.e., until every [`StoreClient`] has been dropped).
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Order" instead of "delivery_core::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { entity, alias, respond_to } => {
                    let id = entity.id().clone();
                    debug!(entity_type, %id, ?alias, "Insert");

                    if let Some(existing) = alias.as_deref().and_then(|a| self.lookup_alias(a)) {
                        info!(entity_type, %id, "Alias already registered, returning existing record");
                        let _ = respond_to.send(Ok(InsertOutcome::Existing(existing)));
                        continue;
                    }
                    if let Some(alias) = alias {
                        self.aliases.insert(alias, id.clone());
                    }
                    self.records.insert(id.clone(), entity);
                    info!(entity_type, %id, size = self.records.len(), "Inserted");
                    let _ = respond_to.send(Ok(InsertOutcome::Inserted));
                }
                StoreRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    let found = record.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::Apply { id, update, respond_to } => {
                    debug!(entity_type, %id, ?update, "Apply");
                    if let Some(record) = self.records.get_mut(&id) {
                        record.apply(update);
                        info!(entity_type, %id, "Updated");
                        let _ = respond_to.send(Ok(record.clone()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, size = self.records.len(), "Store shutdown");
    }

    fn lookup_alias(&self, alias: &str) -> Option<T> {
        let id = self.aliases.get(alias)?;
        self.records.get(id).cloned()
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a [`StoreActor`].
#[derive(Clone)]
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn insert(
        &self,
        entity: T,
        alias: Option<String>,
    ) -> Result<InsertOutcome<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { entity, alias, respond_to })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get { id, respond_to })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn apply(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Apply { id, update, respond_to })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Minimal record definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: String,
        subject: String,
        resolved: bool,
    }

    #[derive(Debug)]
    enum TicketUpdate {
        Resolve,
        Retitle(String),
    }

    impl StoreEntity for Ticket {
        type Id = String;
        type Update = TicketUpdate;

        fn id(&self) -> &String {
            &self.id
        }

        fn apply(&mut self, update: TicketUpdate) {
            match update {
                TicketUpdate::Resolve => self.resolved = true,
                TicketUpdate::Retitle(subject) => self.subject = subject,
            }
        }
    }

    fn ticket(id: &str, subject: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            subject: subject.to_string(),
            resolved: false,
        }
    }

    #[tokio::test]
    async fn test_insert_get_apply() {
        let (actor, client) = StoreActor::<Ticket>::new(10);
        let handle = tokio::spawn(actor.run());

        // Insert
        let outcome = client.insert(ticket("t1", "broken oven"), None).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted));

        // Get
        let fetched = client.get("t1".to_string()).await.unwrap().unwrap();
        assert_eq!(fetched.subject, "broken oven");
        assert!(!fetched.resolved);

        // Apply returns the updated record
        let updated = client
            .apply("t1".to_string(), TicketUpdate::Resolve)
            .await
            .unwrap();
        assert!(updated.resolved);

        // Each update touches only its own field
        let updated = client
            .apply("t1".to_string(), TicketUpdate::Retitle("fixed oven".into()))
            .await
            .unwrap();
        assert_eq!(updated.subject, "fixed oven");
        assert!(updated.resolved);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_unknown_id_is_not_found() {
        let (actor, client) = StoreActor::<Ticket>::new(10);
        tokio::spawn(actor.run());

        let result = client.apply("missing".to_string(), TicketUpdate::Resolve).await;
        assert_eq!(result, Err(StoreError::NotFound("missing".to_string())));

        let fetched = client.get("missing".to_string()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_insert_with_seen_alias_returns_existing() {
        let (actor, client) = StoreActor::<Ticket>::new(10);
        tokio::spawn(actor.run());

        let outcome = client
            .insert(ticket("t1", "first"), Some("key-1".to_string()))
            .await
            .unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted));

        // Same alias: the original record comes back, the new one is discarded.
        let outcome = client
            .insert(ticket("t2", "second"), Some("key-1".to_string()))
            .await
            .unwrap();
        match outcome {
            InsertOutcome::Existing(existing) => assert_eq!(existing.id, "t1"),
            other => panic!("expected Existing, got {:?}", other),
        }

        // The duplicate was never stored.
        assert!(client.get("t2".to_string()).await.unwrap().is_none());
    }
}
