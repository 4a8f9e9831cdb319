use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{ReentrantMutex, RwLock};
use thiserror::Error;

use crate::schema::{EntityType, Schema};

use super::batch::ChangeBatch;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Entity type '{entity}' is not registered with the change broker")]
    UnknownEntity { entity: EntityType },
}

/// Subscriber callback, invoked synchronously inside `publish`.
pub type ChangeCallback = Arc<dyn Fn(&ChangeBatch) + Send + Sync>;

/// Shared handle to the per-entity mailboxes.
///
/// Cloning is cheap; every clone talks to the same mailboxes.
#[derive(Clone, Default)]
pub struct ChangeBroker {
    inner: Arc<BrokerInner>,
}

#[derive(Default)]
struct BrokerInner {
    channels: RwLock<HashMap<EntityType, Arc<Channel>>>,
    next_subscriber: AtomicU64,
}

#[derive(Default)]
struct Channel {
    /// Reentrant so a subscriber may read the mailbox while being notified.
    mailbox: ReentrantMutex<RefCell<ChangeBatch>>,
    subscribers: RwLock<Vec<(u64, ChangeCallback)>>,
}

impl ChangeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broker with a mailbox for every entity in `schema`.
    pub fn for_schema(schema: &Schema) -> Self {
        let broker = Self::new();
        for entity in schema.entity_types() {
            broker.register(entity.clone());
        }
        broker
    }

    /// Open a mailbox for `entity`. Registering twice keeps the existing one.
    pub fn register(&self, entity: EntityType) {
        self.inner.channels.write().entry(entity).or_default();
    }

    fn channel(&self, entity: &EntityType) -> Result<Arc<Channel>, BrokerError> {
        self.inner
            .channels
            .read()
            .get(entity)
            .cloned()
            .ok_or_else(|| BrokerError::UnknownEntity {
                entity: entity.clone(),
            })
    }

    /// Deliver `batch` to every subscriber of `entity`, then drain it again.
    ///
    /// Append, notify and drain run under the entity's mailbox lock, so no
    /// other publish to the same entity interleaves. Subscribers must not
    /// publish to the same entity from inside their callback.
    pub fn publish(&self, entity: &EntityType, batch: ChangeBatch) -> Result<(), BrokerError> {
        let channel = self.channel(entity)?;
        let guard = channel.mailbox.lock();

        let marks = guard.borrow_mut().append(&batch);
        let subscribers: Vec<ChangeCallback> = channel
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        tracing::trace!(
            entity = %entity,
            create = batch.create.len(),
            update = batch.update.len(),
            remove = batch.remove.len(),
            subscribers = subscribers.len(),
            "Change batch published"
        );

        for callback in &subscribers {
            callback(&batch);
        }

        guard.borrow_mut().truncate(marks);
        Ok(())
    }

    /// Register `callback` for every publish on `entity`.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe(
        &self,
        entity: &EntityType,
        callback: ChangeCallback,
    ) -> Result<Subscription, BrokerError> {
        let channel = self.channel(entity)?;
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        channel.subscribers.write().push((id, callback));

        Ok(Subscription {
            broker: Arc::downgrade(&self.inner),
            entity: entity.clone(),
            id,
        })
    }

    /// Current mailbox content for `entity`.
    pub fn mailbox(&self, entity: &EntityType) -> Result<ChangeBatch, BrokerError> {
        let channel = self.channel(entity)?;
        let guard = channel.mailbox.lock();
        let snapshot = guard.borrow().clone();
        Ok(snapshot)
    }

    pub fn subscriber_count(&self, entity: &EntityType) -> Result<usize, BrokerError> {
        Ok(self.channel(entity)?.subscribers.read().len())
    }
}

/// Keeps a broker callback registered; unsubscribes on drop.
pub struct Subscription {
    broker: Weak<BrokerInner>,
    entity: EntityType,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.broker.upgrade() else {
            return;
        };
        let channel = inner.channels.read().get(&self.entity).cloned();
        if let Some(channel) = channel {
            channel.subscribers.write().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn broker() -> ChangeBroker {
        let broker = ChangeBroker::new();
        broker.register("book".into());
        broker
    }

    #[test]
    fn publish_unknown_entity_is_rejected() {
        let result = broker().publish(&"shelf".into(), ChangeBatch::created([1]));
        assert_eq!(
            result,
            Err(BrokerError::UnknownEntity {
                entity: "shelf".into()
            })
        );
    }

    #[test]
    fn subscriber_sees_mailbox_during_pulse_only() {
        let broker = broker();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let probe = broker.clone();
        let sink = Arc::clone(&seen);
        let _sub = broker
            .subscribe(
                &"book".into(),
                Arc::new(move |_| {
                    sink.lock().push(probe.mailbox(&"book".into()).unwrap());
                }),
            )
            .unwrap();

        broker
            .publish(&"book".into(), ChangeBatch::created([5]))
            .unwrap();

        assert_eq!(*seen.lock(), vec![ChangeBatch::created([5])]);
        assert!(broker.mailbox(&"book".into()).unwrap().is_empty());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let broker = broker();
        let sub = broker
            .subscribe(&"book".into(), Arc::new(|_| {}))
            .unwrap();
        assert_eq!(broker.subscriber_count(&"book".into()), Ok(1));

        drop(sub);
        assert_eq!(broker.subscriber_count(&"book".into()), Ok(0));
    }

    #[test]
    fn for_schema_registers_every_entity() {
        use crate::schema::EntityDef;

        let schema = Schema::new()
            .with_entity(EntityDef::new("book"))
            .with_entity(EntityDef::new("author"));
        let broker = ChangeBroker::for_schema(&schema);
        assert!(broker.mailbox(&"author".into()).is_ok());
        assert!(broker.mailbox(&"book".into()).is_ok());
    }
}
