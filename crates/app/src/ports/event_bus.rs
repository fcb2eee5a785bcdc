//! Event bus port — publish edit-session notifications.

use std::future::Future;

use ruledesk_domain::error::RuledeskError;
use ruledesk_domain::event::Event;

/// Publishes rule events to interested subscribers (e.g. a save button).
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RuledeskError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RuledeskError>> + Send {
        (**self).publish(event)
    }
}
