//! Typed synchronous publish/subscribe.
//!
//! `subscribe` hands back a token; `publish` calls every current subscriber
//! in registration order before returning. Nothing is buffered for
//! subscribers that register later.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

pub struct EventBus<E> {
    next_token: u64,
    subscribers: Vec<(SubscriptionToken, Handler<E>)>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_token: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.subscribers.push((token, Box::new(handler)));
        token
    }

    /// Returns `false` if the token was not (or no longer) registered.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(t, _)| *t != token);
        self.subscribers.len() != before
    }

    /// Delivers `event` to all subscribers; returns how many were called.
    pub fn publish(&self, event: &E) -> usize {
        for (_, handler) in &self.subscribers {
            handler(event);
        }
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
