//! Typed callback channels shared by the sub-controls and the backend
//!
//! Each channel carries one payload type. Subscribing returns a
//! [`Subscription`]; dropping it removes the callback, which ties a
//! listener's lifetime to the component that registered it.
//! Everything here runs on the UI thread, hence `Rc` and `RefCell`.

use crate::types::{Quality, SpeedLabel};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::trace;

type Callback<T> = Rc<dyn Fn(&T)>;

struct ChannelInner<T> {
    name: &'static str,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// Named, ordered list of callbacks for one payload type
pub struct Channel<T> {
    inner: Rc<RefCell<ChannelInner<T>>>,
}

impl<T: 'static> Channel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                name,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.borrow().name
    }

    /// Append a callback; it stays registered while the guard is alive
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::new(callback)));
            id
        };

        let channel: Weak<RefCell<ChannelInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = channel.upgrade() {
                    inner.borrow_mut().subscribers.retain(|(sub_id, _)| *sub_id != id);
                }
            })),
        }
    }

    /// Invoke every callback in registration order, returning how many ran.
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe
    /// or publish re-entrantly.
    pub fn publish(&self, payload: &T) -> usize {
        let (name, callbacks): (&'static str, Vec<Callback<T>>) = {
            let inner = self.inner.borrow();
            (inner.name, inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect())
        };

        trace!(channel = name, subscribers = callbacks.len(), "Publishing");
        for callback in &callbacks {
            callback(payload);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Channel")
            .field("name", &inner.name)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Registration guard returned by [`Channel::subscribe`]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback registered for the lifetime of the channel
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    /// Remove the callback now
    pub fn cancel(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Channels between the sub-controls and the playback backend adapter
#[derive(Clone, Debug)]
pub struct CallbackRegistry {
    /// Backend → controls: the backend detected a quality change
    pub on_playback_quality_change: Channel<Quality>,
    /// Controls → backend: the user asked for a different quality
    pub toggle_quality: Channel<Quality>,
    /// Controls → backend: new volume, 0..=100
    pub volume_change: Channel<u8>,
    /// Controls → backend: new playback speed
    pub speed_change: Channel<SpeedLabel>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            on_playback_quality_change: Channel::new("video_player.on_playback_quality_change"),
            toggle_quality: Channel::new("video_quality_control.toggle_quality"),
            volume_change: Channel::new("video_volume_control.volume_change"),
            speed_change: Channel::new("video_speed_control.speed_change"),
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_publish_in_registration_order() {
        let channel: Channel<u8> = Channel::new("test");
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = Rc::clone(&log);
            channel.subscribe(move |v| log.borrow_mut().push(("first", *v)))
        };
        let second = {
            let log = Rc::clone(&log);
            channel.subscribe(move |v| log.borrow_mut().push(("second", *v)))
        };

        assert_eq!(channel.publish(&7), 2);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
        drop((first, second));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel: Channel<u8> = Channel::new("test");
        let hits = Rc::new(Cell::new(0));

        let sub = {
            let hits = Rc::clone(&hits);
            channel.subscribe(move |_| hits.set(hits.get() + 1))
        };
        channel.publish(&1);
        drop(sub);
        channel.publish(&2);

        assert_eq!(hits.get(), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_detach_keeps_callback() {
        let channel: Channel<u8> = Channel::new("test");
        let hits = Rc::new(Cell::new(0));

        {
            let hits = Rc::clone(&hits);
            channel.subscribe(move |_| hits.set(hits.get() + 1)).detach();
        }
        channel.publish(&1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_reentrant_publish() {
        let outer: Channel<u8> = Channel::new("outer");
        let inner: Channel<u8> = Channel::new("inner");
        let seen = Rc::new(Cell::new(0u8));

        let _relay = {
            let inner = inner.clone();
            outer.subscribe(move |v| {
                inner.publish(&(v + 1));
            })
        };
        let _sink = {
            let seen = Rc::clone(&seen);
            inner.subscribe(move |v| seen.set(*v))
        };

        outer.publish(&4);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_subscription_outliving_channel() {
        let channel: Channel<u8> = Channel::new("test");
        let sub = channel.subscribe(|_| {});
        drop(channel);
        drop(sub);
    }

    #[test]
    fn test_registry_channel_names() {
        let registry = CallbackRegistry::new();
        assert_eq!(
            registry.on_playback_quality_change.name(),
            "video_player.on_playback_quality_change"
        );
        assert_eq!(registry.toggle_quality.name(), "video_quality_control.toggle_quality");
    }
}
