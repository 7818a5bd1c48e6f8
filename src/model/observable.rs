//! Single-threaded observable values and event channels.
//!
//! [`Observable`] holds a current value and notifies subscribers on every
//! `set`, including sets to an equal value: each call is an event. Callbacks are
//! stored as `Weak` pointers and pruned lazily; the strong side lives in the
//! [`Subscription`] returned to the caller, so dropping it unsubscribes.
//!
//! [`EventEmitter`] is the same mechanism without a current value, used for the
//! form builder's outward events.
//!
//! Subscribers are notified in registration order. No borrow is held while a
//! callback runs, so callbacks may read or set the observable they listen to.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

/// RAII guard for a subscription. Dropping it removes the callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

struct Subscribers<T> {
    callbacks: Vec<Weak<Callback<T>>>,
}

impl<T: 'static> Subscribers<T> {
    fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    fn add(&mut self, f: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(f);
        self.callbacks.push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Live callbacks, pruning the dead ones.
    fn live(&mut self) -> Vec<Rc<Callback<T>>> {
        self.callbacks.retain(|w| w.strong_count() > 0);
        self.callbacks.iter().filter_map(Weak::upgrade).collect()
    }

    fn count(&self) -> usize {
        self.callbacks.iter().filter(|w| w.strong_count() > 0).count()
    }
}

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Subscribers<T>,
}

/// Shared current value with change notification.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Subscribers::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.set_silent(value);
        self.notify();
    }

    /// Replace the value without notifying anyone.
    pub fn set_silent(&self, value: T) {
        let mut inner = self.inner.borrow_mut();
        inner.value = value;
        inner.version += 1;
    }

    /// Deliver the current value to every subscriber.
    pub fn notify(&self) {
        let (value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let callbacks = inner.subscribers.live();
            (inner.value.clone(), callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.inner.borrow_mut().subscribers.add(f)
    }

    /// Number of writes so far.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.count()
    }
}

/// Outward event channel without a retained value.
pub struct EventEmitter<T> {
    subscribers: Rc<RefCell<Subscribers<T>>>,
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T> fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter").finish()
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers::new())),
        }
    }

    pub fn emit(&self, event: &T) {
        let callbacks = self.subscribers.borrow_mut().live();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.subscribers.borrow_mut().add(f)
    }

    /// Live subscriber count; non-zero means somebody listens.
    pub fn observer_count(&self) -> usize {
        self.subscribers.borrow().count()
    }
}
