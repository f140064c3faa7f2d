// Listener registry - fan-out of events to registered callbacks
use std::sync::{Arc, Mutex, Weak};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Callback<E>)>,
}

pub struct Subscribers<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Subscribers<E> {
    fn clone(&self) -> Self {
        Self { registry: self.registry.clone() }
    }
}

impl<E: 'static> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry { next_id: 0, listeners: Vec::new() })),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// subscription is explicitly unsubscribed or the registry is cleared.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(callback)));

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
                    registry.listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    /// Call every listener once with the same event.
    ///
    /// Listeners are snapshotted first, so a callback may subscribe or
    /// unsubscribe without deadlocking; such changes apply from the next event.
    pub fn notify(&self, event: &E) {
        let listeners: Vec<Callback<E>> = {
            let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).listeners.clear();
    }
}

/// Handle returned by [`Subscribers::subscribe`].
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.remove.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fan_out_and_unsubscribe() {
        let subscribers: Subscribers<u32> = Subscribers::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        let sub_first = subscribers.subscribe(move |v| {
            f.fetch_add(*v as usize, Ordering::SeqCst);
        });
        let s = second.clone();
        let _sub_second = subscribers.subscribe(move |v| {
            s.fetch_add(*v as usize, Ordering::SeqCst);
        });

        subscribers.notify(&2);
        sub_first.unsubscribe();
        subscribers.notify(&5);

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 7);
        assert_eq!(subscribers.len(), 1);
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let subscribers: Subscribers<()> = Subscribers::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let slot_inner = slot.clone();
        let calls_inner = calls.clone();
        let sub = subscribers.subscribe(move |_| {
            calls_inner.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = slot_inner.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        subscribers.notify(&());
        subscribers.notify(&());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscribers.len(), 0);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let subscribers: Subscribers<()> = Subscribers::new();
        let sub = subscribers.subscribe(|_| {});
        drop(subscribers);
        sub.unsubscribe();
    }
}
