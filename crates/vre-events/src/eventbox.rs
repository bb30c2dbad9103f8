use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Condvar, Mutex};

/// A coalescing, wake-on-write mailbox: `put` replaces any prior payload for
/// the same kind and wakes the single waiter; `wait` blocks until at least
/// one kind is present, then hands the whole map to a callback run under the
/// lock so the callback can drain it atomically.
///
/// This is the condition-variable mailbox the whole pipeline is dispatched
/// through (the "main box", `EventBox<EventKind, EventPayload>`), and the
/// same primitive the Engine reuses for its own wake-ups with a private,
/// much smaller vocabulary (the "local box"). A classic bounded/unbounded
/// channel would instead backlog floods of `SearchProgress`/`ReadNew`
/// behind a slow consumer; coalescing on kind is what lets a consumer catch
/// up without processing stale intermediate state.
///
/// Consumers must not `put` on the *same* box from within a `wait` callback
/// (the lock is already held, so this deadlocks); putting to a *different*
/// box from inside the callback is fine.
pub struct EventBox<K, V> {
    inner: Mutex<HashMap<K, V>>,
    cond: Condvar,
}

impl<K, V> Default for EventBox<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> EventBox<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            cond: Condvar::new(),
        }
    }

    /// Store `payload` under `kind`, replacing any value already there, and
    /// wake the waiter.
    pub fn put(&self, kind: K, payload: V) {
        let mut events = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        events.insert(kind, payload);
        self.cond.notify_one();
    }

    /// Block until at least one event is pending, then invoke `callback`
    /// with the full map while still holding the lock. The callback is
    /// expected to drain what it consumes itself (typically by calling
    /// `events.clear()` at the end).
    pub fn wait<R>(&self, callback: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let mut events = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        while events.is_empty() {
            events = self.cond.wait(events).unwrap_or_else(|e| e.into_inner());
        }
        callback(&mut events)
    }

    /// Empty the mailbox. Typically called from inside a `wait` callback
    /// after the events have been consumed.
    pub fn clear(&self) {
        let mut events = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventPayload};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    type TestBox = EventBox<EventKind, EventPayload>;

    #[test]
    fn put_twice_coalesces_to_latest() {
        let eb = TestBox::new();
        eb.put(EventKind::ReadNew, EventPayload::Text("first".into()));
        eb.put(EventKind::ReadNew, EventPayload::Text("second".into()));

        eb.wait(|events| {
            assert_eq!(events.len(), 1);
            match events.get(&EventKind::ReadNew) {
                Some(EventPayload::Text(t)) => assert_eq!(t, "second"),
                other => panic!("unexpected payload: {other:?}"),
            }
            events.clear();
        });
    }

    #[test]
    fn distinct_kinds_are_visible_together() {
        let eb = TestBox::new();
        eb.put(EventKind::ReadNew, EventPayload::None);
        eb.put(EventKind::Quit, EventPayload::None);

        eb.wait(|events| {
            assert_eq!(events.len(), 2);
            assert!(events.contains_key(&EventKind::ReadNew));
            assert!(events.contains_key(&EventKind::Quit));
            events.clear();
        });
    }

    #[test]
    fn wait_blocks_until_put_from_another_thread() {
        let eb = Arc::new(TestBox::new());
        let eb2 = eb.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            eb2.put(EventKind::Quit, EventPayload::None);
        });

        eb.wait(|events| {
            assert!(events.contains_key(&EventKind::Quit));
            events.clear();
        });
        handle.join().unwrap();
    }

    #[test]
    fn clear_empties_the_mailbox() {
        let eb = TestBox::new();
        eb.put(EventKind::ReadDone, EventPayload::None);
        eb.clear();
        // A second put should be the only thing waiting now.
        eb.put(EventKind::ReadNew, EventPayload::None);
        eb.wait(|events| {
            assert_eq!(events.len(), 1);
            assert!(events.contains_key(&EventKind::ReadNew));
            events.clear();
        });
    }
}
