//! Change notification registry.
//!
//! Subscribers register for one title or for everything. Title subscribers run
//! whenever their title is notified; wildcard subscribers only run for blanket
//! notifications (deletes and `notify_all`).

use crate::store::TiddlerStore;

/// What a subscriber listens to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    Title(String),
    All,
}

/// Opaque handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Delivered to subscribers after a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Title that changed; `None` for `notify_all`
    pub title: Option<String>,
    pub blanket: bool,
}

pub type ChangeCallback = Box<dyn FnMut(&TiddlerStore, &ChangeNotice)>;

struct Entry {
    handle: SubscriptionHandle,
    subscription: Subscription,
    callback: ChangeCallback,
}

#[derive(Default)]
pub(crate) struct Registry {
    next_handle: u64,
    entries: Vec<Entry>,
}

impl Registry {
    pub(crate) fn add(&mut self, subscription: Subscription, callback: ChangeCallback) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            subscription,
            callback,
        });
        handle
    }

    pub(crate) fn remove(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Run every matching callback in subscription order
    pub(crate) fn dispatch(&mut self, store: &TiddlerStore, notice: &ChangeNotice) -> usize {
        let mut fired = 0;
        for entry in &mut self.entries {
            let matches = match (&entry.subscription, &notice.title) {
                (Subscription::All, _) => notice.blanket,
                (Subscription::Title(_), None) => true,
                (Subscription::Title(name), Some(title)) => name == title,
            };
            if matches {
                (entry.callback)(store, notice);
                fired += 1;
            }
        }
        fired
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("subscribers", &format!("{} subscribers", self.entries.len()))
            .finish()
    }
}
