//! Change notification for organizer state.
//!
//! Consumers subscribe with [`Listener::new`] and keep the returned handle
//! alive for as long as they want to be notified. Lists only hold weak
//! references, so dropping the handle unsubscribes; the stale entry is
//! swept on the next dispatch.

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Weak,
    },
};

use crossbeam_skiplist::SkipSet;

use crate::hierarchy::HierarchyEntry;
use crate::navigation::{PathSegment, ViewMode};

/// Marker for values that can be dispatched to listeners.
pub trait Event: fmt::Debug + Send + Sync {}

type Callback<E> = dyn Fn(&E) + Send + Sync;

struct ListenerEntry<E: Event> {
    callback: Weak<Callback<E>>,
    order: usize,
}

// Entries are ordered (and compared) by registration order only.
impl<E: Event> Eq for ListenerEntry<E> {}

impl<E: Event> PartialEq for ListenerEntry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<E: Event> Ord for ListenerEntry<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order.cmp(&other.order)
    }
}

impl<E: Event> PartialOrd for ListenerEntry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

static LISTENER_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Listeners for one event type, called in registration order.
pub struct ListenerList<E: Event> {
    inner: SkipSet<ListenerEntry<E>>,
}

impl<E: Event + 'static> ListenerList<E> {
    pub fn new() -> Self {
        ListenerList { inner: SkipSet::new() }
    }

    /// Number of registered entries, including dropped ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Calls every live listener with `event` and sweeps dropped ones.
    ///
    /// Only the organizer emits events, hence `pub(crate)`.
    pub(crate) fn dispatch(&self, event: &E) {
        for entry in self.inner.iter() {
            match entry.value().callback.upgrade() {
                Some(callback) => callback(event),
                None => {
                    entry.remove();
                }
            }
        }
    }
}

impl<E: Event + 'static> Default for ListenerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for ListenerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("listener_count", &self.inner.len())
            .finish()
    }
}

/// An active subscription. Dropping it unsubscribes.
pub struct Listener<E: Event> {
    #[allow(dead_code)] // held for lifetime management only
    callback: Arc<Callback<E>>,
    order: usize,
}

impl<E: Event + 'static> Listener<E> {
    pub fn new<F>(listeners: &ListenerList<E>, callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let order = LISTENER_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
        let callback: Arc<Callback<E>> = Arc::new(callback);
        listeners.inner.insert(ListenerEntry { callback: Arc::downgrade(&callback), order });
        Listener { callback, order }
    }
}

impl<E: Event> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("order", &self.order).finish()
    }
}

/// Defines a struct of named listener lists.
macro_rules! define_event_listeners {
    ($struct_name:ident { $($field_name:ident: $event_type:ty),* $(,)? }) => {
        /// Listener lists, one per event type.
        #[derive(Debug, Default)]
        pub struct $struct_name {
            $(
                pub $field_name: $crate::event::ListenerList<$event_type>,
            )*
        }

        impl $struct_name {
            pub fn new() -> Self {
                Self {
                    $(
                        $field_name: $crate::event::ListenerList::new(),
                    )*
                }
            }
        }
    };
}

/// The hierarchy was replaced, extended, reduced or reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyChanged {
    pub hierarchy: Vec<HierarchyEntry>,
    /// Whether the edit cleared the navigation path.
    pub path_reset: bool,
}

impl Event for HierarchyChanged {}

/// The navigation path changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChanged {
    pub path: Vec<PathSegment>,
}

impl Event for PathChanged {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModeChanged {
    pub previous: ViewMode,
    pub current: ViewMode,
}

impl Event for ViewModeChanged {}

define_event_listeners!(OrganizerEvents {
    hierarchy_changed: HierarchyChanged,
    path_changed: PathChanged,
    view_mode_changed: ViewModeChanged,
});
