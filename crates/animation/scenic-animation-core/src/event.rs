//! Change notification for values, keyframes, parameters and animations.
//!
//! Listeners are called synchronously on the firing thread, most recently
//! added first. `fire` snapshots the listener list before calling out, so a
//! listener holding a clone of the `Listeners` handle may add or remove
//! listeners from inside its callback.
//!
//! Events travel upward: a value event is handed to its keyframe (and its
//! parameter), which wraps it in an event of its own scope and notifies its
//! listeners; the animation then wraps the keyframe event in turn. The
//! wrapped child event stays reachable through `source`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ids::{KeyFrameId, ListenerId, ParameterId};
use crate::value::ParameterValue;

/// What happened to the subject of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Add,
    Remove,
    Change,
}

impl ChangeKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Change => "change",
        }
    }
}

/// The object an event is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scope {
    Value {
        parameter: ParameterId,
        frame: i64,
    },
    KeyFrame {
        keyframe: KeyFrameId,
        frame: i64,
    },
    Parameter {
        parameter: ParameterId,
    },
    Animation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub scope: Scope,
    /// Snapshot of the value for value-scoped events
    pub value: Option<ParameterValue>,
    /// The child event this one wraps, if it was propagated
    pub source: Option<Box<ChangeEvent>>,
}

impl ChangeEvent {
    #[inline]
    pub fn new(kind: ChangeKind, scope: Scope) -> Self {
        Self {
            kind,
            scope,
            value: None,
            source: None,
        }
    }

    #[inline]
    pub fn with_value(mut self, value: ParameterValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Re-scope a child event: same kind, new scope, child kept as `source`.
    pub fn wrap(scope: Scope, child: ChangeEvent) -> Self {
        Self {
            kind: child.kind,
            scope,
            value: None,
            source: Some(Box::new(child)),
        }
    }

    /// The innermost event of a propagation chain.
    pub fn origin(&self) -> &ChangeEvent {
        let mut event = self;
        while let Some(source) = &event.source {
            event = source;
        }
        event
    }

    /// The value snapshot carried anywhere along the chain.
    pub fn value_snapshot(&self) -> Option<&ParameterValue> {
        self.value.as_ref().or_else(|| self.origin().value.as_ref())
    }
}

/// Receives change events
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    #[inline]
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

#[derive(Default)]
struct ListenerList {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn ChangeListener>)>,
}

/// Shared handle to a listener list. Clones refer to the same list.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<Mutex<ListenerList>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, ListenerList> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add<L>(&self, listener: L) -> ListenerId
    where
        L: ChangeListener + 'static,
    {
        let mut list = self.lock();
        let id = ListenerId(list.next_id);
        list.next_id = list.next_id.wrapping_add(1);
        list.entries.push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut list = self.lock();
        let before = list.entries.len();
        list.entries.retain(|(entry, _)| *entry != id);
        list.entries.len() != before
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every listener registered at the time of the call, newest
    /// first. Returns how many were notified.
    pub fn fire(&self, event: &ChangeEvent) -> usize {
        let snapshot: Vec<Arc<dyn ChangeListener>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot.iter().rev() {
            listener.on_change(event);
        }
        snapshot.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

/// Something that owns a listener list and fires events about itself.
pub trait Changeable {
    fn listeners(&self) -> &Listeners;

    /// Scope used for events this object fires.
    fn change_scope(&self) -> Scope;

    fn add_listener<L>(&self, listener: L) -> ListenerId
    where
        L: ChangeListener + 'static,
        Self: Sized,
    {
        self.listeners().add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners().remove(id)
    }

    fn clear_listeners(&self) {
        self.listeners().clear()
    }

    fn fire_event(&self, kind: ChangeKind, value: Option<ParameterValue>) -> ChangeEvent {
        let event = ChangeEvent {
            kind,
            scope: self.change_scope(),
            value,
            source: None,
        };
        self.listeners().fire(&event);
        event
    }
}

/// A `Changeable` that also receives events from the children it owns.
pub trait PropagatingListener: Changeable {
    /// Handle a child event; return false to stop it from going further.
    fn handle_child_event(&mut self, event: &ChangeEvent) -> bool {
        let _ = event;
        true
    }

    /// Handle `child`, then wrap and forward it to this object's listeners.
    /// Returns the wrapped event, or None if it was stopped here.
    fn propagate(&mut self, child: ChangeEvent) -> Option<ChangeEvent> {
        if !self.handle_child_event(&child) {
            return None;
        }
        let wrapped = ChangeEvent::wrap(self.change_scope(), child);
        self.listeners().fire(&wrapped);
        Some(wrapped)
    }
}
