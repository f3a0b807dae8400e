//! Notifications emitted by the screen controller.
//!
//! Two kinds of consumer are supported:
//!
//! - **Listeners**: closures called synchronously, in registration order,
//!   while the operation that produced the event is still running. They
//!   get `&mut Screen` and may call back into it.
//! - **Subscribers**: `crossbeam` channel receivers, for consumers that
//!   drain events after the operation returns (e.g. a render loop).
//!
//! Events raised while a listener runs are queued, then delivered in order
//! once the current event has reached every listener. The outermost
//! operation does not return until the queue is empty.
//!
//! Events carry no state beyond their tag; consumers re-read the cursor
//! and buffer from the [`Screen`].

use std::collections::VecDeque;

use bitflags::bitflags;
use crossbeam_channel::{unbounded, Receiver, Sender};

use super::controller::Screen;

bitflags! {
    /// Filter selecting which events a consumer receives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u8 {
        /// [`ScreenEvent::Ready`].
        const READY = 0b0000_0001;
        /// [`ScreenEvent::Prompt`].
        const PROMPT = 0b0000_0010;
        /// [`ScreenEvent::ShowCursor`].
        const SHOW_CURSOR = 0b0000_0100;
        /// [`ScreenEvent::ChangeX`] and [`ScreenEvent::ChangeY`].
        const CURSOR = 0b0000_1000;
        /// Line insert/replace/remove and clear.
        const LINES = 0b0001_0000;
        /// Everything.
        const ALL = Self::READY.bits()
            | Self::PROMPT.bits()
            | Self::SHOW_CURSOR.bits()
            | Self::CURSOR.bits()
            | Self::LINES.bits();
    }
}

/// A screen notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEvent {
    /// Construction finished. Emitted once.
    Ready,
    /// `true` on entering prompt mode, `false` after any content write.
    Prompt(bool),
    /// Whether the cursor should be shown (and blink).
    ShowCursor(bool),
    /// The cursor column changed.
    ChangeX,
    /// The cursor row changed.
    ChangeY,
    /// A line was inserted at this index.
    LineInserted(usize),
    /// The line at this index got new content.
    LineReplaced(usize),
    /// The line at this index was removed.
    LineRemoved(usize),
    /// All lines were removed.
    Cleared,
}

impl ScreenEvent {
    /// The mask bit this event is filtered by.
    pub const fn kind(&self) -> EventMask {
        match self {
            Self::Ready => EventMask::READY,
            Self::Prompt(_) => EventMask::PROMPT,
            Self::ShowCursor(_) => EventMask::SHOW_CURSOR,
            Self::ChangeX | Self::ChangeY => EventMask::CURSOR,
            Self::LineInserted(_) | Self::LineReplaced(_) | Self::LineRemoved(_) | Self::Cleared => {
                EventMask::LINES
            }
        }
    }
}

/// A synchronous event callback.
pub type Listener = Box<dyn FnMut(&mut Screen, &ScreenEvent)>;

/// Registered listeners with their masks.
pub(crate) type Listeners = Vec<(EventMask, Listener)>;

/// Registry of listeners and channel subscribers, plus the delivery queue.
#[derive(Default)]
pub struct EventBus {
    listeners: Listeners,
    subscribers: Vec<(EventMask, Sender<ScreenEvent>)>,
    pending: VecDeque<ScreenEvent>,
    dispatching: bool,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous listener.
    pub fn listen(
        &mut self,
        mask: EventMask,
        listener: impl FnMut(&mut Screen, &ScreenEvent) + 'static,
    ) {
        self.listeners.push((mask, Box::new(listener)));
    }

    /// Open a channel receiving events that match `mask`.
    pub fn subscribe(&mut self, mask: EventMask) -> Receiver<ScreenEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push((mask, tx));
        rx
    }

    /// Number of live channel subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Queue an event. Returns `true` if the caller must drain the queue,
    /// `false` if a delivery loop further up the stack will.
    pub(crate) fn enqueue(&mut self, event: ScreenEvent) -> bool {
        self.pending.push_back(event);
        if self.dispatching {
            return false;
        }
        self.dispatching = true;
        true
    }

    /// Pop the next queued event and hand it to the subscribers.
    ///
    /// Returns `None` once the queue is empty, ending the delivery loop.
    pub(crate) fn next_event(&mut self) -> Option<ScreenEvent> {
        let Some(event) = self.pending.pop_front() else {
            self.dispatching = false;
            return None;
        };
        let kind = event.kind();
        tracing::trace!(?event, "emit");

        // Dropped receivers are pruned here.
        self.subscribers
            .retain(|(mask, tx)| !mask.intersects(kind) || tx.send(event).is_ok());
        Some(event)
    }

    /// Lend out the listeners for a delivery round.
    pub(crate) fn take_listeners(&mut self) -> Listeners {
        std::mem::take(&mut self.listeners)
    }

    /// Return lent listeners. Ones registered during the round go after them.
    pub(crate) fn restore_listeners(&mut self, mut listeners: Listeners) {
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}
