//! The coalescing event mailbox ("EventBox") and the event vocabulary that
//! flows through the shared "main box".

pub mod event;
pub mod eventbox;

pub use event::{EventKind, EventPayload};
pub use eventbox::EventBox;

/// The main box's concrete type: every producer (Reader, Engine, Terminal)
/// puts onto one of these, and the Dispatcher is its single waiter.
pub type MainEventBox = EventBox<EventKind, EventPayload>;
