//! Board store: the single owner of the loaded board.
//!
//! UI-facing code reads the board from [`BoardStore`] and asks it to mutate;
//! the store persists each change through a [`kanban_persistence::RemoteStore`]
//! before applying it locally.

pub mod events;
mod loader;
pub mod outcome;
pub mod store;

pub use events::StoreEvent;
pub use outcome::MutationOutcome;
pub use store::BoardStore;
