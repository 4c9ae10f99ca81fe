/// Change notifications published by the board store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LoadStarted { owner_id: String },
    BoardLoaded,
    BoardChanged { description: String },
    Error(String),
    ModalChanged,
}
