use thiserror::Error;

use crate::house::RoomId;

/// A bounded container refused an element because it was already full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("capacity of {capacity} exceeded")]
pub struct CapacityExceeded {
    pub capacity: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("house cannot hold more than {max} rooms")]
    TooManyRooms { max: usize },
    #[error("room {0:?} does not exist")]
    UnknownRoom(RoomId),
    #[error("room {room} cannot connect to itself")]
    SelfConnection { room: String },
    #[error("rooms {a} and {b} are already connected")]
    DuplicateConnection { a: String, b: String },
    #[error("room {room} has no free connection slot")]
    ConnectionsFull {
        room: String,
        #[source]
        source: CapacityExceeded,
    },
    #[error("house needs exactly one exit room, found {found}")]
    ExitCount { found: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("hunter name must not be empty")]
    EmptyName,
    #[error("hunter name is longer than {max} characters")]
    NameTooLong { max: usize },
    #[error("hunter id `{0}` is not an integer")]
    InvalidId(String),
    #[error("hunter id {0} is already taken")]
    DuplicateId(i32),
    #[error("expected NAME:ID, got `{0}`")]
    MalformedEntry(String),
    #[error("at least one hunter is required")]
    NoHunters,
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("audit log capped for entity {entity_id} after {records} records; stopping to prevent unbounded growth")]
    AuditVolumeExceeded { entity_id: i32, records: u32 },
    #[error("investigation needs at least one hunter")]
    EmptyRoster,
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("actor task failed: {0}")]
    ActorJoin(#[from] tokio::task::JoinError),
    #[error("roster input failed: {0}")]
    RosterIo(#[from] std::io::Error),
    #[error(transparent)]
    Roster(#[from] RosterError),
}
