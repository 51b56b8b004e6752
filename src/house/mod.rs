use std::fmt;

use tokio::sync::{Mutex, MutexGuard};

use crate::bounded::BoundedList;
use crate::constants::{MAX_CONNECTIONS, MAX_ROOMS, MAX_ROOM_OCCUPANCY};
use crate::error::{CapacityExceeded, LayoutError};
use crate::types::{Evidence, EvidenceSet};

mod layout;
mod lock;

pub use self::layout::{willow_house, WILLOW_CONNECTIONS, WILLOW_ROOMS};
pub use self::lock::{lock_order, RoomPairGuard};

/// Stable index of a room, assigned once at build time. Doubles as the lock-order key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(usize);

impl RoomId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable part of a room. Only reachable through the room's lock.
#[derive(Debug)]
pub struct RoomState {
    hunters: BoundedList<i32>,
    ghost: Option<i32>,
    evidence: EvidenceSet,
}

impl RoomState {
    fn new() -> Self {
        Self {
            hunters: BoundedList::with_capacity(MAX_ROOM_OCCUPANCY),
            ghost: None,
            evidence: EvidenceSet::EMPTY,
        }
    }

    pub fn hunter_count(&self) -> usize {
        self.hunters.len()
    }

    pub fn hunters(&self) -> &[i32] {
        self.hunters.as_slice()
    }

    pub fn is_full(&self) -> bool {
        self.hunters.is_full()
    }

    pub fn admit_hunter(&mut self, hunter_id: i32) -> Result<(), CapacityExceeded> {
        self.hunters.try_push(hunter_id)
    }

    pub fn remove_hunter(&mut self, hunter_id: i32) -> bool {
        self.hunters.remove(&hunter_id)
    }

    pub fn ghost(&self) -> Option<i32> {
        self.ghost
    }

    pub fn has_ghost(&self) -> bool {
        self.ghost.is_some()
    }

    pub fn place_ghost(&mut self, ghost_id: i32) {
        self.ghost = Some(ghost_id);
    }

    pub fn take_ghost(&mut self) -> Option<i32> {
        self.ghost.take()
    }

    pub fn evidence(&self) -> EvidenceSet {
        self.evidence
    }

    /// Leaves `evidence` behind unless it is already lying here.
    pub fn deposit(&mut self, evidence: Evidence) -> bool {
        self.evidence.insert(evidence)
    }

    /// Picks `evidence` up; only the first matching collector gets it.
    pub fn collect(&mut self, evidence: Evidence) -> bool {
        self.evidence.remove(evidence)
    }
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    is_exit: bool,
    neighbors: BoundedList<RoomId>,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_exit(&self) -> bool {
        self.is_exit
    }

    /// Topology is frozen after build, so neighbors are read without the lock.
    pub fn neighbors(&self) -> &[RoomId] {
        self.neighbors.as_slice()
    }

    pub async fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().await
    }
}

#[derive(Debug)]
pub struct House {
    rooms: Vec<Room>,
    exit: RoomId,
}

impl House {
    pub fn builder() -> HouseBuilder {
        HouseBuilder::default()
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.0]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.iter().map(|room| room.id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn exit(&self) -> RoomId {
        self.exit
    }

    pub fn name_of(&self, id: RoomId) -> &str {
        self.room(id).name()
    }

    pub fn find(&self, name: &str) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|room| room.name == name)
            .map(|room| room.id)
    }

    pub async fn lock(&self, id: RoomId) -> MutexGuard<'_, RoomState> {
        self.room(id).lock().await
    }
}

#[derive(Debug)]
struct RoomDraft {
    name: String,
    is_exit: bool,
    neighbors: BoundedList<RoomId>,
}

#[derive(Debug, Default)]
pub struct HouseBuilder {
    rooms: Vec<RoomDraft>,
}

impl HouseBuilder {
    pub fn add_room(&mut self, name: &str, is_exit: bool) -> Result<RoomId, LayoutError> {
        if self.rooms.len() >= MAX_ROOMS {
            return Err(LayoutError::TooManyRooms { max: MAX_ROOMS });
        }
        let id = RoomId(self.rooms.len());
        self.rooms.push(RoomDraft {
            name: name.to_string(),
            is_exit,
            neighbors: BoundedList::with_capacity(MAX_CONNECTIONS),
        });
        Ok(id)
    }

    /// Bidirectional. Rejects self loops, duplicates and full adjacency lists without
    /// touching either room.
    pub fn connect(&mut self, a: RoomId, b: RoomId) -> Result<(), LayoutError> {
        for id in [a, b] {
            if id.0 >= self.rooms.len() {
                return Err(LayoutError::UnknownRoom(id));
            }
        }
        if a == b {
            return Err(LayoutError::SelfConnection {
                room: self.rooms[a.0].name.clone(),
            });
        }
        if self.rooms[a.0].neighbors.contains(&b) {
            return Err(LayoutError::DuplicateConnection {
                a: self.rooms[a.0].name.clone(),
                b: self.rooms[b.0].name.clone(),
            });
        }
        for id in [a, b] {
            let draft = &self.rooms[id.0];
            if draft.neighbors.is_full() {
                return Err(LayoutError::ConnectionsFull {
                    room: draft.name.clone(),
                    source: CapacityExceeded {
                        capacity: draft.neighbors.capacity(),
                    },
                });
            }
        }
        self.rooms[a.0].neighbors.try_push(b).map_err(|source| {
            LayoutError::ConnectionsFull {
                room: self.rooms[a.0].name.clone(),
                source,
            }
        })?;
        self.rooms[b.0].neighbors.try_push(a).map_err(|source| {
            LayoutError::ConnectionsFull {
                room: self.rooms[b.0].name.clone(),
                source,
            }
        })?;
        Ok(())
    }

    pub fn build(self) -> Result<House, LayoutError> {
        let exits: Vec<usize> = self
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, draft)| draft.is_exit)
            .map(|(idx, _)| idx)
            .collect();
        if exits.len() != 1 {
            return Err(LayoutError::ExitCount { found: exits.len() });
        }
        let rooms = self
            .rooms
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| Room {
                id: RoomId(idx),
                name: draft.name,
                is_exit: draft.is_exit,
                neighbors: draft.neighbors,
                state: Mutex::new(RoomState::new()),
            })
            .collect();
        Ok(House {
            rooms,
            exit: RoomId(exits[0]),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Straight corridor `Van - R1 - R2 - ...`; each room's only forward neighbor is fixed.
    pub(crate) fn corridor(len: usize) -> House {
        let mut builder = House::builder();
        let mut previous = builder.add_room("Van", true).expect("room");
        for idx in 1..len {
            let next = builder.add_room(&format!("R{idx}"), false).expect("room");
            builder.connect(previous, next).expect("connect");
            previous = next;
        }
        builder.build().expect("corridor builds")
    }

    #[test]
    fn connect_rejects_self_and_duplicate_links() {
        let mut builder = House::builder();
        let a = builder.add_room("A", true).expect("room");
        let b = builder.add_room("B", false).expect("room");
        assert!(matches!(
            builder.connect(a, a),
            Err(LayoutError::SelfConnection { .. })
        ));
        builder.connect(a, b).expect("first link");
        assert!(matches!(
            builder.connect(b, a),
            Err(LayoutError::DuplicateConnection { .. })
        ));
        let house = builder.build().expect("build");
        assert_eq!(house.room(a).neighbors(), &[b]);
        assert_eq!(house.room(b).neighbors(), &[a]);
    }

    #[test]
    fn connect_reports_full_adjacency() {
        let mut builder = House::builder();
        let hub = builder.add_room("Hub", true).expect("room");
        for idx in 0..MAX_CONNECTIONS {
            let spoke = builder.add_room(&format!("S{idx}"), false).expect("room");
            builder.connect(hub, spoke).expect("spoke fits");
        }
        let extra = builder.add_room("Extra", false).expect("room");
        let err = builder.connect(extra, hub).expect_err("hub is full");
        assert!(matches!(err, LayoutError::ConnectionsFull { ref room, .. } if room == "Hub"));
        let house = builder.build().expect("build");
        assert!(house.room(extra).neighbors().is_empty());
    }

    #[test]
    fn build_requires_exactly_one_exit() {
        let mut builder = House::builder();
        builder.add_room("A", false).expect("room");
        assert_eq!(
            builder.build().expect_err("no exit"),
            LayoutError::ExitCount { found: 0 }
        );

        let mut builder = House::builder();
        builder.add_room("A", true).expect("room");
        builder.add_room("B", true).expect("room");
        assert_eq!(
            builder.build().expect_err("two exits"),
            LayoutError::ExitCount { found: 2 }
        );
    }

    #[test]
    fn add_room_caps_house_size() {
        let mut builder = House::builder();
        for idx in 0..MAX_ROOMS {
            builder.add_room(&format!("R{idx}"), idx == 0).expect("fits");
        }
        assert_eq!(
            builder.add_room("overflow", false),
            Err(LayoutError::TooManyRooms { max: MAX_ROOMS })
        );
    }

    #[tokio::test]
    async fn room_occupancy_never_exceeds_capacity() {
        let house = corridor(2);
        let mut state = house.lock(house.exit()).await;
        for id in 0..MAX_ROOM_OCCUPANCY as i32 {
            state.admit_hunter(id).expect("fits");
        }
        assert!(state.admit_hunter(99).is_err());
        assert_eq!(state.hunter_count(), MAX_ROOM_OCCUPANCY);
        assert!(state.remove_hunter(3));
        assert!(!state.remove_hunter(3));
        assert_eq!(state.hunter_count(), MAX_ROOM_OCCUPANCY - 1);
    }

    #[tokio::test]
    async fn evidence_is_deposited_once_and_collected_once() {
        let house = corridor(1);
        let mut state = house.lock(house.exit()).await;
        assert!(state.deposit(Evidence::Orbs));
        assert!(!state.deposit(Evidence::Orbs));
        assert!(state.collect(Evidence::Orbs));
        assert!(!state.collect(Evidence::Orbs));
        assert!(state.evidence().is_empty());
    }
}
