use crate::house::RoomId;

/// Breadcrumbs from the exit room: one entry per successful forward move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathStack {
    rooms: Vec<RoomId>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, room: RoomId) {
        self.rooms.push(room);
    }

    pub fn pop(&mut self) -> Option<RoomId> {
        self.rooms.pop()
    }

    pub fn peek(&self) -> Option<RoomId> {
        self.rooms.last().copied()
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
