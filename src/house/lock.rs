//! Dual-room locking.
//!
//! Any operation that touches two rooms at once (a move) goes through
//! [`House::lock_pair`]. Locks are always taken lowest [`RoomId`] first, so two actors
//! moving in opposite directions between the same rooms can never each hold one lock
//! while waiting for the other. Asking for the same room twice takes a single lock.

use tokio::sync::MutexGuard;

use super::{House, RoomId, RoomState};
use crate::error::CapacityExceeded;

/// Acquisition order for a pair of rooms: `(first, second)`.
pub fn lock_order(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Both rooms of a move, locked in [`lock_order`].
pub struct RoomPairGuard<'a> {
    // Fields drop in declaration order, so the second-acquired lock is released first.
    second: Option<MutexGuard<'a, RoomState>>,
    first: MutexGuard<'a, RoomState>,
    from_is_first: bool,
}

impl House {
    pub async fn lock_pair(&self, from: RoomId, to: RoomId) -> RoomPairGuard<'_> {
        if from == to {
            return RoomPairGuard {
                second: None,
                first: self.lock(from).await,
                from_is_first: true,
            };
        }
        let (first_id, second_id) = lock_order(from, to);
        let first = self.lock(first_id).await;
        let second = self.lock(second_id).await;
        RoomPairGuard {
            second: Some(second),
            first,
            from_is_first: first_id == from,
        }
    }
}

impl RoomPairGuard<'_> {
    pub fn is_same_room(&self) -> bool {
        self.second.is_none()
    }

    pub fn from(&self) -> &RoomState {
        match &self.second {
            Some(second) if !self.from_is_first => &**second,
            _ => &*self.first,
        }
    }

    pub fn to(&self) -> &RoomState {
        match &self.second {
            Some(second) if self.from_is_first => &**second,
            _ => &*self.first,
        }
    }

    /// `(from, to)` when the rooms are distinct.
    pub fn split_mut(&mut self) -> Option<(&mut RoomState, &mut RoomState)> {
        let second = self.second.as_deref_mut()?;
        let first = &mut *self.first;
        if self.from_is_first {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    /// Moves a hunter's occupancy entry across, subject to the destination's capacity.
    /// A full destination leaves both rooms untouched. Same-room transfers are no-ops.
    pub fn transfer_hunter(&mut self, hunter_id: i32) -> Result<(), CapacityExceeded> {
        let Some((from, to)) = self.split_mut() else {
            return Ok(());
        };
        to.admit_hunter(hunter_id)?;
        from.remove_hunter(hunter_id);
        Ok(())
    }

    /// Moves the ghost reference across. Returns false if the ghost is no longer in the
    /// source room, in which case nothing changes.
    pub fn transfer_ghost(&mut self, ghost_id: i32) -> bool {
        let Some((from, to)) = self.split_mut() else {
            return false;
        };
        if from.ghost() != Some(ghost_id) {
            return false;
        }
        from.take_ghost();
        to.place_ghost(ghost_id);
        true
    }
}
