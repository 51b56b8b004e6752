use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{pause, Halt};
use crate::audit::{AuditAction, AuditEntry, EntityLog};
use crate::constants::is_bored;
use crate::error::SimError;
use crate::house::{House, RoomId};
use crate::rng::Rng;
use crate::types::{Evidence, GhostType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GhostVitals {
    pub boredom: u32,
    pub exited: bool,
}

/// Shared, reportable half of the ghost. Type and id never change after creation.
#[derive(Debug)]
pub struct Ghost {
    id: i32,
    kind: GhostType,
    vitals: Mutex<GhostVitals>,
}

impl Ghost {
    pub fn new(id: i32, kind: GhostType) -> Self {
        Self {
            id,
            kind,
            vitals: Mutex::new(GhostVitals::default()),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> GhostType {
        self.kind
    }

    pub async fn vitals(&self) -> GhostVitals {
        *self.vitals.lock().await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostBehavior {
    Idle,
    Haunt,
    Move,
}

const CONFINED: [GhostBehavior; 2] = [GhostBehavior::Idle, GhostBehavior::Haunt];
const FREE: [GhostBehavior; 3] = [GhostBehavior::Idle, GhostBehavior::Haunt, GhostBehavior::Move];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostTick {
    Acted(GhostBehavior),
    Exited,
}

/// Task-owned half of the ghost: position, generator and audit log.
pub struct GhostActor {
    ghost: Arc<Ghost>,
    house: Arc<House>,
    room: RoomId,
    rng: Rng,
    log: EntityLog,
}

impl GhostActor {
    /// Places the ghost in `room` and records its arrival.
    pub async fn haunt(
        ghost: Arc<Ghost>,
        house: Arc<House>,
        room: RoomId,
        rng: Rng,
        mut log: EntityLog,
    ) -> Result<Self, SimError> {
        house.lock(room).await.place_ghost(ghost.id);
        let room_name = house.name_of(room);
        info!(ghost_id = ghost.id, ghost_type = %ghost.kind, room = room_name, "ghost initialized");
        log.write(AuditEntry {
            action: AuditAction::Init,
            room: room_name,
            device: None,
            boredom: 0,
            fear: 0,
            extra: ghost.kind.as_str(),
        })?;
        Ok(Self {
            ghost,
            house,
            room,
            rng,
            log,
        })
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Ticks until the ghost exits or `halt` trips. An error trips `halt` for everyone.
    pub async fn run(mut self, tick: Duration, halt: Halt) -> Result<(), SimError> {
        while !halt.is_triggered() {
            match self.tick().await {
                Ok(GhostTick::Exited) => return Ok(()),
                Ok(GhostTick::Acted(_)) => {}
                Err(error) => {
                    halt.trigger();
                    return Err(error);
                }
            }
            pause(tick).await;
        }
        debug!(ghost_id = self.ghost.id, "ghost halted");
        Ok(())
    }

    pub async fn tick(&mut self) -> Result<GhostTick, SimError> {
        let hunters_here = self.house.lock(self.room).await.hunter_count();
        let choices: &[GhostBehavior] = if hunters_here > 0 { &CONFINED[..] } else { &FREE[..] };

        let vitals = {
            let mut vitals = self.ghost.vitals.lock().await;
            if hunters_here > 0 {
                vitals.boredom = 0;
            } else {
                vitals.boredom += 1;
            }
            if is_bored(vitals.boredom) {
                vitals.exited = true;
            }
            *vitals
        };
        let behavior = choices[self.rng.pick_index(choices.len())];

        if vitals.exited {
            self.leave(vitals.boredom).await?;
            return Ok(GhostTick::Exited);
        }

        match behavior {
            GhostBehavior::Idle => self.idle(vitals.boredom)?,
            GhostBehavior::Haunt => self.leave_evidence(vitals.boredom).await?,
            GhostBehavior::Move => self.wander(vitals.boredom).await?,
        }
        Ok(GhostTick::Acted(behavior))
    }

    fn idle(&mut self, boredom: u32) -> Result<(), SimError> {
        let room = self.house.name_of(self.room);
        debug!(ghost_id = self.ghost.id, boredom, room, "ghost idle");
        self.log.write(AuditEntry {
            action: AuditAction::Idle,
            room,
            device: None,
            boredom,
            fear: 0,
            extra: "",
        })
    }

    async fn leave_evidence(&mut self, boredom: u32) -> Result<(), SimError> {
        let signature: Vec<Evidence> = self.ghost.kind.signature().iter().collect();
        let Some(&evidence) = self.rng.pick(&signature) else {
            return Ok(());
        };
        let deposited = self.house.lock(self.room).await.deposit(evidence);
        if !deposited {
            return Ok(());
        }
        let room = self.house.name_of(self.room);
        info!(ghost_id = self.ghost.id, boredom, room, %evidence, "ghost left evidence");
        self.log.write(AuditEntry {
            action: AuditAction::Evidence,
            room,
            device: None,
            boredom,
            fear: 0,
            extra: evidence.as_str(),
        })
    }

    async fn wander(&mut self, boredom: u32) -> Result<(), SimError> {
        let from = self.room;
        let Some(&to) = self.rng.pick(self.house.room(from).neighbors()) else {
            return Ok(());
        };
        let moved = self
            .house
            .lock_pair(from, to)
            .await
            .transfer_ghost(self.ghost.id);
        if !moved {
            return Ok(());
        }
        self.room = to;
        let (from_name, to_name) = (self.house.name_of(from), self.house.name_of(to));
        info!(ghost_id = self.ghost.id, boredom, from = from_name, to = to_name, "ghost moved");
        self.log.write(AuditEntry {
            action: AuditAction::Move,
            room: from_name,
            device: None,
            boredom,
            fear: 0,
            extra: to_name,
        })
    }

    /// The room keeps its ghost reference after the exit, so hunters there still gain fear.
    async fn leave(&mut self, boredom: u32) -> Result<(), SimError> {
        let room = self.house.name_of(self.room);
        info!(ghost_id = self.ghost.id, boredom, room, "ghost exited");
        self.log.write(AuditEntry {
            action: AuditAction::Exit,
            room,
            device: None,
            boredom,
            fear: 0,
            extra: "",
        })
    }
}
