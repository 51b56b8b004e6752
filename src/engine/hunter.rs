use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{pause, Halt};
use crate::audit::{AuditAction, AuditEntry, EntityLog};
use crate::case_file::CaseFile;
use crate::constants::{is_afraid, is_bored};
use crate::error::SimError;
use crate::house::{House, RoomId};
use crate::path_stack::PathStack;
use crate::rng::Rng;
use crate::types::{Evidence, ExitReason, HunterSpec};

/// Counters that must be read and written together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HunterVitals {
    pub device: Evidence,
    pub fear: u32,
    pub boredom: u32,
    pub exit_reason: Option<ExitReason>,
}

impl HunterVitals {
    pub fn exited(&self) -> bool {
        self.exit_reason.is_some()
    }
}

/// Shared, reportable half of a hunter.
#[derive(Debug)]
pub struct Hunter {
    name: String,
    id: i32,
    vitals: Mutex<HunterVitals>,
}

impl Hunter {
    pub fn new(spec: HunterSpec, device: Evidence) -> Self {
        Self {
            name: spec.name,
            id: spec.id,
            vitals: Mutex::new(HunterVitals {
                device,
                fear: 0,
                boredom: 0,
                exit_reason: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub async fn vitals(&self) -> HunterVitals {
        *self.vitals.lock().await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HunterTick {
    /// Forward move while exploring.
    Moved(RoomId),
    /// One breadcrumb consumed on the way back to the exit.
    SteppedBack(RoomId),
    /// Destination was full; the hunter stays put this tick.
    Blocked,
    /// No move attempted (just picked up evidence, or nowhere to go).
    Stayed,
    Exited(ExitReason),
}

/// Task-owned half of a hunter: position, breadcrumbs, generator and audit log.
pub struct HunterActor {
    hunter: Arc<Hunter>,
    house: Arc<House>,
    case_file: Arc<CaseFile>,
    room: RoomId,
    path: PathStack,
    returning: bool,
    rng: Rng,
    log: EntityLog,
}

impl HunterActor {
    /// Puts the hunter in the exit room. A full exit room still hosts the hunter, just
    /// without an occupancy slot.
    pub async fn enter(
        hunter: Arc<Hunter>,
        house: Arc<House>,
        case_file: Arc<CaseFile>,
        rng: Rng,
        mut log: EntityLog,
    ) -> Result<Self, SimError> {
        let room = house.exit();
        let room_name = house.name_of(room);
        if let Err(full) = house.lock(room).await.admit_hunter(hunter.id) {
            warn!(hunter_id = hunter.id, room = room_name, %full, "starting room full; hunter not registered as occupant");
        }
        let device = hunter.vitals().await.device;
        info!(hunter_id = hunter.id, name = %hunter.name, room = room_name, %device, "hunter initialized");
        log.write(AuditEntry {
            action: AuditAction::Init,
            room: room_name,
            device: Some(device),
            boredom: 0,
            fear: 0,
            extra: &hunter.name,
        })?;
        Ok(Self {
            hunter,
            house,
            case_file,
            room,
            path: PathStack::new(),
            returning: false,
            rng,
            log,
        })
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn path(&self) -> &PathStack {
        &self.path
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub async fn run(mut self, tick: Duration, halt: Halt) -> Result<(), SimError> {
        while !halt.is_triggered() {
            match self.tick().await {
                Ok(HunterTick::Exited(_)) => return Ok(()),
                Ok(_) => {}
                Err(error) => {
                    halt.trigger();
                    return Err(error);
                }
            }
            pause(tick).await;
        }
        debug!(hunter_id = self.hunter.id, room = self.house.name_of(self.room), "hunter halted");
        Ok(())
    }

    pub async fn tick(&mut self) -> Result<HunterTick, SimError> {
        let vitals = {
            let mut vitals = self.hunter.vitals.lock().await;
            let ghost_here = self.house.lock(self.room).await.has_ghost();
            if ghost_here {
                vitals.fear += 1;
                vitals.boredom = 0;
            } else {
                vitals.boredom += 1;
            }
            *vitals
        };

        // Boredom wins when both thresholds trip on the same tick.
        if is_bored(vitals.boredom) {
            return self.exit(ExitReason::Bored, vitals).await;
        }
        if is_afraid(vitals.fear) {
            return self.exit(ExitReason::Afraid, vitals).await;
        }

        let mut vitals = vitals;
        if self.returning {
            if !self.house.room(self.room).is_exit() {
                return self.step_back(vitals).await;
            }
            self.finish_return(vitals)?;
            if self.case_file.check_solved().await {
                return self.exit(ExitReason::Evidence, vitals).await;
            }
            vitals.device = self.swap_device(vitals).await?;
        }

        self.gather_evidence(vitals).await?;
        if self.returning {
            return Ok(HunterTick::Stayed);
        }
        self.explore(vitals).await
    }

    async fn exit(
        &mut self,
        reason: ExitReason,
        vitals: HunterVitals,
    ) -> Result<HunterTick, SimError> {
        self.hunter.vitals.lock().await.exit_reason = Some(reason);
        self.house.lock(self.room).await.remove_hunter(self.hunter.id);
        self.path.clear();
        self.returning = false;

        let room = self.house.name_of(self.room);
        info!(
            hunter_id = self.hunter.id,
            device = %vitals.device,
            room,
            %reason,
            boredom = vitals.boredom,
            fear = vitals.fear,
            "hunter exited"
        );
        self.log.write(AuditEntry {
            action: AuditAction::Exit,
            room,
            device: Some(vitals.device),
            boredom: vitals.boredom,
            fear: vitals.fear,
            extra: reason.as_str(),
        })?;
        Ok(HunterTick::Exited(reason))
    }

    async fn step_back(&mut self, vitals: HunterVitals) -> Result<HunterTick, SimError> {
        let Some(next) = self.path.pop() else {
            warn!(
                hunter_id = self.hunter.id,
                room = self.house.name_of(self.room),
                "no breadcrumbs left outside the exit room; abandoning return"
            );
            self.returning = false;
            return Ok(HunterTick::Stayed);
        };

        let from = self.room;
        let stepped = self
            .house
            .lock_pair(from, next)
            .await
            .transfer_hunter(self.hunter.id)
            .is_ok();
        if !stepped {
            self.path.push(next);
            debug!(hunter_id = self.hunter.id, to = self.house.name_of(next), "return path blocked");
            return Ok(HunterTick::Blocked);
        }
        self.room = next;
        self.log_move(from, next, vitals)?;
        Ok(HunterTick::SteppedBack(next))
    }

    fn finish_return(&mut self, vitals: HunterVitals) -> Result<(), SimError> {
        self.returning = false;
        self.path.clear();
        self.log_return(AuditAction::ReturnComplete, vitals)
    }

    /// Draws devices until one differs from the current device.
    async fn swap_device(&mut self, vitals: HunterVitals) -> Result<Evidence, SimError> {
        let old = vitals.device;
        let new = loop {
            let candidate = Evidence::ALL[self.rng.pick_index(Evidence::ALL.len())];
            if candidate != old {
                break candidate;
            }
        };
        self.hunter.vitals.lock().await.device = new;

        let swap = format!("{old}->{new}");
        info!(hunter_id = self.hunter.id, from = %old, to = %new, boredom = vitals.boredom, fear = vitals.fear, "hunter swapped devices");
        self.log.write(AuditEntry {
            action: AuditAction::Swap,
            room: "",
            device: Some(new),
            boredom: vitals.boredom,
            fear: vitals.fear,
            extra: &swap,
        })?;
        Ok(new)
    }

    async fn gather_evidence(&mut self, vitals: HunterVitals) -> Result<(), SimError> {
        let device = vitals.device;
        let matched = self.house.lock(self.room).await.collect(device);
        if !matched {
            return Ok(());
        }

        let room = self.house.name_of(self.room);
        info!(hunter_id = self.hunter.id, %device, room, boredom = vitals.boredom, fear = vitals.fear, "hunter gathered evidence");
        self.log.write(AuditEntry {
            action: AuditAction::Evidence,
            room,
            device: Some(device),
            boredom: vitals.boredom,
            fear: vitals.fear,
            extra: device.as_str(),
        })?;
        self.case_file.record(device).await;

        if !self.house.room(self.room).is_exit() {
            self.returning = true;
            self.log_return(AuditAction::ReturnStart, vitals)?;
        }
        Ok(())
    }

    async fn explore(&mut self, vitals: HunterVitals) -> Result<HunterTick, SimError> {
        let from = self.room;
        let Some(&next) = self.rng.pick(self.house.room(from).neighbors()) else {
            return Ok(HunterTick::Stayed);
        };
        let moved = self
            .house
            .lock_pair(from, next)
            .await
            .transfer_hunter(self.hunter.id)
            .is_ok();
        if !moved {
            debug!(hunter_id = self.hunter.id, to = self.house.name_of(next), "destination full");
            return Ok(HunterTick::Blocked);
        }
        self.path.push(from);
        self.room = next;
        self.log_move(from, next, vitals)?;
        Ok(HunterTick::Moved(next))
    }

    fn log_move(&mut self, from: RoomId, to: RoomId, vitals: HunterVitals) -> Result<(), SimError> {
        let (from_name, to_name) = (self.house.name_of(from), self.house.name_of(to));
        info!(
            hunter_id = self.hunter.id,
            device = %vitals.device,
            from = from_name,
            to = to_name,
            boredom = vitals.boredom,
            fear = vitals.fear,
            "hunter moved"
        );
        self.log.write(AuditEntry {
            action: AuditAction::Move,
            room: from_name,
            device: Some(vitals.device),
            boredom: vitals.boredom,
            fear: vitals.fear,
            extra: to_name,
        })
    }

    fn log_return(&mut self, action: AuditAction, vitals: HunterVitals) -> Result<(), SimError> {
        let room = self.house.name_of(self.room);
        let extra = if action == AuditAction::ReturnStart {
            "start"
        } else {
            "complete"
        };
        info!(hunter_id = self.hunter.id, device = %vitals.device, room, phase = extra, "hunter return to van");
        self.log.write(AuditEntry {
            action,
            room,
            device: Some(vitals.device),
            boredom: vitals.boredom,
            fear: vitals.fear,
            extra,
        })
    }
}
