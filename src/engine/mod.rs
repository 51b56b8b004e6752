//! Investigation orchestrator: builds the house, places the ghost and the roster, runs one
//! task per actor and turns the final shared state into a report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audit::{AuditSink, EntityLog};
use crate::case_file::CaseFile;
use crate::constants::{AUDIT_RECORD_CAP, DEFAULT_GHOST_ID, TICK_MS};
use crate::error::{LayoutError, SimError};
use crate::house::{willow_house, House, RoomId};
use crate::report::{HunterReport, InvestigationReport};
use crate::rng::Rng;
use crate::roster::ensure_unique_ids;
use crate::types::{EntityKind, Evidence, GhostType, HunterSpec};

pub mod ghost;
pub mod hunter;

use self::ghost::{Ghost, GhostActor};
use self::hunter::{Hunter, HunterActor};

#[derive(Clone, Debug)]
pub struct InvestigationOptions {
    /// Pause between two ticks of the same actor. Zero only yields to the scheduler.
    pub tick: Duration,
    pub seed: Option<u32>,
    pub audit: AuditSink,
    pub audit_cap: u32,
    pub ghost_type: Option<GhostType>,
    pub ghost_room: Option<RoomId>,
}

impl Default for InvestigationOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(TICK_MS),
            seed: None,
            audit: AuditSink::Disabled,
            audit_cap: AUDIT_RECORD_CAP,
            ghost_type: None,
            ghost_room: None,
        }
    }
}

/// Run-wide stop signal. The first actor that fails trips it; every actor checks it
/// before each tick.
#[derive(Clone, Debug, Default)]
pub struct Halt(Arc<AtomicBool>);

impl Halt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) async fn pause(tick: Duration) {
    if tick.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(tick).await;
    }
}

/// Runs a full investigation of the Willow house.
pub async fn run_investigation(
    roster: Vec<HunterSpec>,
    options: InvestigationOptions,
) -> Result<InvestigationReport, SimError> {
    run_in_house(willow_house()?, roster, options).await
}

pub async fn run_in_house(
    house: House,
    roster: Vec<HunterSpec>,
    options: InvestigationOptions,
) -> Result<InvestigationReport, SimError> {
    if roster.is_empty() {
        return Err(SimError::EmptyRoster);
    }
    ensure_unique_ids(&roster)?;
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = Rng::new(seed);
    let house = Arc::new(house);
    let case_file = Arc::new(CaseFile::new());

    let kind = options
        .ghost_type
        .unwrap_or_else(|| GhostType::ALL[rng.pick_index(GhostType::ALL.len())]);
    let ghost_room = match options.ghost_room {
        Some(room) if house.room_ids().any(|id| id == room) => room,
        Some(room) => return Err(LayoutError::UnknownRoom(room).into()),
        None => house.rooms()[rng.pick_index(house.len())].id(),
    };
    info!(seed, ghost_type = %kind, room = house.name_of(ghost_room), hunters = roster.len(), "investigation starting");

    let ghost = Arc::new(Ghost::new(DEFAULT_GHOST_ID, kind));
    let ghost_actor = GhostActor::haunt(
        ghost.clone(),
        house.clone(),
        ghost_room,
        rng.fork(),
        EntityLog::with_cap(
            options.audit.clone(),
            EntityKind::Ghost,
            DEFAULT_GHOST_ID,
            options.audit_cap,
        ),
    )
    .await?;

    let mut hunters = Vec::with_capacity(roster.len());
    let mut hunter_actors = Vec::with_capacity(roster.len());
    for spec in roster {
        let id = spec.id;
        let device = Evidence::ALL[rng.pick_index(Evidence::ALL.len())];
        let hunter = Arc::new(Hunter::new(spec, device));
        let actor = HunterActor::enter(
            hunter.clone(),
            house.clone(),
            case_file.clone(),
            rng.fork(),
            EntityLog::with_cap(options.audit.clone(), EntityKind::Hunter, id, options.audit_cap),
        )
        .await?;
        hunters.push(hunter);
        hunter_actors.push(actor);
    }

    let halt = Halt::new();
    let mut tasks: Vec<JoinHandle<Result<(), SimError>>> = Vec::with_capacity(hunters.len() + 1);
    tasks.push(tokio::spawn(ghost_actor.run(options.tick, halt.clone())));
    for actor in hunter_actors {
        tasks.push(tokio::spawn(actor.run(options.tick, halt.clone())));
    }

    // A failing actor trips `halt`, so the rest stop at their next tick; join them all
    // so no task outlives the run.
    let mut failure = None;
    for task in tasks {
        let outcome = task.await.map_err(SimError::from).and_then(|result| result);
        if let Err(error) = outcome {
            halt.trigger();
            warn!(%error, "actor stopped with an error");
            if failure.is_none() {
                failure = Some(error);
            }
        }
    }
    if let Some(error) = failure {
        return Err(error);
    }

    let mut reports = Vec::with_capacity(hunters.len());
    for hunter in &hunters {
        reports.push(HunterReport::capture(hunter).await);
    }
    let report = InvestigationReport::build(seed, reports, case_file.snapshot().await, ghost.kind());
    info!(
        verdict = ?report.verdict,
        identified = report.identified,
        guess = report.guess.map(GhostType::as_str).unwrap_or("N/A"),
        "investigation finished"
    );
    Ok(report)
}
