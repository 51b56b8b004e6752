use std::fmt::Write;

use serde::Serialize;

use crate::case_file::CaseFileSnapshot;
use crate::engine::hunter::Hunter;
use crate::types::{Evidence, EvidenceSet, ExitReason, GhostType};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";
const BANNER: &str = "==========================";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HunterReport {
    pub name: String,
    pub id: i32,
    pub exit_reason: Option<ExitReason>,
    pub boredom: u32,
    pub fear: u32,
    pub device: Evidence,
}

impl HunterReport {
    pub async fn capture(hunter: &Hunter) -> Self {
        let vitals = hunter.vitals().await;
        Self {
            name: hunter.name().to_string(),
            id: hunter.id(),
            exit_reason: vitals.exit_reason,
            boredom: vitals.boredom,
            fear: vitals.fear,
            device: vitals.device,
        }
    }

    pub fn identified_ghost(&self) -> bool {
        self.exit_reason == Some(ExitReason::Evidence)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EvidenceCheck {
    pub evidence: Evidence,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HuntersWin,
    GhostWins,
}

impl Verdict {
    /// Hunters only win when the collected evidence is exactly the ghost's signature.
    pub fn decide(collected: EvidenceSet, ghost: GhostType) -> Self {
        if collected == ghost.signature() {
            Self::HuntersWin
        } else {
            Self::GhostWins
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvestigationReport {
    pub seed: u32,
    pub hunters: Vec<HunterReport>,
    pub checklist: Vec<EvidenceCheck>,
    pub solved: bool,
    pub identified: usize,
    pub guess: Option<GhostType>,
    pub ghost: GhostType,
    pub verdict: Verdict,
}

impl InvestigationReport {
    pub fn build(
        seed: u32,
        hunters: Vec<HunterReport>,
        case_file: CaseFileSnapshot,
        ghost: GhostType,
    ) -> Self {
        let collected = case_file.collected;
        let checklist = Evidence::ALL
            .iter()
            .map(|&evidence| EvidenceCheck {
                evidence,
                collected: collected.contains(evidence),
            })
            .collect();
        let identified = hunters.iter().filter(|h| h.identified_ghost()).count();
        Self {
            seed,
            hunters,
            checklist,
            solved: case_file.solved,
            identified,
            guess: GhostType::from_signature(collected),
            ghost,
            verdict: Verdict::decide(collected, ghost),
        }
    }

    pub fn collected(&self) -> EvidenceSet {
        let collected: Vec<Evidence> = self
            .checklist
            .iter()
            .filter(|check| check.collected)
            .map(|check| check.evidence)
            .collect();
        EvidenceSet::of(&collected)
    }

    pub fn render(&self, color: bool) -> String {
        let paint = |text: &str, code: &str| {
            if color {
                format!("{code}{text}{RESET}")
            } else {
                text.to_string()
            }
        };
        let mark = |ok: bool| {
            if ok {
                paint("✔", GREEN)
            } else {
                paint("✖", RED)
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "{BANNER}\nInvestigation Results:\n{BANNER}");
        for hunter in &self.hunters {
            let reason = hunter.exit_reason.map(ExitReason::as_str).unwrap_or("none");
            let _ = writeln!(
                out,
                "[{}] Hunter {} (ID {}) exited because of [{}] (bored={} fear={})",
                mark(hunter.identified_ghost()),
                hunter.name,
                hunter.id,
                reason,
                hunter.boredom,
                hunter.fear
            );
        }

        let _ = writeln!(out, "\nShared Case File Checklist:");
        for check in &self.checklist {
            let _ = writeln!(out, "  - [{}] {}", mark(check.collected), check.evidence);
        }

        let _ = writeln!(out, "\nVictory Results:\n--------------------------");
        let _ = writeln!(
            out,
            "- Hunters exited after identifying the ghost: {}/{}",
            self.identified,
            self.hunters.len()
        );
        let guess = self.guess.map(GhostType::as_str).unwrap_or("N/A");
        let _ = writeln!(out, "- Ghost Guess: {guess}");
        let _ = writeln!(out, "- Actual Ghost Type: {}", self.ghost);
        let verdict = match self.verdict {
            Verdict::HuntersWin => paint("Hunters Win!", GREEN),
            Verdict::GhostWins => paint("Ghost Wins!", RED),
        };
        let _ = writeln!(out, "Overall Result: {verdict}");
        out
    }
}
