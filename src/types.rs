use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Evidence {
    Emf = 1 << 0,
    Orbs = 1 << 1,
    Radio = 1 << 2,
    Temperature = 1 << 3,
    Fingerprints = 1 << 4,
    Writing = 1 << 5,
    Infrared = 1 << 6,
}

impl Evidence {
    pub const ALL: [Evidence; 7] = [
        Evidence::Emf,
        Evidence::Orbs,
        Evidence::Radio,
        Evidence::Temperature,
        Evidence::Fingerprints,
        Evidence::Writing,
        Evidence::Infrared,
    ];

    pub fn bit(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emf => "emf",
            Self::Orbs => "orbs",
            Self::Radio => "radio",
            Self::Temperature => "temp",
            Self::Fingerprints => "prints",
            Self::Writing => "writing",
            Self::Infrared => "infrared",
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Union of evidence bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EvidenceSet(u8);

impl EvidenceSet {
    pub const EMPTY: EvidenceSet = EvidenceSet(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7f)
    }

    pub fn of(items: &[Evidence]) -> Self {
        items
            .iter()
            .fold(Self::EMPTY, |set, evidence| set.with(*evidence))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, evidence: Evidence) -> bool {
        self.0 & evidence.bit() != 0
    }

    pub fn with(self, evidence: Evidence) -> Self {
        Self(self.0 | evidence.bit())
    }

    /// Returns whether the bit was newly set.
    pub fn insert(&mut self, evidence: Evidence) -> bool {
        let fresh = !self.contains(evidence);
        self.0 |= evidence.bit();
        fresh
    }

    /// Returns whether the bit was present.
    pub fn remove(&mut self, evidence: Evidence) -> bool {
        let present = self.contains(evidence);
        self.0 &= !evidence.bit();
        present
    }

    pub fn is_superset_of(self, other: EvidenceSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: EvidenceSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Evidence> {
        Evidence::ALL
            .into_iter()
            .filter(move |evidence| self.contains(*evidence))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostType {
    Poltergeist,
    TheMimic,
    Hantu,
    Jinn,
    Phantom,
    Banshee,
    Goryo,
    Bullies,
    Myling,
    Obake,
    Yurei,
    Oni,
    Moroi,
    Revenant,
    Shade,
    Onryo,
    TheTwins,
    Deogen,
    Thaye,
    Yokai,
    Wraith,
    Raiju,
    Mare,
    Spirit,
}

impl GhostType {
    pub const ALL: [GhostType; 24] = [
        GhostType::Poltergeist,
        GhostType::TheMimic,
        GhostType::Hantu,
        GhostType::Jinn,
        GhostType::Phantom,
        GhostType::Banshee,
        GhostType::Goryo,
        GhostType::Bullies,
        GhostType::Myling,
        GhostType::Obake,
        GhostType::Yurei,
        GhostType::Oni,
        GhostType::Moroi,
        GhostType::Revenant,
        GhostType::Shade,
        GhostType::Onryo,
        GhostType::TheTwins,
        GhostType::Deogen,
        GhostType::Thaye,
        GhostType::Yokai,
        GhostType::Wraith,
        GhostType::Raiju,
        GhostType::Mare,
        GhostType::Spirit,
    ];

    pub fn signature(self) -> EvidenceSet {
        use Evidence::{Emf, Fingerprints, Infrared, Orbs, Radio, Temperature, Writing};

        let kinds = match self {
            Self::Poltergeist => [Fingerprints, Temperature, Writing],
            Self::TheMimic => [Fingerprints, Temperature, Radio],
            Self::Hantu => [Fingerprints, Temperature, Orbs],
            Self::Jinn => [Fingerprints, Temperature, Emf],
            Self::Phantom => [Fingerprints, Infrared, Radio],
            Self::Banshee => [Fingerprints, Infrared, Orbs],
            Self::Goryo => [Fingerprints, Infrared, Emf],
            Self::Bullies => [Fingerprints, Writing, Radio],
            Self::Myling => [Fingerprints, Writing, Emf],
            Self::Obake => [Fingerprints, Orbs, Emf],
            Self::Yurei => [Temperature, Infrared, Orbs],
            Self::Oni => [Temperature, Infrared, Emf],
            Self::Moroi => [Temperature, Writing, Radio],
            Self::Revenant => [Temperature, Writing, Orbs],
            Self::Shade => [Temperature, Writing, Emf],
            Self::Onryo => [Temperature, Radio, Orbs],
            Self::TheTwins => [Temperature, Radio, Emf],
            Self::Deogen => [Infrared, Writing, Radio],
            Self::Thaye => [Infrared, Writing, Orbs],
            Self::Yokai => [Infrared, Radio, Orbs],
            Self::Wraith => [Infrared, Radio, Emf],
            Self::Raiju => [Infrared, Orbs, Emf],
            Self::Mare => [Writing, Radio, Orbs],
            Self::Spirit => [Writing, Radio, Emf],
        };
        EvidenceSet::of(&kinds)
    }

    /// Exact match only; a superset of a signature is not a guess.
    pub fn from_signature(mask: EvidenceSet) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ghost| ghost.signature() == mask)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poltergeist => "poltergeist",
            Self::TheMimic => "the_mimic",
            Self::Hantu => "hantu",
            Self::Jinn => "jinn",
            Self::Phantom => "phantom",
            Self::Banshee => "banshee",
            Self::Goryo => "goryo",
            Self::Bullies => "bullies",
            Self::Myling => "myling",
            Self::Obake => "obake",
            Self::Yurei => "yurei",
            Self::Oni => "oni",
            Self::Moroi => "moroi",
            Self::Revenant => "revenant",
            Self::Shade => "shade",
            Self::Onryo => "onryo",
            Self::TheTwins => "the_twins",
            Self::Deogen => "deogen",
            Self::Thaye => "thaye",
            Self::Yokai => "yokai",
            Self::Wraith => "wraith",
            Self::Raiju => "raiju",
            Self::Mare => "mare",
            Self::Spirit => "spirit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ghost| ghost.as_str() == normalized)
    }
}

impl fmt::Display for GhostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Evidence,
    Bored,
    Afraid,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evidence => "evidence",
            Self::Bored => "bored",
            Self::Afraid => "afraid",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hunter,
    Ghost,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hunter => "hunter",
            Self::Ghost => "ghost",
        }
    }
}

/// Hunter as supplied by the roster collaborator; device and room are assigned later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HunterSpec {
    pub name: String,
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_ghost_signature_has_exactly_three_distinct_bits() {
        let mut seen = HashSet::new();
        for ghost in GhostType::ALL {
            let signature = ghost.signature();
            assert_eq!(signature.len(), 3, "{ghost} signature");
            assert!(seen.insert(signature), "{ghost} duplicates another signature");
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn from_signature_requires_exact_mask() {
        for ghost in GhostType::ALL {
            assert_eq!(GhostType::from_signature(ghost.signature()), Some(ghost));
        }
        let spirit_plus = GhostType::Spirit.signature().with(Evidence::Infrared);
        assert_eq!(GhostType::from_signature(spirit_plus), None);
        assert_eq!(GhostType::from_signature(EvidenceSet::EMPTY), None);
    }

    #[test]
    fn evidence_set_insert_and_remove_report_changes() {
        let mut set = EvidenceSet::EMPTY;
        assert!(set.insert(Evidence::Emf));
        assert!(!set.insert(Evidence::Emf));
        assert!(set.contains(Evidence::Emf));
        assert!(set.remove(Evidence::Emf));
        assert!(!set.remove(Evidence::Emf));
        assert!(set.is_empty());
    }

    #[test]
    fn superset_check_matches_bitwise_containment() {
        let collected = EvidenceSet::of(&[
            Evidence::Emf,
            Evidence::Orbs,
            Evidence::Radio,
            Evidence::Writing,
        ]);
        assert!(collected.is_superset_of(EvidenceSet::of(&[
            Evidence::Emf,
            Evidence::Orbs,
            Evidence::Radio
        ])));
        assert!(!collected.is_superset_of(GhostType::Poltergeist.signature()));
    }

    #[test]
    fn ghost_tokens_round_trip_through_parse() {
        for ghost in GhostType::ALL {
            assert_eq!(GhostType::parse(ghost.as_str()), Some(ghost));
        }
        assert_eq!(GhostType::parse(" The_Twins "), Some(GhostType::TheTwins));
        assert_eq!(GhostType::parse("casper"), None);
    }

    #[test]
    fn evidence_set_iterates_in_catalogue_order() {
        let set = EvidenceSet::of(&[Evidence::Infrared, Evidence::Emf, Evidence::Writing]);
        let items: Vec<Evidence> = set.iter().collect();
        assert_eq!(
            items,
            vec![Evidence::Emf, Evidence::Writing, Evidence::Infrared]
        );
    }
}
