pub const TICK_MS: u64 = 100;

pub const MAX_ROOMS: usize = 24;
pub const MAX_ROOM_OCCUPANCY: usize = 8;
pub const MAX_CONNECTIONS: usize = 8;
pub const MAX_HUNTER_NAME: usize = 63;

pub const ENTITY_BOREDOM_MAX: u32 = 15;
pub const HUNTER_FEAR_MAX: u32 = 15;

/// Downstream log validators key on this id; do not change it.
pub const DEFAULT_GHOST_ID: i32 = 68057;

pub const AUDIT_RECORD_CAP: u32 = 100_000;

pub fn is_bored(boredom: u32) -> bool {
    boredom > ENTITY_BOREDOM_MAX
}

pub fn is_afraid(fear: u32) -> bool {
    fear > HUNTER_FEAR_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_trip_only_above_max() {
        assert!(!is_bored(ENTITY_BOREDOM_MAX));
        assert!(is_bored(ENTITY_BOREDOM_MAX + 1));
        assert!(!is_afraid(HUNTER_FEAR_MAX));
        assert!(is_afraid(HUNTER_FEAR_MAX + 1));
    }
}
