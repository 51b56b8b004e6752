use super::{House, RoomId};
use crate::error::LayoutError;

/// Room names in index order; index 0 is the van, the only exit.
pub const WILLOW_ROOMS: [&str; 13] = [
    "Van",
    "Hallway",
    "Master Bedroom",
    "Boy's Bedroom",
    "Bathroom",
    "Basement",
    "Basement Hallway",
    "Right Storage Room",
    "Left Storage Room",
    "Kitchen",
    "Living Room",
    "Garage",
    "Utility Room",
];

/// Undirected edges by room index. External log validators depend on this exact graph.
pub const WILLOW_CONNECTIONS: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (1, 3),
    (1, 4),
    (1, 9),
    (1, 5),
    (5, 6),
    (6, 7),
    (6, 8),
    (9, 10),
    (9, 11),
    (11, 12),
];

pub fn willow_house() -> Result<House, LayoutError> {
    let mut builder = House::builder();
    let ids = WILLOW_ROOMS
        .iter()
        .enumerate()
        .map(|(idx, name)| builder.add_room(name, idx == 0))
        .collect::<Result<Vec<RoomId>, _>>()?;
    for (a, b) in WILLOW_CONNECTIONS {
        builder.connect(ids[a], ids[b])?;
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor_names(house: &House, name: &str) -> Vec<String> {
        let id = house.find(name).expect("room exists");
        let mut names: Vec<String> = house
            .room(id)
            .neighbors()
            .iter()
            .map(|neighbor| house.name_of(*neighbor).to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn willow_has_thirteen_rooms_and_van_exit() {
        let house = willow_house().expect("layout builds");
        assert_eq!(house.len(), 13);
        assert_eq!(house.name_of(house.exit()), "Van");
        assert_eq!(house.rooms().iter().filter(|room| room.is_exit()).count(), 1);
    }

    #[test]
    fn willow_connections_are_symmetric() {
        let house = willow_house().expect("layout builds");
        let mut edge_ends = 0;
        for room in house.rooms() {
            for neighbor in room.neighbors() {
                assert!(house.room(*neighbor).neighbors().contains(&room.id()));
                edge_ends += 1;
            }
        }
        assert_eq!(edge_ends, WILLOW_CONNECTIONS.len() * 2);
    }

    #[test]
    fn willow_adjacency_matches_floor_plan() {
        let house = willow_house().expect("layout builds");
        assert_eq!(neighbor_names(&house, "Van"), vec!["Hallway"]);
        assert_eq!(
            neighbor_names(&house, "Hallway"),
            vec![
                "Basement",
                "Bathroom",
                "Boy's Bedroom",
                "Kitchen",
                "Master Bedroom",
                "Van"
            ]
        );
        assert_eq!(
            neighbor_names(&house, "Basement Hallway"),
            vec!["Basement", "Left Storage Room", "Right Storage Room"]
        );
        assert_eq!(
            neighbor_names(&house, "Kitchen"),
            vec!["Garage", "Hallway", "Living Room"]
        );
        assert_eq!(neighbor_names(&house, "Utility Room"), vec!["Garage"]);
    }
}
