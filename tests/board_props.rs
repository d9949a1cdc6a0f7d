use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use sonarstrike::{
    BoardError, Fleet, OpponentBoard, Orientation, BOARD_SIZE, NUM_SHIPS, PLACEMENT_ATTEMPTS, TOTAL_SHIP_CELLS,
};

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn randomized_fleet_never_overlaps(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        fleet.randomize(&mut rng, PLACEMENT_ATTEMPTS).unwrap();
        prop_assert!(fleet.all_placed());
        prop_assert_eq!(fleet.occupied().count_ones(), TOTAL_SHIP_CELLS);
        for ship in fleet.ships() {
            let pos = ship.position().unwrap();
            prop_assert!(sonarstrike::fits(ship.length(), pos.row, pos.col, ship.orientation()));
        }
    }

    #[test]
    fn random_placement_is_always_valid(seed in any::<u64>(), attempts in 0usize..8) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        for id in 1..=NUM_SHIPS as u8 {
            let p = fleet.random_placement(&mut rng, id, attempts).unwrap();
            let ship = *fleet.ship(id).unwrap();
            prop_assert!(fleet.is_valid_placement(&ship, p.position.row, p.position.col, p.orientation, Some(id)));
            fleet.place(id, p.position.row, p.position.col, p.orientation).unwrap();
        }
        prop_assert_eq!(fleet.occupied().count_ones(), TOTAL_SHIP_CELLS);
    }

    #[test]
    fn off_grid_placement_is_never_valid(
        id in 1u8..=5,
        row in 0usize..14,
        col in 0usize..14,
        orientation in orientation(),
    ) {
        let mut fleet = Fleet::new();
        let ship = *fleet.ship(id).unwrap();
        let fits = sonarstrike::fits(ship.length(), row, col, orientation);
        prop_assert_eq!(fleet.is_valid_placement(&ship, row, col, orientation, None), fits);
        if !fits {
            prop_assert_eq!(fleet.place(id, row, col, orientation), Err(BoardError::OutOfBounds));
            prop_assert!(!fleet.ship(id).unwrap().is_placed());
        }
    }

    #[test]
    fn overlap_is_rejected_in_either_order(
        (a, b) in (1u8..=5, 1u8..=5).prop_filter("distinct ships", |(a, b)| a != b),
        a_at in (0usize..10, 0usize..10, orientation()),
        b_at in (0usize..10, 0usize..10, orientation()),
    ) {
        let mut only_a = Fleet::new();
        prop_assume!(only_a.place(a, a_at.0, a_at.1, a_at.2).is_ok());
        let mut only_b = Fleet::new();
        prop_assume!(only_b.place(b, b_at.0, b_at.1, b_at.2).is_ok());

        let ship_a = *only_a.ship(a).unwrap();
        let ship_b = *only_b.ship(b).unwrap();
        let b_after_a = only_a.is_valid_placement(&ship_b, b_at.0, b_at.1, b_at.2, None);
        let a_after_b = only_b.is_valid_placement(&ship_a, a_at.0, a_at.1, a_at.2, None);
        let overlapping = ship_a.mask().unwrap().intersects(&ship_b.mask().unwrap());
        prop_assert_eq!(b_after_a, a_after_b);
        prop_assert_eq!(b_after_a, !overlapping);
    }

    #[test]
    fn rejected_placement_leaves_fleet_untouched(
        seed in any::<u64>(),
        id in 1u8..=5,
        row in 0usize..12,
        col in 0usize..12,
        orientation in orientation(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        fleet.randomize(&mut rng, PLACEMENT_ATTEMPTS).unwrap();
        let before = fleet.clone();
        match fleet.place(id, row, col, orientation) {
            Ok(()) => {
                let ship = fleet.ship(id).unwrap();
                prop_assert_eq!(ship.position().map(|p| (p.row, p.col)), Some((row, col)));
                prop_assert_eq!(fleet.occupied().count_ones(), TOTAL_SHIP_CELLS);
            }
            Err(_) => prop_assert_eq!(fleet, before),
        }
    }

    #[test]
    fn own_layout_is_a_legal_opponent_board(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::new();
        fleet.randomize(&mut rng, PLACEMENT_ATTEMPTS).unwrap();
        let board = OpponentBoard::from_layout(fleet.layout().unwrap()).unwrap();
        prop_assert_eq!(board.occupied(), fleet.occupied());

        // Local evaluation agrees with the owner's own shot handling.
        let mut fired = sonarstrike::CellMask::new();
        for _ in 0..30 {
            let r = rng.random_range(0..BOARD_SIZE as usize);
            let c = rng.random_range(0..BOARD_SIZE as usize);
            fired.set(r, c).unwrap();
            let theirs = fleet.receive_shot(r, c).unwrap();
            prop_assert_eq!(board.evaluate(r, c, &fired), theirs);
        }
    }
}
