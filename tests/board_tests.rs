use rand::rngs::SmallRng;
use rand::SeedableRng;
use sonarstrike::{
    materialize, BoardError, BoardLayout, Cell, Fleet, GuessResult, OpponentBoard, Orientation,
    ShipTuple, NUM_SHIPS, PLACEMENT_ATTEMPTS, SHIPS, TOTAL_SHIP_CELLS,
};

fn placed_fleet(seed: u64) -> Fleet {
    let mut fleet = Fleet::new();
    let mut rng = SmallRng::seed_from_u64(seed);
    fleet.randomize(&mut rng, PLACEMENT_ATTEMPTS).unwrap();
    fleet
}

#[test]
fn test_new_fleet_is_unplaced() {
    let fleet = Fleet::new();
    assert_eq!(fleet.ships().len(), NUM_SHIPS);
    assert!(!fleet.all_placed());
    let ids: Vec<_> = fleet.ships().iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(fleet.layout().unwrap_err(), BoardError::ShipsUnplaced);
}

#[test]
fn test_placement_bounds_and_overlap() {
    let mut fleet = Fleet::new();
    assert_eq!(
        fleet.place(1, 6, 0, Orientation::Vertical).unwrap_err(),
        BoardError::OutOfBounds
    );
    fleet.place(1, 0, 0, Orientation::Horizontal).unwrap();
    assert_eq!(
        fleet.place(2, 0, 4, Orientation::Vertical).unwrap_err(),
        BoardError::Overlaps
    );
    assert_eq!(fleet.place(9, 0, 0, Orientation::Vertical).unwrap_err(), BoardError::InvalidShip(9));
    // A ship may be moved onto cells it currently covers.
    fleet.place(1, 0, 1, Orientation::Horizontal).unwrap();
    let carrier = fleet.ship(1).unwrap();
    assert!(carrier.contains(0, 5));
    assert!(!carrier.contains(0, 0));
}

#[test]
fn test_is_valid_placement_excludes_self() {
    let mut fleet = Fleet::new();
    fleet.place(2, 3, 3, Orientation::Vertical).unwrap();
    let battleship = *fleet.ship(2).unwrap();
    assert!(!fleet.is_valid_placement(&battleship, 4, 3, Orientation::Vertical, None));
    assert!(fleet.is_valid_placement(&battleship, 4, 3, Orientation::Vertical, Some(2)));
}

#[test]
fn test_randomize_places_whole_fleet() {
    let fleet = placed_fleet(42);
    assert!(fleet.all_placed());
    assert_eq!(fleet.occupied().count_ones(), TOTAL_SHIP_CELLS);
    let layout = fleet.layout().unwrap();
    assert_eq!(layout.len(), NUM_SHIPS);
    for (tuple, def) in layout.ships().iter().zip(SHIPS.iter()) {
        assert_eq!(tuple.length as usize, def.length());
        assert!(tuple.in_bounds());
    }
}

#[test]
fn test_random_placement_falls_back_to_scan() {
    // With zero sampling draws the exhaustive scan must still find a spot.
    let fleet = Fleet::new();
    let mut rng = SmallRng::seed_from_u64(3);
    let p = fleet.random_placement(&mut rng, 1, 0).unwrap();
    assert!(sonarstrike::fits(5, p.position.row, p.position.col, p.orientation));
}

#[test]
fn test_random_placement_rejects_unknown_ship() {
    let mut fleet = Fleet::new();
    fleet.place(1, 0, 0, Orientation::Horizontal).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);
    assert_eq!(
        fleet.random_placement(&mut rng, 7, PLACEMENT_ATTEMPTS).unwrap_err(),
        BoardError::InvalidShip(7)
    );
}

#[test]
fn test_receive_shot_hits_and_sinks() {
    let mut fleet = Fleet::new();
    fleet.place(5, 4, 4, Orientation::Horizontal).unwrap();
    assert_eq!(fleet.receive_shot(0, 0).unwrap(), GuessResult::Miss);
    assert_eq!(fleet.receive_shot(4, 4).unwrap(), GuessResult::Hit);
    assert_eq!(fleet.receive_shot(4, 5).unwrap(), GuessResult::Sink("Destroyer"));
    // Repeated shots report the same outcome and do not fail.
    assert_eq!(fleet.receive_shot(4, 5).unwrap(), GuessResult::Sink("Destroyer"));
    assert!(fleet.receive_shot(10, 0).is_err());
    assert_eq!(fleet.shots_taken().count_ones(), 3);
}

#[test]
fn test_all_sunk_requires_every_cell() {
    let mut fleet = placed_fleet(11);
    let cells: Vec<_> = fleet.occupied().iter_set_bits().collect();
    let (last, rest) = cells.split_last().unwrap();
    for &(r, c) in rest {
        fleet.receive_shot(r, c).unwrap();
    }
    assert!(!fleet.all_sunk());
    fleet.receive_shot(last.0, last.1).unwrap();
    assert!(fleet.all_sunk());
}

#[test]
fn test_materialize_marks_ship_cells() {
    let layout = BoardLayout::new(vec![
        ShipTuple::new(Orientation::Vertical, 3, 2, 1),
        ShipTuple::new(Orientation::Horizontal, 2, 0, 9),
    ]);
    let grid = materialize(&layout).unwrap();
    assert_eq!(grid[1][2], Cell::Ship);
    assert_eq!(grid[3][2], Cell::Ship);
    assert_eq!(grid[4][2], Cell::Empty);
    assert_eq!(grid[9][1], Cell::Ship);
    let cells = grid.iter().flatten().filter(|c| **c == Cell::Ship).count();
    assert_eq!(cells, 5);

    let off = BoardLayout::new(vec![ShipTuple::new(Orientation::Horizontal, 5, 6, 0)]);
    assert_eq!(materialize(&off).unwrap_err(), BoardError::OutOfBounds);
}

#[test]
fn test_opponent_board_validation() {
    let layout = placed_fleet(8).layout().unwrap();
    let board = OpponentBoard::from_layout(layout.clone()).unwrap();
    assert_eq!(board.occupied().count_ones(), TOTAL_SHIP_CELLS);

    let short: BoardLayout = layout.ships().iter().take(4).copied().collect();
    assert_eq!(
        OpponentBoard::from_layout(short).unwrap_err(),
        BoardError::IncompleteLayout { expected: 5, got: 4 }
    );

    let mut ships = layout.ships().to_vec();
    ships[1] = ships[0];
    ships[1].length = 4;
    assert_eq!(
        OpponentBoard::from_layout(BoardLayout::new(ships)).unwrap_err(),
        BoardError::Overlaps
    );
}

#[test]
fn test_opponent_board_evaluate() {
    let layout = BoardLayout::new(vec![
        ShipTuple::new(Orientation::Horizontal, 5, 0, 0),
        ShipTuple::new(Orientation::Horizontal, 4, 0, 2),
        ShipTuple::new(Orientation::Horizontal, 3, 0, 4),
        ShipTuple::new(Orientation::Horizontal, 3, 0, 6),
        ShipTuple::new(Orientation::Vertical, 2, 9, 8),
    ]);
    let board = OpponentBoard::from_layout(layout).unwrap();
    assert!(board.is_occupied(9, 9));
    assert_eq!(board.grid()[9][9], Cell::Ship);
    assert_eq!(board.grid()[9][8], Cell::Empty);
    let mut fired = sonarstrike::CellMask::new();
    fired.set(8, 9).unwrap();
    assert_eq!(board.evaluate(8, 9, &fired), GuessResult::Hit);
    fired.set(9, 9).unwrap();
    assert_eq!(board.evaluate(9, 9, &fired), GuessResult::Sink("Destroyer"));
    assert_eq!(board.evaluate(5, 5, &fired), GuessResult::Miss);
    assert!(!board.all_sunk(&fired));
}

#[test]
fn test_opponent_board_names_sinks_by_length() {
    // Destroyer first, carrier last.
    let layout = BoardLayout::new(vec![
        ShipTuple::new(Orientation::Horizontal, 2, 0, 0),
        ShipTuple::new(Orientation::Horizontal, 3, 0, 2),
        ShipTuple::new(Orientation::Horizontal, 4, 0, 4),
        ShipTuple::new(Orientation::Horizontal, 3, 0, 6),
        ShipTuple::new(Orientation::Horizontal, 5, 0, 8),
    ]);
    let board = OpponentBoard::from_layout(layout).unwrap();
    let mut fired = sonarstrike::CellMask::new();
    fired.set(0, 0).unwrap();
    assert_eq!(board.evaluate(0, 0, &fired), GuessResult::Hit);
    fired.set(0, 1).unwrap();
    assert_eq!(board.evaluate(0, 1, &fired), GuessResult::Sink("Destroyer"));

    // The two 3-cell ships are named in order of appearance.
    let sink_row = |row: usize, len: usize| {
        let mut fired = sonarstrike::CellMask::new();
        for c in 0..len {
            fired.set(row, c).unwrap();
        }
        board.evaluate(row, len - 1, &fired)
    };
    assert_eq!(sink_row(2, 3), GuessResult::Sink("Cruiser"));
    assert_eq!(sink_row(4, 4), GuessResult::Sink("Battleship"));
    assert_eq!(sink_row(6, 3), GuessResult::Sink("Submarine"));
    assert_eq!(sink_row(8, 5), GuessResult::Sink("Carrier"));
}

#[test]
fn test_opponent_board_rejects_wrong_fleet() {
    let destroyers: BoardLayout = (0..NUM_SHIPS as u8)
        .map(|i| ShipTuple::new(Orientation::Horizontal, 2, 0, i * 2))
        .collect();
    assert_eq!(
        OpponentBoard::from_layout(destroyers).unwrap_err(),
        BoardError::UnexpectedShipLength(2)
    );

    let mut ships = placed_fleet(3).layout().unwrap().ships().to_vec();
    ships.swap(0, 4);
    let reordered = OpponentBoard::from_layout(BoardLayout::new(ships.clone())).unwrap();
    assert_eq!(reordered.occupied().count_ones(), TOTAL_SHIP_CELLS);

    let mut long = ships;
    long[0].length = 6;
    assert!(OpponentBoard::from_layout(BoardLayout::new(long)).is_err());
}
