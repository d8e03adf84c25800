use gesture_lock::{
    locate, GestureSequence, GridCell, MemoryStore, Outcome, PatternSession, WorkflowState,
    MIN_PATTERN_LEN,
};
use proptest::prelude::*;

fn any_cell() -> impl Strategy<Value = GridCell> {
    (0u8..9).prop_map(|digit| GridCell::from_digit(digit).unwrap())
}

/// Offset strictly inside a cell square, as a fraction of the diameter
fn inside_offset() -> impl Strategy<Value = f64> {
    -0.49f64..0.49
}

proptest! {
    #[test]
    fn prop_points_inside_a_cell_hit_it(
        cell in any_cell(),
        dx in inside_offset(),
        dy in inside_offset(),
        diameter in 8.0f64..120.0,
    ) {
        let x = (f64::from(cell.column()) * 2.0 + 1.0 + dx) * diameter;
        let y = (f64::from(cell.row()) * 2.0 + 1.0 + dy) * diameter;
        prop_assert_eq!(locate(x, y, diameter), Some(cell));
    }

    #[test]
    fn prop_points_in_gaps_miss(
        gap in 0u8..4,
        along in 0.0f64..6.0,
        frac in 0.01f64..0.99,
        diameter in 8.0f64..120.0,
        vertical in any::<bool>(),
    ) {
        // Gap bands: [0, 0.5), [1.5, 2.5), [3.5, 4.5), [5.5, 6.0) diameters
        let (start, width) = match gap {
            0 => (0.0, 0.5),
            3 => (5.5, 0.5),
            g => (f64::from(g) * 2.0 - 0.5, 1.0),
        };
        let across = (start + frac * width) * diameter;
        let along = along * diameter;
        let (x, y) = if vertical { (across, along) } else { (along, across) };
        prop_assert_eq!(locate(x, y, diameter), None);
    }

    #[test]
    fn prop_sequence_never_repeats_cells(visits in prop::collection::vec(any_cell(), 0..40)) {
        let mut session = PatternSession::new(MemoryStore::new());
        let mut iter = visits.iter().copied();
        session.on_gesture_start(iter.next());
        for cell in iter {
            session.on_gesture_move(Some(cell));
        }

        let cells = session.sequence().cells();
        prop_assert!(cells.len() <= 9);
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
        prop_assert!(session.sequence().code().len() <= 9);
    }

    #[test]
    fn prop_short_first_entries_never_advance(
        attempts in prop::collection::vec(
            prop::collection::vec(any_cell(), 0..MIN_PATTERN_LEN),
            1..10,
        )
    ) {
        let mut session = PatternSession::new(MemoryStore::new());
        for attempt in attempts {
            let sequence: GestureSequence = attempt.into_iter().collect();
            let mut cells = sequence.cells().iter().copied();
            session.on_gesture_start(cells.next());
            for cell in cells {
                session.on_gesture_move(Some(cell));
            }
            prop_assert_eq!(session.on_gesture_end().unwrap(), Outcome::TooShort);
            prop_assert_eq!(session.state(), &WorkflowState::AwaitingFirstEntry);
        }
    }

    #[test]
    fn prop_code_is_deterministic_and_order_sensitive(
        a in prop::collection::vec(any_cell(), 0..12),
        b in prop::collection::vec(any_cell(), 0..12),
    ) {
        let a: GestureSequence = a.into_iter().collect();
        let b: GestureSequence = b.into_iter().collect();

        prop_assert_eq!(a.code(), a.clone().code());
        prop_assert_eq!(a.code() == b.code(), a.cells() == b.cells());
    }
}
