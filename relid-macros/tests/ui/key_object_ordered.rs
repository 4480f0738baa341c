use relid_macros::key_object;
use std::collections::BTreeMap;

#[key_object(ordered = true)]
struct SeatKey {
    row: u64,
    seat: u64,
}

fn main() {
    // ordered = true 追加 PartialOrd/Ord：可作 BTreeMap 键
    let mut seats: BTreeMap<SeatKey, &str> = BTreeMap::new();
    seats.insert(SeatKey { row: 2, seat: 1 }, "b");
    seats.insert(SeatKey { row: 1, seat: 1 }, "a");

    let first = seats.keys().next().unwrap();
    assert_eq!(first.row, 1);
}
