// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The transposition table, which memoizes search results for individual positions.
//!
//! Despite the combinatorial explosion of possible positions of a Chess board, it is often the
//! case that there are many sequences of moves that lead to the same position. Borrowing from
//! Chess parlance, these are called "transpositions". The purpose of the transposition table is
//! to encode this intuition into a shared memory of positions that have already been searched.
//!
//! Unlike a full PV/Cut/All-node table, entries here are a plain `(depth, score)` pair: a probe
//! only returns a hit when the stored entry was searched to at least the requested depth, and a
//! store always replaces whatever was there before. This is simpler than tracking node bounds,
//! at the cost of occasionally discarding a deeper result in favor of the most recent one at the
//! same depth.

use chashmap::CHashMap;

use crate::core::Move;
use crate::eval::Value;
use crate::position::Position;

#[derive(Copy, Clone, Debug)]
pub struct TableEntry {
    pub depth: u32,
    pub score: Value,
    pub best_move: Option<Move>,
}

struct Table {
    map: CHashMap<u64, TableEntry>,
}

impl Table {
    fn new() -> Table {
        Table {
            map: CHashMap::new(),
        }
    }

    fn store(&self, hash: u64, depth: u32, score: Value, best_move: Option<Move>) {
        self.map.insert(
            hash,
            TableEntry {
                depth,
                score,
                best_move,
            },
        );
    }

    fn probe(&self, hash: u64, depth: u32) -> Option<TableEntry> {
        self.map
            .get(&hash)
            .filter(|entry| entry.depth >= depth)
            .map(|entry| *entry)
    }

    fn best_move(&self, hash: u64) -> Option<Move> {
        self.map.get(&hash).and_then(|entry| entry.best_move)
    }

    fn clear(&self) {
        self.map.clear();
    }
}

lazy_static::lazy_static! {
    static ref TABLE: Table = Table::new();
}

pub fn clear() {
    TABLE.clear();
}

/// Stores a search result for `hash`, unconditionally replacing whatever was previously stored.
pub fn store(hash: u64, depth: u32, score: Value, best_move: Option<Move>) {
    TABLE.store(hash, depth, score, best_move);
}

/// Returns the stored entry for `hash` if it was searched to at least `depth`.
pub fn probe(hash: u64, depth: u32) -> Option<TableEntry> {
    TABLE.probe(hash, depth)
}

/// Looks up the principal variation starting from `pos`, following stored best moves as deep as
/// the table remembers them (bounded by `depth`).
pub fn get_pv(pos: &Position, depth: u32) -> Vec<Move> {
    let mut pv = vec![];
    let mut cursor = pos.clone();
    for _ in 0..depth {
        let best_move = match TABLE.best_move(cursor.zobrist_hash()) {
            Some(mov) => mov,
            None => break,
        };
        if !cursor.is_legal(best_move) {
            break;
        }
        pv.push(best_move);
        cursor.make_move(best_move);
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{E2, E4};

    #[test]
    fn store_then_probe_at_same_depth_hits() {
        clear();
        let hash = 0xabcd_ef01_2345_6789;
        store(hash, 4, Value::new(15), Some(Move::quiet(E2, E4)));
        let entry = probe(hash, 4).expect("entry should be present");
        assert_eq!(4, entry.depth);
    }

    #[test]
    fn probe_at_greater_depth_misses() {
        clear();
        let hash = 0x1111_2222_3333_4444;
        store(hash, 2, Value::new(0), None);
        assert!(probe(hash, 5).is_none());
    }

    #[test]
    fn store_always_replaces() {
        clear();
        let hash = 0x5555_6666_7777_8888;
        store(hash, 10, Value::new(50), None);
        store(hash, 2, Value::new(-50), None);
        let entry = probe(hash, 2).unwrap();
        assert_eq!(2, entry.depth);
    }
}
