// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use lazy_static::lazy_static;
use rand::prelude::SliceRandom;
use serde::Deserialize;

const BOOK_STR: &str = include_str!("book.json");

lazy_static! {
    static ref BOOK: PositionNode =
        serde_json::from_str(BOOK_STR).expect("failed to deserialize book");
}

#[derive(Deserialize)]
struct PositionNode {
    #[serde(rename = "total")]
    _total: usize,
    moves: Vec<MoveNode>,
}

#[derive(Deserialize)]
struct MoveNode {
    #[serde(rename = "count")]
    _count: usize,
    #[serde(rename = "move")]
    mov: String,
    probability: f64,
    children: Option<PositionNode>,
}

pub fn query(sequence: &[String]) -> Option<String> {
    fn find_book_move<'a>(candidate: &str, book: &'a [MoveNode]) -> Option<&'a MoveNode> {
        for book_move in book {
            if candidate == book_move.mov {
                return Some(book_move);
            }
        }

        return None;
    }

    let mut cursor: &PositionNode = &*BOOK;
    for mov in sequence {
        let book_move = find_book_move(mov, &cursor.moves)?;
        cursor = book_move.children.as_ref()?;
    }

    if cursor.moves.is_empty() {
        return None;
    }

    let candidates: Vec<_> = cursor
        .moves
        .iter()
        .map(|node| (node.mov.clone(), node.probability))
        .collect();
    let (mov, _) = candidates
        .choose_weighted(&mut rand::thread_rng(), |i| i.1)
        .ok()?;
    Some(mov.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_returns_a_known_opening_move() {
        let mov = query(&[]).expect("book should have at least one opening move");
        assert!(!mov.is_empty());
    }

    #[test]
    fn unknown_move_falls_out_of_book() {
        let sequence = vec!["a1a1".to_string()];
        assert_eq!(None, query(&sequence));
    }
}
