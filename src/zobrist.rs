// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::core::{self, CastleStatus, Color, Direction, Move, Piece, PieceKind, Square};
use crate::position::Position;

struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    pub const fn new(seed: u64) -> Xorshift64 {
        Xorshift64 { state: seed }
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        self.state
    }
}

const SIDE_TO_MOVE_INDEX: usize = 768;
const CASTLING_RIGHTS_INDEX: usize = 769;
const EN_PASSANT_INDEX: usize = 773;

struct ZobristHasher {
    magic_hashes: [u64; 781],
}

impl ZobristHasher {
    pub fn new(seed: u64) -> ZobristHasher {
        let mut rng = Xorshift64::new(seed);
        let mut magic_hashes = [0; 781];
        for entry in magic_hashes.iter_mut() {
            *entry = rng.next();
        }

        ZobristHasher { magic_hashes }
    }

    pub fn square_hash(&self, kind: PieceKind, color: Color, square: Square) -> u64 {
        // The layout of this table is:
        // [square]
        //   0 white pawn hash
        //   1 white knight hash
        //   ...
        //   5 white king hash
        //   6 black pawn hash
        //   7 black knight hash
        //   ...
        //   11 black king hash
        //
        // So, the square base is 12 * square, since the table is laid out one
        // square after another.
        let offset: usize = 12 * square.as_u8() as usize;
        let color_offset: usize = if color == Color::White { 0 } else { 6 };
        let piece_offset = kind as usize;
        self.magic_hashes[(offset + color_offset + piece_offset) as usize]
    }

    pub fn side_to_move_hash(&self, side: Color) -> u64 {
        match side {
            Color::White => 0,
            Color::Black => self.magic_hashes[SIDE_TO_MOVE_INDEX],
        }
    }

    pub fn en_passant_hash(&self, square: Square) -> u64 {
        self.magic_hashes[square.file().as_u8() as usize + EN_PASSANT_INDEX]
    }

    fn castle_hash(&self, offset: usize) -> u64 {
        self.magic_hashes[offset + CASTLING_RIGHTS_INDEX]
    }
}

const ZOBRIST_SEED: u64 = 0xf68e34a4e8ccf09a;

lazy_static::lazy_static! {
    static ref ZOBRIST_HASHER: ZobristHasher = ZobristHasher::new(ZOBRIST_SEED);
}

pub fn modify_piece(hash: &mut u64, square: Square, piece: Piece) {
    *hash ^= ZOBRIST_HASHER.square_hash(piece.kind, piece.color, square);
}

pub fn modify_side_to_move(hash: &mut u64) {
    *hash ^= ZOBRIST_HASHER.side_to_move_hash(Color::Black);
}

pub fn modify_kingside_castle(hash: &mut u64, color: Color) {
    let offset = if color == Color::White { 0 } else { 2 };
    *hash ^= ZOBRIST_HASHER.castle_hash(offset);
}

pub fn modify_queenside_castle(hash: &mut u64, color: Color) {
    let offset = if color == Color::White { 1 } else { 3 };
    *hash ^= ZOBRIST_HASHER.castle_hash(offset);
}

pub fn modify_en_passant(hash: &mut u64, old: Option<Square>, new: Option<Square>) {
    match (old, new) {
        (Some(old), Some(new)) => {
            *hash ^= ZOBRIST_HASHER.en_passant_hash(old);
            *hash ^= ZOBRIST_HASHER.en_passant_hash(new);
        }
        (Some(sq), _) | (_, Some(sq)) => {
            *hash ^= ZOBRIST_HASHER.en_passant_hash(sq);
        }
        _ => {}
    }
}

fn modify_castle_status(hash: &mut u64, before: CastleStatus, after: CastleStatus) {
    for (color, kingside_bit, queenside_bit) in [
        (Color::White, CastleStatus::WHITE_KINGSIDE, CastleStatus::WHITE_QUEENSIDE),
        (Color::Black, CastleStatus::BLACK_KINGSIDE, CastleStatus::BLACK_QUEENSIDE),
    ] {
        if before.contains(kingside_bit) != after.contains(kingside_bit) {
            modify_kingside_castle(hash, color);
        }
        if before.contains(queenside_bit) != after.contains(queenside_bit) {
            modify_queenside_castle(hash, color);
        }
    }
}

/// The auxiliary state the search threads alongside its own hash, separately from whatever a
/// `Position` tracks internally, so that `incremental_hash` can be applied purely from the
/// previous ply's state without re-deriving it from the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZobristState {
    pub hash: u64,
    pub castle_status: CastleStatus,
    pub en_passant_square: Option<Square>,
}

/// Computes a Zobrist hash from scratch: XORs the piece hash for every occupied square, the
/// side-to-move hash if Black is on move, the hash for every castling right still held, and the
/// en passant file hash if a target square is set.
pub fn full_hash(pos: &Position) -> ZobristState {
    let mut hash = 0u64;
    for square in core::squares() {
        if let Some(piece) = pos.piece_at(square) {
            modify_piece(&mut hash, square, piece);
        }
    }
    if pos.side_to_move() == Color::Black {
        modify_side_to_move(&mut hash);
    }
    modify_castle_status(&mut hash, CastleStatus::empty(), pos.castle_status());
    modify_en_passant(&mut hash, None, pos.en_passant_square());
    ZobristState {
        hash,
        castle_status: pos.castle_status(),
        en_passant_square: pos.en_passant_square(),
    }
}

/// Updates a Zobrist hash incrementally across a single move, without re-scanning the board.
///
/// `moved_piece` is the piece that stood on `mov`'s source square before the move; `captured` is
/// the piece removed by the move, if any (the pawn taken en passant for en-passant captures, not
/// the now-empty destination square). `rook_move` carries the rook's `(from, to)` squares for
/// castling moves. `new_castle_status` and `new_en_passant` are the position's rights and target
/// square *after* the move has been applied.
#[allow(clippy::too_many_arguments)]
pub fn incremental_hash(
    previous: &ZobristState,
    mov: Move,
    moved_piece: Piece,
    captured: Option<Piece>,
    rook_move: Option<(Square, Square)>,
    new_castle_status: CastleStatus,
    new_en_passant: Option<Square>,
) -> ZobristState {
    let mut hash = previous.hash;

    modify_piece(&mut hash, mov.source(), moved_piece);
    let placed = if mov.is_promotion() {
        Piece {
            color: moved_piece.color,
            kind: mov.promotion_piece(),
        }
    } else {
        moved_piece
    };
    modify_piece(&mut hash, mov.destination(), placed);

    if let Some(captured_piece) = captured {
        let capture_square = if mov.is_en_passant() {
            let direction = match moved_piece.color {
                Color::White => Direction::South,
                Color::Black => Direction::North,
            };
            mov.destination().towards(direction)
        } else {
            mov.destination()
        };
        modify_piece(&mut hash, capture_square, captured_piece);
    }

    if let Some((rook_from, rook_to)) = rook_move {
        let rook = Piece {
            color: moved_piece.color,
            kind: PieceKind::Rook,
        };
        modify_piece(&mut hash, rook_from, rook);
        modify_piece(&mut hash, rook_to, rook);
    }

    modify_side_to_move(&mut hash);
    modify_castle_status(&mut hash, previous.castle_status, new_castle_status);
    modify_en_passant(&mut hash, previous.en_passant_square, new_en_passant);

    ZobristState {
        hash,
        castle_status: new_castle_status,
        en_passant_square: new_en_passant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn full_hash_matches_itself_across_equivalent_positions() {
        let a = Position::from_start_position();
        let b = Position::from_start_position();
        assert_eq!(full_hash(&a), full_hash(&b));
    }

    #[test]
    fn full_hash_differs_on_side_to_move() {
        let mut pos = Position::from_start_position();
        let before = full_hash(&pos);
        pos.push_uci("e2e4");
        let after = full_hash(&pos);
        assert_ne!(before.hash, after.hash);
    }

    #[test]
    fn incremental_hash_matches_full_hash_after_a_quiet_move() {
        let mut pos = Position::from_start_position();
        let before = full_hash(&pos);
        let mov = Move::double_pawn_push(core::E2, core::E4);
        let moved_piece = pos.piece_at(core::E2).unwrap();

        pos.push(mov);

        let incremental = incremental_hash(
            &before,
            mov,
            moved_piece,
            None,
            None,
            pos.castle_status(),
            pos.en_passant_square(),
        );
        assert_eq!(full_hash(&pos), incremental);
    }

    #[test]
    fn incremental_hash_matches_full_hash_after_a_capture() {
        let mut pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let before = full_hash(&pos);
        let mov = Move::capture(core::E4, core::D5);
        let moved_piece = pos.piece_at(core::E4).unwrap();
        let captured = pos.piece_at(core::D5);

        pos.push(mov);

        let incremental = incremental_hash(
            &before,
            mov,
            moved_piece,
            captured,
            None,
            pos.castle_status(),
            pos.en_passant_square(),
        );
        assert_eq!(full_hash(&pos), incremental);
    }
}
