// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Principal-variation search: iterative deepening over a negamax alpha-beta core, backed by the
//! transposition table, the position's own incrementally-maintained Zobrist hash, and composite
//! move ordering.
//!
//! The core loop is textbook negamax with fail-soft alpha-beta, a quiescence search at the
//! horizon to avoid the horizon effect on captures, and three standard pruning techniques gated
//! behind [`config::SearcherConfig`](crate::config::SearcherConfig) flags: null-move pruning,
//! futility pruning, and delta pruning in quiescence. Iterative deepening drives the whole thing,
//! re-searching from depth 1 upward so that a time-limited search always has a usable result from
//! the last fully-completed depth, and so the transposition table and history heuristic are warm
//! for each deeper pass.

pub mod heuristics;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::{Color, Move, PieceKind};
use crate::eval::{self, Value};
use crate::position::Position;
use crate::statistics::{NodeType, PruningType, Statistics};
use crate::table;
use crate::tracing::constants;

use heuristics::{order_moves, CompositeWeights, History, Killer, MvvLva};

/// Null-move reduction: depth is cut by this much (plus one for the null move itself) when
/// probing whether the position is so good that even skipping a turn doesn't lose it.
const NULL_MOVE_REDUCTION: u32 = 2;

/// Minimum depth at which null-move pruning is attempted; below this the reduction would search
/// a negative or zero depth, which makes no sense.
const NULL_MOVE_MIN_DEPTH: u32 = 3;

/// Maximum depth at which futility pruning is attempted, and the depth scale of its margin.
const FUTILITY_MAX_DEPTH: u32 = 3;

/// Maximum remaining depth for quiescence search, counted down from the `depth == 0` horizon.
const Q_MAX: u32 = 4;

/// Options for a single `go` search.
pub struct SearchOptions<'a> {
    /// Maximum amount of time to dedicate to this search.
    pub time_limit: Option<Duration>,

    /// Maximum amount of nodes to evaluate.
    pub node_limit: Option<u64>,

    /// Reference to a hard stop flag, which (if set) should immediately terminate the search.
    pub hard_stop: Option<&'a AtomicBool>,

    /// Maximum depth to search, used as the ceiling for iterative deepening.
    pub depth: u32,

    pub enable_null_move: bool,
    pub enable_futility: bool,
    pub enable_delta: bool,
    pub enable_aspiration: bool,
    pub move_order_weights: CompositeWeights,
}

impl<'a> Default for SearchOptions<'a> {
    fn default() -> Self {
        SearchOptions {
            time_limit: None,
            node_limit: None,
            hard_stop: None,
            depth: 64,
            enable_null_move: true,
            enable_futility: true,
            enable_delta: true,
            enable_aspiration: true,
            move_order_weights: CompositeWeights::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub best_score: Value,
    pub depth: u32,
    pub nodes_evaluated: u64,
    pub principal_variation: Vec<Move>,
}

/// RAII guard around `Position::push`/`pop`, so a search that bails out early (a timeout, a node
/// limit, a propagated panic) always leaves the position at the depth it started from. Nothing
/// currently panics mid-search, but the guard makes that an invariant rather than a convention.
struct PushGuard<'a> {
    pos: &'a mut Position,
}

impl<'a> PushGuard<'a> {
    fn new(pos: &'a mut Position, mov: Move) -> PushGuard<'a> {
        pos.push(mov);
        PushGuard { pos }
    }
}

impl<'a> Drop for PushGuard<'a> {
    fn drop(&mut self) {
        self.pos.pop();
    }
}

struct Searcher<'a, 'b> {
    search_start_time: Instant,
    nodes_evaluated: u64,
    options: &'a SearchOptions<'b>,
    stats: Statistics,
    killer: Killer,
    history: History,
    mvv_lva: MvvLva,
}

impl<'a: 'b, 'b> Searcher<'a, 'b> {
    fn new(options: &'a SearchOptions) -> Searcher<'a, 'b> {
        Searcher {
            nodes_evaluated: 0,
            search_start_time: Instant::now(),
            options,
            stats: Statistics::new(),
            killer: Killer::new(options.depth as usize + 1),
            history: History::new(),
            mvv_lva: MvvLva,
        }
    }

    /// Iterative deepening driver: searches depth 1, 2, 3, ... up to `options.depth`, stopping
    /// early if time runs out. The previous iteration's best move becomes this iteration's hash
    /// move, and aspiration windows narrow the alpha-beta bounds around the previous score once
    /// one is available.
    fn iterative_deepening(&mut self, pos: &mut Position) -> SearchResult {
        let search_span = tracing::span!(tracing::Level::DEBUG, constants::SEARCH, pos = %pos.fen());
        let _search_guard = search_span.enter();

        let mut result = None;
        let mut previous_score = Value::new(0);

        for depth in 1..=self.options.depth {
            if depth > 1 && !self.can_continue_search() {
                tracing::event!(tracing::Level::DEBUG, name = constants::SEARCH_TERMINATION);
                break;
            }

            let depth_span = tracing::span!(
                tracing::Level::DEBUG,
                constants::SEARCH_WITH_DEPTH,
                depth = depth,
                pos = %pos.fen()
            );
            let _depth_guard = depth_span.enter();

            let root_score = if self.options.enable_aspiration && depth > 1 {
                self.aspiration_search(pos, depth, previous_score)
            } else {
                self.search_root(pos, depth, Value::mated_in(1), Value::mate_in(1))
            };

            let Some((score, best_move)) = root_score else {
                break;
            };

            previous_score = score;
            let principal_variation = table::get_pv(pos, depth);
            always!(
                "info depth {} score cp {} nodes {} pv {}",
                depth,
                score.centipawns(),
                self.nodes_evaluated,
                principal_variation
                    .iter()
                    .map(|m| m.as_uci())
                    .collect::<Vec<_>>()
                    .join(" ")
            );

            result = Some(SearchResult {
                best_move,
                best_score: score,
                depth,
                nodes_evaluated: self.nodes_evaluated,
                principal_variation,
            });
        }

        result.unwrap_or_else(|| {
            let mut moves = pos.legal_moves();
            order_moves(
                pos,
                &mut moves,
                0,
                None,
                &self.killer,
                &self.history,
                self.options.move_order_weights,
                &self.mvv_lva,
            );
            SearchResult {
                best_move: moves.first().copied().unwrap_or_else(Move::null),
                best_score: eval::evaluate(pos),
                depth: 0,
                nodes_evaluated: self.nodes_evaluated,
                principal_variation: vec![],
            }
        })
    }

    /// Repeatedly widens a narrow window around `previous_score` until the root search lands
    /// strictly inside it, falling back to a full-width search if the window never holds.
    fn aspiration_search(
        &mut self,
        pos: &mut Position,
        depth: u32,
        previous_score: Value,
    ) -> Option<(Value, Move)> {
        let half_window = heuristics::piece_value(PieceKind::Pawn);
        let mut alpha = previous_score - half_window as i16;
        let mut beta = previous_score + half_window as i16;
        let mut widened = half_window;

        loop {
            let result = self.search_root(pos, depth, alpha, beta)?;
            let (score, _) = result;

            if score <= alpha {
                alpha = Value::mated_in(1);
            } else if score >= beta {
                beta = Value::mate_in(1);
            } else {
                return Some(result);
            }

            if widened > heuristics::piece_value(PieceKind::Queen) * 4 {
                return self.search_root(pos, depth, Value::mated_in(1), Value::mate_in(1));
            }
            widened *= 2;
        }
    }

    fn search_root(
        &mut self,
        pos: &mut Position,
        depth: u32,
        mut alpha: Value,
        beta: Value,
    ) -> Option<(Value, Move)> {
        let hash = pos.zobrist_hash();
        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return None;
        }

        let hash_move = table::probe(hash, depth).and_then(|e| e.best_move);
        order_moves(
            pos,
            &mut moves,
            0,
            hash_move,
            &self.killer,
            &self.history,
            self.options.move_order_weights,
            &self.mvv_lva,
        );

        let mut best_move = moves[0];
        let mut best_score = Value::mated_in(1);

        for mov in moves {
            let guard = PushGuard::new(pos, mov);
            let score = -self.negamax(guard.pos, depth - 1, -beta, -alpha, 1);
            drop(guard);

            if !self.can_continue_search() {
                return None;
            }

            if score > best_score {
                best_score = score;
                best_move = mov;
            }
            if score > alpha {
                alpha = score;
            }
        }

        table::store(hash, depth, best_score, Some(best_move));
        Some((best_score, best_move))
    }

    fn negamax(
        &mut self,
        pos: &mut Position,
        depth: u32,
        mut alpha: Value,
        beta: Value,
        ply: usize,
    ) -> Value {
        if !self.can_continue_search() {
            return alpha;
        }

        self.stats.record_node(NodeType::Negamax);
        self.nodes_evaluated += 1;

        let in_check = pos.is_check(pos.side_to_move());
        if depth == 0 && !in_check {
            return self.quiescence(pos, Q_MAX, alpha, beta);
        }
        let depth = if in_check { depth.max(1) } else { depth };

        let hash = pos.zobrist_hash();
        if let Some(entry) = table::probe(hash, depth) {
            self.stats.record_transposition_hit();
            if entry.score >= beta {
                return entry.score;
            }
        }
        let hash_move = table::probe(hash, depth).and_then(|e| e.best_move);

        if self.options.enable_null_move
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && has_non_pawn_material(pos, pos.side_to_move())
        {
            pos.push(Move::null());
            // Value::add's debug_assert requires its receiver to sit strictly inside the mate
            // bounds, which a full-width `beta` at the root (e.g. `Value::mate_in(1)`) violates;
            // build the null window from raw centipawns instead of through `Value`'s arithmetic.
            let null_beta = Value::new(-beta.centipawns() + 1);
            let score = -self.negamax(
                pos,
                depth - 1 - NULL_MOVE_REDUCTION,
                -beta,
                null_beta,
                ply + 1,
            );
            pos.pop();
            if score >= beta {
                self.stats.record_pruning(PruningType::NullMove);
                return beta;
            }
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return if in_check {
                Value::mated_in((ply as i16).min(49))
            } else {
                Value::new(0)
            };
        }

        order_moves(
            pos,
            &mut moves,
            ply,
            hash_move,
            &self.killer,
            &self.history,
            self.options.move_order_weights,
            &self.mvv_lva,
        );

        let static_eval = eval::evaluate(pos);
        let mut best_score = Value::mated_in(1);
        let mut best_move = moves[0];

        for mov in moves {
            let is_quiet = !mov.is_capture() && !mov.is_promotion();

            let futility_margin = depth as i32 * heuristics::piece_value(PieceKind::Pawn) / 2;
            if self.options.enable_futility
                && depth <= FUTILITY_MAX_DEPTH
                && is_quiet
                && !in_check
                && static_eval + futility_margin as i16 <= alpha
            {
                self.stats.record_pruning(PruningType::Futility);
                continue;
            }

            let guard = PushGuard::new(pos, mov);
            let score = -self.negamax(guard.pos, depth - 1, -beta, -alpha, ply + 1);
            drop(guard);

            if !self.can_continue_search() {
                return alpha;
            }

            if score > best_score {
                best_score = score;
                best_move = mov;
            }

            if score >= beta {
                self.stats.record_pruning(PruningType::AlphaBeta);
                if is_quiet {
                    self.killer.record(ply, mov);
                    self.history.record(mov, depth);
                }
                table::store(hash, depth, beta, Some(mov));
                return beta;
            }

            if score > alpha {
                alpha = score;
            }
        }

        table::store(hash, depth, best_score, Some(best_move));
        best_score
    }

    /// Extends search along capturing lines past the nominal horizon, so the static evaluator
    /// never has to judge a position where material is hanging mid-capture-sequence. `depth`
    /// counts down from [`Q_MAX`] and caps how many plies of captures are explored; at 0 the
    /// position is judged by the static evaluator alone, same as `minimax.py`'s quiescence search.
    fn quiescence(&mut self, pos: &mut Position, depth: u32, mut alpha: Value, beta: Value) -> Value {
        self.stats.record_node(NodeType::Quiescence);
        self.nodes_evaluated += 1;

        if depth == 0 {
            return eval::evaluate(pos);
        }

        let hash = pos.zobrist_hash();
        if let Some(entry) = table::probe(hash, 0) {
            return entry.score;
        }

        let stand_pat = eval::evaluate(pos);
        if stand_pat >= beta {
            table::store(hash, 0, beta, None);
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = pos.legal_moves();
        moves.retain(|m| m.is_capture() || m.is_promotion());
        order_moves(
            pos,
            &mut moves,
            0,
            None,
            &self.killer,
            &self.history,
            self.options.move_order_weights,
            &self.mvv_lva,
        );

        let mut best_move = None;

        for mov in moves {
            if self.options.enable_delta && !in_delta_window(pos, mov, stand_pat, alpha) {
                self.stats.record_pruning(PruningType::Delta);
                continue;
            }

            if !self.can_continue_search() {
                return alpha;
            }

            let guard = PushGuard::new(pos, mov);
            let score = -self.quiescence(guard.pos, depth - 1, -beta, -alpha);
            drop(guard);

            if score >= beta {
                table::store(hash, 0, beta, Some(mov));
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = Some(mov);
            }
        }

        table::store(hash, 0, alpha, best_move);
        alpha
    }

    fn can_continue_search(&self) -> bool {
        if let Some(limit) = self.options.time_limit {
            if Instant::now().saturating_duration_since(self.search_start_time) > limit {
                return false;
            }
        }

        if let Some(limit) = self.options.node_limit {
            if self.nodes_evaluated > limit {
                return false;
            }
        }

        if let Some(ptr) = self.options.hard_stop {
            if ptr.load(Ordering::Acquire) {
                return false;
            }
        }

        true
    }
}

/// Margin-checked guard for quiescence delta pruning: a capture that can't possibly close the gap
/// to `alpha` even in the best case (winning the captured piece outright, plus a safety margin for
/// promotions) is skipped without being searched.
fn in_delta_window(pos: &Position, mov: Move, stand_pat: Value, alpha: Value) -> bool {
    let captured_value = if mov.is_en_passant() {
        heuristics::piece_value(PieceKind::Pawn)
    } else {
        match pos.piece_at(mov.destination()) {
            Some(piece) => heuristics::piece_value(piece.kind),
            None => 0,
        }
    };

    let promotion_bonus = if mov.is_promotion() {
        heuristics::piece_value(mov.promotion_piece()) - heuristics::piece_value(PieceKind::Pawn)
    } else {
        0
    };

    let margin = eval::delta();
    stand_pat + (captured_value + promotion_bonus + margin) as i16 > alpha
}

fn has_non_pawn_material(pos: &Position, color: Color) -> bool {
    pos.pieces_of_kind(color, PieceKind::Knight).len() > 0
        || pos.pieces_of_kind(color, PieceKind::Bishop).len() > 0
        || pos.pieces_of_kind(color, PieceKind::Rook).len() > 0
        || pos.pieces_of_kind(color, PieceKind::Queen).len() > 0
}

/// Runs a search on a clone of `pos`, returning the best move found and supporting statistics.
/// Takes `&Position` rather than `&mut Position` so callers don't need to track push/pop
/// bookkeeping of their own; the search does all of its own mutation on its private clone.
pub fn search(pos: &Position, options: &SearchOptions) -> SearchResult {
    let mut working = pos.clone();
    Searcher::new(options).iterative_deepening(&mut working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn finds_mate_in_one() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let options = SearchOptions {
            depth: 3,
            ..SearchOptions::default()
        };
        let result = search(&pos, &options);
        assert!(result.best_score.is_mate());
    }

    #[test]
    fn prefers_capturing_a_hanging_queen() {
        let pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let options = SearchOptions {
            depth: 2,
            ..SearchOptions::default()
        };
        let result = search(&pos, &options);
        assert_eq!(crate::core::E4, result.best_move.source());
        assert_eq!(crate::core::D5, result.best_move.destination());
    }

    #[test]
    fn respects_a_hard_stop() {
        let pos = Position::from_start_position();
        let stop = AtomicBool::new(true);
        let options = SearchOptions {
            depth: 10,
            hard_stop: Some(&stop),
            ..SearchOptions::default()
        };
        let result = search(&pos, &options);
        assert_ne!(Move::null(), result.best_move);
    }

    #[test]
    fn quiescence_returns_static_eval_at_zero_depth() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let options = SearchOptions::default();
        let mut searcher = Searcher::new(&options);
        let score = searcher.quiescence(&mut pos, 0, Value::mated_in(1), Value::mate_in(1));
        assert_eq!(eval::evaluate(&pos), score);
    }

    #[test]
    fn node_limit_terminates_search() {
        let pos = Position::from_start_position();
        let options = SearchOptions {
            depth: 32,
            node_limit: Some(50),
            ..SearchOptions::default()
        };
        let result = search(&pos, &options);
        assert!(result.nodes_evaluated >= 50);
    }
}
