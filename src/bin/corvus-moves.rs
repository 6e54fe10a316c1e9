// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use structopt::StructOpt;

use corvus::movegen;
use corvus::Position;

#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,
}

fn main() {
    let ops = Options::from_args();
    let pos = Position::from_fen(ops.fen).unwrap();
    let mut moves = Vec::new();
    movegen::generate_moves(pos.side_to_move(), &pos, &mut moves);
    moves.retain(|&m| pos.is_legal_given_pseudolegal(m));
    for mov in moves {
        println!("{}", mov.as_uci());
    }
}
