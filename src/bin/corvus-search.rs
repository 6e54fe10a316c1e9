// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use corvus::search::{self, SearchOptions};
use corvus::Position;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,
    /// Depth to which to search.
    #[structopt(short, long)]
    depth: u32,
    /// If present, serializes the output as json.
    #[structopt(long)]
    json: bool,
}

fn main() {
    let ops = Options::from_args();
    let pos = Position::from_fen(ops.fen).unwrap();
    let options = SearchOptions {
        depth: ops.depth,
        ..SearchOptions::default()
    };
    let result = search::search(&pos, &options);
    if ops.json {
        println!(
            "{{\n    \"best_move\": \"{}\",\n    \"best_score\": {},\n    \"nodes_evaluated\": {}\n}}",
            result.best_move.as_uci(),
            result.best_score,
            result.nodes_evaluated
        );
    } else {
        println!(
            "best_move={} best_score={} nodes_evaluated={} depth={}",
            result.best_move.as_uci(),
            result.best_score,
            result.nodes_evaluated,
            result.depth
        );
    }
}
