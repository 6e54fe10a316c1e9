// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An implementation of the UCI protocol, driving the engine façade from standard input.
//! See [here](http://wbec-ridderkerk.nl/html/UCIProtocol.html) for full documentation on the protocol.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::position::Position;

pub fn run() -> io::Result<()> {
    let mut session = Session::new(Engine::new(Config::default()));
    let stdin = io::stdin();
    let locked_stdin = stdin.lock();
    let stdout = io::stdout();
    let mut locked_stdout = stdout.lock();

    for maybe_line in locked_stdin.lines() {
        let line = maybe_line?;
        if !session.handle_line(&line, &mut locked_stdout)? {
            break;
        }
    }

    Ok(())
}

struct Session {
    engine: Engine,
    pos: Position,
    moves_played: Vec<String>,
}

impl Session {
    fn new(engine: Engine) -> Session {
        Session {
            engine,
            pos: Position::from_start_position(),
            moves_played: Vec::new(),
        }
    }

    /// Handles one line of UCI input. Returns `Ok(false)` when the session should terminate.
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let components: Vec<_> = line.split_whitespace().collect();
        let (&command, arguments) = match components.split_first() {
            Some(split) => split,
            None => return Ok(true),
        };

        match (command, arguments) {
            ("uci", []) => self.handle_uci(out)?,
            ("isready", []) => uci_write(out, "readyok")?,
            ("ucinewgame", []) => self.handle_ucinewgame(),
            ("position", args) => self.handle_position(args),
            ("go", args) => self.handle_go(args, out)?,
            ("stop", []) => {}
            ("quit", []) => return Ok(false),
            (cmd, args) => {
                warn!("unrecognized UCI command: {} {:?}", cmd, args);
            }
        }

        Ok(true)
    }

    fn handle_uci(&self, out: &mut impl Write) -> io::Result<()> {
        uci_write(
            out,
            &format!("id name {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        )?;
        uci_write(out, &format!("id author {}", env!("CARGO_PKG_AUTHORS")))?;
        uci_write(out, "uciok")
    }

    fn handle_ucinewgame(&mut self) {
        self.pos.reset();
        self.moves_played.clear();
        crate::table::clear();
    }

    fn handle_position(&mut self, args: &[&str]) {
        let (fen_part, moves_part): (Vec<&str>, Vec<&str>) = match args.split_first() {
            Some((&"startpos", rest)) => (vec![], rest.to_vec()),
            Some((&"fen", rest)) => {
                let moves_idx = rest.iter().position(|&a| a == "moves").unwrap_or(rest.len());
                (rest[..moves_idx].to_vec(), rest[moves_idx..].to_vec())
            }
            _ => return,
        };

        if fen_part.is_empty() {
            self.pos.reset();
        } else if let Err(err) = self.pos.set_fen(&fen_part.join(" ")) {
            warn!("invalid FEN in `position` command: {:?}", err);
            return;
        }

        self.moves_played.clear();
        let moves = moves_part.strip_prefix(&["moves"]).unwrap_or(&[]);
        for uci in moves {
            match self.pos.move_from_uci(uci) {
                Some(mov) => {
                    self.pos.push(mov);
                    self.moves_played.push(uci.to_string());
                }
                None => {
                    warn!("illegal move in `position` command: {}", uci);
                    break;
                }
            }
        }
    }

    fn handle_go(&mut self, args: &[&str], out: &mut impl Write) -> io::Result<()> {
        let timeout = parse_go_timeout(args, self.pos.side_to_move());
        let best_move = self.engine.best_move(&self.pos, &self.moves_played, timeout);
        debug!("search statistics: {}", self.engine.score(&self.pos, timeout));
        uci_write(out, &format!("bestmove {}", best_move.as_uci()))
    }
}

fn parse_go_timeout(args: &[&str], side_to_move: crate::core::Color) -> Option<Duration> {
    let mut wtime = None;
    let mut btime = None;
    let mut winc = Duration::ZERO;
    let mut binc = Duration::ZERO;
    let mut movetime = None;

    let mut iter = args.iter();
    while let Some(&key) = iter.next() {
        let value = iter.next().and_then(|v| v.parse::<u64>().ok());
        match (key, value) {
            ("wtime", Some(ms)) => wtime = Some(Duration::from_millis(ms)),
            ("btime", Some(ms)) => btime = Some(Duration::from_millis(ms)),
            ("winc", Some(ms)) => winc = Duration::from_millis(ms),
            ("binc", Some(ms)) => binc = Duration::from_millis(ms),
            ("movetime", Some(ms)) => movetime = Some(Duration::from_millis(ms)),
            _ => {}
        }
    }

    if let Some(movetime) = movetime {
        return Some(movetime);
    }

    let (time, increment) = match side_to_move {
        crate::core::Color::White => (wtime, winc),
        crate::core::Color::Black => (btime, binc),
    };

    time.map(|time| {
        crate::time_manager::TimeManager::default().get_timeout(time, increment)
    })
}

fn uci_write(out: &mut impl Write, line: &str) -> io::Result<()> {
    always!("uci => {}", line);
    writeln!(out, "{}", line)
}
