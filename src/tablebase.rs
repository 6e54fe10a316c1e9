// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Endgame tablebase lookup: a cheap, approximate stand-in for a full Syzygy/WDL probe. A
//! [`LocalTablebase`] holds an in-memory FEN-to-move table (e.g. loaded from a small file of known
//! endgame positions); a [`RemoteTablebase`] queries an HTTP tablebase API. [`CompositeTablebase`]
//! tries local first, falling back to remote, and treats every miss or transport failure as "no
//! move" rather than an error: a tablebase is an optimization the search can always do without.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::core::Move;
use crate::position::Position;

pub trait Tablebase {
    /// Returns a move known to be optimal (or near-optimal) from `pos`, if this tablebase has an
    /// entry for it.
    fn probe(&self, pos: &Position) -> Option<Move>;
}

/// An in-memory FEN -> best-move table, analogous in spirit to a local Syzygy WDL probe but
/// carrying UCI move strings instead of packed WDL/DTZ values.
pub struct LocalTablebase {
    entries: HashMap<String, String>,
}

impl LocalTablebase {
    pub fn new() -> LocalTablebase {
        LocalTablebase {
            entries: HashMap::new(),
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<LocalTablebase> {
        let entries: HashMap<String, String> = serde_json::from_str(text)?;
        Ok(LocalTablebase { entries })
    }

    pub fn insert(&mut self, fen: impl Into<String>, uci_move: impl Into<String>) {
        self.entries.insert(fen.into(), uci_move.into());
    }
}

impl Default for LocalTablebase {
    fn default() -> Self {
        LocalTablebase::new()
    }
}

impl Tablebase for LocalTablebase {
    fn probe(&self, pos: &Position) -> Option<Move> {
        let uci = self.entries.get(&pos.fen())?;
        pos.move_from_uci(uci)
    }
}

#[derive(Deserialize)]
struct RemoteResponse {
    moves: Vec<RemoteMove>,
}

#[derive(Deserialize)]
struct RemoteMove {
    uci: String,
}

/// Queries a remote tablebase API (modeled after the Lichess tablebase endpoint) over HTTPS.
/// Transport or parse failures are swallowed; a remote lookup is never allowed to fail a search.
pub struct RemoteTablebase {
    base_url: String,
    timeout: Duration,
}

impl RemoteTablebase {
    pub fn new(base_url: impl Into<String>) -> RemoteTablebase {
        RemoteTablebase {
            base_url: base_url.into(),
            timeout: Duration::from_secs(2),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> RemoteTablebase {
        self.timeout = timeout;
        self
    }

    fn fetch(&self, pos: &Position) -> Option<RemoteMove> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .ok()?;
        let response = client
            .get(&self.base_url)
            .query(&[("fen", pos.fen())])
            .send()
            .ok()?;
        let body: RemoteResponse = response.json().ok()?;
        body.moves.into_iter().next()
    }
}

impl Tablebase for RemoteTablebase {
    fn probe(&self, pos: &Position) -> Option<Move> {
        match self.fetch(pos) {
            Some(mov) => pos.move_from_uci(&mov.uci),
            None => {
                warn!("remote tablebase probe failed or had no entry");
                None
            }
        }
    }
}

/// Tries a local tablebase first, then a remote one, returning the first hit.
pub struct CompositeTablebase {
    local: Option<LocalTablebase>,
    remote: Option<RemoteTablebase>,
}

impl CompositeTablebase {
    pub fn new(local: Option<LocalTablebase>, remote: Option<RemoteTablebase>) -> CompositeTablebase {
        CompositeTablebase { local, remote }
    }
}

impl Tablebase for CompositeTablebase {
    fn probe(&self, pos: &Position) -> Option<Move> {
        if let Some(local) = &self.local {
            if let Some(mov) = local.probe(pos) {
                return Some(mov);
            }
        }

        self.remote.as_ref().and_then(|remote| remote.probe(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_tablebase_hits_known_fen() {
        let pos = Position::from_fen("8/4k3/8/8/8/8/3BB3/3K4 w - - 0 1").unwrap();
        let mut table = LocalTablebase::new();
        table.insert(pos.fen(), "d2c3");
        let mov = table.probe(&pos).expect("expected a tablebase hit");
        assert_eq!(crate::core::D2, mov.source());
        assert_eq!(crate::core::C3, mov.destination());
    }

    #[test]
    fn local_tablebase_misses_unknown_fen() {
        let pos = Position::from_start_position();
        let table = LocalTablebase::new();
        assert!(table.probe(&pos).is_none());
    }

    #[test]
    fn composite_prefers_local_over_remote() {
        let pos = Position::from_fen("8/4k3/8/8/8/8/3BB3/3K4 w - - 0 1").unwrap();
        let mut local = LocalTablebase::new();
        local.insert(pos.fen(), "d2c3");
        let composite = CompositeTablebase::new(Some(local), None);
        assert!(composite.probe(&pos).is_some());
    }

    #[test]
    fn composite_with_no_backends_always_misses() {
        let pos = Position::from_start_position();
        let composite = CompositeTablebase::new(None, None);
        assert!(composite.probe(&pos).is_none());
    }
}
