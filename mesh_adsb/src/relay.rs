/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fmt, future::Future};
use tracing::{debug,info};
use mesh_common::datetime::EpochMillis;

use crate::{AircraftStore, sbs::parse_msg};
use crate::dispatch::Dispatcher;
use crate::stream::{SbsLineStream, StreamConnector, LineEvent};
use crate::errors::{MeshAdsbError,Result};

#[derive(Debug,Default,Clone,Copy,PartialEq,Eq)]
pub struct RelayStats {
    pub n_lines: u64,
    pub n_rejected: u64,
    pub n_dispatched: u64,
}

impl fmt::Display for RelayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lines: {}, rejected: {}, dispatched: {}", self.n_lines, self.n_rejected, self.n_dispatched)
    }
}

/// the ingestion pipeline: line -> parse -> merge -> (rate limited) dispatch.
/// This is the single owner of all aggregation state
pub struct AdsbRelay {
    store: AircraftStore,
    dispatcher: Dispatcher,
    debug: bool,
    stats: RelayStats,
}

impl AdsbRelay {
    pub fn new (dispatcher: Dispatcher, debug: bool)->Self {
        AdsbRelay { store: AircraftStore::new(), dispatcher, debug, stats: RelayStats::default() }
    }

    pub fn store (&self)->&AircraftStore { &self.store }

    pub fn dispatcher (&self)->&Dispatcher { &self.dispatcher }

    pub fn stats (&self)->RelayStats { self.stats }

    /// process one input line. Returns true if this caused a dispatch
    pub async fn process_line (&mut self, line: &str, now: EpochMillis)->bool {
        self.stats.n_lines += 1;

        let Some(update) = parse_msg( line) else {
            self.stats.n_rejected += 1;
            if self.debug { debug!("rejected line: {line:?}") }
            return false
        };

        let hex_ident = self.store.merge( &update).hex_ident.clone();
        let dispatched = self.dispatcher.maybe_dispatch( &self.store, &hex_ident, now).await;
        if dispatched { self.stats.n_dispatched += 1 }
        dispatched
    }

    /// process lines from `stream` until it is exhausted (which is an error) or `shutdown` completes
    pub async fn run<C,F> (&mut self, stream: &mut SbsLineStream<C>, shutdown: F)->Result<()>
        where C: StreamConnector, F: Future<Output=()>
    {
        let endpoint = stream.endpoint();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down relay from {endpoint}");
                    return Ok(())
                }
                event = stream.next_event() => match event {
                    LineEvent::Line(line) => { self.process_line( &line, EpochMillis::now()).await; }
                    LineEvent::Exhausted{attempts} => return Err( MeshAdsbError::SourceExhausted( endpoint.clone(), attempts))
                }
            }
        }
    }
}
