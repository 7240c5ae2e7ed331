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

use std::{collections::HashMap, time::Duration};
use tokio::time::timeout;
use tracing::{debug,info,error};
use mesh_common::datetime::EpochMillis;

use crate::AircraftStore;
use crate::sink::TextSink;
use crate::errors::{MeshAdsbError,Result};

/// per-aircraft rate limiting. An aircraft is due if it was never dispatched before, or if strictly more
/// than `update_interval` has passed since its last dispatch
#[derive(Debug)]
pub struct DispatchPolicy {
    update_interval: Duration,
    last_sent: HashMap<String,EpochMillis>,
}

impl DispatchPolicy {
    pub fn new (update_interval: Duration)->Self {
        DispatchPolicy { update_interval, last_sent: HashMap::new() }
    }

    pub fn update_interval (&self)->Duration { self.update_interval }

    pub fn is_due (&self, hex_ident: &str, now: EpochMillis)->bool {
        match self.last_sent.get( hex_ident) {
            Some(last) => now.is_later_than( *last, self.update_interval),
            None => true
        }
    }

    pub fn record (&mut self, hex_ident: &str, now: EpochMillis) {
        self.last_sent.insert( hex_ident.to_string(), now);
    }

    pub fn last_sent (&self, hex_ident: &str)->Option<EpochMillis> {
        self.last_sent.get( hex_ident).copied()
    }
}

/// formats reportable aircraft and sends them to all sinks, subject to the `DispatchPolicy`.
/// Sinks are called one after the other so that there is only one writer of the dispatch times. A failing
/// or hanging sink is logged and skipped, it does not keep the others from getting the message
pub struct Dispatcher {
    policy: DispatchPolicy,
    sinks: Vec<Box<dyn TextSink>>,
    sink_timeout: Duration,
    n_dispatched: u64,
}

impl Dispatcher {
    pub fn new (update_interval: Duration, sinks: Vec<Box<dyn TextSink>>, sink_timeout: Duration)->Self {
        Dispatcher { policy: DispatchPolicy::new( update_interval), sinks, sink_timeout, n_dispatched: 0 }
    }

    pub fn policy (&self)->&DispatchPolicy { &self.policy }

    pub fn n_sinks (&self)->usize { self.sinks.len() }

    pub fn n_dispatched (&self)->u64 { self.n_dispatched }

    /// send the current state of aircraft `hex_ident` if it is reportable and due. Returns true if we dispatched
    pub async fn maybe_dispatch (&mut self, store: &AircraftStore, hex_ident: &str, now: EpochMillis)->bool {
        let Some(ac) = store.get( hex_ident) else { return false };
        if !ac.is_reportable() || !self.policy.is_due( hex_ident, now) {
            return false
        }

        let msg = ac.text_summary();
        if self.sinks.is_empty() {
            info!("Output (simulated): {msg}");
        } else {
            for sink in self.sinks.iter_mut() {
                info!("Sending to {}: {}", sink.name(), msg);
                if let Err(e) = send_with_timeout( sink.as_mut(), &msg, self.sink_timeout).await {
                    error!("{e}");
                }
            }
        }

        self.policy.record( hex_ident, now);
        self.n_dispatched += 1;
        debug!("broadcasted update for {} ({})", hex_ident, ac.callsign);
        true
    }
}

async fn send_with_timeout (sink: &mut dyn TextSink, msg: &str, max_time: Duration)->Result<()> {
    let name = sink.name().to_string();
    match timeout( max_time, sink.send_text( msg)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err( MeshAdsbError::SinkError( name, e.to_string())),
        Err(_) => Err( MeshAdsbError::SinkTimeout( name))
    }
}
