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

use std::{net::Ipv4Addr, time::Duration};
use serde::{Serialize,Deserialize};
use mesh_common::datetime::{secs, deserialize_duration, serialize_duration};
use crate::stream::{CONNECT_ATTEMPT_LIMIT, CONNECT_ATTEMPT_DELAY};

pub const DEFAULT_CONFIG_FILE: &'static str = "adsb_relay.ron";

/// runtime configuration of the relay. Every field has a default so that config files only need to
/// contain what differs. Durations are human readable strings such as "300s" or "5min"
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct AdsbRelayConfig {
    /// host of the SBS-1 source (e.g. dump1090 on port 30003)
    pub source_host: String,
    pub source_port: u16,

    /// min time between two dispatches for the same aircraft
    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub update_interval: Duration,

    /// max number of failed connection attempts before we give up on the source
    pub retry_limit: u32,
    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub retry_delay: Duration,

    /// max time a single sink send may take before we log it as failed
    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub sink_timeout: Duration,

    /// log raw input data and rejected lines
    pub debug: bool,

    /// print dispatched messages to stdout
    pub console: bool,

    #[serde(skip_serializing_if="mesh_common::is_none")]
    pub multicast: Option<MulticastConfig>,
}

impl Default for AdsbRelayConfig {
    fn default()->Self {
        AdsbRelayConfig {
            source_host: "localhost".to_string(),
            source_port: 30003,
            update_interval: secs(300),
            retry_limit: CONNECT_ATTEMPT_LIMIT,
            retry_delay: CONNECT_ATTEMPT_DELAY,
            sink_timeout: secs(10),
            debug: false,
            console: false,
            multicast: None,
        }
    }
}

impl AdsbRelayConfig {
    /// true if no sink is configured, i.e. dispatched messages only show up as simulated output in the log
    pub fn has_no_sinks (&self)->bool {
        !self.console && self.multicast.is_none()
    }
}

/// settings for broadcasting dispatched text messages as UDP datagrams into a local multicast group.
/// The node identity is what receivers see as sender of our messages
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct MulticastConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    pub node_id: String,
    pub long_name: String,
    pub short_name: String,
}

impl Default for MulticastConfig {
    fn default()->Self {
        MulticastConfig {
            group: Ipv4Addr::new( 224, 0, 0, 69),
            port: 4403,
            node_id: "!adsb-gw".to_string(),
            long_name: "ADSB Gateway".to_string(),
            short_name: "ADSB".to_string(),
        }
    }
}
