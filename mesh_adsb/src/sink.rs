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

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{info,error};

use crate::config::{AdsbRelayConfig, MulticastConfig};
use crate::errors::{MeshAdsbError,Result,op_failed};

/// the only capability the relay needs from an output channel: deliver a line of text.
/// Implementors should not retry internally, callers impose a timeout on `send_text`
#[async_trait]
pub trait TextSink: Send {
    /// short name used in log output
    fn name (&self)->&str;

    async fn send_text (&mut self, text: &str)->Result<()>;
}

/// prints dispatched messages to stdout
pub struct ConsoleSink;

#[async_trait]
impl TextSink for ConsoleSink {
    fn name (&self)->&str { "console" }

    async fn send_text (&mut self, text: &str)->Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// how this gateway identifies itself to mesh nodes
#[derive(Debug,Clone,PartialEq)]
pub struct GatewayNode {
    pub node_id: String,
    pub long_name: String,
    pub short_name: String,
}

/// broadcasts each text message as a single UTF-8 UDP datagram into a multicast group.
/// The socket is not joined to the group since we only send, and the TTL is 1 so that datagrams
/// never leave the local network
pub struct MulticastSink {
    socket: UdpSocket,
    target: SocketAddr,
    node: GatewayNode,
    n_sent: u64,
}

impl MulticastSink {
    pub async fn new (group: Ipv4Addr, port: u16, node: GatewayNode)->Result<Self> {
        let socket = UdpSocket::bind( SocketAddrV4::new( Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_multicast_ttl_v4(1)?;
        let target = SocketAddr::V4( SocketAddrV4::new( group, port));

        info!("multicast sink to {} as node {} ({} / {})", target, node.node_id, node.long_name, node.short_name);
        Ok( MulticastSink { socket, target, node, n_sent: 0 } )
    }

    pub async fn from_config (config: &MulticastConfig)->Result<Self> {
        let node = GatewayNode {
            node_id: config.node_id.clone(),
            long_name: config.long_name.clone(),
            short_name: config.short_name.clone()
        };
        MulticastSink::new( config.group, config.port, node).await
    }

    pub fn node (&self)->&GatewayNode { &self.node }

    pub fn target (&self)->SocketAddr { self.target }

    pub fn n_sent (&self)->u64 { self.n_sent }
}

#[async_trait]
impl TextSink for MulticastSink {
    fn name (&self)->&str { "multicast" }

    async fn send_text (&mut self, text: &str)->Result<()> {
        let data = text.as_bytes();
        let len = self.socket.send_to( data, self.target).await?;
        if len < data.len() {
            return Err( op_failed!("short multicast write: {} of {} bytes", len, data.len()))
        }
        self.n_sent += 1;
        Ok(())
    }
}

/// instantiate all sinks enabled in `config`. Sinks that cannot be created are logged and skipped,
/// a relay without sinks still runs (with simulated output)
pub async fn create_sinks (config: &AdsbRelayConfig)->Vec<Box<dyn TextSink>> {
    let mut sinks: Vec<Box<dyn TextSink>> = Vec::new();

    if let Some(mc_config) = &config.multicast {
        match MulticastSink::from_config( mc_config).await {
            Ok(sink) => sinks.push( Box::new(sink)),
            Err(e) => error!("failed to create multicast sink: {e}")
        }
    }

    if config.console {
        sinks.push( Box::new( ConsoleSink))
    }

    sinks
}
