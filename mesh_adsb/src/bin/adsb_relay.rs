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
#![allow(unused)]

use std::net::Ipv4Addr;
use anyhow::Result;
use tracing::{info,warn,Level};
use mesh_common::{define_cli, check_cli, config::load_optional_config, datetime::secs};
use mesh_adsb::{
    config::{AdsbRelayConfig, MulticastConfig, DEFAULT_CONFIG_FILE},
    dispatch::Dispatcher, relay::AdsbRelay, sink::create_sinks, stream::{SbsLineStream, TcpConnector}
};

define_cli! { ARGS [about="relay SBS-1 aircraft updates from dump1090 as rate limited text messages"] =
    config: Option<String> [help="config file (default: adsb_relay.ron)", long],
    host: Option<String> [help="SBS-1 source host", long],
    port: Option<u16> [help="SBS-1 source port", long],
    update_interval: Option<u64> [help="min seconds between updates of the same aircraft", long],
    debug: bool [help="log raw input data", long],
    console: bool [help="print dispatched messages to stdout", long],
    multicast: bool [help="broadcast dispatched messages to a multicast group", long],
    multicast_group: Option<Ipv4Addr> [help="multicast group address", long],
    multicast_port: Option<u16> [help="multicast port", long]
}

#[tokio::main]
async fn main ()->Result<()> {
    check_cli!(ARGS);

    let config = get_config()?;
    tracing_subscriber::fmt()
        .with_max_level( if config.debug { Level::DEBUG } else { Level::INFO })
        .init();

    info!("relaying {}:{} with update interval {:?}", config.source_host, config.source_port, config.update_interval);

    let sinks = create_sinks( &config).await;
    if sinks.is_empty() {
        warn!("no sinks enabled, output is only logged");
    }
    let dispatcher = Dispatcher::new( config.update_interval, sinks, config.sink_timeout);
    let mut relay = AdsbRelay::new( dispatcher, config.debug);

    let connector = TcpConnector::new( &config.source_host, config.source_port);
    let mut stream = SbsLineStream::new( connector, config.retry_limit, config.retry_delay).with_debug( config.debug);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await
        }
    };

    let res = relay.run( &mut stream, shutdown).await;
    info!("{} aircraft, {}", relay.store().len(), relay.stats());
    Ok(res?)
}

/// the config file (if any) with command line overrides applied
fn get_config ()->Result<AdsbRelayConfig> {
    let filename = ARGS.config.as_deref().unwrap_or( DEFAULT_CONFIG_FILE);
    let mut config = match load_optional_config::<AdsbRelayConfig>( filename)? {
        Some(config) => config,
        None => {
            // logging is not initialized yet
            eprintln!("config file {filename} not found, using defaults");
            AdsbRelayConfig::default()
        }
    };

    if let Some(host) = &ARGS.host { config.source_host = host.clone() }
    if let Some(port) = ARGS.port { config.source_port = port }
    if let Some(n) = ARGS.update_interval { config.update_interval = secs(n) }
    if ARGS.debug { config.debug = true }
    if ARGS.console { config.console = true }

    if ARGS.multicast || ARGS.multicast_group.is_some() || ARGS.multicast_port.is_some() {
        let mc = config.multicast.get_or_insert_with( MulticastConfig::default);
        if let Some(group) = ARGS.multicast_group { mc.group = group }
        if let Some(port) = ARGS.multicast_port { mc.port = port }
    }

    Ok(config)
}
