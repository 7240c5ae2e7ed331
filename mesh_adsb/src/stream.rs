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

//! the reconnecting line source. This owns the connection lifecycle of the SBS input:
//!
//! ```text
//!   Disconnected ──connect ok──▶ Connected ──read 0 bytes──▶ Disconnected   (no attempt counted, no delay)
//!        │                           │
//!   connect error               read error
//!        ▼                           ▼
//!   attempts += 1 ◀──────────────────┘
//!   attempts < limit ? sleep(delay), Disconnected : Exhausted (terminal)
//! ```
//!
//! Note that the attempt counter is never reset, i.e. the retry limit applies to the lifetime of the stream

use std::{io, time::Duration};
use async_trait::async_trait;
use tokio::{io::{AsyncRead, AsyncReadExt}, net::TcpStream, time::sleep};
use tracing::{debug,info,warn,error};
use mesh_common::line_buffer::{LineBuffer, decode_dropping_invalid};

pub const CONNECT_ATTEMPT_LIMIT: u32 = 10;
pub const CONNECT_ATTEMPT_DELAY: Duration = Duration::from_secs(5);
pub const READ_CHUNK_SIZE: usize = 1024;

/// something that can (re)open a byte stream. This is the seam that lets us test reconnection without sockets
#[async_trait]
pub trait StreamConnector: Send {
    type Stream: AsyncRead + Unpin + Send;

    async fn connect (&mut self)->io::Result<Self::Stream>;

    /// human readable description of what we connect to
    fn endpoint (&self)->String;
}

pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new (host: impl ToString, port: u16)->Self {
        TcpConnector { host: host.to_string(), port }
    }
}

#[async_trait]
impl StreamConnector for TcpConnector {
    type Stream = TcpStream;

    async fn connect (&mut self)->io::Result<TcpStream> {
        TcpStream::connect( (self.host.as_str(), self.port)).await
    }

    fn endpoint (&self)->String { format!("{}:{}", self.host, self.port) }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Exhausted
}

/// what the stream produces. `Exhausted` is terminal, it is returned for every call once the retry
/// budget is spent
#[derive(Debug,Clone,PartialEq)]
pub enum LineEvent {
    Line(String),
    Exhausted { attempts: u32 }
}

pub struct SbsLineStream<C> where C: StreamConnector {
    connector: C,
    retry_limit: u32,
    retry_delay: Duration,
    debug: bool,

    state: ConnectionState,
    stream: Option<C::Stream>,
    buf: LineBuffer,
    attempts: u32,  // failed connects + read errors, never reset
    n_connects: u32,
    n_closes: u32,  // clean peer closes, these don't count as attempts
}

impl<C> SbsLineStream<C> where C: StreamConnector {
    pub fn new (connector: C, retry_limit: u32, retry_delay: Duration)->Self {
        SbsLineStream {
            connector, retry_limit, retry_delay,
            debug: false,
            state: ConnectionState::Disconnected,
            stream: None,
            buf: LineBuffer::with_capacity( 2*READ_CHUNK_SIZE),
            attempts: 0,
            n_connects: 0,
            n_closes: 0
        }
    }

    /// log raw input data
    pub fn with_debug (mut self, debug: bool)->Self {
        self.debug = debug;
        self
    }

    pub fn state (&self)->ConnectionState { self.state }

    pub fn attempts (&self)->u32 { self.attempts }

    pub fn n_connects (&self)->u32 { self.n_connects }

    pub fn n_closes (&self)->u32 { self.n_closes }

    pub fn endpoint (&self)->String { self.connector.endpoint() }

    /// the next complete input line, or `Exhausted` if we can't get any more
    pub async fn next_event (&mut self)->LineEvent {
        loop {
            if let Some(line) = self.buf.next_line() {
                return LineEvent::Line(line)
            }

            match self.state {
                ConnectionState::Exhausted => return LineEvent::Exhausted { attempts: self.attempts },
                ConnectionState::Connected => self.read_chunk().await,
                ConnectionState::Disconnected | ConnectionState::Connecting => self.connect().await
            }
        }
    }

    async fn connect (&mut self) {
        if self.attempts >= self.retry_limit {
            self.state = ConnectionState::Exhausted;
            return
        }

        self.state = ConnectionState::Connecting;
        match self.connector.connect().await {
            Ok(stream) => {
                info!("connected to {}", self.connector.endpoint());
                self.buf.clear();
                self.stream = Some(stream);
                self.n_connects += 1;
                self.state = ConnectionState::Connected;
            }
            Err(e) => {
                self.on_failure( format!("connection to {} failed: {}", self.connector.endpoint(), e)).await
            }
        }
    }

    async fn read_chunk (&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            self.state = ConnectionState::Disconnected;
            return
        };

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        match stream.read( &mut chunk).await {
            Ok(0) => {
                self.n_closes += 1;
                // a peer that keeps closing on us would flood the log otherwise
                if self.n_closes == 1 {
                    warn!("{} closed connection, reconnecting", self.connector.endpoint());
                } else {
                    debug!("{} closed connection ({} times), reconnecting", self.connector.endpoint(), self.n_closes);
                }
                self.disconnect();
            }
            Ok(len) => {
                if self.debug {
                    debug!("raw data: {:?}", decode_dropping_invalid( &chunk[..len]));
                }
                self.buf.extend( &chunk[..len]);
            }
            Err(e) => {
                self.disconnect();
                self.on_failure( format!("read from {} failed: {}", self.connector.endpoint(), e)).await
            }
        }
    }

    fn disconnect (&mut self) {
        self.stream = None;
        self.buf.clear();
        self.state = ConnectionState::Disconnected;
    }

    async fn on_failure (&mut self, msg: String) {
        self.attempts += 1;
        if self.attempts < self.retry_limit {
            warn!("{} (attempt {}/{}), retrying in {:?}", msg, self.attempts, self.retry_limit, self.retry_delay);
            self.state = ConnectionState::Disconnected;
            sleep( self.retry_delay).await;
        } else {
            error!("{} (attempt {}/{}), giving up", msg, self.attempts, self.retry_limit);
            self.state = ConnectionState::Exhausted;
        }
    }
}
