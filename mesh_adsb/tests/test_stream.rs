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

use std::{io, collections::VecDeque, io::Cursor, pin::Pin, task::{Context, Poll}};
use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
use async_trait::async_trait;
use tokio::{io::{AsyncRead, AsyncWriteExt, ReadBuf}, net::TcpListener, time::{sleep, Instant}};
use mesh_common::datetime::{millis, secs};
use mesh_adsb::stream::{SbsLineStream, StreamConnector, TcpConnector, LineEvent, ConnectionState};

/// what the scripted connector hands out on each connect
enum Script {
    Refuse,
    Data(&'static str),
    Broken
}

enum ScriptStream {
    Data(Cursor<Vec<u8>>),
    Broken
}

impl AsyncRead for ScriptStream {
    fn poll_read (self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>)->Poll<io::Result<()>> {
        match self.get_mut() {
            ScriptStream::Data(cursor) => Pin::new(cursor).poll_read( cx, buf),
            ScriptStream::Broken => Poll::Ready( Err( io::Error::new( io::ErrorKind::ConnectionReset, "reset by peer")))
        }
    }
}

/// replays a fixed script of connect outcomes, refusing once the script is used up
struct ScriptedConnector {
    script: VecDeque<Script>,
    calls: Arc<AtomicU32>
}

impl ScriptedConnector {
    fn new (script: Vec<Script>)->(Self, Arc<AtomicU32>) {
        let calls = Arc::new( AtomicU32::new(0));
        (ScriptedConnector { script: script.into(), calls: calls.clone() }, calls)
    }
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    type Stream = ScriptStream;

    async fn connect (&mut self)->io::Result<ScriptStream> {
        self.calls.fetch_add( 1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Script::Data(s)) => Ok( ScriptStream::Data( Cursor::new( s.as_bytes().to_vec()))),
            Some(Script::Broken) => Ok( ScriptStream::Broken),
            Some(Script::Refuse) | None => Err( io::Error::new( io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    fn endpoint (&self)->String { "scripted".to_string() }
}

#[tokio::test]
async fn test_exhaustion () {
    let (connector, calls) = ScriptedConnector::new( vec![]);
    let mut stream = SbsLineStream::new( connector, 3, millis(10));

    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 3 });
    assert_eq!( calls.load( Ordering::SeqCst), 3);
    assert_eq!( stream.state(), ConnectionState::Exhausted);

    // terminal, no further connect attempts
    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 3 });
    assert_eq!( calls.load( Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_then_connect () {
    let (connector, calls) = ScriptedConnector::new( vec![
        Script::Refuse, Script::Refuse, Script::Data("MSG,a\nMSG,b\n")
    ]);
    let mut stream = SbsLineStream::new( connector, 3, millis(10));

    assert_eq!( stream.next_event().await, LineEvent::Line("MSG,a".to_string()));
    assert_eq!( stream.next_event().await, LineEvent::Line("MSG,b".to_string()));
    assert_eq!( stream.attempts(), 2);
    assert_eq!( stream.n_connects(), 1);

    // counter is cumulative, the next refusal uses up the last attempt
    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 3 });
    assert_eq!( calls.load( Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_clean_close_reconnects_without_counting () {
    let (connector, calls) = ScriptedConnector::new( vec![
        Script::Data("one\ntwo"), Script::Data(""), Script::Data("three\n")
    ]);
    let mut stream = SbsLineStream::new( connector, 2, millis(10));

    assert_eq!( stream.next_event().await, LineEvent::Line("one".to_string()));
    // "two" was never terminated and is dropped with the connection
    assert_eq!( stream.next_event().await, LineEvent::Line("three".to_string()));
    assert_eq!( stream.attempts(), 0);
    assert_eq!( stream.n_connects(), 3);
    assert_eq!( stream.n_closes(), 2);

    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 2 });
    assert_eq!( calls.load( Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_read_error_counts () {
    let (connector, calls) = ScriptedConnector::new( vec![
        Script::Broken, Script::Data("ok\n"), Script::Broken
    ]);
    let mut stream = SbsLineStream::new( connector, 2, millis(10));

    assert_eq!( stream.next_event().await, LineEvent::Line("ok".to_string()));
    assert_eq!( stream.attempts(), 1);

    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 2 });
    assert_eq!( calls.load( Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_split_lines_over_tcp () {
    let listener = TcpListener::bind( "127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn( async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all( b"MSG,3,111,11111,ABC123\r\nMSG,3,111,").await.unwrap();
        socket.flush().await.unwrap();
        sleep( millis(50)).await;
        socket.write_all( "11111,DEF456,\u{00e9}\n".as_bytes()).await.unwrap();
        socket.write_all( &[b'x', 0xff, b'y', b'\n']).await.unwrap();
        socket.flush().await.unwrap();
    });

    let mut stream = SbsLineStream::new( TcpConnector::new( "127.0.0.1", port), 2, millis(10)).with_debug(true);
    assert_eq!( stream.endpoint(), format!("127.0.0.1:{port}"));

    assert_eq!( stream.next_event().await, LineEvent::Line("MSG,3,111,11111,ABC123\r".to_string()));
    assert_eq!( stream.next_event().await, LineEvent::Line("MSG,3,111,11111,DEF456,\u{00e9}".to_string()));
    assert_eq!( stream.next_event().await, LineEvent::Line("xy".to_string())); // invalid byte dropped
    assert_eq!( stream.state(), ConnectionState::Connected);

    server.await.unwrap();
}

#[tokio::test]
async fn test_tcp_refused () {
    // grab a free port and close it again
    let port = {
        let listener = TcpListener::bind( "127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut stream = SbsLineStream::new( TcpConnector::new( "127.0.0.1", port), 2, millis(10));
    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 2 });
    assert_eq!( stream.n_connects(), 0);
}

// the clock is paused, sleeps complete as soon as the runtime is idle and advance time by their duration

#[tokio::test(start_paused = true)]
async fn test_no_delay_after_last_attempt () {
    let (connector, calls) = ScriptedConnector::new( vec![]);
    let mut stream = SbsLineStream::new( connector, 3, secs(5));

    let t0 = Instant::now();
    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 3 });
    let elapsed = t0.elapsed();
    println!("exhausted after {elapsed:?}");

    // 3 attempts are separated by 2 delays
    assert!( elapsed >= secs(10), "retry delay not taken: {elapsed:?}");
    assert!( elapsed < secs(15), "delay after final attempt: {elapsed:?}");

    // nothing left to wait for once exhausted
    let t1 = Instant::now();
    assert_eq!( stream.next_event().await, LineEvent::Exhausted{ attempts: 3 });
    assert!( t1.elapsed() < secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_read_error_waits_retry_delay () {
    let (connector, _calls) = ScriptedConnector::new( vec![ Script::Broken, Script::Data("ok\n") ]);
    let mut stream = SbsLineStream::new( connector, 3, secs(5));

    let t0 = Instant::now();
    assert_eq!( stream.next_event().await, LineEvent::Line("ok".to_string()));
    let elapsed = t0.elapsed();
    assert!( elapsed >= secs(5) && elapsed < secs(10), "unexpected delay {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_clean_close_reconnects_immediately () {
    let (connector, calls) = ScriptedConnector::new( vec![
        Script::Data("a\n"), Script::Data(""), Script::Data(""), Script::Data("b\n")
    ]);
    let mut stream = SbsLineStream::new( connector, 3, secs(5));

    let t0 = Instant::now();
    assert_eq!( stream.next_event().await, LineEvent::Line("a".to_string()));
    assert_eq!( stream.next_event().await, LineEvent::Line("b".to_string()));
    let elapsed = t0.elapsed();
    println!("3 clean closes took {elapsed:?}");

    assert!( elapsed < millis(100), "clean close waited: {elapsed:?}");
    assert_eq!( stream.n_closes(), 3);
    assert_eq!( stream.attempts(), 0);
    assert_eq!( calls.load( Ordering::SeqCst), 4);
}
