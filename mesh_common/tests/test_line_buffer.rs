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

use mesh_common::line_buffer::{LineBuffer,decode_dropping_invalid};

// run with "cargo test --test test_line_buffer -- --nocapture"

#[test]
fn test_complete_lines () {
    let mut lb = LineBuffer::new();
    lb.extend( b"MSG,1,a\nMSG,3,b\n");

    assert_eq!( lb.next_line().as_deref(), Some("MSG,1,a"));
    assert_eq!( lb.next_line().as_deref(), Some("MSG,3,b"));
    assert_eq!( lb.next_line(), None);
    assert!( lb.is_empty());
    assert_eq!( lb.n_lines(), 2);
}

#[test]
fn test_split_lines () {
    let mut lb = LineBuffer::with_capacity(64);
    lb.extend( b"MSG,3,1");
    assert_eq!( lb.next_line(), None);
    assert_eq!( lb.pending(), 7);

    lb.extend( b"11,222\nMS");
    assert_eq!( lb.next_line().as_deref(), Some("MSG,3,111,222"));
    assert_eq!( lb.next_line(), None);

    lb.extend( b"G,4\n");
    assert_eq!( lb.next_line().as_deref(), Some("MSG,4"));
}

#[test]
fn test_crlf_and_empty_lines () {
    let mut lb = LineBuffer::new();
    lb.extend( b"MSG,8\r\n\n");

    // we only split on '\n', trimming is up to the consumer
    assert_eq!( lb.next_line().as_deref(), Some("MSG,8\r"));
    assert_eq!( lb.next_line().as_deref(), Some(""));
    assert_eq!( lb.next_line(), None);
}

#[test]
fn test_clear () {
    let mut lb = LineBuffer::new();
    lb.extend( b"partial");
    lb.clear();
    lb.extend( b"line\n");
    assert_eq!( lb.next_line().as_deref(), Some("line"));
}

#[test]
fn test_invalid_utf8_is_dropped () {
    let mut lb = LineBuffer::new();
    lb.extend( b"MSG,\xff3,\xc3");
    lb.extend( b"\xa9x\xe2\x82\n"); // split but valid 'é', then truncated 3-byte sequence
    assert_eq!( lb.next_line().as_deref(), Some("MSG,3,éx"));

    assert_eq!( decode_dropping_invalid( b"\x80\x80abc"), "abc");
    assert_eq!( decode_dropping_invalid( b""), "");
}

#[test]
fn test_unterminated_input_is_kept () {
    let mut lb = LineBuffer::new();
    let chunk = [b'x'; 1024];
    for _ in 0..64 {
        lb.extend( &chunk);
        assert_eq!( lb.next_line(), None);
    }
    assert_eq!( lb.pending(), 64 * 1024); // nothing is dropped until a newline or clear()

    lb.clear();
    assert!( lb.is_empty());
}
