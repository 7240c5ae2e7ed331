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

//! newline framing for raw byte streams that arrive in arbitrary chunks

use memchr::memchr;

/*
  ......xxxxxxx\nyyyyyyyyyy\nzzzz     buf
  |            |           |   |
  0            i1          i2  len
  -> "xxxxxxx", "yyyyyyyyyy" are complete lines, "zzzz" stays pending until the next '\n' arrives
*/

/// a growable byte buffer that hands out complete '\n' terminated lines.
/// Bytes are kept raw until a line is complete so that multi-byte UTF-8 sequences can be split
/// across reads. Invalid UTF-8 is dropped when a line is decoded, it never causes a failure.
/// The buffer is not bounded: input without '\n' keeps growing it until `clear()` is called
#[derive(Debug,Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    n_lines: u64
}

impl LineBuffer {
    pub fn new ()->Self {
        LineBuffer { buf: Vec::new(), n_lines: 0 }
    }

    pub fn with_capacity (capacity: usize)->Self {
        LineBuffer { buf: Vec::with_capacity(capacity), n_lines: 0 }
    }

    /// append raw bytes as they were read from the source
    pub fn extend (&mut self, data: &[u8]) {
        self.buf.extend_from_slice( data);
    }

    /// remove and return the next complete line (without the '\n'), or None if there is no
    /// newline in the buffer yet
    pub fn next_line (&mut self)->Option<String> {
        let i = memchr( b'\n', &self.buf)?;
        let line = decode_dropping_invalid( &self.buf[..i]);
        self.buf.drain( ..=i);
        self.n_lines += 1;
        Some(line)
    }

    /// number of buffered bytes that do not yet form a complete line
    pub fn pending (&self)->usize { self.buf.len() }

    pub fn is_empty (&self)->bool { self.buf.is_empty() }

    /// number of lines returned by `next_line()` since creation
    pub fn n_lines (&self)->u64 { self.n_lines }

    /// discard any incomplete line
    pub fn clear (&mut self) { self.buf.clear() }
}

/// decode bytes as UTF-8, silently skipping invalid (or truncated) sequences
pub fn decode_dropping_invalid (bytes: &[u8])->String {
    let mut s = String::with_capacity( bytes.len());
    for chunk in bytes.utf8_chunks() {
        s.push_str( chunk.valid());
    }
    s
}
