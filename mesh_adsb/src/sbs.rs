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

use std::{fmt, str::FromStr};
use crate::AircraftRecord;

/// the message type we process. SEL, ID, AIR, STA and CLK messages are dropped
pub const TRANSMISSION_MSG: &'static str = "MSG";

pub const SBS1_FIELDS: [&'static str; 22] = [
    "message_type", "transmission_type", "session_id", "aircraft_id",
    "hex_ident", "flight_id", "generated_date", "generated_time",
    "logged_date", "logged_time", "callsign", "altitude",
    "ground_speed", "track", "lat", "lon", "vertical_rate",
    "squawk", "alert", "emergency", "spi", "is_on_ground"
];

pub const SBS1_FIELD_COUNT: usize = SBS1_FIELDS.len();

/// a single SBS field value. Empty input fields are `Absent`, input that could not be converted
/// into the field type is kept verbatim as `Invalid` so that it is still visible to consumers
#[derive(Debug,Clone,PartialEq)]
pub enum SbsField<T> {
    Absent,
    Value(T),
    Invalid(String)
}

impl<T> Default for SbsField<T> {
    fn default()->Self { SbsField::Absent }
}

impl<T> SbsField<T> {
    pub fn is_absent (&self)->bool { matches!( self, SbsField::Absent) }

    pub fn is_present (&self)->bool { !self.is_absent() }

    /// the typed value if there is one (Absent and Invalid both return None)
    pub fn value (&self)->Option<&T> {
        if let SbsField::Value(v) = self { Some(v) } else { None }
    }

    /// last-write-wins: overwrite with `other` unless it is absent
    pub fn merge_from (&mut self, other: &SbsField<T>) where T: Clone {
        if other.is_present() {
            *self = other.clone()
        }
    }
}

impl SbsField<String> {
    pub fn text (s: &str)->Self {
        if s.is_empty() { SbsField::Absent } else { SbsField::Value(s.to_string()) }
    }
}

impl<T> SbsField<T> where T: FromStr {
    /// convert non-empty input, falling back to `Invalid` if it is not a valid T. Surrounding
    /// whitespace is ignored for the conversion but preserved in `Invalid` values
    pub fn parse (s: &str)->Self {
        if s.is_empty() {
            SbsField::Absent
        } else {
            match s.trim().parse::<T>() {
                Ok(v) => SbsField::Value(v),
                Err(_) => SbsField::Invalid(s.to_string())
            }
        }
    }
}

impl SbsField<bool> {
    /// SBS flags are numerals, anything non-zero is set
    pub fn flag (s: &str)->Self {
        match SbsField::<i64>::parse(s) {
            SbsField::Value(n) => SbsField::Value(n != 0),
            SbsField::Invalid(raw) => SbsField::Invalid(raw),
            SbsField::Absent => SbsField::Absent
        }
    }
}

impl<T> fmt::Display for SbsField<T> where T: fmt::Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbsField::Absent => write!(f, "-"),
            SbsField::Value(v) => write!(f, "{v}"),
            SbsField::Invalid(raw) => write!(f, "?{raw:?}")
        }
    }
}

/// parse a single SBS line into a (partial) aircraft record
///
/// SBS as documented on http://woodair.net/SBS/Article/Barebones42_Socket_Data.htm
///
/// Message examples:
///  MSG,1,111,11111,AA2BC2,111111,2016/03/11,13:07:16.663,2016/03/11,13:07:16.626,UAL814  ,,,,,,,,,,,0
///  MSG,3,111,11111,A04424,111111,2016/03/11,13:07:05.343,2016/03/11,13:07:05.288,,11025,,,37.17274,-122.03935,,,,,,0
///  MSG,4,111,11111,AC1FCC,111111,2016/03/11,13:07:07.777,2016/03/11,13:07:07.713,,,316,106,,,1536,,,,,0
///
/// Only lines with exactly 22 fields and a `MSG` message type are accepted. Lines without a
/// hex_ident cannot be aggregated and are rejected as well. All other fields are lenient: a field
/// that does not convert ends up as `SbsField::Invalid` instead of failing the line
pub fn parse_msg (line: &str)->Option<AircraftRecord> {
    let parts: Vec<&str> = line.trim().split(',').collect();
    if parts.len() != SBS1_FIELD_COUNT || parts[0] != TRANSMISSION_MSG {
        return None
    }

    let hex_ident = parts[4];
    if hex_ident.is_empty() {
        return None
    }

    Some( AircraftRecord {
        hex_ident: hex_ident.to_string(),
        message_type: SbsField::<String>::text( parts[0]),
        transmission_type: SbsField::parse( parts[1]),
        session_id: SbsField::<String>::text( parts[2]),
        aircraft_id: SbsField::<String>::text( parts[3]),
        flight_id: SbsField::<String>::text( parts[5]),
        generated_date: SbsField::<String>::text( parts[6]),
        generated_time: SbsField::<String>::text( parts[7]),
        logged_date: SbsField::<String>::text( parts[8]),
        logged_time: SbsField::<String>::text( parts[9]),
        callsign: SbsField::<String>::text( parts[10]),
        altitude: SbsField::parse( parts[11]),
        ground_speed: SbsField::parse( parts[12]),
        track: SbsField::parse( parts[13]),
        lat: SbsField::parse( parts[14]),
        lon: SbsField::parse( parts[15]),
        vertical_rate: SbsField::parse( parts[16]),
        squawk: SbsField::parse( parts[17]),
        alert: SbsField::<bool>::flag( parts[18]),
        emergency: SbsField::<bool>::flag( parts[19]),
        spi: SbsField::<bool>::flag( parts[20]),
        is_on_ground: SbsField::<bool>::flag( parts[21]),
    })
}
