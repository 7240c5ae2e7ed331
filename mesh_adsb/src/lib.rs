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

use std::{collections::HashMap, fmt};

pub mod sbs;
use sbs::SbsField;

pub mod config;
pub mod sink;
pub mod dispatch;
pub mod stream;
pub mod relay;

pub mod errors;
use crate::errors::{MeshAdsbError,Result};

/// the accumulated state of a single aircraft. This is also the type of the partial updates we get from
/// parsing a single SBS line, where most fields are absent
#[derive(Debug,Clone,Default,PartialEq)]
pub struct AircraftRecord {
    pub hex_ident: String,

    pub transmission_type: SbsField<i64>,
    pub callsign: SbsField<String>,
    pub altitude: SbsField<i64>,     // feet
    pub ground_speed: SbsField<i64>, // knots
    pub track: SbsField<i64>,        // degrees
    pub lat: SbsField<f64>,
    pub lon: SbsField<f64>,
    pub vertical_rate: SbsField<i64>, // feet/min
    pub squawk: SbsField<i64>,
    pub alert: SbsField<bool>,
    pub emergency: SbsField<bool>,
    pub spi: SbsField<bool>,
    pub is_on_ground: SbsField<bool>,

    // passthrough fields we don't use downstream
    pub message_type: SbsField<String>,
    pub session_id: SbsField<String>,
    pub aircraft_id: SbsField<String>,
    pub flight_id: SbsField<String>,
    pub generated_date: SbsField<String>,
    pub generated_time: SbsField<String>,
    pub logged_date: SbsField<String>,
    pub logged_time: SbsField<String>,
}

macro_rules! merge_fields {
    ($tgt:ident, $src:ident, $( $field:ident ),*) => {
        $( $tgt.$field.merge_from( &$src.$field); )*
    }
}

impl AircraftRecord {
    pub fn new (hex_ident: impl ToString)->Self {
        AircraftRecord { hex_ident: hex_ident.to_string(), ..Default::default() }
    }

    /// overwrite every field that is present in `update`. Absent fields never erase what we already know
    pub fn merge (&mut self, update: &AircraftRecord) {
        merge_fields!( self, update,
            transmission_type, callsign, altitude, ground_speed, track, lat, lon, vertical_rate, squawk,
            alert, emergency, spi, is_on_ground,
            message_type, session_id, aircraft_id, flight_id, generated_date, generated_time, logged_date, logged_time
        );
    }

    /// do we know enough to publish this aircraft (position and callsign)
    pub fn is_reportable (&self)->bool {
        self.lat.value().is_some() && self.callsign.is_present()
    }

    /// the compact text we send to sinks, e.g. "BAW123 38000ft 51.50N/0.10W"
    pub fn text_summary (&self)->String {
        let callsign = match &self.callsign {
            SbsField::Value(s) | SbsField::Invalid(s) => s.trim(),
            SbsField::Absent => "N/A"
        };
        let alt = self.altitude.value().copied().unwrap_or(0);
        let lat = self.lat.value().copied().unwrap_or(0.0);
        let lon = self.lon.value().copied().unwrap_or(0.0);

        format!("{} {}ft {:.2}{}/{:.2}{}",
            callsign, alt,
            lat.abs(), if lat >= 0.0 {'N'} else {'S'},
            lon.abs(), if lon >= 0.0 {'E'} else {'W'}
        )
    }
}

impl fmt::Display for AircraftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] alt:{} pos:{},{} spd:{} hdg:{} vr:{} sqk:{}",
            self.hex_ident, self.callsign, self.altitude, self.lat, self.lon,
            self.ground_speed, self.track, self.vertical_rate, self.squawk)
    }
}

/// the per-aircraft state we accumulate from SBS updates, keyed by hex_ident.
/// Records are never removed, the store has exactly one owner (the relay)
#[derive(Debug,Default)]
pub struct AircraftStore {
    aircraft: HashMap<String,AircraftRecord>,
}

impl AircraftStore {
    pub fn new ()->Self {
        AircraftStore { aircraft: HashMap::new() }
    }

    /// merge a (partial) update into the record for its hex_ident, creating the record if this is the
    /// first update for this aircraft. Returns the merged record
    pub fn merge (&mut self, update: &AircraftRecord)->&AircraftRecord {
        let ac = self.aircraft.entry( update.hex_ident.clone())
            .or_insert_with( || AircraftRecord::new( &update.hex_ident));
        ac.merge( update);
        ac
    }

    pub fn get (&self, hex_ident: &str)->Option<&AircraftRecord> {
        self.aircraft.get( hex_ident)
    }

    pub fn is_reportable (&self, hex_ident: &str)->bool {
        self.aircraft.get( hex_ident).map_or( false, |ac| ac.is_reportable())
    }

    pub fn len (&self)->usize { self.aircraft.len() }

    pub fn is_empty (&self)->bool { self.aircraft.is_empty() }

    pub fn iter (&self)->impl Iterator<Item=&AircraftRecord> {
        self.aircraft.values()
    }
}
