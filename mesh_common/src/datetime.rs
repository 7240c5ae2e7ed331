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

use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize,Serializer,Deserializer};
use std::time::Duration;
use std::fmt;
use std::ops::{Add,Sub};
use parse_duration::parse;

/// a wall clock time point with millisecond resolution. This is what we use for rate limiting
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub fn new (millis:i64)->Self { EpochMillis(millis) }

    pub fn from_secs (secs: i64)->Self { EpochMillis(secs*1000) }

    pub fn millis (&self)->i64 { self.0 }

    /// the (possibly negative) number of milliseconds between `earlier` and self
    pub fn millis_since (&self, earlier: EpochMillis)->i64 { self.0 - earlier.0 }

    /// answer if strictly more than `dur` has passed since `earlier`. Equality does not count
    pub fn is_later_than (&self, earlier: EpochMillis, dur: Duration)->bool {
        self.millis_since(earlier) > dur.as_millis() as i64
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt),
            None => write!(f, "{}ms", self.0)
        }
    }
}

impl Add<Duration> for EpochMillis {
    type Output = EpochMillis;
    fn add (self, dur: Duration)->EpochMillis { EpochMillis( self.0 + dur.as_millis() as i64) }
}

impl Sub<Duration> for EpochMillis {
    type Output = EpochMillis;
    fn sub (self, dur: Duration)->EpochMillis { EpochMillis( self.0 - dur.as_millis() as i64) }
}

// simple Duration ctors so that we don't need the experimental std ones
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

//--- support for serde

/// deserialize human readable durations such as "300s", "5min" or "1h 30m"
pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let dfm = format!("{}s", dur.as_secs_f64());
    s.serialize_str(&dfm)
}
