/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

//! calendar representations used by GNSS archive naming conventions

use std::fmt;
use chrono::{DateTime,Datelike,Duration,NaiveDate,TimeZone,Timelike,Utc};
use crate::errors::{OdinGnssError,Result};

/// the start of GPS time (week 0, day 0)
pub fn gps_epoch()->DateTime<Utc> {
    Utc.with_ymd_and_hms(1980, 1, 6, 0, 0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// the minute labels of the four high-rate slots within each hour
pub const QUARTER_LABELS: [&'static str;4] = ["00", "15", "30", "45"];

/// hour-of-day encoding used in sub-daily filenames: 0 -> 'a' .. 23 -> 'x'
pub fn hour_letter (hour: u32)->Option<char> {
    if hour < 24 { Some( (b'a' + hour as u8) as char) } else { None }
}

/// a point in time together with all its derived representations. Values are immutable and cheap to copy
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct GnssEpoch {
    time: DateTime<Utc>,
    year: i32,
    month: u32,
    doy: u32,
    hour: u32,
    minute: u32,
    gps_week: u32,
    dow: u32,
}

impl GnssEpoch {
    pub fn new (time: DateTime<Utc>)->Result<Self> {
        if time < gps_epoch() {
            return Err( OdinGnssError::EpochError( format!("{time} is before the GPS epoch")))
        }
        let days = (time - gps_epoch()).num_days();

        Ok( GnssEpoch {
            time,
            year: time.year(),
            month: time.month(),
            doy: time.ordinal(),
            hour: time.hour(),
            minute: time.minute(),
            gps_week: (days / 7) as u32,
            dow: (days % 7) as u32,
        })
    }

    /// midnight (UTC) of the given date
    pub fn from_date (date: NaiveDate)->Result<Self> {
        let dt = date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| OdinGnssError::EpochError( date.to_string()))?;
        Self::new( dt.and_utc())
    }

    pub fn from_ymd (year: i32, month: u32, day: u32)->Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| OdinGnssError::EpochError( format!("{year}-{month}-{day}")))?;
        Self::from_date(date)
    }

    pub fn from_year_doy (year: i32, doy: u32)->Result<Self> {
        let date = NaiveDate::from_yo_opt(year, doy)
            .ok_or_else(|| OdinGnssError::EpochError( format!("{year} day {doy}")))?;
        Self::from_date(date)
    }

    /// the same day at the given hour and minute
    pub fn at (&self, hour: u32, minute: u32)->Result<Self> {
        let dt = self.time.date_naive().and_hms_opt(hour, minute, 0)
            .ok_or_else(|| OdinGnssError::EpochError( format!("{} {hour}:{minute}", self.time.date_naive())))?;
        Self::new( dt.and_utc())
    }

    /// midnight of the same day
    pub fn day_start (&self)->Result<Self> {
        self.at(0, 0)
    }

    pub fn shifted_days (&self, days: i64)->Result<Self> {
        Self::new( self.time + Duration::days(days))
    }

    pub fn time (&self)->DateTime<Utc> { self.time }
    pub fn date (&self)->NaiveDate { self.time.date_naive() }
    pub fn year (&self)->i32 { self.year }
    pub fn month (&self)->u32 { self.month }
    pub fn doy (&self)->u32 { self.doy }
    pub fn hour (&self)->u32 { self.hour }
    pub fn minute (&self)->u32 { self.minute }
    pub fn gps_week (&self)->u32 { self.gps_week }
    pub fn day_of_week (&self)->u32 { self.dow }

    //--- the string fields as they appear in archive paths and filenames

    pub fn yyyy (&self)->String { format!("{:04}", self.year) }
    pub fn yy (&self)->String { format!("{:02}", self.year.rem_euclid(100)) }
    pub fn mo (&self)->String { format!("{:02}", self.month) }
    pub fn ddd (&self)->String { format!("{:03}", self.doy) }
    pub fn hh (&self)->String { format!("{:02}", self.hour) }
    pub fn wwww (&self)->String { format!("{:04}", self.gps_week) }
    pub fn d (&self)->String { self.dow.to_string() }

    pub fn hour_letter (&self)->char {
        hour_letter(self.hour).unwrap_or('x') // hour() is always < 24
    }

    /// label of the quarter hour this epoch falls into
    pub fn quarter_label (&self)->&'static str {
        QUARTER_LABELS[ (self.minute / 15).min(3) as usize]
    }
}

impl fmt::Display for GnssEpoch {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{} (doy {}, week {} day {})", self.time.format("%Y-%m-%d %H:%M"), self.ddd(), self.wwww(), self.dow)
    }
}
