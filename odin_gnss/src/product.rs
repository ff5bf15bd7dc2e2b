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

use std::{fmt, path::PathBuf};
use serde::{Deserialize,Serialize};
use strum::{Display,EnumString};

use crate::archive::{Archive,ProductCategory};
use crate::epoch::GnssEpoch;

/// IGS analysis centers for final, rapid and ultra-rapid orbit/clock/EOP products
pub const IGS_CENTERS: [&'static str;9] = ["igs", "igr", "igu", "cod", "esa", "gfz", "gfu", "grg", "jpl"];

/// MGEX analysis centers for multi-GNSS orbit/clock products
pub const MGEX_CENTERS: [&'static str;5] = ["com", "gbm", "grm", "wum", "wuu"];

/// CNES real-time product stream
pub const REAL_TIME_CENTER: &'static str = "cnt";

/// centers that publish several (hourly) ultra-rapid solutions per day
pub fn is_ultra_rapid (center: &str)->bool {
    matches!( center, "igu" | "gfu" | "wuu")
}

pub fn is_mgex_center (center: &str)->bool {
    MGEX_CENTERS.contains( &center)
}

/// satellite system selector for broadcast navigation files
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase", ascii_case_insensitive)]
pub enum NavSystem { Gps, Glo, Bds, Gal, Qzs, Irn, Mixed, All }

/// the site specific hourly navigation file variants
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum HourlyNav {
    GpsShort, GpsLong,
    GloShort, GloLong,
    Bds, Gal, Qzs, Irn, Mixed
}

impl HourlyNav {
    /// the variants to retrieve for a given system selector
    pub fn variants (sys: NavSystem)->Vec<HourlyNav> {
        use HourlyNav::*;
        match sys {
            NavSystem::Gps => vec![GpsShort, GpsLong],
            NavSystem::Glo => vec![GloShort, GloLong],
            NavSystem::Bds => vec![Bds],
            NavSystem::Gal => vec![Gal],
            NavSystem::Qzs => vec![Qzs],
            NavSystem::Irn => vec![Irn],
            NavSystem::Mixed => vec![Mixed],
            NavSystem::All => vec![GpsShort, GpsLong, GloShort, GloLong, Bds, Gal, Qzs, Irn, Mixed],
        }
    }
}

/// which broadcast navigation file
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum NavFile {
    /// daily GPS `brdc` file
    Gps,
    /// daily GLONASS `brdc` file
    Glo,
    /// daily merged multi-GNSS file, stored as `brdm`
    Mixed,
    /// real-time merged multi-GNSS file
    RealTime,
    Hourly(HourlyNav),
}

/// which bias file
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum DcbFile {
    /// daily multi-GNSS DCB from CAS
    Mgex,
    /// monthly CODE P1-P2 DCB
    P1P2,
    /// monthly CODE P1-C1 DCB
    P1C1,
    /// monthly CODE P2-C2 DCB
    P2C2,
    /// CNES real-time code and phase biases
    RealTimeBias,
}

/// the product specific selector that goes with a category
#[derive(Debug,Clone,PartialEq,Eq,Hash)]
pub enum ProductOption {
    None,
    /// analysis center (lower case), e.g. "cod"
    Center(String),
    Nav(NavFile),
    Dcb(DcbFile),
}

impl ProductOption {
    pub fn center (c: &str)->Self { ProductOption::Center( c.to_lowercase()) }

    pub fn center_str (&self)->Option<&str> {
        if let ProductOption::Center(c) = self { Some(c.as_str()) } else { None }
    }
}

impl fmt::Display for ProductOption {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductOption::None => Ok(()),
            ProductOption::Center(c) => write!(f, "{c}"),
            ProductOption::Nav(n) => write!(f, "{n:?}"),
            ProductOption::Dcb(d) => write!(f, "{d:?}"),
        }
    }
}

/// the atomic retrieval task: one product file (or one all-stations listing if `site` is None for
/// a site specific category) for one epoch, stored in an explicit absolute `target_dir`
#[derive(Debug,Clone,PartialEq,Eq,Hash)]
pub struct RetrievalUnit {
    pub epoch: GnssEpoch,
    pub category: ProductCategory,
    pub archive: Archive,
    pub site: Option<String>,
    pub option: ProductOption,
    pub target_dir: PathBuf,
}

impl RetrievalUnit {
    pub fn new (epoch: GnssEpoch, category: ProductCategory, archive: Archive, option: ProductOption, target_dir: PathBuf)->Self {
        RetrievalUnit { epoch, category, archive, site: None, option, target_dir }
    }

    pub fn with_site (mut self, site: &str)->Self {
        self.site = Some( site.to_lowercase());
        self
    }

    /// the same unit for another (derived) site
    pub fn for_site (&self, site: &str)->Self {
        self.clone().with_site(site)
    }
}

impl fmt::Display for RetrievalUnit {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)?;
        if self.option != ProductOption::None { write!(f, "[{}]", self.option)?; }
        if let Some(site) = &self.site { write!(f, " {site}")?; }
        write!(f, " {} from {}", self.epoch, self.archive)
    }
}
