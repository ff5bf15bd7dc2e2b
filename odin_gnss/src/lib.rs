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
#![doc = include_str!("../doc/odin_gnss.md")]

use std::{path::{Path,PathBuf}, time::Duration};
use chrono::{NaiveDate,Utc};
use serde::{Deserialize,Serialize};

use odin_build::define_load_config;

pub mod epoch;
pub mod archive;
pub mod product;
pub mod naming;
pub mod agents;
pub mod retrieve;
pub mod batch;

mod errors;
pub use errors::*;

use archive::Archive;
use agents::ToolConfig;
use product::NavSystem;

define_load_config!{}

/// general retrieval configuration
#[derive(Clone,Serialize,Deserialize,Debug)]
#[serde(default)]
pub struct GnssConfig {
    /// the archive to retrieve from
    pub archive: Archive,

    /// first day to retrieve
    pub start_date: NaiveDate,

    /// number of consecutive days
    pub days: u32,

    /// also retrieve orbit/clock products of the previous and next day
    pub day_window: bool,

    /// max number of units that are processed concurrently
    pub max_concurrent: usize,

    /// max duration of a single transfer agent invocation
    pub transfer_timeout: Duration,

    /// how often to repeat transfers that failed with a network error or timed out
    pub max_retry: u32,
    pub retry_delay: Duration,
    /// transfer agent exit codes that count as network errors (wget uses 4)
    pub retry_exit_codes: Vec<i32>,

    pub tools: ToolConfig,
    pub dirs: ProductDirs,
    pub requests: ProductRequests,
}

impl Default for GnssConfig {
    fn default()->Self {
        GnssConfig {
            archive: Archive::Cddis,
            start_date: Utc::now().date_naive(),
            days: 1,
            day_window: false,
            max_concurrent: 1,
            transfer_timeout: Duration::from_secs(600),
            max_retry: 0,
            retry_delay: Duration::from_secs(10),
            retry_exit_codes: vec![4],
            tools: ToolConfig::default(),
            dirs: ProductDirs::default(),
            requests: ProductRequests::default(),
        }
    }
}

/// where products are stored. Relative dirs are resolved against `root`
#[derive(Clone,Serialize,Deserialize,Debug)]
#[serde(default)]
pub struct ProductDirs {
    pub root: PathBuf,
    pub obs: PathBuf,
    pub obm: PathBuf,
    pub nav: PathBuf,
    pub sp3: PathBuf,
    pub clk: PathBuf,
    pub eop: PathBuf,
    pub snx: PathBuf,
    pub dcb: PathBuf,
    pub ion: PathBuf,
    pub ztd: PathBuf,
    pub bia: PathBuf,
    pub tbl: PathBuf,
}

impl Default for ProductDirs {
    fn default()->Self {
        ProductDirs {
            root: PathBuf::from("gnss"),
            obs: PathBuf::from("obs"),
            obm: PathBuf::from("obm"),
            nav: PathBuf::from("nav"),
            sp3: PathBuf::from("sp3"),
            clk: PathBuf::from("clk"),
            eop: PathBuf::from("eop"),
            snx: PathBuf::from("snx"),
            dcb: PathBuf::from("dcb"),
            ion: PathBuf::from("ion"),
            ztd: PathBuf::from("ztd"),
            bia: PathBuf::from("bia"),
            tbl: PathBuf::from("tbl"),
        }
    }
}

impl ProductDirs {
    /// the absolute path of a product dir
    pub fn resolve (&self, dir: &Path)->PathBuf {
        let path = if dir.is_absolute() { dir.to_path_buf() } else { self.root.join(dir) };
        std::path::absolute( &path).unwrap_or( path)
    }
}

/// observation file time span
#[derive(Clone,Copy,Serialize,Deserialize,Debug,PartialEq,Eq)]
pub enum ObsSpan { Daily, Hourly, HighRate }

/// which stations to retrieve
#[derive(Clone,Serialize,Deserialize,Debug,PartialEq,Eq)]
pub enum SiteSelection {
    /// all stations of the archive, retrieved with a single listing transfer
    All,
    /// stations listed in a site-list file (one station id per line)
    List(PathBuf),
}

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct ObsRequest {
    pub span: ObsSpan,
    pub sites: SiteSelection,
    /// hours of day for hourly and high-rate spans. Empty means all hours
    #[serde(default)]
    pub hours: Vec<u32>,
}

#[derive(Clone,Copy,Serialize,Deserialize,Debug,PartialEq,Eq)]
pub enum NavType { Daily, Hourly, RealTime }

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct NavRequest {
    pub nav_type: NavType,
    pub system: NavSystem,
    /// stations for hourly navigation files
    #[serde(default="all_sites")]
    pub sites: SiteSelection,
    #[serde(default)]
    pub hours: Vec<u32>,
}

fn all_sites()->SiteSelection { SiteSelection::All }

/// product of an analysis center
#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct CenterRequest {
    pub center: String,
    /// hours of the ultra-rapid solutions. Empty means every 6 hours
    #[serde(default)]
    pub hours: Vec<u32>,
}

#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct TrpRequest {
    /// "igs" (per station ZPD) or "cod" (global CODE troposphere)
    pub center: String,
    #[serde(default="all_sites")]
    pub sites: SiteSelection,
}

/// what to retrieve. Unset entries are skipped
#[derive(Clone,Serialize,Deserialize,Debug,Default)]
#[serde(default)]
pub struct ProductRequests {
    /// short name observations
    pub obs: Option<ObsRequest>,
    /// long name (MGEX) observations
    pub obm: Option<ObsRequest>,
    pub nav: Option<NavRequest>,
    /// precise orbit and clock
    pub orbclk: Option<CenterRequest>,
    pub eop: Option<CenterRequest>,
    /// weekly IGS station solution
    pub snx: bool,
    /// MGEX and CODE differential code biases
    pub dcb: bool,
    /// analysis center of global ionosphere maps
    pub ion: Option<String>,
    pub roti: bool,
    pub trp: Option<TrpRequest>,
    /// CNES real-time orbit and clock
    pub rt_orbclk: bool,
    /// CNES real-time biases
    pub rt_bias: bool,
    /// IGS antenna phase center corrections
    pub atx: bool,
}
