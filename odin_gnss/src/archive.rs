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

use std::collections::HashMap;
use lazy_static::lazy_static;
use serde::{Deserialize,Serialize};
use strum::{Display,EnumIter,EnumString,IntoEnumIterator};

use crate::errors::{OdinGnssError,Result};

/// the public GNSS data archives we can retrieve from
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString,EnumIter)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase", ascii_case_insensitive)]
pub enum Archive {
    /// NASA Crustal Dynamics Data Information System
    Cddis,
    /// Institut national de l'information géographique et forestière
    Ign,
    /// Wuhan University IGS data center
    Whu,
}

/// the product kinds we know the archive layout and naming grammar of
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString,EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ProductCategory {
    /// daily observations, short (4 char site) names, Hatanaka compressed `.yyd`
    ObsDaily,
    ObsHourly,
    /// 15 min high-rate observations
    ObsHighRate,
    /// daily observations, long (9 char station id) MGEX names `.crx`
    ObmDaily,
    ObmHourly,
    ObmHighRate,
    /// broadcast ephemeris
    Nav,
    /// precise orbits
    Sp3,
    /// precise clocks
    Clk,
    /// earth orientation parameters
    Eop,
    /// weekly station position solution
    Snx,
    /// multi-GNSS precise orbits
    Sp3Mgex,
    /// multi-GNSS precise clocks
    ClkMgex,
    /// differential code/phase biases
    Dcb,
    /// global ionosphere maps
    Ion,
    /// rate of TEC index
    Roti,
    /// tropospheric zenith path delays
    Ztd,
    /// antenna phase center corrections (not archive specific)
    Atx,
}

//--- fixed providers that do not depend on the selected archive

pub const GFZ_ULTRA_URL: &'static str = "ftp://ftp.gfz-potsdam.de/pub/GNSS/products/ultra";
pub const CODE_URL: &'static str = "ftp://ftp.aiub.unibe.ch/CODE";
pub const LRZ_RTNAV_URL: &'static str = "ftp://ftp.lrz.de/transfer/steigenb/brdm";
pub const CNES_RT_URL: &'static str = "http://www.ppp-wizard.net/products/REAL_TIME";
pub const IGS_STATION_URL: &'static str = "https://files.igs.org/pub/station/general";

const CDDIS_ROOT: &'static str = "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss";
const IGN_ROOT: &'static str = "ftp://igs.ign.fr/pub/igs";
const WHU_ROOT: &'static str = "ftp://igs.gnsswhu.cn/pub/gps";

lazy_static! {
    static ref REGISTRY: HashMap<(Archive,ProductCategory), String> = build_registry();
}

fn archive_dir (archive: Archive, category: ProductCategory)->Option<&'static str> {
    use ProductCategory::*;
    use Archive::*;

    let dir = match (archive, category) {
        (Cddis, ObsDaily | ObmDaily | Nav) => "data/daily",
        (Ign,   ObsDaily | ObmDaily | Nav) => "data",
        (Whu,   ObsDaily | ObmDaily | Nav) => "data/daily",

        (_, ObsHourly | ObmHourly) => "data/hourly",

        (Cddis | Ign, ObsHighRate | ObmHighRate) => "data/highrate",

        (_, Sp3 | Clk | Eop | Snx) => "products",
        (_, Sp3Mgex | ClkMgex) => "products/mgex",

        (Cddis, Dcb) => "products/bias",
        (Ign | Whu, Dcb) => "products/mgex/dcb",

        (Cddis | Whu, Ion | Roti) => "products/ionex",
        (Ign, Ion | Roti) => "products/ionosphere",

        (Cddis, Ztd) => "products/troposphere/zpd",
        (Ign, Ztd) => "products/troposphere",
        (Whu, Ztd) => "products/troposphere/new",

        _ => return None
    };
    Some(dir)
}

fn archive_root (archive: Archive)->&'static str {
    match archive {
        Archive::Cddis => CDDIS_ROOT,
        Archive::Ign => IGN_ROOT,
        Archive::Whu => WHU_ROOT,
    }
}

fn build_registry ()->HashMap<(Archive,ProductCategory), String> {
    let mut map = HashMap::new();
    for archive in Archive::iter() {
        for category in ProductCategory::iter() {
            if let Some(dir) = archive_dir( archive, category) {
                map.insert( (archive,category), format!("{}/{}", archive_root(archive), dir));
            }
        }
    }
    map
}

/// base URL of the directory tree that holds `category` products on `archive`
pub fn base_url (archive: Archive, category: ProductCategory)->Result<&'static str> {
    REGISTRY.get( &(archive,category))
        .map( |s| s.as_str())
        .ok_or_else( || OdinGnssError::UnknownCategory( archive.to_string(), category.to_string()))
}
