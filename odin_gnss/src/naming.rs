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

//! the remote location and naming grammar of all supported products.
//!
//! Each (category,option) pair maps to a [`Grammar`] table entry that holds filename templates. Templates
//! use the following placeholders, which are expanded from the unit epoch, site and analysis center:
//!
//! | placeholder | value |
//! |-------------|-------|
//! | `{yyyy}` `{yy}` | 4 and 2 digit year |
//! | `{mo}` | 2 digit month |
//! | `{ddd}` | 3 digit day of year |
//! | `{hh}` `{h}` | 2 digit hour, hour letter ('a'..'x') |
//! | `{mi}` | quarter hour label (00,15,30,45) |
//! | `{wwww}` `{d}` | GPS week, day of week |
//! | `{site}` `{SITE}` | lower case short site name, upper case long station id prefix |
//! | `{ac}` `{pfx}` | analysis center, MGEX product prefix of analysis center |
//!
//! In all-stations mode `{site}` expands to `*` and `{SITE}` to an empty string (long names are always
//! followed by a wildcard for the monument/receiver/country part of the station id).

use crate::archive::{self,Archive,ProductCategory};
use crate::epoch::GnssEpoch;
use crate::errors::{no_template,Result};
use crate::product::{DcbFile,HourlyNav,NavFile,ProductOption,RetrievalUnit,IGS_CENTERS,REAL_TIME_CENTER};

/// compression suffixes in the order in which we try them
pub const COMPRESSED: &'static [&'static str] = &[".gz", ".Z"];
pub const GZ_ONLY: &'static [&'static str] = &[".gz"];
pub const UNCOMPRESSED: &'static [&'static str] = &[];

const REPRO3: &'static [&'static str] = &["repro3"];
const TOPEX: &'static [&'static str] = &["topex"];
const CNES_DIRS: &'static [&'static str] = &["FORMAT_BIAIS_OFFI1", "FORMATBIAS_OFF_v1"];

/// how the transfer agent has to address remote files
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FetchMode {
    /// recursive retrieval of the remote dir, accepting only files matching the pattern
    Listing,
    /// retrieval of `<url>/<filename><compression>`, for servers without directory listings
    Direct,
}

/// what the orchestrator needs to know to retrieve a single product file
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct FileSpec {
    /// remote directory URL
    pub url: String,
    /// remote filename patterns without compression suffix, in the order in which they are tried
    pub patterns: Vec<String>,
    pub compression: &'static [&'static str],
    pub fetch: FetchMode,
    /// number of leading remote path segments the transfer agent strips
    pub cut_dirs: u32,
    /// canonical local filename
    pub local_name: String,
    /// compact (Hatanaka) file the canonical observation file is converted from
    pub intermediate: Option<String>,
    pub transient_dirs: &'static [&'static str],
}

impl FileSpec {
    pub fn remote_pattern (&self)->&str {
        self.patterns.first().map( |s| s.as_str()).unwrap_or("")
    }

    pub fn needs_conversion (&self)->bool {
        self.intermediate.is_some()
    }

    /// the name the decompressed file has to have before conversion
    pub fn stage_name (&self)->&str {
        self.intermediate.as_deref().unwrap_or( self.local_name.as_str())
    }
}

/// what the orchestrator needs to know to retrieve all station files of a site specific category
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct BulkSpec {
    pub url: String,
    pub pattern: String,
    pub compression: &'static [&'static str],
    pub cut_dirs: u32,
    pub transient_dirs: &'static [&'static str],
}

/* #region grammar table *****************************************************************/

#[derive(Debug,Clone,Copy)]
enum Source {
    /// registry directory of the given category on the selected archive
    Archive(ProductCategory),
    /// fixed provider URL, sub-path template and cut dirs
    Fixed(&'static str, &'static str, u32),
}

#[derive(Debug,Clone)]
struct Grammar {
    source: Source,
    remote: Vec<&'static str>,
    local: &'static str,
    intermediate: Option<&'static str>,
    compression: &'static [&'static str],
    fetch: FetchMode,
    transient: &'static [&'static str],
    site_specific: bool,
    bulk: bool,
}

impl Grammar {
    fn archive (category: ProductCategory, remote: &'static str, local: &'static str)->Self {
        Grammar {
            source: Source::Archive(category),
            remote: vec![remote],
            local,
            intermediate: None,
            compression: COMPRESSED,
            fetch: FetchMode::Listing,
            transient: &[],
            site_specific: false,
            bulk: false
        }
    }

    fn fixed (url: &'static str, sub: &'static str, cut_dirs: u32, remote: &'static str, local: &'static str)->Self {
        Grammar { source: Source::Fixed(url, sub, cut_dirs), ..Self::archive( ProductCategory::Atx, remote, local) }
    }

    fn cnes (name: &'static str)->Self {
        Self::fixed( archive::CNES_RT_URL, "", 2, name, name).direct(GZ_ONLY).transient(CNES_DIRS)
    }

    fn converted_from (mut self, intermediate: &'static str)->Self {
        self.intermediate = Some(intermediate);
        self
    }

    /// site specific product that also supports all-stations retrieval
    fn per_site (mut self)->Self {
        self.site_specific = true;
        self.bulk = true;
        self
    }

    /// site specific product that can only be retrieved per site
    fn per_site_only (mut self)->Self {
        self.site_specific = true;
        self
    }

    fn transient (mut self, dirs: &'static [&'static str])->Self {
        self.transient = dirs;
        self
    }

    fn direct (mut self, compression: &'static [&'static str])->Self {
        self.fetch = FetchMode::Direct;
        self.compression = compression;
        self
    }

    fn or_else (mut self, remote: &'static str)->Self {
        self.remote.push(remote);
        self
    }
}

fn grammar (archive: Archive, category: ProductCategory, option: &ProductOption)->Result<Grammar> {
    use ProductCategory::*;
    use ProductOption as O;
    type G = Grammar;

    let g = match (category, option) {
        //--- observations, short names
        (ObsDaily, O::None) => G::archive( ObsDaily, "{site}{ddd}0.{yy}d", "{site}{ddd}0.{yy}o")
            .converted_from( "{site}{ddd}0.{yy}d").per_site(),
        (ObsHourly, O::None) => G::archive( ObsHourly, "{site}{ddd}{h}.{yy}d", "{site}{ddd}{h}.{yy}o")
            .converted_from( "{site}{ddd}{h}.{yy}d").per_site(),
        (ObsHighRate, O::None) => G::archive( ObsHighRate, "{site}{ddd}{h}{mi}.{yy}d", "{site}{ddd}{h}{mi}.{yy}o")
            .converted_from( "{site}{ddd}{h}{mi}.{yy}d").per_site(),

        //--- observations, long (MGEX) names
        (ObmDaily, O::None) => G::archive( ObmDaily, "{SITE}*_R_{yyyy}{ddd}0000_01D_30S_MO.crx", "{site}{ddd}0.{yy}o")
            .converted_from( "{site}{ddd}0.{yy}d").per_site(),
        (ObmHourly, O::None) => G::archive( ObmHourly, "{SITE}*_R_{yyyy}{ddd}{hh}00_01H_30S_MO.crx", "{site}{ddd}{h}.{yy}o")
            .converted_from( "{site}{ddd}{h}.{yy}d").per_site(),
        (ObmHighRate, O::None) => G::archive( ObmHighRate, "{SITE}*_R_{yyyy}{ddd}{hh}{mi}_15M_01S_MO.crx", "{site}{ddd}{h}{mi}.{yy}o")
            .converted_from( "{site}{ddd}{h}{mi}.{yy}d").per_site(),

        //--- broadcast navigation
        (Nav, O::Nav(NavFile::Gps)) => G::archive( Nav, "brdc{ddd}0.{yy}n", "brdc{ddd}0.{yy}n"),
        (Nav, O::Nav(NavFile::Glo)) => G::archive( Nav, "brdc{ddd}0.{yy}g", "brdc{ddd}0.{yy}g"),
        (Nav, O::Nav(NavFile::Mixed)) => {
            let remote = if archive == Archive::Ign {
                "BRDC00IGN_R_{yyyy}{ddd}0000_01D_MN.rnx"
            } else {
                "BRDC00IGS_R_{yyyy}{ddd}0000_01D_MN.rnx"
            };
            G::archive( Nav, remote, "brdm{ddd}0.{yy}p")
        }
        (Nav, O::Nav(NavFile::RealTime)) => G::fixed( archive::LRZ_RTNAV_URL, "", 3, "brdm{ddd}z.{yy}p", "brdm{ddd}z.{yy}p"),
        (Nav, O::Nav(NavFile::Hourly(variant))) => {
            let (remote, local) = hourly_nav_names(*variant);
            G::archive( ObmHourly, remote, local).per_site_only()
        }

        //--- precise orbits, clocks and earth orientation
        (Sp3, O::Center(ac)) => match ac.as_str() {
            "igu" => G::archive( Sp3, "igu{wwww}{d}_{hh}.sp3", "igu{wwww}{d}_{hh}.sp3").transient(REPRO3),
            "gfu" => G::fixed( archive::GFZ_ULTRA_URL, "/w{wwww}", 5, "gfu{wwww}{d}_{hh}.sp3", "gfu{wwww}{d}_{hh}.sp3"),
            "cod" => G::archive( Sp3, "cod{wwww}{d}.eph", "cod{wwww}{d}.eph").transient(REPRO3),
            REAL_TIME_CENTER => G::cnes( "cnt{wwww}{d}.sp3"),
            ac if IGS_CENTERS.contains(&ac) => G::archive( Sp3, "{ac}{wwww}{d}.sp3", "{ac}{wwww}{d}.sp3").transient(REPRO3),
            _ => return Err( unsupported( category, option))
        }
        (Clk, O::Center(ac)) => match ac.as_str() {
            "igu" | "gfu" => return Err( no_template( format!("ultra-rapid center {ac} has no clock product"))),
            "cod" => G::archive( Clk, "cod{wwww}{d}.clk_05s", "cod{wwww}{d}.clk_05s").transient(REPRO3),
            "igs" => G::archive( Clk, "igs{wwww}{d}.clk_30s", "igs{wwww}{d}.clk_30s").transient(REPRO3),
            REAL_TIME_CENTER => G::cnes( "cnt{wwww}{d}.clk"),
            ac if IGS_CENTERS.contains(&ac) => G::archive( Clk, "{ac}{wwww}{d}.clk", "{ac}{wwww}{d}.clk").transient(REPRO3),
            _ => return Err( unsupported( category, option))
        }
        (Eop, O::Center(ac)) => match ac.as_str() {
            "igu" => G::archive( Eop, "igu{wwww}{d}_{hh}.erp", "igu{wwww}{d}_{hh}.erp").transient(REPRO3),
            "gfu" => G::fixed( archive::GFZ_ULTRA_URL, "/w{wwww}", 5, "gfu{wwww}{d}_{hh}.erp", "gfu{wwww}{d}_{hh}.erp"),
            "igr" => G::archive( Eop, "igr{wwww}{d}.erp", "igr{wwww}{d}.erp").transient(REPRO3),
            ac if IGS_CENTERS.contains(&ac) => G::archive( Eop, "{ac}{wwww}7.erp", "{ac}{wwww}7.erp").transient(REPRO3),
            _ => return Err( unsupported( category, option))
        }
        (Snx, O::None) => G::archive( Snx, "igs*P{wwww}.snx", "igs{wwww}.snx")
            .or_else( "igs*P{wwww}{d}.snx")
            .transient(REPRO3),

        //--- multi-GNSS orbits and clocks
        (Sp3Mgex, O::Center(ac)) => match ac.as_str() {
            "wuu" => G::archive( Sp3Mgex, "WUM0MGXULA_{yyyy}{ddd}{hh}00_01D_05M_ORB.SP3", "WUM0MGXULA_{yyyy}{ddd}{hh}00_01D_05M_ORB.SP3"),
            ac if mgex_prefix(ac).is_some() => G::archive( Sp3Mgex, "{pfx}_{yyyy}{ddd}0000_01D_*_ORB.SP3", "{ac}{wwww}{d}.sp3"),
            _ => return Err( unsupported( category, option))
        }
        (ClkMgex, O::Center(ac)) => match ac.as_str() {
            "wuu" => return Err( no_template( "ultra-rapid center wuu has no clock product")),
            ac if mgex_prefix(ac).is_some() => G::archive( ClkMgex, "{pfx}_{yyyy}{ddd}0000_01D_*_CLK.CLK", "{ac}{wwww}{d}.clk"),
            _ => return Err( unsupported( category, option))
        }

        //--- biases
        (Dcb, O::Dcb(DcbFile::Mgex)) => G::archive( Dcb, "CAS0MGXRAP_{yyyy}{ddd}0000_01D_01D_DCB.BSX", "CAS0MGXRAP_{yyyy}{ddd}0000_01D_01D_DCB.BSX"),
        (Dcb, O::Dcb(DcbFile::P1P2)) => G::fixed( archive::CODE_URL, "/{yyyy}", 2, "P1P2{yy}{mo}.DCB", "P1P2{yy}{mo}.DCB"),
        (Dcb, O::Dcb(DcbFile::P1C1)) => G::fixed( archive::CODE_URL, "/{yyyy}", 2, "P1C1{yy}{mo}.DCB", "P1C1{yy}{mo}.DCB"),
        (Dcb, O::Dcb(DcbFile::P2C2)) => G::fixed( archive::CODE_URL, "/{yyyy}", 2, "P2C2{yy}{mo}_RINEX.DCB", "P2C2{yy}{mo}.DCB"),
        (Dcb, O::Dcb(DcbFile::RealTimeBias)) => G::cnes( "cnt{wwww}{d}.bia"),

        //--- atmosphere
        (Ion, O::Center(ac)) if is_center_code(ac) => G::archive( Ion, "{ac}g{ddd}0.{yy}i", "{ac}g{ddd}0.{yy}i").transient(TOPEX),
        (Roti, O::None) => G::archive( Roti, "roti{ddd}0.{yy}f", "roti{ddd}0.{yy}f").transient(TOPEX),
        (Ztd, O::Center(ac)) => match ac.as_str() {
            "igs" => G::archive( Ztd, "{site}{ddd}0.{yy}zpd", "{site}{ddd}0.{yy}zpd").per_site(),
            "cod" => G::fixed( archive::CODE_URL, "/{yyyy}", 2, "COD{wwww}{d}.TRO", "COD{wwww}{d}.TRO"),
            _ => return Err( unsupported( category, option))
        }

        //--- tables
        (Atx, O::None) => G::fixed( archive::IGS_STATION_URL, "", 3, "igs14.atx", "igs14.atx").direct(UNCOMPRESSED),

        _ => return Err( unsupported( category, option))
    };

    Ok(g)
}

fn unsupported (category: ProductCategory, option: &ProductOption)->crate::errors::OdinGnssError {
    no_template( format!("{category} does not support option '{option}'"))
}

fn is_center_code (ac: &str)->bool {
    ac.len() == 3 && ac.chars().all( |c| c.is_ascii_alphanumeric())
}

/// the long product name prefix of MGEX analysis centers
pub fn mgex_prefix (center: &str)->Option<&'static str> {
    match center {
        "com" => Some("COD0MGXFIN"),
        "gbm" => Some("GFZ0MGXRAP"),
        "grm" => Some("GRG0MGXFIN"),
        "wum" => Some("WUM0MGXFIN"),
        _ => None
    }
}

fn hourly_nav_names (variant: HourlyNav)->(&'static str, &'static str) {
    match variant {
        HourlyNav::GpsShort => ("{site}{ddd}{h}.{yy}n", "{site}{ddd}{h}.{yy}n"),
        HourlyNav::GloShort => ("{site}{ddd}{h}.{yy}g", "{site}{ddd}{h}.{yy}g"),
        HourlyNav::GpsLong => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_GN.rnx", "{site}{ddd}{h}.{yy}gn"),
        HourlyNav::GloLong => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_RN.rnx", "{site}{ddd}{h}.{yy}rn"),
        HourlyNav::Bds => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_CN.rnx", "{site}{ddd}{h}.{yy}cn"),
        HourlyNav::Gal => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_EN.rnx", "{site}{ddd}{h}.{yy}en"),
        HourlyNav::Qzs => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_JN.rnx", "{site}{ddd}{h}.{yy}jn"),
        HourlyNav::Irn => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_IN.rnx", "{site}{ddd}{h}.{yy}in"),
        HourlyNav::Mixed => ("{SITE}*_R_{yyyy}{ddd}{hh}00_01H_MN.rnx", "{site}{ddd}{h}.{yy}mn"),
    }
}

/// sub-path template and cut dirs of a category on an archive. The cut dirs are the number of
/// path segments of the full remote directory URL
fn archive_path (archive: Archive, category: ProductCategory)->Option<(&'static str, u32)> {
    use ProductCategory::*;
    use Archive::*;

    let rule = match (category, archive) {
        (ObsDaily | ObmDaily, Ign) => ("{yyyy}/{ddd}", 5),
        (ObsDaily | ObmDaily, _) => ("{yyyy}/{ddd}/{yy}d", 7),
        (ObsHourly | ObmHourly, Ign) => ("{yyyy}/{ddd}", 6),
        (ObsHourly | ObmHourly, _) => ("{yyyy}/{ddd}/{hh}", 7),
        (ObsHighRate | ObmHighRate, Ign) => ("{yyyy}/{ddd}", 6),
        (ObsHighRate | ObmHighRate, Cddis) => ("{yyyy}/{ddd}/{yy}d/{hh}", 8),
        (Nav, Ign) => ("{yyyy}/{ddd}", 5),
        (Nav, _) => ("{yyyy}/brdc", 6),
        (Sp3 | Clk | Eop | Snx, _) => ("{wwww}", 4),
        (Sp3Mgex | ClkMgex, _) => ("{wwww}", 5),
        (Dcb, Cddis) => ("{yyyy}", 5),
        (Dcb, _) => ("{yyyy}", 6),
        (Ion | Roti, _) => ("{yyyy}/{ddd}", 6),
        (Ztd, Ign) => ("{yyyy}/{ddd}", 6),
        (Ztd, _) => ("{yyyy}/{ddd}", 7),
        _ => return None
    };
    Some(rule)
}

/* #endregion grammar table */

/* #region template expansion ************************************************************/

struct Fields<'a> {
    epoch: &'a GnssEpoch,
    site: Option<&'a str>,
    center: &'a str,
}

impl <'a> Fields<'a> {
    fn new (epoch: &'a GnssEpoch, site: Option<&'a str>, option: &'a ProductOption)->Self {
        Fields { epoch, site, center: option.center_str().unwrap_or("") }
    }

    fn value (&self, key: &str)->Option<String> {
        let e = self.epoch;
        let v = match key {
            "yyyy" => e.yyyy(),
            "yy" => e.yy(),
            "mo" => e.mo(),
            "ddd" => e.ddd(),
            "hh" => e.hh(),
            "h" => e.hour_letter().to_string(),
            "mi" => e.quarter_label().to_string(),
            "wwww" => e.wwww(),
            "d" => e.d(),
            "site" => self.site.map( |s| short_site(s).to_lowercase()).unwrap_or_else( || "*".to_string()),
            "SITE" => self.site.map( |s| short_site(s).to_uppercase()).unwrap_or_default(),
            "ac" => self.center.to_string(),
            "pfx" => mgex_prefix( self.center).unwrap_or("").to_string(),
            _ => return None
        };
        Some(v)
    }
}

/// the 4 character site name of either a short or long station identifier
pub fn short_site (site: &str)->&str {
    match site.char_indices().nth(4) {
        Some((idx,_)) => &site[..idx],
        None => site
    }
}

fn expand (template: &str, fields: &Fields)->String {
    let mut out = String::with_capacity( template.len() + 16);
    let mut rest = template;

    while let Some(i0) = rest.find('{') {
        out.push_str( &rest[..i0]);
        let tail = &rest[i0..];
        match tail.find('}') {
            Some(i1) => {
                match fields.value( &tail[1..i1]) {
                    Some(v) => out.push_str( &v),
                    None => out.push_str( &tail[..=i1])
                }
                rest = &tail[i1+1..];
            }
            None => {
                out.push_str( tail);
                rest = "";
            }
        }
    }
    out.push_str( rest);
    out
}

/* #endregion template expansion */

fn remote_dir (archive: Archive, category: ProductCategory, g: &Grammar, fields: &Fields)->Result<(String,u32)> {
    match g.source {
        Source::Archive(dir_category) => {
            let base = archive::base_url( archive, dir_category)?;
            let (sub, cut_dirs) = archive_path( archive, dir_category)
                .ok_or_else( || no_template( format!("{category} has no path template on {archive}")))?;
            Ok( (format!("{base}/{}", expand( sub, fields)), cut_dirs) )
        }
        Source::Fixed(url, sub, cut_dirs) => {
            Ok( (format!("{url}{}", expand( sub, fields)), cut_dirs) )
        }
    }
}

/// does the unit category require a site (or all-stations mode)
pub fn requires_site (archive: Archive, category: ProductCategory, option: &ProductOption)->Result<bool> {
    Ok( grammar( archive, category, option)?.site_specific )
}

/// the location and names of the product file for a single (site) unit.
/// This is a pure function of the unit fields
pub fn synthesize (unit: &RetrievalUnit)->Result<FileSpec> {
    let g = grammar( unit.archive, unit.category, &unit.option)?;

    if g.site_specific && unit.site.is_none() {
        return Err( no_template( format!("{} requires a site", unit.category)))
    }
    let site = if g.site_specific { unit.site.as_deref() } else { None };

    let fields = Fields::new( &unit.epoch, site, &unit.option);
    let (url, cut_dirs) = remote_dir( unit.archive, unit.category, &g, &fields)?;

    Ok( FileSpec {
        url,
        patterns: g.remote.iter().map( |t| expand( t, &fields)).collect(),
        compression: g.compression,
        fetch: g.fetch,
        cut_dirs,
        local_name: expand( g.local, &fields),
        intermediate: g.intermediate.map( |t| expand( t, &fields)),
        transient_dirs: g.transient,
    })
}

/// the location and wildcard pattern to retrieve the files of all stations in one pass
pub fn synthesize_bulk (unit: &RetrievalUnit)->Result<BulkSpec> {
    let g = grammar( unit.archive, unit.category, &unit.option)?;
    if !g.bulk {
        return Err( no_template( format!("{} {} has no all-stations listing", unit.category, unit.option)))
    }

    let fields = Fields::new( &unit.epoch, None, &unit.option);
    let (url, cut_dirs) = remote_dir( unit.archive, unit.category, &g, &fields)?;
    let pattern = g.remote.first().map( |t| expand( t, &fields)).unwrap_or_default();

    Ok( BulkSpec { url, pattern, compression: g.compression, cut_dirs, transient_dirs: g.transient })
}
