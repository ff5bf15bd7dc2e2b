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

use std::path::PathBuf;
use strum::IntoEnumIterator;

use odin_gnss::{
    OdinGnssError,
    archive::{self,Archive,ProductCategory},
    epoch::GnssEpoch,
    naming::{synthesize,synthesize_bulk,requires_site,FetchMode,COMPRESSED,GZ_ONLY},
    product::{DcbFile,HourlyNav,NavFile,ProductOption,RetrievalUnit},
};

fn epoch (y: i32, m: u32, d: u32)->GnssEpoch {
    GnssEpoch::from_ymd( y, m, d).unwrap()
}

fn unit (epoch: GnssEpoch, category: ProductCategory, archive: Archive, option: ProductOption)->RetrievalUnit {
    RetrievalUnit::new( epoch, category, archive, option, PathBuf::from("/tmp/gnss"))
}

/// number of path segments after the host
fn url_depth (url: &str)->u32 {
    let path = url.split_once("://").map( |(_,rest)| rest).unwrap_or(url);
    path.split('/').skip(1).filter( |s| !s.is_empty()).count() as u32
}

#[test]
fn test_obs_daily_short() {
    let u = unit( epoch(2021,2,14), ProductCategory::ObsDaily, Archive::Cddis, ProductOption::None).with_site("ZIMM");
    let spec = synthesize( &u).unwrap();

    assert_eq!( spec.local_name, "zimm0450.21o");
    assert_eq!( spec.remote_pattern(), "zimm0450.21d");
    assert_eq!( spec.intermediate.as_deref(), Some("zimm0450.21d"));
    assert_eq!( spec.url, "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss/data/daily/2021/045/21d");
    assert_eq!( spec.cut_dirs, 7);
    assert_eq!( spec.compression, COMPRESSED);
    assert_eq!( spec.fetch, FetchMode::Listing);

    let u = unit( epoch(2021,2,14), ProductCategory::ObsDaily, Archive::Ign, ProductOption::None).with_site("zimm");
    let spec = synthesize( &u).unwrap();
    assert_eq!( spec.url, "ftp://igs.ign.fr/pub/igs/data/2021/045");
    assert_eq!( spec.cut_dirs, 5);
}

#[test]
fn test_determinism() {
    let u = unit( epoch(2021,2,14).at(13,30).unwrap(), ProductCategory::ObmHighRate, Archive::Cddis, ProductOption::None).with_site("zimm00che");
    assert_eq!( synthesize( &u).unwrap(), synthesize( &u).unwrap());
}

#[test]
fn test_long_names() {
    let u = unit( epoch(2021,2,14), ProductCategory::ObmDaily, Archive::Cddis, ProductOption::None).with_site("ZIMM00CHE");
    let spec = synthesize( &u).unwrap();
    assert_eq!( spec.remote_pattern(), "ZIMM*_R_20210450000_01D_30S_MO.crx");
    assert_eq!( spec.intermediate.as_deref(), Some("zimm0450.21d"));
    assert_eq!( spec.local_name, "zimm0450.21o");

    let u = unit( epoch(2021,2,14).at(13,0).unwrap(), ProductCategory::ObmHourly, Archive::Whu, ProductOption::None).with_site("zimm");
    let spec = synthesize( &u).unwrap();
    assert_eq!( spec.remote_pattern(), "ZIMM*_R_20210451300_01H_30S_MO.crx");
    assert_eq!( spec.local_name, "zimm045n.21o");
    assert_eq!( spec.url, "ftp://igs.gnsswhu.cn/pub/gps/data/hourly/2021/045/13");

    let u = unit( epoch(2021,2,14).at(13,45).unwrap(), ProductCategory::ObmHighRate, Archive::Cddis, ProductOption::None).with_site("zimm");
    let spec = synthesize( &u).unwrap();
    assert_eq!( spec.remote_pattern(), "ZIMM*_R_20210451345_15M_01S_MO.crx");
    assert_eq!( spec.local_name, "zimm045n45.21o");
    assert_eq!( spec.url, "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss/data/highrate/2021/045/21d/13");
    assert_eq!( spec.cut_dirs, 8);
}

#[test]
fn test_site_required() {
    let u = unit( epoch(2021,2,14), ProductCategory::ObsHourly, Archive::Cddis, ProductOption::None);
    assert!( requires_site( u.archive, u.category, &u.option).unwrap());
    assert!( matches!( synthesize( &u), Err(OdinGnssError::NoTemplate(_))));

    let u = unit( epoch(2021,2,14), ProductCategory::Snx, Archive::Cddis, ProductOption::None);
    assert!( !requires_site( u.archive, u.category, &u.option).unwrap());
}

#[test]
fn test_bulk_patterns() {
    let e = epoch(2021,2,14);
    let u = unit( e, ProductCategory::ObsDaily, Archive::Cddis, ProductOption::None);
    assert_eq!( synthesize_bulk( &u).unwrap().pattern, "*0450.21d");

    let u = unit( e, ProductCategory::ObmDaily, Archive::Ign, ProductOption::None);
    let bulk = synthesize_bulk( &u).unwrap();
    assert_eq!( bulk.pattern, "*_R_20210450000_01D_30S_MO.crx");
    assert_eq!( bulk.cut_dirs, 5);

    let u = unit( e, ProductCategory::Ztd, Archive::Cddis, ProductOption::center("igs"));
    assert_eq!( synthesize_bulk( &u).unwrap().pattern, "*0450.21zpd");

    let u = unit( e, ProductCategory::Nav, Archive::Cddis, ProductOption::Nav(NavFile::Gps));
    assert!( synthesize_bulk( &u).is_err());
}

#[test]
fn test_nav() {
    let e = epoch(2021,2,14);
    let spec = synthesize( &unit( e, ProductCategory::Nav, Archive::Cddis, ProductOption::Nav(NavFile::Mixed))).unwrap();
    assert_eq!( spec.remote_pattern(), "BRDC00IGS_R_20210450000_01D_MN.rnx");
    assert_eq!( spec.local_name, "brdm0450.21p");
    assert_eq!( spec.url, "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss/data/daily/2021/brdc");
    assert_eq!( spec.cut_dirs, 6);

    let spec = synthesize( &unit( e, ProductCategory::Nav, Archive::Ign, ProductOption::Nav(NavFile::Mixed))).unwrap();
    assert_eq!( spec.remote_pattern(), "BRDC00IGN_R_20210450000_01D_MN.rnx");

    let spec = synthesize( &unit( e, ProductCategory::Nav, Archive::Whu, ProductOption::Nav(NavFile::Glo))).unwrap();
    assert_eq!( spec.local_name, "brdc0450.21g");

    let spec = synthesize( &unit( e, ProductCategory::Nav, Archive::Cddis, ProductOption::Nav(NavFile::RealTime))).unwrap();
    assert_eq!( spec.local_name, "brdm045z.21p");
    assert_eq!( spec.url, archive::LRZ_RTNAV_URL);

    let u = unit( e.at(13,0).unwrap(), ProductCategory::Nav, Archive::Cddis, ProductOption::Nav(NavFile::Hourly(HourlyNav::GpsLong))).with_site("zimm");
    let spec = synthesize( &u).unwrap();
    assert_eq!( spec.remote_pattern(), "ZIMM*_R_20210451300_01H_GN.rnx");
    assert_eq!( spec.local_name, "zimm045n.21gn");
    assert_eq!( spec.url, "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss/data/hourly/2021/045/13");
}

#[test]
fn test_orbit_clock() {
    let e = epoch(2021,2,14);

    let spec = synthesize( &unit( e, ProductCategory::Sp3, Archive::Cddis, ProductOption::center("cod"))).unwrap();
    assert_eq!( spec.local_name, "cod21450.eph");
    assert_eq!( spec.url, "ftps://gdc.cddis.eosdis.nasa.gov/pub/gnss/products/2145");
    assert_eq!( spec.transient_dirs, &["repro3"]);

    let spec = synthesize( &unit( e, ProductCategory::Clk, Archive::Ign, ProductOption::center("igs"))).unwrap();
    assert_eq!( spec.local_name, "igs21450.clk_30s");

    let spec = synthesize( &unit( e.at(6,0).unwrap(), ProductCategory::Sp3, Archive::Cddis, ProductOption::center("gfu"))).unwrap();
    assert_eq!( spec.local_name, "gfu21450_06.sp3");
    assert_eq!( spec.url, "ftp://ftp.gfz-potsdam.de/pub/GNSS/products/ultra/w2145");

    let r = synthesize( &unit( e, ProductCategory::Clk, Archive::Cddis, ProductOption::center("igu")));
    assert!( matches!( r, Err(OdinGnssError::NoTemplate(_))));

    let spec = synthesize( &unit( e, ProductCategory::Sp3Mgex, Archive::Cddis, ProductOption::center("com"))).unwrap();
    assert_eq!( spec.remote_pattern(), "COD0MGXFIN_20210450000_01D_*_ORB.SP3");
    assert_eq!( spec.local_name, "com21450.sp3");
    assert_eq!( spec.cut_dirs, 5);

    let spec = synthesize( &unit( e, ProductCategory::ClkMgex, Archive::Whu, ProductOption::center("wum"))).unwrap();
    assert_eq!( spec.remote_pattern(), "WUM0MGXFIN_20210450000_01D_*_CLK.CLK");
    assert_eq!( spec.local_name, "wum21450.clk");

    let spec = synthesize( &unit( e, ProductCategory::Eop, Archive::Cddis, ProductOption::center("esa"))).unwrap();
    assert_eq!( spec.local_name, "esa21457.erp");
}

#[test]
fn test_snx_fallback() {
    let spec = synthesize( &unit( epoch(2021,2,10), ProductCategory::Snx, Archive::Cddis, ProductOption::None)).unwrap();
    assert_eq!( spec.patterns, vec!["igs*P2144.snx".to_string(), "igs*P21443.snx".to_string()]);
    assert_eq!( spec.local_name, "igs2144.snx");
}

#[test]
fn test_fixed_providers() {
    let e = epoch(2021,2,14);

    let spec = synthesize( &unit( e, ProductCategory::Dcb, Archive::Cddis, ProductOption::Dcb(DcbFile::P2C2))).unwrap();
    assert_eq!( spec.remote_pattern(), "P2C22102_RINEX.DCB");
    assert_eq!( spec.local_name, "P2C22102.DCB");
    assert_eq!( spec.url, "ftp://ftp.aiub.unibe.ch/CODE/2021");

    let spec = synthesize( &unit( e, ProductCategory::Dcb, Archive::Ign, ProductOption::Dcb(DcbFile::RealTimeBias))).unwrap();
    assert_eq!( spec.local_name, "cnt21450.bia");
    assert_eq!( spec.fetch, FetchMode::Direct);
    assert_eq!( spec.compression, GZ_ONLY);

    let spec = synthesize( &unit( e, ProductCategory::Atx, Archive::Whu, ProductOption::None)).unwrap();
    assert_eq!( spec.local_name, "igs14.atx");
    assert!( spec.compression.is_empty());

    let spec = synthesize( &unit( e, ProductCategory::Ztd, Archive::Cddis, ProductOption::center("cod"))).unwrap();
    assert_eq!( spec.local_name, "COD21450.TRO");
}

#[test]
fn test_missing_archive_entries() {
    let u = unit( epoch(2021,2,14), ProductCategory::ObsHighRate, Archive::Whu, ProductOption::None).with_site("zimm");
    assert!( matches!( synthesize( &u), Err(OdinGnssError::UnknownCategory(..))));

    let u = unit( epoch(2021,2,14), ProductCategory::Ion, Archive::Cddis, ProductOption::Dcb(DcbFile::Mgex));
    assert!( matches!( synthesize( &u), Err(OdinGnssError::NoTemplate(_))));
}

#[test]
fn test_cut_dirs_match_url_depth() {
    let e = epoch(2021,2,14).at(13,15).unwrap();
    let options: Vec<(ProductCategory,ProductOption)> = vec![
        (ProductCategory::ObsDaily, ProductOption::None),
        (ProductCategory::ObsHourly, ProductOption::None),
        (ProductCategory::ObsHighRate, ProductOption::None),
        (ProductCategory::ObmDaily, ProductOption::None),
        (ProductCategory::ObmHourly, ProductOption::None),
        (ProductCategory::ObmHighRate, ProductOption::None),
        (ProductCategory::Nav, ProductOption::Nav(NavFile::Gps)),
        (ProductCategory::Nav, ProductOption::Nav(NavFile::RealTime)),
        (ProductCategory::Nav, ProductOption::Nav(NavFile::Hourly(HourlyNav::Bds))),
        (ProductCategory::Sp3, ProductOption::center("igs")),
        (ProductCategory::Sp3, ProductOption::center("gfu")),
        (ProductCategory::Sp3, ProductOption::center("cnt")),
        (ProductCategory::Clk, ProductOption::center("cod")),
        (ProductCategory::Eop, ProductOption::center("igu")),
        (ProductCategory::Snx, ProductOption::None),
        (ProductCategory::Sp3Mgex, ProductOption::center("wuu")),
        (ProductCategory::ClkMgex, ProductOption::center("grm")),
        (ProductCategory::Dcb, ProductOption::Dcb(DcbFile::Mgex)),
        (ProductCategory::Dcb, ProductOption::Dcb(DcbFile::P1C1)),
        (ProductCategory::Ion, ProductOption::center("igs")),
        (ProductCategory::Roti, ProductOption::None),
        (ProductCategory::Ztd, ProductOption::center("igs")),
        (ProductCategory::Atx, ProductOption::None),
    ];

    let mut n = 0;
    for archive in Archive::iter() {
        for (category, option) in &options {
            let u = unit( e, *category, archive, option.clone()).with_site("zimm");
            if let Ok(spec) = synthesize( &u) {
                assert_eq!( spec.cut_dirs, url_depth( &spec.url), "{u}: {}", spec.url);
                n += 1;
            }
        }
    }
    assert_eq!( n, 3 * options.len() - 2); // no high-rate observations on whu
}
