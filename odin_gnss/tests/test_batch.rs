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

mod common;

use std::{fs, path::Path, sync::Arc};
use chrono::NaiveDate;
use tempfile::tempdir;

use odin_gnss::{
    GnssConfig, ProductDirs, CenterRequest, ObsRequest, ObsSpan, SiteSelection, NavRequest, NavType,
    OdinGnssError,
    archive::ProductCategory,
    batch::{plan_batch,read_site_list,run_batch},
    product::NavSystem,
};
use common::*;

fn config (root: &Path)->GnssConfig {
    GnssConfig {
        start_date: NaiveDate::from_ymd_opt( 2021, 2, 14).unwrap(),
        dirs: ProductDirs { root: root.to_path_buf(), ..ProductDirs::default() },
        ..GnssConfig::default()
    }
}

#[test]
fn test_read_site_list() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("site.list");
    fs::write( &path, "ZIMM\n\n  wtzr  \nALGO00CAN\nzimm\n").unwrap();

    let sites = read_site_list( &path).unwrap();
    assert_eq!( sites, vec!["zimm", "wtzr", "algo00can"]);

    // byte order mark and invalid lines do not affect the other sites
    fs::write( &path, "\u{feff}zimm\nnot a site\nwtzr\nalgo\n").unwrap();
    assert_eq!( read_site_list( &path).unwrap(), vec!["zimm", "wtzr", "algo"]);

    assert!( matches!( read_site_list( &tmp.path().join("missing.list")), Err(OdinGnssError::SiteListError(_))));
}

#[test]
fn test_day_window() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.requests.orbclk = Some( CenterRequest { center: "cod".to_string(), hours: vec![] });

    let base = plan_batch( &conf).units.len();
    assert_eq!( base, 2);

    conf.day_window = true;
    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 3 * base);
    assert!( plan.issues.is_empty());

    let doys: Vec<u32> = plan.units.iter().filter( |u| u.category == ProductCategory::Sp3).map( |u| u.epoch.doy()).collect();
    assert_eq!( doys, vec![45, 44, 46]);
    assert!( plan.units.iter().all( |u| u.target_dir.is_absolute()));
}

#[test]
fn test_ultra_rapid_has_no_window() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.day_window = true;
    conf.requests.orbclk = Some( CenterRequest { center: "igu".to_string(), hours: vec![] });

    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 4);
    assert!( plan.units.iter().all( |u| u.category == ProductCategory::Sp3));

    let hours: Vec<u32> = plan.units.iter().map( |u| u.epoch.hour()).collect();
    assert_eq!( hours, vec![0, 6, 12, 18]);
}

#[test]
fn test_dedup() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.days = 2;
    conf.day_window = true;
    conf.requests.orbclk = Some( CenterRequest { center: "com".to_string(), hours: vec![] });

    // day 1: 44,45,46  day 2: 45,46,47
    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 8);
    assert!( plan.units.iter().all( |u| u.category == ProductCategory::Sp3Mgex || u.category == ProductCategory::ClkMgex));
}

#[test]
fn test_high_rate_expansion() {
    let tmp = tempdir().unwrap();
    let list = tmp.path().join("site.list");
    fs::write( &list, "zimm\nwtzr\n").unwrap();

    let mut conf = config( tmp.path());
    conf.requests.obs = Some( ObsRequest { span: ObsSpan::HighRate, sites: SiteSelection::List(list), hours: vec![13] });

    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 8);
    assert!( plan.units.iter().all( |u| u.target_dir.ends_with("obs/highrate/13")));

    let minutes: Vec<u32> = plan.units.iter().filter( |u| u.site.as_deref() == Some("zimm")).map( |u| u.epoch.minute()).collect();
    assert_eq!( minutes, vec![0, 15, 30, 45]);
}

#[test]
fn test_config_error_isolation() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.requests.obs = Some( ObsRequest { span: ObsSpan::Daily, sites: SiteSelection::List( tmp.path().join("missing.list")), hours: vec![] });
    conf.requests.nav = Some( NavRequest { nav_type: NavType::Daily, system: NavSystem::Bds, sites: SiteSelection::All, hours: vec![] });
    conf.requests.snx = true;

    let plan = plan_batch( &conf);
    assert_eq!( plan.issues.len(), 2);
    assert_eq!( plan.units.len(), 1);
    assert_eq!( plan.units[0].category, ProductCategory::Snx);
}

#[test]
fn test_all_stations_unit() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.requests.obm = Some( ObsRequest { span: ObsSpan::Hourly, sites: SiteSelection::All, hours: vec![] });

    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 24);
    assert!( plan.units.iter().all( |u| u.site.is_none() && u.category == ProductCategory::ObmHourly));
}

#[tokio::test]
async fn test_run_batch() {
    let tmp = tempdir().unwrap();
    let mut conf = config( tmp.path());
    conf.requests.nav = Some( NavRequest { nav_type: NavType::Daily, system: NavSystem::All, sites: SiteSelection::All, hours: vec![] });
    conf.requests.snx = true;

    let plan = plan_batch( &conf);
    assert_eq!( plan.units.len(), 4);

    let transfer = Arc::new( MockTransfer::new( &[
        "brdc0450.21n.gz", "brdc0450.21g.Z", "BRDC00IGS_R_20210450000_01D_MN.rnx.gz"
    ]));
    let retriever = mock_retriever( transfer.clone(), Arc::new( MockConverter::new()), test_settings());

    let summary = run_batch( &retriever, &plan.units, 3).await;
    assert_eq!( summary.downloaded, 3);
    assert_eq!( summary.failed, 1); // no weekly solution
    assert!( summary.has_failures());
    assert!( tmp.path().join("nav/daily/brdm0450.21p").is_file());

    let summary = run_batch( &retriever, &plan.units, 1).await;
    assert_eq!( summary.present, 3);
    assert_eq!( summary.failed, 1);
}
