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

//! the batch driver that expands configured product requests into retrieval units and runs them

use std::{collections::HashSet, fs, path::{Path,PathBuf}};
use futures::stream::{self,StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error,info,warn};

use crate::{CenterRequest,GnssConfig,NavRequest,NavType,ObsRequest,ObsSpan,SiteSelection,TrpRequest};
use crate::archive::ProductCategory;
use crate::epoch::{GnssEpoch,QUARTER_LABELS};
use crate::errors::{no_template,OdinGnssError,Result};
use crate::naming;
use crate::product::{is_mgex_center,is_ultra_rapid,DcbFile,HourlyNav,NavFile,NavSystem,ProductOption,RetrievalUnit,REAL_TIME_CENTER};
use crate::retrieve::{Outcome,Retriever,UnitReport};

lazy_static! {
    // 4 char site name, optionally followed by monument/receiver and country code of long station ids
    static ref SITE_RE: Regex = Regex::new( r"^[a-z0-9]{4}(?:[0-9]{2}[a-z]{3})?$").unwrap();
}

/// hours of the ultra-rapid solutions if none are configured
pub const ULTRA_RAPID_HOURS: [u32;4] = [0, 6, 12, 18];

/// read a site list file with one station id per line. Ids are returned in lower case, blank lines are skipped.
/// Invalid lines are reported and skipped, only an unreadable file is an error
pub fn read_site_list (path: &Path)->Result<Vec<String>> {
    let content = fs::read_to_string( path)
        .map_err( |e| OdinGnssError::SiteListError( format!("{:?}: {}", path, e)))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or( &content);

    let mut sites = Vec::new();
    for (i,line) in content.lines().enumerate() {
        let site = line.trim().to_lowercase();
        if site.is_empty() { continue }

        if !SITE_RE.is_match( &site) {
            warn!("{:?} line {}: ignoring invalid site id '{}'", path, i+1, line.trim());
            continue
        }
        if !sites.contains( &site) { sites.push( site) }
    }
    Ok(sites)
}

/// the units to run and the product requests that could not be expanded
#[derive(Debug,Default)]
pub struct BatchPlan {
    pub units: Vec<RetrievalUnit>,
    pub issues: Vec<String>,
}

/// expand all configured product requests for all configured days. A product that cannot be expanded
/// (e.g. because of a missing site list) is recorded as an issue and does not affect other products
pub fn plan_batch (config: &GnssConfig)->BatchPlan {
    let mut plan = BatchPlan::default();

    for day in 0..config.days {
        let epoch = match GnssEpoch::from_date( config.start_date).and_then( |e| e.shifted_days( day as i64)) {
            Ok(epoch) => epoch,
            Err(e) => {
                plan.issues.push( e.to_string());
                continue
            }
        };
        plan_day( config, &epoch, &mut plan);
    }

    dedup_units( &mut plan.units);
    plan
}

fn plan_day (config: &GnssConfig, epoch: &GnssEpoch, plan: &mut BatchPlan) {
    let req = &config.requests;
    let mut add = |product: &str, result: Result<Vec<RetrievalUnit>>| {
        match result.and_then( |units| { validate( &units)?; Ok(units) }) {
            Ok(units) => plan.units.extend( units),
            Err(e) => {
                let msg = format!("skipping {product} for {}: {e}", epoch.date());
                error!("{msg}");
                plan.issues.push( msg);
            }
        }
    };

    if let Some(obs) = &req.obs { add( "obs", obs_units( config, epoch, obs, false)) }
    if let Some(obm) = &req.obm { add( "obm", obs_units( config, epoch, obm, true)) }
    if let Some(nav) = &req.nav { add( "nav", nav_units( config, epoch, nav)) }
    if let Some(orbclk) = &req.orbclk { add( "orbclk", orbclk_units( config, epoch, orbclk)) }
    if let Some(eop) = &req.eop { add( "eop", eop_units( config, epoch, eop)) }
    if req.snx { add( "snx", single( config, epoch, ProductCategory::Snx, ProductOption::None, &config.dirs.snx)) }
    if req.dcb { add( "dcb", dcb_units( config, epoch)) }
    if let Some(ac) = &req.ion { add( "ion", single( config, epoch, ProductCategory::Ion, ProductOption::center(ac), &config.dirs.ion)) }
    if req.roti { add( "roti", single( config, epoch, ProductCategory::Roti, ProductOption::None, &config.dirs.ion)) }
    if let Some(trp) = &req.trp { add( "trp", trp_units( config, epoch, trp)) }
    if req.rt_orbclk { add( "rt_orbclk", rt_orbclk_units( config, epoch)) }
    if req.rt_bias { add( "rt_bias", single( config, epoch, ProductCategory::Dcb, ProductOption::Dcb(DcbFile::RealTimeBias), &config.dirs.bia)) }
    if req.atx { add( "atx", single( config, epoch, ProductCategory::Atx, ProductOption::None, &config.dirs.tbl)) }
}

/// make sure all units have a naming grammar before we start any transfers
fn validate (units: &[RetrievalUnit])->Result<()> {
    for unit in units {
        if naming::requires_site( unit.archive, unit.category, &unit.option)? && unit.site.is_none() {
            naming::synthesize_bulk( unit)?;
        } else {
            naming::synthesize( unit)?;
        }
    }
    Ok(())
}

/// remove units that have the same target as a previous one
fn dedup_units (units: &mut Vec<RetrievalUnit>) {
    let mut targets: HashSet<PathBuf> = HashSet::new();
    units.retain( |unit| {
        match unit_target( unit) {
            Some(path) => targets.insert( path),
            None => true
        }
    });
}

fn unit_target (unit: &RetrievalUnit)->Option<PathBuf> {
    if unit.site.is_none() {
        if let Ok(bulk) = naming::synthesize_bulk( unit) {
            return Some( unit.target_dir.join( bulk.pattern))
        }
    }
    naming::synthesize( unit).ok().map( |spec| unit.target_dir.join( spec.local_name))
}

//--- per product expansion

fn sites_of (selection: &SiteSelection)->Result<Vec<Option<String>>> {
    match selection {
        SiteSelection::All => Ok( vec![None]),
        SiteSelection::List(path) => Ok( read_site_list( path)?.into_iter().map( Some).collect())
    }
}

fn hours_or (hours: &[u32], default: &[u32])->Result<Vec<u32>> {
    let hours = if hours.is_empty() { default.to_vec() } else { hours.to_vec() };
    if let Some(h) = hours.iter().find( |h| **h > 23) {
        return Err( OdinGnssError::EpochError( format!("invalid hour {h}")))
    }
    Ok(hours)
}

fn all_hours()->Vec<u32> { (0..24).collect() }

/// the epoch itself, followed by the previous and next day if the day window is enabled
fn day_window (config: &GnssConfig, epoch: &GnssEpoch)->Result<Vec<GnssEpoch>> {
    if config.day_window {
        Ok( vec![ *epoch, epoch.shifted_days(-1)?, epoch.shifted_days(1)? ])
    } else {
        Ok( vec![ *epoch ])
    }
}

fn unit (config: &GnssConfig, epoch: GnssEpoch, category: ProductCategory, option: ProductOption, dir: PathBuf)->RetrievalUnit {
    RetrievalUnit::new( epoch, category, config.archive, option, dir)
}

fn single (config: &GnssConfig, epoch: &GnssEpoch, category: ProductCategory, option: ProductOption, dir: &Path)->Result<Vec<RetrievalUnit>> {
    Ok( vec![ unit( config, *epoch, category, option, config.dirs.resolve( dir)) ])
}

fn obs_units (config: &GnssConfig, epoch: &GnssEpoch, req: &ObsRequest, long_name: bool)->Result<Vec<RetrievalUnit>> {
    use ProductCategory::*;

    let sites = sites_of( &req.sites)?;
    let root = config.dirs.resolve( if long_name { &config.dirs.obm } else { &config.dirs.obs });

    // (category, epoch, target dir) slots
    let slots: Vec<(ProductCategory,GnssEpoch,PathBuf)> = match req.span {
        ObsSpan::Daily => {
            vec![ (if long_name { ObmDaily } else { ObsDaily }, *epoch, root.join("daily")) ]
        }
        ObsSpan::Hourly => {
            let cat = if long_name { ObmHourly } else { ObsHourly };
            let mut slots = Vec::new();
            for h in hours_or( &req.hours, &all_hours())? {
                slots.push( (cat, epoch.at(h, 0)?, root.join("hourly").join( format!("{h:02}"))) );
            }
            slots
        }
        ObsSpan::HighRate => {
            let cat = if long_name { ObmHighRate } else { ObsHighRate };
            let mut slots = Vec::new();
            for h in hours_or( &req.hours, &all_hours())? {
                for q in 0..QUARTER_LABELS.len() as u32 {
                    slots.push( (cat, epoch.at(h, q * 15)?, root.join("highrate").join( format!("{h:02}"))) );
                }
            }
            slots
        }
    };

    let mut units = Vec::new();
    for (category, ep, dir) in slots {
        for site in &sites {
            let u = unit( config, ep, category, ProductOption::None, dir.clone());
            units.push( match site { Some(site) => u.with_site( site), None => u });
        }
    }
    Ok(units)
}

fn nav_units (config: &GnssConfig, epoch: &GnssEpoch, req: &NavRequest)->Result<Vec<RetrievalUnit>> {
    let root = config.dirs.resolve( &config.dirs.nav);
    let daily_dir = root.join("daily");

    match req.nav_type {
        NavType::Daily => {
            let files = match req.system {
                NavSystem::Gps => vec![NavFile::Gps],
                NavSystem::Glo => vec![NavFile::Glo],
                NavSystem::Mixed => vec![NavFile::Mixed],
                NavSystem::All => vec![NavFile::Gps, NavFile::Glo, NavFile::Mixed],
                sys => return Err( no_template( format!("no daily navigation file for {sys}, use mixed")))
            };
            Ok( files.into_iter().map( |f| unit( config, *epoch, ProductCategory::Nav, ProductOption::Nav(f), daily_dir.clone())).collect())
        }
        NavType::Hourly => {
            let sites = match &req.sites {
                SiteSelection::List(path) => read_site_list( path)?,
                SiteSelection::All => return Err( no_template( "hourly navigation files require a site list"))
            };
            let mut units = Vec::new();
            for h in hours_or( &req.hours, &all_hours())? {
                let ep = epoch.at(h, 0)?;
                let dir = root.join("hourly").join( format!("{h:02}"));
                for site in &sites {
                    for variant in HourlyNav::variants( req.system) {
                        let option = ProductOption::Nav( NavFile::Hourly(variant));
                        units.push( unit( config, ep, ProductCategory::Nav, option, dir.clone()).with_site( site));
                    }
                }
            }
            Ok(units)
        }
        NavType::RealTime => {
            Ok( vec![ unit( config, *epoch, ProductCategory::Nav, ProductOption::Nav(NavFile::RealTime), daily_dir) ])
        }
    }
}

fn orbclk_units (config: &GnssConfig, epoch: &GnssEpoch, req: &CenterRequest)->Result<Vec<RetrievalUnit>> {
    let ac = req.center.to_lowercase();
    let sp3_dir = config.dirs.resolve( &config.dirs.sp3);
    let clk_dir = config.dirs.resolve( &config.dirs.clk);
    let (sp3_cat, clk_cat) = if is_mgex_center( &ac) {
        (ProductCategory::Sp3Mgex, ProductCategory::ClkMgex)
    } else {
        (ProductCategory::Sp3, ProductCategory::Clk)
    };

    let mut units = Vec::new();
    if is_ultra_rapid( &ac) { // orbits only, one per solution hour
        for h in hours_or( &req.hours, &ULTRA_RAPID_HOURS)? {
            units.push( unit( config, epoch.at(h, 0)?, sp3_cat, ProductOption::center( &ac), sp3_dir.clone()));
        }
    } else {
        for ep in day_window( config, epoch)? {
            units.push( unit( config, ep, sp3_cat, ProductOption::center( &ac), sp3_dir.clone()));
            units.push( unit( config, ep, clk_cat, ProductOption::center( &ac), clk_dir.clone()));
        }
    }
    Ok(units)
}

fn eop_units (config: &GnssConfig, epoch: &GnssEpoch, req: &CenterRequest)->Result<Vec<RetrievalUnit>> {
    let ac = req.center.to_lowercase();
    let dir = config.dirs.resolve( &config.dirs.eop);

    if is_ultra_rapid( &ac) {
        let mut units = Vec::new();
        for h in hours_or( &req.hours, &ULTRA_RAPID_HOURS)? {
            units.push( unit( config, epoch.at(h, 0)?, ProductCategory::Eop, ProductOption::center( &ac), dir.clone()));
        }
        Ok(units)
    } else {
        Ok( vec![ unit( config, *epoch, ProductCategory::Eop, ProductOption::center( &ac), dir) ])
    }
}

fn dcb_units (config: &GnssConfig, epoch: &GnssEpoch)->Result<Vec<RetrievalUnit>> {
    let dir = config.dirs.resolve( &config.dirs.dcb);
    Ok( [DcbFile::Mgex, DcbFile::P1P2, DcbFile::P1C1, DcbFile::P2C2].into_iter()
        .map( |f| unit( config, *epoch, ProductCategory::Dcb, ProductOption::Dcb(f), dir.clone()))
        .collect())
}

fn trp_units (config: &GnssConfig, epoch: &GnssEpoch, req: &TrpRequest)->Result<Vec<RetrievalUnit>> {
    let ac = req.center.to_lowercase();
    let dir = config.dirs.resolve( &config.dirs.ztd);

    match ac.as_str() {
        "igs" => {
            Ok( sites_of( &req.sites)?.into_iter().map( |site| {
                let u = unit( config, *epoch, ProductCategory::Ztd, ProductOption::center( &ac), dir.clone());
                match site { Some(site) => u.with_site( &site), None => u }
            }).collect())
        }
        "cod" => Ok( vec![ unit( config, *epoch, ProductCategory::Ztd, ProductOption::center( &ac), dir) ]),
        _ => Err( no_template( format!("unknown troposphere center {ac}")))
    }
}

fn rt_orbclk_units (config: &GnssConfig, epoch: &GnssEpoch)->Result<Vec<RetrievalUnit>> {
    let sp3_dir = config.dirs.resolve( &config.dirs.sp3);
    let clk_dir = config.dirs.resolve( &config.dirs.clk);

    let mut units = Vec::new();
    for ep in day_window( config, epoch)? {
        units.push( unit( config, ep, ProductCategory::Sp3, ProductOption::center( REAL_TIME_CENTER), sp3_dir.clone()));
        units.push( unit( config, ep, ProductCategory::Clk, ProductOption::center( REAL_TIME_CENTER), clk_dir.clone()));
    }
    Ok(units)
}

//--- execution

/// aggregated outcome of a batch run
#[derive(Debug,Default)]
pub struct BatchSummary {
    pub downloaded: usize,
    pub present: usize,
    pub failed: usize,
    pub reports: Vec<UnitReport>,
}

impl BatchSummary {
    fn add (&mut self, report: UnitReport) {
        match report.outcome {
            Outcome::Downloaded => self.downloaded += 1,
            Outcome::AlreadyPresent => self.present += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
        self.reports.push( report);
    }

    pub fn total (&self)->usize { self.reports.len() }

    pub fn has_failures (&self)->bool { self.failed > 0 }

    pub fn failures (&self)->impl Iterator<Item=&UnitReport> {
        self.reports.iter().filter( |r| r.outcome.is_failed())
    }

    pub fn log_summary (&self) {
        info!("{} files: {} downloaded, {} already present, {} failed", self.total(), self.downloaded, self.present, self.failed);
        for r in self.failures() {
            warn!("missing {}", r.path.display());
        }
    }
}

/// run units on a pool of at most `max_concurrent` concurrent units. Outcome lines are logged as units complete
pub async fn run_batch (retriever: &Retriever, units: &[RetrievalUnit], max_concurrent: usize)->BatchSummary {
    info!("running {} retrieval units ({} concurrent)", units.len(), max_concurrent.max(1));

    let results: Vec<Vec<UnitReport>> = stream::iter( units.iter())
        .map( |unit| async move {
            let reports = retriever.run( unit).await;
            for r in &reports { r.log() }
            reports
        })
        .buffer_unordered( max_concurrent.max(1))
        .collect()
        .await;

    let mut summary = BatchSummary::default();
    for report in results.into_iter().flatten() {
        summary.add( report);
    }
    summary
}
