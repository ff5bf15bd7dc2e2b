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

//! the retrieval orchestrator that executes single [`RetrievalUnit`]s.
//!
//! Each unit goes through `Checked -> Fetching -> Decompressing -> [Renaming] -> [Converting] -> Cleaning`.
//! All external tools write into a unit specific staging directory inside the target directory so that
//! partial results never show up under a canonical name. The outcome is determined by checking if the
//! canonical file exists afterwards.

use std::{collections::BTreeMap, fmt, fs, path::{Path,PathBuf}, sync::Arc, time::Duration};
use globset::Glob;
use tokio::time::{sleep,timeout};
use tracing::{debug,error,info,warn};

use odin_common::fs::{ensure_writable_dir,is_non_empty_file,matching_files_in_dir,remove_dir_if_exists,remove_file_if_exists};

use crate::GnssConfig;
use crate::agents::{Crx2RnxConverter,Decompressor,FormatConverter,GzipDecompressor,ToolStatus,TransferAgent,TransferRequest,WgetAgent};
use crate::naming::{self,FetchMode,FileSpec};
use crate::product::RetrievalUnit;

/// why a unit could not be retrieved
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum FailReason {
    /// the unit has no naming grammar or archive entry
    NoTemplate(String),
    /// no remote file matched the pattern(s)
    NotFound,
    Timeout,
    /// none of the fetched candidates could be decompressed
    Decompression,
    /// the decompressed file did not show up under its canonical name
    Rename,
    /// the converter did not produce a non-empty observation file
    Conversion,
    /// an external tool could not be executed
    Exec(String),
    Io(String),
}

impl fmt::Display for FailReason {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::NoTemplate(msg) => write!(f, "no template: {msg}"),
            FailReason::NotFound => write!(f, "no matching remote file"),
            FailReason::Timeout => write!(f, "timeout"),
            FailReason::Decompression => write!(f, "decompression failed"),
            FailReason::Rename => write!(f, "renamed file missing"),
            FailReason::Conversion => write!(f, "conversion failed"),
            FailReason::Exec(msg) => write!(f, "{msg}"),
            FailReason::Io(msg) => write!(f, "IO error {msg}"),
        }
    }
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Outcome {
    AlreadyPresent,
    Downloaded,
    Failed(FailReason),
}

impl Outcome {
    pub fn is_failed (&self)->bool { matches!( self, Outcome::Failed(_)) }
}

/// the result of a single unit (or a single station of an all-stations unit)
#[derive(Debug,Clone)]
pub struct UnitReport {
    /// canonical filename or, if we did not get that far, the unit description
    pub label: String,
    /// canonical target path
    pub path: PathBuf,
    pub outcome: Outcome,
    /// collaborator status and ambiguity notes
    pub diagnostics: Vec<String>,
}

impl UnitReport {
    fn new (label: impl ToString, path: PathBuf)->Self {
        UnitReport { label: label.to_string(), path, outcome: Outcome::Failed(FailReason::NotFound), diagnostics: Vec::new() }
    }

    fn failed (label: impl ToString, path: PathBuf, reason: FailReason)->Self {
        UnitReport { label: label.to_string(), path, outcome: Outcome::Failed(reason), diagnostics: Vec::new() }
    }

    fn note (&mut self, msg: impl ToString) {
        self.diagnostics.push( msg.to_string())
    }

    /// emit the outcome line of this report
    pub fn log (&self) {
        match &self.outcome {
            Outcome::Downloaded => info!("successfully downloaded {}", self.label),
            Outcome::AlreadyPresent => info!("{} has existed", self.label),
            Outcome::Failed(reason) => {
                error!("failed to download {}: {}", self.label, reason);
                for d in &self.diagnostics { debug!("  {d}") }
            }
        }
    }
}

type Step<T> = std::result::Result<T,FailReason>;

/// timeout and retry policy of transfers
#[derive(Debug,Clone)]
pub struct RetrieverSettings {
    pub transfer_timeout: Duration,
    /// max number of repeated transfers after a network failure or timeout
    pub max_retry: u32,
    pub retry_delay: Duration,
    /// transfer agent exit codes that indicate network failures
    pub retry_exit_codes: Vec<i32>,
}

impl Default for RetrieverSettings {
    fn default()->Self {
        RetrieverSettings {
            transfer_timeout: Duration::from_secs(600),
            max_retry: 0,
            retry_delay: Duration::from_secs(10),
            retry_exit_codes: vec![4],
        }
    }
}

impl RetrieverSettings {
    pub fn from_config (config: &GnssConfig)->Self {
        RetrieverSettings {
            transfer_timeout: config.transfer_timeout,
            max_retry: config.max_retry,
            retry_delay: config.retry_delay,
            retry_exit_codes: config.retry_exit_codes.clone(),
        }
    }
}

pub struct Retriever {
    transfer: Arc<dyn TransferAgent>,
    decompressor: Arc<dyn Decompressor>,
    converter: Arc<dyn FormatConverter>,
    settings: RetrieverSettings,
}

impl Retriever {
    pub fn new (transfer: Arc<dyn TransferAgent>, decompressor: Arc<dyn Decompressor>, converter: Arc<dyn FormatConverter>, settings: RetrieverSettings)->Self {
        Retriever { transfer, decompressor, converter, settings }
    }

    /// a retriever that uses the external tools configured in `config`
    pub fn from_config (config: &GnssConfig)->Self {
        Retriever {
            transfer: Arc::new( WgetAgent::new( &config.tools)),
            decompressor: Arc::new( GzipDecompressor::new( &config.tools)),
            converter: Arc::new( Crx2RnxConverter::new( &config.tools)),
            settings: RetrieverSettings::from_config( config),
        }
    }

    pub fn settings (&self)->&RetrieverSettings { &self.settings }

    /// execute a unit. Site specific units without a site are retrieved in all-stations mode, which
    /// produces one report per retrieved station
    pub async fn run (&self, unit: &RetrievalUnit)->Vec<UnitReport> {
        match naming::requires_site( unit.archive, unit.category, &unit.option) {
            Ok(true) if unit.site.is_none() => self.retrieve_bulk( unit).await,
            Ok(_) => vec![ self.retrieve( unit).await ],
            Err(e) => vec![ UnitReport::failed( unit, unit.target_dir.clone(), FailReason::NoTemplate( e.to_string())) ]
        }
    }

    /// retrieve the single product file of a unit
    pub async fn retrieve (&self, unit: &RetrievalUnit)->UnitReport {
        let spec = match naming::synthesize( unit) {
            Ok(spec) => spec,
            Err(e) => return UnitReport::failed( unit, unit.target_dir.clone(), FailReason::NoTemplate( e.to_string()))
        };

        let target = unit.target_dir.join( &spec.local_name);
        let mut report = UnitReport::new( &spec.local_name, target.clone());

        //--- Checked
        if is_present( &unit.target_dir, &spec) {
            report.outcome = Outcome::AlreadyPresent;
            return report
        }

        let staging = unit.target_dir.join( format!(".{}.part", spec.local_name));
        let result = self.fetch_and_process( &spec, &unit.target_dir, &staging, &mut report).await;

        //--- Cleaning
        clean( spec.transient_dirs, &staging);

        report.outcome = match result {
            Ok(()) if is_non_empty_file( &target) => Outcome::Downloaded,
            Ok(()) => Outcome::Failed( FailReason::Rename),
            Err(reason) => Outcome::Failed( reason)
        };
        report
    }

    /// retrieve the files of all stations with one listing transfer and then post-process each of them
    pub async fn retrieve_bulk (&self, unit: &RetrievalUnit)->Vec<UnitReport> {
        let bulk = match naming::synthesize_bulk( unit) {
            Ok(bulk) => bulk,
            Err(e) => return vec![ UnitReport::failed( unit, unit.target_dir.clone(), FailReason::NoTemplate( e.to_string())) ]
        };

        let mut listing_report = UnitReport::new( format!("{} ({})", bulk.pattern, unit), unit.target_dir.clone());
        let epoch = &unit.epoch;
        let staging = unit.target_dir.join( format!(".{}_{}{}{}{}.part", unit.category, epoch.yyyy(), epoch.ddd(), epoch.hh(), epoch.quarter_label()));

        if let Err(e) = ensure_writable_dir( &staging) {
            listing_report.outcome = Outcome::Failed( FailReason::Io( e.to_string()));
            return vec![listing_report]
        }

        //--- Fetching (one pass for all stations)
        let req = TransferRequest {
            url: bulk.url.clone(),
            accept: Some( accept_pattern( &bulk.pattern, bulk.compression)),
            cut_dirs: bulk.cut_dirs,
            output_dir: staging.clone()
        };
        let transfer_result = self.transfer( &req, &mut listing_report).await;

        let mut reports = Vec::new();
        match station_candidates( &staging, &bulk.pattern, bulk.compression) {
            Ok(stations) if !stations.is_empty() => {
                info!("retrieved {} station files for {}", stations.len(), bulk.pattern);
                for (site, files) in stations {
                    reports.push( self.process_station( unit, &site, files, &staging).await);
                }
            }
            Ok(_) => {
                listing_report.outcome = Outcome::Failed( transfer_result.err().unwrap_or( FailReason::NotFound));
                reports.push( listing_report);
            }
            Err(reason) => {
                listing_report.outcome = Outcome::Failed( reason);
                reports.push( listing_report);
            }
        }

        clean( bulk.transient_dirs, &staging);
        reports
    }

    async fn process_station (&self, unit: &RetrievalUnit, site: &str, files: StationFiles, staging: &Path)->UnitReport {
        let site_unit = unit.for_site( site);
        let spec = match naming::synthesize( &site_unit) {
            Ok(spec) => spec,
            Err(e) => return UnitReport::failed( &site_unit, unit.target_dir.clone(), FailReason::NoTemplate( e.to_string()))
        };

        let target = unit.target_dir.join( &spec.local_name);
        let mut report = UnitReport::new( &spec.local_name, target.clone());

        if is_present( &unit.target_dir, &spec) {
            report.outcome = Outcome::AlreadyPresent;
            return report
        }

        for names in &files.ambiguous {
            warn!("{} files match station {}: {:?}, using last", names.len(), site, names);
            report.note( format!("ambiguous match for {site}: {}", names.join(",")));
        }

        report.outcome = match self.process_candidates( &spec, files.candidates, &unit.target_dir, staging, &mut report).await {
            Ok(()) if is_non_empty_file( &target) => Outcome::Downloaded,
            Ok(()) => Outcome::Failed( FailReason::Rename),
            Err(reason) => Outcome::Failed( reason)
        };
        report
    }

    /// try the remote patterns in order until one of them yields a usable file
    async fn fetch_and_process (&self, spec: &FileSpec, target_dir: &Path, staging: &Path, report: &mut UnitReport)->Step<()> {
        ensure_writable_dir( staging).map_err( |e| FailReason::Io( e.to_string()))?;

        let mut last_reason = FailReason::NotFound;
        for pattern in &spec.patterns {
            //--- Fetching
            let candidates = match self.fetch_pattern( spec, pattern, staging, report).await {
                Ok(candidates) => candidates,
                Err(reason) => {
                    if !matches!( reason, FailReason::Timeout | FailReason::NotFound) { return Err(reason) }
                    last_reason = reason;
                    continue
                }
            };

            if candidates.is_empty() {
                debug!("no remote file for {pattern}");
                continue
            }

            match self.process_candidates( spec, candidates, target_dir, staging, report).await {
                Ok(()) => return Ok(()),
                Err(FailReason::Decompression) => last_reason = FailReason::Decompression,
                Err(reason) => return Err(reason)
            }
        }
        Err(last_reason)
    }

    /// fetch all files matching a single remote pattern and return the local candidates in compression order
    async fn fetch_pattern (&self, spec: &FileSpec, pattern: &str, staging: &Path, report: &mut UnitReport)->Step<Vec<PathBuf>> {
        let mut candidates = Vec::new();

        match spec.fetch {
            FetchMode::Listing => {
                let req = TransferRequest {
                    url: spec.url.clone(),
                    accept: Some( accept_pattern( pattern, spec.compression)),
                    cut_dirs: spec.cut_dirs,
                    output_dir: staging.to_path_buf()
                };
                let transferred = self.transfer( &req, report).await;

                for sfx in suffixes( spec.compression) {
                    if let Some(path) = select_candidate( staging, &format!("{pattern}{sfx}"), report)? {
                        candidates.push( path);
                    }
                }
                if candidates.is_empty() { transferred?; }
            }
            FetchMode::Direct => {
                let mut timed_out = false;
                for sfx in suffixes( spec.compression) {
                    let req = TransferRequest {
                        url: format!("{}/{}{}", spec.url, pattern, sfx),
                        accept: None,
                        cut_dirs: spec.cut_dirs,
                        output_dir: staging.to_path_buf()
                    };
                    match self.transfer( &req, report).await {
                        Err(FailReason::Timeout) => timed_out = true,
                        Err(reason) => return Err(reason),
                        Ok(()) => {}
                    }

                    if let Some(path) = select_candidate( staging, &format!("{pattern}{sfx}"), report)? {
                        candidates.push( path);
                        break // no need to fetch the alternatives
                    }
                }
                if candidates.is_empty() && timed_out { return Err(FailReason::Timeout) }
            }
        }

        Ok(candidates)
    }

    /// run a transfer with timeout and optional retries. The agent status only goes into the diagnostics
    /// since missing remote files are detected by checking the staging dir
    async fn transfer (&self, req: &TransferRequest, report: &mut UnitReport)->Step<()> {
        let mut attempt = 0;

        loop {
            let timed_out = match timeout( self.settings.transfer_timeout, self.transfer.fetch( req)).await {
                Ok(Ok(status)) => {
                    if status.success() { return Ok(()) }
                    report.note( &status);
                    if !self.is_network_failure( &status) { return Ok(()) }
                    false
                }
                Ok(Err(e)) => {
                    report.note( &e);
                    return Err( FailReason::Exec( e.to_string()))
                }
                Err(_) => {
                    report.note( format!("transfer of {} timed out after {:?}", req.url, self.settings.transfer_timeout));
                    true
                }
            };

            if attempt >= self.settings.max_retry {
                return if timed_out { Err(FailReason::Timeout) } else { Ok(()) }
            }
            attempt += 1;
            warn!("retrying transfer of {} ({}/{})", req.url, attempt, self.settings.max_retry);
            sleep( self.settings.retry_delay).await;
        }
    }

    fn is_network_failure (&self, status: &ToolStatus)->bool {
        status.code.map( |c| self.settings.retry_exit_codes.contains( &c)).unwrap_or(false)
    }

    /// decompress the first usable candidate and turn it into the canonical file in `target_dir`
    async fn process_candidates (&self, spec: &FileSpec, candidates: Vec<PathBuf>, target_dir: &Path, staging: &Path, report: &mut UnitReport)->Step<()> {
        //--- Decompressing
        let mut decompressed: Option<PathBuf> = None;
        for candidate in candidates {
            if let Some(path) = self.decompress( &candidate, spec.compression, report).await? {
                decompressed = Some(path);
                break
            }
        }
        let decompressed = decompressed.ok_or( FailReason::Decompression)?;

        //--- Renaming
        let stage_path = staging.join( spec.stage_name());
        if decompressed != stage_path {
            debug!("renaming {:?} to {:?}", decompressed, stage_path);
            fs::rename( &decompressed, &stage_path).map_err( |_| FailReason::Rename)?;
        }
        if !stage_path.is_file() { return Err(FailReason::Rename) }

        //--- Converting
        let product_path = if spec.needs_conversion() {
            let converted = staging.join( &spec.local_name);
            match self.converter.convert( &stage_path, &converted).await {
                Ok(status) => if !status.success() { report.note( &status) }
                Err(e) => report.note( &e)
            }
            if !is_non_empty_file( &converted) {
                let _ = remove_file_if_exists( &converted);
                return Err(FailReason::Conversion)
            }
            let _ = remove_file_if_exists( &stage_path);
            converted
        } else {
            stage_path
        };

        fs::rename( &product_path, target_dir.join( &spec.local_name)).map_err( |e| FailReason::Io( e.to_string()))
    }

    /// decompress a candidate if it has one of the compression suffixes. Returns the path of the decompressed
    /// file if it exists afterwards
    async fn decompress (&self, path: &Path, compression: &[&str], report: &mut UnitReport)->Step<Option<PathBuf>> {
        let fname = path.file_name().and_then( |f| f.to_str()).unwrap_or("");

        match compression.iter().find( |sfx| fname.ends_with( **sfx)) {
            Some(sfx) => {
                let output = path.with_file_name( &fname[..fname.len() - sfx.len()]);
                match self.decompressor.decompress( path).await {
                    Ok(status) => if !status.success() { report.note( &status) }
                    Err(e) => report.note( &e)
                }
                if output.is_file() {
                    Ok( Some(output))
                } else {
                    warn!("decompression of {:?} produced nothing", path);
                    Ok(None)
                }
            }
            None => Ok( if path.is_file() { Some( path.to_path_buf()) } else { None })
        }
    }
}

//--- helpers

fn suffixes (compression: &'static [&'static str])->Vec<&'static str> {
    if compression.is_empty() { vec![""] } else { compression.to_vec() }
}

fn accept_pattern (pattern: &str, compression: &[&str])->String {
    if compression.is_empty() { pattern.to_string() } else { format!("{pattern}.*") }
}

/// is the canonical file (or the compact file it is converted from) already in `target_dir`
pub fn is_present (target_dir: &Path, spec: &FileSpec)->bool {
    is_non_empty_file( target_dir.join( &spec.local_name))
        || spec.intermediate.as_ref().map( |f| is_non_empty_file( target_dir.join(f))).unwrap_or(false)
}

fn matcher_for (pattern: &str)->Step<globset::GlobMatcher> {
    Glob::new( pattern)
        .map( |g| g.compile_matcher())
        .map_err( |e| FailReason::Io( e.to_string()))
}

/// the lexicographically last file in `dir` that matches `pattern`
fn select_candidate (dir: &Path, pattern: &str, report: &mut UnitReport)->Step<Option<PathBuf>> {
    let matcher = matcher_for( pattern)?;
    let mut files = matching_files_in_dir( &dir, &matcher).map_err( |e| FailReason::Io( e.to_string()))?;

    if files.len() > 1 {
        let names: Vec<String> = files.iter().filter_map( |p| odin_common::fs::filename(p).map( String::from)).collect();
        warn!("{} files match {}: {:?}, using last", files.len(), pattern, names);
        report.note( format!("ambiguous match for {pattern}: {}", names.join(",")));
    }
    Ok( files.pop())
}

/// the files of one station in an all-stations listing
#[derive(Debug,Default)]
struct StationFiles {
    /// ordered by compression preference
    candidates: Vec<PathBuf>,
    /// all names of a suffix that had more than one file for this station
    ambiguous: Vec<Vec<String>>,
}

/// group the files matching a bulk pattern by site. Candidates of each site are ordered by compression
/// preference, with the lexicographically last file per suffix
fn station_candidates (dir: &Path, pattern: &str, compression: &'static [&'static str])->Step<BTreeMap<String,StationFiles>> {
    let mut stations: BTreeMap<String,StationFiles> = BTreeMap::new();

    for sfx in suffixes( compression) {
        let matcher = matcher_for( &format!("{pattern}{sfx}"))?;
        let files = matching_files_in_dir( &dir, &matcher).map_err( |e| FailReason::Io( e.to_string()))?;

        let mut by_site: BTreeMap<String,Vec<PathBuf>> = BTreeMap::new();
        for path in files {
            if let Some(site) = odin_common::fs::filename( &path).map( naming::short_site) {
                let site = site.to_lowercase();
                if site.len() == 4 { by_site.entry( site).or_default().push( path) }
            }
        }

        for (site, mut paths) in by_site {
            let station = stations.entry( site).or_default();
            if paths.len() > 1 {
                station.ambiguous.push( paths.iter().filter_map( |p| odin_common::fs::filename(p).map( String::from)).collect());
            }
            if let Some(path) = paths.pop() { station.candidates.push( path) }
        }
    }
    Ok(stations)
}

/// remove transient tool directories and the staging dir. Tools only write into staging, hence this is
/// where transient dirs show up. Failures are only logged
fn clean (transient_dirs: &[&str], staging: &Path) {
    for dir in transient_dirs {
        let path = staging.join( dir);
        if let Err(e) = remove_dir_if_exists( &path) {
            warn!("could not remove {:?}: {}", path, e);
        }
    }
    if let Err(e) = remove_dir_if_exists( staging) {
        warn!("could not remove staging dir {:?}: {}", staging, e);
    }
}
