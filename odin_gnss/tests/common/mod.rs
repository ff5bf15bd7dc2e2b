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
#![allow(unused)]

//! in-process stand-ins for the external tools. The "remote archive" is just a list of filenames, fetched
//! files contain their remote name so that tests can check which one ended up in the canonical file

use std::{fs, path::Path, sync::{Arc, atomic::{AtomicUsize,Ordering}}, time::Duration};
use async_trait::async_trait;
use globset::Glob;

use odin_gnss::{
    Result,
    agents::{Decompressor,FormatConverter,ToolStatus,TransferAgent,TransferRequest},
    retrieve::{Retriever,RetrieverSettings},
};

pub struct MockTransfer {
    pub remote: Vec<String>,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
    /// number of initial calls that fail with a network error
    pub network_failures: usize,
    /// sub directory the agent leaves behind in its output dir
    pub leftover_dir: Option<String>,
}

impl MockTransfer {
    pub fn new (remote: &[&str])->Self {
        MockTransfer { remote: remote.iter().map(|s| s.to_string()).collect(), calls: AtomicUsize::new(0), delay: None, network_failures: 0, leftover_dir: None }
    }

    pub fn calls (&self)->usize { self.calls.load( Ordering::SeqCst) }
}

#[async_trait]
impl TransferAgent for MockTransfer {
    async fn fetch (&self, req: &TransferRequest)->Result<ToolStatus> {
        let n = self.calls.fetch_add( 1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep( delay).await;
        }
        if n < self.network_failures {
            return Ok( ToolStatus::failed( "wget", 4, "network failure"))
        }

        fs::create_dir_all( &req.output_dir)?;
        if let Some(dir) = &self.leftover_dir {
            let dir = req.output_dir.join( dir);
            fs::create_dir_all( &dir)?;
            fs::write( dir.join(".listing"), b"")?;
        }
        let mut matched = 0;
        for name in &self.remote {
            let is_match = match &req.accept {
                Some(pattern) => Glob::new( pattern)?.compile_matcher().is_match( name),
                None => req.url.ends_with( &format!("/{name}"))
            };
            if is_match {
                fs::write( req.output_dir.join( name), name.as_bytes())?;
                matched += 1;
            }
        }

        if matched > 0 { Ok( ToolStatus::ok("wget")) } else { Ok( ToolStatus::failed( "wget", 8, "no match")) }
    }
}

/// strips the compression suffix, keeping the content
pub struct MockDecompressor;

#[async_trait]
impl Decompressor for MockDecompressor {
    async fn decompress (&self, path: &Path)->Result<ToolStatus> {
        let fname = path.file_name().and_then( |f| f.to_str()).unwrap_or("");
        let stem = fname.strip_suffix(".gz").or_else( || fname.strip_suffix(".Z"));

        match stem {
            Some(stem) if path.is_file() => {
                let data = fs::read( path)?;
                fs::write( path.with_file_name( stem), data)?;
                fs::remove_file( path)?;
                Ok( ToolStatus::ok("gzip"))
            }
            _ => Ok( ToolStatus::failed( "gzip", 1, "no such file"))
        }
    }
}

/// copies input to output unless configured to produce nothing
pub struct MockConverter {
    pub calls: AtomicUsize,
    pub empty_output: bool,
}

impl MockConverter {
    pub fn new()->Self { MockConverter { calls: AtomicUsize::new(0), empty_output: false } }
    pub fn failing()->Self { MockConverter { calls: AtomicUsize::new(0), empty_output: true } }
}

#[async_trait]
impl FormatConverter for MockConverter {
    async fn convert (&self, input: &Path, output: &Path)->Result<ToolStatus> {
        self.calls.fetch_add( 1, Ordering::SeqCst);
        if self.empty_output {
            fs::write( output, b"")?;
            Ok( ToolStatus::failed( "crx2rnx", 1, "unexpected header"))
        } else {
            fs::copy( input, output)?;
            Ok( ToolStatus::ok("crx2rnx"))
        }
    }
}

pub fn test_settings()->RetrieverSettings {
    RetrieverSettings {
        transfer_timeout: Duration::from_secs(5),
        max_retry: 0,
        retry_delay: Duration::from_millis(1),
        retry_exit_codes: vec![4],
    }
}

pub fn mock_retriever (transfer: Arc<MockTransfer>, converter: Arc<MockConverter>, settings: RetrieverSettings)->Retriever {
    Retriever::new( transfer, Arc::new( MockDecompressor), converter, settings)
}

/// regular file content as string
pub fn content (path: &Path)->String {
    fs::read_to_string( path).unwrap_or_default()
}

/// names of all entries (including hidden staging dirs) in dir
pub fn dir_entries (dir: &Path)->Vec<String> {
    let mut names: Vec<String> = fs::read_dir( dir).map( |rd| {
        rd.filter_map( |e| e.ok()).filter_map( |e| e.file_name().to_str().map( String::from)).collect()
    }).unwrap_or_default();
    names.sort();
    names
}
