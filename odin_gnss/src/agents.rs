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

//! the external collaborators that move, decompress and convert files.
//!
//! The retriever only sees the [`TransferAgent`], [`Decompressor`] and [`FormatConverter`] traits. The
//! provided implementations run `wget`, `gzip` and `crx2rnx` as child processes. Their exit status is
//! reported back as a [`ToolStatus`] but the retriever decides about success based on what files exist
//! afterwards, since these tools do not consistently report missing remote files.

use std::{fmt, fs::File, path::{Path,PathBuf}, process::Stdio};
use async_trait::async_trait;
use serde::{Deserialize,Serialize};
use tokio::process::Command;
use tracing::{debug,trace};

use crate::errors::{OdinGnssError,Result};

/// what an external tool reported back
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ToolStatus {
    pub tool: String,
    /// exit code, None if the process was terminated by a signal
    pub code: Option<i32>,
    /// last line of the tool error output
    pub detail: String,
}

impl ToolStatus {
    pub fn ok (tool: &str)->Self {
        ToolStatus { tool: tool.to_string(), code: Some(0), detail: String::new() }
    }

    pub fn failed (tool: &str, code: i32, detail: impl ToString)->Self {
        ToolStatus { tool: tool.to_string(), code: Some(code), detail: detail.to_string() }
    }

    pub fn success (&self)->bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ToolStatus {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} exited with {}", self.tool, code)?,
            None => write!(f, "{} was terminated", self.tool)?,
        }
        if !self.detail.is_empty() { write!(f, ": {}", self.detail)?; }
        Ok(())
    }
}

/// a single remote retrieval. If `accept` is set `url` is a directory and only files matching the
/// accept pattern are retrieved, otherwise `url` is the file itself
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct TransferRequest {
    pub url: String,
    pub accept: Option<String>,
    pub cut_dirs: u32,
    pub output_dir: PathBuf,
}

#[async_trait]
pub trait TransferAgent: Send + Sync {
    async fn fetch (&self, req: &TransferRequest)->Result<ToolStatus>;
}

#[async_trait]
pub trait Decompressor: Send + Sync {
    /// replace `path` with its decompressed content (without the compression suffix)
    async fn decompress (&self, path: &Path)->Result<ToolStatus>;
}

#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// convert a compact (Hatanaka) observation file into a standard one
    async fn convert (&self, input: &Path, output: &Path)->Result<ToolStatus>;
}

/// where to find the external tools
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// directory that contains the tools. If not set they have to be in the PATH
    pub tool_dir: Option<PathBuf>,
    pub wget: String,
    pub gzip: String,
    pub crx2rnx: String,
    /// if set the transfer agent reports progress
    pub verbose_transfer: bool,
}

impl Default for ToolConfig {
    fn default()->Self {
        ToolConfig {
            tool_dir: None,
            wget: "wget".to_string(),
            gzip: "gzip".to_string(),
            crx2rnx: "crx2rnx".to_string(),
            verbose_transfer: false
        }
    }
}

impl ToolConfig {
    pub fn tool_path (&self, tool: &str)->PathBuf {
        match &self.tool_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool)
        }
    }
}

//--- the child process based implementations

pub struct WgetAgent {
    program: PathBuf,
    verbose: bool,
}

impl WgetAgent {
    pub fn new (config: &ToolConfig)->Self {
        WgetAgent { program: config.tool_path( &config.wget), verbose: config.verbose_transfer }
    }
}

#[async_trait]
impl TransferAgent for WgetAgent {
    async fn fetch (&self, req: &TransferRequest)->Result<ToolStatus> {
        let mut cmd = Command::new( &self.program);
        cmd.arg( if self.verbose { "-r" } else { "-qr" })
            .arg( "-nH");

        match &req.accept {
            Some(pattern) => {
                cmd.arg( "-A").arg( pattern)
                    .arg( format!("--cut-dirs={}", req.cut_dirs))
                    .arg( "-P").arg( req.output_dir.as_os_str())
                    .arg( format!("{}/", req.url));
            }
            None => {
                cmd.arg( format!("--cut-dirs={}", req.cut_dirs))
                    .arg( "-P").arg( req.output_dir.as_os_str())
                    .arg( &req.url);
            }
        }

        cmd.stdin( Stdio::null())
            .stdout( Stdio::null())
            .stderr( Stdio::piped());

        execute_cmd( "wget", &mut cmd).await
    }
}

pub struct GzipDecompressor {
    program: PathBuf,
}

impl GzipDecompressor {
    pub fn new (config: &ToolConfig)->Self {
        GzipDecompressor { program: config.tool_path( &config.gzip) }
    }
}

#[async_trait]
impl Decompressor for GzipDecompressor {
    async fn decompress (&self, path: &Path)->Result<ToolStatus> {
        let mut cmd = Command::new( &self.program);
        cmd.arg( "-d").arg( "-f").arg( path.as_os_str())
            .stdin( Stdio::null())
            .stdout( Stdio::null())
            .stderr( Stdio::piped());

        execute_cmd( "gzip", &mut cmd).await
    }
}

pub struct Crx2RnxConverter {
    program: PathBuf,
}

impl Crx2RnxConverter {
    pub fn new (config: &ToolConfig)->Self {
        Crx2RnxConverter { program: config.tool_path( &config.crx2rnx) }
    }
}

#[async_trait]
impl FormatConverter for Crx2RnxConverter {
    async fn convert (&self, input: &Path, output: &Path)->Result<ToolStatus> {
        let stdin = File::open( input)?;
        let stdout = File::create( output)?;

        let mut cmd = Command::new( &self.program);
        cmd.arg( "-f").arg( "-")
            .stdin( Stdio::from( stdin))
            .stdout( Stdio::from( stdout))
            .stderr( Stdio::piped());

        execute_cmd( "crx2rnx", &mut cmd).await
    }
}

async fn execute_cmd (tool: &str, cmd: &mut Command)->Result<ToolStatus> {
    debug!("executing {cmd:?}");
    cmd.kill_on_drop(true);

    match cmd.spawn() {
        Ok(child) => {
            match child.wait_with_output().await {
                Ok(output) => {
                    let stderr = String::from_utf8_lossy( &output.stderr);
                    let detail = stderr.lines().rev().find( |l| !l.trim().is_empty()).unwrap_or("").trim().to_string();
                    let status = ToolStatus { tool: tool.to_string(), code: output.status.code(), detail };
                    trace!("{status}");
                    Ok(status)
                }
                Err(e) => Err( OdinGnssError::ExecError( format!("{tool}: {e}")))
            }
        }
        Err(e) => Err( OdinGnssError::ExecError( format!("{tool}: {e}")))
    }
}
