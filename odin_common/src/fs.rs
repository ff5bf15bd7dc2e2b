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

use std::fs;
use std::io::{self,ErrorKind};
use std::path::{Path,PathBuf};
use globset::GlobMatcher;

use crate::macros::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

/// check if dir pathname exists and is writable, try to create dir otherwise.
/// Creation races with other tasks are not errors - we only fail if the dir still does not exist afterwards
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(ErrorKind::PermissionDenied, "output_dir {:?} not writable", &path))
        } else {
            Ok(())
        }

    } else {
        match fs::create_dir_all(path) {
            Ok(()) => Ok(()),
            Err(_) if path.is_dir() => Ok(()),
            Err(e) => Err(e)
        }
    }
}

/// does path refer to an existing regular file with content
pub fn is_non_empty_file (path: impl AsRef<Path>)->bool {
    fs::metadata(path.as_ref()).map( |md| md.is_file() && md.len() > 0).unwrap_or(false)
}

/// remove a directory tree if it exists. Returns true if something was removed
pub fn remove_dir_if_exists (path: impl AsRef<Path>)->Result<bool> {
    let path = path.as_ref();
    if path.is_dir() {
        fs::remove_dir_all(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// remove file if it exists, ignoring NotFound
pub fn remove_file_if_exists (path: impl AsRef<Path>)->Result<()> {
    match fs::remove_file(path.as_ref()) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(())
    }
}

/// regular files in `dir` whose filename matches the glob, in lexicographic order of their filenames
pub fn matching_files_in_dir<P: AsRef<Path>> (dir: &P, fname_glob: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let dir: &Path = dir.as_ref();
    let mut list: Vec<PathBuf> = Vec::new();

    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            if let Ok(entry) = entry {
                let path = entry.path();
                if path.is_file() {
                    if let Some(fname) = entry.file_name().to_str() {
                        if fname_glob.is_match( fname) {
                            list.push(path)
                        }
                    }
                }
            }
        }
    }

    list.sort_by( |a,b| a.file_name().cmp( &b.file_name()));
    Ok(list)
}
