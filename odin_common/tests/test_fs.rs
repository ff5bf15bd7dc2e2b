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

use std::fs;
use globset::Glob;
use tempfile::tempdir;
use odin_common::fs::{ensure_writable_dir,is_non_empty_file,matching_files_in_dir,remove_dir_if_exists,remove_file_if_exists};

#[test]
fn test_matching_files() {
    let tmp = tempdir().unwrap();
    for name in ["b0450.21d.gz", "a0450.21d.gz", "a0450.21d.Z", "x0440.21d.gz"] {
        fs::write( tmp.path().join(name), name).unwrap();
    }
    fs::create_dir( tmp.path().join("c0450.21d.gz")).unwrap(); // dirs are not candidates

    let matcher = Glob::new("*0450.21d.gz").unwrap().compile_matcher();
    let files = matching_files_in_dir( &tmp.path(), &matcher).unwrap();
    let names: Vec<&str> = files.iter().filter_map( |p| p.file_name().and_then(|f| f.to_str())).collect();
    assert_eq!( names, vec!["a0450.21d.gz", "b0450.21d.gz"]);

    let files = matching_files_in_dir( &tmp.path().join("nonexisting"), &matcher).unwrap();
    assert!( files.is_empty());
}

#[test]
fn test_dir_ops() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("a/b/c");

    ensure_writable_dir( &dir).unwrap();
    ensure_writable_dir( &dir).unwrap();
    assert!( dir.is_dir());

    let file = dir.join("empty");
    fs::write( &file, "").unwrap();
    assert!( !is_non_empty_file( &file));
    fs::write( &file, "x").unwrap();
    assert!( is_non_empty_file( &file));

    remove_file_if_exists( &file).unwrap();
    remove_file_if_exists( &file).unwrap();
    assert!( !file.exists());

    assert!( remove_dir_if_exists( tmp.path().join("a")).unwrap());
    assert!( !remove_dir_if_exists( tmp.path().join("a")).unwrap());
}
