// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Some utilities for tests, on the library and on the binaries.

use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::prelude::*;
use std::path::{self, Path};
use walkdir::WalkDir;

fn get_file_content<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let mut output_file = File::open(path).unwrap_or_else(|_| panic!("file {:?} not found", path));
    let mut output_contents = String::new();
    output_file.read_to_string(&mut output_contents).unwrap();

    output_contents
}

/// Compare the files of `output_dir` with the ones of `work_dir_expected`.
/// Without a list of files, every file found in `work_dir_expected` (and its
/// sub-directories) is compared.
pub fn compare_output_dir_with_expected<P: AsRef<Path>>(
    output_dir: &P,
    files_to_check: Option<Vec<&str>>,
    work_dir_expected: &str,
) {
    let output_dir = output_dir.as_ref();
    let files_to_check: Vec<String> = match files_to_check {
        Some(files) => files.into_iter().map(String::from).collect(),
        None => WalkDir::new(work_dir_expected)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(work_dir_expected)
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect(),
    };
    for filename in files_to_check {
        let output_contents = get_file_content(output_dir.join(&filename));
        let expected_contents = get_file_content(Path::new(work_dir_expected).join(&filename));
        assert_eq!(expected_contents, output_contents, "in file {}", filename);
    }
}

/// Write `content` in a file named `file_name` in the `path` directory
pub fn create_file_with_content(path: &path::Path, file_name: &str, content: &str) -> File {
    let file_path = path.join(file_name);
    let mut f = File::create(&file_path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    File::open(file_path).unwrap()
}

/// Run `func` with a temporary directory deleted afterwards
pub fn test_in_tmp_dir<F>(func: F)
where
    F: FnOnce(&path::Path),
{
    let tmp_dir = tempfile::tempdir().expect("create temp dir");
    {
        let path = tmp_dir.path();
        func(path);
    }
    tmp_dir.close().expect("delete temp dir");
}
