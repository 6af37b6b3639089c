use std::collections::BTreeMap;
use walkdir::WalkDir;

use crate::{stage::Stage, util::suite_name};

#[derive(Debug)]
pub struct StageResult {
    pub min_time: u128,
}

#[derive(Debug)]
pub struct Test {
    pub name: String,
    pub pixels: usize,
    pub results: BTreeMap<Stage, StageResult>,
    // peak signal to noise ratio of the rebuilt image, in dB
    pub psnr: f64,
    pub errored: bool,
}

#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub files: Vec<String>,
    pub tests: Vec<Test>,
}

pub fn generate_test_suites(root: &str) -> BTreeMap<String, TestSuite> {
    let mut suites: BTreeMap<String, TestSuite> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let Ok(entry) = entry else {
            continue;
        };

        let Some(path) = entry.path().to_str() else {
            continue;
        };

        if path == root {
            continue;
        }

        if entry.file_type().is_dir() {
            suites.insert(
                path.to_string(),
                TestSuite {
                    name: path.to_string(),
                    files: Vec::new(),
                    tests: Vec::new(),
                },
            );
            continue;
        }

        if !path.ends_with(".png") {
            continue;
        }

        let Some(suite) = suite_name(entry.path()).and_then(|name| suites.get_mut(name)) else {
            println!("No suite for {}", path);
            continue;
        };

        suite.files.push(path.to_string());
    }
    suites
}
