use std::collections::BTreeMap;
use std::hint::black_box;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use dftsplit::{io, Image, Pipeline, TransformOptions};
use indicatif::ProgressBar;
use strum::IntoEnumIterator;

mod stage;
mod suite;
mod util;

use crate::stage::Stage;
use crate::suite::{generate_test_suites, StageResult, Test};
use crate::util::psnr;

// how many times to run each stage (to get the minimum time)
static RUNS: usize = 3;

fn main() -> Result<()> {
    let root = std::env::args().nth(1).unwrap_or_else(|| "images".to_string());
    let mut suites = generate_test_suites(&root);
    let pipeline = Pipeline::new(TransformOptions::default());

    println!(
        " \x1b[1mRunning round trips\x1b[0m ({} runs per image)",
        RUNS
    );

    for suite in suites.values_mut() {
        if suite.files.is_empty() {
            continue;
        }

        println!("┌──────────────────────────────────────────────────────┐");
        println!(
            "│ running tests for {suite_name: <34} │",
            suite_name = suite.name
        );
        println!("└──────────────────────────────────────────────────────┘");

        let pb = ProgressBar::new(suite.files.len() as u64);
        for file in suite.files.iter() {
            pb.inc(1);

            let source = io::load(Path::new(file)).with_context(|| format!("reading {file}"))?;
            let pixels = source.width() * source.height();

            let test = match run_test(&pipeline, &source) {
                Ok((results, psnr)) => Test {
                    name: file.to_string(),
                    pixels,
                    results,
                    psnr,
                    errored: false,
                },
                Err(e) => {
                    pb.println(format!("Error in {file}, skipping: {e}"));
                    Test {
                        name: file.to_string(),
                        pixels,
                        results: BTreeMap::new(),
                        psnr: 0.0,
                        errored: true,
                    }
                }
            };
            suite.tests.push(test);
        }
        pb.finish_and_clear()
    }

    println!("\n \x1b[1mResults\x1b[0m");

    for suite in suites.values() {
        let successful_tests = suite
            .tests
            .iter()
            .filter(|t| !t.errored)
            .collect::<Vec<_>>();

        print_results(successful_tests, &suite.name);
    }

    let all_tests = suites
        .values()
        .flat_map(|s| s.tests.iter())
        .filter(|t| !t.errored)
        .collect::<Vec<_>>();

    print_results(all_tests, "Overall");

    Ok(())
}

fn print_results(tests: Vec<&Test>, title: &str) {
    let total_pixels: usize = tests.iter().map(|t| t.pixels).sum();

    if total_pixels == 0 {
        return;
    }

    println!("┌───────────────────────────────┐");
    println!("│ {title: <29} │", title = title);
    println!("├─────────┬───────────┬─────────┤");
    println!("│ stage   │ time      │ ns/px   │");
    println!("├─────────┼───────────┼─────────┤");
    for stage in Stage::iter() {
        let total_time: u128 = tests
            .iter()
            .filter_map(|t| t.results.get(&stage))
            .map(|r| r.min_time)
            .sum();

        println!(
            "│ {stage: <7} │ {time: >7}ms │ {per_pixel: >7.1} │",
            stage = stage,
            time = total_time / 1000,
            per_pixel = total_time as f64 * 1000.0 / total_pixels as f64
        );
    }
    println!("├─────────┴───────────┴─────────┤");

    let worst = tests.iter().map(|t| t.psnr).fold(f64::INFINITY, f64::min);
    let worst_name = tests
        .iter()
        .find(|t| t.psnr == worst)
        .map(|t| t.name.as_str())
        .unwrap_or("-");
    println!("│ worst psnr {worst: >8.2} dB         │");
    println!("│ {worst_name: <29} │");
    println!("└───────────────────────────────┘");
}

fn run_test(pipeline: &Pipeline, source: &Image) -> Result<(BTreeMap<Stage, StageResult>, f64)> {
    let mut results = BTreeMap::new();

    // FORWARD
    let mut shortest_forward = u128::MAX;
    let mut decomposition = None;
    for _ in 0..RUNS {
        let start = Instant::now();
        let out = black_box(pipeline.forward(black_box(source)))?;
        shortest_forward = shortest_forward.min(start.elapsed().as_micros());
        decomposition = Some(out);
    }
    let decomposition = decomposition.context("no forward run")?;
    results.insert(
        Stage::Forward,
        StageResult {
            min_time: shortest_forward,
        },
    );

    // INVERSE
    let mut shortest_inverse = u128::MAX;
    let mut rebuilt = None;
    for _ in 0..RUNS {
        let start = Instant::now();
        let out = black_box(pipeline.inverse(
            &decomposition.magnitude,
            &decomposition.phase,
            &decomposition.norms,
        ))?;
        shortest_inverse = shortest_inverse.min(start.elapsed().as_micros());
        rebuilt = Some(out);
    }
    let rebuilt = rebuilt.context("no inverse run")?;
    results.insert(
        Stage::Inverse,
        StageResult {
            min_time: shortest_inverse,
        },
    );

    Ok((results, psnr(source, &rebuilt)))
}
