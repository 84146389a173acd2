//! entropy-bench: time and size static Huffman against arithmetic coding
//! over every file in a data directory.

mod config;
mod corpus;
mod input_gen;
mod memory;
mod report;

use std::path::Path;
use std::time::Instant;

use entropy_bench_core::{compress, decompress, CompressedContainer, Mode};
use log::{debug, info, warn};

use config::Config;
use memory::MemorySampler;
use report::{Report, ReportRow, Verification};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if config.print_config {
        config.print();
    }

    if let Err(e) = run(&config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), String> {
    if let Some(size) = config.generate_bytes {
        let written = input_gen::write_sample_corpus(&config.data_dir, config.seed, size)
            .map_err(|e| format!("cannot write samples to {}: {}", config.data_dir.display(), e))?;
        info!("generated {} sample files in {}", written.len(), config.data_dir.display());
    }

    let files = corpus::discover_files(&config.data_dir)
        .map_err(|e| format!("cannot read {}: {}", config.data_dir.display(), e))?;
    if files.is_empty() {
        return Err(format!("no files in {} to test against", config.data_dir.display()));
    }

    if !config.verify {
        println!("[info] Decompression skipped, use --verify for a full round-trip test.");
    }

    let modes = config.modes.modes();
    let mut report = Report::new(config.verify);
    let mut sampler = MemorySampler::new();

    for path in &files {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        for &mode in &modes {
            match measure(&mut sampler, path, mode, &data, config.verify) {
                Ok(row) => report.push(row),
                Err(e) => {
                    println!("[warn] {} failed on {}: {}", mode.name(), display_name(path), e);
                    debug!("{} failed on {}: {}", mode.name(), path.display(), e);
                }
            }
        }
    }

    report
        .write_csv(&config.output_csv)
        .map_err(|e| format!("cannot write {}: {}", config.output_csv.display(), e))?;

    report.print_comparisons();
    report.print_summary();

    println!(
        "\nDone. {} results saved to {}",
        report.rows().len(),
        config.output_csv.display()
    );
    Ok(())
}

/// Compress one file with one coder and, if asked, check the round trip.
fn measure(
    sampler: &mut MemorySampler,
    path: &Path,
    mode: Mode,
    data: &[u8],
    verify: bool,
) -> Result<ReportRow, String> {
    // Sampling stays outside the timed region
    let ((compressed, compression_time), compression_mem_kb) = sampler.measure(|| {
        let start = Instant::now();
        let bytes = compress(mode, data).map(|container| container.to_bytes());
        (bytes, start.elapsed())
    });
    let bytes = compressed.map_err(|e| e.to_string())?;

    let verification = if verify {
        let ((decoded, decompression_time), decompression_mem_kb) = sampler.measure(|| {
            let start = Instant::now();
            let decoded = CompressedContainer::from_bytes(&bytes)
                .and_then(|container| decompress(&container));
            (decoded, start.elapsed())
        });
        let decoded = decoded.map_err(|e| format!("{} ({:?})", e, e.kind()))?;

        if decoded != data {
            return Err("round-trip failed (data corrupted)".to_string());
        }

        Some(Verification {
            decompressed_size: decoded.len() as u64,
            decompression_time,
            decompression_mem_kb,
        })
    } else {
        None
    };

    Ok(ReportRow {
        file: display_name(path),
        kind: corpus::file_kind(path).as_str(),
        algorithm: mode.name(),
        original_size: data.len() as u64,
        compressed_size: bytes.len() as u64,
        compression_time,
        compression_mem_kb,
        verification,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
