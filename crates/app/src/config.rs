//! Configuration for the benchmark harness.
//!
//! Handles parsing command-line arguments. Every option has a default, so the
//! tool runs with zero arguments against `./data`.

use entropy_bench_core::Mode;
use std::path::PathBuf;

/// Which coders to run on each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelection {
    Huffman,
    Arithmetic,
    Both,
}

impl ModeSelection {
    pub fn modes(self) -> Vec<Mode> {
        match self {
            ModeSelection::Huffman => vec![Mode::Huffman],
            ModeSelection::Arithmetic => vec![Mode::Arithmetic],
            ModeSelection::Both => vec![Mode::Huffman, Mode::Arithmetic],
        }
    }

    fn parse(value: &str) -> Result<Self, String> {
        match value.to_ascii_lowercase().as_str() {
            "huffman" => Ok(ModeSelection::Huffman),
            "arithmetic" => Ok(ModeSelection::Arithmetic),
            "both" => Ok(ModeSelection::Both),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Complete configuration for a benchmark run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// Directory scanned for input files
    pub data_dir: PathBuf,

    /// CSV report path
    pub output_csv: PathBuf,

    // === Run ===
    /// Coders to run
    pub modes: ModeSelection,

    /// Decompress and compare every result
    pub verify: bool,

    /// Write a seeded sample corpus of this many bytes per kind first
    pub generate_bytes: Option<usize>,

    /// Seed for sample generation
    pub seed: u64,

    // === Behavior ===
    /// Whether to print the resolved configuration
    pub print_config: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            output_csv: PathBuf::from("./results/results.csv"),
            modes: ModeSelection::Both,
            verify: true,
            generate_bytes: None,
            seed: 42,
            print_config: false,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--data" => {
                    config.data_dir = PathBuf::from(next_value(args, &mut i, "--data requires a path")?);
                }
                "--out" => {
                    config.output_csv = PathBuf::from(next_value(args, &mut i, "--out requires a path")?);
                }
                "--mode" => {
                    let value = next_value(args, &mut i, "--mode requires huffman, arithmetic or both")?;
                    config.modes = ModeSelection::parse(value)?;
                }
                "--verify" => {
                    config.verify = true;
                }
                "--no-verify" => {
                    config.verify = false;
                }
                "--generate" => {
                    let value = next_value(args, &mut i, "--generate requires a byte count")?;
                    config.generate_bytes = Some(value.parse().map_err(|_| "invalid byte count")?);
                }
                "--seed" => {
                    let value = next_value(args, &mut i, "--seed requires a number")?;
                    config.seed = value.parse().map_err(|_| "invalid seed")?;
                }
                "--print-config" => {
                    config.print_config = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {}", other));
                }
            }
            i += 1;
        }

        Ok(config)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Data directory: {}", self.data_dir.display());
        println!("Report:         {}", self.output_csv.display());
        println!("Modes:          {:?}", self.modes);
        println!("Verify:         {}", self.verify);
        match self.generate_bytes {
            Some(bytes) => println!("Generate:       {} bytes per kind (seed {})", bytes, self.seed),
            None => println!("Generate:       no"),
        }
        println!();
    }
}

fn next_value<'a>(args: &'a [String], i: &mut usize, message: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| message.to_string())
}

fn print_help() {
    println!("entropy-bench: compare static Huffman and arithmetic coding");
    println!();
    println!("USAGE:");
    println!("    entropy-bench [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --data <DIR>        Input directory (default: ./data)");
    println!("    --out <PATH>        CSV report (default: ./results/results.csv)");
    println!("    --mode <MODE>       huffman, arithmetic or both (default: both)");
    println!("    --verify            Decompress and compare (default)");
    println!("    --no-verify         Skip decompression");
    println!("    --generate <N>      Write N-byte text/image/audio samples into --data first");
    println!("    --seed <N>          Seed for --generate (default: 42)");
    println!("    --print-config      Print resolved configuration");
    println!("    --help, -h          Print this help");
    println!();
    println!("Set RUST_LOG=debug to see per-call codec diagnostics.");
    println!();
}
