//! Benchmark results and reporting.
//!
//! One [`ReportRow`] is recorded per file and coder. The [`Report`] writes
//! them as CSV and prints two stdout summaries:
//! - per file, Huffman against arithmetic (ratio, time, size and time deltas)
//! - the median size and time difference across every file both coders finished

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Timings and sizes for one decompression pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub decompressed_size: u64,
    pub decompression_time: Duration,
    /// Resident-set growth across the call, KiB
    pub decompression_mem_kb: f64,
}

/// One coder run over one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub file: String,
    pub kind: &'static str,
    pub algorithm: &'static str,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_time: Duration,
    /// Resident-set growth across the call, KiB
    pub compression_mem_kb: f64,
    pub verification: Option<Verification>,
}

impl ReportRow {
    /// Original over compressed size. `None` if nothing was written.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.compressed_size == 0 {
            None
        } else {
            Some(self.original_size as f64 / self.compressed_size as f64)
        }
    }

    pub fn compression_time_ms(&self) -> f64 {
        self.compression_time.as_secs_f64() * 1000.0
    }

    fn csv_line(&self, verify: bool) -> String {
        let ratio = self
            .compression_ratio()
            .map(|r| format!("{:.3}", r))
            .unwrap_or_default();

        let mut line = format!(
            "{},{},{},{},{},{},{:.3},{:.2}",
            csv_field(&self.file),
            self.kind,
            self.algorithm,
            self.original_size,
            self.compressed_size,
            ratio,
            self.compression_time_ms(),
            self.compression_mem_kb,
        );

        if verify {
            match &self.verification {
                Some(v) => line.push_str(&format!(
                    ",{},{:.3},{:.2}",
                    v.decompressed_size,
                    v.decompression_time.as_secs_f64() * 1000.0,
                    v.decompression_mem_kb
                )),
                None => line.push_str(",,,"),
            }
        }

        line
    }
}

/// Collected rows for a whole run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    verify: bool,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(verify: bool) -> Self {
        Self {
            verify,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn header(&self) -> String {
        let mut header = String::from(
            "file,type,algorithm,original_size,compressed_size,compression_ratio,compression_time_ms,compression_mem_kb",
        );
        if self.verify {
            header.push_str(",decompressed_size,decompression_time_ms,decompression_mem_kb");
        }
        header
    }

    /// Render the whole report as CSV text.
    pub fn to_csv(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.csv_line(self.verify));
            out.push('\n');
        }
        out
    }

    /// Write the CSV to `path`, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.to_csv().as_bytes())
    }

    /// Huffman and arithmetic rows for every file that has both, in run order.
    pub fn pairs(&self) -> Vec<(&ReportRow, &ReportRow)> {
        let mut pairs = Vec::new();
        for huffman in self.rows.iter().filter(|r| r.algorithm == "Huffman") {
            if let Some(arithmetic) = self
                .rows
                .iter()
                .find(|r| r.algorithm == "Arithmetic" && r.file == huffman.file)
            {
                pairs.push((huffman, arithmetic));
            }
        }
        pairs
    }

    /// Median of (Huffman minus arithmetic) compressed size and compression time.
    pub fn median_differences(&self) -> Option<(f64, f64)> {
        let pairs = self.pairs();
        let sizes: Vec<f64> = pairs
            .iter()
            .map(|(h, a)| h.compressed_size as f64 - a.compressed_size as f64)
            .collect();
        let times: Vec<f64> = pairs
            .iter()
            .map(|(h, a)| h.compression_time_ms() - a.compression_time_ms())
            .collect();
        Some((median(&sizes)?, median(&times)?))
    }

    /// Print the per-file comparison for every file both coders finished.
    pub fn print_comparisons(&self) {
        for (h, a) in self.pairs() {
            let size_diff = h.compressed_size as i64 - a.compressed_size as i64;
            let time_diff = h.compression_time_ms() - a.compression_time_ms();

            println!("\n{}", h.file);
            println!(
                "  Huffman    ratio {} | time {:.3} ms",
                format_ratio(h.compression_ratio()),
                h.compression_time_ms()
            );
            println!(
                "  Arithmetic ratio {} | time {:.3} ms",
                format_ratio(a.compression_ratio()),
                a.compression_time_ms()
            );
            println!(
                "  Size {:+} bytes ({:+.2}%)",
                size_diff,
                percent(size_diff as f64, a.compressed_size as f64)
            );
            println!(
                "  Time {:+.3} ms ({:+.2}%)",
                time_diff,
                percent(time_diff, a.compression_time_ms())
            );
        }
    }

    /// Print the cross-file medians, if any file has both coders.
    pub fn print_summary(&self) {
        if let Some((size, time)) = self.median_differences() {
            println!("\nMedian differences across all test files:");
            println!("  size {:+.0} bytes (Huffman-Arithmetic)", size);
            println!("  time {:+.3} ms", time);
        }
    }
}

/// Median of `values`; the mean of the middle two for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn percent(delta: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        delta / base * 100.0
    }
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map(|r| format!("{:.3}", r)).unwrap_or_else(|| "-".to_string())
}

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(file: &str, algorithm: &'static str, compressed: u64, ms: u64) -> ReportRow {
        ReportRow {
            file: file.to_string(),
            kind: "text",
            algorithm,
            original_size: 1000,
            compressed_size: compressed,
            compression_time: Duration::from_millis(ms),
            compression_mem_kb: 12.5,
            verification: None,
        }
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(row("a", "Huffman", 500, 1).compression_ratio(), Some(2.0));
        assert_eq!(row("a", "Huffman", 0, 1).compression_ratio(), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_csv_without_verify() {
        let mut report = Report::new(false);
        report.push(row("a.txt", "Huffman", 500, 2));

        let csv = report.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "file,type,algorithm,original_size,compressed_size,compression_ratio,compression_time_ms,compression_mem_kb"
        );
        assert_eq!(lines[1], "a.txt,text,Huffman,1000,500,2.000,2.000,12.50");
    }

    #[test]
    fn test_csv_with_verify() {
        let mut report = Report::new(true);
        let mut verified = row("a.txt", "Arithmetic", 400, 3);
        verified.verification = Some(Verification {
            decompressed_size: 1000,
            decompression_time: Duration::from_micros(1500),
            decompression_mem_kb: 4.0,
        });
        report.push(verified);
        report.push(row("b.txt", "Huffman", 500, 2));

        let csv = report.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "file,type,algorithm,original_size,compressed_size,compression_ratio,\
             compression_time_ms,compression_mem_kb,decompressed_size,decompression_time_ms,\
             decompression_mem_kb"
        );
        assert_eq!(lines[1], "a.txt,text,Arithmetic,1000,400,2.500,3.000,12.50,1000,1.500,4.00");
        // Rows without a decompression pass keep the column count
        assert_eq!(lines[2], "b.txt,text,Huffman,1000,500,2.000,2.000,12.50,,,");
    }

    #[test]
    fn test_csv_quotes_awkward_names() {
        assert_eq!(csv_field("plain.txt"), "plain.txt");
        assert_eq!(csv_field("a,b.txt"), "\"a,b.txt\"");
        assert_eq!(csv_field("line\rbreak.txt"), "\"line\rbreak.txt\"");
        assert_eq!(csv_field("say \"hi\".txt"), "\"say \"\"hi\"\".txt\"");
    }

    #[test]
    fn test_median_differences() {
        let mut report = Report::new(false);
        report.push(row("a", "Huffman", 500, 2));
        report.push(row("a", "Arithmetic", 450, 5));
        report.push(row("b", "Huffman", 300, 1));
        report.push(row("b", "Arithmetic", 290, 2));
        report.push(row("c", "Huffman", 100, 1));

        assert_eq!(report.pairs().len(), 2);
        let (size, time) = report.median_differences().unwrap();
        assert_eq!(size, 30.0);
        assert!((time - -2.0).abs() < 1e-9);
    }

    #[test]
    fn test_write_csv_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("results.csv");

        let mut report = Report::new(false);
        report.push(row("a", "Huffman", 500, 2));
        report.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.to_csv());
    }
}
