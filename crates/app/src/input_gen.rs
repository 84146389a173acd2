//! Sample corpus generation.
//!
//! When `--generate` is given, three files are written into the data
//! directory, one per input kind the benchmark compares:
//!
//! - `sample.txt`: word-like text over a small vocabulary
//! - `sample.pgm`: 8-bit grayscale gradient with noise (binary PGM)
//! - `sample.pcm`: 16-bit little-endian mono PCM, a noisy two-tone signal
//!
//! All output is reproducible from the seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::path::{Path, PathBuf};

const WORDS: &[&str] = &[
    "the", "of", "and", "a", "to", "in", "is", "you", "that", "it", "he", "was", "for", "on",
    "are", "as", "with", "his", "they", "at", "be", "this", "have", "from", "or", "one", "had",
    "by", "word", "but", "not", "what", "all", "were", "we", "when", "your", "can", "said",
    "there", "use", "an", "each", "which", "she", "do", "how", "their", "if", "will", "up",
    "other", "about", "out", "many", "then", "them", "these", "so", "some", "her", "would",
];

const IMAGE_WIDTH: usize = 256;

/// Word-like text with sentence punctuation and line breaks.
pub fn generate_text(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes + 16);
    let mut line_len = 0;

    while data.len() < size_bytes {
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        data.extend_from_slice(word.as_bytes());
        line_len += word.len();

        let separator: &[u8] = match rng.gen_range(0..20) {
            0 => b". ",
            1 => b", ",
            _ if line_len > 72 => b"\n",
            _ => b" ",
        };
        if separator == b"\n" {
            line_len = 0;
        }
        data.extend_from_slice(separator);
    }

    data.truncate(size_bytes);
    data
}

/// Binary PGM image: diagonal gradient plus small noise.
///
/// `size_bytes` bounds the pixel data; the header is added on top.
pub fn generate_image(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let height = (size_bytes / IMAGE_WIDTH).max(1);

    let mut data = format!("P5\n{} {}\n255\n", IMAGE_WIDTH, height).into_bytes();
    data.reserve(IMAGE_WIDTH * height);

    for y in 0..height {
        for x in 0..IMAGE_WIDTH {
            let base = ((x + y) / 2 % 256) as u8;
            let noise: i8 = rng.gen_range(-3..=3);
            data.push(base.saturating_add_signed(noise));
        }
    }

    data
}

/// 16-bit LE PCM at a nominal 8 kHz: two tones plus noise.
pub fn generate_audio(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let samples = size_bytes / 2;
    let mut data = Vec::with_capacity(samples * 2);

    for n in 0..samples {
        let t = n as f64 / 8000.0;
        let tone = (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 6000.0
            + (2.0 * std::f64::consts::PI * 660.0 * t).sin() * 2000.0;
        let noise: f64 = rng.gen_range(-200.0..200.0);
        let sample = (tone + noise) as i16;
        data.extend_from_slice(&sample.to_le_bytes());
    }

    data
}

/// Write the three sample files into `dir`, creating it if needed.
pub fn write_sample_corpus(dir: &Path, seed: u64, size_bytes: usize) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let samples = [
        ("sample.txt", generate_text(seed, size_bytes)),
        ("sample.pgm", generate_image(seed.wrapping_add(1), size_bytes)),
        ("sample.pcm", generate_audio(seed.wrapping_add(2), size_bytes)),
    ];

    let mut written = Vec::with_capacity(samples.len());
    for (name, data) in samples {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(&data)?;
        written.push(path);
    }

    Ok(written)
}
