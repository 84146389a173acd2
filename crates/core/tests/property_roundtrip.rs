use entropy_bench_core::huffman::CodeTable;
use entropy_bench_core::model::FrequencyTable;
use entropy_bench_core::{compress, decompress, CompressedContainer, Mode};
use proptest::prelude::*;

fn roundtrip(mode: Mode, data: &[u8]) -> Vec<u8> {
    let bytes = compress(mode, data).unwrap().to_bytes();
    let parsed = CompressedContainer::from_bytes(&bytes).unwrap();
    decompress(&parsed).unwrap()
}

/// Inputs biased toward small alphabets, where tie-breaks and skew matter most.
fn skewed_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            8 => Just(b'a'),
            3 => Just(b'b'),
            1 => any::<u8>(),
        ],
        0..2048,
    )
}

proptest! {
    #[test]
    fn prop_huffman_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(roundtrip(Mode::Huffman, &data), data);
    }

    #[test]
    fn prop_arithmetic_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(roundtrip(Mode::Arithmetic, &data), data);
    }

    #[test]
    fn prop_skewed_roundtrip(data in skewed_bytes()) {
        prop_assert_eq!(roundtrip(Mode::Huffman, &data), data.clone());
        prop_assert_eq!(roundtrip(Mode::Arithmetic, &data), data);
    }

    #[test]
    fn prop_deterministic(data in skewed_bytes()) {
        for mode in [Mode::Huffman, Mode::Arithmetic] {
            let first = compress(mode, &data).unwrap().to_bytes();
            let second = compress(mode, &data).unwrap().to_bytes();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_codes_prefix_free_and_kraft(data in prop::collection::vec(any::<u8>(), 1..1024)) {
        let table = CodeTable::from_frequencies(&FrequencyTable::build(&data)).unwrap();
        let codes: Vec<_> = table.iter().map(|(_, code)| code).collect();

        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                prop_assert!(!a.is_prefix_of(b) && !b.is_prefix_of(a));
            }
        }

        let kraft: f64 = codes.iter().map(|c| 2f64.powi(-(c.len as i32))).sum();
        prop_assert!(kraft <= 1.0 + 1e-12);
        if codes.len() > 1 {
            prop_assert!((kraft - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..1400)) {
        if let Ok(container) = CompressedContainer::from_bytes(&bytes) {
            let _ = decompress(&container);
        }
    }
}
