#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use yolotile::geometry::{ImageDims, LabelBox, TileParams};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_dims() -> impl Strategy<Value = ImageDims> {
    (1u32..=1500, 1u32..=1500).prop_map(|(w, h)| ImageDims::new(w, h))
}

/// Any valid geometry with the given retention policy.
pub fn arb_params(min_objects: usize, keep_empty: bool) -> impl Strategy<Value = TileParams> {
    (64u32..=1024, 0.0f64..0.9)
        .prop_filter_map("step must be positive", move |(size, overlap)| {
            TileParams::new(size, overlap, min_objects, keep_empty).ok()
        })
}

pub fn arb_params_no_overlap() -> impl Strategy<Value = TileParams> {
    (64u32..=1024).prop_map(|size| TileParams::new(size, 0.0, 1, false).expect("valid params"))
}

pub fn arb_box() -> impl Strategy<Value = LabelBox> {
    (0u32..10, 0.0f64..1.0, 0.0f64..1.0, 0.001f64..0.5, 0.001f64..0.5)
        .prop_map(|(class_id, cx, cy, w, h)| LabelBox::new(class_id, cx, cy, w, h))
}

pub fn arb_boxes(max: usize) -> impl Strategy<Value = Vec<LabelBox>> {
    prop::collection::vec(arb_box(), 0..=max)
}
