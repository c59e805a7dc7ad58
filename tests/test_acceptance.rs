use ndarray::{s, Array2};
use patchfex::core::acceptance::{
    AcceptanceConfig, GateStage, PatchAcceptanceGate, RejectionReason,
};
use patchfex::core::patch_layout::evaluate_patches;
use patchfex::core::reprojection::ReprojectionPlanner;
use patchfex::types::{FexError, GeoPosition, PatchCellIndex, PatchGridSpec};

fn default_gate() -> PatchAcceptanceGate {
    PatchAcceptanceGate::new(AcceptanceConfig::default()).expect("Failed to create gate")
}

/// 200x200 patch with the first `rows` rows inside
fn filled_rows(rows: usize) -> Array2<u8> {
    let mut mask = Array2::<u8>::zeros((200, 200));
    mask.slice_mut(s![0..rows, ..]).fill(1);
    mask
}

#[test]
fn test_minority_valid_patch_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();

    // 7000 inside pixels: 0.175 <= 0.2
    let mask = filled_rows(35);
    let verdict = default_gate()
        .evaluate(40000, (200, 200), &mask)
        .expect("Failed to evaluate patch");

    assert!(!verdict.accepted);
    assert_eq!(verdict.reason, RejectionReason::InsufficientValidRatio);
    assert_eq!(verdict.reason.to_string(), "INSUFFICIENT_VALID_RATIO");
}

#[test]
fn test_majority_valid_patch_skips_dispersion() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Threshold no real patch can meet
    let gate = PatchAcceptanceGate::new(AcceptanceConfig {
        min_clumpiness: 1.0,
        ..AcceptanceConfig::default()
    })
    .expect("Failed to create gate");

    // 25000 inside pixels: 0.625 >= 0.5
    let mask = filled_rows(125);
    let verdict = gate.evaluate(40000, (200, 200), &mask).expect("Failed to evaluate patch");

    assert!(verdict.accepted);
    assert_eq!(verdict.reason, RejectionReason::None);
    let descriptors = verdict.descriptors.expect("Accepted verdict without descriptors");
    assert!((descriptors.valid_pixel_ratio - 0.625).abs() < 1e-12);
    assert!(descriptors.clumpiness < 1.0);
}

#[test]
fn test_dispersion_applies_below_majority() {
    let gate = PatchAcceptanceGate::new(AcceptanceConfig {
        min_clumpiness: 1.0,
        ..AcceptanceConfig::default()
    })
    .expect("Failed to create gate");

    // Same compact shape, 0.45 valid
    let verdict = gate
        .evaluate(40000, (200, 200), &filled_rows(90))
        .expect("Failed to evaluate patch");
    assert_eq!(verdict.reason, RejectionReason::LowClumpiness);
    assert_eq!(verdict.final_stage(), GateStage::Rejected);
}

#[test]
fn test_edge_patch_coverage() {
    let gate = default_gate();

    // 30 of 200 rows extracted: 0.15 < 0.2
    let mask = Array2::<u8>::ones((30, 200));
    let verdict = gate.evaluate(40000, (30, 200), &mask).expect("Failed to evaluate patch");
    assert_eq!(verdict.reason, RejectionReason::InsufficientTotalPixels);

    let mismatch = gate.evaluate(40000, (40, 200), &mask);
    assert!(matches!(mismatch, Err(FexError::DimensionMismatch { .. })));
}

#[test]
fn test_evaluate_scene_patches() {
    let _ = env_logger::builder().is_test(true).try_init();

    // 10-pixel patches of 1 degree
    let spec = PatchGridSpec::new(10, 0.1).expect("Failed to create grid spec");
    let footprint = vec![
        GeoPosition::new(1.5, 0.5),
        GeoPosition::new(1.5, 2.5),
        GeoPosition::new(0.5, 2.5),
        GeoPosition::new(0.5, 0.5),
    ];
    let target = ReprojectionPlanner::new(spec)
        .plan(&footprint)
        .expect("Failed to plan reprojection");
    assert_eq!((target.width, target.height), (30, 20));
    assert_eq!(target.cell, PatchCellIndex::new(180, 88));

    let mut roi = Array2::<u8>::zeros((20, 30));
    roi.slice_mut(s![0..10, 0..10]).fill(1);
    roi.slice_mut(s![12..15, 20..30]).fill(1);

    let report = evaluate_patches(&target, &roi, &default_gate()).expect("Failed to evaluate patches");

    println!("Accepted {} of {}", report.accepted_count, report.evaluations.len());
    assert_eq!(report.evaluations.len(), 6);
    assert_eq!(report.accepted_count, 2);
    assert_eq!(report.rejected_count(), 4);
    assert_eq!(report.rejected.get(&RejectionReason::InsufficientValidRatio), Some(&4));

    let accepted: Vec<&str> = report.accepted().map(|e| e.name.as_str()).collect();
    assert_eq!(accepted, vec!["X0180Y0088", "X0182Y0089"]);

    // Row-major order regardless of scheduling
    let order: Vec<(usize, usize)> = report
        .evaluations
        .iter()
        .map(|e| (e.region.patch_x, e.region.patch_y))
        .collect();
    assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);

    let wrong_shape = Array2::<u8>::zeros((30, 20));
    assert!(matches!(
        evaluate_patches(&target, &wrong_shape, &default_gate()),
        Err(FexError::DimensionMismatch { .. })
    ));
}
