use approx::assert_abs_diff_eq;
use ndarray::{array, s, Array2, Axis};
use patchfex::core::clumpiness::clumpiness;
use patchfex::core::connectivity::{section_length_ratio, ConnectivityMetric};
use patchfex::core::contagion::{contagion_index, AdjacencyCounts, ContagionIndex, Neighborhood};
use patchfex::core::mask_metrics::SpatialMetrics;
use patchfex::types::BinaryMask;

fn scattered_5x5() -> BinaryMask {
    array![
        [1u8, 0, 1, 1, 1],
        [1, 1, 0, 1, 1],
        [1, 0, 1, 0, 1],
        [0, 1, 0, 1, 0],
        [0, 1, 0, 1, 0],
    ]
}

#[test]
fn test_connectivity_l_shape() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mask = array![
        [1u8, 1, 1, 1],
        [1, 1, 1, 1],
        [1, 1, 0, 0],
        [1, 1, 0, 0],
    ];
    let cm = ConnectivityMetric::compute(&mask);
    assert_abs_diff_eq!(cm.mean_max_run_length_h, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cm.mean_max_run_length_v, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cm.section_length_ratio, 0.75, epsilon = 1e-9);
}

#[test]
fn test_connectivity_scattered() {
    let cm = ConnectivityMetric::compute(&scattered_5x5());
    assert_abs_diff_eq!(cm.mean_max_run_length_h, 1.6, epsilon = 1e-9);
    assert_abs_diff_eq!(cm.mean_max_run_length_v, 2.2, epsilon = 1e-9);
    assert_abs_diff_eq!(cm.section_length_ratio, 0.38, epsilon = 1e-9);
}

#[test]
fn test_section_length_mirror_invariant() {
    let mask = scattered_5x5();
    let ratio = section_length_ratio(&mask);

    let flipped_lr = mask.slice(s![.., ..;-1]).to_owned();
    let flipped_tb = mask.slice(s![..;-1, ..]).to_owned();
    assert_abs_diff_eq!(section_length_ratio(&flipped_lr), ratio, epsilon = 1e-12);
    assert_abs_diff_eq!(section_length_ratio(&flipped_tb), ratio, epsilon = 1e-12);
}

#[test]
fn test_section_length_penalizes_fragmentation() {
    let fragmented = array![[1u8, 1, 0, 0, 1, 1], [1, 1, 0, 0, 1, 1]];
    let solid = array![[1u8, 1, 1, 1, 0, 0], [1, 1, 1, 1, 0, 0]];
    assert_eq!(fragmented.sum(), solid.sum());

    let r_fragmented = section_length_ratio(&fragmented);
    let r_solid = section_length_ratio(&solid);
    println!("fragmented {:.3}, solid {:.3}", r_fragmented, r_solid);
    assert!(r_fragmented < r_solid);
}

#[test]
fn test_contagion_published_tallies() {
    let disc = array![
        [0u8, 1, 1, 1, 0],
        [1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1],
        [0, 1, 1, 1, 0],
    ];
    let band = array![
        [1u8, 1, 0, 0, 0],
        [1, 1, 1, 1, 0],
        [0, 1, 1, 1, 0],
        [0, 1, 1, 1, 1],
        [0, 0, 0, 1, 1],
    ];

    let cases = [
        (scattered_5x5(), AdjacencyCounts { n00: 20, n01: 38, n10: 38, n11: 48 }),
        (disc, AdjacencyCounts { n00: 0, n01: 12, n10: 12, n11: 120 }),
        (band, AdjacencyCounts { n00: 20, n01: 26, n10: 26, n11: 72 }),
    ];

    for (mask, expected) in cases {
        let contagion = ContagionIndex::compute(&mask, Neighborhood::Queen);
        println!("{:?} -> {:.4}", contagion.counts, contagion.value);
        assert_eq!(contagion.counts, expected);
        assert_eq!(contagion.counts.n01, contagion.counts.n10);
        assert!((0.0..=1.0).contains(&contagion.value));
    }
}

#[test]
fn test_contagion_class_swap_symmetry() {
    let mask = scattered_5x5();
    let swapped = mask.mapv(|v| if v == 0 { 1u8 } else { 0 });

    for neighborhood in [Neighborhood::Queen, Neighborhood::Rook] {
        let a = ContagionIndex::compute(&mask, neighborhood).value;
        let b = ContagionIndex::compute(&swapped, neighborhood).value;
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(contagion_index(&mask), 0.030868238702716155, epsilon = 1e-9);
}

#[test]
fn test_clumpiness_orders_patterns() {
    let mut blob = Array2::<u8>::zeros((40, 40));
    blob.slice_mut(s![10..20, 10..20]).fill(1);

    let mut stripes = Array2::<u8>::zeros((40, 40));
    for (i, mut column) in stripes.axis_iter_mut(Axis(1)).enumerate() {
        if i % 4 == 0 {
            column.fill(1);
        }
    }

    let mut speckle = Array2::<u8>::zeros((40, 40));
    for y in (0..40).step_by(2) {
        for x in (0..40).step_by(2) {
            speckle[[y, x]] = 1;
        }
    }

    let (c_blob, c_stripes, c_speckle) = (clumpiness(&blob), clumpiness(&stripes), clumpiness(&speckle));
    println!("blob {:.3}, stripes {:.3}, speckle {:.3}", c_blob, c_stripes, c_speckle);
    assert!(c_blob > c_stripes);
    assert!(c_stripes > c_speckle);
    assert_abs_diff_eq!(c_speckle, -1.0, epsilon = 1e-12);
    for c in [c_blob, c_stripes, c_speckle] {
        assert!((-1.0..=1.0).contains(&c));
    }
}

#[test]
fn test_spatial_metrics_for_empty_patch() {
    let metrics = SpatialMetrics::compute(&Array2::<u8>::zeros((20, 20)), Neighborhood::Queen);
    assert_eq!(metrics.inside_count, 0);
    assert_eq!(metrics.section_length_ratio, 0.0);
    assert_eq!(metrics.clumpiness, 0.0);
    assert_abs_diff_eq!(metrics.contagion_index, 1.0);
}
