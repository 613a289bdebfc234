use geocluster::prelude::*;
use geocluster::{ClusterSummary, EntryId};
use geojson::JsonObject;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

/// Deterministic pseudo-random points between latitudes -80 and 80.
fn scattered_points(count: usize, seed: u64) -> Vec<InputPoint> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|_| {
            let lng = next() * 360.0 - 180.0;
            let lat = next() * 160.0 - 80.0;
            InputPoint::from_lng_lat(lng, lat)
        })
        .collect()
}

fn index_of(points: Vec<InputPoint>) -> ClusterIndex {
    ClusterIndex::build(ClusterOptions::default(), points).unwrap()
}

#[test]
fn test_world_query_conserves_points_at_every_zoom() {
    let index = index_of(scattered_points(2_000, 7));

    for zoom in 0..=17 {
        let features = index.get_clusters(LngLatBounds::world(), zoom).unwrap();
        let total: u32 = features.iter().map(|f| f.point_count()).sum();
        assert_eq!(total, 2_000, "zoom {}", zoom);
    }
}

#[test]
fn test_repeated_queries_are_identical() {
    let index = index_of(scattered_points(1_000, 11));
    let bounds = LngLatBounds::new(-30.0, -20.0, 60.0, 45.0);

    for zoom in [0, 3, 7, 12] {
        let first: Vec<EntryId> = index
            .get_clusters(bounds, zoom)
            .unwrap()
            .iter()
            .map(|f| f.id())
            .collect();
        let second: Vec<EntryId> = index
            .get_clusters(bounds, zoom)
            .unwrap()
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(first, second, "zoom {}", zoom);
    }
}

#[test]
fn test_separately_built_indexes_agree() {
    let a = index_of(scattered_points(500, 3));
    let b = index_of(scattered_points(500, 3));

    for zoom in 0..=17 {
        let ids_a: Vec<EntryId> = a.entries(zoom).iter().map(|e| e.id).collect();
        let ids_b: Vec<EntryId> = b.entries(zoom).iter().map(|e| e.id).collect();
        assert_eq!(ids_a, ids_b);
    }
}

#[test]
fn test_feature_count_grows_with_zoom() {
    let index = index_of(scattered_points(3_000, 42));

    let mut previous = 0;
    for zoom in 0..=17 {
        let count = index.get_clusters(LngLatBounds::world(), zoom).unwrap().len();
        assert!(
            count >= previous,
            "zoom {} has {} features, fewer than {} one level up",
            zoom,
            count,
            previous
        );
        previous = count;
    }
    assert_eq!(previous, 3_000);
}

#[test]
fn test_expansion_zoom_reveals_children() {
    let index = index_of(scattered_points(1_500, 5));
    let clusters: Vec<ClusterSummary> = index
        .get_clusters(LngLatBounds::world(), 2)
        .unwrap()
        .iter()
        .filter_map(|f| f.as_cluster().cloned())
        .collect();
    assert!(!clusters.is_empty());

    for cluster in clusters {
        let zoom = index.get_cluster_expansion_zoom(cluster.id).unwrap();
        assert_eq!(zoom, cluster.expansion_zoom);

        let visible: HashSet<EntryId> = index
            .get_clusters(LngLatBounds::world(), zoom)
            .unwrap()
            .iter()
            .map(|f| f.id())
            .collect();
        assert!(!visible.contains(&EntryId::Cluster(cluster.id)));

        let children = index.get_children(cluster.id).unwrap();
        assert!(children.len() >= 2);
        for child in &children {
            assert!(visible.contains(&child.id()), "child {} of {}", child.id(), cluster.id);
        }
    }
}

#[test]
fn test_antimeridian_query_covers_both_sides() {
    let index = index_of(vec![
        InputPoint::from_lng_lat(175.0, 0.0),
        InputPoint::from_lng_lat(179.9, 5.0),
        InputPoint::from_lng_lat(-179.9, -5.0),
        InputPoint::from_lng_lat(-175.0, 2.0),
        InputPoint::from_lng_lat(0.0, 0.0),
        InputPoint::from_lng_lat(175.0, 40.0),
    ]);

    let features = index
        .get_clusters([170.0, -10.0, -170.0, 10.0], 17)
        .unwrap();
    let ids: HashSet<EntryId> = features.iter().map(|f| f.id()).collect();
    assert_eq!(features.len(), 4);
    assert_eq!(ids.len(), 4);
    for leaf in 0..4 {
        assert!(ids.contains(&EntryId::Leaf(leaf)));
    }

    // Low zoom: both sides still reported, nothing counted twice.
    let low = index.get_clusters([170.0, -10.0, -170.0, 10.0], 1).unwrap();
    let total: u32 = low.iter().map(|f| f.point_count()).sum();
    assert_eq!(total, 4);
}

#[test]
fn test_single_point_is_a_leaf_at_zoom_zero() {
    let index = index_of(vec![InputPoint::from_lng_lat(116.40, 39.92)]);
    let features = index.get_clusters(LngLatBounds::world(), 0).unwrap();
    assert_eq!(features.len(), 1);
    let leaf = features[0].as_leaf().unwrap();
    assert_eq!(leaf.lng(), 116.40);
    assert_eq!(leaf.lat(), 39.92);
}

#[test]
fn test_points_a_meter_apart() {
    let index = index_of(vec![
        InputPoint::from_lng_lat(116.40, 39.92),
        InputPoint::from_lng_lat(116.40001, 39.92),
    ]);

    let low = index.get_clusters(LngLatBounds::world(), 0).unwrap();
    assert_eq!(low.len(), 1);
    let cluster = low[0].as_cluster().unwrap();
    assert_eq!(cluster.point_count, 2);
    assert_eq!(cluster.point_count_abbreviated(), "2");
    assert_eq!(index.get_cluster_expansion_zoom(cluster.id).unwrap(), 17);

    let high = index.get_clusters(LngLatBounds::world(), 16).unwrap();
    assert_eq!(high.len(), 1);

    let leaves = index.get_clusters(LngLatBounds::world(), 17).unwrap();
    assert_eq!(leaves.len(), 2);
    assert!(leaves.iter().all(|f| !f.is_cluster()));
}

#[test]
fn test_min_points_hides_small_clusters() {
    let mut points = Vec::new();
    for (lng, lat) in [(-100.0, 40.0), (10.0, 50.0), (120.0, -30.0)] {
        points.push(InputPoint::from_lng_lat(lng, lat));
        points.push(InputPoint::from_lng_lat(lng + 0.001, lat));
    }
    for i in 0..5 {
        points.push(InputPoint::from_lng_lat(60.0 + i as f64 * 0.001, 0.0));
    }

    let options = ClusterOptions::default().with_min_points(3);
    let index = ClusterIndex::build(options, points).unwrap();

    let features = index.get_clusters(LngLatBounds::world(), 4).unwrap();
    let clusters: Vec<_> = features.iter().filter(|f| f.is_cluster()).collect();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].point_count(), 5);
    assert_eq!(features.len(), 7);
    assert_eq!(features.iter().map(|f| f.point_count()).sum::<u32>(), 11);
}

#[test]
fn test_reduced_properties_in_geojson_output() {
    let clusterer = ClustererBuilder::new()
        .reducer(SumProperties::new(["population"]))
        .build()
        .unwrap();

    let points = [(2.35, 48.85, 100), (2.36, 48.86, 250), (2.34, 48.84, 50)]
        .into_iter()
        .map(|(lng, lat, population)| {
            let mut properties = JsonObject::new();
            properties.insert("population".to_string(), json!(population));
            properties.insert("name".to_string(), json!("district"));
            InputPoint::new(Point::new(lng, lat), properties)
        })
        .collect();
    clusterer.load_points(points).unwrap();

    let features = clusterer.get_clusters(LngLatBounds::world(), 3).unwrap();
    assert_eq!(features.len(), 1);
    let feature = &features[0];
    assert_eq!(feature.property("cluster"), Some(&json!(true)));
    assert_eq!(feature.property("point_count"), Some(&json!(3)));
    assert_eq!(feature.property("population"), Some(&json!(400.0)));
    assert!(feature.property("name").is_none());

    // Leaves pass their properties through untouched.
    let id: ClusterId = feature
        .property("cluster_id")
        .and_then(|v| v.as_str())
        .unwrap()
        .parse()
        .unwrap();
    let leaves = clusterer.get_leaves(id, 10, 0).unwrap();
    assert_eq!(leaves.len(), 3);
    assert!(leaves.iter().all(|l| l.property("name") == Some(&json!("district"))));
}

#[test]
fn test_tile_output_uses_pixel_coordinates() {
    let clusterer = Clusterer::new(ClusterOptions::default()).unwrap();
    clusterer
        .load_points(vec![
            InputPoint::from_lng_lat(0.0, 0.0),
            InputPoint::from_lng_lat(1.0, -1.0),
        ])
        .unwrap();

    let features = clusterer.get_tile(10, 512, 512).unwrap();
    assert!(!features.is_empty());
    let geometry = features[0].geometry.as_ref().unwrap();
    match &geometry.value {
        geojson::Value::Point(coords) => {
            assert_eq!(coords[0], 0.0);
            assert_eq!(coords[1], 0.0);
        }
        other => panic!("unexpected geometry {:?}", other),
    }

    assert!(matches!(
        clusterer.get_tile(3, 0, 8),
        Err(ClusterError::InvalidTile { .. })
    ));
}

#[test]
fn test_tile_pyramid_conserves_points() {
    let options = ClusterOptions::default().with_tile_buffer(0.0);
    let index = ClusterIndex::build(options, scattered_points(800, 21)).unwrap();

    for z in 0..=3u8 {
        let side = 1u32 << z;
        let mut total = 0;
        for x in 0..side {
            for y in 0..side {
                total += index
                    .get_tile(z, x, y)
                    .unwrap()
                    .iter()
                    .map(|f| f.feature.point_count())
                    .sum::<u32>();
            }
        }
        assert_eq!(total, 800, "zoom {}", z);
    }
}

#[test]
fn test_concurrent_readers_during_reload() {
    let clusterer = Clusterer::new(ClusterOptions::default()).unwrap();
    clusterer.load_points(scattered_points(1_000, 1)).unwrap();

    let barrier = Arc::new(Barrier::new(5));
    let mut handles = Vec::new();

    for _ in 0..4 {
        let clusterer = clusterer.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..20 {
                let snapshot = clusterer.snapshot().unwrap();
                let size = snapshot.len() as u32;
                for zoom in [0, 5, 10] {
                    let total: u32 = snapshot
                        .get_clusters(LngLatBounds::world(), zoom)
                        .unwrap()
                        .iter()
                        .map(|f| f.point_count())
                        .sum();
                    assert_eq!(total, size);
                }
            }
        }));
    }

    barrier.wait();
    let old = clusterer.snapshot().unwrap();
    clusterer.load_points(scattered_points(2_000, 2)).unwrap();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(old.len(), 1_000);
    assert_eq!(clusterer.snapshot().unwrap().len(), 2_000);
}

/// Smoke test: a logged build runs under env_logger. The emitted records are
/// checked in `tests/build_logging.rs`.
#[test]
fn test_build_logging_enabled() {
    let _ = env_logger::builder().is_test(true).try_init();

    let options = ClusterOptions::default().with_log(true).with_max_zoom(6);
    let index = ClusterIndex::build(options, scattered_points(300, 9)).unwrap();
    assert_eq!(index.len(), 300);
}
