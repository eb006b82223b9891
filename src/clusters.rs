//! Map pin clustering.
//!
//! Groups located memories into clusters so the map renders one marker per
//! cluster instead of one per memory. Clustering is a single greedy pass:
//! the first unassigned located memory seeds a cluster at its own
//! coordinates, then every other unassigned located memory within
//! `radius_km` of the seed joins it. Membership is decided against the seed
//! only, so clusters are fixed-radius balls, not chains: a memory close to
//! another member but outside the seed radius starts its own cluster.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::Memory;

/// Mean Earth radius in kilometres, for the haversine distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius used by the map view when the request does not override it.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 1.0;

/// A group of memories whose locations lie within one seed radius.
///
/// `lat`/`lng` are the seed memory's coordinates, not a centroid; the pin
/// sits wherever the first-encountered member was.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub memories: Vec<Memory>,
}

/// Great-circle distance between two WGS84 points, in kilometres.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Partition located memories into clusters.
///
/// Memories without a location are skipped entirely. Seeds are picked and
/// members scanned in input order, so the output is deterministic for a
/// given input ordering. Malformed coordinates (NaN) never satisfy the
/// radius test and fall out as singleton clusters.
#[must_use]
pub fn cluster_memories(memories: &[Memory], radius_km: f64) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut assigned: HashSet<&str> = HashSet::new();

    for memory in memories {
        if assigned.contains(memory.id.as_str()) {
            continue;
        }
        let Some(seed) = &memory.location else {
            continue;
        };

        assigned.insert(memory.id.as_str());
        let mut cluster = Cluster {
            id: format!("cluster-{}", memory.id),
            lat: seed.lat,
            lng: seed.lng,
            memories: vec![memory.clone()],
        };

        // Sweep the whole list; membership is measured against the seed
        // coordinates, never against other members.
        for other in memories {
            if other.id == memory.id || assigned.contains(other.id.as_str()) {
                continue;
            }
            let Some(location) = &other.location else {
                continue;
            };
            let distance = haversine_km(seed.lat, seed.lng, location.lat, location.lng);
            if distance <= radius_km {
                assigned.insert(other.id.as_str());
                cluster.memories.push(other.clone());
            }
        }

        clusters.push(cluster);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::Location;

    fn located(id: &str, lat: f64, lng: f64) -> Memory {
        Memory {
            id: id.to_string(),
            date: "2024-07-15".to_string(),
            title: format!("memory {id}"),
            caption: String::new(),
            notes: Vec::new(),
            image_urls: Vec::new(),
            location: Some(Location {
                address: String::new(),
                lat,
                lng,
                place_id: None,
                place_name: None,
            }),
            activity_tags: Vec::new(),
            couple_id: "c1".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn unlocated(id: &str) -> Memory {
        let mut memory = located(id, 0.0, 0.0);
        memory.location = None;
        memory
    }

    fn member_ids(cluster: &Cluster) -> Vec<&str> {
        cluster.memories.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_no_clusters() {
        assert!(cluster_memories(&[], 1.0).is_empty());
    }

    #[test]
    fn test_every_located_memory_lands_in_exactly_one_cluster() {
        let memories = vec![
            located("a", 19.0760, 72.8777),
            unlocated("b"),
            located("c", 19.0761, 72.8778),
            located("d", 19.2000, 72.9000),
        ];

        let clusters = cluster_memories(&memories, 1.0);

        let mut seen: Vec<&str> = clusters.iter().flat_map(member_ids).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_nearby_pair_merges_and_distant_point_stays_alone() {
        // Two points ~15m apart in Mumbai plus one several km away.
        let memories = vec![
            located("a", 19.0760, 72.8777),
            located("b", 19.0761, 72.8778),
            located("c", 19.2000, 72.9000),
        ];

        let clusters = cluster_memories(&memories, 1.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, "cluster-a");
        assert_eq!(member_ids(&clusters[0]), vec!["a", "b"]);
        assert_eq!(clusters[1].id, "cluster-c");
        assert_eq!(member_ids(&clusters[1]), vec!["c"]);
    }

    #[test]
    fn test_cluster_pin_uses_seed_coordinates() {
        let memories = vec![located("a", 19.0760, 72.8777), located("b", 19.0761, 72.8778)];

        let clusters = cluster_memories(&memories, 1.0);

        assert_eq!(clusters[0].lat, 19.0760);
        assert_eq!(clusters[0].lng, 72.8777);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let a = located("a", 0.0, 0.0);
        let b = located("b", 0.009, 0.0);
        let distance = haversine_km(0.0, 0.0, 0.009, 0.0);

        let merged = cluster_memories(&[a.clone(), b.clone()], distance);
        assert_eq!(merged.len(), 1);

        let split = cluster_memories(&[a, b], distance * 0.999);
        assert_eq!(split.len(), 2);
    }

    #[test]
    fn test_membership_is_seed_anchored_not_chained() {
        // b is within 1km of both a and c, but c is ~1.8km from the seed a.
        let memories = vec![
            located("a", 0.0, 0.0),
            located("b", 0.0081, 0.0),
            located("c", 0.0162, 0.0),
        ];

        let clusters = cluster_memories(&memories, 1.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(member_ids(&clusters[0]), vec!["a", "b"]);
        assert_eq!(member_ids(&clusters[1]), vec!["c"]);
    }

    #[test]
    fn test_output_is_deterministic_for_a_given_order() {
        let memories = vec![
            located("a", 19.0760, 72.8777),
            located("b", 19.0761, 72.8778),
            located("c", 19.2000, 72.9000),
            located("d", 18.9220, 72.8347),
        ];

        let first = cluster_memories(&memories, 1.0);
        let second = cluster_memories(&memories, 1.0);

        let shape =
            |cs: &[Cluster]| cs.iter().map(|c| (c.id.clone(), c.memories.len())).collect::<Vec<_>>();
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_seed_order_changes_grouping() {
        // a--b are 0.9km apart, b--c are 0.9km apart. Seeding from a pulls
        // in b only; seeding from b pulls in both neighbours.
        let a = located("a", 0.0, 0.0);
        let b = located("b", 0.0081, 0.0);
        let c = located("c", 0.0162, 0.0);

        let from_a = cluster_memories(&[a.clone(), b.clone(), c.clone()], 1.0);
        assert_eq!(from_a.len(), 2);

        let from_b = cluster_memories(&[b, a, c], 1.0);
        assert_eq!(from_b.len(), 1);
        assert_eq!(member_ids(&from_b[0]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_nan_coordinates_become_singletons() {
        let memories = vec![
            located("a", f64::NAN, 72.8777),
            located("b", 19.0760, 72.8777),
            located("c", 19.0761, 72.8778),
        ];

        let clusters = cluster_memories(&memories, 1.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(member_ids(&clusters[0]), vec!["a"]);
        assert_eq!(member_ids(&clusters[1]), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_radius_merges_only_coincident_points() {
        let memories = vec![
            located("a", 19.0760, 72.8777),
            located("b", 19.0760, 72.8777),
            located("c", 19.0761, 72.8778),
        ];

        let clusters = cluster_memories(&memories, 0.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(member_ids(&clusters[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Mumbai CST to Gateway of India, roughly 2km.
        let d = haversine_km(18.9398, 72.8355, 18.9220, 72.8347);
        assert!((1.9..2.1).contains(&d), "unexpected distance {d}");
    }
}
