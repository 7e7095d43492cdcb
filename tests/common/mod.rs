#![allow(dead_code)]

use colocate::{
    samples::{Segment, TrajectorySample},
    trajectories::TrajectoryStore,
};

/// Header block of a Geolife PLT file.
pub const PLT_HEADER: &str = "Geolife trajectory
WGS 84
Altitude is in Feet
Reserved 3
0,2,255,My Track,0,0,2,8421376
0
";

/// One single-sample segment per `(entity, lat, lon, t)`.
pub fn store_from_points(points: &[(&str, f64, f64, f64)]) -> TrajectoryStore {
    let mut store = TrajectoryStore::new();
    for &(entity, lat, lon, t) in points {
        store.insert_segment(
            entity,
            Segment::new("p", vec![TrajectorySample::new(lat, lon, 0.0, t)]),
        );
    }
    store
}

/// `n` entities walking north side by side, `spacing_deg` of longitude apart, one fix every
/// `step_s` seconds, split into segments of `per_segment` samples.
pub fn walking_crowd(
    n: usize,
    samples: usize,
    per_segment: usize,
    spacing_deg: f64,
    step_s: f64,
) -> TrajectoryStore {
    let mut store = TrajectoryStore::new();
    for i in 0..n {
        let entity = format!("{i:03}");
        let all: Vec<TrajectorySample> = (0..samples)
            .map(|k| {
                TrajectorySample::new(
                    39.9 + 0.0002 * k as f64,
                    116.4 + spacing_deg * i as f64,
                    50.0,
                    1_224_730_384.0 + step_s * k as f64 + i as f64,
                )
            })
            .collect();
        for (s, chunk) in all.chunks(per_segment.max(1)).enumerate() {
            store.insert_segment(&entity, Segment::new(format!("{s}.plt"), chunk.to_vec()));
        }
    }
    store
}

/// A PLT file body for the given `(lat, lon, serial_days)` rows.
pub fn plt_file(rows: &[(f64, f64, f64)]) -> String {
    let mut out = PLT_HEADER.to_string();
    for (lat, lon, days) in rows {
        out.push_str(&format!("{lat},{lon},0,492,{days},2008-10-23,02:53:04\n"));
    }
    out
}
