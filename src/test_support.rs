//! Shared rupture fixtures for unit tests

use crate::cluster::FaultSubsectionCluster;
use crate::jump::Jump;
use crate::rupture::ClusterRupture;
use std::sync::Arc;

pub(crate) fn cluster(parent: u32, sects: &[u32]) -> Arc<FaultSubsectionCluster> {
    Arc::new(FaultSubsectionCluster::new(parent, sects.iter().copied()).unwrap())
}

/// Jump from the last section of `from` onto the start of `to`
pub(crate) fn jump(
    from: &Arc<FaultSubsectionCluster>,
    to: &Arc<FaultSubsectionCluster>,
    distance: f64,
) -> Jump {
    Jump::new(Arc::clone(from), from.last(), Arc::clone(to), to.start_section(), distance).unwrap()
}

/// Jump from an arbitrary section of `from` onto the start of `to`
pub(crate) fn jump_from(
    from: &Arc<FaultSubsectionCluster>,
    from_section: u32,
    to: &Arc<FaultSubsectionCluster>,
    distance: f64,
) -> Jump {
    Jump::new(Arc::clone(from), from_section, Arc::clone(to), to.start_section(), distance).unwrap()
}

/// Single-strand rupture through `clusters` with the given jump distances
pub(crate) fn strand(
    clusters: &[Arc<FaultSubsectionCluster>],
    distances: &[f64],
) -> ClusterRupture {
    let jumps = clusters
        .windows(2)
        .zip(distances)
        .map(|(pair, d)| jump(&pair[0], &pair[1], *d))
        .collect();
    ClusterRupture::new(clusters.to_vec(), jumps, Vec::new()).unwrap()
}

/// `[A,B,C]` (jumps 1.0 km, 2.0 km) with a splay from the middle of B onto
/// `[D,E]` (attachment 3.0 km, internal 4.0 km)
pub(crate) fn splayed_rupture() -> ClusterRupture {
    splayed_rupture_with(&[1.0, 2.0], 3.0, 4.0)
}

pub(crate) fn splayed_rupture_with(primary: &[f64], attach: f64, inside: f64) -> ClusterRupture {
    let a = cluster(1, &[0, 1, 2]);
    let b = cluster(2, &[3, 4, 5]);
    let c = cluster(3, &[6, 7]);
    let d = cluster(4, &[8, 9]);
    let e = cluster(5, &[10, 11]);

    let splay = strand(&[Arc::clone(&d), e], &[inside]);
    let attachment = jump_from(&b, 4, &d, attach);
    let main = strand(&[a, b, c], primary);
    ClusterRupture::new(
        main.clusters().to_vec(),
        main.internal_jumps().to_vec(),
        vec![(attachment, splay)],
    )
    .unwrap()
}
