//! Reference choreographies written against the vizij-choreo script surface.

use vizij_choreo_core::{math, NodeId, Result, SceneGraph, SceneScript, Vec3};

pub mod morph_t;
pub mod pca;

pub use morph_t::MorphTScene;
pub use pca::PhotoconductiveAntennaScene;

/// Every bundled scene, in listing order.
pub fn all_scripts() -> Vec<Box<dyn SceneScript>> {
    vec![Box::new(MorphTScene), Box::new(PhotoconductiveAntennaScene)]
}

pub fn find_script(name: &str) -> Option<Box<dyn SceneScript>> {
    all_scripts().into_iter().find(|s| s.name() == name)
}

/// Position a `move_to` command must reach so that the node's bounds end up
/// centered on `point` (a node's origin is not always its center).
pub(crate) fn centered_destination(graph: &SceneGraph, id: NodeId, point: Vec3) -> Result<Vec3> {
    let pos = graph.world_transform(id)?.position;
    let center = graph
        .world_bounds(id)?
        .map(|b| b.center())
        .unwrap_or(pos);
    Ok(math::add(point, math::sub(pos, center)))
}
