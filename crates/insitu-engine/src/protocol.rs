//! The documents handed to the runtime: session options, the per-step
//! mesh description, and the two action lists.
//!
//! The mesh document describes a uniform coordinate set (point counts,
//! origin, spacing), a uniform topology over it, and two scalar fields
//! whose values reference the grid buffers in place:
//!
//! | field          | association | buffer |
//! |----------------|-------------|--------|
//! | `nodal_noise`  | `vertex`    | points |
//! | `zonal_noise`  | `element`   | cells  |
//!
//! Only the field values are referenced. `state/time` and the other
//! `state/*` entries are copied into a fresh document on every publish,
//! which a runtime sees the same as a scalar updated in place.

use insitu_core::{Axis, Cycle, DomainId};
use insitu_grid::{Dimensionality, FieldGrid};

use crate::document::Node;

/// Name of the point-centred field.
pub const NODAL_FIELD: &str = "nodal_noise";
/// Name of the cell-centred field.
pub const ZONAL_FIELD: &str = "zonal_noise";

const DIM_KEYS: [&str; 3] = ["i", "j", "k"];
const SPACING_KEYS: [&str; 3] = ["dx", "dy", "dz"];

/// Scalar state published alongside the mesh each step.
#[derive(Clone, Copy, Debug)]
pub struct PublishState<'s> {
    /// Simulation time after this step's advance.
    pub time: f64,
    /// Number of completed steps.
    pub cycle: Cycle,
    /// Domain being published.
    pub domain: DomainId,
    /// Free-text description.
    pub info: &'s str,
}

/// Options passed to [`Runtime::open`](crate::Runtime::open).
pub fn session_options(runtime_type: &str) -> Node<'static> {
    let mut options = Node::new();
    options.set("runtime/type", runtime_type);
    options
}

/// Build the mesh document for one publish.
///
/// Borrows `grid` mutably for as long as the document lives: the field
/// values are the grid's own buffers.
pub fn mesh_document<'g>(grid: &'g mut FieldGrid, state: &PublishState<'_>) -> Node<'g> {
    let axes = match grid.dimensionality() {
        Dimensionality::Planar => &Axis::ALL[..2],
        Dimensionality::Volume => &Axis::ALL[..],
    };
    let point_dims = grid.point_dims();
    let origin = grid.origin();
    let spacing = grid.spacing();

    let mut mesh = Node::new();
    mesh.set("state/time", state.time);
    mesh.set("state/cycle", i64::try_from(state.cycle.0).unwrap_or(i64::MAX));
    mesh.set("state/domain_id", state.domain.0);
    mesh.set("state/info", state.info);

    mesh.set("coordsets/coords/type", "uniform");
    for &axis in axes {
        let i = axis.index();
        mesh.set(&format!("coordsets/coords/dims/{}", DIM_KEYS[i]), point_dims[i]);
        mesh.set(&format!("coordsets/coords/origin/{}", axis.name()), origin[i]);
        mesh.set(&format!("coordsets/coords/spacing/{}", SPACING_KEYS[i]), spacing[i]);
    }

    mesh.set("topologies/mesh/type", "uniform");
    mesh.set("topologies/mesh/coordset", "coords");

    let (points, cells) = grid.expose();
    for (name, values) in [(NODAL_FIELD, points), (ZONAL_FIELD, cells)] {
        let field = mesh.entry(&format!("fields/{name}"));
        field.set("association", values.association().as_str());
        field.set("type", "scalar");
        field.set("topology", "mesh");
        field.set("values", values);
    }
    mesh
}

/// The per-step action list: declare one pseudocolor scene over
/// [`NODAL_FIELD`], then execute.
pub fn scene_actions() -> Node<'static> {
    let mut actions = Node::new();

    let add_scenes = actions.append();
    add_scenes.set("action", "add_scenes");
    let plot = add_scenes.entry("scenes/scene1/plots/plt1");
    plot.set("type", "pseudocolor");
    plot.set("params/field", NODAL_FIELD);

    actions.append().set("action", "execute");
    actions
}

/// The action list that clears per-step filter state.
pub fn reset_actions() -> Node<'static> {
    let mut reset = Node::new();
    reset.append().set("action", "reset");
    reset
}

/// Names of the actions in a list, in order.
pub fn action_names<'n>(actions: &'n Node<'_>) -> Vec<&'n str> {
    actions
        .items()
        .iter()
        .filter_map(|a| a.get("action").and_then(Node::as_text))
        .collect()
}
