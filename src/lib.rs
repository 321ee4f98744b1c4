//! # plexfield
//!
//! Animated "plexus" background: a drifting 3D point cloud with
//! proximity links, kept visually clear of a rotating pentagonal prism at the
//! center of the scene, drawn full-window with a mouse-parallax camera.
//!
//! ## Quick Start
//!
//! ```ignore
//! use plexfield::{FieldConfig, Viewer};
//!
//! fn main() {
//!     Viewer::new()
//!         .with_config(FieldConfig::new().with_point_count(250))
//!         .run()
//!         .unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`ParticleField`] owns the point cloud, the exclusion prism and the link
//! set, and is pure CPU state: `new` places the points (rejection-sampled
//! against the prism), `advance` integrates one frame and rebuilds links on a
//! fixed cadence. Rendering is a side effect layered on top by [`Viewer`];
//! the field can be driven and inspected headlessly.
//!
//! ### The exclusion prism
//!
//! [`ExclusionPrism`] is the rotating pentagon extrusion the points avoid.
//! Placement, per-frame reflection and link validity all share its hit tests,
//! and its rendered wireframe uses the same rotation angle, so the visible
//! shape and the collision shape cannot drift apart.
//!
//! ### Links
//!
//! Links are ephemeral: every few frames the set is discarded and rebuilt
//! from scratch from the current point positions, under a distance threshold,
//! a per-point fan-out cap and a segment-clearance test against the prism.
//!
//! ### Determinism
//!
//! All randomness flows from [`FieldConfig::seed`] through per-point RNG
//! streams; a field rebuilt from the same configuration and advanced the same
//! number of frames reproduces its positions exactly.

pub mod camera;
mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod mesh;
pub mod prism;
pub mod spawn;
pub mod star;
pub mod time;
mod viewer;

pub use camera::ParallaxCamera;
pub use error::{GpuError, ViewerError};
pub use field::{Connection, FieldConfig, Node, ParticleField};
pub use glam::{Vec2, Vec3};
pub use prism::ExclusionPrism;
pub use viewer::Viewer;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::camera::ParallaxCamera;
    pub use crate::field::{Connection, FieldConfig, Node, ParticleField};
    pub use crate::input::Pointer;
    pub use crate::mesh::WireLines;
    pub use crate::prism::ExclusionPrism;
    pub use crate::spawn::SpawnContext;
    pub use crate::star::Starfield;
    pub use crate::time::FrameClock;
    pub use crate::viewer::Viewer;
    pub use crate::{Vec2, Vec3};
}
