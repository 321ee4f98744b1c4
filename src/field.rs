//! Particle field state and per-frame update.
//!
//! The field owns the point cloud, the exclusion prism and the current link
//! set. It is pure CPU state: the viewer advances it once per frame and the
//! GPU layer reads positions out of it for upload. Nothing here touches a
//! window or a device, which is what keeps the whole update loop testable.

use glam::Vec2;

use crate::prism::ExclusionPrism;
use crate::spawn::SpawnContext;
use crate::Vec3;

/// A single drifting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// World position.
    pub position: Vec3,
    /// Per-frame drift velocity.
    pub velocity: Vec3,
}

/// An ephemeral link between two nodes, stored as indices into the node list.
///
/// Links are discarded and rebuilt wholesale on a fixed frame cadence; they
/// carry no state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Index of the lower-numbered endpoint.
    pub a: u32,
    /// Index of the higher-numbered endpoint.
    pub b: u32,
}

/// Static configuration for a particle field.
///
/// The defaults reproduce the stock background: 250 points in a shell pushed
/// back along Z, around a pentagon of circumradius 3.5 extruded to +/-4.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of points to place.
    pub point_count: u32,
    /// Inner radius of the spawn shell.
    pub shell_inner: f32,
    /// Outer radius of the spawn shell.
    pub shell_outer: f32,
    /// Depth offset applied to every spawn sample.
    pub shell_z_offset: f32,
    /// Polygon vertex count of the exclusion prism.
    pub prism_sides: u32,
    /// Circumradius of the prism cross-section.
    pub prism_radius: f32,
    /// Half the prism extrusion height.
    pub prism_half_height: f32,
    /// Prism rotation advance per frame, in radians.
    pub spin_rate: f32,
    /// Maximum distance at which two nodes link up.
    pub link_distance: f32,
    /// Fan-out cap: maximum links per node within one rebuild pass.
    pub link_cap: u32,
    /// Rebuild the link set every this many frames.
    pub rebuild_interval: u64,
    /// Half-extent of the bounding box on X and Y.
    pub bounds_xy: f32,
    /// Near clamp of the bounding box on Z.
    pub bounds_z_max: f32,
    /// Far clamp of the bounding box on Z.
    pub bounds_z_min: f32,
    /// Spawn velocity span in the XY plane.
    pub velocity_xy: f32,
    /// Spawn velocity span along Z.
    pub velocity_z: f32,
    /// Sinusoidal drift amplitude along Z.
    pub wave_z: f32,
    /// Sinusoidal drift amplitude in the XY plane.
    pub wave_xy: f32,
    /// Clearance added to the prism radius when a node is pushed back out.
    pub push_margin: f32,
    /// Placement attempts per point before it is dropped.
    pub place_attempts: u32,
    /// Seed for all spawn randomness.
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            point_count: 250,
            shell_inner: 3.0,
            shell_outer: 11.0,
            shell_z_offset: -3.0,
            prism_sides: 5,
            prism_radius: 3.5,
            prism_half_height: 4.0,
            spin_rate: 0.002,
            link_distance: 3.0,
            link_cap: 6,
            rebuild_interval: 4,
            bounds_xy: 12.0,
            bounds_z_max: 3.0,
            bounds_z_min: -12.0,
            velocity_xy: 0.0015,
            velocity_z: 0.002,
            wave_z: 0.008,
            wave_xy: 0.002,
            push_margin: 0.5,
            place_attempts: 50,
            seed: 0x1CEB00DA,
        }
    }
}

impl FieldConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of points.
    pub fn with_point_count(mut self, count: u32) -> Self {
        self.point_count = count;
        self
    }

    /// Set the exclusion prism shape.
    pub fn with_prism(mut self, sides: u32, radius: f32, half_height: f32) -> Self {
        self.prism_sides = sides;
        self.prism_radius = radius;
        self.prism_half_height = half_height;
        self
    }

    /// Set the link distance threshold.
    pub fn with_link_distance(mut self, distance: f32) -> Self {
        self.link_distance = distance;
        self
    }

    /// Set the per-node fan-out cap.
    pub fn with_link_cap(mut self, cap: u32) -> Self {
        self.link_cap = cap;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The animated point cloud and its link set.
pub struct ParticleField {
    config: FieldConfig,
    prism: ExclusionPrism,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    frame: u64,
}

impl ParticleField {
    /// Place the field: rejection-sample every point against the prism.
    ///
    /// A point that fails all of its placement attempts is dropped silently;
    /// the field just comes up slightly sparser than requested.
    pub fn new(config: &FieldConfig) -> Self {
        let prism = ExclusionPrism::new(
            config.prism_sides,
            config.prism_radius,
            config.prism_half_height,
        );

        let mut nodes = Vec::with_capacity(config.point_count as usize);
        for index in 0..config.point_count {
            let mut ctx = SpawnContext::new(config.seed, index);
            let position = (0..config.place_attempts)
                .map(|_| {
                    ctx.random_in_shell(
                        config.shell_inner,
                        config.shell_outer,
                        config.shell_z_offset,
                    )
                })
                .find(|candidate| !prism.contains(*candidate));
            let Some(position) = position else { continue };

            nodes.push(Node {
                position,
                velocity: ctx.random_velocity(config.velocity_xy, config.velocity_z),
            });
        }

        let mut field = Self {
            config: config.clone(),
            prism,
            nodes,
            connections: Vec::new(),
            frame: 0,
        };
        field.rebuild_connections();
        field
    }

    /// Advance the field by one frame: spin the prism, integrate every node,
    /// resolve prism and bounding-box collisions, and rebuild the link set on
    /// its cadence.
    pub fn advance(&mut self) {
        self.frame += 1;
        self.prism.spin(self.config.spin_rate);

        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            node.position += node.velocity;

            let phase = self.frame as f32 * 0.008 + index as f32 * 0.05;
            node.position.z += phase.sin() * self.config.wave_z;
            node.position.x += (phase * 0.5).cos() * self.config.wave_xy;
            node.position.y += (phase * 0.5).sin() * self.config.wave_xy;

            if self.prism.contains(node.position) {
                // Push back out in the XY plane. A full 3D radial push can
                // land inside again when the direction is mostly along Z, so
                // the depth coordinate is left alone and the planar distance
                // is set past the circumradius, which is outside the polygon
                // at any rotation.
                let radial = Vec2::new(node.position.x, node.position.y);
                let dir = if radial.length_squared() > 1e-12 {
                    radial.normalize()
                } else {
                    Vec2::X
                };
                let pushed = dir * (self.config.prism_radius + self.config.push_margin);
                node.position.x = pushed.x;
                node.position.y = pushed.y;
                node.velocity *= -1.2;
            }

            let bounds = self.config.bounds_xy;
            if node.position.x.abs() > bounds {
                node.position.x = node.position.x.clamp(-bounds, bounds);
                node.velocity.x = -node.velocity.x;
            }
            if node.position.y.abs() > bounds {
                node.position.y = node.position.y.clamp(-bounds, bounds);
                node.velocity.y = -node.velocity.y;
            }
            if node.position.z > self.config.bounds_z_max {
                node.position.z = self.config.bounds_z_max;
                node.velocity.z = -node.velocity.z;
            }
            if node.position.z < self.config.bounds_z_min {
                node.position.z = self.config.bounds_z_min;
                node.velocity.z = -node.velocity.z;
            }
        }

        if self.frame % self.config.rebuild_interval == 0 {
            self.rebuild_connections();
        }
    }

    /// Discard the link set and rebuild it from scratch.
    ///
    /// Pairs are scanned in index order and accepted greedily: both endpoints
    /// outside the prism, distance under the threshold, segment clear of the
    /// prism, and neither endpoint at its fan-out cap. Greedy in index order
    /// is not globally optimal and is not meant to be.
    pub fn rebuild_connections(&mut self) {
        self.connections.clear();
        let mut degree = vec![0u32; self.nodes.len()];

        for i in 0..self.nodes.len() {
            if self.prism.contains(self.nodes[i].position) {
                continue;
            }
            for j in (i + 1)..self.nodes.len() {
                if degree[i] >= self.config.link_cap {
                    break;
                }
                if degree[j] >= self.config.link_cap {
                    continue;
                }
                if self.prism.contains(self.nodes[j].position) {
                    continue;
                }

                let a = self.nodes[i].position;
                let b = self.nodes[j].position;
                if a.distance(b) >= self.config.link_distance {
                    continue;
                }
                if self.prism.segment_intersects(a, b) {
                    continue;
                }

                self.connections.push(Connection {
                    a: i as u32,
                    b: j as u32,
                });
                degree[i] += 1;
                degree[j] += 1;
            }
        }
    }

    /// The live nodes. May be shorter than the configured count when
    /// placement attempts ran out.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The current link set.
    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The exclusion prism, at its live rotation.
    #[inline]
    pub fn prism(&self) -> &ExclusionPrism {
        &self.prism
    }

    /// Frames advanced so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The configuration the field was built from.
    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_initial_point_inside_prism() {
        let field = ParticleField::new(&FieldConfig::default());
        for node in field.nodes() {
            assert!(!field.prism().contains(node.position));
        }
    }

    #[test]
    fn test_impossible_placement_degrades_to_empty() {
        // A prism that swallows the whole spawn shell: every attempt fails
        // and every point is dropped, without an error.
        let config = FieldConfig::default()
            .with_point_count(20)
            .with_prism(5, 50.0, 50.0);
        let field = ParticleField::new(&config);
        assert!(field.nodes().is_empty());
        assert!(field.connections().is_empty());
    }

    #[test]
    fn test_advance_is_deterministic() {
        let config = FieldConfig::default().with_seed(99);
        let mut a = ParticleField::new(&config);
        let mut b = ParticleField::new(&config);
        for _ in 0..100 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.nodes().len(), b.nodes().len());
        for (na, nb) in a.nodes().iter().zip(b.nodes()) {
            assert_eq!(na.position, nb.position);
            assert_eq!(na.velocity, nb.velocity);
        }
        assert_eq!(a.connections(), b.connections());
    }

    #[test]
    fn test_reflection_commits_outside_the_prism() {
        let mut field = ParticleField::new(&FieldConfig::default());
        // Drop a node into the middle of the prism; the next advance must
        // commit it outside again.
        field.node_mut(0).position = Vec3::new(0.1, 0.1, 0.0);
        field.node_mut(0).velocity = Vec3::ZERO;
        field.advance();
        assert!(!field.prism().contains(field.nodes()[0].position));
    }

    #[test]
    fn test_no_node_inside_prism_after_any_frame() {
        let mut field = ParticleField::new(&FieldConfig::default());
        for _ in 0..200 {
            field.advance();
            for node in field.nodes() {
                assert!(!field.prism().contains(node.position));
            }
        }
    }

    #[test]
    fn test_bounding_box_holds_over_time() {
        let config = FieldConfig::default();
        let mut field = ParticleField::new(&config);
        for _ in 0..500 {
            field.advance();
        }
        for node in field.nodes() {
            assert!(node.position.x.abs() <= config.bounds_xy);
            assert!(node.position.y.abs() <= config.bounds_xy);
            assert!(node.position.z <= config.bounds_z_max);
            assert!(node.position.z >= config.bounds_z_min);
        }
    }

    #[test]
    fn test_rebuilt_links_satisfy_every_constraint() {
        let mut field = ParticleField::new(&FieldConfig::default());
        for _ in 0..8 {
            field.advance();
        }
        let config = field.config().clone();
        for conn in field.connections() {
            let a = field.nodes()[conn.a as usize].position;
            let b = field.nodes()[conn.b as usize].position;
            assert!(!field.prism().contains(a));
            assert!(!field.prism().contains(b));
            assert!(a.distance(b) < config.link_distance);
            assert!(!field.prism().segment_intersects(a, b));
        }
    }

    #[test]
    fn test_fan_out_cap_binds_both_endpoints() {
        let config = FieldConfig::default().with_link_cap(3);
        let mut field = ParticleField::new(&config);
        for _ in 0..8 {
            field.advance();
        }
        let mut degree = vec![0u32; field.nodes().len()];
        for conn in field.connections() {
            degree[conn.a as usize] += 1;
            degree[conn.b as usize] += 1;
        }
        assert!(degree.iter().all(|&d| d <= 3));
    }

    #[test]
    fn test_connections_are_rebuilt_not_accumulated() {
        let mut field = ParticleField::new(&FieldConfig::default());
        field.advance();
        let first = field.connections().len();
        for _ in 0..40 {
            field.advance();
        }
        // A stale set would only ever grow; a rebuilt set stays in the same
        // ballpark as the first pass.
        assert!(field.connections().len() <= first.max(1) * 4);
    }
}
