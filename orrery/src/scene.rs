//! Scene construction from the body table, and per-frame animation
//!
//! Each planet hangs off an invisible pivot at the origin. Spinning the pivot
//! carries the planet (and its ring) around the sun; spinning the planet mesh
//! turns it about its own axis. Moons get their own pivot parented to the
//! planet mesh, so they orbit the planet's centre and also follow its spin.

use glam::{Quat, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::FRAC_PI_2;

use crate::geometry::{RING_SEGMENTS, SATELLITE_SEGMENTS};
use crate::scene_graph::{NodeId, SceneGraph};
use crate::solar_system::{PlanetSpec, Segments, SystemSpec};

/// How a mesh responds to light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    /// Texture colour as-is
    Basic,
    /// Lit by the ambient and point lights
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32, segments: Segments },
    Ring { inner_radius: f32, outer_radius: f32, theta_segments: u32 },
}

/// A mesh attached to a scene node
#[derive(Debug, Clone)]
pub struct Renderable {
    pub node: NodeId,
    pub geometry: Geometry,
    pub texture: &'static str,
    pub tint: [f32; 3],
    pub material: Material,
    pub double_sided: bool,
}

#[derive(Debug, Clone)]
pub struct SatelliteNodes {
    pub name: &'static str,
    pub pivot: NodeId,
    pub mesh: NodeId,
}

#[derive(Debug, Clone)]
pub struct PlanetNodes {
    pub name: &'static str,
    pub pivot: NodeId,
    pub mesh: NodeId,
    pub ring: Option<NodeId>,
    pub satellites: Vec<SatelliteNodes>,
    /// Starting rotation of the pivot about Y, in radians
    pub initial_phase: f32,
}

/// A node turned about its local Y axis every frame
#[derive(Debug, Clone, Copy)]
struct Spin {
    node: NodeId,
    rate: f32,
}

pub struct Scene {
    pub graph: SceneGraph,
    pub renderables: Vec<Renderable>,
    pub sun: NodeId,
    pub planets: Vec<PlanetNodes>,
    spins: Vec<Spin>,
    frames: u64,
}

/// Random source for the initial orbital phases
pub fn phase_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Scene {
    pub fn build<R: Rng>(spec: &SystemSpec, rng: &mut R) -> Self {
        let mut graph = SceneGraph::new();
        let sun = graph.add_root("Sun");

        let mut scene = Self {
            graph,
            renderables: Vec::with_capacity(spec.mesh_count()),
            sun,
            planets: Vec::with_capacity(spec.planets.len()),
            spins: Vec::new(),
            frames: 0,
        };

        scene.renderables.push(Renderable {
            node: sun,
            geometry: Geometry::Sphere {
                radius: spec.sun.size,
                segments: spec.sun.segments,
            },
            texture: spec.sun.texture,
            tint: spec.sun.tint,
            material: Material::Basic,
            double_sided: false,
        });

        for planet in spec.planets {
            // Whole number of radians, not degrees
            let phase = rng.gen_range(0u32..360) as f32;
            let nodes = scene.add_planet(planet, phase);
            scene.planets.push(nodes);
        }

        log::debug!(
            "Built scene: {} nodes, {} meshes, {} animated",
            scene.graph.len(),
            scene.renderables.len(),
            scene.spins.len()
        );
        scene
    }

    fn add_planet(&mut self, planet: &PlanetSpec, phase: f32) -> PlanetNodes {
        let pivot = self.graph.add_root(&format!("{} orbit", planet.name));

        // Ring goes on the pivot so it orbits with the planet but does not spin
        let ring = planet.ring.map(|ring| {
            let node = self.graph.add_child(pivot, &format!("{} ring", planet.name));
            self.graph.set_translation(node, Vec3::new(planet.position, 0.0, 0.0));
            self.graph.set_rotation(node, Quat::from_rotation_x(-FRAC_PI_2));
            self.renderables.push(Renderable {
                node,
                geometry: Geometry::Ring {
                    inner_radius: ring.inner_radius,
                    outer_radius: ring.outer_radius,
                    theta_segments: RING_SEGMENTS,
                },
                texture: ring.texture,
                tint: ring.tint,
                material: Material::Basic,
                double_sided: true,
            });
            node
        });

        let mesh = self.graph.add_child(pivot, planet.name);
        self.graph.set_translation(mesh, Vec3::new(planet.position, 0.0, 0.0));
        self.renderables.push(Renderable {
            node: mesh,
            geometry: Geometry::Sphere {
                radius: planet.size,
                segments: planet.segments,
            },
            texture: planet.texture,
            tint: planet.tint,
            material: Material::Standard,
            double_sided: false,
        });

        self.graph.rotate_y(pivot, phase);
        self.spins.push(Spin {
            node: mesh,
            rate: planet.rotation_own_orbit,
        });
        self.spins.push(Spin {
            node: pivot,
            rate: planet.rotation_around_sun,
        });

        let satellites = planet
            .natural_satellites
            .iter()
            .map(|sat| {
                let sat_pivot = self.graph.add_child(mesh, &format!("{} orbit", sat.name));
                let sat_mesh = self.graph.add_child(sat_pivot, sat.name);
                self.graph
                    .set_translation(sat_mesh, Vec3::new(planet.size + 3.0 * sat.size, 0.0, 0.0));
                self.renderables.push(Renderable {
                    node: sat_mesh,
                    geometry: Geometry::Sphere {
                        radius: sat.size,
                        segments: Segments::square(SATELLITE_SEGMENTS),
                    },
                    texture: sat.texture,
                    tint: sat.tint,
                    material: Material::Standard,
                    double_sided: false,
                });
                self.spins.push(Spin {
                    node: sat_pivot,
                    rate: sat.rotation_around_parent,
                });
                SatelliteNodes {
                    name: sat.name,
                    pivot: sat_pivot,
                    mesh: sat_mesh,
                }
            })
            .collect();

        PlanetNodes {
            name: planet.name,
            pivot,
            mesh,
            ring,
            satellites,
            initial_phase: phase,
        }
    }

    /// Advance every rotation by one frame's increment
    pub fn tick(&mut self, time_scale: f32) {
        for spin in &self.spins {
            self.graph.rotate_y(spin.node, spin.rate * time_scale);
        }
        self.frames += 1;
    }

    /// Frames ticked since the scene was built
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn planet(&self, name: &str) -> Option<&PlanetNodes> {
        self.planets.iter().find(|p| p.name == name)
    }
}

/// Slowest and fastest multiplier the animation accepts
pub const MIN_TIME_SCALE: f32 = 1.0 / 1024.0;
pub const MAX_TIME_SCALE: f32 = 1024.0;

/// Pause flag and speed multiplier that drive `Scene::tick`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    paused: bool,
    time_scale: f32,
}

impl Animation {
    pub fn new(time_scale: f32, paused: bool) -> Self {
        Self {
            paused,
            time_scale: clamp_time_scale(time_scale),
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Double the time scale, up to `MAX_TIME_SCALE`
    pub fn speed_up(&mut self) -> f32 {
        self.time_scale = clamp_time_scale(self.time_scale * 2.0);
        self.time_scale
    }

    /// Halve the time scale, down to `MIN_TIME_SCALE`
    pub fn slow_down(&mut self) -> f32 {
        self.time_scale = clamp_time_scale(self.time_scale / 2.0);
        self.time_scale
    }

    /// Tick the scene once unless paused. Returns whether anything moved.
    pub fn update(&self, scene: &mut Scene) -> bool {
        if self.paused {
            return false;
        }
        scene.tick(self.time_scale);
        true
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

fn clamp_time_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        1.0
    } else {
        scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar_system::SOLAR_SYSTEM;

    fn seeded_scene(seed: u64) -> Scene {
        Scene::build(&SOLAR_SYSTEM, &mut phase_rng(Some(seed)))
    }

    #[test]
    fn test_scene_structure() {
        let scene = seeded_scene(1);
        // sun + 9 pivots + 9 planets + 2 rings + moon pivot + moon
        assert_eq!(scene.graph.len(), 23);
        assert_eq!(scene.renderables.len(), SOLAR_SYSTEM.mesh_count());
        assert_eq!(scene.planets.len(), 9);

        assert_eq!(scene.graph.node(scene.sun).parent, None);
        assert_eq!(scene.renderables[0].material, Material::Basic);

        for planet in &scene.planets {
            assert_eq!(scene.graph.node(planet.pivot).parent, None);
            assert_eq!(scene.graph.node(planet.mesh).parent, Some(planet.pivot));
            if let Some(ring) = planet.ring {
                assert_eq!(scene.graph.node(ring).parent, Some(planet.pivot));
            }
        }

        let earth = scene.planet("Earth").unwrap();
        let moon = &earth.satellites[0];
        assert_eq!(moon.name, "Moon");
        assert_eq!(scene.graph.node(moon.pivot).parent, Some(earth.mesh));
        assert_eq!(scene.graph.node(moon.mesh).parent, Some(moon.pivot));

        let ringed: Vec<_> = scene.planets.iter().filter(|p| p.ring.is_some()).map(|p| p.name).collect();
        assert_eq!(ringed, ["Saturn", "Uranus"]);
    }

    #[test]
    fn test_ring_material_and_orientation() {
        let scene = seeded_scene(2);
        let saturn = scene.planet("Saturn").unwrap();
        let ring_node = saturn.ring.unwrap();
        let ring = scene.renderables.iter().find(|r| r.node == ring_node).unwrap();

        assert!(ring.double_sided);
        assert_eq!(ring.material, Material::Basic);
        assert_eq!(
            ring.geometry,
            Geometry::Ring {
                inner_radius: 11.0,
                outer_radius: 20.0,
                theta_segments: RING_SEGMENTS
            }
        );

        // Ring normal (+Z in ring space) ends up pointing along world +Y
        let world = scene.graph.world_matrices()[ring_node.index()];
        let normal = world.transform_vector3(Vec3::Z).normalize();
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_phases_are_whole_and_seeded() {
        let a = seeded_scene(99);
        let b = seeded_scene(99);
        for (pa, pb) in a.planets.iter().zip(&b.planets) {
            assert_eq!(pa.initial_phase, pb.initial_phase);
            assert_eq!(pa.initial_phase.fract(), 0.0);
            assert!((0.0..360.0).contains(&pa.initial_phase));
        }
    }

    #[test]
    fn test_planets_start_at_their_orbit() {
        let scene = seeded_scene(3);
        for (planet, spec) in scene.planets.iter().zip(SOLAR_SYSTEM.planets) {
            let expected = Quat::from_rotation_y(planet.initial_phase) * Vec3::new(spec.position, 0.0, 0.0);
            let actual = scene.graph.world_position(planet.mesh);
            assert!(actual.abs_diff_eq(expected, 1e-3), "{}: {actual} vs {expected}", planet.name);
        }
    }

    #[test]
    fn test_tick_advances_orbits() {
        let mut scene = seeded_scene(4);
        let ticks = 120;
        let scale = 1.5;
        for _ in 0..ticks {
            scene.tick(scale);
        }
        assert_eq!(scene.frames(), ticks);

        for (planet, spec) in scene.planets.iter().zip(SOLAR_SYSTEM.planets) {
            let angle = planet.initial_phase + ticks as f32 * scale * spec.rotation_around_sun;
            let expected = Quat::from_rotation_y(angle) * Vec3::new(spec.position, 0.0, 0.0);
            let actual = scene.graph.world_position(planet.mesh);
            assert!(actual.abs_diff_eq(expected, 5e-2), "{}: {actual} vs {expected}", planet.name);
            assert!(actual.y.abs() < 1e-3);
        }
    }

    #[test]
    fn test_tick_spins_planet_in_place() {
        let mut scene = seeded_scene(5);
        let mars = scene.planet("Mars").unwrap().clone();
        let spec = SOLAR_SYSTEM.find_planet("Mars").unwrap();

        scene.tick(1.0);

        let expected = Quat::from_rotation_y(spec.rotation_own_orbit);
        assert!(scene.graph.node(mars.mesh).rotation.abs_diff_eq(expected, 1e-6));
        assert_eq!(scene.graph.node(mars.mesh).translation, Vec3::new(spec.position, 0.0, 0.0));
    }

    #[test]
    fn test_zero_time_scale_freezes_motion() {
        let mut scene = seeded_scene(6);
        let before = scene.graph.world_matrices();
        scene.tick(0.0);
        let after = scene.graph.world_matrices();
        for (a, b) in before.iter().zip(&after) {
            assert!(a.abs_diff_eq(*b, 1e-5));
        }
    }

    #[test]
    fn test_paused_animation_leaves_scene_still() {
        let mut scene = seeded_scene(9);
        let mut animation = Animation::new(4.0, true);
        let before = scene.graph.world_matrices();

        for _ in 0..10 {
            assert!(!animation.update(&mut scene));
        }
        assert_eq!(scene.frames(), 0);
        assert_eq!(scene.graph.world_matrices(), before);

        assert!(!animation.toggle_pause());
        assert!(animation.update(&mut scene));
        assert_eq!(scene.frames(), 1);
        let moved = scene.graph.world_matrices();
        assert!(moved.iter().zip(&before).any(|(a, b)| !a.abs_diff_eq(*b, 1e-6)));
    }

    #[test]
    fn test_time_scale_stays_in_range() {
        let mut animation = Animation::default();
        for _ in 0..200 {
            animation.speed_up();
        }
        assert_eq!(animation.time_scale(), MAX_TIME_SCALE);
        for _ in 0..200 {
            animation.slow_down();
        }
        assert_eq!(animation.time_scale(), MIN_TIME_SCALE);

        assert_eq!(Animation::new(f32::INFINITY, false).time_scale(), MAX_TIME_SCALE);
        assert_eq!(Animation::new(f32::NAN, false).time_scale(), 1.0);
        assert_eq!(Animation::new(-3.0, false).time_scale(), MIN_TIME_SCALE);
    }

    #[test]
    fn test_fastest_animation_keeps_bodies_finite() {
        let mut scene = seeded_scene(10);
        let mut animation = Animation::default();
        for _ in 0..200 {
            animation.speed_up();
        }
        for _ in 0..100 {
            animation.update(&mut scene);
        }
        let earth = scene.planet("Earth").unwrap();
        let pos = scene.graph.world_position(earth.mesh);
        assert!(pos.is_finite());
        assert!((pos.length() - 68.0).abs() < 1e-1);
    }

    #[test]
    fn test_moon_and_ring_follow_their_planet() {
        let mut scene = seeded_scene(7);
        for _ in 0..500 {
            scene.tick(1.0);
        }

        let earth = scene.planet("Earth").unwrap();
        let earth_pos = scene.graph.world_position(earth.mesh);
        let moon_pos = scene.graph.world_position(earth.satellites[0].mesh);
        assert!((moon_pos.distance(earth_pos) - 9.0).abs() < 1e-3);
        assert!((moon_pos.y - earth_pos.y).abs() < 1e-3);

        let uranus = scene.planet("Uranus").unwrap();
        let ring_pos = scene.graph.world_position(uranus.ring.unwrap());
        assert!(ring_pos.abs_diff_eq(scene.graph.world_position(uranus.mesh), 1e-3));
    }

    #[test]
    fn test_moon_angle_combines_spin_and_orbit() {
        let mut scene = seeded_scene(8);
        let ticks = 50;
        for _ in 0..ticks {
            scene.tick(1.0);
        }

        let earth = scene.planet("Earth").unwrap().clone();
        let spec = SOLAR_SYSTEM.find_planet("Earth").unwrap();
        let moon = &spec.natural_satellites[0];

        // Moon pivot sits under the spinning planet, so its heading is the sum of
        // the pivot, planet and moon rotations
        let heading = earth.initial_phase
            + ticks as f32 * (spec.rotation_around_sun + spec.rotation_own_orbit + moon.rotation_around_parent);
        let offset = scene.graph.world_position(earth.satellites[0].mesh) - scene.graph.world_position(earth.mesh);
        let expected = Quat::from_rotation_y(heading) * Vec3::new(9.0, 0.0, 0.0);
        assert!(offset.abs_diff_eq(expected, 1e-2));
    }
}
