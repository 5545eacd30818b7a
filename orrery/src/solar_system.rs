//! Static body table for the orrery
//!
//! Sizes and orbit positions are scene units, not physical ones. Rotation
//! rates are radians added per rendered frame.

/// Sphere tessellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments {
    pub width: u32,
    pub height: u32,
}

impl Segments {
    pub const fn square(n: u32) -> Self {
        Self { width: n, height: n }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunSpec {
    pub size: f32,
    pub segments: Segments,
    pub texture: &'static str,
    pub tint: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture: &'static str,
    pub tint: [f32; 3],
}

/// A moon orbiting a planet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteSpec {
    pub name: &'static str,
    pub texture: &'static str,
    pub size: f32,
    pub rotation_around_parent: f32,
    pub tint: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetSpec {
    pub name: &'static str,
    pub texture: &'static str,
    pub size: f32,
    /// Distance from the sun along the pivot's local X axis
    pub position: f32,
    pub rotation_own_orbit: f32,
    pub rotation_around_sun: f32,
    pub segments: Segments,
    pub ring: Option<RingSpec>,
    pub natural_satellites: &'static [SatelliteSpec],
    /// Flat colour used when the texture cannot be loaded
    pub tint: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSpec {
    /// Star field applied to every face of the skybox
    pub background: &'static str,
    pub background_tint: [f32; 3],
    pub sun: SunSpec,
    pub planets: &'static [PlanetSpec],
}

impl SystemSpec {
    /// Find planet by name
    pub fn find_planet(&self, name: &str) -> Option<&PlanetSpec> {
        self.planets.iter().find(|p| p.name == name)
    }

    /// Number of textured meshes the scene will contain
    pub fn mesh_count(&self) -> usize {
        1 + self
            .planets
            .iter()
            .map(|p| 1 + usize::from(p.ring.is_some()) + p.natural_satellites.len())
            .sum::<usize>()
    }
}

const PLANET_SEGMENTS: Segments = Segments::square(60);

const MOON: SatelliteSpec = SatelliteSpec {
    name: "Moon",
    texture: "moonmap4k.jpg",
    size: 1.0,
    rotation_around_parent: 0.02,
    tint: [0.6, 0.6, 0.6],
};

pub static SOLAR_SYSTEM: SystemSpec = SystemSpec {
    background: "stars.jpg",
    background_tint: [0.01, 0.01, 0.02],
    sun: SunSpec {
        size: 20.0,
        segments: Segments::square(60),
        texture: "sun.jpg",
        tint: [1.0, 0.8, 0.3],
    },
    planets: &[
        PlanetSpec {
            name: "Mercury",
            texture: "mercury.jpg",
            size: 3.2,
            position: 35.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.016,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.7, 0.7, 0.7],
        },
        PlanetSpec {
            name: "Venus",
            texture: "venus.jpg",
            size: 5.8,
            position: 50.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.013,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.9, 0.7, 0.5],
        },
        PlanetSpec {
            name: "Earth",
            texture: "earth.jpg",
            size: 6.0,
            position: 68.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.01,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[MOON],
            tint: [0.2, 0.4, 0.8],
        },
        PlanetSpec {
            name: "Mars",
            texture: "mars.jpg",
            size: 4.0,
            position: 90.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.008,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.8, 0.4, 0.2],
        },
        PlanetSpec {
            name: "Jupiter",
            texture: "jupiter.jpg",
            size: 12.0,
            position: 120.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.002,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.9, 0.8, 0.6],
        },
        PlanetSpec {
            name: "Saturn",
            texture: "saturn.jpg",
            size: 10.0,
            position: 160.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.0009,
            segments: PLANET_SEGMENTS,
            ring: Some(RingSpec {
                inner_radius: 11.0,
                outer_radius: 20.0,
                texture: "saturn ring.png",
                tint: [0.8, 0.75, 0.6],
            }),
            natural_satellites: &[],
            tint: [0.9, 0.85, 0.6],
        },
        PlanetSpec {
            name: "Uranus",
            texture: "uranus.jpg",
            size: 7.0,
            position: 190.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.0004,
            segments: PLANET_SEGMENTS,
            ring: Some(RingSpec {
                inner_radius: 8.0,
                outer_radius: 12.0,
                texture: "uranus ring.png",
                tint: [0.6, 0.7, 0.75],
            }),
            natural_satellites: &[],
            tint: [0.6, 0.8, 0.9],
        },
        PlanetSpec {
            name: "Neptune",
            texture: "neptune.jpg",
            size: 7.0,
            position: 220.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.0001,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.3, 0.4, 0.8],
        },
        PlanetSpec {
            name: "Pluto",
            texture: "pluto.jpg",
            size: 2.8,
            position: 240.0,
            rotation_own_orbit: 0.01,
            rotation_around_sun: 0.00007,
            segments: PLANET_SEGMENTS,
            ring: None,
            natural_satellites: &[],
            tint: [0.75, 0.65, 0.55],
        },
    ],
};
