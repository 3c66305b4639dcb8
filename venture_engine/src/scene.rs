use std::collections::HashMap;

use serde::Serialize;
use venture_terrain::{SplatMap, SplatSource, SurfaceId};

use crate::dialogue::DialogueScript;

/// Minimal world-space position. The demo scene only ever walks along x,
/// but hits and events carry all three components so logs read like the
/// scene they came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// What the ground under a strip of the scene is made of.
#[derive(Debug, Clone)]
pub enum GroundKind {
    /// Splat-painted terrain. `origin`/`size` are the world-space footprint
    /// used to normalize hit coordinates into `[0, 1]`.
    Terrain {
        surface: SurfaceId,
        origin: (f32, f32),
        size: (f32, f32),
    },
    /// A static mesh floor; footsteps key off its main texture when set.
    Mesh { texture: Option<String> },
}

/// One slab of ground covering `from_x..to_x` along the walk axis.
#[derive(Debug, Clone)]
pub struct GroundStrip {
    pub from_x: f32,
    pub to_x: f32,
    pub kind: GroundKind,
}

/// Result of the downward ground probe, the headless stand-in for the
/// original's physics raycast from the player's feet.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundHit {
    Terrain {
        surface: SurfaceId,
        normalized: (f32, f32),
    },
    Mesh {
        texture: Option<String>,
    },
}

/// Things the interact key can target, mirroring the scene's interactable
/// scripts: the computer hands focus over, dialogue triggers start a
/// session, spawners drop an inspectable item into the room.
#[derive(Debug, Clone)]
pub enum InteractKind {
    Computer,
    Dialogue(DialogueScript),
    ItemSpawner { item: String },
}

#[derive(Debug, Clone)]
pub struct Interactable {
    pub name: String,
    pub position: Vec3,
    pub kind: InteractKind,
}

/// Declarative scene description: ground strips along the walk axis, the
/// splat surfaces they reference, and the interactables scattered on top.
#[derive(Debug, Default)]
pub struct Scene {
    strips: Vec<GroundStrip>,
    surfaces: HashMap<SurfaceId, SplatMap>,
    interactables: Vec<Interactable>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn add_strip(&mut self, strip: GroundStrip) {
        self.strips.push(strip);
    }

    pub fn add_surface(&mut self, map: SplatMap) {
        self.surfaces.insert(map.id(), map);
    }

    pub fn add_interactable(&mut self, interactable: Interactable) {
        self.interactables.push(interactable);
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&SplatMap> {
        self.surfaces.get(&id)
    }

    /// Probes straight down from `position`. Gaps between strips report no
    /// ground, exactly like a raycast finding nothing beneath the player.
    pub fn ground_hit(&self, position: Vec3) -> Option<GroundHit> {
        let strip = self
            .strips
            .iter()
            .find(|strip| position.x >= strip.from_x && position.x < strip.to_x)?;

        match &strip.kind {
            GroundKind::Terrain {
                surface,
                origin,
                size,
            } => {
                // World hit point -> fraction of the terrain's extent; the
                // cache clamps, so edge overshoot here is harmless.
                let nx = if size.0 != 0.0 {
                    (position.x - origin.0) / size.0
                } else {
                    0.0
                };
                let nz = if size.1 != 0.0 {
                    (position.z - origin.1) / size.1
                } else {
                    0.0
                };
                Some(GroundHit::Terrain {
                    surface: *surface,
                    normalized: (nx, nz),
                })
            }
            GroundKind::Mesh { texture } => Some(GroundHit::Mesh {
                texture: texture.clone(),
            }),
        }
    }

    /// Forward probe for the interact key: nearest interactable ahead of
    /// `origin` along +x, within `range` and a small lateral window.
    pub fn probe_interactable(
        &self,
        origin: Vec3,
        range: f32,
        lateral_tolerance: f32,
    ) -> Option<&Interactable> {
        self.interactables
            .iter()
            .filter(|interactable| {
                let ahead = interactable.position.x - origin.x;
                ahead > 0.0
                    && ahead <= range
                    && (interactable.position.z - origin.z).abs() <= lateral_tolerance
            })
            .min_by(|a, b| {
                let da = a.position.x - origin.x;
                let db = b.position.x - origin.x;
                da.total_cmp(&db)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{GroundHit, GroundKind, GroundStrip, InteractKind, Interactable, Scene, Vec3};
    use venture_terrain::{SplatMap, SurfaceId};

    fn scene_with_terrain() -> Scene {
        let mut scene = Scene::new();
        scene.add_surface(SplatMap::filled(SurfaceId(1), 16, 16, 2, 0.5));
        scene.add_strip(GroundStrip {
            from_x: 0.0,
            to_x: 10.0,
            kind: GroundKind::Terrain {
                surface: SurfaceId(1),
                origin: (0.0, 0.0),
                size: (10.0, 10.0),
            },
        });
        scene.add_strip(GroundStrip {
            from_x: 12.0,
            to_x: 16.0,
            kind: GroundKind::Mesh {
                texture: Some("wood_planks".to_string()),
            },
        });
        scene
    }

    #[test]
    fn terrain_hits_normalize_against_the_footprint() {
        let scene = scene_with_terrain();
        let hit = scene.ground_hit(Vec3::new(5.0, 0.0, 2.5)).unwrap();
        assert_eq!(
            hit,
            GroundHit::Terrain {
                surface: SurfaceId(1),
                normalized: (0.5, 0.25),
            }
        );
    }

    #[test]
    fn gaps_between_strips_have_no_ground() {
        let scene = scene_with_terrain();
        assert_eq!(scene.ground_hit(Vec3::new(11.0, 0.0, 0.0)), None);
        assert!(matches!(
            scene.ground_hit(Vec3::new(13.0, 0.0, 0.0)),
            Some(GroundHit::Mesh { .. })
        ));
    }

    #[test]
    fn interact_probe_picks_the_nearest_target_in_range() {
        let mut scene = Scene::new();
        for (name, x) in [("far_door", 2.5), ("desk_terminal", 1.5), ("behind", -1.0)] {
            scene.add_interactable(Interactable {
                name: name.to_string(),
                position: Vec3::new(x, 0.0, 0.0),
                kind: InteractKind::Computer,
            });
        }
        let hit = scene
            .probe_interactable(Vec3::new(0.0, 0.0, 0.0), 3.0, 0.5)
            .unwrap();
        assert_eq!(hit.name, "desk_terminal");

        assert!(scene
            .probe_interactable(Vec3::new(0.0, 0.0, 5.0), 3.0, 0.5)
            .is_none());
    }
}
