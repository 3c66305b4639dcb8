use log::debug;
use rand::Rng;
use serde::Serialize;
use venture_terrain::SplatCache;

use crate::scene::{GroundHit, Scene, Vec3};

/// One material's worth of footstep audio: matched either by terrain splat
/// layer or by a mesh's main texture name.
#[derive(Debug, Clone)]
pub struct FootstepSet {
    pub name: String,
    pub terrain_layer: Option<usize>,
    pub texture: Option<String>,
    pub clips: Vec<String>,
    pub volume_multiplier: f32,
    pub pitch_variation: f32,
}

impl FootstepSet {
    pub fn for_terrain_layer(name: &str, layer: usize, clips: Vec<String>) -> Self {
        FootstepSet {
            name: name.to_string(),
            terrain_layer: Some(layer),
            texture: None,
            clips,
            volume_multiplier: 1.0,
            pitch_variation: 0.1,
        }
    }

    pub fn for_texture(name: &str, texture: &str, clips: Vec<String>) -> Self {
        FootstepSet {
            name: name.to_string(),
            terrain_layer: None,
            texture: Some(texture.to_string()),
            clips,
            volume_multiplier: 1.0,
            pitch_variation: 0.1,
        }
    }
}

/// The footstep database: trigger tuning plus the material-to-clip table.
#[derive(Debug, Clone)]
pub struct FootstepLibrary {
    pub step_distance: f32,
    pub default_volume: f32,
    sets: Vec<FootstepSet>,
    default_clips: Vec<String>,
}

const DEFAULT_PITCH_VARIATION: f32 = 0.1;

impl FootstepLibrary {
    pub fn new(step_distance: f32, default_volume: f32, default_clips: Vec<String>) -> Self {
        FootstepLibrary {
            step_distance,
            default_volume,
            sets: Vec::new(),
            default_clips,
        }
    }

    pub fn add_set(&mut self, set: FootstepSet) {
        self.sets.push(set);
    }

    pub fn set_for_terrain_layer(&self, layer: usize) -> Option<&FootstepSet> {
        self.sets
            .iter()
            .find(|set| set.terrain_layer == Some(layer))
    }

    pub fn set_for_texture(&self, texture: &str) -> Option<&FootstepSet> {
        self.sets
            .iter()
            .find(|set| set.texture.as_deref() == Some(texture))
    }

    fn random_clip<'a, R: Rng>(clips: &'a [String], rng: &mut R) -> Option<&'a str> {
        if clips.is_empty() {
            return None;
        }
        Some(clips[rng.gen_range(0..clips.len())].as_str())
    }
}

/// How the surface under a step was identified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSurface {
    TerrainLayer { layer: usize, set: String },
    MeshTexture { texture: String, set: String },
    Default,
}

/// A footstep the host would hand to the audio system.
#[derive(Debug, Clone, Serialize)]
pub struct FootstepEvent {
    pub position: [f32; 3],
    pub surface: StepSurface,
    pub clip: String,
    pub volume: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fire a step every `step_distance` units of travel.
    Distance,
    /// Fire only when the animation event proxy calls in.
    AnimationEvent,
}

/// Distance-triggered footstep emitter. Feed it the player position every
/// tick; it fires once per `step_distance` traveled and classifies the
/// ground under the foot through the splat cache.
#[derive(Debug)]
pub struct FootstepController {
    mode: TriggerMode,
    last_position: Vec3,
    distance_traveled: f32,
}

impl FootstepController {
    pub fn new(mode: TriggerMode, start: Vec3) -> Self {
        FootstepController {
            mode,
            last_position: start,
            distance_traveled: 0.0,
        }
    }

    /// Advances the distance accumulator. Returns a step event when the
    /// accumulated travel crosses the library's step distance.
    pub fn tick<R: Rng>(
        &mut self,
        position: Vec3,
        scene: &Scene,
        cache: &mut SplatCache,
        library: &FootstepLibrary,
        rng: &mut R,
    ) -> Option<FootstepEvent> {
        let moved = self.last_position.distance(&position);
        self.last_position = position;

        if self.mode != TriggerMode::Distance {
            return None;
        }

        self.distance_traveled += moved;
        if self.distance_traveled < library.step_distance {
            return None;
        }
        self.distance_traveled = 0.0;

        self.resolve(position, scene, cache, library, rng)
    }

    /// External trigger for animation-event mode; ignored in distance mode,
    /// matching the original controller's guard.
    #[allow(dead_code)]
    pub fn on_step_event<R: Rng>(
        &mut self,
        position: Vec3,
        scene: &Scene,
        cache: &mut SplatCache,
        library: &FootstepLibrary,
        rng: &mut R,
    ) -> Option<FootstepEvent> {
        if self.mode == TriggerMode::Distance {
            return None;
        }
        self.resolve(position, scene, cache, library, rng)
    }

    fn resolve<R: Rng>(
        &mut self,
        position: Vec3,
        scene: &Scene,
        cache: &mut SplatCache,
        library: &FootstepLibrary,
        rng: &mut R,
    ) -> Option<FootstepEvent> {
        let Some(hit) = scene.ground_hit(position) else {
            debug!("no ground under foot at x={:.2}", position.x);
            return None;
        };

        let (set, surface) = match hit {
            GroundHit::Terrain {
                surface,
                normalized,
            } => {
                let map = scene.surface(surface)?;
                let layer = cache.dominant_layer(map, normalized.0, normalized.1);
                match library.set_for_terrain_layer(layer) {
                    Some(set) => (
                        Some(set),
                        StepSurface::TerrainLayer {
                            layer,
                            set: set.name.clone(),
                        },
                    ),
                    None => {
                        debug!("no footstep set for terrain layer {layer}, using default");
                        (None, StepSurface::Default)
                    }
                }
            }
            GroundHit::Mesh {
                texture: Some(texture),
            } => match library.set_for_texture(&texture) {
                Some(set) => (
                    Some(set),
                    StepSurface::MeshTexture {
                        texture,
                        set: set.name.clone(),
                    },
                ),
                None => {
                    debug!("no footstep set for texture {texture}, using default");
                    (None, StepSurface::Default)
                }
            },
            GroundHit::Mesh { texture: None } => {
                debug!("mesh without a main texture, using default");
                (None, StepSurface::Default)
            }
        };

        let (clip, volume, pitch_variation) = match set {
            Some(set) => (
                FootstepLibrary::random_clip(&set.clips, rng)?,
                library.default_volume * set.volume_multiplier,
                set.pitch_variation,
            ),
            None => (
                FootstepLibrary::random_clip(&library.default_clips, rng)?,
                library.default_volume,
                DEFAULT_PITCH_VARIATION,
            ),
        };

        let pitch = 1.0 + rng.gen_range(-pitch_variation..=pitch_variation);
        Some(FootstepEvent {
            position: [position.x, position.y, position.z],
            surface,
            clip: clip.to_string(),
            volume,
            pitch,
        })
    }
}
