use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use venture_terrain::{SplatCache, SplatMap, SurfaceId};

use crate::cipher::{CipherGame, Verdict};
use crate::dialogue::{AdvanceOutcome, DialogueScript, DialogueSession};
use crate::focus::{handle_interact_key, ActiveCamera, CanvasFade, FocusManager, InteractOutcome};
use crate::footsteps::{
    FootstepController, FootstepEvent, FootstepLibrary, FootstepSet, StepSurface, TriggerMode,
};
use crate::fx::{Carousel, MatrixStream};
use crate::scene::{GroundKind, GroundStrip, InteractKind, Interactable, Scene, Vec3};
use crate::terminal::LoginTerminal;

const TICK_DT: f32 = 1.0 / 60.0;
const INTERACT_RANGE: f32 = 3.0;
const INTERACT_LATERAL: f32 = 0.5;

/// Ordered record of everything the demos did, written out as JSON in the
/// same shape as the footstep log: one numbered entry per event.
#[derive(Serialize)]
pub struct EventLogEntry {
    pub sequence: u32,
    pub tick: u32,
    pub label: String,
}

#[derive(Serialize)]
pub struct EventLog {
    pub events: Vec<EventLogEntry>,
}

pub struct EventRecorder {
    events: Vec<EventLogEntry>,
    tick: u32,
    verbose: bool,
}

impl EventRecorder {
    pub fn new(verbose: bool) -> Self {
        EventRecorder {
            events: Vec::new(),
            tick: 0,
            verbose,
        }
    }

    pub fn set_tick(&mut self, tick: u32) {
        self.tick = tick;
    }

    pub fn record(&mut self, label: impl Into<String>) {
        let label = label.into();
        if self.verbose {
            eprintln!("[venture_engine] {label}");
        }
        self.events.push(EventLogEntry {
            sequence: self.events.len() as u32,
            tick: self.tick,
            label,
        });
    }

    pub fn into_log(self) -> EventLog {
        EventLog {
            events: self.events,
        }
    }
}

/// Splat layers used by the demo terrain.
const LAYER_GRASS: usize = 0;
const LAYER_GRAVEL: usize = 1;
const LAYER_SAND: usize = 2;

/// The walkable demo scene: a painted terrain strip, a gap where a plank
/// bridge used to be, and a wooden mesh floor on the far side.
pub fn demo_scene() -> Scene {
    let mut scene = Scene::new();

    // 32x32 alphamap: grass on the near half, gravel on the far half, and
    // a sand band across rows 16..24 (one full downsample block, so the
    // band survives the block-majority vote).
    scene.add_surface(SplatMap::from_dominant_layers(
        SurfaceId(1),
        32,
        32,
        3,
        |row, col| {
            if (16..24).contains(&row) {
                LAYER_SAND
            } else if col < 16 {
                LAYER_GRASS
            } else {
                LAYER_GRAVEL
            }
        },
    ));
    scene.add_strip(GroundStrip {
        from_x: 0.0,
        to_x: 16.0,
        kind: GroundKind::Terrain {
            surface: SurfaceId(1),
            origin: (0.0, 0.0),
            size: (16.0, 16.0),
        },
    });
    // A bare concrete ledge past the terrain edge.
    scene.add_strip(GroundStrip {
        from_x: 16.0,
        to_x: 18.0,
        kind: GroundKind::Mesh { texture: None },
    });
    // The gap: nothing between 18 and 19.
    scene.add_strip(GroundStrip {
        from_x: 19.0,
        to_x: 23.0,
        kind: GroundKind::Mesh {
            texture: Some("wood_planks".to_string()),
        },
    });

    scene
}

pub fn demo_library() -> FootstepLibrary {
    let mut library = FootstepLibrary::new(
        1.5,
        0.7,
        vec!["step_generic_01".into(), "step_generic_02".into()],
    );
    library.add_set(FootstepSet::for_terrain_layer(
        "grass",
        LAYER_GRASS,
        vec!["grass_01".into(), "grass_02".into(), "grass_03".into()],
    ));
    library.add_set(FootstepSet::for_terrain_layer(
        "gravel",
        LAYER_GRAVEL,
        vec!["gravel_01".into(), "gravel_02".into()],
    ));
    library.add_set(FootstepSet::for_terrain_layer(
        "sand",
        LAYER_SAND,
        vec!["sand_01".into(), "sand_02".into()],
    ));
    library.add_set(FootstepSet::for_texture(
        "wood",
        "wood_planks",
        vec!["wood_01".into(), "wood_02".into()],
    ));
    library
}

struct WalkSegment {
    duration: f32,
    velocity: Vec3,
}

/// Scripted route across every kind of ground the demo scene has.
fn demo_walk_plan() -> Vec<WalkSegment> {
    vec![
        // Across the grass half, then drift through the sand path.
        WalkSegment {
            duration: 5.0,
            velocity: Vec3::new(1.4, 0.0, 0.0),
        },
        WalkSegment {
            duration: 2.0,
            velocity: Vec3::new(1.0, 0.0, 1.2),
        },
        // Over the gravel half and off the terrain.
        WalkSegment {
            duration: 6.0,
            velocity: Vec3::new(1.4, 0.0, -0.4),
        },
        // Across the bare ledge, the gap, and the wooden floor.
        WalkSegment {
            duration: 4.0,
            velocity: Vec3::new(1.2, 0.0, 0.0),
        },
    ]
}

#[derive(Serialize)]
pub struct FootstepLogEntry {
    pub sequence: u32,
    pub tick: u32,
    #[serde(flatten)]
    pub event: FootstepEvent,
}

fn camera_label(focus: &FocusManager) -> &'static str {
    match focus.active_camera() {
        ActiveCamera::Computer => "computer",
        ActiveCamera::Player => "player",
    }
}

fn surface_label(surface: &StepSurface) -> String {
    match surface {
        StepSurface::TerrainLayer { layer, set } => {
            format!("footstep.terrain layer={layer} set={set}")
        }
        StepSurface::MeshTexture { texture, set } => {
            format!("footstep.mesh texture={texture} set={set}")
        }
        StepSurface::Default => "footstep.default".to_string(),
    }
}

/// Walks the demo route, collecting footstep events keyed off the splat
/// cache. Returns the footstep log alongside the textual event log.
pub fn run_walk_demo(seed: u64, recorder: &mut EventRecorder) -> Vec<FootstepLogEntry> {
    let scene = demo_scene();
    let library = demo_library();
    let mut cache = SplatCache::default();
    let mut rng = StdRng::seed_from_u64(seed);

    let start = Vec3::new(0.5, 0.0, 6.0);
    let mut position = start;
    let mut controller = FootstepController::new(TriggerMode::Distance, start);
    let mut steps: Vec<FootstepLogEntry> = Vec::new();
    let mut tick: u32 = 0;

    for (index, segment) in demo_walk_plan().iter().enumerate() {
        recorder.set_tick(tick);
        recorder.record(format!(
            "walk.segment {index} vx={:.2} vz={:.2}",
            segment.velocity.x, segment.velocity.z
        ));

        let ticks = (segment.duration / TICK_DT).round() as u32;
        for _ in 0..ticks {
            tick += 1;
            position = Vec3::new(
                position.x + segment.velocity.x * TICK_DT,
                position.y,
                position.z + segment.velocity.z * TICK_DT,
            );
            recorder.set_tick(tick);
            if let Some(event) = controller.tick(position, &scene, &mut cache, &library, &mut rng)
            {
                recorder.record(format!(
                    "{} clip={}",
                    surface_label(&event.surface),
                    event.clip
                ));
                steps.push(FootstepLogEntry {
                    sequence: steps.len() as u32,
                    tick,
                    event,
                });
            }
        }
    }

    recorder.record(format!("walk.done steps={}", steps.len()));
    info!("walk demo finished with {} footsteps", steps.len());
    steps
}

/// An evening at the desk: sit down at the computer, fumble the password
/// once, log in, clear the cipher game, chat with Liza, and stand back up.
pub fn run_session_demo(seed: u64, recorder: &mut EventRecorder) {
    let mut scene = demo_scene();
    scene.add_interactable(Interactable {
        name: "desk_terminal".to_string(),
        position: Vec3::new(2.0, 0.0, 6.0),
        kind: InteractKind::Computer,
    });
    scene.add_interactable(Interactable {
        name: "liza".to_string(),
        position: Vec3::new(1.5, 0.0, 10.0),
        kind: InteractKind::Dialogue(DialogueScript::new(
            "Liza",
            &[
                "You found the old terminal.",
                "The password is taped under the keyboard, obviously.",
                "Bring me whatever is in the drawer afterwards.",
            ],
        )),
    });
    scene.add_interactable(Interactable {
        name: "drawer".to_string(),
        position: Vec3::new(1.0, 0.0, 2.0),
        kind: InteractKind::ItemSpawner {
            item: "journal".to_string(),
        },
    });

    let mut rng = StdRng::seed_from_u64(seed);
    let mut focus = FocusManager::new();
    let mut fade = CanvasFade::new(0.5, 0.5);
    let player = Vec3::new(0.5, 0.0, 6.0);
    // Scripted beats count as one tick each; timed loops advance it per step.
    let mut tick: u32 = 0;

    // Sit down at the computer.
    tick += 1;
    recorder.set_tick(tick);
    match handle_interact_key(&mut focus, &scene, player, INTERACT_RANGE, INTERACT_LATERAL) {
        InteractOutcome::EnteredComputer { name } => {
            recorder.record(format!("interact.computer {name}"));
            recorder.record(format!("camera.switch {}", camera_label(&focus)));
            if !focus.controls_enabled() {
                recorder.record("controls.locked");
            }
        }
        other => recorder.record(format!("interact.unexpected {other:?}")),
    }
    fade.fade_in();
    while fade.alpha() < 1.0 {
        fade.tick(TICK_DT);
        tick += 1;
    }
    recorder.set_tick(tick);
    recorder.record(format!(
        "screen.fade alpha={:.2} interactable={}",
        fade.alpha(),
        fade.interactable
    ));

    // The login panel: one wrong guess, then the taped-on password.
    let mut terminal = LoginTerminal::new("Administrador", "1234");
    terminal.type_password("0000");
    let ok = terminal.key_enter().unwrap_or(false);
    tick += 1;
    recorder.set_tick(tick);
    recorder.record(format!("terminal.submit ok={ok}"));
    recorder.record("terminal.error shown");
    terminal.acknowledge_error();
    tick += 1;
    recorder.set_tick(tick);
    recorder.record("terminal.error.ack");
    terminal.type_password("1234");
    let ok = terminal.key_enter().unwrap_or(false);
    tick += 1;
    recorder.set_tick(tick);
    recorder.record(format!("terminal.submit ok={ok}"));
    if terminal.panels().logged_in {
        recorder.record("terminal.panel logged_in");
    }

    // Desktop dressing: the matrix column and the photo carousel.
    let mut matrix = MatrixStream::new(16, 50.0, true, 100.0, 20.0);
    matrix.tick(TICK_DT, &mut rng);
    tick += 1;
    recorder.set_tick(tick);
    recorder.record(format!("fx.matrix sample={}", matrix.text()));
    let mut carousel = Carousel::new(
        vec!["photo_intro".into(), "photo_lab".into()],
        0.2,
        0.1,
    );
    if !carousel.is_empty() {
        while carousel.current() == Some("photo_intro") {
            carousel.tick(0.1);
            tick += 1;
        }
        recorder.set_tick(tick);
        recorder.record(format!(
            "fx.carousel image={} alpha={:.2} bob={:.2}",
            carousel.current().unwrap_or("none"),
            carousel.alpha(),
            carousel.bob_offset()
        ));
    }

    // The cipher minigame guards the files.
    let mut game = CipherGame::new(2, &mut rng);
    while !game.is_won() {
        tick += 1;
        recorder.set_tick(tick);
        let prompt = game.puzzle().prompt();
        recorder.record(format!("cipher.deal prompt=\"{prompt}\""));
        let targets: Vec<char> = game.puzzle().encrypted().to_uppercase().chars().collect();
        for (index, target) in targets.iter().enumerate() {
            while game.puzzle().wheels()[index] != *target {
                game.puzzle_mut().shift_letter(index, 1);
            }
        }
        match game.check(&mut rng) {
            Verdict::Correct => {
                recorder.record(format!("cipher.check correct rounds_left={}", game.rounds_left()))
            }
            Verdict::TryAgain => recorder.record("cipher.check try_again"),
        }
    }
    tick += 1;
    recorder.set_tick(tick);
    recorder.record("cipher.win");

    // Stand up; the interact key exits before it probes.
    tick += 1;
    recorder.set_tick(tick);
    match handle_interact_key(&mut focus, &scene, player, INTERACT_RANGE, INTERACT_LATERAL) {
        InteractOutcome::ExitedComputer => {
            recorder.record("interact.exit_computer");
            recorder.record(format!("camera.switch {}", camera_label(&focus)));
            if focus.controls_enabled() {
                recorder.record("controls.unlocked");
            }
        }
        other => recorder.record(format!("interact.unexpected {other:?}")),
    }
    fade.fade_out();
    while fade.alpha() > 0.0 {
        fade.tick(TICK_DT);
        tick += 1;
    }
    recorder.set_tick(tick);
    recorder.record(format!(
        "screen.fade alpha={:.2} blocking={}",
        fade.alpha(),
        fade.blocks_raycasts
    ));

    // Walk over to Liza and let the typewriter run.
    let near_liza = Vec3::new(1.0, 0.0, 10.0);
    tick += 1;
    recorder.set_tick(tick);
    if let InteractOutcome::StartedDialogue { name, script } =
        handle_interact_key(&mut focus, &scene, near_liza, INTERACT_RANGE, INTERACT_LATERAL)
    {
        recorder.record(format!("dialogue.start {name}"));
        let mut session = DialogueSession::start(&script, 10.0);
        loop {
            match session.advance() {
                AdvanceOutcome::StartedParagraph => {
                    while session.is_typing() {
                        session.tick(TICK_DT);
                        tick += 1;
                    }
                    recorder.set_tick(tick);
                    recorder.record(format!(
                        "dialogue.paragraph speaker={} text=\"{}\"",
                        session.speaker(),
                        session.visible()
                    ));
                }
                AdvanceOutcome::SkippedToEnd => {}
                AdvanceOutcome::Closed => break,
            }
        }
        if !session.is_open() {
            tick += 1;
            recorder.set_tick(tick);
            recorder.record("dialogue.closed");
        }
    }

    // And finally the drawer.
    let near_drawer = Vec3::new(0.5, 0.0, 2.0);
    tick += 1;
    recorder.set_tick(tick);
    if let InteractOutcome::SpawnedItem { name, item } =
        handle_interact_key(&mut focus, &scene, near_drawer, INTERACT_RANGE, INTERACT_LATERAL)
    {
        recorder.record(format!("interact.spawn source={name} item={item}"));
    }

    info!("session demo finished");
}

pub fn write_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {what} to JSON"))?;
    fs::write(path, &json).with_context(|| format!("writing {what} to {}", path.display()))?;
    println!("Saved {what} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run_session_demo, run_walk_demo, EventRecorder};
    use crate::footsteps::StepSurface;

    #[test]
    fn walk_demo_steps_on_every_surface_kind() {
        let mut recorder = EventRecorder::new(false);
        let steps = run_walk_demo(7, &mut recorder);
        assert!(!steps.is_empty());

        let mut saw_terrain = false;
        let mut saw_mesh = false;
        let mut saw_default = false;
        for entry in &steps {
            match &entry.event.surface {
                StepSurface::TerrainLayer { .. } => saw_terrain = true,
                StepSurface::MeshTexture { .. } => saw_mesh = true,
                StepSurface::Default => saw_default = true,
            }
        }
        assert!(saw_terrain, "route crosses the painted terrain");
        assert!(saw_mesh, "route crosses the wooden floor");
        assert!(saw_default, "route crosses the untextured ledge");
    }

    #[test]
    fn walk_demo_is_deterministic_for_a_seed() {
        let mut first = EventRecorder::new(false);
        let mut second = EventRecorder::new(false);
        let a = run_walk_demo(42, &mut first);
        let b = run_walk_demo(42, &mut second);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.event.clip, y.event.clip);
            assert_eq!(x.tick, y.tick);
        }
    }

    #[test]
    fn session_demo_ticks_advance_through_the_evening() {
        let mut recorder = EventRecorder::new(false);
        run_session_demo(5, &mut recorder);
        let log = recorder.into_log();
        assert!(!log.events.is_empty());
        assert!(
            log.events.windows(2).all(|pair| pair[0].tick <= pair[1].tick),
            "session event ticks never go backwards"
        );
        let first = log.events[0].tick;
        let last = log.events[log.events.len() - 1].tick;
        assert!(last > first, "session events span more than one tick");
    }

    #[test]
    fn session_demo_reaches_the_cipher_win() {
        let mut recorder = EventRecorder::new(false);
        run_session_demo(3, &mut recorder);
        let log = recorder.into_log();
        let labels: Vec<&str> = log.events.iter().map(|e| e.label.as_str()).collect();

        let login_at = labels
            .iter()
            .position(|l| *l == "terminal.panel logged_in")
            .expect("login succeeds");
        let win_at = labels
            .iter()
            .position(|l| *l == "cipher.win")
            .expect("cipher game is won");
        assert!(login_at < win_at, "login comes before the cipher game");
        assert!(labels.contains(&"dialogue.closed"));
        assert!(labels
            .iter()
            .any(|l| l.starts_with("interact.spawn source=drawer")));
    }
}
