use log::debug;

use crate::dialogue::DialogueScript;
use crate::scene::{InteractKind, Scene, Vec3};

const FOCUSED_PRIORITY: i32 = 20;
const IDLE_PRIORITY: i32 = 10;

/// Which virtual camera currently wins the priority contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveCamera {
    Player,
    Computer,
}

/// Tracks whether the player is seated at a computer, swapping camera
/// priorities and locking player controls while they are.
#[derive(Debug)]
pub struct FocusManager {
    player_priority: i32,
    computer_priority: i32,
    active_computer: Option<String>,
    controls_enabled: bool,
}

impl Default for FocusManager {
    fn default() -> Self {
        FocusManager {
            player_priority: FOCUSED_PRIORITY,
            computer_priority: IDLE_PRIORITY,
            active_computer: None,
            controls_enabled: true,
        }
    }
}

impl FocusManager {
    pub fn new() -> Self {
        FocusManager::default()
    }

    pub fn is_using_computer(&self) -> bool {
        self.active_computer.is_some()
    }

    #[allow(dead_code)]
    pub fn active_computer(&self) -> Option<&str> {
        self.active_computer.as_deref()
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn active_camera(&self) -> ActiveCamera {
        if self.computer_priority > self.player_priority {
            ActiveCamera::Computer
        } else {
            ActiveCamera::Player
        }
    }

    pub fn enter_computer(&mut self, name: &str) {
        if self.is_using_computer() {
            return;
        }
        debug!("entering computer {name}");
        self.active_computer = Some(name.to_string());
        self.player_priority = IDLE_PRIORITY;
        self.computer_priority = FOCUSED_PRIORITY;
        self.controls_enabled = false;
    }

    pub fn exit_computer(&mut self) {
        if let Some(name) = self.active_computer.take() {
            debug!("leaving computer {name}");
        }
        self.player_priority = FOCUSED_PRIORITY;
        self.computer_priority = IDLE_PRIORITY;
        self.controls_enabled = true;
    }
}

/// What pressing the interact key ended up doing this frame.
#[derive(Debug, Clone)]
pub enum InteractOutcome {
    ExitedComputer,
    EnteredComputer { name: String },
    StartedDialogue { name: String, script: DialogueScript },
    SpawnedItem { name: String, item: String },
    Nothing,
}

/// Routes the interact key: leaving the computer takes precedence over a
/// fresh probe, as in the original player script.
pub fn handle_interact_key(
    focus: &mut FocusManager,
    scene: &Scene,
    origin: Vec3,
    range: f32,
    lateral_tolerance: f32,
) -> InteractOutcome {
    if focus.is_using_computer() {
        focus.exit_computer();
        return InteractOutcome::ExitedComputer;
    }

    let Some(target) = scene.probe_interactable(origin, range, lateral_tolerance) else {
        return InteractOutcome::Nothing;
    };

    match &target.kind {
        InteractKind::Computer => {
            focus.enter_computer(&target.name);
            InteractOutcome::EnteredComputer {
                name: target.name.clone(),
            }
        }
        InteractKind::Dialogue(script) => InteractOutcome::StartedDialogue {
            name: target.name.clone(),
            script: script.clone(),
        },
        InteractKind::ItemSpawner { item } => InteractOutcome::SpawnedItem {
            name: target.name.clone(),
            item: item.clone(),
        },
    }
}

/// Screen canvas fade for the computer UI: a short delay, then a linear
/// alpha ramp. Input blocking follows the endpoints, not the ramp.
#[derive(Debug)]
pub struct CanvasFade {
    delay: f32,
    duration: f32,
    alpha: f32,
    fading_in: bool,
    wait_remaining: f32,
    pub blocks_raycasts: bool,
    pub interactable: bool,
}

impl CanvasFade {
    pub fn new(delay: f32, duration: f32) -> Self {
        CanvasFade {
            delay,
            duration: duration.max(f32::MIN_POSITIVE),
            alpha: 0.0,
            fading_in: false,
            wait_remaining: 0.0,
            blocks_raycasts: false,
            interactable: false,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn fade_in(&mut self) {
        self.fading_in = true;
        self.wait_remaining = self.delay;
    }

    pub fn fade_out(&mut self) {
        self.fading_in = false;
        self.wait_remaining = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        let mut dt = dt;
        if self.wait_remaining > 0.0 {
            self.wait_remaining -= dt;
            if self.wait_remaining > 0.0 {
                return;
            }
            // The canvas becomes interactive the moment the delay elapses.
            if self.fading_in {
                self.blocks_raycasts = true;
                self.interactable = true;
            }
            // Only the part of the tick past the delay moves the ramp.
            dt = -self.wait_remaining;
            self.wait_remaining = 0.0;
        }

        let step = dt / self.duration;
        if self.fading_in {
            self.alpha = (self.alpha + step).min(1.0);
        } else {
            self.alpha = (self.alpha - step).max(0.0);
            if self.alpha == 0.0 {
                self.blocks_raycasts = false;
                self.interactable = false;
            }
        }
    }
}
