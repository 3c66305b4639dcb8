use rand::Rng;

/// One vertically scrolling column of "matrix" text. Every tick rewrites
/// the string with fresh binary noise and moves the anchor; the column
/// wraps once it has fully left the screen.
#[derive(Debug)]
pub struct MatrixStream {
    text: String,
    length: usize,
    speed: f32,
    move_up: bool,
    y: f32,
    screen_height: f32,
    text_height: f32,
}

impl MatrixStream {
    pub fn new(length: usize, speed: f32, move_up: bool, screen_height: f32, text_height: f32) -> Self {
        MatrixStream {
            text: String::new(),
            length,
            speed,
            move_up,
            y: 0.0,
            screen_height,
            text_height,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[allow(dead_code)]
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn tick<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.text = random_binary_string(self.length, rng);

        let direction = if self.move_up { 1.0 } else { -1.0 };
        self.y += direction * self.speed * dt;

        if self.move_up && self.y > self.screen_height + self.text_height {
            self.y = -self.text_height;
        } else if !self.move_up && self.y < -self.text_height {
            self.y = self.screen_height + self.text_height;
        }
    }
}

fn random_binary_string<R: Rng>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| if rng.gen_bool(0.5) { '1' } else { '0' })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CarouselPhase {
    Hold { remaining: f32 },
    FadeOut { elapsed: f32 },
    FadeIn { elapsed: f32 },
}

/// Image carousel with cross-fades and a gentle sine bob, as shown on the
/// scene's picture frame: hold, fade out, swap, fade in, repeat.
#[derive(Debug)]
pub struct Carousel {
    images: Vec<String>,
    index: usize,
    time_between: f32,
    fade_time: f32,
    bob_amplitude: f32,
    bob_speed: f32,
    phase: CarouselPhase,
    alpha: f32,
    clock: f32,
}

impl Carousel {
    pub fn new(images: Vec<String>, time_between: f32, fade_time: f32) -> Self {
        Carousel {
            images,
            index: 0,
            time_between,
            fade_time: fade_time.max(f32::MIN_POSITIVE),
            bob_amplitude: 10.0,
            bob_speed: 1.0,
            phase: CarouselPhase::Hold {
                remaining: time_between,
            },
            alpha: 1.0,
            clock: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn bob_offset(&self) -> f32 {
        (self.clock * self.bob_speed).sin() * self.bob_amplitude
    }

    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;
        if self.images.len() < 2 {
            return;
        }

        match self.phase {
            CarouselPhase::Hold { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = CarouselPhase::FadeOut { elapsed: 0.0 };
                } else {
                    self.phase = CarouselPhase::Hold { remaining };
                }
            }
            CarouselPhase::FadeOut { elapsed } => {
                let elapsed = elapsed + dt;
                self.alpha = (1.0 - elapsed / self.fade_time).max(0.0);
                if elapsed >= self.fade_time {
                    self.index = (self.index + 1) % self.images.len();
                    self.phase = CarouselPhase::FadeIn { elapsed: 0.0 };
                } else {
                    self.phase = CarouselPhase::FadeOut { elapsed };
                }
            }
            CarouselPhase::FadeIn { elapsed } => {
                let elapsed = elapsed + dt;
                self.alpha = (elapsed / self.fade_time).min(1.0);
                if elapsed >= self.fade_time {
                    self.alpha = 1.0;
                    self.phase = CarouselPhase::Hold {
                        remaining: self.time_between,
                    };
                } else {
                    self.phase = CarouselPhase::FadeIn { elapsed };
                }
            }
        }
    }
}
