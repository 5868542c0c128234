use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use cadence_engine::core::{App, AppControl};
use cadence_engine::input::{InputSnapshot, Key};
use cadence_engine::render::{Canvas, Color};

pub const FIELD_WIDTH: u32 = 840;
pub const FIELD_HEIGHT: u32 = 480;

const SCOREBOARD_WIDTH: i32 = 150;
const WALL_WIDTH: i32 = 75;
const RACKET_HEIGHT: i32 = 75;
const RACKET_WIDTH: i32 = 10;
const RACKET_X: i32 = 30;
const RACKET_STEP: i32 = 3;
const BALL_SIZE: i32 = RACKET_WIDTH;
const INITIAL_BALL_SPEED: i32 = 1;
const SCORE_PADDING: i32 = 10;

const INK: Color = Color::GREEN;

/// Tiny xorshift generator; the game only needs a three-way coin.
#[derive(Debug, Clone)]
struct Rng(u32);

impl Rng {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0x9e37_79b9);
        Self::new(nanos)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform over {-1, 0, 1}.
    fn direction(&mut self) -> i32 {
        (self.next_u32() % 3) as i32 - 1
    }
}

/// Single-player squash: keep the ball in play between the racket on the
/// left and the wall on the right.
#[derive(Debug)]
pub struct RacketBall {
    width: i32,
    height: i32,
    rng: Rng,

    up: bool,
    down: bool,
    racket_y: i32,

    ball_x: i32,
    ball_y: i32,
    ball_vx: i32,
    ball_vy: i32,

    score: u32,
    best: u32,
}

impl RacketBall {
    pub fn new() -> Self {
        Self::with_rng(Rng::from_clock())
    }

    fn with_rng(rng: Rng) -> Self {
        let mut game = Self {
            width: FIELD_WIDTH as i32,
            height: FIELD_HEIGHT as i32,
            rng,
            up: false,
            down: false,
            racket_y: FIELD_HEIGHT as i32 / 2,
            ball_x: 0,
            ball_y: 0,
            ball_vx: 0,
            ball_vy: 0,
            score: 0,
            best: 0,
        };
        game.serve();
        game
    }

    /// Puts the ball on the racket face, heading for the wall.
    fn serve(&mut self) {
        self.ball_x = RACKET_X + RACKET_WIDTH;
        self.ball_y = self.racket_y;
        self.ball_vx = INITIAL_BALL_SPEED;
        self.ball_vy = self.rng.direction();
    }

    fn wall_x(&self) -> i32 {
        self.width - SCOREBOARD_WIDTH - WALL_WIDTH
    }

    fn racket_face(&self) -> i32 {
        RACKET_X + RACKET_WIDTH / 2
    }

    fn step(&mut self) {
        if self.up {
            self.racket_y -= RACKET_STEP;
        }
        if self.down {
            self.racket_y += RACKET_STEP;
        }

        self.ball_x += self.ball_vx;
        self.ball_y += self.ball_vy;

        if self.ball_x >= self.wall_x() {
            self.ball_vx = -self.ball_vx;
        }
        if self.ball_y <= 0 || self.ball_y >= self.height {
            self.ball_vy = -self.ball_vy;
        }

        let top = self.racket_y - RACKET_HEIGHT / 2;
        let bottom = self.racket_y + RACKET_HEIGHT / 2;
        if self.ball_vx < 0
            && (top..=bottom).contains(&self.ball_y)
            && (RACKET_X..=self.racket_face()).contains(&self.ball_x)
        {
            self.ball_vx = -self.ball_vx * 2;
            self.ball_vy = self.rng.direction();
            self.score += 1;
            log::debug!("racket hit, score {} speed {}", self.score, self.ball_vx);
        }

        // Missed: the ball left the field behind the racket.
        if self.ball_x + BALL_SIZE < 0 {
            log::info!("ball missed at score {}", self.score);
            self.best = self.best.max(self.score);
            self.score = 0;
            self.serve();
        }
    }
}

impl Default for RacketBall {
    fn default() -> Self {
        Self::new()
    }
}

impl App for RacketBall {
    fn initialize(&mut self, (width, height): (u32, u32)) -> Result<()> {
        self.width = width as i32;
        self.height = height as i32;
        self.racket_y = self.height / 2;
        self.serve();
        log::info!("racket ball on a {width}x{height} field");
        Ok(())
    }

    fn process_input(&mut self, input: &InputSnapshot, _dt: f32) -> Result<AppControl> {
        if input.is_held(Key::Escape) {
            return Ok(AppControl::Exit);
        }

        let half = RACKET_HEIGHT / 2;
        self.up = input.is_held(Key::ArrowUp) && self.racket_y >= half;
        self.down = input.is_held(Key::ArrowDown) && self.racket_y <= self.height - half;
        Ok(AppControl::Continue)
    }

    fn update_objects(&mut self, _dt: f32) -> Result<()> {
        self.step();
        Ok(())
    }

    fn render(&mut self, canvas: &mut Canvas) -> Result<()> {
        canvas.fill_rect(self.wall_x(), 0, WALL_WIDTH, self.height, INK);

        canvas.fill_rect(
            RACKET_X - RACKET_WIDTH / 2,
            self.racket_y - RACKET_HEIGHT / 2,
            RACKET_WIDTH,
            RACKET_HEIGHT,
            INK,
        );

        canvas.fill_oval(self.ball_x, self.ball_y, BALL_SIZE, BALL_SIZE, INK);

        // Panel lines are centred on the panel's middle column.
        let center = self.width - SCOREBOARD_WIDTH / 2;
        let mut centred = |text: &str, baseline: i32| {
            let x = center - canvas.text_width(text) / 2;
            canvas.draw_text(text, x, baseline, INK);
        };
        centred("SCORE", SCORE_PADDING * 3);
        centred(&self.score.to_string(), SCORE_PADDING * 5);
        if self.best > 0 {
            centred(&format!("BEST {}", self.best), SCORE_PADDING * 8);
        }
        Ok(())
    }

    fn terminate(&mut self) {
        log::info!("final score {}, best {}", self.score, self.best.max(self.score));
    }
}
