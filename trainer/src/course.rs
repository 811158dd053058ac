//! A headless obstacle course.
//!
//! The runner stands at a fixed horizontal position while obstacles
//! scroll towards it at an increasing speed. Heights are measured
//! upwards from the ground.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub const SENSOR_COUNT: usize = 6;

const COURSE_WIDTH: f32 = 1024.0;
const RUNNER_X: f32 = 100.0;
const RUNNER_WIDTH: f32 = 80.0;
const STANDING_HEIGHT: f32 = 90.0;
const DUCKING_HEIGHT: f32 = 55.0;
const JUMP_VELOCITY: f32 = 8.5;
const JUMP_SCALE: f32 = 4.0;
const GRAVITY: f32 = 0.8;
const AIRBORNE_ALTITUDE: f32 = 60.0;
const AIRBORNE_HEIGHT: f32 = 40.0;
const AIRBORNE_WIDTH: f32 = 90.0;
/// Highest point of a jump, used to scale the elevation sensor.
const JUMP_APEX: f32 = 200.0;
const OBSTACLE_CEILING: f32 = AIRBORNE_ALTITUDE + AIRBORNE_HEIGHT;

/// Parameters of every course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseConfig {
    /// A run ends after this many ticks even if the runner survives.
    pub max_ticks: u32,
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Speed gained every 100 ticks.
    pub acceleration: f32,
    /// Probability that a spawned obstacle flies.
    pub airborne_chance: f64,
}

impl Default for CourseConfig {
    fn default() -> Self {
        CourseConfig {
            max_ticks: 3000,
            initial_speed: 20.0,
            max_speed: 50.0,
            acceleration: 0.1,
            airborne_chance: 0.3,
        }
    }
}

/// What the runner does on a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Run,
    Jump,
    Duck,
}

impl Action {
    /// Actions in the order of the network outputs.
    pub const ALL: [Action; 3] = [Action::Run, Action::Jump, Action::Duck];
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ObstacleKind {
    Ground,
    Airborne,
}

#[derive(Clone, Copy, Debug)]
struct Obstacle {
    kind: ObstacleKind,
    x: f32,
    width: f32,
    bottom: f32,
    top: f32,
    cleared: bool,
}

impl Obstacle {
    fn spawn<R: Rng + ?Sized>(config: &CourseConfig, rng: &mut R) -> Obstacle {
        if rng.gen_bool(config.airborne_chance) {
            Obstacle {
                kind: ObstacleKind::Airborne,
                x: COURSE_WIDTH,
                width: AIRBORNE_WIDTH,
                bottom: AIRBORNE_ALTITUDE,
                top: AIRBORNE_ALTITUDE + AIRBORNE_HEIGHT,
                cleared: false,
            }
        } else {
            Obstacle {
                kind: ObstacleKind::Ground,
                x: COURSE_WIDTH,
                width: rng.gen_range(30.0..70.0),
                bottom: 0.0,
                top: rng.gen_range(50.0..95.0),
                cleared: false,
            }
        }
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Runner {
    elevation: f32,
    velocity: f32,
    jumping: bool,
    ducking: bool,
}

impl Runner {
    fn act(&mut self, action: Action) {
        match action {
            Action::Jump if !self.jumping => {
                self.jumping = true;
                self.ducking = false;
                self.velocity = JUMP_VELOCITY;
            }
            Action::Duck if !self.jumping => self.ducking = true,
            _ if !self.jumping => self.ducking = false,
            _ => {}
        }
        if self.jumping {
            self.elevation += self.velocity * JUMP_SCALE;
            self.velocity -= GRAVITY;
            if self.elevation <= 0.0 {
                *self = Runner::default();
            }
        }
    }

    fn height(&self) -> f32 {
        if self.ducking {
            DUCKING_HEIGHT
        } else {
            STANDING_HEIGHT
        }
    }

    fn hits(&self, obstacle: &Obstacle) -> bool {
        let overlaps_x = obstacle.x < RUNNER_X + RUNNER_WIDTH && obstacle.right() > RUNNER_X;
        let overlaps_y =
            obstacle.bottom < self.elevation + self.height() && obstacle.top > self.elevation;
        overlaps_x && overlaps_y
    }
}

/// Outcome of a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub ticks: u32,
    pub cleared: u32,
    pub crashed: bool,
}

/// A course whose obstacles are generated from a seed,
/// so every runner faces the same sequence.
#[derive(Debug)]
pub struct Course<'a> {
    config: &'a CourseConfig,
    rng: ChaCha8Rng,
    runner: Runner,
    obstacle: Option<Obstacle>,
    speed: f32,
    run: Run,
}

impl<'a> Course<'a> {
    pub fn new(config: &'a CourseConfig, seed: u64) -> Course<'a> {
        Course {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            runner: Runner::default(),
            obstacle: None,
            speed: config.initial_speed,
            run: Run::default(),
        }
    }

    /// Returns the normalized readings fed to the controller:
    /// distance to the next obstacle, its top, whether it flies,
    /// course speed, runner elevation, and vertical velocity.
    pub fn sensors(&self) -> [f32; SENSOR_COUNT] {
        let (distance, height, airborne) = match &self.obstacle {
            Some(o) => (
                (o.x - RUNNER_X) / COURSE_WIDTH,
                o.top / OBSTACLE_CEILING,
                if o.kind == ObstacleKind::Airborne { 1.0 } else { 0.0 },
            ),
            None => (1.0, 0.0, 0.0),
        };
        [
            distance,
            height,
            airborne,
            self.speed / self.config.max_speed,
            self.runner.elevation / JUMP_APEX,
            self.runner.velocity / JUMP_VELOCITY,
        ]
    }

    /// Advances the course by one tick. Returns `false`
    /// once the run is over.
    pub fn step(&mut self, action: Action) -> bool {
        if self.is_over() {
            return false;
        }
        self.runner.act(action);

        let config = self.config;
        let rng = &mut self.rng;
        let obstacle = self
            .obstacle
            .get_or_insert_with(|| Obstacle::spawn(config, rng));
        obstacle.x -= self.speed;
        if self.runner.hits(obstacle) {
            self.run.crashed = true;
        } else if !obstacle.cleared && obstacle.right() < RUNNER_X {
            obstacle.cleared = true;
            self.run.cleared += 1;
        }
        if obstacle.right() < 0.0 {
            self.obstacle = None;
        }

        self.run.ticks += 1;
        if self.run.ticks % 100 == 0 {
            self.speed = (self.speed + self.config.acceleration).min(self.config.max_speed);
        }
        !self.is_over()
    }

    pub fn is_over(&self) -> bool {
        self.run.crashed || self.run.ticks >= self.config.max_ticks
    }

    /// Runs the course to the end, asking `decide` for an
    /// action on every tick.
    pub fn complete<F, E>(mut self, mut decide: F) -> Result<Run, E>
    where
        F: FnMut(&[f32; SENSOR_COUNT]) -> Result<Action, E>,
    {
        while !self.is_over() {
            let action = decide(&self.sensors())?;
            self.step(action);
        }
        Ok(self.run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    fn config() -> CourseConfig {
        CourseConfig {
            max_ticks: 500,
            ..CourseConfig::default()
        }
    }

    fn always(action: Action) -> impl FnMut(&[f32; SENSOR_COUNT]) -> Result<Action, Infallible> {
        move |_| Ok(action)
    }

    #[test]
    fn idle_runner_crashes() {
        let config = config();
        let run = Course::new(&config, 0).complete(always(Action::Run)).unwrap();
        assert!(run.crashed);
        assert!(run.ticks < config.max_ticks);
        assert_eq!(run.cleared, 0);
    }

    #[test]
    fn courses_are_reproducible() {
        let config = config();
        let a = Course::new(&config, 42).complete(always(Action::Duck)).unwrap();
        let b = Course::new(&config, 42).complete(always(Action::Duck)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ducking_passes_under_airborne_obstacles() {
        let config = CourseConfig {
            airborne_chance: 1.0,
            ..config()
        };
        let run = Course::new(&config, 7).complete(always(Action::Duck)).unwrap();
        assert!(!run.crashed);
        assert_eq!(run.ticks, config.max_ticks);
        assert!(run.cleared > 0);
    }

    #[test]
    fn timed_jumps_clear_ground_obstacles() {
        let config = CourseConfig {
            airborne_chance: 0.0,
            ..config()
        };
        let jump_when_close = |sensors: &[f32; SENSOR_COUNT]| {
            let distance = sensors[0] * COURSE_WIDTH;
            let speed = sensors[3] * config.max_speed;
            Ok::<_, Infallible>(if distance < 12.0 * speed {
                Action::Jump
            } else {
                Action::Run
            })
        };
        let run = Course::new(&config, 3).complete(jump_when_close).unwrap();
        assert!(run.cleared >= 3);
    }

    #[test]
    fn jump_returns_to_ground() {
        let mut runner = Runner::default();
        runner.act(Action::Jump);
        assert!(runner.jumping);
        let mut ticks = 1;
        while runner.jumping {
            runner.act(Action::Duck);
            ticks += 1;
            assert!(runner.elevation < JUMP_APEX);
        }
        assert_eq!(ticks, 23);
        assert_eq!(runner.elevation, 0.0);
        assert!(!runner.ducking);
    }

    #[test]
    fn sensors_are_normalized() {
        let config = config();
        let mut course = Course::new(&config, 1);
        assert_eq!(course.sensors(), [1.0, 0.0, 0.0, 0.4, 0.0, 0.0]);
        course.step(Action::Jump);
        let sensors = course.sensors();
        assert!(sensors.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(sensors[4] > 0.0);
    }

    #[test]
    fn finished_course_does_not_advance() {
        let config = CourseConfig {
            max_ticks: 5,
            ..config()
        };
        let mut course = Course::new(&config, 0);
        while course.step(Action::Run) {}
        assert_eq!(course.run.ticks, 5);
        assert!(!course.step(Action::Run));
        assert_eq!(course.run.ticks, 5);
    }
}
