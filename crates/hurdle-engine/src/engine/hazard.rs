use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    config::WorldConfig,
    core::geometry::{Circle, Rect},
};

use super::seed::SimSeed;

/// Random stream id used for hazard generation.
const HAZARD_STREAM: u64 = 0;

/// Where an obstacle is attached.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Mount {
    /// Grows upwards from the ground; the opening is above it.
    Floor,
    /// Hangs down from the roof; the opening is below it.
    Ceiling,
}

/// The free vertical band next to an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    /// y coordinate of the upper bound (smaller y).
    pub top: f32,
    /// y coordinate of the lower bound (larger y).
    pub bottom: f32,
}

/// A scrolling obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    x: f32,
    width: f32,
    height: f32,
    mount: Mount,
    rect: Rect,
    opening: Opening,
}

impl Obstacle {
    /// Creates an obstacle at the right edge of the world.
    #[must_use]
    pub fn new(config: &WorldConfig, mount: Mount, height: f32) -> Self {
        let ground = config.ground_height();
        let roof = config.roof_height();
        let (top, opening) = match mount {
            Mount::Floor => (
                ground - height,
                Opening {
                    top: roof,
                    bottom: ground - height,
                },
            ),
            Mount::Ceiling => (
                roof,
                Opening {
                    top: roof + height,
                    bottom: ground,
                },
            ),
        };
        let x = config.width;
        Self {
            x,
            width: config.obstacle_width,
            height,
            mount,
            rect: Rect::new(x, top, config.obstacle_width, height),
            opening,
        }
    }

    /// Creates an obstacle with a random height and mount at the right edge.
    pub fn random<R>(config: &WorldConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let height = rng.random_range(config.obstacle_height_min..=config.obstacle_height_max);
        let mount = if rng.random_bool(0.5) {
            Mount::Floor
        } else {
            Mount::Ceiling
        };
        Self::new(config, mount, height)
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[must_use]
    pub fn mount(&self) -> Mount {
        self.mount
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub fn opening(&self) -> Opening {
        self.opening
    }

    /// The y coordinate of the obstacle edge that borders the opening.
    #[must_use]
    pub fn edge_y(&self) -> f32 {
        match self.mount {
            Mount::Floor => self.opening.bottom,
            Mount::Ceiling => self.opening.top,
        }
    }

    #[must_use]
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Whether the trailing edge has passed the left edge of the world.
    #[must_use]
    pub fn is_outside(&self) -> bool {
        self.trailing_edge() <= 0.0
    }

    fn shift(&mut self, dx: f32) {
        self.x += dx;
        self.rect.x = self.x;
    }
}

/// A barrier filling the opening of an obstacle until a key is collected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    is_open: bool,
}

impl Gate {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The gate occupies the opening of its obstacle.
    #[must_use]
    pub fn rect(&self, obstacle: &Obstacle) -> Rect {
        let opening = obstacle.opening();
        Rect::new(
            obstacle.x(),
            opening.top,
            obstacle.width(),
            opening.bottom - opening.top,
        )
    }
}

/// A pickup that lets the collecting agent pass through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key {
    rect: Rect,
    is_collected: bool,
}

impl Key {
    /// Spawns a key in the inner third of the world.
    pub fn random<R>(config: &WorldConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let x = rng.random_range(config.width / 3.0..2.0 * config.width / 3.0);
        let y = rng.random_range(config.height / 3.0..2.0 * config.height / 3.0);
        Self {
            rect: Rect::new(x, y, config.key_size, config.key_size),
            is_collected: false,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Set once any agent has picked the key up.
    #[must_use]
    pub fn is_collected(&self) -> bool {
        self.is_collected
    }

    /// Centre of the key box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            self.rect.x + self.rect.width / 2.0,
            self.rect.y + self.rect.height / 2.0,
        )
    }
}

/// Outcome of a fatal-collision test against the current hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Hit {
    Clear,
    Obstacle,
    Gate,
}

/// The single on-screen hazard: an obstacle plus an optional gate and key.
///
/// Obstacles scroll from right to left and are recycled in place as soon as
/// their trailing edge passes the left edge of the world.
#[derive(Debug, Clone)]
pub struct HazardStream {
    rng: Pcg32,
    obstacle: Obstacle,
    gate: Option<Gate>,
    key: Option<Key>,
    passed: u64,
}

impl HazardStream {
    #[must_use]
    pub fn new(config: &WorldConfig, seed: SimSeed) -> Self {
        let mut rng = seed.stream(HAZARD_STREAM);
        let obstacle = Obstacle::random(config, &mut rng);
        let mut this = Self {
            rng,
            obstacle,
            gate: None,
            key: None,
            passed: 0,
        };
        this.respawn_extras(config);
        this
    }

    /// Like [`Self::new`], but with a fixed first obstacle.
    #[must_use]
    pub fn with_obstacle(config: &WorldConfig, seed: SimSeed, obstacle: Obstacle) -> Self {
        let mut this = Self::new(config, seed);
        this.obstacle = obstacle;
        this
    }

    #[must_use]
    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    #[must_use]
    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref()
    }

    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Number of obstacles that scrolled out of the world so far.
    #[must_use]
    pub fn passed(&self) -> u64 {
        self.passed
    }

    /// Scrolls the hazard one tick to the left.
    ///
    /// Returns `true` when the obstacle left the world during this tick and
    /// was recycled at the right edge.
    pub fn advance(&mut self, config: &WorldConfig) -> bool {
        let speed = config.obstacle_speed;
        self.obstacle.shift(-speed);
        if let Some(key) = &mut self.key {
            key.rect.x -= speed;
        }
        if self.obstacle.is_outside() {
            self.passed += 1;
            self.obstacle = Obstacle::random(config, &mut self.rng);
            self.respawn_extras(config);
            return true;
        }
        false
    }

    /// Starts over with a fresh obstacle; the pass counter is cleared.
    pub fn reset(&mut self, config: &WorldConfig) {
        self.passed = 0;
        self.obstacle = Obstacle::random(config, &mut self.rng);
        self.respawn_extras(config);
    }

    fn respawn_extras(&mut self, config: &WorldConfig) {
        if config.keys_enabled {
            self.gate = Some(Gate { is_open: false });
            self.key = Some(Key::random(config, &mut self.rng));
        } else {
            self.gate = None;
            self.key = None;
        }
    }

    /// Whether `circle` touches the key box.
    #[must_use]
    pub fn touches_key(&self, circle: &Circle) -> bool {
        self.key.is_some_and(|key| circle.overlaps_rect(&key.rect))
    }

    #[cfg(test)]
    pub(crate) fn place_key(&mut self, x: f32, y: f32) {
        if let Some(key) = &mut self.key {
            key.rect.x = x;
            key.rect.y = y;
        }
    }

    /// Marks the key as collected and opens the gate.
    pub fn collect_key(&mut self) {
        if let Some(key) = &mut self.key {
            key.is_collected = true;
        }
        if let Some(gate) = &mut self.gate {
            gate.is_open = true;
        }
    }

    /// Fatal-collision test for an agent hitbox.
    ///
    /// Without a key, a gated obstacle blocks its whole column. With an open
    /// gate and a key only the obstacle itself collides.
    #[must_use]
    pub fn hit(&self, circle: &Circle, has_key: bool) -> Hit {
        match self.gate {
            Some(gate) if !(gate.is_open && has_key) => {
                if circle.overlaps_column(self.obstacle.x, self.obstacle.width) {
                    if circle.overlaps_rect(&self.obstacle.rect) {
                        Hit::Obstacle
                    } else {
                        Hit::Gate
                    }
                } else {
                    Hit::Clear
                }
            }
            _ => {
                if circle.overlaps_rect(&self.obstacle.rect) {
                    Hit::Obstacle
                } else {
                    Hit::Clear
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    mod obstacle_geometry {
        use super::*;

        #[test]
        fn test_floor_obstacle() {
            let obstacle = Obstacle::new(&config(), Mount::Floor, 200.0);
            assert_eq!(obstacle.x(), 1200.0);
            assert_eq!(obstacle.rect(), Rect::new(1200.0, 450.0, 100.0, 200.0));
            assert_eq!(obstacle.edge_y(), 450.0);
            assert_eq!(
                obstacle.opening(),
                Opening {
                    top: 50.0,
                    bottom: 450.0
                }
            );
        }

        #[test]
        fn test_ceiling_obstacle() {
            let obstacle = Obstacle::new(&config(), Mount::Ceiling, 250.0);
            assert_eq!(obstacle.rect(), Rect::new(1200.0, 50.0, 100.0, 250.0));
            assert_eq!(obstacle.edge_y(), 300.0);
            assert_eq!(
                obstacle.opening(),
                Opening {
                    top: 300.0,
                    bottom: 650.0
                }
            );
        }

        #[test]
        fn test_gate_fills_opening() {
            let obstacle = Obstacle::new(&config(), Mount::Floor, 200.0);
            let gate = Gate { is_open: false };
            assert_eq!(
                gate.rect(&obstacle),
                Rect::new(1200.0, 50.0, 100.0, 400.0)
            );
        }

        #[test]
        fn test_random_heights_in_range() {
            let config = config();
            let mut rng = SimSeed::from_u64(1).stream(9);
            for _ in 0..1000 {
                let obstacle = Obstacle::random(&config, &mut rng);
                assert!((200.0..=300.0).contains(&obstacle.height()));
            }
        }
    }

    mod recycling {
        use super::*;

        #[test]
        fn test_x_never_below_negative_width() {
            let config = config();
            let mut stream = HazardStream::new(&config, SimSeed::from_u64(5));
            let mut recycles = 0;
            for _ in 0..5000 {
                let recycled = stream.advance(&config);
                let obstacle = stream.obstacle();
                assert!(obstacle.x() >= -obstacle.width());
                if recycled {
                    recycles += 1;
                    assert_eq!(obstacle.x(), config.width);
                }
            }
            assert_eq!(recycles, stream.passed());
            // 1300 px at 5 px per tick
            assert_eq!(recycles, 5000 / 260);
        }

        #[test]
        fn test_recycle_happens_exactly_at_left_edge() {
            let config = config();
            let mut stream = HazardStream::new(&config, SimSeed::from_u64(5));
            for _ in 0..259 {
                assert!(!stream.advance(&config));
            }
            assert_eq!(stream.obstacle().trailing_edge(), 5.0);
            assert!(stream.advance(&config));
        }

        #[test]
        fn test_reset_clears_pass_counter() {
            let config = config();
            let mut stream = HazardStream::new(&config, SimSeed::from_u64(5));
            for _ in 0..600 {
                stream.advance(&config);
            }
            assert_eq!(stream.passed(), 2);
            stream.reset(&config);
            assert_eq!(stream.passed(), 0);
            assert_eq!(stream.obstacle().x(), config.width);
        }
    }

    mod gates_and_keys {
        use super::*;

        fn keyed_config() -> WorldConfig {
            WorldConfig {
                keys_enabled: true,
                ..WorldConfig::default()
            }
        }

        fn stream_at(x: f32) -> HazardStream {
            let config = keyed_config();
            let mut obstacle = Obstacle::new(&config, Mount::Floor, 100.0);
            obstacle.shift(x - obstacle.x());
            HazardStream::with_obstacle(&config, SimSeed::from_u64(2), obstacle)
        }

        #[test]
        fn test_key_spawns_in_inner_third() {
            let config = keyed_config();
            let mut rng = SimSeed::from_u64(8).stream(3);
            for _ in 0..500 {
                let key = Key::random(&config, &mut rng);
                assert!((400.0..800.0).contains(&key.rect().x));
                assert!(!key.is_collected());
            }
        }

        #[test]
        fn test_closed_gate_blocks_whole_column() {
            let stream = stream_at(80.0);
            // far above the obstacle, inside the gate
            let circle = Circle::new(70.0, 100.0, 20.0);
            assert_eq!(stream.hit(&circle, false), Hit::Gate);
            assert_eq!(stream.hit(&circle, true), Hit::Gate);
        }

        #[test]
        fn test_open_gate_needs_key() {
            let mut stream = stream_at(80.0);
            stream.collect_key();
            assert!(stream.gate().unwrap().is_open());
            assert!(stream.key().unwrap().is_collected());
            let circle = Circle::new(70.0, 100.0, 20.0);
            assert_eq!(stream.hit(&circle, false), Hit::Gate);
            assert_eq!(stream.hit(&circle, true), Hit::Clear);
            let low = Circle::new(70.0, 600.0, 20.0);
            assert_eq!(stream.hit(&low, true), Hit::Obstacle);
        }

        #[test]
        fn test_key_scrolls_and_respawns_with_obstacle() {
            let config = keyed_config();
            let mut stream = HazardStream::new(&config, SimSeed::from_u64(4));
            let key_x = stream.key().unwrap().rect().x;
            stream.advance(&config);
            assert_eq!(stream.key().unwrap().rect().x, key_x - 5.0);
            stream.collect_key();
            while !stream.advance(&config) {}
            assert!(!stream.key().unwrap().is_collected());
            assert!(!stream.gate().unwrap().is_open());
        }

        #[test]
        fn test_no_extras_without_keys() {
            let config = config();
            let stream = HazardStream::new(&config, SimSeed::from_u64(4));
            assert!(stream.gate().is_none());
            assert!(stream.key().is_none());
            assert!(!stream.touches_key(&Circle::new(500.0, 300.0, 1000.0)));
        }
    }
}
