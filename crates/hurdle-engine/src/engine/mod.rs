//! Fixed-tick simulation of agents jumping over scrolling obstacles.
//!
//! - [`World`] - Owns the clock, the hazard stream and every agent
//! - [`HazardStream`] - The single scrolling obstacle with its optional gate and key
//! - [`Agent`] - One competitor and its life cycle
//! - [`SimClock`] - Tick counter and simulated time
//! - [`SimSeed`] - Seed for deterministic runs
//! - [`ManualSession`] - A single agent driven by jump requests
//!
//! # Tick Flow
//!
//! 1. The clock advances by `1 / fps` seconds
//! 2. The obstacle scrolls left and is recycled once it leaves the world
//! 3. Every living agent senses the hazard, decides, and integrates
//! 4. Passes, key pickups and fatal collisions are resolved
//!
//! A generation is over when every agent has finished its death animation.
//!
//! # Example
//!
//! ```
//! use hurdle_engine::{Action, SimSeed, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default(), 1, SimSeed::from_u64(0)).unwrap();
//! let report = world.tick(|_agent, sensed| Action::from_jump(sensed.dx < 60.0));
//! assert!(report.deaths.is_empty());
//! ```

pub use self::{agent::*, clock::*, hazard::*, manual::*, seed::*, snapshot::*, world::*};

mod agent;
mod clock;
mod hazard;
mod manual;
mod seed;
mod snapshot;
mod world;
