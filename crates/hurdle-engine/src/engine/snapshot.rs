use serde::{Deserialize, Serialize};

use crate::core::geometry::{Circle, Rect};

use super::{
    agent::{Agent, AgentId, LifeState},
    hazard::Mount,
    world::{RunState, World},
};

/// Read-only view of a world, for renderers and run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub time: f64,
    pub fps: f32,
    pub run_state: RunState,
    pub ground: f32,
    pub roof: f32,
    pub obstacle: ObstacleView,
    pub gate: Option<GateView>,
    pub key: Option<KeyView>,
    pub passed: u64,
    pub agents: Vec<AgentView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub rect: Rect,
    pub mount: Mount,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateView {
    pub rect: Rect,
    pub is_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyView {
    pub rect: Rect,
    pub is_collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub circle: Circle,
    pub life: LifeState,
    pub score: u32,
    pub key_score: u32,
    pub has_key: bool,
}

impl From<&Agent> for AgentView {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            circle: agent.circle(),
            life: agent.life(),
            score: agent.score(),
            key_score: agent.key_score(),
            has_key: agent.has_key(),
        }
    }
}

impl World {
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        let hazards = self.hazards();
        let obstacle = hazards.obstacle();
        WorldSnapshot {
            tick: self.clock().ticks(),
            time: self.clock().now(),
            fps: self.clock().fps(),
            run_state: self.run_state(),
            ground: self.config().ground_height(),
            roof: self.config().roof_height(),
            obstacle: ObstacleView {
                rect: obstacle.rect(),
                mount: obstacle.mount(),
            },
            gate: hazards.gate().map(|gate| GateView {
                rect: gate.rect(obstacle),
                is_open: gate.is_open(),
            }),
            key: hazards.key().map(|key| KeyView {
                rect: key.rect(),
                is_collected: key.is_collected(),
            }),
            passed: hazards.passed(),
            agents: self.agents().iter().map(AgentView::from).collect(),
        }
    }
}

impl WorldSnapshot {
    /// Groups of living agents drawn on top of each other.
    ///
    /// Each group holds at least `min_size` agents whose hitboxes overlap the
    /// first agent of the group. Every agent belongs to at most one group.
    #[must_use]
    pub fn stacked_agents(&self, min_size: usize) -> Vec<Vec<AgentId>> {
        let alive: Vec<&AgentView> = self
            .agents
            .iter()
            .filter(|agent| agent.life.is_alive())
            .collect();
        let mut grouped = vec![false; alive.len()];
        let mut groups = vec![];
        for (i, head) in alive.iter().enumerate() {
            if grouped[i] {
                continue;
            }
            let members: Vec<usize> = (i..alive.len())
                .filter(|&j| !grouped[j] && head.circle.overlaps_circle(&alive[j].circle))
                .collect();
            if members.len() >= min_size.max(1) {
                for &j in &members {
                    grouped[j] = true;
                }
                groups.push(members.into_iter().map(|j| alive[j].id).collect());
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use crate::{Action, SimSeed, WorldConfig};

    use super::*;

    #[test]
    fn test_snapshot_mirrors_world() {
        let config = WorldConfig {
            keys_enabled: true,
            ..WorldConfig::default()
        };
        let mut world = World::new(config, 3, SimSeed::from_u64(6)).unwrap();
        world.tick(|_, _| Action::Idle);
        let snapshot = world.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.obstacle.rect.x, 1195.0);
        assert_eq!(snapshot.gate.unwrap().rect.x, 1195.0);
        assert!(!snapshot.key.unwrap().is_collected);
        assert!(snapshot.run_state.is_running());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"mount\""));
    }

    #[test]
    fn test_identical_agents_form_one_stack() {
        let world = World::new(WorldConfig::default(), 4, SimSeed::from_u64(6)).unwrap();
        let snapshot = world.snapshot();
        let groups = snapshot.stacked_agents(2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
        assert!(snapshot.stacked_agents(5).is_empty());
    }

    #[test]
    fn test_separated_agents_do_not_stack() {
        let mut world = World::new(WorldConfig::default(), 2, SimSeed::from_u64(6)).unwrap();
        for _ in 0..10 {
            world.tick(|agent, _| Action::from_jump(agent.id() == AgentId(0)));
        }
        // agent 0 is about 70 px above agent 1
        assert!(world.snapshot().stacked_agents(2).is_empty());
    }
}
