//! Jump success rate across generations.
//!
//! For one agent id over a window of generations:
//!
//! ```text
//! success_rate = 1 / (1 + loss_penalty · deaths / total_score)
//! ```
//!
//! and `0` when the agent passed no obstacle in the window. The rate is an
//! observability metric; it never feeds back into selection.

use std::collections::BTreeMap;

use hurdle_engine::AgentId;
use hurdle_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

/// What one agent id did in one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub score: u32,
    pub deaths: u32,
}

/// Per-agent rounds of every recorded generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessTracker {
    generations: usize,
    rounds: BTreeMap<AgentId, Vec<Round>>,
}

impl SuccessTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded generations.
    #[must_use]
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Records one finished generation.
    ///
    /// `scores` holds each agent's pass score and `deaths` one entry per
    /// death reported during the generation.
    pub fn record_generation<I>(&mut self, scores: I, deaths: &[AgentId])
    where
        I: IntoIterator<Item = (AgentId, u32)>,
    {
        for (id, score) in scores {
            let deaths = deaths.iter().filter(|&&dead| dead == id).count();
            let round = Round {
                score,
                deaths: u32::try_from(deaths).unwrap_or(u32::MAX),
            };
            self.rounds.entry(id).or_default().push(round);
        }
        self.generations += 1;
    }

    /// Success rate of one agent id over the last `window` generations, or
    /// over all generations with `None`.
    ///
    /// Returns `None` for an unknown id or while fewer than `window`
    /// generations have been recorded.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_engine::AgentId;
    /// use hurdle_training::success::SuccessTracker;
    ///
    /// let mut tracker = SuccessTracker::new();
    /// tracker.record_generation([(AgentId(0), 4)], &[AgentId(0)]);
    /// assert_eq!(tracker.success_rate(AgentId(0), None, 1.0), Some(0.8));
    /// assert_eq!(tracker.success_rate(AgentId(0), Some(2), 1.0), None);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn success_rate(&self, id: AgentId, window: Option<usize>, loss_penalty: f32) -> Option<f32> {
        if window.is_some_and(|window| self.generations < window) {
            return None;
        }
        let rounds = self.rounds.get(&id)?;
        let start = window.map_or(0, |window| rounds.len().saturating_sub(window));
        let (score, deaths) = rounds[start..]
            .iter()
            .fold((0_u64, 0_u64), |(score, deaths), round| {
                (score + u64::from(round.score), deaths + u64::from(round.deaths))
            });
        if score == 0 {
            return Some(0.0);
        }
        Some(1.0 / (1.0 + loss_penalty * deaths as f32 / score as f32))
    }

    /// Statistics of the success rate across every tracked agent id.
    #[must_use]
    pub fn summary(&self, window: Option<usize>, loss_penalty: f32) -> Option<DescriptiveStats> {
        let rates = self
            .rounds
            .keys()
            .map(|&id| self.success_rate(id, window, loss_penalty))
            .collect::<Option<Vec<_>>>()?;
        DescriptiveStats::new(rates)
    }
}
