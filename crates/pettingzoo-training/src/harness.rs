//! Scores every agent of a generation against its own simulation.
//!
//! # Evaluation loop
//!
//! Each agent is run until the simulation reports a terminal outcome:
//!
//! 1. The network is only re-evaluated on the first step and whenever the
//!    player moved to another tile; otherwise the previous buttons are held.
//! 2. After every step the fitness is compared to the best seen so far. A run
//!    that fails to improve for more than [`AGENT_FITNESS_TIMEOUT`] consecutive
//!    steps is forced to [`DeathType::TimedOut`].
//! 3. The final fitness and death type are written back to the agent.

use std::num::NonZeroUsize;

use pettingzoo_engine::{ButtonState, DeathType, Simulation, StepOutcome, UPDATES_PS};
use pettingzoo_genome::{Network, Topology};

use crate::{Agent, parallel};

/// Steps without a fitness improvement before a run is timed out (6 simulated seconds).
pub const AGENT_FITNESS_TIMEOUT: u32 = UPDATES_PS * 6;

/// Result of running one agent to termination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub fitness: f32,
    pub death_type: DeathType,
    pub steps: u64,
}

/// Per-worker scratch space for running agents.
#[derive(Debug, Clone)]
pub struct AgentRunner {
    network: Network,
    observation: Vec<f32>,
}

impl AgentRunner {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            network: Network::new(topology),
            observation: vec![0.0; topology.input_len()],
        }
    }

    /// Runs `agent` on `sim` until the run ends.
    pub fn run<S>(&mut self, agent: &Agent, sim: &mut S) -> Evaluation
    where
        S: Simulation,
    {
        let topology = self.network.topology();
        let (in_h, in_w) = (usize::from(topology.in_h), usize::from(topology.in_w));

        let mut idle = 0;
        let mut best = f32::NEG_INFINITY;
        let mut last_tile = sim.tile_position();
        let mut needs_update = true;
        let mut buttons = ButtonState::default();
        let mut steps = 0;

        loop {
            if needs_update {
                sim.observe(in_h, in_w, &mut self.observation);
                buttons = agent.evaluate(&mut self.network, &self.observation);
            }

            let mut outcome = sim.step(buttons);
            steps += 1;

            let tile = sim.tile_position();
            needs_update = tile != last_tile;
            last_tile = tile;

            let fitness = sim.fitness();
            if fitness > best {
                idle = 0;
                best = fitness;
            } else {
                idle += 1;
            }
            if idle > AGENT_FITNESS_TIMEOUT {
                outcome = StepOutcome::TimedOut;
            }

            if outcome.is_terminal() {
                return Evaluation {
                    fitness,
                    death_type: outcome.death_type(),
                    steps,
                };
            }
        }
    }
}

/// Evaluates every agent in parallel, each against a fresh simulation from `new_sim`.
///
/// Results are written back to the agents by index and also returned in
/// population order.
pub fn evaluate_generation<S, F>(
    agents: &mut [Agent],
    topology: Topology,
    workers: NonZeroUsize,
    new_sim: F,
) -> Vec<Evaluation>
where
    S: Simulation,
    F: Fn() -> S + Sync,
{
    let mut results: Vec<(&mut Agent, Option<Evaluation>)> =
        agents.iter_mut().map(|agent| (agent, None)).collect();
    parallel::for_each_mut_with(
        &mut results,
        workers,
        || AgentRunner::new(topology),
        |runner, _, (agent, result)| {
            let mut sim = new_sim();
            let evaluation = runner.run(agent, &mut sim);
            agent.record_outcome(evaluation.fitness, evaluation.death_type);
            *result = Some(evaluation);
        },
    );
    results.into_iter().filter_map(|(_, result)| result).collect()
}
