//! Cycle layout and height → phase resolution.
//!
//! `PeriodService::is_in_phase` is consulted by every OP_RETURN validator,
//! so it sits on the consensus-critical path: it must be a pure function of
//! (height, cycle layout) and nothing else.

use serde::{Deserialize, Serialize};

use bsq_types::NetworkId;

use crate::phase::DaoPhase;

/// Ordered phase layout of one DAO cycle, with per-phase durations in blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    phases: Vec<(DaoPhase, u32)>,
}

impl Cycle {
    /// The cycle layout used on the given network.
    pub fn for_network(network: NetworkId) -> Self {
        let phases = match network {
            NetworkId::Mainnet => vec![
                (DaoPhase::Proposal, 3600),
                (DaoPhase::BreakA, 150),
                (DaoPhase::BlindVote, 600),
                (DaoPhase::BreakB, 10),
                (DaoPhase::VoteReveal, 300),
                (DaoPhase::BreakC, 10),
                (DaoPhase::Result, 10),
            ],
            NetworkId::Testnet => vec![
                (DaoPhase::Proposal, 380),
                (DaoPhase::BreakA, 10),
                (DaoPhase::BlindVote, 300),
                (DaoPhase::BreakB, 10),
                (DaoPhase::VoteReveal, 200),
                (DaoPhase::BreakC, 10),
                (DaoPhase::Result, 10),
            ],
            NetworkId::Regtest => vec![
                (DaoPhase::Proposal, 20),
                (DaoPhase::BreakA, 2),
                (DaoPhase::BlindVote, 10),
                (DaoPhase::BreakB, 2),
                (DaoPhase::VoteReveal, 10),
                (DaoPhase::BreakC, 2),
                (DaoPhase::Result, 2),
            ],
        };
        Self { phases }
    }

    /// A custom layout (tests and simulations).
    pub fn custom(phases: Vec<(DaoPhase, u32)>) -> Self {
        assert!(
            phases.iter().all(|(_, d)| *d > 0),
            "phase durations must be non-zero"
        );
        Self { phases }
    }

    /// Total cycle duration in blocks.
    pub fn duration(&self) -> u32 {
        self.phases.iter().map(|(_, d)| d).sum()
    }

    /// Duration of a single phase, 0 if the phase is absent from the layout.
    pub fn phase_duration(&self, phase: DaoPhase) -> u32 {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, d)| *d)
            .unwrap_or(0)
    }

    /// Offset in blocks from the cycle start to the first block of `phase`.
    pub fn phase_offset(&self, phase: DaoPhase) -> Option<u32> {
        let mut offset = 0;
        for (p, d) in &self.phases {
            if *p == phase {
                return Some(offset);
            }
            offset += d;
        }
        None
    }

    /// Resolve a block offset inside the cycle to its phase.
    fn phase_at_offset(&self, offset: u32) -> DaoPhase {
        debug_assert!(offset < self.duration());
        let mut cursor = 0;
        for (phase, duration) in &self.phases {
            cursor += duration;
            if offset < cursor {
                return *phase;
            }
        }
        // offset is always < duration(), so the loop always returns.
        unreachable!("offset beyond cycle duration")
    }
}

/// Resolves block heights to cycles and phases.
#[derive(Clone, Debug)]
pub struct PeriodService {
    genesis_height: u32,
    cycle: Cycle,
}

impl PeriodService {
    pub fn new(genesis_height: u32, cycle: Cycle) -> Self {
        Self {
            genesis_height,
            cycle,
        }
    }

    /// Period service with the network's default cycle layout and genesis.
    pub fn for_network(network: NetworkId) -> Self {
        Self::new(network.genesis_height(), Cycle::for_network(network))
    }

    pub fn genesis_height(&self) -> u32 {
        self.genesis_height
    }

    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    /// Zero-based index of the cycle containing `height`, `None` below
    /// genesis.
    pub fn cycle_index(&self, height: u32) -> Option<u32> {
        if height < self.genesis_height {
            return None;
        }
        Some((height - self.genesis_height) / self.cycle.duration())
    }

    /// The phase active at `height`, `None` below genesis.
    pub fn phase_at(&self, height: u32) -> Option<DaoPhase> {
        if height < self.genesis_height {
            return None;
        }
        let offset = (height - self.genesis_height) % self.cycle.duration();
        Some(self.cycle.phase_at_offset(offset))
    }

    /// Whether `height` falls inside `phase` of its cycle.
    pub fn is_in_phase(&self, height: u32, phase: DaoPhase) -> bool {
        self.phase_at(height) == Some(phase)
    }

    /// First block height of cycle `index`.
    pub fn first_height_of_cycle(&self, index: u32) -> u32 {
        self.genesis_height + index * self.cycle.duration()
    }

    /// First block height of `phase` within cycle `index`, `None` if the
    /// phase is absent from the layout.
    pub fn first_height_of_phase(&self, index: u32, phase: DaoPhase) -> Option<u32> {
        self.cycle
            .phase_offset(phase)
            .map(|offset| self.first_height_of_cycle(index) + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_service() -> PeriodService {
        // 10 + 2 + 5 + 2 + 5 + 2 + 2 = 28 blocks per cycle, genesis at 100
        let cycle = Cycle::custom(vec![
            (DaoPhase::Proposal, 10),
            (DaoPhase::BreakA, 2),
            (DaoPhase::BlindVote, 5),
            (DaoPhase::BreakB, 2),
            (DaoPhase::VoteReveal, 5),
            (DaoPhase::BreakC, 2),
            (DaoPhase::Result, 2),
        ]);
        PeriodService::new(100, cycle)
    }

    #[test]
    fn genesis_block_starts_the_proposal_phase() {
        let service = short_service();
        assert_eq!(service.phase_at(100), Some(DaoPhase::Proposal));
        assert!(service.is_in_phase(100, DaoPhase::Proposal));
    }

    #[test]
    fn pre_genesis_heights_have_no_phase() {
        let service = short_service();
        assert_eq!(service.phase_at(99), None);
        assert!(!service.is_in_phase(99, DaoPhase::Proposal));
        assert_eq!(service.cycle_index(0), None);
    }

    #[test]
    fn phase_boundaries_are_exact() {
        let service = short_service();
        // Proposal covers offsets 0..10
        assert!(service.is_in_phase(109, DaoPhase::Proposal));
        assert!(service.is_in_phase(110, DaoPhase::BreakA));
        // BlindVote covers offsets 12..17
        assert!(service.is_in_phase(112, DaoPhase::BlindVote));
        assert!(service.is_in_phase(116, DaoPhase::BlindVote));
        assert!(service.is_in_phase(117, DaoPhase::BreakB));
        // VoteReveal covers offsets 19..24
        assert!(service.is_in_phase(119, DaoPhase::VoteReveal));
        assert!(service.is_in_phase(123, DaoPhase::VoteReveal));
        assert!(service.is_in_phase(124, DaoPhase::BreakC));
    }

    #[test]
    fn phases_repeat_every_cycle() {
        let service = short_service();
        let duration = service.cycle().duration();
        assert_eq!(duration, 28);
        for height in 100..(100 + duration) {
            let next_cycle = height + duration;
            assert_eq!(service.phase_at(height), service.phase_at(next_cycle));
        }
        assert_eq!(service.cycle_index(100 + duration), Some(1));
        assert_eq!(service.first_height_of_cycle(1), 128);
    }

    #[test]
    fn first_height_of_phase_matches_offsets() {
        let service = short_service();
        assert_eq!(
            service.first_height_of_phase(0, DaoPhase::BlindVote),
            Some(112)
        );
        assert_eq!(
            service.first_height_of_phase(1, DaoPhase::Proposal),
            Some(128)
        );
    }

    #[test]
    fn network_layouts_have_sane_shape() {
        for network in [NetworkId::Mainnet, NetworkId::Testnet, NetworkId::Regtest] {
            let cycle = Cycle::for_network(network);
            assert!(cycle.duration() > 0);
            assert!(cycle.phase_duration(DaoPhase::Proposal) > 0);
            assert!(cycle.phase_offset(DaoPhase::Result).is_some());
        }
    }
}
