//! Energy redistribution between siblings of a fire group
//!
//! A child sitting near its own energy cap hands part of the energy above the
//! cap to siblings with spare capacity, proportional to their headroom. The
//! transfer is a pure redistribution: the donor loses exactly what the
//! receivers gain. Only a fraction of the overflow moves per tick so a single
//! hot spot cannot ignite the whole structure at once.

use serde::{Deserialize, Serialize};

/// Energy snapshot of one child taken after its own tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSlot {
    pub energy: f32,
    pub max_energy: f32,
    /// Burnable and not destroyed; ineligible slots neither give nor take
    pub eligible: bool,
}

impl BalanceSlot {
    fn headroom(&self, energy: f32) -> f32 {
        (self.max_energy - energy).max(0.0)
    }
}

/// Result of one balancing pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalancePlan {
    /// Energy change per slot, same order as the input
    pub deltas: Vec<f32>,
    /// Total energy moved between slots
    pub transferred: f32,
}

impl BalancePlan {
    /// Whether nothing moves this tick
    pub fn is_noop(&self) -> bool {
        self.transferred <= 0.0
    }
}

/// Capped-overflow balancing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalancer {
    /// Energy fraction at which a slot counts as capped (0-1)
    pub cap_pct: f32,
    /// Share of a donor's overflow moved per pass (0-1)
    pub maximum_balancing_percent: f32,
}

impl EnergyBalancer {
    pub fn new(cap_pct: f32, maximum_balancing_percent: f32) -> Self {
        Self {
            cap_pct: cap_pct.clamp(0.0, 1.0),
            maximum_balancing_percent: maximum_balancing_percent.clamp(0.0, 1.0),
        }
    }

    /// Compute transfers for one tick
    ///
    /// No capped slot or no headroom anywhere yields an all-zero plan.
    pub fn balance(&self, slots: &[BalanceSlot]) -> BalancePlan {
        let mut plan = BalancePlan {
            deltas: vec![0.0; slots.len()],
            transferred: 0.0,
        };
        if self.maximum_balancing_percent <= 0.0 {
            return plan;
        }

        let mut energies: Vec<f32> = slots.iter().map(|slot| slot.energy).collect();
        let is_capped = |slot: &BalanceSlot, energy: f32| {
            slot.eligible && slot.max_energy > 0.0 && energy >= self.cap_pct * slot.max_energy
        };

        let donors: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(i, slot)| is_capped(slot, energies[*i]))
            .map(|(i, _)| i)
            .collect();
        if donors.is_empty() {
            return plan;
        }

        for &donor in &donors {
            let overflow = energies[donor] - self.cap_pct * slots[donor].max_energy;
            if overflow <= 0.0 {
                continue;
            }

            let receivers: Vec<(usize, f32)> = slots
                .iter()
                .enumerate()
                .filter(|(i, slot)| {
                    *i != donor && slot.eligible && !is_capped(slot, energies[*i])
                })
                .map(|(i, slot)| (i, slot.headroom(energies[i])))
                .filter(|(_, headroom)| *headroom > 0.0)
                .collect();
            let total_headroom: f32 = receivers.iter().map(|(_, headroom)| headroom).sum();
            if total_headroom <= 0.0 {
                continue;
            }

            let budget = (overflow * self.maximum_balancing_percent).min(total_headroom);
            let mut moved = 0.0;
            for (i, headroom) in receivers {
                let share = (budget * headroom / total_headroom).min(headroom);
                energies[i] += share;
                plan.deltas[i] += share;
                moved += share;
            }
            energies[donor] -= moved;
            plan.deltas[donor] -= moved;
            plan.transferred += moved;
        }

        plan
    }
}
