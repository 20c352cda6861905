//! Capacity-tier lookup over the table pool.
//!
//! The index does not own tables. It records, per tier, the positions of that
//! tier's tables inside the pool slice the engine owns, in table-number order,
//! and resolves them against the slice on every lookup.

use crate::slot::ResourceSlot;
use reseasy_core::{ReservationError, Result, Tier};
use std::collections::BTreeMap;

/// Groups tables by tier and finds free ones
#[derive(Debug, Clone)]
pub struct TierIndex {
    tiers: Vec<Tier>,
    by_tier: BTreeMap<Tier, Vec<usize>>,
}

impl TierIndex {
    /// Index `slots` against the tier set `tiers`
    ///
    /// `slots` must already be sorted by table number; positions are recorded
    /// in that order so lookups are deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidLayout`] if `tiers` is empty or a
    /// table's capacity is not one of `tiers`.
    pub fn new(tiers: &[Tier], slots: &[ResourceSlot]) -> Result<Self> {
        let mut tiers = tiers.to_vec();
        tiers.sort_unstable();
        tiers.dedup();
        if tiers.is_empty() {
            return Err(ReservationError::InvalidLayout(
                "at least one tier is required".to_string(),
            ));
        }

        let mut by_tier: BTreeMap<Tier, Vec<usize>> =
            tiers.iter().map(|tier| (*tier, Vec::new())).collect();
        for (position, slot) in slots.iter().enumerate() {
            let Some(positions) = by_tier.get_mut(&slot.tier()) else {
                return Err(ReservationError::InvalidLayout(format!(
                    "table {} has capacity {} which is not a known tier",
                    slot.number(),
                    slot.tier().seats()
                )));
            };
            positions.push(position);
        }

        for (tier, positions) in &by_tier {
            if positions.is_empty() {
                tracing::warn!(%tier, "No tables in tier; parties needing it will wait indefinitely");
            }
        }

        Ok(Self { tiers, by_tier })
    }

    /// The tier set, ascending
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Smallest tier seating `party_size`; oversized parties get the largest tier
    #[must_use]
    pub fn required_tier(&self, party_size: u32) -> Tier {
        Tier::required_for(&self.tiers, party_size)
    }

    /// Positions in the pool of every table in `tier`, in table-number order
    #[must_use]
    pub fn slots_of(&self, tier: Tier) -> &[usize] {
        self.by_tier.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    /// First free table of exactly `tier`, scanning in table-number order
    #[must_use]
    pub fn find_free<'a>(&self, slots: &'a [ResourceSlot], tier: Tier) -> Option<&'a ResourceSlot> {
        self.slots_of(tier)
            .iter()
            .filter_map(|&position| slots.get(position))
            .find(|slot| !slot.is_occupied())
    }
}
