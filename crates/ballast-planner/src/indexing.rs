//! Linear ordering of trajectory unknowns.
//!
//! Each phase owns a block of six coefficients per axis; each load-bearing
//! phase additionally owns two VRP-waypoint slots (start, end) in the
//! waypoint vector. The layout is the single source of truth for matrix
//! column offsets and waypoint indices, and is recomputed for every solve:
//! a layout cached across sequence changes would silently corrupt the system.

use ballast_core::contact::ContactSequence;

/// Coefficients per phase per axis (fixed-order segment model).
pub const COEFFICIENTS_PER_PHASE: usize = 6;

/// Index layout for one contact sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexLayout {
    /// Waypoint slot pair `(start, end)` per phase; `None` for flight.
    waypoint_slots: Vec<Option<(usize, usize)>>,
    waypoint_count: usize,
}

impl IndexLayout {
    pub fn new(sequence: &ContactSequence) -> Self {
        let mut waypoint_slots = Vec::with_capacity(sequence.len());
        let mut next_slot = 0;
        for phase in sequence.phases() {
            if phase.state.is_load_bearing() {
                waypoint_slots.push(Some((next_slot, next_slot + 1)));
                next_slot += 2;
            } else {
                waypoint_slots.push(None);
            }
        }
        Self {
            waypoint_slots,
            waypoint_count: next_slot,
        }
    }

    /// Number of phases covered by this layout.
    pub fn num_phases(&self) -> usize {
        self.waypoint_slots.len()
    }

    /// Total number of coefficient unknowns per axis.
    pub fn system_dim(&self) -> usize {
        COEFFICIENTS_PER_PHASE * self.num_phases()
    }

    /// Column offset of a phase's coefficient block.
    pub fn coefficient_start(&self, phase: usize) -> usize {
        debug_assert!(phase < self.num_phases());
        COEFFICIENTS_PER_PHASE * phase
    }

    /// Waypoint-vector index of a load-bearing phase's start waypoint.
    pub fn waypoint_start_index(&self, phase: usize) -> Option<usize> {
        self.waypoint_slots[phase].map(|(start, _)| start)
    }

    /// Waypoint-vector index of a load-bearing phase's end waypoint.
    pub fn waypoint_end_index(&self, phase: usize) -> Option<usize> {
        self.waypoint_slots[phase].map(|(_, end)| end)
    }

    /// Total number of VRP-waypoint slots.
    pub fn waypoint_count(&self) -> usize {
        self.waypoint_count
    }
}
