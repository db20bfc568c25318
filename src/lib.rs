//! Supervisor Match - capacity-constrained allocation of students to supervisors
//!
//! Students rank three research topics, supervisors declare the ACM keywords they
//! cover and how many students they can take. The allocator matches them on shared
//! keywords, shares supervisor places out fairly in preference order and runs one
//! rebalancing pass for students left over.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{AllocationError, Allocator};
pub use models::{
    AllocationOptions, AllocationOutcome, Assignment, Candidate, RawRecords, SlotHolder,
    SubscriptionStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let allocator = Allocator::default();
        assert!(allocator.options().rebalance);

        let result = allocator.allocate(&RawRecords::default());
        assert!(matches!(result, Err(AllocationError::Configuration(_))));
    }
}
