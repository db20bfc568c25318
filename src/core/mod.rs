// Core algorithm exports
pub mod allocator;
pub mod collator;
pub mod error;
pub mod overlap;
pub mod planner;
pub mod rebalancer;
pub mod resolver;

pub use allocator::Allocator;
pub use collator::{collate, subscription_status};
pub use error::AllocationError;
pub use overlap::{find_overlaps, OverlapResult};
pub use planner::{fair_quotas, order_by_priority, plan_allocation, run_pass, AllocationPlan, PlannedSlot};
pub use rebalancer::{left_over_candidates, merge_passes, rebalance};
pub use resolver::{merge_supervisor_rows, rank_choices, resolve_candidates, resolve_slot_holders};
