//! Resolution and validation services for the org hierarchy.
//!
//! Every function here is a pure computation over an [`OrgSnapshot`]:
//! no I/O, no mutation, no hidden state. Mutating contracts return the
//! new state as data for the store (or caller) to apply.
//!
//! [`OrgSnapshot`]: crate::snapshot::OrgSnapshot

pub mod deactivation;
pub mod department;
pub mod position;
pub mod supervisor;

// Re-export commonly used types
pub use deactivation::{
    check_user_deactivation, plan_reassignment, DependencyGroup, DependencyItem,
    DependencySummary, ReassignAction,
};
pub use department::{check_department_deletion, DepartmentDeletionImpact};
pub use position::{
    check_position_deletion, plan_position_deletion, PositionDeletionImpact, PositionDeletionPlan,
    RepointAction, SuccessionChoice,
};
pub use supervisor::{
    add_additional_supervisor, can_disable_default_supervisor, remove_additional_supervisor,
    resolve_supervisors, DefaultSupervisor, DisableDenial, EffectiveSupervisors, GuardVerdict,
    SupervisorRejection, SupervisorRemoval,
};
