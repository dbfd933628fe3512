// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The built-in action pack.
//!
//! Every action honors `success`/`error` override keys where the
//! contract gives it a happy/failure path, and reads its remaining
//! options from the engine-interpolated config map.

mod activity_log;
mod add_to_list;
mod bash;
mod check_machine_state;
mod check_queue;
mod claim_job;
mod clear_events;
mod complete_job;
mod fail_job;
mod get_pending;
mod pop_from_list;
mod send_event;
mod set_context;
mod start_fsm;
mod wait_for_jobs;

pub use activity_log::ActivityLogAction;
pub use add_to_list::AddToListAction;
pub use bash::BashAction;
pub use check_machine_state::CheckMachineStateAction;
pub use check_queue::CheckDatabaseQueueAction;
pub use claim_job::ClaimJobAction;
pub use clear_events::ClearEventsAction;
pub use complete_job::CompleteJobAction;
pub use fail_job::FailJobAction;
pub use get_pending::GetPendingJobsAction;
pub use pop_from_list::PopFromListAction;
pub use send_event::SendEventAction;
pub use set_context::SetContextAction;
pub use start_fsm::StartFsmAction;
pub use wait_for_jobs::WaitForJobsAction;

use crate::action::from_config;
use crate::registry::ActionRegistry;

/// Register the whole pack. The literal `log` tag is intercepted by the
/// engine-intrinsic logger before the registry is consulted, so the
/// UI-facing log action is reached through the `activity_log` alias.
pub(crate) fn register_builtin(registry: &mut ActionRegistry) {
    registry.register("log", |c| Ok(Box::new(from_config::<ActivityLogAction>(c)?)));
    registry.register("bash", |c| Ok(Box::new(from_config::<BashAction>(c)?)));
    registry.register("send_event", |c| Ok(Box::new(from_config::<SendEventAction>(c)?)));
    registry.register("check_database_queue", |c| {
        Ok(Box::new(from_config::<CheckDatabaseQueueAction>(c)?))
    });
    registry.register("get_pending_jobs", |c| {
        Ok(Box::new(from_config::<GetPendingJobsAction>(c)?))
    });
    registry.register("claim_job", |c| Ok(Box::new(from_config::<ClaimJobAction>(c)?)));
    registry.register("complete_job", |c| {
        Ok(Box::new(from_config::<CompleteJobAction>(c)?))
    });
    registry.register("fail_job", |c| Ok(Box::new(from_config::<FailJobAction>(c)?)));
    registry.register("pop_from_list", |c| {
        Ok(Box::new(from_config::<PopFromListAction>(c)?))
    });
    registry.register("add_to_list", |c| Ok(Box::new(from_config::<AddToListAction>(c)?)));
    registry.register("set_context", |c| Ok(Box::new(from_config::<SetContextAction>(c)?)));
    registry.register("clear_events", |c| {
        Ok(Box::new(from_config::<ClearEventsAction>(c)?))
    });
    registry.register("check_machine_state", |c| {
        Ok(Box::new(from_config::<CheckMachineStateAction>(c)?))
    });
    registry.register("start_fsm", |c| Ok(Box::new(from_config::<StartFsmAction>(c)?)));
    registry.register("wait_for_jobs", |c| {
        Ok(Box::new(from_config::<WaitForJobsAction>(c)?))
    });
}
