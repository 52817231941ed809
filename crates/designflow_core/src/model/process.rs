//! Per-service process flow used by the task state machine.
//!
//! # Responsibility
//! - Present a service's steps in display order.
//! - Resolve transition targets by membership.
//!
//! # Invariants
//! - The flow is a free graph: any member step is a valid target, including
//!   earlier steps and the current one.
//! - An empty flow means the task stays in the "no process" state.

use crate::model::catalog::{CatalogService, ProcessStep, ProcessStepId, ServiceId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Transition target is not a step of the task's service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProcessStep {
    pub service_id: ServiceId,
    pub step_id: ProcessStepId,
}

impl Display for UnknownProcessStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "process step {} is not defined for service {}",
            self.step_id, self.service_id
        )
    }
}

impl Error for UnknownProcessStep {}

/// Ordered view over one service's process steps.
#[derive(Debug, Clone)]
pub struct ProcessFlow<'a> {
    service_id: ServiceId,
    steps: Vec<&'a ProcessStep>,
}

impl<'a> ProcessFlow<'a> {
    pub fn for_service(service: &'a CatalogService) -> Self {
        let mut steps = service.process_steps.iter().collect::<Vec<_>>();
        steps.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Self {
            service_id: service.id,
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps sorted by `order`, ties broken by id.
    pub fn ordered_steps(&self) -> &[&'a ProcessStep] {
        &self.steps
    }

    pub fn step(&self, step_id: ProcessStepId) -> Option<&'a ProcessStep> {
        self.steps.iter().copied().find(|step| step.id == step_id)
    }

    /// Step displayed right after `step_id`, if any.
    pub fn next_after(&self, step_id: ProcessStepId) -> Option<&'a ProcessStep> {
        let position = self.steps.iter().position(|step| step.id == step_id)?;
        self.steps.get(position + 1).copied()
    }

    /// Resolves a transition target by membership only.
    pub fn resolve_target(
        &self,
        step_id: ProcessStepId,
    ) -> Result<&'a ProcessStep, UnknownProcessStep> {
        self.step(step_id).ok_or(UnknownProcessStep {
            service_id: self.service_id,
            step_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessFlow;
    use crate::model::catalog::{CatalogService, ProcessStep};
    use uuid::Uuid;

    fn service_with_steps() -> CatalogService {
        let mut service = CatalogService::new("Interior design", 120.0, "m2");
        service.process_steps = vec![
            ProcessStep::new("Delivery", 3, 100, 1),
            ProcessStep::new("Survey", 1, 10, 2),
            ProcessStep::new("Designing", 2, 30, 3),
        ];
        service
    }

    #[test]
    fn steps_are_presented_by_order_field() {
        let service = service_with_steps();
        let flow = ProcessFlow::for_service(&service);
        let names = flow
            .ordered_steps()
            .iter()
            .map(|step| step.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Survey", "Designing", "Delivery"]);
    }

    #[test]
    fn any_member_step_is_a_valid_target_including_backwards() {
        let service = service_with_steps();
        let flow = ProcessFlow::for_service(&service);
        let delivery = flow.ordered_steps()[2].id;
        let survey = flow.ordered_steps()[0].id;

        assert_eq!(flow.resolve_target(delivery).unwrap().name, "Delivery");
        assert_eq!(flow.resolve_target(survey).unwrap().name, "Survey");
        assert_eq!(flow.next_after(survey).unwrap().name, "Designing");
        assert!(flow.next_after(delivery).is_none());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let service = service_with_steps();
        let flow = ProcessFlow::for_service(&service);
        let missing = Uuid::new_v4();
        let err = flow.resolve_target(missing).unwrap_err();
        assert_eq!(err.step_id, missing);
        assert_eq!(err.service_id, service.id);
    }

    #[test]
    fn service_without_steps_has_empty_flow() {
        let service = CatalogService::new("Consultation", 300.0, "hour");
        assert!(ProcessFlow::for_service(&service).is_empty());
    }
}
