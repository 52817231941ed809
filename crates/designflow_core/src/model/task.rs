//! Task domain model.
//!
//! # Responsibility
//! - Define the unit of billable work owned by one project.
//! - Apply process-step transitions and the due-date rule.
//!
//! # Invariants
//! - `current_process_step`, when set, was a member of the service's steps at
//!   transition time.
//! - `due_date` only changes through `enter_process_step` with a positive cycle.
//! - Commercial terms (`quantity`, `unit_price`, `subtotal`) are fixed at
//!   creation time.

use crate::model::catalog::{ProcessStep, ServiceId};
use crate::model::order::{OrderId, OrderItem, PolicyRef};
use crate::model::project::ProjectId;
use crate::model::MS_PER_DAY;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type UserId = Uuid;

/// Status/urgency hybrid, not a strict ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    Waiting,
    OnHold,
    Completed,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Waiting => "waiting",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "urgent" => Some(Self::Urgent),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "waiting" => Some(Self::Waiting),
            "on-hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Payment completion, independent of process progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementStatus {
    #[default]
    Unpaid,
    Prepaid,
    DraftPaid,
    FullyPaid,
    Cancelled,
}

impl SettlementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Prepaid => "prepaid",
            Self::DraftPaid => "draft-paid",
            Self::FullyPaid => "fully-paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unpaid" => Some(Self::Unpaid),
            "prepaid" => Some(Self::Prepaid),
            "draft-paid" => Some(Self::DraftPaid),
            "fully-paid" => Some(Self::FullyPaid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Designer reference with the display name known when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignerRef {
    pub user_id: UserId,
    pub name: String,
}

/// Billable unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub order_id: Option<OrderId>,
    pub service_id: ServiceId,
    pub service_name: String,
    pub category_name: String,
    pub specification: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub subtotal: f64,
    pub pricing_policies: Vec<PolicyRef>,
    pub price_description: String,
    /// `None` is the "no process" state.
    pub current_process_step: Option<ProcessStep>,
    pub main_designers: Vec<DesignerRef>,
    pub assistant_designers: Vec<DesignerRef>,
    pub priority: TaskPriority,
    pub due_date: Option<i64>,
    pub settlement_status: SettlementStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Creates a task whose commercial terms are copied verbatim from `item`.
    pub fn from_order_item(
        project_id: ProjectId,
        order_id: Option<OrderId>,
        item: &OrderItem,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            order_id,
            service_id: item.service_id,
            service_name: item.service_name.clone(),
            category_name: item.category_name.clone(),
            specification: None,
            quantity: item.quantity,
            unit: item.unit.clone(),
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            pricing_policies: item.pricing_policies.clone(),
            price_description: item.price_description.clone(),
            current_process_step: None,
            main_designers: Vec::new(),
            assistant_designers: Vec::new(),
            priority: TaskPriority::default(),
            due_date: None,
            settlement_status: SettlementStatus::default(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Rebuilds the order line item this task represents.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            service_id: self.service_id,
            service_name: self.service_name.clone(),
            category_name: self.category_name.clone(),
            unit_price: self.unit_price,
            unit: self.unit.clone(),
            quantity: self.quantity,
            subtotal: self.subtotal,
            pricing_policies: self.pricing_policies.clone(),
            price_description: self.price_description.clone(),
        }
    }

    /// Moves the task into `step` and applies the due-date rule.
    ///
    /// A positive cycle sets `due_date = now + cycle days`; a zero cycle keeps
    /// whatever due date the task already had.
    pub fn enter_process_step(&mut self, step: ProcessStep, now_ms: i64) {
        if step.cycle_days > 0 {
            self.due_date = Some(now_ms + i64::from(step.cycle_days) * MS_PER_DAY);
        }
        self.current_process_step = Some(step);
        self.updated_at = now_ms;
    }

    /// Progress contribution of this task, `0` in the no-process state.
    pub fn progress_ratio(&self) -> u8 {
        self.current_process_step
            .as_ref()
            .map_or(0, |step| step.progress_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::{SettlementStatus, Task, TaskPriority};
    use crate::model::catalog::ProcessStep;
    use crate::model::order::OrderItem;
    use crate::model::MS_PER_DAY;
    use uuid::Uuid;

    fn task() -> Task {
        let item = OrderItem {
            service_id: Uuid::new_v4(),
            service_name: "Facade".to_string(),
            category_name: "Exterior".to_string(),
            unit_price: 80.0,
            unit: "m2".to_string(),
            quantity: 3.0,
            subtotal: 216.0,
            pricing_policies: Vec::new(),
            price_description: "Spring: 10% off".to_string(),
        };
        Task::from_order_item(Uuid::new_v4(), None, &item, 0)
    }

    #[test]
    fn positive_cycle_sets_due_date_and_zero_cycle_keeps_it() {
        let mut task = task();
        let day = 1_700_000_000_000;

        task.enter_process_step(ProcessStep::new("Draft", 1, 20, 5), day);
        assert_eq!(task.due_date, Some(day + 5 * MS_PER_DAY));

        task.enter_process_step(ProcessStep::new("Review", 2, 60, 0), day + MS_PER_DAY);
        assert_eq!(task.due_date, Some(day + 5 * MS_PER_DAY));
        assert_eq!(task.progress_ratio(), 60);
    }

    #[test]
    fn order_item_terms_survive_conversion_both_ways() {
        let task = task();
        assert_eq!(task.subtotal, 216.0);
        assert_eq!(task.progress_ratio(), 0);
        let item = task.to_order_item();
        assert_eq!(item.subtotal, 216.0);
        assert_eq!(item.price_description, "Spring: 10% off");
    }

    #[test]
    fn text_codes_match_wire_names() {
        assert_eq!(TaskPriority::parse("on-hold"), Some(TaskPriority::OnHold));
        assert_eq!(TaskPriority::OnHold.as_str(), "on-hold");
        assert_eq!(
            SettlementStatus::parse(SettlementStatus::DraftPaid.as_str()),
            Some(SettlementStatus::DraftPaid)
        );
        assert_eq!(
            serde_json::to_string(&SettlementStatus::FullyPaid).unwrap(),
            "\"fully-paid\""
        );
    }
}
