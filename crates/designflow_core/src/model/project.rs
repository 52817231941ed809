//! Project aggregate model.
//!
//! # Responsibility
//! - Define the project record and its manual lifecycle states.
//! - Define the derived rollup written by the progress aggregator.
//!
//! # Invariants
//! - `progress`, `main_designers`, and `assistant_designers` only change via
//!   `ProjectRollup` written by the aggregator.
//! - `related_task_ids` reflects the tasks owned by the project, in creation
//!   order.
//! - `related_orders` are references; the project does not own orders.

use crate::model::order::{ClientInfo, OrderId};
use crate::model::task::{DesignerRef, SettlementStatus, TaskId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// Manually driven project lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    Consulting,
    #[default]
    InProgress,
    PartialDelivery,
    Completed,
    OnHold,
    Cancelled,
}

impl ProgressStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consulting => "consulting",
            Self::InProgress => "in-progress",
            Self::PartialDelivery => "partial-delivery",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "consulting" => Some(Self::Consulting),
            "in-progress" => Some(Self::InProgress),
            "partial-delivery" => Some(Self::PartialDelivery),
            "completed" => Some(Self::Completed),
            "on-hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a manual move from `self` to `next` is allowed.
    ///
    /// Re-selecting the current status is always allowed. `Cancelled` is
    /// terminal and `Completed` can only be reopened to `InProgress`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ProgressStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Consulting, InProgress | OnHold | Cancelled)
                | (InProgress, PartialDelivery | Completed | OnHold | Cancelled)
                | (PartialDelivery, InProgress | Completed | OnHold | Cancelled)
                | (OnHold, Consulting | InProgress | Cancelled)
                | (Completed, InProgress)
        )
    }
}

/// Derived project fields produced from the task set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRollup {
    pub progress: u8,
    pub main_designers: Vec<DesignerRef>,
    pub assistant_designers: Vec<DesignerRef>,
}

/// Project aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: ClientInfo,
    pub team_id: Option<String>,
    pub client_requirements: Option<String>,
    pub progress: u8,
    pub main_designers: Vec<DesignerRef>,
    pub assistant_designers: Vec<DesignerRef>,
    pub progress_status: ProgressStatus,
    pub settlement_status: SettlementStatus,
    pub related_orders: Vec<OrderId>,
    pub related_task_ids: Vec<TaskId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    /// Creates an empty project linked to `order_id`.
    pub fn new(
        name: impl Into<String>,
        client: ClientInfo,
        order_id: Option<OrderId>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            client,
            team_id: None,
            client_requirements: None,
            progress: 0,
            main_designers: Vec::new(),
            assistant_designers: Vec::new(),
            progress_status: ProgressStatus::default(),
            settlement_status: SettlementStatus::default(),
            related_orders: order_id.into_iter().collect(),
            related_task_ids: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Order whose snapshots track this project's task set.
    pub fn linked_order(&self) -> Option<OrderId> {
        self.related_orders.last().copied()
    }

    pub fn main_designer_ids(&self) -> Vec<UserId> {
        self.main_designers.iter().map(|d| d.user_id).collect()
    }

    pub fn main_designer_names(&self) -> Vec<&str> {
        self.main_designers.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn assistant_designer_ids(&self) -> Vec<UserId> {
        self.assistant_designers.iter().map(|d| d.user_id).collect()
    }

    pub fn assistant_designer_names(&self) -> Vec<&str> {
        self.assistant_designers
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressStatus::{self, *};

    #[test]
    fn cancelled_is_terminal_and_completed_only_reopens() {
        for next in [Consulting, InProgress, PartialDelivery, Completed, OnHold] {
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(OnHold));
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn regular_flow_is_allowed() {
        assert!(Consulting.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(PartialDelivery));
        assert!(PartialDelivery.can_transition_to(Completed));
        assert!(OnHold.can_transition_to(InProgress));
        assert!(!Consulting.can_transition_to(Completed));
    }

    #[test]
    fn codes_round_trip() {
        for status in [
            Consulting,
            InProgress,
            PartialDelivery,
            Completed,
            OnHold,
            Cancelled,
        ] {
            assert_eq!(ProgressStatus::parse(status.as_str()), Some(status));
        }
    }
}
