use serde::{Deserialize, Serialize};

use super::domain::{EmployeeId, InstanceId};
use super::scoring::ScoreSummary;

/// Which manager-facing message a submission produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReviewCompleted,
    ReviewUpdated,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::ReviewCompleted => "review_completed",
            NotificationKind::ReviewUpdated => "review_updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Normal,
    High,
}

impl NotificationPriority {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        }
    }
}

/// Structured context delivered alongside the message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMetadata {
    pub instance_id: InstanceId,
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f32,
    pub requires_manager_followup: bool,
}

/// Fire-and-forget alert payload. Transport is out of scope; the engine only
/// decides whether and what to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewNotification {
    pub kind: NotificationKind,
    pub recipient: EmployeeId,
    pub sender: EmployeeId,
    pub title: String,
    pub message: String,
    pub metadata: NotificationMetadata,
    pub priority: NotificationPriority,
}

/// Decide whether this submission warrants alerting the manager roster.
///
/// Corrections always notify; a first completion notifies only when the
/// score needs follow-up (a critical rating or a sub-threshold percentage).
pub fn decide(existed_before: bool, summary: &ScoreSummary) -> Option<NotificationKind> {
    if existed_before {
        Some(NotificationKind::ReviewUpdated)
    } else if summary.requires_manager_followup {
        Some(NotificationKind::ReviewCompleted)
    } else {
        None
    }
}

/// Construct the payload for one manager recipient.
pub fn build(
    kind: NotificationKind,
    recipient: EmployeeId,
    sender: &EmployeeId,
    instance_id: &InstanceId,
    template_name: &str,
    summary: &ScoreSummary,
) -> ReviewNotification {
    let priority = if summary.has_low_rating {
        NotificationPriority::High
    } else {
        NotificationPriority::Normal
    };

    let (title, message) = match kind {
        NotificationKind::ReviewUpdated => (
            "Review Updated".to_string(),
            format!(
                "{} corrected responses on '{}' (now {}/{}, {:.1}%).",
                sender.0, template_name, summary.total_score, summary.max_possible_score,
                summary.percentage
            ),
        ),
        NotificationKind::ReviewCompleted => (
            "Review Completed".to_string(),
            format!(
                "{} completed '{}' scoring {}/{} ({:.1}%). Manager follow-up required.",
                sender.0, template_name, summary.total_score, summary.max_possible_score,
                summary.percentage
            ),
        ),
    };

    ReviewNotification {
        kind,
        recipient,
        sender: sender.clone(),
        title,
        message,
        metadata: NotificationMetadata {
            instance_id: instance_id.clone(),
            total_score: summary.total_score,
            max_possible_score: summary.max_possible_score,
            percentage: summary.percentage,
            requires_manager_followup: summary.requires_manager_followup,
        },
        priority,
    }
}
