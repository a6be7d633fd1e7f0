//! Status lookup tables.
//!
//! Each status maps to a display label, a badge variant and a color class.
//! The presentation layer renders badges and dropdown options straight from
//! these tables.

use serde::Serialize;

use crate::models::{ProjectStatus, TaskStatus};

/// Badge style used when rendering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
}

/// Display configuration for one status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusConfigItem {
    pub label: &'static str,
    pub variant: BadgeVariant,
    pub color: &'static str,
}

/// A status value paired with its display configuration.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    #[serde(flatten)]
    pub config: StatusConfigItem,
}

/// Closed status enumeration with a display table.
pub trait StatusEnum: Copy + 'static {
    /// Every member, in display order.
    fn all() -> &'static [Self];
    /// Stored/wire spelling.
    fn value(&self) -> &'static str;
    /// Display configuration.
    fn config(&self) -> StatusConfigItem;

    /// Dropdown options for every member.
    fn options() -> Vec<StatusOption> {
        Self::all()
            .iter()
            .map(|status| StatusOption {
                value: status.value(),
                config: status.config(),
            })
            .collect()
    }
}

const fn item(label: &'static str, variant: BadgeVariant, color: &'static str) -> StatusConfigItem {
    StatusConfigItem {
        label,
        variant,
        color,
    }
}

impl StatusEnum for ProjectStatus {
    fn all() -> &'static [Self] {
        &ProjectStatus::ALL
    }

    fn value(&self) -> &'static str {
        self.as_str()
    }

    fn config(&self) -> StatusConfigItem {
        match self {
            Self::Planning => item(
                "Planning",
                BadgeVariant::Secondary,
                "bg-gray-100 text-gray-800",
            ),
            Self::InProgress => item(
                "In Progress",
                BadgeVariant::Default,
                "bg-blue-100 text-blue-800",
            ),
            Self::Review => item(
                "Review",
                BadgeVariant::Secondary,
                "bg-yellow-100 text-yellow-800",
            ),
            Self::Completed => item(
                "Completed",
                BadgeVariant::Secondary,
                "bg-green-100 text-green-800",
            ),
            Self::OnHold => item(
                "On Hold",
                BadgeVariant::Destructive,
                "bg-red-100 text-red-800",
            ),
        }
    }
}

impl StatusEnum for TaskStatus {
    fn all() -> &'static [Self] {
        &TaskStatus::ALL
    }

    fn value(&self) -> &'static str {
        self.as_str()
    }

    fn config(&self) -> StatusConfigItem {
        match self {
            Self::Todo => item("To Do", BadgeVariant::Secondary, "bg-gray-100 text-gray-800"),
            Self::InProgress => item(
                "In Progress",
                BadgeVariant::Default,
                "bg-blue-100 text-blue-800",
            ),
            Self::Review => item(
                "Review",
                BadgeVariant::Secondary,
                "bg-orange-100 text-orange-800",
            ),
            Self::Completed => item(
                "Completed",
                BadgeVariant::Secondary,
                "bg-green-100 text-green-800",
            ),
            Self::Cancelled => item(
                "Cancelled",
                BadgeVariant::Destructive,
                "bg-red-100 text-red-800",
            ),
        }
    }
}

/// Both tables, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct StatusConfig {
    pub project: Vec<StatusOption>,
    pub task: Vec<StatusOption>,
}

impl StatusConfig {
    pub fn build() -> Self {
        Self {
            project: ProjectStatus::options(),
            task: TaskStatus::options(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_project_table_covers_every_status() {
        let options = ProjectStatus::options();
        assert_eq!(options.len(), ProjectStatus::ALL.len());
        let values: HashSet<_> = options.iter().map(|o| o.value).collect();
        for status in ProjectStatus::ALL {
            assert!(values.contains(status.as_str()));
        }
    }

    #[test]
    fn test_task_table_covers_every_status() {
        let options = TaskStatus::options();
        let values: Vec<_> = options.iter().map(|o| o.value).collect();
        assert_eq!(
            values,
            vec!["todo", "in-progress", "review", "completed", "cancelled"]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(ProjectStatus::OnHold.config().label, "On Hold");
        assert_eq!(TaskStatus::Todo.config().label, "To Do");
        assert_eq!(TaskStatus::InProgress.config().label, "In Progress");
    }

    #[test]
    fn test_destructive_variants() {
        assert_eq!(
            ProjectStatus::OnHold.config().variant,
            BadgeVariant::Destructive
        );
        assert_eq!(
            TaskStatus::Cancelled.config().variant,
            BadgeVariant::Destructive
        );
        assert_eq!(
            ProjectStatus::InProgress.config().variant,
            BadgeVariant::Default
        );
    }

    #[test]
    fn test_status_option_serializes_flat() {
        let json = serde_json::to_value(StatusConfig::build()).unwrap();
        let first = &json["project"][0];
        assert_eq!(first["value"], "planning");
        assert_eq!(first["label"], "Planning");
        assert_eq!(first["variant"], "secondary");
        assert_eq!(first["color"], "bg-gray-100 text-gray-800");
    }
}
