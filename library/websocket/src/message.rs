//! イベントフレーム定義。

use serde::{Deserialize, Serialize};

/// タスク割り当てイベントのイベント名。
pub const TASK_ASSIGNED: &str = "task:assigned";

/// タスク削除イベントのイベント名。
pub const TASK_DELETED: &str = "task:deleted";

/// EventFrame はサーバーが push する 1 イベント。
/// ワイヤー上では JSON テキストメッセージとして運ばれる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    pub data: serde_json::Value,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// タスク割り当てイベントを組み立てる。
    pub fn task_assigned(payload: &TaskAssignedPayload) -> Self {
        Self::new(
            TASK_ASSIGNED,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    /// タスク削除イベントを組み立てる。
    pub fn task_deleted(payload: &TaskDeletedPayload) -> Self {
        Self::new(
            TASK_DELETED,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }
}

/// task:assigned のペイロード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignedPayload {
    pub task_id: String,
    pub title: String,
    pub assigned_by: String,
}

/// task:deleted のペイロード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeletedPayload {
    pub task_id: String,
    pub title: String,
    pub deleted_by: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_assigned_frame() {
        let frame = EventFrame::task_assigned(&TaskAssignedPayload {
            task_id: "task-1".to_string(),
            title: "レビュー対応".to_string(),
            assigned_by: "admin-1".to_string(),
        });
        assert_eq!(frame.event, TASK_ASSIGNED);
        assert_eq!(frame.data["taskId"], "task-1");
        assert_eq!(frame.data["assignedBy"], "admin-1");
    }

    #[test]
    fn test_task_deleted_frame() {
        let frame = EventFrame::task_deleted(&TaskDeletedPayload {
            task_id: "task-2".to_string(),
            title: "古いタスク".to_string(),
            deleted_by: "admin-1".to_string(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
        });
        assert_eq!(frame.event, TASK_DELETED);
        assert_eq!(frame.data["deletedBy"], "admin-1");
        assert_eq!(frame.data["timestamp"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_wire_round_trip() {
        let frame = EventFrame::new("task:assigned", serde_json::json!({"taskId": "t-1"}));
        let text = serde_json::to_string(&frame).unwrap();
        let parsed: EventFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_unknown_event_still_parses() {
        let parsed: EventFrame =
            serde_json::from_str(r#"{"event":"task:archived","data":{}}"#).unwrap();
        assert_eq!(parsed.event, "task:archived");
    }
}
