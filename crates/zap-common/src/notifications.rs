use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::new_id;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReconnectionExpired,
    CampaignCompleted,
    Info,
}

/// A user-facing notice kept until dismissed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    /// Creates an unread notification stamped with the current time.
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            kind,
            title: title.into(),
            message: message.into(),
            instance_id: None,
            instance_name: None,
            timestamp: Utc::now(),
            is_read: false,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }

    /// Notice raised when a pairing attempt for an instance ends without a connection.
    pub fn reconnection_expired(instance_id: impl Into<String>, instance_name: Option<String>) -> Self {
        let instance_id = instance_id.into();
        let label = instance_name.clone().unwrap_or_else(|| instance_id.clone());
        let mut notification = Self::new(
            NotificationKind::ReconnectionExpired,
            "Reconnection expired",
            format!("The reconnection attempt for {label} expired. Try again."),
        );
        notification.instance_id = Some(instance_id);
        notification.instance_name = instance_name;
        notification
    }
}

/// Bounded, newest-last list of notifications with read tracking.
#[derive(Debug)]
pub struct NotificationCenter {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Pushes a notification, evicting the oldest entry when full.
    pub fn push(&mut self, notification: Notification) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        tracing::debug!(id = %notification.id, kind = ?notification.kind, "notification queued");
        self.items.push_back(notification);
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Returns `false` when no notification has that id.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.items {
            n.is_read = true;
        }
    }

    /// Removes a notification. Returns `false` when no notification has that id.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnection_expired_carries_instance() {
        let n = Notification::reconnection_expired("inst_001", Some("Instance 01".into()));
        assert_eq!(n.kind, NotificationKind::ReconnectionExpired);
        assert_eq!(n.instance_id.as_deref(), Some("inst_001"));
        assert!(n.message.contains("Instance 01"));
        assert!(!n.is_read);
    }

    #[test]
    fn reconnection_expired_falls_back_to_id() {
        let n = Notification::reconnection_expired("inst_003", None);
        assert!(n.message.contains("inst_003"));
        assert!(n.instance_name.is_none());
    }

    #[test]
    fn unread_count_tracks_mark_as_read() {
        let mut center = NotificationCenter::default();
        let first = Notification::info("a", "b");
        let first_id = first.id.clone();
        center.push(first);
        center.push(Notification::info("c", "d"));
        assert_eq!(center.unread_count(), 2);

        assert!(center.mark_as_read(&first_id));
        assert_eq!(center.unread_count(), 1);

        assert!(!center.mark_as_read("missing"));
    }

    #[test]
    fn mark_all_as_read_clears_unread() {
        let mut center = NotificationCenter::default();
        center.push(Notification::info("a", "b"));
        center.push(Notification::reconnection_expired("inst_001", None));
        center.mark_all_as_read();
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn dismiss_removes_entry() {
        let mut center = NotificationCenter::default();
        let n = Notification::info("a", "b");
        let id = n.id.clone();
        center.push(n);
        assert!(center.dismiss(&id));
        assert!(center.is_empty());
        assert!(!center.dismiss(&id));
    }

    #[test]
    fn push_evicts_oldest_at_capacity() {
        let mut center = NotificationCenter::new(2);
        center.push(Notification::info("one", ""));
        center.push(Notification::info("two", ""));
        center.push(Notification::info("three", ""));
        let titles: Vec<_> = center.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["two", "three"]);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::ReconnectionExpired).unwrap();
        assert_eq!(json, "\"reconnection_expired\"");
    }

    #[test]
    fn campaign_completed_kind_round_trips() {
        let kind: NotificationKind = serde_json::from_str("\"campaign_completed\"").unwrap();
        assert_eq!(kind, NotificationKind::CampaignCompleted);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"campaign_completed\"");

        let n: Notification = serde_json::from_str(
            r#"{"id":"n1","kind":"campaign_completed","title":"Done","message":"147 of 150 sent","timestamp":"2026-01-05T10:00:00Z","is_read":false}"#,
        )
        .unwrap();
        assert_eq!(n.kind, NotificationKind::CampaignCompleted);
        assert!(n.instance_id.is_none());
    }
}
