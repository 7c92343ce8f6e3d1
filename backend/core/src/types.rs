use serde::{Deserialize, Serialize};

/// Point-in-time usage figures computed from the event store.
///
/// Fields are read by independent store queries, so a concurrent write may
/// be visible in one field and not yet in another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Lifetime count of distinct subjects.
    pub total_users: u64,
    /// Lifetime count of recorded events.
    pub lifetime_messages: u64,
    /// Lifetime count of recorded command events.
    pub lifetime_commands: u64,
    /// Events whose timestamp falls in `[now - 60, now]`.
    pub events_per_minute: u64,
    /// Subjects last seen no more than 300 seconds before `now`.
    pub active_users_5m: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_all_zero() {
        let s = Snapshot::default();
        assert_eq!(s.total_users, 0);
        assert_eq!(s.lifetime_messages, 0);
        assert_eq!(s.lifetime_commands, 0);
        assert_eq!(s.events_per_minute, 0);
        assert_eq!(s.active_users_5m, 0);
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let s = Snapshot {
            total_users: 2,
            lifetime_messages: 4,
            lifetime_commands: 2,
            events_per_minute: 4,
            active_users_5m: 2,
        };
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["total_users"], 2);
        assert_eq!(json["events_per_minute"], 4);
        assert_eq!(json["active_users_5m"], 2);
    }
}
