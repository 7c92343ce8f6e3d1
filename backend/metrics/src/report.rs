//! Snapshot renderings: the chat report text and the exported gauge set.
//!
//! Pure formatting. Nothing here touches the store.

use chatpulse_core::Snapshot;

/// One exported instantaneous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gauge {
    pub name: &'static str,
    pub help: &'static str,
    pub value: u64,
}

pub const GAUGE_TOTAL_USERS: &str = "telegram_total_users";
pub const GAUGE_ACTIVE_USERS_5M: &str = "telegram_active_users_5m";
pub const GAUGE_MESSAGES: &str = "telegram_msgs_total";
pub const GAUGE_COMMANDS: &str = "telegram_cmds_total";
pub const GAUGE_RPM_1M: &str = "telegram_rpm_1m";

/// Gauges for every snapshot field, in a fixed order.
pub fn gauges(snapshot: &Snapshot) -> [Gauge; 5] {
    [
        Gauge {
            name: GAUGE_TOTAL_USERS,
            help: "Total unique chat_ids",
            value: snapshot.total_users,
        },
        Gauge {
            name: GAUGE_ACTIVE_USERS_5M,
            help: "Active users in last 5 minutes",
            value: snapshot.active_users_5m,
        },
        Gauge {
            name: GAUGE_MESSAGES,
            help: "Total messages observed",
            value: snapshot.lifetime_messages,
        },
        Gauge {
            name: GAUGE_COMMANDS,
            help: "Total commands observed",
            value: snapshot.lifetime_commands,
        },
        Gauge {
            name: GAUGE_RPM_1M,
            help: "Events/min last 1 minute",
            value: snapshot.events_per_minute,
        },
    ]
}

/// Human-readable multi-line report shown in chat.
pub fn render_report(snapshot: &Snapshot) -> String {
    format!(
        "📊 Live Stats\n\
         👥 Total users: {}\n\
         🔥 Active (5m): {}\n\
         💬 Messages: {}\n\
         ⌨️ Commands: {}\n\
         ⚡ RPM(1m): {}",
        snapshot.total_users,
        snapshot.active_users_5m,
        snapshot.lifetime_messages,
        snapshot.lifetime_commands,
        snapshot.events_per_minute,
    )
}
