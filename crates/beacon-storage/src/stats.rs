//! Read-only aggregation over a record snapshot.

use beacon_common::types::{NotificationKind, NotificationRecord, NotificationStats};

/// Counts records by delivery status and by type.
///
/// Pure function of the slice: an empty snapshot yields all-zero stats and
/// `total == notified + unnotified == by_type.local + by_type.scheduled`
/// always holds.
pub fn compute(records: &[NotificationRecord]) -> NotificationStats {
    records
        .iter()
        .fold(NotificationStats::default(), |mut stats, record| {
            stats.total += 1;
            if record.notified {
                stats.notified += 1;
            } else {
                stats.unnotified += 1;
            }
            match record.kind {
                NotificationKind::Local => stats.by_type.local += 1,
                NotificationKind::Scheduled => stats.by_type.scheduled += 1,
            }
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, kind: NotificationKind, notified: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            kind,
            notified,
            time: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        assert_eq!(compute(&[]), NotificationStats::default());
    }

    #[test]
    fn counts_status_and_type() {
        let records = vec![
            record("1", NotificationKind::Local, false),
            record("2", NotificationKind::Scheduled, false),
            record("3", NotificationKind::Local, true),
        ];
        let stats = compute(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.notified, 1);
        assert_eq!(stats.unnotified, 2);
        assert_eq!(stats.by_type.local, 2);
        assert_eq!(stats.by_type.scheduled, 1);
        assert_eq!(stats.total, stats.notified + stats.unnotified);
        assert_eq!(stats.total, stats.by_type.local + stats.by_type.scheduled);
    }
}
