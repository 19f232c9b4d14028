//! # Orchestrator Entities
//!
//! Hub card data, the per-period report record and the pure rules that turn
//! a reward report plus its record into a report status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, HubReport, HubReportPayload, HubReportStatus, LanguageMap, ReportLocalStatus,
    RewardReport, UNKNOWN_DEED_ID,
};

/// Language tag used for hub card texts.
pub const CARD_LANGUAGE: &str = "en";

/// Hub card properties published on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubCard {
    /// Display name.
    pub name: String,
    /// Public description, possibly empty.
    pub description: String,
    /// Public URL of the hub.
    pub url: Option<String>,
    /// Primary theme color.
    pub color: Option<String>,
    /// Logo bytes, uploaded as avatar.
    pub avatar: Option<Vec<u8>>,
    /// Banner bytes.
    pub banner: Option<Vec<u8>>,
}

impl HubCard {
    /// Name as a language map.
    pub fn name_map(&self) -> LanguageMap {
        single(&self.name)
    }

    /// Description as a language map.
    pub fn description_map(&self) -> LanguageMap {
        single(&self.description)
    }
}

fn single(text: &str) -> LanguageMap {
    LanguageMap::from([(CARD_LANGUAGE.to_string(), text.to_string())])
}

/// Local bookkeeping of one period's report.
///
/// `status` holds a status label once sent, or the error code of the last
/// failed send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRecord {
    /// Hash acknowledged by the WoM server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Stored status label or error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// When the accepted report was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_date: Option<DateTime<Utc>>,
}

impl ReportRecord {
    /// Record of an accepted report.
    pub fn sent(hash: String, sent_date: DateTime<Utc>) -> Self {
        Self {
            hash: Some(hash),
            status: Some(HubReportStatus::Sent.as_str().to_string()),
            sent_date: Some(sent_date),
        }
    }

    /// Whether a report was accepted for this period.
    pub fn is_sent(&self) -> bool {
        self.hash.as_deref().is_some_and(|hash| !hash.is_empty())
    }
}

/// Status derived from a stored label, plus the error key for `ErrorSending`.
///
/// A blank label is `None` unless the hub is connected and the period is not
/// reportable, which makes it `Invalid`. Unknown labels are error codes.
pub fn resolve_status(
    stored: Option<&str>,
    connected: bool,
    valid_date: bool,
) -> (HubReportStatus, Option<String>) {
    match stored.map(str::trim).filter(|s| !s.is_empty()) {
        None if !connected || valid_date => (HubReportStatus::None, None),
        None => (HubReportStatus::Invalid, None),
        Some(label) => match label.parse::<HubReportStatus>() {
            Ok(
                status @ (HubReportStatus::Sent
                | HubReportStatus::PendingReward
                | HubReportStatus::Rewarded
                | HubReportStatus::Rejected),
            ) => (status, None),
            _ => (HubReportStatus::ErrorSending, Some(label.to_string())),
        },
    }
}

/// Map a computed reward report onto the signed payload.
pub fn build_payload(
    reward: &RewardReport,
    hub_address: Option<Address>,
    deed_id: i64,
    users_count: u64,
    sent_date: Option<DateTime<Utc>>,
) -> HubReportPayload {
    HubReportPayload {
        report_id: None,
        hub_address,
        deed_id,
        from_date: reward.period.start,
        to_date: reward.period.end,
        sent_date,
        period_type: reward.period.period_type,
        users_count,
        participants_count: reward.participants_count,
        recipients_count: reward.recipients_count,
        achievements_count: reward.achievements_count,
        actions_count: reward.actions_count,
        reward_token_address: reward.reward_token_address,
        reward_token_network_id: reward.reward_token_network_id,
        hub_reward_amount: reward.hub_reward_amount,
        hub_top_rewarded_amount: reward.hub_top_rewarded_amount,
        transactions: reward.transactions.clone(),
    }
}

/// Inputs of a local report view.
#[derive(Debug, Clone)]
pub struct LocalReportView<'a> {
    /// Local period id.
    pub period_id: u64,
    /// Payload as it would be submitted now.
    pub payload: HubReportPayload,
    /// Stored record, default when none.
    pub record: &'a ReportRecord,
    /// Whether the reward computation finished.
    pub completely_proceeded: bool,
    /// Whether the hub membership is active.
    pub connected: bool,
    /// Whether the period ends after the join date.
    pub valid_date: bool,
}

impl LocalReportView<'_> {
    /// Decorate the payload with status and local flags.
    ///
    /// An unsent report that cannot be sent carries deed id `-1`.
    pub fn into_local_status(self) -> ReportLocalStatus {
        let (status, error) =
            resolve_status(self.record.status.as_deref(), self.connected, self.valid_date);
        let sent = self.record.is_sent();
        let can_refresh = status.can_refresh() && sent;
        let can_send =
            status.can_send() && self.valid_date && self.completely_proceeded && self.connected;

        let mut report = HubReport::from_payload(self.payload, status);
        report.error = error;
        report.hash = self.record.hash.clone();
        if !sent && !can_send {
            report.payload.deed_id = UNKNOWN_DEED_ID;
        }

        ReportLocalStatus {
            id: self.period_id,
            can_refresh,
            can_send,
            report,
        }
    }
}

/// Wrap a report returned by the WoM server.
pub fn remote_local_status(period_id: u64, report: HubReport) -> ReportLocalStatus {
    ReportLocalStatus {
        id: period_id,
        can_refresh: report.status.can_refresh(),
        can_send: report.status.can_send(),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_types::{RewardPeriod, RewardPeriodType};

    fn reward() -> RewardReport {
        RewardReport {
            period: RewardPeriod {
                id: 12,
                period_type: RewardPeriodType::Week,
                start: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap(),
            },
            completely_proceeded: true,
            participants_count: 8,
            recipients_count: 5,
            achievements_count: 40,
            actions_count: 60,
            hub_reward_amount: 100.0,
            transactions: ["0xaa".to_string(), "0xbb".to_string()].into(),
            ..RewardReport::default()
        }
    }

    #[test]
    fn test_resolve_blank_status() {
        assert_eq!(resolve_status(None, false, false), (HubReportStatus::None, None));
        assert_eq!(resolve_status(Some(" "), true, true), (HubReportStatus::None, None));
        assert_eq!(resolve_status(None, true, false), (HubReportStatus::Invalid, None));
    }

    #[test]
    fn test_resolve_known_and_error_labels() {
        assert_eq!(
            resolve_status(Some("PENDING_REWARD"), true, true).0,
            HubReportStatus::PendingReward
        );
        assert_eq!(resolve_status(Some("REJECTED"), true, true).0, HubReportStatus::Rejected);
        assert_eq!(
            resolve_status(Some("wom.unavailable"), true, true),
            (HubReportStatus::ErrorSending, Some("wom.unavailable".to_string()))
        );
        assert_eq!(
            resolve_status(Some("NONE"), true, true).0,
            HubReportStatus::ErrorSending
        );
    }

    #[test]
    fn test_build_payload_maps_totals() {
        let address = Address::from_bytes([1; 20]);
        let payload = build_payload(&reward(), Some(address), 3, 250, None);
        assert_eq!(payload.hub_address, Some(address));
        assert_eq!(payload.deed_id, 3);
        assert_eq!(payload.users_count, 250);
        assert_eq!(payload.participants_count, 8);
        assert_eq!(payload.from_date, reward().period.start);
        assert_eq!(payload.transactions.len(), 2);
    }

    #[test]
    fn test_unsent_sendable_report() {
        let record = ReportRecord::default();
        let status = LocalReportView {
            period_id: 12,
            payload: build_payload(&reward(), None, 3, 1, None),
            record: &record,
            completely_proceeded: true,
            connected: true,
            valid_date: true,
        }
        .into_local_status();

        assert!(status.can_send);
        assert!(!status.can_refresh);
        assert_eq!(status.report.status, HubReportStatus::None);
        assert_eq!(status.report.payload.deed_id, 3);
    }

    #[test]
    fn test_unsendable_unsent_report_hides_deed() {
        let record = ReportRecord::default();
        let status = LocalReportView {
            period_id: 12,
            payload: build_payload(&reward(), None, 3, 1, None),
            record: &record,
            completely_proceeded: false,
            connected: true,
            valid_date: true,
        }
        .into_local_status();

        assert!(!status.can_send);
        assert_eq!(status.report.payload.deed_id, UNKNOWN_DEED_ID);
    }

    #[test]
    fn test_sent_report_can_refresh() {
        let record = ReportRecord::sent("0xfeed".into(), Utc::now());
        let status = LocalReportView {
            period_id: 12,
            payload: build_payload(&reward(), None, 3, 1, None),
            record: &record,
            completely_proceeded: true,
            connected: true,
            valid_date: true,
        }
        .into_local_status();

        assert!(status.can_refresh);
        assert!(!status.can_send);
        assert_eq!(status.report.hash.as_deref(), Some("0xfeed"));
        assert_eq!(status.report.payload.deed_id, 3);
    }

    #[test]
    fn test_failed_send_can_be_retried() {
        let record = ReportRecord {
            status: Some("wom.unavailable".into()),
            ..ReportRecord::default()
        };
        let status = LocalReportView {
            period_id: 12,
            payload: build_payload(&reward(), None, 3, 1, None),
            record: &record,
            completely_proceeded: true,
            connected: true,
            valid_date: true,
        }
        .into_local_status();

        assert_eq!(status.report.status, HubReportStatus::ErrorSending);
        assert_eq!(status.report.error.as_deref(), Some("wom.unavailable"));
        assert!(status.can_send);
    }

    #[test]
    fn test_card_language_maps() {
        let card = HubCard {
            name: "Hub".into(),
            ..HubCard::default()
        };
        assert_eq!(card.name_map().get("en").map(String::as_str), Some("Hub"));
        assert_eq!(card.description_map().get("en").map(String::as_str), Some(""));
    }
}
