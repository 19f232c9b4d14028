//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Membership**: `HubIdentity`, `DeedMetadata`
//! - **Rewards**: `RewardPeriod`, `RewardPeriodType`, `RewardReport`
//! - **Reports**: `HubReportPayload`, `HubReport`, `HubReportStatus`,
//!   `ReportLocalStatus`
//!
//! Wire entities use camelCase, omit `None`/empty collections when
//! serializing and ignore unknown fields when deserializing.

use crate::address::Address;
use crate::errors::UnknownStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Language tag to localized text.
pub type LanguageMap = BTreeMap<String, String>;

/// Deed id used when no deed is known.
pub const UNKNOWN_DEED_ID: i64 = -1;

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

// =============================================================================
// CLUSTER A: MEMBERSHIP
// =============================================================================

/// Federation membership snapshot as returned by the WoM server.
///
/// Immutable once built; the identity cache replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubIdentity {
    /// Deed token id, `-1` when unknown.
    pub deed_id: i64,
    /// City index of the deed.
    pub city: i16,
    /// Card type index of the deed.
    #[serde(rename = "type")]
    pub card_type: i16,
    /// Hub wallet address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name: LanguageMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_owner_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deed_owner_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deed_manager_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earner_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    /// End of membership, absent while the membership is open-ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    pub users_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards_period_type: Option<RewardPeriodType>,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub rewards_per_period: f64,
    pub connected: bool,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub owner_claimable_amount: f64,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub manager_claimable_amount: f64,
}

impl Default for HubIdentity {
    fn default() -> Self {
        Self {
            deed_id: UNKNOWN_DEED_ID,
            city: 0,
            card_type: 0,
            address: None,
            name: LanguageMap::new(),
            description: LanguageMap::new(),
            url: None,
            color: None,
            hub_owner_address: None,
            deed_owner_address: None,
            deed_manager_address: None,
            earner_address: None,
            created_date: None,
            join_date: None,
            until_date: None,
            updated_date: None,
            users_count: 0,
            rewards_period_type: None,
            rewards_per_period: 0.0,
            connected: false,
            owner_claimable_amount: 0.0,
            manager_claimable_amount: 0.0,
        }
    }
}

impl HubIdentity {
    /// Whether this membership is active at `now`.
    ///
    /// Requires the connected flag, a real deed and an until-date that is
    /// either absent or still in the future.
    pub fn is_connected_at(&self, now: DateTime<Utc>) -> bool {
        self.connected
            && self.deed_id > 0
            && self.until_date.map_or(true, |until| until > now)
    }

    /// Whether this membership is active now.
    pub fn is_connected(&self) -> bool {
        self.is_connected_at(Utc::now())
    }

    /// Whether the hub joined within `window` before `now`.
    pub fn joined_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.join_date
            .is_some_and(|joined| joined <= now && now - joined < window)
    }
}

/// Deed metadata read from the blockchain oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedMetadata {
    pub deed_owner: Address,
    pub deed_manager: Address,
    pub card_type: i16,
    pub city_index: i16,
    pub tenant_provisioned: bool,
}

// =============================================================================
// CLUSTER B: REWARDS
// =============================================================================

/// Reward period granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardPeriodType {
    #[default]
    Week,
    Month,
    Quarter,
    Semester,
    Year,
}

/// A reward computation period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPeriod {
    /// Local period identifier, also the key of the report index.
    pub id: u64,
    pub period_type: RewardPeriodType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RewardPeriod {
    /// Whether `date` falls inside `[start, end)`.
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date < self.end
    }

    /// Middle of the period.
    pub fn median(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) / 2
    }
}

impl fmt::Display for RewardPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {:?} [{} .. {}]",
            self.id,
            self.period_type,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Output of the reward computation collaborator for one period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewardReport {
    pub period: RewardPeriod,
    /// True once every reward of the period has been computed and paid.
    pub completely_proceeded: bool,
    pub participants_count: u64,
    pub recipients_count: u64,
    pub achievements_count: u64,
    pub actions_count: u64,
    pub reward_token_address: Option<Address>,
    pub reward_token_network_id: u64,
    pub hub_reward_amount: f64,
    pub hub_top_rewarded_amount: f64,
    pub transactions: BTreeSet<String>,
}

// =============================================================================
// CLUSTER C: REPORTS
// =============================================================================

/// Lifecycle status of a hub report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubReportStatus {
    #[default]
    None,
    Sent,
    PendingReward,
    Rewarded,
    Rejected,
    ErrorSending,
    Invalid,
}

impl HubReportStatus {
    /// Whether the remote state may have moved since the last fetch.
    pub fn can_refresh(self) -> bool {
        matches!(self, Self::Sent | Self::PendingReward)
    }

    /// Whether a (re)submission is allowed from this status.
    pub fn can_send(self) -> bool {
        matches!(self, Self::None | Self::ErrorSending)
    }

    /// Wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Sent => "SENT",
            Self::PendingReward => "PENDING_REWARD",
            Self::Rewarded => "REWARDED",
            Self::Rejected => "REJECTED",
            Self::ErrorSending => "ERROR_SENDING",
            Self::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for HubReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HubReportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "SENT" => Ok(Self::Sent),
            "PENDING_REWARD" => Ok(Self::PendingReward),
            "REWARDED" => Ok(Self::Rewarded),
            "REJECTED" => Ok(Self::Rejected),
            "ERROR_SENDING" => Ok(Self::ErrorSending),
            "INVALID" => Ok(Self::Invalid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// The signed part of a hub report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubReportPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_address: Option<Address>,
    pub deed_id: i64,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_date: Option<DateTime<Utc>>,
    pub period_type: RewardPeriodType,
    pub users_count: u64,
    pub participants_count: u64,
    pub recipients_count: u64,
    pub achievements_count: u64,
    pub actions_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_token_address: Option<Address>,
    pub reward_token_network_id: u64,
    pub hub_reward_amount: f64,
    pub hub_top_rewarded_amount: f64,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub transactions: BTreeSet<String>,
}

/// A hub report as known by the WoM server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubReport {
    #[serde(flatten)]
    pub payload: HubReportPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<String>,
    pub city: i16,
    pub card_type: i16,
    pub minting_power: f64,
    pub max_users: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deed_manager_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<Address>,
    pub owner_minting_percentage: u32,
    pub fixed_reward_index: f64,
    pub owner_fixed_index: f64,
    pub tenant_fixed_index: f64,
    pub fraud: bool,
    pub last_period_uem_reward_amount: f64,
    pub uem_reward_amount: f64,
    pub engagement_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    pub status: HubReportStatus,
    /// Remote error code when the report was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl HubReport {
    /// Wrap a locally built payload with a status.
    pub fn from_payload(payload: HubReportPayload, status: HubReportStatus) -> Self {
        Self {
            payload,
            status,
            ..Self::default()
        }
    }
}

/// A report decorated with local bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLocalStatus {
    /// Local period id.
    pub id: u64,
    pub can_refresh: bool,
    pub can_send: bool,
    #[serde(flatten)]
    pub report: HubReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn connected_hub() -> HubIdentity {
        HubIdentity {
            deed_id: 3,
            connected: true,
            join_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            ..HubIdentity::default()
        }
    }

    #[test]
    fn test_hub_connected_rules() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let hub = connected_hub();
        assert!(hub.is_connected_at(now));

        let expired = HubIdentity {
            until_date: Some(now - Duration::days(1)),
            ..connected_hub()
        };
        assert!(!expired.is_connected_at(now));

        let no_deed = HubIdentity {
            deed_id: 0,
            ..connected_hub()
        };
        assert!(!no_deed.is_connected_at(now));

        let flagged_off = HubIdentity {
            connected: false,
            ..connected_hub()
        };
        assert!(!flagged_off.is_connected_at(now));
    }

    #[test]
    fn test_joined_within() {
        let hub = connected_hub();
        let joined = hub.join_date.unwrap();
        assert!(hub.joined_within(Duration::hours(1), joined + Duration::minutes(30)));
        assert!(!hub.joined_within(Duration::hours(1), joined + Duration::hours(2)));
        assert!(!HubIdentity::default().joined_within(Duration::hours(1), joined));
    }

    #[test]
    fn test_hub_json_omits_absent_and_ignores_unknown() {
        let json = serde_json::to_value(HubIdentity::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["deedId"], -1);
        assert!(!object.contains_key("address"));
        assert!(!object.contains_key("name"));
        assert!(!object.contains_key("untilDate"));

        let parsed: HubIdentity = serde_json::from_str(
            r#"{"deedId":7,"type":2,"connected":true,"futureField":{"x":1},
                "address":"0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"}"#,
        )
        .unwrap();
        assert_eq!(parsed.deed_id, 7);
        assert_eq!(parsed.card_type, 2);
        assert!(parsed.address.unwrap().matches("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
    }

    #[test]
    fn test_missing_deed_id_defaults_to_unknown() {
        let parsed: HubIdentity = serde_json::from_str(r#"{"connected":true}"#).unwrap();
        assert_eq!(parsed.deed_id, UNKNOWN_DEED_ID);
    }

    #[test]
    fn test_status_flags() {
        assert!(HubReportStatus::None.can_send());
        assert!(HubReportStatus::ErrorSending.can_send());
        assert!(!HubReportStatus::Sent.can_send());
        assert!(HubReportStatus::Sent.can_refresh());
        assert!(HubReportStatus::PendingReward.can_refresh());
        assert!(!HubReportStatus::Rewarded.can_refresh());
        assert!(!HubReportStatus::Invalid.can_send());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("PENDING_REWARD".parse(), Ok(HubReportStatus::PendingReward));
        assert_eq!(HubReportStatus::ErrorSending.to_string(), "ERROR_SENDING");
        assert!("wom.unknown".parse::<HubReportStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&HubReportStatus::PendingReward).unwrap(),
            "\"PENDING_REWARD\""
        );
    }

    #[test]
    fn test_report_flattens_payload() {
        let mut payload = HubReportPayload {
            deed_id: 3,
            users_count: 12,
            ..HubReportPayload::default()
        };
        payload.transactions.insert("0xbb".into());
        payload.transactions.insert("0xaa".into());

        let report = HubReport::from_payload(payload, HubReportStatus::Sent);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["deedId"], 3);
        assert_eq!(json["status"], "SENT");
        assert_eq!(json["transactions"], serde_json::json!(["0xaa", "0xbb"]));
        assert!(json.get("hubAddress").is_none());

        let back: HubReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.payload.users_count, 12);
        assert_eq!(back.status, HubReportStatus::Sent);
    }

    #[test]
    fn test_period_median_and_contains() {
        let period = RewardPeriod {
            id: 9,
            period_type: RewardPeriodType::Week,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
        };
        assert_eq!(
            period.median(),
            Utc.with_ymd_and_hms(2024, 1, 4, 12, 0, 0).unwrap()
        );
        assert!(period.contains(period.start));
        assert!(!period.contains(period.end));
    }
}
