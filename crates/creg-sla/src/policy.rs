//! SLA Policy Evaluation
//!
//! Reference table of response/resolution thresholds per (priority,
//! plan) pair, and the violation check against computed working times.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::timeline::SlaTimes;

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parses both the canonical name and the helpdesk's Russian label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "critical" | "Критический" => Some(Priority::Critical),
            "high" | "Высокий" => Some(Priority::High),
            "medium" | "Средний" => Some(Priority::Medium),
            "low" | "Низкий" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Client service tier; determines which policy row applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Plan {
    /// Parses both the canonical name and the custom-field spelling.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "bronze" | "Bronze" => Some(Plan::Bronze),
            "silver" | "Silver" => Some(Plan::Silver),
            "gold" | "Gold" => Some(Plan::Gold),
            "platinum" | "Platinum" => Some(Plan::Platinum),
            _ => None,
        }
    }
}

/// One row of the SLA policy table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub priority: Priority,
    pub plan: Plan,
    /// Maximum working time until the first staff reply.
    #[serde(with = "duration_secs")]
    pub reaction_time: Duration,
    /// Target resolution working time.
    #[serde(with = "duration_secs")]
    pub planned_resolution_time: Duration,
    /// Hard resolution limit; exceeding it is an SLA violation.
    #[serde(with = "duration_secs")]
    pub max_resolution_time: Duration,
}

/// Outcome of checking one ticket against its policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaResult {
    #[serde(with = "duration_secs")]
    pub sla_time: Duration,
    #[serde(with = "duration_secs")]
    pub first_response_time: Duration,
    pub sla_violated: bool,
    pub response_violated: bool,
    #[serde(with = "duration_secs_opt")]
    pub sla_overdue_time: Option<Duration>,
    #[serde(with = "duration_secs_opt")]
    pub response_overdue_time: Option<Duration>,
}

impl SlaResult {
    /// Result for a ticket that has no applicable policy: a violation
    /// cannot be asserted without defined thresholds.
    pub fn unevaluated(times: &SlaTimes) -> Self {
        Self {
            sla_time: times.sla_time,
            first_response_time: times.first_response_time,
            sla_violated: false,
            response_violated: false,
            sla_overdue_time: None,
            response_overdue_time: None,
        }
    }
}

/// Checks computed working times against one policy row.
pub fn evaluate(policy: &SlaPolicy, times: &SlaTimes) -> SlaResult {
    let sla_violated = times.sla_time > policy.max_resolution_time;
    let response_violated = times.first_response_time > policy.reaction_time;
    SlaResult {
        sla_time: times.sla_time,
        first_response_time: times.first_response_time,
        sla_violated,
        response_violated,
        sla_overdue_time: sla_violated.then(|| times.sla_time - policy.max_resolution_time),
        response_overdue_time: response_violated
            .then(|| times.first_response_time - policy.reaction_time),
    }
}

/// Policy rows keyed by (priority, plan), one row per combination.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    rows: HashMap<(Priority, Plan), SlaPolicy>,
}

impl PolicyTable {
    pub fn new(rows: impl IntoIterator<Item = SlaPolicy>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| ((row.priority, row.plan), row))
                .collect(),
        }
    }

    /// Loads the table from the configuration store's JSON export.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rows: Vec<SlaPolicy> = serde_json::from_str(json)?;
        Ok(Self::new(rows))
    }

    pub fn get(&self, priority: Priority, plan: Plan) -> Option<&SlaPolicy> {
        self.rows.get(&(priority, plan))
    }

    pub fn insert(&mut self, row: SlaPolicy) {
        self.rows.insert((row.priority, row.plan), row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Evaluates with fail-open lookup: a missing row is logged and
    /// reported as non-violating rather than aborting the ticket.
    pub fn evaluate(&self, priority: Priority, plan: Plan, times: &SlaTimes) -> SlaResult {
        match self.get(priority, plan) {
            Some(policy) => evaluate(policy, times),
            None => {
                error!(
                    "no SLA policy for priority {:?} and plan {:?}; reporting no violation",
                    priority, plan
                );
                SlaResult::unevaluated(times)
            }
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(deserializer)?))
    }
}

mod duration_secs_opt {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&value.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.map(Duration::seconds))
    }
}
