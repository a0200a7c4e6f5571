//! Ticket Custom Fields
//!
//! Extraction of the SLA-relevant custom fields from the helpdesk's
//! free-form field list: client plan, incident cause, product module
//! and CI reference.

use serde::Deserialize;
use serde_json::Value;

/// Field ids assigned in the helpdesk configuration.
const CAUSE_FIELD: i64 = 2;
const MODULE_FIELD: i64 = 3;
const PLAN_FIELD: i64 = 5;
const CI_FIELD: i64 = 8;

pub const UNSPECIFIED: &str = "Не указано";
pub const UNSPECIFIED_PLAN: &str = "Не указан";

/// One custom field as delivered by the API. `field_value` is schemaless:
/// plain strings for flat fields, nested objects for hierarchical ones.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomField {
    pub id: i64,
    #[serde(default)]
    pub field_value: Value,
}

/// SLA-relevant ticket attributes recovered from custom fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFields {
    pub cause: String,
    pub module: String,
    pub ci: String,
    pub plan: String,
}

impl Default for TicketFields {
    fn default() -> Self {
        Self {
            cause: UNSPECIFIED.to_string(),
            module: UNSPECIFIED.to_string(),
            ci: String::new(),
            plan: UNSPECIFIED_PLAN.to_string(),
        }
    }
}

/// Walks the field list once, keeping defaults for anything absent or
/// shaped unexpectedly.
pub fn extract(fields: &[RawCustomField]) -> TicketFields {
    let mut out = TicketFields::default();
    for field in fields {
        match field.id {
            // Cause is hierarchical; only the second level is reported.
            CAUSE_FIELD => {
                if let Some(name) = localized_name(&field.field_value["2"]) {
                    out.cause = name;
                }
            }
            MODULE_FIELD => {
                if let Some(name) = localized_name(&field.field_value) {
                    out.module = name;
                }
            }
            CI_FIELD => {
                if let Some(value) = field.field_value.as_str() {
                    out.ci = value.to_string();
                }
            }
            PLAN_FIELD => {
                if let Some(value) = field.field_value.as_str() {
                    if !value.is_empty() {
                        out.plan = value.to_string();
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn localized_name(value: &Value) -> Option<String> {
    value["name"]["ru"].as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(id: i64, value: Value) -> RawCustomField {
        RawCustomField {
            id,
            field_value: value,
        }
    }

    #[test]
    fn test_extracts_all_fields() {
        let fields = vec![
            field(CAUSE_FIELD, json!({"2": {"name": {"ru": "Ошибка конфигурации"}}})),
            field(MODULE_FIELD, json!({"name": {"ru": "Документы"}})),
            field(CI_FIELD, json!("srv-042")),
            field(PLAN_FIELD, json!("Gold")),
        ];
        let out = extract(&fields);
        assert_eq!(out.cause, "Ошибка конфигурации");
        assert_eq!(out.module, "Документы");
        assert_eq!(out.ci, "srv-042");
        assert_eq!(out.plan, "Gold");
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let out = extract(&[]);
        assert_eq!(out.cause, UNSPECIFIED);
        assert_eq!(out.module, UNSPECIFIED);
        assert_eq!(out.ci, "");
        assert_eq!(out.plan, UNSPECIFIED_PLAN);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let fields = vec![
            field(CAUSE_FIELD, json!({"1": {"name": {"ru": "только первый уровень"}}})),
            field(PLAN_FIELD, json!({"unexpected": "object"})),
        ];
        let out = extract(&fields);
        assert_eq!(out.cause, UNSPECIFIED);
        assert_eq!(out.plan, UNSPECIFIED_PLAN);
    }
}
