use super::{
    non_empty, normalize_ref, null_as_default, Manifest, Object, ObjectMeta, GATEWAY_API_GROUP,
    KUADRANT_V1,
};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const REQUIRED: &str = "name, namespace, and targetRef";

/// `limit` requests per `window`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub limit: u64,
    pub window: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitDefinition {
    pub rates: Vec<Rate>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitPolicyParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default)]
    pub target_ref: Option<Object>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limits: BTreeMap<String, LimitDefinition>,
    #[serde(default)]
    pub defaults: Option<Object>,
    #[serde(default)]
    pub overrides: Option<Object>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitPolicySpec {
    pub target_ref: Object,
    pub limits: BTreeMap<String, LimitDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Object>,
}

/// Check a rate window: decimal digits followed by `s`, `m` or `h`.
pub fn validate_window(window: &str) -> Result<(), String> {
    let unit = match window.chars().last() {
        Some(unit) if window.chars().count() >= 2 => unit,
        _ => return Err("window must be at least 2 characters (e.g., '1s')".into()),
    };
    if !matches!(unit, 's' | 'm' | 'h') {
        return Err("window must end with 's' (seconds), 'm' (minutes), or 'h' (hours)".into());
    }

    let amount = &window[..window.len() - unit.len_utf8()];
    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err("window must start with a number (e.g., '60s', '5m', '1h')".into());
    }
    Ok(())
}

fn default_limits() -> BTreeMap<String, LimitDefinition> {
    BTreeMap::from([(
        "global".to_string(),
        LimitDefinition {
            rates: vec![Rate {
                limit: 10,
                window: "60s".into(),
            }],
            when: Vec::new(),
        },
    )])
}

pub fn create_ratelimitpolicy(params: RateLimitPolicyParams) -> Result<String, ManifestError> {
    let metadata = ObjectMeta::new(params.name, params.namespace, REQUIRED)?;
    let target_ref = normalize_ref(params.target_ref, "targetRef", GATEWAY_API_GROUP, REQUIRED)?;

    for (limit_name, limit) in &params.limits {
        for (i, rate) in limit.rates.iter().enumerate() {
            validate_window(&rate.window).map_err(|e| {
                ManifestError::Validation(format!(
                    "Invalid window format in limit '{limit_name}' rate[{i}]: {e}"
                ))
            })?;
        }
    }

    let limits = if params.limits.is_empty() {
        default_limits()
    } else {
        params.limits
    };

    let spec = RateLimitPolicySpec {
        target_ref,
        limits,
        defaults: non_empty(params.defaults),
        overrides: non_empty(params.overrides),
    };

    Manifest::new(KUADRANT_V1, "RateLimitPolicy", metadata, spec).to_yaml()
}
