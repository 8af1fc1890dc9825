use super::{
    non_empty, normalize_ref, null_as_default, Manifest, Object, ObjectMeta, GATEWAY_API_GROUP,
    KUADRANT_V1,
};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REQUIRED: &str = "name, namespace, and targetRef";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsPolicyParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default)]
    pub target_ref: Option<Object>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_refs: Vec<Value>,
    /// Older single-provider form, wrapped into `providerRefs`.
    #[serde(default)]
    pub provider_ref: Option<Object>,
    #[serde(default)]
    pub load_balancing: Option<Object>,
    #[serde(default)]
    pub health_check: Option<Object>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsPolicySpec {
    pub target_ref: Object,
    pub provider_refs: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<Object>,
}

pub fn create_dnspolicy(params: DnsPolicyParams) -> Result<String, ManifestError> {
    let metadata = ObjectMeta::new(params.name, params.namespace, REQUIRED)?;
    let target_ref = normalize_ref(params.target_ref, "targetRef", GATEWAY_API_GROUP, REQUIRED)?;

    let provider_refs = if !params.provider_refs.is_empty() {
        params.provider_refs
    } else if let Some(provider) = params.provider_ref {
        vec![Value::Object(provider)]
    } else {
        return Err(ManifestError::Validation("providerRefs is required".into()));
    };

    let spec = DnsPolicySpec {
        target_ref,
        provider_refs,
        load_balancing: non_empty(params.load_balancing),
        health_check: non_empty(params.health_check),
    };

    Manifest::new(KUADRANT_V1, "DNSPolicy", metadata, spec).to_yaml()
}
