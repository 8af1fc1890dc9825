use super::{
    non_empty, normalize_ref, null_as_default, Manifest, Object, ObjectMeta, GATEWAY_API_GROUP,
    KUADRANT_V1,
};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};

const REQUIRED: &str = "name, namespace, and targetRef";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPolicyParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default)]
    pub target_ref: Option<Object>,
    #[serde(default)]
    pub rules: Option<Object>,
    #[serde(default)]
    pub defaults: Option<Object>,
    #[serde(default)]
    pub overrides: Option<Object>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPolicySpec {
    pub target_ref: Object,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Object>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Object>,
}

pub fn create_authpolicy(params: AuthPolicyParams) -> Result<String, ManifestError> {
    let metadata = ObjectMeta::new(params.name, params.namespace, REQUIRED)?;
    let target_ref = normalize_ref(params.target_ref, "targetRef", GATEWAY_API_GROUP, REQUIRED)?;

    let spec = AuthPolicySpec {
        target_ref,
        rules: non_empty(params.rules),
        defaults: non_empty(params.defaults),
        overrides: non_empty(params.overrides),
    };

    Manifest::new(KUADRANT_V1, "AuthPolicy", metadata, spec).to_yaml()
}
