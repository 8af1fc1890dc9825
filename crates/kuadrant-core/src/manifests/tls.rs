use super::{
    non_blank, normalize_ref, null_as_default, Manifest, Object, ObjectMeta, CERT_MANAGER_GROUP,
    GATEWAY_API_GROUP, KUADRANT_V1ALPHA1,
};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};

const REQUIRED: &str = "name, namespace, targetRef, and issuerRef";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsPolicyParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default)]
    pub target_ref: Option<Object>,
    #[serde(default)]
    pub issuer_ref: Option<Object>,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub renew_before: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsPolicySpec {
    pub target_ref: Object,
    pub issuer_ref: Object,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renew_before: Option<String>,
}

pub fn create_tlspolicy(params: TlsPolicyParams) -> Result<String, ManifestError> {
    let metadata = ObjectMeta::new(params.name, params.namespace, REQUIRED)?;
    if params.target_ref.is_none() || params.issuer_ref.is_none() {
        return Err(ManifestError::Validation(format!("{REQUIRED} are required")));
    }

    let target_ref = normalize_ref(params.target_ref, "targetRef", GATEWAY_API_GROUP, REQUIRED)?;
    let issuer_ref = normalize_ref(params.issuer_ref, "issuerRef", CERT_MANAGER_GROUP, REQUIRED)?;

    let spec = TlsPolicySpec {
        target_ref,
        issuer_ref,
        common_name: non_blank(params.common_name),
        duration: non_blank(params.duration),
        renew_before: non_blank(params.renew_before),
    };

    Manifest::new(KUADRANT_V1ALPHA1, "TLSPolicy", metadata, spec).to_yaml()
}
