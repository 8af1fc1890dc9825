use super::{null_as_default, Manifest, ObjectMeta, GATEWAY_API_VERSION};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_refs: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostnames: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteSpec {
    pub parent_refs: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Value>,
}

pub fn create_httproute(params: HttpRouteParams) -> Result<String, ManifestError> {
    let metadata = ObjectMeta::new(params.name, params.namespace, "name and namespace")?;

    if params.parent_refs.is_empty() {
        return Err(ManifestError::Validation("parentRefs is required".into()));
    }

    let spec = HttpRouteSpec {
        parent_refs: params.parent_refs,
        hostnames: params.hostnames,
        rules: params.rules,
    };

    Manifest::new(GATEWAY_API_VERSION, "HTTPRoute", metadata, spec).to_yaml()
}
