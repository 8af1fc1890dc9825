//! Gateway API and Kuadrant policy manifests.
//!
//! Every builder takes the tool parameters as sent by the client, fills in the
//! Kuadrant defaults and renders YAML. Missing or malformed required fields are
//! reported as [`ManifestError::Validation`].

mod auth;
mod dns;
mod gateway;
mod ratelimit;
mod route;
mod tls;

pub use auth::{create_authpolicy, AuthPolicyParams};
pub use dns::{create_dnspolicy, DnsPolicyParams};
pub use gateway::{create_gateway, GatewayParams};
pub use ratelimit::{create_ratelimitpolicy, validate_window, LimitDefinition, Rate, RateLimitPolicyParams};
pub use route::{create_httproute, HttpRouteParams};
pub use tls::{create_tlspolicy, TlsPolicyParams};

use crate::error::ManifestError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form JSON object passed through to the manifest as-is.
pub type Object = Map<String, Value>;

pub const GATEWAY_API_VERSION: &str = "gateway.networking.k8s.io/v1";
pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";
pub const KUADRANT_V1: &str = "kuadrant.io/v1";
pub const KUADRANT_V1ALPHA1: &str = "kuadrant.io/v1alpha1";
pub const CERT_MANAGER_GROUP: &str = "cert-manager.io";

/// A Kubernetes object ready to be rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<S> {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: S,
}

impl<S: Serialize> Manifest<S> {
    pub fn new(api_version: &'static str, kind: &'static str, metadata: ObjectMeta, spec: S) -> Self {
        Self {
            api_version,
            kind,
            metadata,
            spec,
        }
    }

    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Both fields must be non-empty; `required` names every required field for the message.
    fn new(name: String, namespace: String, required: &str) -> Result<Self, ManifestError> {
        if name.is_empty() || namespace.is_empty() {
            return Err(ManifestError::Validation(format!("{required} are required")));
        }
        Ok(Self {
            name,
            namespace,
            annotations: BTreeMap::new(),
        })
    }
}

/// Check a `*Ref` object has `kind` and `name`, and default its `group`.
fn normalize_ref(
    reference: Option<Object>,
    field: &str,
    default_group: &str,
    required: &str,
) -> Result<Object, ManifestError> {
    let mut reference =
        reference.ok_or_else(|| ManifestError::Validation(format!("{required} are required")))?;

    let present = |key: &str| reference.get(key).is_some_and(|v| !v.is_null());
    if !present("kind") || !present("name") {
        return Err(ManifestError::Validation(format!(
            "{field} must have kind and name"
        )));
    }

    if !present("group") {
        reference.insert("group".into(), Value::String(default_group.into()));
    }
    Ok(reference)
}

/// Read an explicit JSON `null` as the field's default, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat an empty object the same as an absent one.
fn non_empty(object: Option<Object>) -> Option<Object> {
    object.filter(|o| !o.is_empty())
}

/// Treat an empty string the same as an absent one.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) fn parse_yaml(yaml: &str) -> Value {
    serde_yaml_ng::from_str(yaml).expect("manifest should be valid YAML")
}
