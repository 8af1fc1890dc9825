use super::{non_blank, null_as_default, Manifest, ObjectMeta, GATEWAY_API_VERSION};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_GATEWAY_CLASS: &str = "istio";
const POLICY_ANNOTATION: &str = "kuadrant.io/policy";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default)]
    pub gateway_class_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub listeners: Vec<Value>,
    /// Whether to annotate the gateway for Kuadrant policy attachment.
    ///
    /// Absent (or `null`) means enabled, so a client that omits the flag still
    /// gets the `kuadrant.io/policy: enabled` annotation. Only an explicit
    /// `false` leaves it off.
    #[serde(default)]
    pub kuadrant_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    pub gateway_class_name: String,
    pub listeners: Vec<Value>,
}

fn default_listeners() -> Vec<Value> {
    vec![json!({
        "name": "http",
        "port": 80,
        "protocol": "HTTP",
    })]
}

pub fn create_gateway(params: GatewayParams) -> Result<String, ManifestError> {
    let mut metadata = ObjectMeta::new(params.name, params.namespace, "name and namespace")?;
    if params.kuadrant_enabled.unwrap_or(true) {
        metadata
            .annotations
            .insert(POLICY_ANNOTATION.into(), "enabled".into());
    }

    let listeners = if params.listeners.is_empty() {
        default_listeners()
    } else {
        params.listeners
    };

    let spec = GatewaySpec {
        gateway_class_name: non_blank(params.gateway_class_name)
            .unwrap_or_else(|| DEFAULT_GATEWAY_CLASS.to_string()),
        listeners,
    };

    Manifest::new(GATEWAY_API_VERSION, "Gateway", metadata, spec).to_yaml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::parse_yaml;

    fn params(name: &str, namespace: &str) -> GatewayParams {
        GatewayParams {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gateway_defaults() {
        let doc = parse_yaml(&create_gateway(params("prod-gw", "ingress")).unwrap());

        assert_eq!(doc["apiVersion"], "gateway.networking.k8s.io/v1");
        assert_eq!(doc["kind"], "Gateway");
        assert_eq!(doc["metadata"]["name"], "prod-gw");
        assert_eq!(doc["metadata"]["namespace"], "ingress");
        assert_eq!(doc["metadata"]["annotations"]["kuadrant.io/policy"], "enabled");
        assert_eq!(doc["spec"]["gatewayClassName"], "istio");
        assert_eq!(doc["spec"]["listeners"][0]["name"], "http");
        assert_eq!(doc["spec"]["listeners"][0]["port"], 80);
        assert_eq!(doc["spec"]["listeners"][0]["protocol"], "HTTP");
    }

    #[test]
    fn test_gateway_kuadrant_disabled_has_no_annotation() {
        let mut p = params("gw", "default");
        p.kuadrant_enabled = Some(false);
        let yaml = create_gateway(p).unwrap();
        assert!(!yaml.contains("annotations"));
    }

    #[test]
    fn test_gateway_custom_class_and_listeners() {
        let mut p = params("gw", "default");
        p.gateway_class_name = Some("envoy-gateway".into());
        p.listeners = vec![json!({
            "name": "https",
            "port": 443,
            "protocol": "HTTPS",
            "hostname": "*.example.com",
        })];
        let doc = parse_yaml(&create_gateway(p).unwrap());

        assert_eq!(doc["spec"]["gatewayClassName"], "envoy-gateway");
        assert_eq!(doc["spec"]["listeners"].as_array().unwrap().len(), 1);
        assert_eq!(doc["spec"]["listeners"][0]["hostname"], "*.example.com");
    }

    #[test]
    fn test_gateway_blank_class_uses_default() {
        let mut p = params("gw", "default");
        p.gateway_class_name = Some(String::new());
        let doc = parse_yaml(&create_gateway(p).unwrap());
        assert_eq!(doc["spec"]["gatewayClassName"], "istio");
    }

    #[test]
    fn test_gateway_requires_name_and_namespace() {
        let err = create_gateway(params("", "ns")).unwrap_err();
        assert_eq!(err.to_string(), "name and namespace are required");
    }

    #[test]
    fn test_gateway_params_from_json() {
        let p: GatewayParams = serde_json::from_value(json!({
            "name": "gw",
            "namespace": "ns",
            "gatewayClassName": "istio",
            "kuadrantEnabled": false,
        }))
        .unwrap();
        assert_eq!(p.kuadrant_enabled, Some(false));
        assert_eq!(p.gateway_class_name.as_deref(), Some("istio"));
        assert!(p.listeners.is_empty());
    }

    #[test]
    fn test_gateway_kuadrant_enabled_absent_or_null_annotates() {
        for args in [
            json!({"name": "gw", "namespace": "ns"}),
            json!({"name": "gw", "namespace": "ns", "kuadrantEnabled": null}),
        ] {
            let p: GatewayParams = serde_json::from_value(args).unwrap();
            assert_eq!(p.kuadrant_enabled, None);
            let doc = parse_yaml(&create_gateway(p).unwrap());
            assert_eq!(doc["metadata"]["annotations"]["kuadrant.io/policy"], "enabled");
        }
    }

    #[test]
    fn test_gateway_null_listeners_use_default() {
        let p: GatewayParams = serde_json::from_value(json!({
            "name": "gw",
            "namespace": "ns",
            "listeners": null,
            "gatewayClassName": null,
        }))
        .unwrap();
        let doc = parse_yaml(&create_gateway(p).unwrap());

        assert_eq!(doc["spec"]["gatewayClassName"], "istio");
        assert_eq!(doc["spec"]["listeners"][0]["port"], 80);
    }
}
