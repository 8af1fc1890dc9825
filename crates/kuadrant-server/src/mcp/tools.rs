//! Manifest generation tools.
//!
//! A tool that rejects its arguments still answers with a normal tool result,
//! flagged `isError`, so the calling model can read the message and retry.

use super::RpcError;
use kuadrant_core::manifests::{
    create_authpolicy, create_dnspolicy, create_gateway, create_httproute, create_ratelimitpolicy,
    create_tlspolicy,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

// ── Tool schemas ─────────────────────────────────────────────────────────────

fn target_ref_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "group": {"type": "string", "description": "API group (default: gateway.networking.k8s.io)"},
            "kind": {"type": "string"},
            "name": {"type": "string"},
            "sectionName": {"type": "string"}
        },
        "required": ["kind", "name"]
    })
}

pub fn tools_schema() -> Value {
    json!({
        "tools": [
            {
                "name": "create_gateway",
                "description": "Generate a Gateway manifest with Kuadrant annotations",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the Gateway resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the Gateway"},
                        "gatewayClassName": {"type": "string", "description": "Gateway implementation to use (default: istio)"},
                        "listeners": {
                            "type": "array",
                            "items": {"type": "object"},
                            "description": "Gateway listeners configuration (default: one HTTP listener on port 80)"
                        },
                        "kuadrantEnabled": {"type": "boolean", "description": "Enable Kuadrant policy attachment (default: true)"}
                    },
                    "required": ["name", "namespace"]
                }
            },
            {
                "name": "create_httproute",
                "description": "Generate an HTTPRoute manifest",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the HTTPRoute resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the HTTPRoute"},
                        "parentRefs": {
                            "type": "array",
                            "items": {"type": "object"},
                            "description": "References to Gateway resources"
                        },
                        "hostnames": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Hostnames this route handles"
                        },
                        "rules": {
                            "type": "array",
                            "items": {"type": "object"},
                            "description": "Routing rules configuration"
                        }
                    },
                    "required": ["name", "namespace", "parentRefs"]
                }
            },
            {
                "name": "create_dnspolicy",
                "description": "Generate a Kuadrant DNSPolicy manifest",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the DNSPolicy resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the DNSPolicy"},
                        "targetRef": target_ref_schema("Reference to the target Gateway"),
                        "providerRefs": {
                            "type": "array",
                            "items": {"type": "object"},
                            "description": "DNS provider credential secrets"
                        },
                        "providerRef": {"type": "object", "description": "Legacy single provider reference"},
                        "loadBalancing": {"type": "object", "description": "Load balancing configuration (weight, geo, defaultGeo)"},
                        "healthCheck": {"type": "object", "description": "Health check configuration"}
                    },
                    "required": ["name", "namespace", "targetRef"]
                }
            },
            {
                "name": "create_tlspolicy",
                "description": "Generate a Kuadrant TLSPolicy manifest",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the TLSPolicy resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the TLSPolicy"},
                        "targetRef": target_ref_schema("Reference to the target Gateway"),
                        "issuerRef": {
                            "type": "object",
                            "description": "Reference to the cert-manager issuer (group defaults to cert-manager.io)",
                            "properties": {
                                "group": {"type": "string"},
                                "kind": {"type": "string"},
                                "name": {"type": "string"}
                            },
                            "required": ["kind", "name"]
                        },
                        "commonName": {"type": "string", "description": "Common name for the certificate"},
                        "duration": {"type": "string", "description": "Certificate duration (e.g. 2160h)"},
                        "renewBefore": {"type": "string", "description": "When to renew before expiry (e.g. 720h)"}
                    },
                    "required": ["name", "namespace", "targetRef", "issuerRef"]
                }
            },
            {
                "name": "create_ratelimitpolicy",
                "description": "Generate a Kuadrant RateLimitPolicy manifest",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the RateLimitPolicy resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the RateLimitPolicy"},
                        "targetRef": target_ref_schema("Reference to the target Gateway or HTTPRoute"),
                        "limits": {
                            "type": "object",
                            "description": "Named rate limit configurations (default: global, 10 requests per 60s)",
                            "additionalProperties": {
                                "type": "object",
                                "properties": {
                                    "rates": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "limit": {"type": "integer", "minimum": 0, "description": "Number of requests allowed"},
                                                "window": {"type": "string", "pattern": "^[0-9]+[smh]$", "description": "Time window (e.g. 10s, 5m, 1h)"}
                                            },
                                            "required": ["limit", "window"]
                                        }
                                    },
                                    "when": {
                                        "type": "array",
                                        "items": {"type": "object"},
                                        "description": "Optional conditions for applying this limit"
                                    }
                                },
                                "required": ["rates"]
                            }
                        },
                        "defaults": {"type": "object", "description": "Default rate limit rules"},
                        "overrides": {"type": "object", "description": "Override rate limit rules"}
                    },
                    "required": ["name", "namespace", "targetRef"]
                }
            },
            {
                "name": "create_authpolicy",
                "description": "Generate a Kuadrant AuthPolicy manifest",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Name of the AuthPolicy resource"},
                        "namespace": {"type": "string", "description": "Kubernetes namespace for the AuthPolicy"},
                        "targetRef": target_ref_schema("Reference to the target Gateway or HTTPRoute"),
                        "rules": {"type": "object", "description": "Authentication and authorization rules"},
                        "defaults": {"type": "object", "description": "Default auth rules"},
                        "overrides": {"type": "object", "description": "Override auth rules"}
                    },
                    "required": ["name", "namespace", "targetRef"]
                }
            }
        ]
    })
}

// ── Tool implementations ──────────────────────────────────────────────────────

fn parse_args<T: DeserializeOwned>(name: &str, args: Value) -> Result<T, RpcError> {
    serde_json::from_value(args)
        .map_err(|e| RpcError::InvalidParams(format!("Invalid arguments for {name}: {e}")))
}

fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error,
    })
}

/// Run a tool and wrap its output as an MCP tool result.
pub fn call_tool(name: &str, args: Value) -> Result<Value, RpcError> {
    info!(tool = name, "Tool called");

    let generated = match name {
        "create_gateway" => create_gateway(parse_args(name, args)?),
        "create_httproute" => create_httproute(parse_args(name, args)?),
        "create_dnspolicy" => create_dnspolicy(parse_args(name, args)?),
        "create_tlspolicy" => create_tlspolicy(parse_args(name, args)?),
        "create_ratelimitpolicy" => create_ratelimitpolicy(parse_args(name, args)?),
        "create_authpolicy" => create_authpolicy(parse_args(name, args)?),
        _ => return Err(RpcError::InvalidParams(format!("Unknown tool: {name}"))),
    };

    Ok(match generated {
        Ok(yaml) => text_result(yaml, false),
        Err(e) => {
            warn!(tool = name, error = %e, "Tool rejected its arguments");
            text_result(format!("Error: {e}"), true)
        }
    })
}
