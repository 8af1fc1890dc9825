use super::RpcError;
use kuadrant_core::{Catalog, DocCache, MARKDOWN_MIME_TYPE};
use serde_json::{json, Value};
use tracing::{debug, error};

pub fn list(catalog: &Catalog) -> Value {
    let resources: Vec<Value> = catalog
        .sources()
        .iter()
        .map(|source| {
            json!({
                "uri": source.uri,
                "name": source.name,
                "description": source.description,
                "mimeType": MARKDOWN_MIME_TYPE,
            })
        })
        .collect();
    json!({ "resources": resources })
}

pub async fn read(catalog: &Catalog, cache: &DocCache, uri: &str) -> Result<Value, RpcError> {
    let source = catalog
        .get(uri)
        .ok_or_else(|| RpcError::InvalidParams(format!("Unknown resource URI: {uri}")))?;

    debug!(uri, url = ?catalog.source_url(source), "Reading resource");
    let text = catalog.read(cache, source).await.map_err(|e| {
        error!(uri, error = %e, "Resource unavailable");
        RpcError::Internal(e.into())
    })?;

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": MARKDOWN_MIME_TYPE,
            "text": text,
        }]
    }))
}
