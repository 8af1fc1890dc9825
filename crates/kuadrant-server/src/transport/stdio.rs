//! Newline-delimited JSON-RPC over stdin/stdout. All logs go to stderr.

use crate::mcp::{parse_error, McpServer};
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const RESPONSE_BUFFER: usize = 64;

pub async fn run(server: Arc<McpServer>) -> Result<()> {
    info!("Ready. Listening on stdio (JSON-RPC 2.0).");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("Stdin closed. Shutting down.");
    Ok(())
}

/// Each request line is handled on its own task, so a slow resource read does
/// not hold up later requests. Responses are written in completion order by a
/// single writer task. Returns once input ends and every in-flight request has
/// been answered.
///
/// A line that is not valid UTF-8 is answered with a parse error and reading
/// continues. A read error stops reading, but requests already in flight are
/// still answered before it is returned.
pub async fn serve<R, W>(server: Arc<McpServer>, input: R, output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Value>(RESPONSE_BUFFER);

    let writer = tokio::spawn(async move {
        let mut out = BufWriter::new(output);
        while let Some(response) = rx.recv().await {
            let bytes = serde_json::to_vec(&response)?;
            out.write_all(&bytes).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
        anyhow::Ok(())
    });

    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("Discarding input line that is not valid UTF-8: {e}");
                if tx.send(parse_error(format!("invalid UTF-8: {e}"))).await.is_err() {
                    debug!("Output closed, dropping response");
                }
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let line = line.to_string();
        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = server.dispatch_guarded(&line).await {
                if tx.send(response).await.is_err() {
                    debug!("Output closed, dropping response");
                }
            }
        });
    };

    // The writer ends once the last in-flight request drops its sender.
    drop(tx);
    let written = writer.await?;
    read_result.context("Failed to read request input")?;
    written
}
