//! Newline-delimited JSON-RPC over a byte stream (stdin/stdout in production).

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use webacy_mcp_core::SessionContext;

use crate::rpc::{JsonRpcResponse, McpService};

/// Serve requests from `reader` until end of input.
///
/// One JSON message per line; blank lines are skipped. Replies go to
/// `writer`, one per line. Nothing but JSON-RPC is ever written to it.
pub async fn serve<R, W>(
    service: Arc<McpService>,
    reader: R,
    mut writer: W,
    session: Option<SessionContext>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(message) => service.handle_value(message, session.as_ref()).await,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable message");
                Some(JsonRpcResponse::parse_error(e))
            }
        };

        if let Some(response) = response {
            let mut bytes = serde_json::to_vec(&response)?;
            bytes.push(b'\n');
            writer.write_all(&bytes).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Serve on the process's stdin and stdout.
pub async fn serve_stdio(service: Arc<McpService>) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(service, stdin, tokio::io::stdout(), None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webacy_mcp_core::test_utils::{MockAuthority, RecordingTool};
    use webacy_mcp_core::{AuthorizationGateway, Tier, TierPolicy, ToolRegistry};

    fn service() -> Arc<McpService> {
        let registry = ToolRegistry::builder(TierPolicy::from_table([("ping", Tier::Free)]))
            .add_tool(RecordingTool::new("ping", "pong").boxed())
            .build()
            .unwrap();
        Arc::new(McpService::new(
            registry,
            AuthorizationGateway::new(MockAuthority::approving()),
        ))
    }

    async fn run(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve(service(), input.as_bytes(), &mut output, None)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_reply_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"ping"}}"#, "\n",
        );
        let replies = run(input).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["result"]["content"][0]["text"], "pong");
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let replies = run("{not json}\n").await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[0]["error"]["code"], json!(-32700));
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(run("").await.is_empty());
    }
}
