use crate::config::ChainConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// 确认级别的排序，达到或超过配置级别即视为确认
fn commitment_rank(commitment: &str) -> Option<u8> {
    match commitment {
        "processed" => Some(0),
        "confirmed" => Some(1),
        "finalized" => Some(2),
        _ => None,
    }
}

/// 交易当前状态是否满足所需确认级别
pub fn meets_commitment(status: &str, required: &str) -> bool {
    match (commitment_rank(status), commitment_rank(required)) {
        (Some(got), Some(want)) => got >= want,
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    value: Vec<Option<SignatureStatus>>,
}

#[derive(Debug, Deserialize)]
struct SignatureStatus {
    #[serde(rename = "confirmationStatus")]
    confirmation_status: Option<String>,
    err: Option<serde_json::Value>,
}

/// 链上 JSON-RPC 客户端，只做一件事：查交易签名是否已确认。
#[derive(Clone)]
pub struct ChainRpcService {
    client: Client,
    config: ChainConfig,
}

impl ChainRpcService {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 查询签名确认状态。已确认返回 true，尚未确认或交易失败返回 false，
    /// RPC 本身不可用上抛 UpstreamError。
    pub async fn confirm_signature(&self, signature: &str) -> AppResult<bool> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getSignatureStatuses",
            "params": [
                [signature],
                {"searchTransactionHistory": true}
            ]
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&payload)
            .send()
            .await?;
        let body: RpcResponse = response.json().await?;

        if let Some(err) = body.error {
            return Err(AppError::UpstreamError(format!("链上 RPC 返回错误: {err}")));
        }
        let result = body
            .result
            .ok_or_else(|| AppError::UpstreamError("链上 RPC 响应缺少 result".to_string()))?;

        let Some(Some(status)) = result.value.into_iter().next() else {
            // 节点找不到这笔交易，视为尚未确认
            return Ok(false);
        };

        // 交易上链但执行失败的，不能作为有效支付
        if status.err.is_some() {
            return Ok(false);
        }

        Ok(status
            .confirmation_status
            .as_deref()
            .is_some_and(|s| meets_commitment(s, &self.config.commitment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_commitment_ordering() {
        assert!(meets_commitment("finalized", "confirmed"));
        assert!(meets_commitment("confirmed", "confirmed"));
        assert!(meets_commitment("confirmed", "processed"));
        assert!(!meets_commitment("processed", "confirmed"));
        assert!(!meets_commitment("processed", "finalized"));
    }

    #[test]
    fn test_meets_commitment_unknown_level() {
        assert!(!meets_commitment("bogus", "confirmed"));
        assert!(!meets_commitment("confirmed", "bogus"));
    }

    #[test]
    fn test_rpc_response_parses_missing_status() {
        let body: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":[null]}}"#,
        )
        .unwrap();
        assert!(body.error.is_none());
        let value = body.result.unwrap().value;
        assert_eq!(value.len(), 1);
        assert!(value[0].is_none());
    }

    #[test]
    fn test_rpc_response_parses_confirmed_status() {
        let body: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"value":[{"confirmationStatus":"finalized","err":null,"slot":5}]}}"#,
        )
        .unwrap();
        let status = body.result.unwrap().value.remove(0).unwrap();
        assert_eq!(status.confirmation_status.as_deref(), Some("finalized"));
        assert!(status.err.is_none());
    }
}
