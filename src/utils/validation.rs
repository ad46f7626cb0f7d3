use crate::error::{AppError, AppResult};
use regex::Regex;

/// 验证钱包地址格式（base58，32-44 位）
pub fn validate_owner_key(owner_key: &str) -> AppResult<()> {
    let key_regex = Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap();

    if !key_regex.is_match(owner_key) {
        return Err(AppError::ValidationError(
            "钱包地址格式无效，必须是 base58 编码的公钥".to_string(),
        ));
    }

    Ok(())
}

/// 验证链上转账签名格式（base58，64-88 位）
pub fn validate_payment_proof(proof: &str) -> AppResult<()> {
    let proof_regex = Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{64,88}$").unwrap();

    if !proof_regex.is_match(proof) {
        return Err(AppError::ValidationError(
            "支付凭证格式无效，必须是 base58 编码的交易签名".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_owner_key() {
        assert!(validate_owner_key("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").is_ok());
        // 太短
        assert!(validate_owner_key("9xQeWvG816bUx9EPjHmaT23").is_err());
        // 包含 base58 以外的字符（0、O、I、l）
        assert!(validate_owner_key("0xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").is_err());
        assert!(validate_owner_key("").is_err());
    }

    #[test]
    fn test_validate_payment_proof() {
        let sig = "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";
        assert!(validate_payment_proof(sig).is_ok());
        assert!(validate_payment_proof("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").is_err());
        assert!(validate_payment_proof("not-a-signature").is_err());
    }
}
