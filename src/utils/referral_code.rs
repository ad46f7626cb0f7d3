use crate::entities::owner_entity as owners;
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// 生成6位大写字母数字推荐码
pub fn random_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| {
            let chars = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect()
}

/// 生成未被占用的推荐码
pub async fn generate_unique_referral_code(pool: &DatabaseConnection) -> AppResult<String> {
    loop {
        let code = random_referral_code();

        let exists = owners::Entity::find()
            .filter(owners::Column::ReferralCode.eq(code.clone()))
            .count(pool)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_referral_code_shape() {
        let code = random_referral_code();
        assert_eq!(code.len(), 6);
        // 字符集排除了易混淆的 0/O/1/I
        assert!(code.chars().all(|c| {
            c.is_ascii_uppercase() && c != 'O' && c != 'I'
                || c.is_ascii_digit() && c != '0' && c != '1'
        }));
    }

    #[test]
    fn test_random_referral_code_runs() {
        let code1 = random_referral_code();
        let code2 = random_referral_code();
        assert_eq!(code1.len(), 6);
        assert_eq!(code2.len(), 6);
    }
}
