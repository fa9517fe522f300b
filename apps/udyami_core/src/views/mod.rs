pub mod community;
pub mod course;
pub mod product;
pub mod upload;
pub mod user_auth;
pub mod users;

use sea_orm::sea_query::LikeExpr;

use crate::errors::ApiError;
use crate::models::user::{self, Role};

/// Offset for a 1-based page. Saturates instead of overflowing on absurd
/// page numbers, and stays within i64 so the database accepts it.
pub(crate) fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(limit)
        .min(i64::MAX as u64)
}

/// Builds a case-normalized substring pattern for keyword search.
/// `%`, `_` and the escape character itself are escaped so user input
/// matches literally instead of acting as LIKE wildcards.
pub(crate) fn like_pattern(keyword: &str) -> LikeExpr {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}

/// Writes to owned resources are allowed for the owner and for admins.
pub(crate) fn require_owner_or_admin(
    requester: &user::Model,
    owner_id: i64,
    what: &str,
) -> Result<(), ApiError> {
    if requester.id == owner_id || requester.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Not authorized to modify this {what}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn offset_is_zero_based_from_page_one() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn offset_saturates_on_huge_pages() {
        assert_eq!(page_offset(u64::MAX, 10), i64::MAX as u64);
        assert_eq!(page_offset(u64::MAX, u64::MAX), i64::MAX as u64);
    }
}
