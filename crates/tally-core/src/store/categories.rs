//! Default category seeding for new users.

use crate::error::StoreResult;
use crate::models::DEFAULT_CATEGORIES;

use super::repository::{create_typed, Filter, QueryOptions, Repository};

/// Collection categories are stored in.
pub const CATEGORIES: &str = "categories";

/// Give `user_id` the default system categories, unless they already have
/// at least one category of any kind.
///
/// Returns how many categories were created.
pub async fn initialize_default_categories<R>(repo: &R, user_id: &str) -> StoreResult<usize>
where
    R: Repository + ?Sized,
{
    let existing = repo
        .query(
            CATEGORIES,
            &QueryOptions::new().filter(Filter::eq("userId", user_id)).limit(1),
        )
        .await?;
    if !existing.is_empty() {
        tracing::debug!("User {user_id} already has categories, skipping initialization");
        return Ok(0);
    }

    for template in &DEFAULT_CATEGORIES {
        create_typed(repo, CATEGORIES, &template.for_user(user_id)).await?;
    }
    tracing::info!(
        "Created {} default categories for user {user_id}",
        DEFAULT_CATEGORIES.len()
    );
    Ok(DEFAULT_CATEGORIES.len())
}
