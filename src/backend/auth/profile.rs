//! Cached user and profile lookups
//!
//! `user:{id}` holds the account without secrets and `profile:{id}` the
//! public part shown next to messages. Writers call `invalidate` after
//! changing either.

use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::users::{get_user_by_id, PublicUser};
use crate::backend::cache::CacheService;
use crate::shared::Profile;

pub async fn cached_user(pool: &PgPool, cache: &CacheService, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
    let key = cache.key(format!("user:{id}"));
    cache
        .cached(&key, || async move {
            let user = get_user_by_id(pool, id).await?;
            Ok(user.as_ref().map(PublicUser::from))
        })
        .await
}

pub async fn cached_profile(pool: &PgPool, cache: &CacheService, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    let key = cache.key(format!("profile:{id}"));
    cache
        .cached(&key, || async move {
            let user = get_user_by_id(pool, id).await?;
            Ok(user.as_ref().map(Profile::from))
        })
        .await
}

/// Drop both cached views of a user
pub async fn invalidate(cache: &CacheService, id: Uuid) {
    cache.clear(&cache.key(format!("user:{id}"))).await;
    cache.clear(&cache.key(format!("profile:{id}"))).await;
}
