//! Database operations for `session_brands`.

use brandscope_core::{BrandProfile, Platform};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `session_brands` table. Position 0 is the focus brand.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionBrandRow {
    pub id: i64,
    pub session_id: i64,
    pub name: String,
    pub is_focus: bool,
    pub position: i32,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub facebook_handle: Option<String>,
    pub youtube_handle: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionBrandRow {
    fn handle_column(&self, platform: Platform) -> Option<&String> {
        match platform {
            Platform::Instagram => self.instagram_handle.as_ref(),
            Platform::TikTok => self.tiktok_handle.as_ref(),
            Platform::Twitter => self.twitter_handle.as_ref(),
            Platform::Facebook => self.facebook_handle.as_ref(),
            Platform::YouTube => self.youtube_handle.as_ref(),
        }
    }

    /// Rebuild the brand profile, skipping blank handle columns.
    #[must_use]
    pub fn to_profile(&self) -> BrandProfile {
        Platform::ALL
            .into_iter()
            .fold(BrandProfile::new(self.name.clone()), |profile, platform| {
                match self.handle_column(platform) {
                    Some(h) if !h.trim().is_empty() => profile.with_handle(platform, h.clone()),
                    _ => profile,
                }
            })
    }
}

/// Inserts `focus` at position 0 followed by `competitors`, in one
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written then.
pub async fn insert_session_brands(
    pool: &PgPool,
    session_id: i64,
    focus: &BrandProfile,
    competitors: &[BrandProfile],
) -> Result<Vec<SessionBrandRow>, DbError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(competitors.len() + 1);

    for (position, brand) in std::iter::once(focus).chain(competitors).enumerate() {
        let position = i32::try_from(position).unwrap_or(i32::MAX);
        let row = sqlx::query_as::<_, SessionBrandRow>(
            "INSERT INTO session_brands \
                 (session_id, name, is_focus, position, instagram_handle, tiktok_handle, \
                  twitter_handle, facebook_handle, youtube_handle) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, session_id, name, is_focus, position, instagram_handle, \
                       tiktok_handle, twitter_handle, facebook_handle, youtube_handle, created_at",
        )
        .bind(session_id)
        .bind(&brand.name)
        .bind(position == 0)
        .bind(position)
        .bind(brand.handle(Platform::Instagram))
        .bind(brand.handle(Platform::TikTok))
        .bind(brand.handle(Platform::Twitter))
        .bind(brand.handle(Platform::Facebook))
        .bind(brand.handle(Platform::YouTube))
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}

/// Lists a session's brands, focus first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_session_brands(
    pool: &PgPool,
    session_id: i64,
) -> Result<Vec<SessionBrandRow>, DbError> {
    let rows = sqlx::query_as::<_, SessionBrandRow>(
        "SELECT id, session_id, name, is_focus, position, instagram_handle, tiktok_handle, \
                twitter_handle, facebook_handle, youtube_handle, created_at \
         FROM session_brands \
         WHERE session_id = $1 \
         ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
