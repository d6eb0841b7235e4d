/// Profile model and database operations
///
/// Each user owns at most one profile, created at signup completion. The
/// profile aggregates exactly one location and any number of social links;
/// all three tables cascade-delete with the owning user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     about TEXT NOT NULL DEFAULT '',
///     website VARCHAR(512) NOT NULL DEFAULT '',
///     is_mentor BOOLEAN NOT NULL DEFAULT FALSE,
///     is_mentor_manager BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE locations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     profile_id UUID NOT NULL UNIQUE REFERENCES profiles(id) ON DELETE CASCADE,
///     city VARCHAR(100) NOT NULL,
///     state VARCHAR(100) NOT NULL,
///     country VARCHAR(100) NOT NULL
/// );
///
/// CREATE TABLE social_links (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     profile_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     url VARCHAR(512) NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// City/state/country triple owned by a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Named external link on a profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialLink {
    /// Link ID (used for removal)
    pub id: Uuid,

    /// Display name, e.g. "github"
    pub name: String,

    /// Link target
    pub url: String,
}

/// Input for a social link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSocialLink {
    pub name: String,
    pub url: String,
}

/// Profile aggregate: profile row plus its location and social links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile ID
    pub id: Uuid,

    /// Owning user (1:1)
    pub user_id: Uuid,

    /// Free-text bio
    pub about: String,

    /// Personal website URL
    pub website: String,

    /// Whether the user acts as a mentor
    pub is_mentor: bool,

    /// Whether the user manages other mentors
    pub is_mentor_manager: bool,

    /// Exactly one location, created with the profile
    pub location: Location,

    /// Zero or more social links, order irrelevant
    pub social_links: Vec<SocialLink>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a profile at signup completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub about: String,
    pub website: String,

    #[serde(default)]
    pub is_mentor: bool,

    #[serde(default)]
    pub is_mentor_manager: bool,

    pub location: Location,

    #[serde(default)]
    pub social_links: Vec<NewSocialLink>,
}

/// Bare profile row, assembled into the aggregate after child queries
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    about: String,
    website: String,
    is_mentor: bool,
    is_mentor_manager: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile with its location and social links in one transaction
    ///
    /// The returned aggregate echoes the submitted location and links.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: NewProfile,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (user_id, about, website, is_mentor, is_mentor_manager)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, about, website, is_mentor, is_mentor_manager,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&data.about)
        .bind(&data.website)
        .bind(data.is_mentor)
        .bind(data.is_mentor_manager)
        .fetch_one(&mut *tx)
        .await?;

        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (profile_id, city, state, country)
            VALUES ($1, $2, $3, $4)
            RETURNING city, state, country
            "#,
        )
        .bind(row.id)
        .bind(&data.location.city)
        .bind(&data.location.state)
        .bind(&data.location.country)
        .fetch_one(&mut *tx)
        .await?;

        let mut social_links = Vec::with_capacity(data.social_links.len());
        for link in &data.social_links {
            let created = sqlx::query_as::<_, SocialLink>(
                r#"
                INSERT INTO social_links (profile_id, name, url)
                VALUES ($1, $2, $3)
                RETURNING id, name, url
                "#,
            )
            .bind(row.id)
            .bind(&link.name)
            .bind(&link.url)
            .fetch_one(&mut *tx)
            .await?;
            social_links.push(created);
        }

        tx.commit().await?;

        Ok(Self::assemble(row, location, social_links))
    }

    /// Loads the profile aggregate for a user, if one exists
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, about, website, is_mentor, is_mentor_manager,
                   created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let location = sqlx::query_as::<_, Location>(
            "SELECT city, state, country FROM locations WHERE profile_id = $1",
        )
        .bind(row.id)
        .fetch_one(pool)
        .await?;

        let social_links = sqlx::query_as::<_, SocialLink>(
            "SELECT id, name, url FROM social_links WHERE profile_id = $1",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;

        Ok(Some(Self::assemble(row, location, social_links)))
    }

    /// Adds a social link to a profile
    pub async fn add_social_link(
        pool: &PgPool,
        profile_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, sqlx::Error> {
        let created = sqlx::query_as::<_, SocialLink>(
            r#"
            INSERT INTO social_links (profile_id, name, url)
            VALUES ($1, $2, $3)
            RETURNING id, name, url
            "#,
        )
        .bind(profile_id)
        .bind(link.name)
        .bind(link.url)
        .fetch_one(pool)
        .await?;

        Ok(created)
    }

    /// Removes a social link; returns false if it did not belong to the profile
    pub async fn remove_social_link(
        pool: &PgPool,
        profile_id: Uuid,
        link_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM social_links WHERE id = $1 AND profile_id = $2")
            .bind(link_id)
            .bind(profile_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user's profile; children cascade at the schema level
    pub async fn delete_by_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn assemble(row: ProfileRow, location: Location, social_links: Vec<SocialLink>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            about: row.about,
            website: row.website,
            is_mentor: row.is_mentor,
            is_mentor_manager: row.is_mentor_manager,
            location,
            social_links,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let json = r#"{
            "about": "Ten years of embedded work",
            "website": "https://example.com",
            "location": {"city": "Lagos", "state": "Lagos", "country": "Nigeria"}
        }"#;

        let profile: NewProfile = serde_json::from_str(json).unwrap();
        assert!(!profile.is_mentor);
        assert!(!profile.is_mentor_manager);
        assert!(profile.social_links.is_empty());
        assert_eq!(profile.location.city, "Lagos");
    }
}
