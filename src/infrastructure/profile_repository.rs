use crate::application::validators::{CreateProfileInput, UpdateProfileInput};
use crate::domain::access_profile::{AccessProfile, ProfileStatus, ScreenPermissionState};
use crate::domain::error::ProfileError;
use crate::infrastructure::{ProfileRepository, ProfileSearch, RepoResult};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use tracing::instrument;

/// Rejects `name` if another profile already uses it, ignoring case.
fn ensure_unique_name(
    profiles: &[AccessProfile],
    name: &str,
    exclude_id: Option<&str>,
) -> RepoResult<()> {
    let taken = profiles
        .iter()
        .any(|p| Some(p.id.as_str()) != exclude_id && p.name_matches(name));
    if taken {
        return Err(ProfileError::DuplicateName(name.to_string()));
    }
    Ok(())
}

fn apply_changes(profile: &mut AccessProfile, changes: UpdateProfileInput, actor: Option<String>) {
    if let Some(name) = changes.name {
        profile.name = name;
    }
    if let Some(description) = changes.description {
        profile.description = description;
    }
    if let Some(status) = changes.status {
        profile.status = status;
    }
    if let Some(permissions) = changes.permissions {
        profile.permissions = permissions;
    }
    profile.touch(actor);
}

fn build_profile(input: CreateProfileInput, actor: Option<String>) -> AccessProfile {
    AccessProfile::new(uuid::Uuid::new_v4().to_string(), input.name)
        .with_description(input.description)
        .with_status(input.status)
        .with_permissions(input.permissions)
        .created_by(actor)
}

/// Profile store kept in process memory, in creation order.
///
/// Every mutation runs its checks and its write under one write guard.
pub struct InMemoryProfileRepository {
    profiles: RwLock<Vec<AccessProfile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::with_profiles(vec![])
    }

    pub fn with_profiles(profiles: Vec<AccessProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
        }
    }
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(
        &self,
        input: CreateProfileInput,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let input = input.validate()?;
        let mut profiles = self.profiles.write().await;
        ensure_unique_name(&profiles, &input.name, None)?;
        let profile = build_profile(input, actor);
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update(
        &self,
        profile_id: &str,
        changes: UpdateProfileInput,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let changes = changes.validate()?;
        let mut profiles = self.profiles.write().await;
        let index = profiles
            .iter()
            .position(|p| p.id == profile_id)
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        if let Some(name) = &changes.name {
            ensure_unique_name(&profiles, name, Some(profile_id))?;
        }
        let profile = &mut profiles[index];
        apply_changes(profile, changes, actor);
        Ok(profile.clone())
    }

    async fn delete(&self, profile_id: &str) -> RepoResult<()> {
        let mut profiles = self.profiles.write().await;
        let index = profiles
            .iter()
            .position(|p| p.id == profile_id)
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        let users_count = profiles[index].users_count;
        if users_count > 0 {
            return Err(ProfileError::HasAssignedUsers(users_count));
        }
        profiles.remove(index);
        Ok(())
    }

    async fn toggle_status(
        &self,
        profile_id: &str,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        profile.toggle_status(actor);
        Ok(profile.clone())
    }

    async fn find_by_id(&self, profile_id: &str) -> RepoResult<Option<AccessProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    async fn search(&self, filter: &ProfileSearch) -> RepoResult<Vec<AccessProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepoResult<Vec<AccessProfile>> {
        Ok(self.profiles.read().await.clone())
    }

    async fn set_users_count(&self, profile_id: &str, users_count: usize) -> RepoResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        profile.users_count = users_count;
        Ok(())
    }
}

const PROFILE_COLUMNS: &str = "id, name, description, status, permissions, users_count, \
     created_at, updated_at, created_by, updated_by";

/// Profile store backed by the `access_profiles` table.
#[derive(Debug, Clone)]
pub struct PostgresProfileRepository {
    pub pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table and the case-insensitive name index when missing.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        for statement in include_str!("../../migrations/0001_access_profiles.sql")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_profile(row: &PgRow) -> RepoResult<AccessProfile> {
        let status: String = row.try_get("status")?;
        let permissions: Json<Vec<ScreenPermissionState>> = row.try_get("permissions")?;
        let users_count: i64 = row.try_get("users_count")?;
        Ok(AccessProfile {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: status.parse().map_err(ProfileError::Storage)?,
            permissions: permissions.0,
            users_count: usize::try_from(users_count).unwrap_or_default(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            created_by: row.try_get("created_by")?,
            updated_by: row.try_get("updated_by")?,
        })
    }

    async fn name_taken<'e, E>(executor: E, name: &str, exclude_id: Option<&str>) -> RepoResult<bool>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM access_profiles \
             WHERE lower(name) = lower($1) AND ($2::text IS NULL OR id <> $2)) AS taken",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(row.try_get("taken")?)
    }
}

/// A concurrent writer can win the race past `name_taken`; the unique index
/// still rejects the second name.
fn map_unique_violation(err: sqlx::Error, name: &str) -> ProfileError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => ProfileError::DuplicateName(name.to_string()),
        _ => err.into(),
    }
}

/// Escapes LIKE wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    #[instrument(skip(self, input))]
    async fn create(
        &self,
        input: CreateProfileInput,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let input = input.validate()?;
        let mut tx = self.pool.begin().await?;
        if Self::name_taken(&mut *tx, &input.name, None).await? {
            return Err(ProfileError::DuplicateName(input.name));
        }
        let profile = build_profile(input, actor);
        sqlx::query(
            "INSERT INTO access_profiles \
             (id, name, description, status, permissions, users_count, created_at, updated_at, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(profile.status.as_str())
        .bind(Json(&profile.permissions))
        .bind(profile.users_count as i64)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .bind(&profile.created_by)
        .bind(&profile.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &profile.name))?;
        tx.commit().await?;
        Ok(profile)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        profile_id: &str,
        changes: UpdateProfileInput,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let changes = changes.validate()?;
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM access_profiles WHERE id = $1 FOR UPDATE"
        ))
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        let mut profile = Self::row_to_profile(&row)?;

        if let Some(name) = &changes.name {
            if Self::name_taken(&mut *tx, name, Some(profile_id)).await? {
                return Err(ProfileError::DuplicateName(name.clone()));
            }
        }
        apply_changes(&mut profile, changes, actor);

        sqlx::query(
            "UPDATE access_profiles SET name = $2, description = $3, status = $4, permissions = $5, \
             updated_at = $6, updated_by = $7 WHERE id = $1",
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(profile.status.as_str())
        .bind(Json(&profile.permissions))
        .bind(profile.updated_at)
        .bind(&profile.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &profile.name))?;
        tx.commit().await?;
        Ok(profile)
    }

    #[instrument(skip(self))]
    async fn delete(&self, profile_id: &str) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT users_count FROM access_profiles WHERE id = $1 FOR UPDATE")
            .bind(profile_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        let users_count: i64 = row.try_get("users_count")?;
        if users_count > 0 {
            return Err(ProfileError::HasAssignedUsers(users_count as usize));
        }
        sqlx::query("DELETE FROM access_profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn toggle_status(
        &self,
        profile_id: &str,
        actor: Option<String>,
    ) -> RepoResult<AccessProfile> {
        let row = sqlx::query(&format!(
            "UPDATE access_profiles SET \
             status = CASE status WHEN 'active' THEN 'inactive' ELSE 'active' END, \
             updated_at = now(), updated_by = $2 \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(profile_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))?;
        Self::row_to_profile(&row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, profile_id: &str) -> RepoResult<Option<AccessProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM access_profiles WHERE id = $1"
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_profile).transpose()
    }

    #[instrument(skip(self))]
    async fn search(&self, filter: &ProfileSearch) -> RepoResult<Vec<AccessProfile>> {
        let pattern = filter
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(like_pattern);
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM access_profiles \
             WHERE ($1::text IS NULL \
                    OR lower(name) LIKE $1 ESCAPE '\\' \
                    OR lower(coalesce(description, '')) LIKE $1 ESCAPE '\\') \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at, id"
        ))
        .bind(pattern)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_profile).collect()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<AccessProfile>> {
        self.search(&ProfileSearch::default()).await
    }

    #[instrument(skip(self))]
    async fn set_users_count(&self, profile_id: &str, users_count: usize) -> RepoResult<()> {
        let result = sqlx::query("UPDATE access_profiles SET users_count = $2 WHERE id = $1")
            .bind(profile_id)
            .bind(users_count as i64)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ProfileError::NotFound(profile_id.to_string()));
        }
        Ok(())
    }
}
