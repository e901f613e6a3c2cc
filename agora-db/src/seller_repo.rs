use agora_catalog::store::SubscriptionTier;
use agora_catalog::verification::{
    Decision, VerificationError, VerificationRequest, VerificationStatus,
};
use agora_core::repository::VerificationRepository;
use agora_core::BoxError;
use agora_shared::models::profile::{Profile, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgSellerRepository {
    pool: PgPool,
}

impl PgSellerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    display_name: String,
    role: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, BoxError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| format!("Unknown role in database: {}", self.role))?;
        Ok(Profile {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    profile_id: Uuid,
    store_name: String,
    message: Option<String>,
    status: String,
    rejection_reason: Option<String>,
    submitted_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
}

impl RequestRow {
    fn into_request(self) -> Result<VerificationRequest, BoxError> {
        let status = VerificationStatus::parse(&self.status)
            .ok_or_else(|| format!("Unknown verification status in database: {}", self.status))?;
        Ok(VerificationRequest {
            id: self.id,
            profile_id: self.profile_id,
            store_name: self.store_name,
            message: self.message,
            status,
            rejection_reason: self.rejection_reason,
            submitted_at: self.submitted_at,
            decided_at: self.decided_at,
            decided_by: self.decided_by,
        })
    }
}

const REQUEST_COLUMNS: &str =
    "id, profile_id, store_name, message, status, rejection_reason, submitted_at, decided_at, decided_by";

/// URL-safe slug for a new store, suffixed so collisions can't happen.
fn slugify(name: &str) -> String {
    let base: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = base.trim_matches('-');
    let mut short = Uuid::new_v4().simple().to_string();
    short.truncate(8);
    if trimmed.is_empty() {
        format!("store-{}", short)
    } else {
        format!("{}-{}", trimmed, short)
    }
}

#[async_trait]
impl VerificationRepository for PgSellerRepository {
    async fn create_profile(
        &self,
        email: &str,
        display_name: &str,
        role: Role,
    ) -> Result<Profile, BoxError> {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            role,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, display_name, role, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(profile.is_verified)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, BoxError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, display_name, role, is_verified, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProfileRow::into_profile).transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, BoxError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, display_name, role, is_verified, created_at, updated_at FROM profiles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    /// Submitting while a pending request exists returns that request
    /// unchanged; a rejected one is resubmitted; an approved one is final.
    async fn submit_request(
        &self,
        profile_id: Uuid,
        store_name: &str,
        message: Option<&str>,
    ) -> Result<VerificationRequest, BoxError> {
        let existing = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM verification_requests WHERE profile_id = $1 ORDER BY submitted_at DESC LIMIT 1",
            REQUEST_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            let mut request = row.into_request()?;
            match request.status {
                VerificationStatus::Pending => return Ok(request),
                VerificationStatus::Approved => {
                    return Err(Box::new(VerificationError::AlreadyDecided {
                        status: VerificationStatus::Approved,
                    }))
                }
                VerificationStatus::Rejected => {
                    request.resubmit(message.map(String::from))?;
                    sqlx::query(
                        r#"
                        UPDATE verification_requests
                        SET status = $1, message = $2, submitted_at = $3,
                            decided_at = NULL, decided_by = NULL
                        WHERE id = $4
                        "#,
                    )
                    .bind(request.status.as_str())
                    .bind(&request.message)
                    .bind(request.submitted_at)
                    .bind(request.id)
                    .execute(&self.pool)
                    .await?;
                    return Ok(request);
                }
            }
        }

        let request =
            VerificationRequest::new(profile_id, store_name.to_string(), message.map(String::from));
        sqlx::query(
            r#"
            INSERT INTO verification_requests (id, profile_id, store_name, message, status, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.id)
        .bind(request.profile_id)
        .bind(&request.store_name)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(request.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<VerificationRequest>, BoxError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM verification_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RequestRow::into_request).transpose()
    }

    async fn list_requests(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<VerificationRequest>, BoxError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, RequestRow>(&format!(
                    "SELECT {} FROM verification_requests WHERE status = $1 ORDER BY submitted_at",
                    REQUEST_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RequestRow>(&format!(
                    "SELECT {} FROM verification_requests ORDER BY submitted_at",
                    REQUEST_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(RequestRow::into_request).collect()
    }

    /// The one decision path. Locks the request row, runs the state machine,
    /// then writes the request and the applicant's profile/store flags in
    /// the same transaction, so the two-table update can't half-apply.
    async fn decide_request(
        &self,
        request_id: Uuid,
        decision: Decision,
        reason: Option<&str>,
        decided_by: &str,
    ) -> Result<VerificationRequest, BoxError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM verification_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(Box::new(VerificationError::NotFound(request_id.to_string())));
        };
        let mut request = row.into_request()?;
        request.decide(decision, reason.map(String::from), decided_by)?;

        sqlx::query(
            r#"
            UPDATE verification_requests
            SET status = $1, rejection_reason = $2, decided_at = $3, decided_by = $4
            WHERE id = $5
            "#,
        )
        .bind(request.status.as_str())
        .bind(&request.rejection_reason)
        .bind(request.decided_at)
        .bind(&request.decided_by)
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

        if decision == Decision::Approve {
            sqlx::query(
                "UPDATE profiles SET role = $1, is_verified = TRUE, updated_at = NOW() WHERE id = $2",
            )
            .bind(Role::Seller.as_str())
            .bind(request.profile_id)
            .execute(&mut *tx)
            .await?;

            let store_id: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM stores WHERE owner_id = $1")
                    .bind(request.profile_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match store_id {
                Some(store_id) => {
                    sqlx::query(
                        "UPDATE stores SET is_verified = TRUE, updated_at = NOW() WHERE id = $1",
                    )
                    .bind(store_id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    // First approval creates the store on the entry tier.
                    sqlx::query(
                        r#"
                        INSERT INTO stores (id, owner_id, name, slug, tier, is_verified, created_at, updated_at)
                        VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), NOW())
                        "#,
                    )
                    .bind(Uuid::new_v4())
                    .bind(request.profile_id)
                    .bind(&request.store_name)
                    .bind(slugify(&request.store_name))
                    .bind(SubscriptionTier::Basic.as_str())
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_normalizes_names() {
        let slug = slugify("Maker & Co. Shop");
        assert!(slug.starts_with("maker---co--shop-"));
        assert!(!slug.contains(' '));
        assert!(!slug.contains('&'));
    }

    #[test]
    fn test_slugify_handles_empty_names() {
        let slug = slugify("!!!");
        assert!(slug.starts_with("store-"));
    }
}
