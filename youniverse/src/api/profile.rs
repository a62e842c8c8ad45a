//! Profile API.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::{profile_key, CacheStorage, CacheStorageExt},
    client::{ClientInner, Order, Query},
    error::{Error, Result},
    models::{Profile, ProfileUpdate, UserId},
    views::{StudentFacets, StudentFilter},
};

const PROFILES: &str = "profiles";

/// How long a fetched profile stays cached.
const PROFILE_TTL: Duration = Duration::from_secs(300);

/// Default page size of student searches.
pub const SEARCH_PAGE_SIZE: u32 = 30;

/// API for student profiles.
pub struct ProfileApi {
    client: Arc<ClientInner>,
}

impl ProfileApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Get a profile by ID, served from the cache when possible.
    pub async fn get(&self, user_id: impl Into<UserId>) -> Result<Profile> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(Error::InvalidArgument("User ID must not be empty".into()));
        }

        let key = profile_key(&user_id);
        if let Some(ref cache) = self.client.cache {
            if let Some(profile) = cache.get_json::<Profile>(&key).await {
                log::trace!("profile cache hit for {user_id}");
                return Ok(profile);
            }
        }

        let profile: Profile = self
            .client
            .select_one(PROFILES, Query::new().eq("id", &user_id))
            .await?
            .ok_or_else(|| Error::api("404", format!("Profile {user_id} not found")))?;

        if let Some(ref cache) = self.client.cache {
            cache.set_json(&key, &profile, Some(PROFILE_TTL)).await?;
        }

        Ok(profile)
    }

    /// Get the signed-in user's profile.
    pub async fn me(&self) -> Result<Profile> {
        let viewer = self.client.viewer()?.clone();
        self.get(viewer).await
    }

    /// Search students.
    pub fn search(&self, filter: StudentFilter) -> StudentSearchBuilder {
        StudentSearchBuilder {
            client: self.client.clone(),
            filter,
            page: None,
            per_page: SEARCH_PAGE_SIZE,
            exclude_self: false,
        }
    }

    /// Update the signed-in user's profile.
    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile> {
        if update.is_empty() {
            return Err(Error::InvalidArgument("Nothing to update".into()));
        }
        if matches!(update.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(Error::InvalidArgument("Name must not be empty".into()));
        }

        let viewer = self.client.viewer()?.clone();
        let rows: Vec<Profile> = self
            .client
            .update_rows(PROFILES, &Query::new().eq("id", &viewer), &update)
            .await?;

        if let Some(ref cache) = self.client.cache {
            cache.remove(&profile_key(&viewer)).await;
        }

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::missing("updated profile row"))
    }

    /// Finish the onboarding flow: apply `update` and clear the new-user flags.
    pub async fn complete_setup(&self, update: ProfileUpdate) -> Result<Profile> {
        let update = ProfileUpdate {
            profile_completed: Some(true),
            is_new_user: Some(false),
            ..update
        };
        self.update(update).await
    }
}

/// Builder for student search requests.
pub struct StudentSearchBuilder {
    client: Arc<ClientInner>,
    filter: StudentFilter,
    page: Option<u32>,
    per_page: u32,
    exclude_self: bool,
}

impl StudentSearchBuilder {
    /// Fetch a single one-based page instead of every match.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size used with [`page`](Self::page).
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Leave the signed-in user out of the results.
    pub fn exclude_self(mut self, exclude: bool) -> Self {
        self.exclude_self = exclude;
        self
    }

    /// Execute the request.
    pub async fn send(self) -> Result<StudentSearchResult> {
        let mut query = self
            .filter
            .apply(Query::new().select("*"))
            .order("created_at", Order::Desc);
        if let Some(page) = self.page {
            query = query.page(page, self.per_page);
        }

        let mut students: Vec<Profile> = self.client.select_rows(PROFILES, &query).await?;

        if self.exclude_self {
            if let Some(viewer) = self.client.auth.as_ref().map(|a| &a.user_id) {
                students.retain(|p| &p.id != viewer);
            }
        }

        let facets = StudentFacets::collect(&students);
        Ok(StudentSearchResult {
            students,
            facets,
            page: self.page,
        })
    }
}

/// Result of a student search.
#[derive(Debug, Clone, Default)]
pub struct StudentSearchResult {
    /// Matching students, newest first.
    pub students: Vec<Profile>,
    /// Countries and courses present in the results.
    pub facets: StudentFacets,
    /// Page fetched, if paged.
    pub page: Option<u32>,
}
