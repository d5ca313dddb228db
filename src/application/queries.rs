use crate::domain::access_profile::ProfileStatus;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Query to fetch one access profile by id
#[derive(Debug, Clone)]
pub struct GetProfileByIdQuery {
    pub query_id: String,
    pub timestamp: DateTime<Utc>,
    pub profile_id: String,
}

/// Query to search access profiles by name/description and status
#[derive(Debug, Clone)]
pub struct SearchProfilesQuery {
    pub query_id: String,
    pub timestamp: DateTime<Utc>,
    pub term: Option<String>,
    pub status: Option<ProfileStatus>,
}

/// Query to read the permission catalog (modules and their screens)
#[derive(Debug, Clone)]
pub struct GetPermissionCatalogQuery {
    pub query_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Query factory for creating queries
pub struct QueryFactory;

impl QueryFactory {
    pub fn get_profile_by_id(profile_id: String) -> GetProfileByIdQuery {
        GetProfileByIdQuery {
            query_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            profile_id,
        }
    }

    pub fn search_profiles(
        term: Option<String>,
        status: Option<ProfileStatus>,
    ) -> SearchProfilesQuery {
        SearchProfilesQuery {
            query_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            term,
            status,
        }
    }

    pub fn get_permission_catalog() -> GetPermissionCatalogQuery {
        GetPermissionCatalogQuery {
            query_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_profiles_query_creation() {
        let query = QueryFactory::search_profiles(
            Some("adv".to_string()),
            Some(ProfileStatus::Active),
        );

        assert_eq!(query.term.as_deref(), Some("adv"));
        assert_eq!(query.status, Some(ProfileStatus::Active));
        assert!(!query.query_id.is_empty());
    }

    #[test]
    fn test_queries_get_distinct_ids() {
        let first = QueryFactory::get_profile_by_id("p1".to_string());
        let second = QueryFactory::get_profile_by_id("p1".to_string());
        assert_ne!(first.query_id, second.query_id);
    }
}
