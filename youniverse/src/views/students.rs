//! Student directory filtering and connection state.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::client::Query;
use crate::models::{Connection, ConnectionStatus, Profile, StudentRole, UserId};

use super::text::sanitize_search_term;

/// Filters for browsing the student directory.
///
/// The same filter can be pushed to the backend with [`StudentFilter::apply`]
/// or evaluated locally against already-fetched profiles with
/// [`StudentFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Restrict to one role.
    pub role: Option<StudentRole>,
    /// Exact country match.
    pub country: Option<String>,
    /// Exact course match.
    pub course: Option<String>,
    /// Case-insensitive substring over name, university, course and bio.
    pub search: Option<String>,
}

impl StudentFilter {
    /// Create an empty filter that matches every profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a role.
    pub fn role(mut self, role: StudentRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Restrict to a country. Blank values are ignored.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = non_blank(country.into());
        self
    }

    /// Restrict to a course. Blank values are ignored.
    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.course = non_blank(course.into());
        self
    }

    /// Free-text search. Blank values are ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = non_blank(sanitize_search_term(&term.into()));
        self
    }

    /// Check whether no restriction is set.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.country.is_none() && self.course.is_none() && self.search.is_none()
    }

    /// Add this filter's conditions to a `profiles` query.
    pub fn apply(&self, query: Query) -> Query {
        let mut query = query;
        if let Some(role) = self.role {
            query = query.eq("role", role.param());
        }
        if let Some(ref country) = self.country {
            query = query.eq("country", country);
        }
        if let Some(ref course) = self.course {
            query = query.eq("course", course);
        }
        if let Some(ref term) = self.search {
            let pattern = format!("*{term}*");
            query = query.or([
                format!("name.ilike.{pattern}"),
                format!("university.ilike.{pattern}"),
                format!("course.ilike.{pattern}"),
                format!("bio.ilike.{pattern}"),
            ]);
        }
        query
    }

    /// Evaluate the filter locally.
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(role) = self.role {
            if profile.role != role {
                return false;
            }
        }
        if let Some(ref country) = self.country {
            if &profile.country != country {
                return false;
            }
        }
        if let Some(ref course) = self.course {
            if profile.course.as_ref() != Some(course) {
                return false;
            }
        }
        if let Some(ref term) = self.search {
            let needle = term.to_lowercase();
            let haystacks = [
                Some(profile.name.as_str()),
                profile.university.as_deref(),
                profile.course.as_deref(),
                profile.bio.as_deref(),
            ];
            if !haystacks
                .into_iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Distinct countries and courses present in a result set, sorted, for
/// building filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentFacets {
    pub countries: Vec<String>,
    pub courses: Vec<String>,
}

impl StudentFacets {
    /// Collect facets from profiles.
    pub fn collect<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> Self {
        let mut countries = BTreeSet::new();
        let mut courses = BTreeSet::new();
        for p in profiles {
            if !p.country.trim().is_empty() {
                countries.insert(p.country.clone());
            }
            if let Some(course) = p.course.as_ref().filter(|c| !c.trim().is_empty()) {
                courses.insert(course.clone());
            }
        }
        Self {
            countries: countries.into_iter().collect(),
            courses: courses.into_iter().collect(),
        }
    }
}

/// Relationship between the viewer and another student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentConnectionStatus {
    /// No request in either direction, or only rejected ones.
    #[default]
    None,
    /// Viewer sent a request that is still pending.
    PendingSent,
    /// The other student sent a request the viewer has not answered.
    PendingReceived,
    /// Accepted connection.
    Connected,
    /// Viewer looking at their own profile.
    Myself,
}

impl StudentConnectionStatus {
    /// Whether the viewer may send a new request.
    pub fn can_request(&self) -> bool {
        matches!(self, StudentConnectionStatus::None)
    }
}

/// Derive the viewer's relationship with `other` from the viewer's connections.
///
/// An accepted connection wins over pending ones; rejected requests are ignored.
pub fn connection_status(
    viewer: &UserId,
    other: &UserId,
    connections: &[Connection],
) -> StudentConnectionStatus {
    if viewer == other {
        return StudentConnectionStatus::Myself;
    }

    let mut status = StudentConnectionStatus::None;
    for conn in connections {
        if conn.other_id(viewer) != Some(other) {
            continue;
        }
        match conn.status {
            ConnectionStatus::Accepted => return StudentConnectionStatus::Connected,
            ConnectionStatus::Pending if &conn.requester_id == viewer => {
                status = StudentConnectionStatus::PendingSent;
            }
            ConnectionStatus::Pending => {
                if status == StudentConnectionStatus::None {
                    status = StudentConnectionStatus::PendingReceived;
                }
            }
            ConnectionStatus::Rejected => {}
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn student(id: &str, name: &str, country: &str, course: Option<&str>) -> Profile {
        Profile {
            id: id.into(),
            name: name.into(),
            country: country.into(),
            course: course.map(str::to_owned),
            ..Default::default()
        }
    }

    fn conn(from: &str, to: &str, status: ConnectionStatus) -> Connection {
        Connection {
            id: format!("{from}-{to}").into(),
            requester_id: from.into(),
            addressee_id: to.into(),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_apply_builds_query() {
        let filter = StudentFilter::new()
            .role(StudentRole::StudentAbroad)
            .country("Germany")
            .course("  ")
            .search("tu, munich");

        let pairs = filter.apply(Query::new()).to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("role".to_string(), "eq.student_abroad".to_string()),
                ("country".to_string(), "eq.Germany".to_string()),
                (
                    "or".to_string(),
                    "(name.ilike.*tu munich*,university.ilike.*tu munich*,course.ilike.*tu munich*,bio.ilike.*tu munich*)"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_filter_matches_locally() {
        let mut p = student("1", "Meera Iyer", "Canada", Some("MBA"));
        p.university = Some("University of Toronto".into());

        assert!(StudentFilter::new().matches(&p));
        assert!(StudentFilter::new().search("toronto").matches(&p));
        assert!(StudentFilter::new().search("IYER").matches(&p));
        assert!(!StudentFilter::new().search("oxford").matches(&p));
        assert!(StudentFilter::new().country("Canada").course("MBA").matches(&p));
        assert!(!StudentFilter::new().course("MSc").matches(&p));
        assert!(!StudentFilter::new().role(StudentRole::StudentAbroad).matches(&p));
    }

    #[test]
    fn test_empty_filter() {
        assert!(StudentFilter::new().search("   ").is_empty());
        assert!(StudentFilter::new().apply(Query::new()).to_pairs().is_empty());
    }

    #[test]
    fn test_facets() {
        let profiles = vec![
            student("1", "A", "Germany", Some("MSc")),
            student("2", "B", "Canada", None),
            student("3", "C", "Germany", Some("MBA")),
            student("4", "D", "", Some("")),
        ];
        let facets = StudentFacets::collect(&profiles);
        assert_eq!(facets.countries, vec!["Canada", "Germany"]);
        assert_eq!(facets.courses, vec!["MBA", "MSc"]);
    }

    #[test]
    fn test_connection_status() {
        let me = UserId::new("me");
        let connections = vec![
            conn("me", "a", ConnectionStatus::Pending),
            conn("b", "me", ConnectionStatus::Pending),
            conn("me", "c", ConnectionStatus::Accepted),
            conn("d", "me", ConnectionStatus::Rejected),
            conn("e", "me", ConnectionStatus::Pending),
            conn("me", "e", ConnectionStatus::Accepted),
        ];

        assert_eq!(connection_status(&me, &"a".into(), &connections), StudentConnectionStatus::PendingSent);
        assert_eq!(connection_status(&me, &"b".into(), &connections), StudentConnectionStatus::PendingReceived);
        assert_eq!(connection_status(&me, &"c".into(), &connections), StudentConnectionStatus::Connected);
        assert_eq!(connection_status(&me, &"d".into(), &connections), StudentConnectionStatus::None);
        assert_eq!(connection_status(&me, &"e".into(), &connections), StudentConnectionStatus::Connected);
        assert_eq!(connection_status(&me, &"z".into(), &connections), StudentConnectionStatus::None);
        assert_eq!(connection_status(&me, &me, &connections), StudentConnectionStatus::Myself);
        assert!(StudentConnectionStatus::None.can_request());
        assert!(!StudentConnectionStatus::PendingSent.can_request());
    }
}
