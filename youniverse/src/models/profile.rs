//! Student profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Where a student currently is in their study-abroad journey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentRole {
    /// Student still in India, planning to go abroad.
    #[default]
    StudentInIndia,
    /// Student already studying abroad.
    StudentAbroad,
}

impl StudentRole {
    /// Get the API parameter value.
    pub fn param(&self) -> &'static str {
        match self {
            StudentRole::StudentInIndia => "student_in_india",
            StudentRole::StudentAbroad => "student_abroad",
        }
    }

    /// Parse a role from user input (`india`, `abroad` or the raw column value).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "india" | "student_in_india" => Some(StudentRole::StudentInIndia),
            "abroad" | "student_abroad" => Some(StudentRole::StudentAbroad),
            _ => None,
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StudentRole::StudentInIndia => "Student in India",
            StudentRole::StudentAbroad => "Student Abroad",
        }
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile ID (same as the auth user ID).
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub image_url: Option<String>,
    /// Student role.
    pub role: StudentRole,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Country the student lives or studies in.
    pub country: String,
    pub university: Option<String>,
    pub course: Option<String>,
    pub year_of_study: Option<String>,
    pub preferred_destination: Option<String>,
    pub phone: Option<String>,
    pub current_education_level: Option<String>,
    pub expected_admission_year: Option<String>,
    pub current_city: Option<String>,
    /// Whether the initial profile setup was completed.
    #[serde(default)]
    pub profile_completed: bool,
    /// Whether the user has not gone through setup yet.
    #[serde(default = "default_true")]
    pub is_new_user: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Profile {
    /// Up to two uppercase initials of the display name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Short "course at university" line, whichever parts are known.
    pub fn headline(&self) -> String {
        match (non_blank(&self.course), non_blank(&self.university)) {
            (Some(course), Some(university)) => format!("{course} at {university}"),
            (Some(course), None) => course.to_owned(),
            (None, Some(university)) => university.to_owned(),
            (None, None) => self.role.label().to_owned(),
        }
    }

    /// Whether the profile still needs the setup flow.
    pub fn needs_setup(&self) -> bool {
        self.is_new_user || !self.profile_completed
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Partial update of a profile. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StudentRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_education_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_admission_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
}

impl ProfileUpdate {
    /// Check whether no field is set.
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_object().map(|o| o.is_empty()))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile {
            id: "u1".into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(StudentRole::parse("india"), Some(StudentRole::StudentInIndia));
        assert_eq!(StudentRole::parse("Student_Abroad"), Some(StudentRole::StudentAbroad));
        assert_eq!(StudentRole::parse("all"), None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(profile("priya sharma").initials(), "PS");
        assert_eq!(profile("Arjun Kumar Rao").initials(), "AK");
        assert_eq!(profile("").initials(), "");
    }

    #[test]
    fn test_headline() {
        let mut p = profile("Priya");
        p.role = StudentRole::StudentAbroad;
        assert_eq!(p.headline(), "Student Abroad");

        p.university = Some("TU Munich".into());
        assert_eq!(p.headline(), "TU Munich");

        p.course = Some("MSc Informatics".into());
        assert_eq!(p.headline(), "MSc Informatics at TU Munich");

        p.university = Some("  ".into());
        assert_eq!(p.headline(), "MSc Informatics");
    }

    #[test]
    fn test_profile_row_parse() {
        let row = r#"{
            "id": "u1", "email": "p@example.com", "name": "Priya",
            "image_url": null, "role": "student_abroad", "bio": null,
            "country": "Germany", "university": "TU Munich", "course": null,
            "year_of_study": null, "preferred_destination": null, "phone": null,
            "current_education_level": null, "expected_admission_year": null,
            "current_city": "Munich", "profile_completed": true, "is_new_user": false,
            "created_at": "2024-03-01T10:00:00.000000+00:00",
            "updated_at": "2024-03-02T10:00:00+00:00"
        }"#;
        let p: Profile = serde_json::from_str(row).unwrap();
        assert_eq!(p.role, StudentRole::StudentAbroad);
        assert_eq!(p.current_city.as_deref(), Some("Munich"));
        assert!(!p.needs_setup());
    }

    #[test]
    fn test_profile_update_skips_unset() {
        let update = ProfileUpdate {
            bio: Some("Hello".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"bio":"Hello"}"#);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }
}
