//! Student handlers.

use anyhow::{bail, Result};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use rust_i18n::t;
use serde::Serialize;
use youniverse::{
    views::{StudentConnectionStatus, StudentFilter},
    Profile, StudentRole, YouniverseClient,
};

use crate::output::{truncate, PlainPrint, TableRow};

/// Student profile info.
#[derive(Debug, Clone, Serialize)]
pub struct StudentInfo {
    pub id: String,
    pub name: String,
    pub role: String,
    pub country: String,
    pub university: Option<String>,
    pub course: Option<String>,
    pub year_of_study: Option<String>,
    pub preferred_destination: Option<String>,
    pub headline: String,
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl From<&Profile> for StudentInfo {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            role: p.role.label().to_string(),
            country: p.country.clone(),
            university: p.university.clone(),
            course: p.course.clone(),
            year_of_study: p.year_of_study.clone(),
            preferred_destination: p.preferred_destination.clone(),
            headline: p.headline(),
            bio: p.bio.clone(),
            connection: None,
        }
    }
}

impl TableRow for StudentInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Role", "Country", "Studying"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.role.clone(),
            self.country.clone(),
            truncate(&self.headline, 40),
        ]
    }
}

impl PlainPrint for StudentInfo {
    fn plain_print(&self) {
        println!(
            "{} {} {}",
            self.name.bold(),
            format!("[{}]", self.id).dimmed(),
            self.connection
                .as_deref()
                .map(|c| c.yellow().to_string())
                .unwrap_or_default()
        );
        println!(
            "   {} | {} | {}",
            self.role.cyan(),
            self.country,
            self.headline
        );
        if let Some(dest) = &self.preferred_destination {
            println!("   {}", t!("destination", place = dest).dimmed());
        }
        if let Some(bio) = &self.bio {
            println!("   {}", truncate(bio, 100));
        }
    }
}

/// Search options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// `india`, `abroad` or `all`.
    pub location: Option<String>,
    pub country: Option<String>,
    pub course: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl SearchOptions {
    /// Turn the options into a student filter.
    pub fn to_filter(&self) -> Result<StudentFilter> {
        let mut filter = StudentFilter::new();
        match self.location.as_deref().map(str::trim) {
            None | Some("") | Some("all") => {}
            Some(raw) => match StudentRole::parse(raw) {
                Some(role) => filter = filter.role(role),
                None => bail!("{}", t!("invalid_location", value = raw)),
            },
        }
        if let Some(country) = &self.country {
            filter = filter.country(country.as_str());
        }
        if let Some(course) = &self.course {
            filter = filter.course(course.as_str());
        }
        if let Some(term) = &self.search {
            filter = filter.search(term.as_str());
        }
        Ok(filter)
    }
}

/// Student search result.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSearchOutput {
    pub students: Vec<StudentInfo>,
    pub countries: Vec<String>,
    pub courses: Vec<String>,
}

/// Search students.
pub async fn search_students(
    client: &YouniverseClient,
    options: SearchOptions,
) -> Result<StudentSearchOutput> {
    let filter = options.to_filter()?;
    let mut request = client
        .profiles()
        .search(filter)
        .exclude_self(client.is_authenticated());
    if let Some(page) = options.page {
        request = request.page(page);
    }
    let result = request.send().await?;

    Ok(StudentSearchOutput {
        students: result.students.iter().map(StudentInfo::from).collect(),
        countries: result.facets.countries,
        courses: result.facets.courses,
    })
}

/// Fetch several students, at most `concurrency` requests at a time.
///
/// Results keep the order of `ids`. The viewer's connection status is added
/// when signed in.
pub async fn get_students(
    client: &YouniverseClient,
    ids: &[String],
    concurrency: usize,
) -> Result<Vec<StudentInfo>> {
    let mut fetched: Vec<(usize, youniverse::Result<Profile>)> = stream::iter(ids.iter().cloned().enumerate())
        .map(|(i, id)| {
            let client = client.clone();
            async move { (i, client.profiles().get(id.as_str()).await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    fetched.sort_by_key(|(i, _)| *i);

    let mut students = Vec::with_capacity(fetched.len());
    for (_, result) in fetched {
        let profile = result?;
        let mut info = StudentInfo::from(&profile);
        if client.is_authenticated() {
            let status = client.connections().status_with(profile.id.clone()).await?;
            info.connection = connection_label(status);
        }
        students.push(info);
    }
    Ok(students)
}

fn connection_label(status: StudentConnectionStatus) -> Option<String> {
    let label = match status {
        StudentConnectionStatus::None => return None,
        StudentConnectionStatus::PendingSent => t!("status_pending_sent"),
        StudentConnectionStatus::PendingReceived => t!("status_pending_received"),
        StudentConnectionStatus::Connected => t!("status_connected"),
        StudentConnectionStatus::Myself => t!("status_myself"),
    };
    Some(label.to_string())
}
