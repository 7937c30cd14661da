//! Filter builder: composes a replayable predicate over job posts.
//!
//! A `JobFilter` is a plain value tree. The same filter can be evaluated in
//! memory (`matches`) or rendered to SQL (`store::push_filter`) as often as
//! needed, so the executor can count and then slice with one filter.

use chrono::NaiveDate;
use serde::Serialize;

#[cfg(test)]
use crate::models::job::JobPost;
use crate::models::job::{JobStatus, JobType};
use crate::search::request::SearchRequest;
use crate::search::snapshot::VocabularySnapshot;
use crate::search::vocabulary::EntityKind;

/// Many-to-many relations of a job post that can be filtered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Skill,
    Location,
    Industry,
    Qualification,
    FunctionalArea,
}

impl Facet {
    /// (join table, id column) for the SQL renderer.
    pub fn join_table(&self) -> (&'static str, &'static str) {
        match self {
            Facet::Skill => ("job_post_skills", "skill_id"),
            Facet::Location => ("job_post_locations", "city_id"),
            Facet::Industry => ("job_post_industries", "industry_id"),
            Facet::Qualification => ("job_post_qualifications", "qualification_id"),
            Facet::FunctionalArea => ("job_post_functional_areas", "functional_area_id"),
        }
    }

    #[cfg(test)]
    fn ids_of<'a>(&self, job: &'a JobPost) -> &'a [i64] {
        match self {
            Facet::Skill => &job.skills,
            Facet::Location => &job.locations,
            Facet::Industry => &job.industries,
            Facet::Qualification => &job.qualifications,
            Facet::FunctionalArea => &job.functional_areas,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JobFilter {
    /// Every child must hold. An empty list holds.
    All(Vec<JobFilter>),
    /// At least one child must hold. An empty list never holds.
    Any(Vec<JobFilter>),
    Status(JobStatus),
    JobType(JobType),
    NotJobType(JobType),
    /// The job references at least one of `ids`.
    Facet { facet: Facet, ids: Vec<i64> },
    /// `[min_year, max_year]` overlaps `[low, high]`.
    Experience { low: i32, high: i32 },
    /// `[min_salary, max_salary]` overlaps `[low, high]`.
    Salary { low: i32, high: i32 },
    /// No prior experience required.
    Fresher,
    /// Walk-in starts or ends inside `[from, to]`.
    WalkinBetween { from: NaiveDate, to: NaiveDate },
}

/// In-process evaluation, mirroring `store::push_filter`. Backs the test store.
#[cfg(test)]
impl JobFilter {
    pub fn matches(&self, job: &JobPost) -> bool {
        match self {
            JobFilter::All(children) => children.iter().all(|c| c.matches(job)),
            JobFilter::Any(children) => children.iter().any(|c| c.matches(job)),
            JobFilter::Status(status) => job.status == status.as_str(),
            JobFilter::JobType(t) => JobType::parse(&job.job_type) == Some(*t),
            JobFilter::NotJobType(t) => JobType::parse(&job.job_type) != Some(*t),
            JobFilter::Facet { facet, ids } => facet.ids_of(job).iter().any(|id| ids.contains(id)),
            JobFilter::Experience { low, high } => job.min_year <= *high && job.max_year >= *low,
            JobFilter::Salary { low, high } => job.min_salary <= *high && job.max_salary >= *low,
            JobFilter::Fresher => job.min_year <= 0,
            JobFilter::WalkinBetween { from, to } => {
                let within = |d: Option<NaiveDate>| d.map(|d| *from <= d && d <= *to).unwrap_or(false);
                within(job.walkin_from_date) || within(job.walkin_to_date)
            }
        }
    }
}

/// Overlap bounds from an optional min/max pair. A single value is used as both.
fn range_bounds<T: Copy + Ord>(min: Option<T>, max: Option<T>) -> Option<(T, T)> {
    match (min, max) {
        (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
        (Some(v), None) | (None, Some(v)) => Some((v, v)),
        (None, None) => None,
    }
}

/// Ids win over names. `None` means the facet was not requested at all;
/// `Some(vec![])` means names were given but none is a known entity.
fn facet_ids(
    snapshot: &VocabularySnapshot,
    kind: EntityKind,
    ids: &[i64],
    names: &[String],
) -> Option<Vec<i64>> {
    if !ids.is_empty() {
        Some(ids.to_vec())
    } else if !names.is_empty() {
        Some(snapshot.ids_of_names(kind, names))
    } else {
        None
    }
}

/// Job type, experience, salary and walk-in window constraints shared by both search paths.
pub fn scalar_filters(request: &SearchRequest, today: NaiveDate) -> Vec<JobFilter> {
    let mut filters = Vec::new();

    match request.job_type {
        Some(JobType::Fresher) => filters.push(JobFilter::Fresher),
        Some(t) => filters.push(JobFilter::JobType(t)),
        None if !request.wants_walkins() => filters.push(JobFilter::NotJobType(JobType::WalkIn)),
        None => {}
    }

    if let Some((low, high)) = range_bounds(request.experience_min, request.experience_max) {
        filters.push(JobFilter::Experience { low, high });
    }
    if let Some((low, high)) = range_bounds(request.salary_min, request.salary_max) {
        filters.push(JobFilter::Salary { low, high });
    }
    if let Some(window) = request.walkin {
        let (from, to) = window.resolve(today);
        filters.push(JobFilter::WalkinBetween { from, to });
    }

    filters
}

/// Location constraint from city and state selections.
///
/// City and state are one location facet, OR'd like any other facet: a job
/// in a selected city or in any city of a selected state matches. Cities also
/// match their parent city; states expand through `cities_in_states`. A side
/// whose names resolved to nothing adds no cities, so only when both sides
/// are empty does the facet match nothing.
fn location_filter(snapshot: &VocabularySnapshot, cities: Option<Vec<i64>>, states: Option<Vec<i64>>) -> Option<JobFilter> {
    if cities.is_none() && states.is_none() {
        return None;
    }
    let mut ids = snapshot.with_parent_cities(&cities.unwrap_or_default());
    for id in snapshot.cities_in_states(&states.unwrap_or_default()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(JobFilter::Facet {
        facet: Facet::Location,
        ids,
    })
}

/// Explicit refine-form search: OR within a facet, AND across facets.
pub fn build_filter(request: &SearchRequest, snapshot: &VocabularySnapshot, today: NaiveDate) -> JobFilter {
    let mut clauses = vec![JobFilter::Status(JobStatus::Live)];

    let facets = [
        (Facet::Skill, EntityKind::Skill, &request.skills, &request.skill_names),
        (Facet::Industry, EntityKind::Industry, &request.industries, &request.industry_names),
        (
            Facet::Qualification,
            EntityKind::Qualification,
            &request.qualifications,
            &request.qualification_names,
        ),
        (
            Facet::FunctionalArea,
            EntityKind::FunctionalArea,
            &request.functional_areas,
            &request.functional_area_names,
        ),
    ];
    for (facet, kind, ids, names) in facets {
        if let Some(ids) = facet_ids(snapshot, kind, ids, names) {
            clauses.push(JobFilter::Facet { facet, ids });
        }
    }

    let cities = facet_ids(snapshot, EntityKind::City, &request.locations, &request.location_names);
    let states = facet_ids(snapshot, EntityKind::State, &request.states, &request.state_names);
    clauses.extend(location_filter(snapshot, cities, states));

    clauses.extend(scalar_filters(request, today));
    JobFilter::All(clauses)
}

/// Entities a free-text slug fragment was resolved to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedTerms {
    pub skills: Vec<i64>,
    pub qualifications: Vec<i64>,
    pub cities: Vec<i64>,
    pub states: Vec<i64>,
}

impl ResolvedTerms {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.qualifications.is_empty()
            && self.cities.is_empty()
            && self.states.is_empty()
    }

    fn alternatives(&self, snapshot: &VocabularySnapshot) -> Vec<JobFilter> {
        let mut alternatives = Vec::new();
        if !self.skills.is_empty() {
            alternatives.push(JobFilter::Facet {
                facet: Facet::Skill,
                ids: self.skills.clone(),
            });
        }
        if !self.qualifications.is_empty() {
            alternatives.push(JobFilter::Facet {
                facet: Facet::Qualification,
                ids: self.qualifications.clone(),
            });
        }
        let cities = (!self.cities.is_empty()).then(|| self.cities.clone());
        let states = (!self.states.is_empty()).then(|| self.states.clone());
        alternatives.extend(location_filter(snapshot, cities, states));
        alternatives
    }
}

/// Legacy slug search.
///
/// Unlike `build_filter`, the interpretations of one fragment (skill,
/// qualification, location) are OR'd: `mba-java` lists MBA jobs and Java
/// jobs. A location given separately (the part after `-in-`) is still AND'd.
/// Both behaviours are kept as they are observed in production listings.
pub fn build_ambiguous_filter(
    fragment: &ResolvedTerms,
    location: Option<&ResolvedTerms>,
    scalars: &SearchRequest,
    snapshot: &VocabularySnapshot,
    today: NaiveDate,
) -> JobFilter {
    let mut clauses = vec![JobFilter::Status(JobStatus::Live)];

    let mut alternatives = fragment.alternatives(snapshot);
    match alternatives.len() {
        0 => {}
        1 => clauses.append(&mut alternatives),
        _ => clauses.push(JobFilter::Any(alternatives)),
    }

    if let Some(location) = location {
        let cities = (!location.cities.is_empty()).then(|| location.cities.clone());
        let states = (!location.states.is_empty()).then(|| location.states.clone());
        clauses.extend(location_filter(snapshot, cities, states));
    }

    clauses.extend(scalar_filters(scalars, today));
    JobFilter::All(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures::{fixture_snapshot, job, today};
    use crate::search::request::WalkinWindow;

    #[test]
    fn test_experience_overlap() {
        let mut post = job(1);
        post.min_year = 2;
        post.max_year = 5;
        for (exp, expected) in [(3, true), (2, true), (5, true), (6, false), (1, false)] {
            let request = SearchRequest {
                experience_min: Some(exp),
                ..Default::default()
            };
            let filter = build_filter(&request, &fixture_snapshot(), today());
            assert_eq!(filter.matches(&post), expected, "experience={exp}");
        }
    }

    #[test]
    fn test_experience_range_overlap() {
        let mut post = job(1);
        post.min_year = 2;
        post.max_year = 5;
        let request = SearchRequest {
            experience_min: Some(5),
            experience_max: Some(8),
            ..Default::default()
        };
        assert!(build_filter(&request, &fixture_snapshot(), today()).matches(&post));

        let request = SearchRequest {
            experience_min: Some(6),
            experience_max: Some(8),
            ..Default::default()
        };
        assert!(!build_filter(&request, &fixture_snapshot(), today()).matches(&post));
    }

    #[test]
    fn test_salary_overlap() {
        let mut post = job(1);
        post.min_salary = 300_000;
        post.max_salary = 600_000;
        let request = SearchRequest {
            salary_min: Some(500_000),
            ..Default::default()
        };
        assert!(build_filter(&request, &fixture_snapshot(), today()).matches(&post));
        let request = SearchRequest {
            salary_max: Some(200_000),
            ..Default::default()
        };
        assert!(!build_filter(&request, &fixture_snapshot(), today()).matches(&post));
    }

    #[test]
    fn test_only_live_jobs_match() {
        let mut post = job(1);
        let filter = build_filter(&SearchRequest::default(), &fixture_snapshot(), today());
        assert!(filter.matches(&post));
        post.status = "Expired".to_string();
        assert!(!filter.matches(&post));
    }

    #[test]
    fn test_walkins_excluded_unless_requested() {
        let mut post = job(1);
        post.job_type = "walk-in".to_string();
        let snapshot = fixture_snapshot();

        assert!(!build_filter(&SearchRequest::default(), &snapshot, today()).matches(&post));

        let request = SearchRequest {
            job_type: Some(JobType::WalkIn),
            ..Default::default()
        };
        assert!(build_filter(&request, &snapshot, today()).matches(&post));
    }

    #[test]
    fn test_fresher_means_zero_min_experience() {
        let mut post = job(1);
        let request = SearchRequest {
            job_type: Some(JobType::Fresher),
            ..Default::default()
        };
        let filter = build_filter(&request, &fixture_snapshot(), today());
        post.min_year = 0;
        assert!(filter.matches(&post));
        post.min_year = 1;
        assert!(!filter.matches(&post));
    }

    #[test]
    fn test_or_within_facet_and_across_facets() {
        let snapshot = fixture_snapshot();
        let request = SearchRequest {
            skill_names: vec!["Java".into(), "Python".into()],
            location_names: vec!["Hyderabad".into()],
            ..Default::default()
        };
        let filter = build_filter(&request, &snapshot, today());

        let java = snapshot.ids_of_names(EntityKind::Skill, &["Java".into()])[0];
        let python = snapshot.ids_of_names(EntityKind::Skill, &["Python".into()])[0];
        let hyderabad = snapshot.ids_of_names(EntityKind::City, &["Hyderabad".into()])[0];
        let bangalore = snapshot.ids_of_names(EntityKind::City, &["Bangalore".into()])[0];

        let mut post = job(1);
        post.skills = vec![python];
        post.locations = vec![hyderabad];
        assert!(filter.matches(&post));

        post.skills = vec![java];
        assert!(filter.matches(&post));

        post.locations = vec![bangalore];
        assert!(!filter.matches(&post));
    }

    #[test]
    fn test_explicit_ids_take_precedence_over_names() {
        let snapshot = fixture_snapshot();
        let python = snapshot.ids_of_names(EntityKind::Skill, &["Python".into()])[0];
        let request = SearchRequest {
            skills: vec![python],
            skill_names: vec!["Java".into()],
            ..Default::default()
        };
        let filter = build_filter(&request, &snapshot, today());
        assert!(matches!(
            &filter,
            JobFilter::All(clauses) if clauses.contains(&JobFilter::Facet { facet: Facet::Skill, ids: vec![python] })
        ));
    }

    #[test]
    fn test_unknown_names_match_nothing() {
        let request = SearchRequest {
            skill_names: vec!["Cobol".into()],
            ..Default::default()
        };
        let filter = build_filter(&request, &fixture_snapshot(), today());
        assert!(!filter.matches(&job(1)));
    }

    #[test]
    fn test_state_filter_covers_its_cities() {
        let snapshot = fixture_snapshot();
        let mysore = snapshot.ids_of_names(EntityKind::City, &["Mysore".into()])[0];
        let request = SearchRequest {
            state_names: vec!["Karnataka".into()],
            ..Default::default()
        };
        let mut post = job(1);
        post.locations = vec![mysore];
        assert!(build_filter(&request, &snapshot, today()).matches(&post));
    }

    #[test]
    fn test_city_and_state_are_one_location_facet() {
        let snapshot = fixture_snapshot();
        let hyderabad = snapshot.ids_of_names(EntityKind::City, &["Hyderabad".into()])[0];
        let mysore = snapshot.ids_of_names(EntityKind::City, &["Mysore".into()])[0];
        let request = SearchRequest {
            location_names: vec!["Hyderabad".into()],
            state_names: vec!["Karnataka".into()],
            ..Default::default()
        };
        let filter = build_filter(&request, &snapshot, today());

        let mut post = job(1);
        post.locations = vec![hyderabad];
        assert!(filter.matches(&post));
        post.locations = vec![mysore];
        assert!(filter.matches(&post));
    }

    #[test]
    fn test_unknown_state_next_to_known_city() {
        let snapshot = fixture_snapshot();
        let hyderabad = snapshot.ids_of_names(EntityKind::City, &["Hyderabad".into()])[0];
        let mut post = job(1);
        post.locations = vec![hyderabad];

        // Same as an unknown skill next to a known one: the known name still counts.
        let request = SearchRequest {
            location_names: vec!["Hyderabad".into()],
            state_names: vec!["Atlantis".into()],
            ..Default::default()
        };
        assert!(build_filter(&request, &snapshot, today()).matches(&post));

        let request = SearchRequest {
            state_names: vec!["Atlantis".into()],
            ..Default::default()
        };
        assert!(!build_filter(&request, &snapshot, today()).matches(&post));
    }

    #[test]
    fn test_city_filter_matches_parent_city() {
        let snapshot = fixture_snapshot();
        let bangalore = snapshot.ids_of_names(EntityKind::City, &["Bangalore".into()])[0];
        let request = SearchRequest {
            location_names: vec!["Whitefield".into()],
            ..Default::default()
        };
        let mut post = job(1);
        post.locations = vec![bangalore];
        assert!(build_filter(&request, &snapshot, today()).matches(&post));
    }

    #[test]
    fn test_walkin_window_matches_start_or_end() {
        let mut post = job(1);
        post.job_type = "walk-in".to_string();
        // today() is Wednesday 2026-10-14; this week is 12..18
        post.walkin_from_date = NaiveDate::from_ymd_opt(2026, 10, 5);
        post.walkin_to_date = NaiveDate::from_ymd_opt(2026, 10, 13);

        let request = SearchRequest {
            walkin: Some(WalkinWindow::ThisWeek),
            ..Default::default()
        };
        assert!(build_filter(&request, &fixture_snapshot(), today()).matches(&post));

        let request = SearchRequest {
            walkin: Some(WalkinWindow::NextWeek),
            ..Default::default()
        };
        assert!(!build_filter(&request, &fixture_snapshot(), today()).matches(&post));
    }

    #[test]
    fn test_ambiguous_fragment_interpretations_are_ored() {
        let snapshot = fixture_snapshot();
        let java = snapshot.ids_of_names(EntityKind::Skill, &["Java".into()])[0];
        let mba = snapshot.ids_of_names(EntityKind::Qualification, &["MBA".into()])[0];
        let terms = ResolvedTerms {
            skills: vec![java],
            qualifications: vec![mba],
            ..Default::default()
        };
        let filter = build_ambiguous_filter(&terms, None, &SearchRequest::default(), &snapshot, today());

        let mut post = job(1);
        post.qualifications = vec![mba];
        assert!(filter.matches(&post));

        let explicit = SearchRequest {
            skills: vec![java],
            qualifications: vec![mba],
            ..Default::default()
        };
        assert!(!build_filter(&explicit, &snapshot, today()).matches(&post));
    }

    #[test]
    fn test_filter_is_replayable() {
        let snapshot = fixture_snapshot();
        let request = SearchRequest {
            skill_names: vec!["Java".into()],
            ..Default::default()
        };
        let filter = build_filter(&request, &snapshot, today());
        let post = job(1);
        assert_eq!(filter.matches(&post), filter.matches(&post));
        assert_eq!(filter, build_filter(&request, &snapshot, today()));
    }
}
