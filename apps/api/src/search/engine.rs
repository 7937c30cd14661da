//! Search entry points used by the HTTP handlers.
//!
//! `search_by_ambiguous_fragment` serves slug URLs such as
//! `java-jobs-in-bangalore`; `search_by_explicit_facets` serves the refine
//! form. They compose facets differently (see `filter::build_ambiguous_filter`)
//! and are kept apart on purpose.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::job::JobType;
use crate::search::filter::{build_ambiguous_filter, build_filter, ResolvedTerms};
use crate::search::pagination::{execute_page, SearchPage};
use crate::search::request::SearchRequest;
use crate::search::snapshot::VocabularySnapshot;
use crate::search::store::{JobOrder, JobStore};
use crate::search::vocabulary::{
    find_by_slug, order_by_position, resolve_entries, split_location_fragment, strip_job_suffix,
    EntityKind, Sluggable, VocabularyEntry,
};
use crate::search::SearchError;

/// Per-call paging and ordering.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub page: Option<String>,
    pub page_size: u32,
    pub order: JobOrder,
    /// Anchor for walk-in date presets.
    pub today: NaiveDate,
}

/// A slug search as it arrives from a listing URL.
#[derive(Debug, Clone, Default)]
pub struct AmbiguousQuery {
    pub fragment: String,
    pub job_type: Option<JobType>,
    pub experience: Option<i32>,
}

/// Canonical names of everything the search was constrained by, for echoing
/// back into the refine form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchedTerms {
    pub skills: Vec<String>,
    pub qualifications: Vec<String>,
    pub locations: Vec<String>,
    pub states: Vec<String>,
    pub industries: Vec<String>,
    pub functional_areas: Vec<String>,
    /// Skills and qualifications in the order they appear in the slug.
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    #[serde(flatten)]
    pub page: SearchPage,
    pub searched: SearchedTerms,
}

/// Walk-in listings are ordered by interview end date.
pub fn default_order(job_type: Option<JobType>) -> JobOrder {
    match job_type {
        Some(JobType::WalkIn) => JobOrder::WalkinToDesc,
        _ => JobOrder::PublishedDesc,
    }
}

fn ids<E: Sluggable>(entries: Vec<&E>) -> Vec<i64> {
    entries.into_iter().map(|e| e.id()).collect()
}

/// A whole-fragment state slug wins over city matching, so `delhi` covers the
/// state rather than only the same-named city.
pub fn resolve_location(snapshot: &VocabularySnapshot, fragment: &str) -> ResolvedTerms {
    let fragment = strip_job_suffix(fragment);
    if let Some(state) = find_by_slug(fragment, &snapshot.states) {
        return ResolvedTerms {
            states: vec![state.id],
            ..Default::default()
        };
    }
    ResolvedTerms {
        cities: ids(resolve_entries(fragment, &snapshot.cities)),
        ..Default::default()
    }
}

fn searched_terms(snapshot: &VocabularySnapshot, fragment: &str, terms: &[&ResolvedTerms]) -> SearchedTerms {
    let mut all = ResolvedTerms::default();
    for t in terms {
        all.skills.extend(&t.skills);
        all.qualifications.extend(&t.qualifications);
        all.cities.extend(&t.cities);
        all.states.extend(&t.states);
    }

    let skills = snapshot.names_of(EntityKind::Skill, &all.skills);
    let qualifications = snapshot.names_of(EntityKind::Qualification, &all.qualifications);

    let mut names = skills.clone();
    names.extend(qualifications.iter().cloned());
    let vocabulary: Vec<VocabularyEntry> = snapshot
        .skills
        .iter()
        .chain(snapshot.qualifications.iter())
        .cloned()
        .collect();
    let text = order_by_position(fragment, &names, &vocabulary);

    SearchedTerms {
        skills,
        qualifications,
        locations: snapshot.names_of(EntityKind::City, &all.cities),
        states: snapshot.names_of(EntityKind::State, &all.states),
        text,
        ..Default::default()
    }
}

/// Slug search. The part before `-in-` is read as skills, qualifications and
/// (when no `-in-` part exists) locations at once; the part after it as a
/// location. Either part resolving to nothing is `NoVocabularyMatch`.
pub async fn search_by_ambiguous_fragment(
    store: &dyn JobStore,
    snapshot: &VocabularySnapshot,
    query: &AmbiguousQuery,
    options: &SearchOptions,
) -> Result<SearchOutcome, SearchError> {
    let fragment = query.fragment.trim().to_lowercase();
    let (head, location_part) = split_location_fragment(&fragment);
    let head = strip_job_suffix(head);

    let mut terms = ResolvedTerms {
        skills: ids(resolve_entries(head, &snapshot.skills)),
        qualifications: ids(resolve_entries(head, &snapshot.qualifications)),
        ..Default::default()
    };
    if location_part.is_none() {
        let as_location = resolve_location(snapshot, head);
        terms.cities = as_location.cities;
        terms.states = as_location.states;
    }

    if !head.is_empty() && terms.is_empty() {
        return Err(SearchError::NoVocabularyMatch {
            fragment: head.to_string(),
            kind: EntityKind::Skill,
        });
    }

    let location = match location_part {
        Some(part) => {
            let resolved = resolve_location(snapshot, part);
            if resolved.is_empty() {
                return Err(SearchError::NoVocabularyMatch {
                    fragment: part.to_string(),
                    kind: EntityKind::City,
                });
            }
            Some(resolved)
        }
        None if head.is_empty() => {
            return Err(SearchError::NoVocabularyMatch {
                fragment: fragment.clone(),
                kind: EntityKind::Skill,
            });
        }
        None => None,
    };

    let scalars = SearchRequest {
        job_type: query.job_type,
        experience_min: query.experience,
        ..Default::default()
    };
    let filter = build_ambiguous_filter(&terms, location.as_ref(), &scalars, snapshot, options.today);
    let page = execute_page(
        store,
        &filter,
        options.order,
        options.page.as_deref(),
        options.page_size,
    )
    .await?;

    let mut resolved: Vec<&ResolvedTerms> = vec![&terms];
    resolved.extend(location.as_ref());
    Ok(SearchOutcome {
        page,
        searched: searched_terms(snapshot, head, &resolved),
    })
}

/// Refine-form search: every supplied facet must hold.
pub async fn search_by_explicit_facets(
    store: &dyn JobStore,
    snapshot: &VocabularySnapshot,
    request: &SearchRequest,
    options: &SearchOptions,
) -> Result<SearchOutcome, SearchError> {
    let filter = build_filter(request, snapshot, options.today);
    let page = execute_page(
        store,
        &filter,
        options.order,
        options.page.as_deref(),
        options.page_size,
    )
    .await?;

    let names = |kind: EntityKind, ids: &[i64], names: &[String]| -> Vec<String> {
        let ids = if ids.is_empty() {
            snapshot.ids_of_names(kind, names)
        } else {
            ids.to_vec()
        };
        snapshot.names_of(kind, &ids)
    };

    let skills = names(EntityKind::Skill, &request.skills, &request.skill_names);
    let qualifications = names(
        EntityKind::Qualification,
        &request.qualifications,
        &request.qualification_names,
    );
    let mut text = skills.clone();
    text.extend(qualifications.iter().cloned());

    Ok(SearchOutcome {
        page,
        searched: SearchedTerms {
            skills,
            qualifications,
            locations: names(EntityKind::City, &request.locations, &request.location_names),
            states: names(EntityKind::State, &request.states, &request.state_names),
            industries: names(EntityKind::Industry, &request.industries, &request.industry_names),
            functional_areas: names(
                EntityKind::FunctionalArea,
                &request.functional_areas,
                &request.functional_area_names,
            ),
            text,
        },
    })
}
