//! Vocabulary resolver: turns hyphen-joined slug fragments such as
//! `senior-python-django-bangalore` into canonical entity names.
//!
//! Resolution is a pure function over the active-entity list the caller
//! supplies; it never touches the database or the cache.

use serde::{Deserialize, Serialize};

use crate::models::entity::{CityRow, NamedEntityRow, StateRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Skill,
    City,
    State,
    Qualification,
    Industry,
    FunctionalArea,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Skill => "skill",
            EntityKind::City => "city",
            EntityKind::State => "state",
            EntityKind::Qualification => "qualification",
            EntityKind::Industry => "industry",
            EntityKind::FunctionalArea => "functional_area",
        }
    }
}

/// Anything the resolver can match by slug.
pub trait Sluggable {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn slug(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<NamedEntityRow> for VocabularyEntry {
    fn from(row: NamedEntityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

impl From<StateRow> for VocabularyEntry {
    fn from(row: StateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

impl Sluggable for VocabularyEntry {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn slug(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub state_id: i64,
    pub parent_city_id: Option<i64>,
    /// The city carries the same name as its own state (e.g. Delhi / Delhi).
    /// Computed once when the snapshot is built.
    pub is_duplicate: bool,
}

impl CityEntry {
    pub fn from_row(row: CityRow, states: &[VocabularyEntry]) -> Self {
        let is_duplicate = is_duplicate(&row, states);
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            state_id: row.state_id,
            parent_city_id: row.parent_city_id,
            is_duplicate,
        }
    }
}

impl Sluggable for CityEntry {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn slug(&self) -> &str {
        &self.slug
    }
}

/// A city is a duplicate when its name equals the name of the state it belongs to.
pub fn is_duplicate(city: &CityRow, states: &[VocabularyEntry]) -> bool {
    states
        .iter()
        .find(|s| s.id == city.state_id)
        .map(|s| s.name.eq_ignore_ascii_case(&city.name))
        .unwrap_or(false)
}

/// Returns the canonical names matched by `fragment`, in match order, without duplicates.
pub fn resolve_vocabulary<E: Sluggable>(fragment: &str, entries: &[E]) -> Vec<String> {
    resolve_entries(fragment, entries)
        .into_iter()
        .map(|e| e.name().to_string())
        .collect()
}

/// Greedy longest-match resolution.
///
/// The whole fragment is tried first so multi-word slugs like
/// `full-stack-developer` resolve as one entity. Otherwise, from each token
/// position the longest run of tokens that equals an entry slug wins and
/// scanning resumes after it; a position with no match is skipped.
pub fn resolve_entries<'a, E: Sluggable>(fragment: &str, entries: &'a [E]) -> Vec<&'a E> {
    let fragment = fragment.trim().to_lowercase();
    let tokens: Vec<&str> = fragment.split('-').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    if let Some(entry) = find_by_slug(&tokens.join("-"), entries) {
        return vec![entry];
    }

    let mut matched: Vec<&'a E> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let hit = (i + 1..=tokens.len())
            .rev()
            .find_map(|j| find_by_slug(&tokens[i..j].join("-"), entries).map(|e| (e, j)));

        match hit {
            Some((entry, end)) => {
                if !matched.iter().any(|m| m.id() == entry.id()) {
                    matched.push(entry);
                }
                i = end;
            }
            None => i += 1,
        }
    }
    matched
}

pub fn find_by_slug<'a, E: Sluggable>(slug: &str, entries: &'a [E]) -> Option<&'a E> {
    entries.iter().find(|e| e.slug().eq_ignore_ascii_case(slug))
}

pub fn find_by_name<'a, E: Sluggable>(name: &str, entries: &'a [E]) -> Option<&'a E> {
    let name = name.trim();
    entries.iter().find(|e| e.name().eq_ignore_ascii_case(name))
}

/// Splits `java-jobs-in-bangalore` into (`java-jobs`, `Some("bangalore")`) on the last `-in-`.
pub fn split_location_fragment(fragment: &str) -> (&str, Option<&str>) {
    match fragment.rfind("-in-") {
        Some(idx) => {
            let location = &fragment[idx + 4..];
            let head = &fragment[..idx];
            if location.is_empty() {
                (head, None)
            } else {
                (head, Some(location))
            }
        }
        None => (fragment, None),
    }
}

/// Removes a trailing `-jobs` / `-job` token; a bare `jobs` fragment becomes empty.
pub fn strip_job_suffix(fragment: &str) -> &str {
    let fragment = fragment.trim_matches('-');
    if fragment == "jobs" || fragment == "job" {
        return "";
    }
    fragment
        .strip_suffix("-jobs")
        .or_else(|| fragment.strip_suffix("-job"))
        .unwrap_or(fragment)
}

/// Orders resolved names by where their slug first appears in `fragment`,
/// so `mba-java` lists the qualification before the skill.
pub fn order_by_position<E: Sluggable>(fragment: &str, names: &[String], entries: &[E]) -> Vec<String> {
    let fragment = fragment.to_lowercase();
    let mut positioned: Vec<(usize, &String)> = names
        .iter()
        .map(|name| {
            let pos = find_by_name(name, entries)
                .and_then(|e| fragment.find(&e.slug().to_lowercase()))
                .unwrap_or(usize::MAX);
            (pos, name)
        })
        .collect();
    positioned.sort_by_key(|(pos, _)| *pos);
    positioned.into_iter().map(|(_, n)| n.clone()).collect()
}
