//! Autocomplete and canonical slug building over the vocabulary snapshot.

use serde::Serialize;

use crate::search::snapshot::VocabularySnapshot;
use crate::search::vocabulary::{EntityKind, Sluggable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub kind: EntityKind,
}

impl Suggestion {
    fn of<E: Sluggable>(entry: &E, kind: EntityKind) -> Self {
        Self {
            id: entry.id(),
            name: entry.name().to_string(),
            slug: entry.slug().to_string(),
            kind,
        }
    }
}

/// Slugs for a submitted search form, ready to be joined into
/// `{skill_slug}-jobs-in-{location_slug}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchSlugs {
    pub skill_slug: String,
    pub location_slug: String,
}

fn contains_query<E: Sluggable>(entry: &E, query: &str) -> bool {
    entry.name().to_lowercase().contains(query) || entry.slug().to_lowercase().contains(query)
}

fn excluded<E: Sluggable>(entry: &E, exclude: &[String]) -> bool {
    exclude.iter().any(|x| x.trim().eq_ignore_ascii_case(entry.name()))
}

fn matching<'a, E: Sluggable>(entries: &'a [E], query: &str, exclude: &[String]) -> Vec<&'a E> {
    entries
        .iter()
        .filter(|e| contains_query(*e, query) && !excluded(*e, exclude))
        .collect()
}

/// Skills containing `query` (shortest names first), then qualifications
/// when `include_related` is set. Names in `exclude` are already selected and
/// left out. Filter widgets pass `include_related = false` to get skills only.
pub fn suggest_skills(
    snapshot: &VocabularySnapshot,
    query: &str,
    exclude: &[String],
    include_related: bool,
    limit: usize,
) -> Vec<Suggestion> {
    let query = query.trim().to_lowercase();

    let mut skills = matching(&snapshot.skills, &query, exclude);
    skills.sort_by_key(|s| s.name.len());

    let qualifications = if include_related {
        matching(&snapshot.qualifications, &query, exclude)
    } else {
        Vec::new()
    };

    skills
        .into_iter()
        .map(|s| Suggestion::of(s, EntityKind::Skill))
        .chain(
            qualifications
                .into_iter()
                .map(|q| Suggestion::of(q, EntityKind::Qualification)),
        )
        .take(limit)
        .collect()
}

/// Cities containing `query` (shortest names first), then states when
/// `include_related` is set. States that share their name with one of their
/// cities are skipped so the same place is not offered twice.
pub fn suggest_locations(
    snapshot: &VocabularySnapshot,
    query: &str,
    exclude: &[String],
    include_related: bool,
    limit: usize,
) -> Vec<Suggestion> {
    let query = query.trim().to_lowercase();

    let mut cities = matching(&snapshot.cities, &query, exclude);
    cities.sort_by_key(|c| c.name.len());

    let states: Vec<_> = if include_related {
        matching(&snapshot.states, &query, exclude)
            .into_iter()
            .filter(|s| !snapshot.is_duplicated_state(s.id))
            .collect()
    } else {
        Vec::new()
    };

    cities
        .into_iter()
        .map(|c| Suggestion::of(c, EntityKind::City))
        .chain(states.into_iter().map(|s| Suggestion::of(s, EntityKind::State)))
        .take(limit)
        .collect()
}

/// Single-kind autocomplete for the industry, functional area, qualification
/// and state pickers, in vocabulary order. Industry names are shown up to
/// their first `/` ("Banking/Financial Services" reads "Banking").
pub fn suggest_entries(
    snapshot: &VocabularySnapshot,
    kind: EntityKind,
    query: &str,
    exclude: &[String],
    limit: usize,
) -> Vec<Suggestion> {
    let query = query.trim().to_lowercase();

    matching(snapshot.entries(kind), &query, exclude)
        .into_iter()
        .map(|entry| {
            let mut suggestion = Suggestion::of(entry, kind);
            if kind == EntityKind::Industry {
                if let Some((short, _)) = suggestion.name.split_once('/') {
                    suggestion.name = short.trim().to_string();
                }
            }
            suggestion
        })
        .take(limit)
        .collect()
}

/// Lowercase, ASCII alphanumerics only, separator runs collapsed into one `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

fn append(slug: &mut String, part: &str) {
    if part.is_empty() {
        return;
    }
    if !slug.is_empty() {
        slug.push('-');
    }
    slug.push_str(part);
}

fn terms(input: &str) -> impl Iterator<Item = String> + '_ {
    input.split(',').filter_map(|term| {
        let words: Vec<&str> = term
            .split_whitespace()
            .filter(|w| !w.eq_ignore_ascii_case("jobs") && !w.eq_ignore_ascii_case("job"))
            .collect();
        (!words.is_empty()).then(|| words.join(" "))
    })
}

fn same<E: Sluggable>(entry: &E, term: &str) -> bool {
    entry.slug().eq_ignore_ascii_case(term) || entry.name().eq_ignore_ascii_case(term)
}

/// Builds canonical slugs from comma-separated form input. Known skills and
/// qualifications contribute their own slug; unknown terms are slugified.
/// Locations use city and state slugs, skipping cities that merely repeat
/// their state's name; with no known location the raw input is slugified.
pub fn build_search_slugs(snapshot: &VocabularySnapshot, query: &str, location: &str) -> SearchSlugs {
    let mut skill_slug = String::new();
    for term in terms(query) {
        let mut known = false;
        for entry in snapshot.skills.iter().chain(snapshot.qualifications.iter()) {
            if same(entry, &term) {
                append(&mut skill_slug, &entry.slug);
                known = true;
            }
        }
        if !known {
            append(&mut skill_slug, &slugify(&term));
        }
    }

    let mut location_slug = String::new();
    for term in location.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        for city in snapshot.cities.iter().filter(|c| !c.is_duplicate && same(*c, term)) {
            append(&mut location_slug, &city.slug);
        }
        for state in snapshot.states.iter().filter(|s| same(*s, term)) {
            append(&mut location_slug, &state.slug);
        }
    }
    if location_slug.is_empty() {
        location_slug = slugify(location);
    }

    SearchSlugs {
        skill_slug,
        location_slug,
    }
}
