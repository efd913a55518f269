//! Menu entry model representing one searchable catalogue item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Structured query expansion data attached to an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct QueryEnhancers {
    /// Primary terms mapped to a whitespace-separated synonym string
    pub primary_terms: BTreeMap<String, String>,

    /// Action terms grouped by action type (e.g. "view", "generate")
    pub action_terms: BTreeMap<String, BTreeMap<String, String>>,

    /// Misspellings grouped by error type, each term holding literal variants
    pub error_tolerant_terms: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl QueryEnhancers {
    /// Returns true when no expansion data is present
    pub fn is_empty(&self) -> bool {
        self.primary_terms.is_empty()
            && self.action_terms.is_empty()
            && self.error_tolerant_terms.is_empty()
    }
}

/// Natural-language phrasings that should lead to an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SearchPhrases {
    /// Question forms ("how do I recheck my marks")
    pub questions: Vec<String>,

    /// Imperative forms ("show revaluation report")
    pub commands: Vec<String>,

    /// Regional phrasings keyed by region
    pub regional_variations: BTreeMap<String, Vec<String>>,
}

/// Search metadata attached to an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SearchMetadata {
    /// Extra search keywords
    pub keywords: Vec<String>,

    /// Phrase-level search hints
    pub search_phrases: SearchPhrases,

    /// Loosely related terms
    pub related_terms: Vec<String>,
}

/// A single catalogue item describing an academic-records feature.
///
/// Entries are never physically removed: deleting an entry flips `active`
/// to false and the entry stays in the catalogue for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuEntry {
    /// Unique, stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Target URL or route
    #[serde(default)]
    pub url: String,

    /// When the feature is used
    #[serde(default)]
    pub context: String,

    /// Catalogue category
    #[serde(default)]
    pub category: String,

    /// Search keywords; must not be empty
    pub keywords: Vec<String>,

    /// Display order, also the first ranking tie-break
    #[serde(default)]
    pub order: u32,

    /// Inactive entries are hidden from search and listing
    #[serde(default = "default_active")]
    pub active: bool,

    /// Optional parent entry
    #[serde(default, alias = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Academic semester this entry concerns (e.g. "S4")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,

    /// Course this entry concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,

    /// Exam type this entry concerns (regular, supplementary, ...)
    #[serde(default, alias = "examType", skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,

    /// Structured query expansion data
    #[serde(default, alias = "queryEnhancers")]
    pub query_enhancers: QueryEnhancers,

    /// Search metadata
    #[serde(default, alias = "searchMetadata")]
    pub search_metadata: SearchMetadata,

    /// When the entry was created
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the entry was last mutated
    #[serde(default = "Utc::now", alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl MenuEntry {
    /// Create a new active entry with minimal information
    pub fn new(id: impl Into<String>, name: impl Into<String>, keywords: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            url: String::new(),
            context: String::new(),
            category: String::new(),
            keywords,
            order: 0,
            active: true,
            parent_id: None,
            semester: None,
            course: None,
            exam_type: None,
            query_enhancers: QueryEnhancers::default(),
            search_metadata: SearchMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a builder for more complex entry creation
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> MenuEntryBuilder {
        MenuEntryBuilder::new(id, name)
    }

    /// Check the invariants of a single entry.
    ///
    /// Cross-entry rules (unique ids, parent existence, cycles) live in the
    /// storage layer because they need the whole catalogue.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("entry id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err(format!("entry '{}' has an empty name", self.id));
        }
        if self.keywords.is_empty() {
            return Err(format!("entry '{}' must have at least one keyword", self.id));
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(format!("entry '{}' cannot be its own parent", self.id));
        }
        Ok(())
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Soft-delete this entry
    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Text the keyword factor matches against
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.description).to_lowercase()
    }
}

/// Turn a display name into a stable identifier ("Grace Mark Report" -> "grace-mark-report")
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A partial update for a [`MenuEntry`].
///
/// Fields left as `None` are untouched. For the optional attributes a
/// `Some(None)` clears the value (JSON `null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuEntryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub context: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub order: Option<u32>,
    pub active: Option<bool>,
    #[serde(alias = "parentId", deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub semester: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub course: Option<Option<String>>,
    #[serde(alias = "examType", deserialize_with = "double_option")]
    pub exam_type: Option<Option<String>>,
    #[serde(alias = "queryEnhancers")]
    pub query_enhancers: Option<QueryEnhancers>,
    #[serde(alias = "searchMetadata")]
    pub search_metadata: Option<SearchMetadata>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MenuEntryPatch {
    /// Returns true when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate the patch on its own, before it is merged
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be set to an empty string".to_string());
        }
        if let Some(keywords) = &self.keywords
            && keywords.is_empty()
        {
            return Err("keywords cannot be set to an empty list".to_string());
        }
        Ok(())
    }

    /// Merge the patch into a copy of `entry`, refreshing `updated_at`.
    ///
    /// The merged entry is validated as a whole, so a patch that would make
    /// the entry its own parent is rejected here.
    pub fn apply_to(&self, entry: &MenuEntry) -> Result<MenuEntry, String> {
        self.validate()?;

        let mut merged = entry.clone();
        if let Some(v) = &self.name {
            merged.name = v.clone();
        }
        if let Some(v) = &self.description {
            merged.description = v.clone();
        }
        if let Some(v) = &self.url {
            merged.url = v.clone();
        }
        if let Some(v) = &self.context {
            merged.context = v.clone();
        }
        if let Some(v) = &self.category {
            merged.category = v.clone();
        }
        if let Some(v) = &self.keywords {
            merged.keywords = v.clone();
        }
        if let Some(v) = self.order {
            merged.order = v;
        }
        if let Some(v) = self.active {
            merged.active = v;
        }
        if let Some(v) = &self.parent_id {
            merged.parent_id = v.clone();
        }
        if let Some(v) = &self.semester {
            merged.semester = v.clone();
        }
        if let Some(v) = &self.course {
            merged.course = v.clone();
        }
        if let Some(v) = &self.exam_type {
            merged.exam_type = v.clone();
        }
        if let Some(v) = &self.query_enhancers {
            merged.query_enhancers = v.clone();
        }
        if let Some(v) = &self.search_metadata {
            merged.search_metadata = v.clone();
        }

        merged.validate()?;
        merged.touch();
        Ok(merged)
    }
}

/// Builder for creating MenuEntry instances
pub struct MenuEntryBuilder {
    entry: MenuEntry,
}

impl MenuEntryBuilder {
    /// Create a new entry builder with an explicit id
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entry: MenuEntry::new(id, name, Vec::new()),
        }
    }

    /// Create a builder whose id is derived from the name
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(slugify(&name), name)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.entry.description = description.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.entry.url = url.into();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.entry.context = context.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.entry.category = category.into();
        self
    }

    /// Replace the keyword list
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single keyword
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.entry.keywords.push(keyword.into());
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.entry.order = order;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.entry.active = active;
        self
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.entry.parent_id = Some(parent_id.into());
        self
    }

    pub fn semester(mut self, semester: impl Into<String>) -> Self {
        self.entry.semester = Some(semester.into());
        self
    }

    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.entry.course = Some(course.into());
        self
    }

    pub fn exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.entry.exam_type = Some(exam_type.into());
        self
    }

    /// Add a primary term with its synonym string
    pub fn primary_term(mut self, term: impl Into<String>, synonyms: impl Into<String>) -> Self {
        self.entry
            .query_enhancers
            .primary_terms
            .insert(term.into(), synonyms.into());
        self
    }

    /// Add an action term under an action type
    pub fn action_term(
        mut self,
        action: impl Into<String>,
        term: impl Into<String>,
        synonyms: impl Into<String>,
    ) -> Self {
        self.entry
            .query_enhancers
            .action_terms
            .entry(action.into())
            .or_default()
            .insert(term.into(), synonyms.into());
        self
    }

    /// Add misspelled variants of a term under an error type
    pub fn error_variants<I, S>(
        mut self,
        error_type: impl Into<String>,
        term: impl Into<String>,
        variants: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry
            .query_enhancers
            .error_tolerant_terms
            .entry(error_type.into())
            .or_default()
            .insert(term.into(), variants.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_metadata(mut self, metadata: SearchMetadata) -> Self {
        self.entry.search_metadata = metadata;
        self
    }

    /// Add a question phrasing
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.entry
            .search_metadata
            .search_phrases
            .questions
            .push(question.into());
        self
    }

    /// Add a command phrasing
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.entry
            .search_metadata
            .search_phrases
            .commands
            .push(command.into());
        self
    }

    /// Build the final MenuEntry
    pub fn build(self) -> MenuEntry {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MenuEntry {
        MenuEntry::builder("revaluation-report", "Revaluation Report")
            .description("Revaluation EVALUATION_REPORT")
            .category("evaluation")
            .keywords(["recheck marks", "review evaluation"])
            .order(1)
            .build()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Grace Mark Report"), "grace-mark-report");
        assert_eq!(slugify("  Exam Valuation Report (Regular) "), "exam-valuation-report-regular");
        assert_eq!(slugify("supplementary Report"), "supplementary-report");
    }

    #[test]
    fn test_validate_rejects_empty_keywords() {
        let entry = MenuEntry::new("a", "A", vec![]);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_parent() {
        let mut entry = sample();
        entry.parent_id = Some(entry.id.clone());
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_patch_merges_and_touches() {
        let entry = sample();
        let before = entry.updated_at;
        let patch = MenuEntryPatch {
            description: Some("Second evaluation of answer sheets".to_string()),
            semester: Some(Some("S4".to_string())),
            ..Default::default()
        };

        let merged = patch.apply_to(&entry).unwrap();
        assert_eq!(merged.description, "Second evaluation of answer sheets");
        assert_eq!(merged.semester.as_deref(), Some("S4"));
        assert_eq!(merged.name, entry.name);
        assert_eq!(merged.created_at, entry.created_at);
        assert!(merged.updated_at >= before);
    }

    #[test]
    fn test_patch_rejects_empty_keywords() {
        let patch = MenuEntryPatch {
            keywords: Some(vec![]),
            ..Default::default()
        };
        assert!(patch.apply_to(&sample()).is_err());
    }

    #[test]
    fn test_patch_rejects_self_parent() {
        let patch = MenuEntryPatch {
            parent_id: Some(Some("revaluation-report".to_string())),
            ..Default::default()
        };
        assert!(patch.apply_to(&sample()).is_err());
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let mut entry = sample();
        entry.course = Some("BSc".to_string());

        let patch: MenuEntryPatch = serde_json::from_str(r#"{"course": null}"#).unwrap();
        assert_eq!(patch.course, Some(None));

        let merged = patch.apply_to(&entry).unwrap();
        assert_eq!(merged.course, None);
    }

    #[test]
    fn test_deserialize_accepts_camel_case_and_ignores_unknown_fields() {
        let json = r#"{
            "id": "grace-mark-report",
            "name": "Grace Mark Report",
            "keywords": ["extra marks"],
            "parentId": "revaluation-report",
            "createdAt": "2025-02-04T02:15:01Z",
            "updatedAt": "2025-02-04T02:15:01Z",
            "ui_components": {"icon": "star"}
        }"#;

        let entry: MenuEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.parent_id.as_deref(), Some("revaluation-report"));
        assert!(entry.active);
        assert_eq!(entry.order, 0);
    }
}
