//! Content access: posts, terms, taxonomies, custom fields, permalinks.
//!
//! The engine never touches host storage directly. Everything it knows
//! about a content item comes through the [`ContentAccessor`] trait as
//! plain attribute bags. [`MemoryContent`] is the in-memory
//! implementation used by tests and small embedders; real hosts adapt
//! their own storage.
//!
//! Custom-field names the resolvers read are constants here: an explicit
//! per-item title ([`TITLE_FIELD`]), description ([`DESCRIPTION_FIELD`]),
//! and canonical URL ([`CANONICAL_FIELD`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-item custom title field.
pub const TITLE_FIELD: &str = "meta_title";
/// Per-item custom description field.
pub const DESCRIPTION_FIELD: &str = "meta_description";
/// Per-item custom canonical URL field (singular items only).
pub const CANONICAL_FIELD: &str = "canonical_url";

/// Raw attributes of a singular post or page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostAttrs {
    pub id: u64,
    /// Stored title, as entered.
    pub title: String,
    pub slug: String,
    /// Explicit excerpt, if the author wrote one.
    pub excerpt: Option<String>,
    /// Raw content body (may contain markup and shortcodes).
    pub content: String,
    /// Post status: `"publish"`, `"draft"`, `"auto-draft"`, `"private"`, ...
    pub status: String,
    /// Set when the item is password-protected.
    pub password: Option<String>,
}

impl PostAttrs {
    pub fn is_protected(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn is_private(&self) -> bool {
        self.status == "private"
    }

    /// Drafts never get automatic trailing slashes on their URLs.
    pub fn is_draft(&self) -> bool {
        self.status == "draft" || self.status == "auto-draft"
    }
}

/// Raw attributes of a taxonomy term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermAttrs {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// Term description, used as a description excerpt source.
    pub description: String,
    /// Parent term id for hierarchical taxonomies.
    pub parent: Option<u64>,
}

/// Attributes of a taxonomy itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyAttrs {
    pub name: String,
    /// Human label, e.g. `"Category"`.
    pub label: String,
    /// Query variable for default-structure URLs (`?{query_var}={slug}`).
    pub query_var: Option<String>,
    /// Extra rewrite structure prefixed to pretty term paths.
    pub rewrite_slug: Option<String>,
    pub hierarchical: bool,
}

/// Read access to host content.
///
/// Absence is never an error: every method returns `Option` and the
/// resolvers fall through their cascades on `None`.
pub trait ContentAccessor {
    fn post(&self, id: u64) -> Option<PostAttrs>;

    fn term(&self, taxonomy: &str, id: u64) -> Option<TermAttrs>;

    fn taxonomy(&self, name: &str) -> Option<TaxonomyAttrs>;

    /// Custom field on a singular item.
    fn custom_field(&self, field: &str, id: u64) -> Option<String>;

    /// Custom field on a term.
    fn term_custom_field(&self, taxonomy: &str, id: u64, field: &str) -> Option<String>;

    /// The host's canonical permalink path for a post, site-relative
    /// (e.g. `"/hello-world/"`, or `"/?p=42"` under the default
    /// structure). `None` when the id is unknown.
    fn permalink_path(&self, id: u64) -> Option<String>;
}

/// In-memory content store for tests and embedders.
///
/// Populated with `add_*` methods; lookups mirror the trait exactly.
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    posts: HashMap<u64, PostAttrs>,
    terms: HashMap<(String, u64), TermAttrs>,
    taxonomies: HashMap<String, TaxonomyAttrs>,
    fields: HashMap<(u64, String), String>,
    term_fields: HashMap<(String, u64, String), String>,
    permalinks: HashMap<u64, String>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post(&mut self, post: PostAttrs) {
        self.posts.insert(post.id, post);
    }

    pub fn add_term(&mut self, term: TermAttrs) {
        self.terms.insert((term.taxonomy.clone(), term.id), term);
    }

    pub fn add_taxonomy(&mut self, taxonomy: TaxonomyAttrs) {
        self.taxonomies.insert(taxonomy.name.clone(), taxonomy);
    }

    pub fn set_field(&mut self, id: u64, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert((id, field.into()), value.into());
    }

    pub fn remove_field(&mut self, id: u64, field: &str) {
        self.fields.remove(&(id, field.to_string()));
    }

    pub fn set_term_field(
        &mut self,
        taxonomy: impl Into<String>,
        id: u64,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.term_fields
            .insert((taxonomy.into(), id, field.into()), value.into());
    }

    pub fn set_permalink(&mut self, id: u64, path: impl Into<String>) {
        self.permalinks.insert(id, path.into());
    }
}

impl ContentAccessor for MemoryContent {
    fn post(&self, id: u64) -> Option<PostAttrs> {
        self.posts.get(&id).cloned()
    }

    fn term(&self, taxonomy: &str, id: u64) -> Option<TermAttrs> {
        self.terms.get(&(taxonomy.to_string(), id)).cloned()
    }

    fn taxonomy(&self, name: &str) -> Option<TaxonomyAttrs> {
        self.taxonomies.get(name).cloned()
    }

    fn custom_field(&self, field: &str, id: u64) -> Option<String> {
        self.fields.get(&(id, field.to_string())).cloned()
    }

    fn term_custom_field(&self, taxonomy: &str, id: u64, field: &str) -> Option<String> {
        self.term_fields
            .get(&(taxonomy.to_string(), id, field.to_string()))
            .cloned()
    }

    fn permalink_path(&self, id: u64) -> Option<String> {
        self.permalinks.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> PostAttrs {
        PostAttrs {
            id: 42,
            title: "Hello World".to_string(),
            slug: "hello-world".to_string(),
            status: "publish".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn post_roundtrip() {
        let mut content = MemoryContent::new();
        content.add_post(sample_post());
        assert_eq!(content.post(42).unwrap().title, "Hello World");
        assert!(content.post(99).is_none());
    }

    #[test]
    fn term_lookup_is_taxonomy_scoped() {
        let mut content = MemoryContent::new();
        content.add_term(TermAttrs {
            id: 5,
            taxonomy: "category".to_string(),
            name: "News".to_string(),
            slug: "news".to_string(),
            ..Default::default()
        });
        assert!(content.term("category", 5).is_some());
        assert!(content.term("post_tag", 5).is_none());
    }

    #[test]
    fn custom_fields_are_per_item() {
        let mut content = MemoryContent::new();
        content.set_field(42, TITLE_FIELD, "Custom");
        assert_eq!(content.custom_field(TITLE_FIELD, 42).as_deref(), Some("Custom"));
        assert!(content.custom_field(TITLE_FIELD, 43).is_none());
        content.remove_field(42, TITLE_FIELD);
        assert!(content.custom_field(TITLE_FIELD, 42).is_none());
    }

    #[test]
    fn term_fields_do_not_collide_with_post_fields() {
        let mut content = MemoryContent::new();
        content.set_field(5, DESCRIPTION_FIELD, "post desc");
        content.set_term_field("category", 5, DESCRIPTION_FIELD, "term desc");
        assert_eq!(
            content.custom_field(DESCRIPTION_FIELD, 5).as_deref(),
            Some("post desc")
        );
        assert_eq!(
            content
                .term_custom_field("category", 5, DESCRIPTION_FIELD)
                .as_deref(),
            Some("term desc")
        );
    }

    #[test]
    fn status_predicates() {
        let mut post = sample_post();
        assert!(!post.is_draft());
        assert!(!post.is_private());
        assert!(!post.is_protected());

        post.status = "draft".to_string();
        assert!(post.is_draft());
        post.status = "auto-draft".to_string();
        assert!(post.is_draft());
        post.status = "private".to_string();
        assert!(post.is_private());

        post.password = Some("secret".to_string());
        assert!(post.is_protected());
        post.password = Some(String::new());
        assert!(!post.is_protected());
    }
}
