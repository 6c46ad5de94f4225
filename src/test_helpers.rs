//! Shared fixtures for the resolver test suites.
//!
//! [`Site`] bundles the two in-memory collaborators with a small content
//! inventory that most tests share: post 42 ("Hello World"), a category
//! hierarchy, and a tag taxonomy. Tests mutate the stores to set their
//! stage, then call [`Site::engine`].

use std::sync::{Arc, Mutex};

pub use crate::args::{DescriptionArgs, TitleArgs, UrlArgs};
pub use crate::content::{
    CANONICAL_FIELD, DESCRIPTION_FIELD, MemoryContent, PostAttrs, TaxonomyAttrs, TermAttrs,
    TITLE_FIELD,
};
pub use crate::context::{RenderState, RequestContext};
pub use crate::engine::Engine;
pub use crate::options::{self, MemoryOptions};
pub use crate::types::ItemRef;

use crate::hooks::TitleHook;

/// The two collaborator stores, mutable until turned into an engine.
pub struct Site {
    pub options: MemoryOptions,
    pub content: MemoryContent,
}

impl Site {
    /// A site with the shared inventory and minimal options: site name
    /// "My Site", pipe title separator, home URL `http://example.com`.
    pub fn basic() -> Self {
        let options = MemoryOptions::new()
            .with(options::SITE_NAME, "My Site")
            .with(options::TITLE_SEPARATOR, "pipe")
            .with(options::HOME_URL, "http://example.com");

        let mut content = MemoryContent::new();
        content.add_post(PostAttrs {
            id: 42,
            title: "Hello World".to_string(),
            slug: "hello-world".to_string(),
            content: "Welcome to my first post. It has some words in it.".to_string(),
            status: "publish".to_string(),
            ..Default::default()
        });
        content.set_permalink(42, "/hello-world/");

        content.add_taxonomy(TaxonomyAttrs {
            name: "category".to_string(),
            label: "Category".to_string(),
            query_var: Some("category_name".to_string()),
            rewrite_slug: Some("category".to_string()),
            hierarchical: true,
        });
        content.add_taxonomy(TaxonomyAttrs {
            name: "post_tag".to_string(),
            label: "Tag".to_string(),
            query_var: Some("tag".to_string()),
            rewrite_slug: Some("tag".to_string()),
            hierarchical: false,
        });

        content.add_term(TermAttrs {
            id: 7,
            taxonomy: "category".to_string(),
            name: "News".to_string(),
            slug: "news".to_string(),
            description: "All the news that fits.".to_string(),
            parent: None,
        });
        content.add_term(TermAttrs {
            id: 8,
            taxonomy: "category".to_string(),
            name: "Tech".to_string(),
            slug: "tech".to_string(),
            description: String::new(),
            parent: None,
        });
        content.add_term(TermAttrs {
            id: 9,
            taxonomy: "category".to_string(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
            description: String::new(),
            parent: Some(8),
        });

        Self { options, content }
    }

    pub fn engine(self) -> Engine {
        Engine::new(self.options, self.content)
    }
}

/// A fresh unpaged front-end request context.
pub fn request() -> RequestContext {
    RequestContext::new(RenderState::default())
}

/// A title hook that always returns the same override.
pub struct FixedTitleHook(pub &'static str);

impl TitleHook for FixedTitleHook {
    fn bare_title(&self, _item: &ItemRef) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// A title hook that counts invocations and never overrides; used to
/// observe whether a resolution ran or hit the memo.
#[derive(Default)]
pub struct CountingTitleHook {
    calls: Arc<Mutex<u32>>,
}

impl CountingTitleHook {
    pub fn counter(&self) -> Arc<Mutex<u32>> {
        self.calls.clone()
    }
}

impl TitleHook for CountingTitleHook {
    fn bare_title(&self, _item: &ItemRef) -> Option<String> {
        *self.calls.lock().unwrap() += 1;
        None
    }
}
