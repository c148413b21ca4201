//! Category catalog and special prompt list
//!
//! A [`Catalog`] is the static input of a game session: the ordered constraint
//! categories with their options, and the ordered list of special prompts.
//! Everything that would make a draw undefined is rejected here, when the
//! catalog is built, so that drawing itself never fails.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Option meaning "no restriction in this category" when none is configured
pub const DEFAULT_FREE: &str = "free";

/// Value of the single item produced by the unconstrained outcome
pub const DEFAULT_UNCONSTRAINED: &str = "no constraint";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no categories")]
    NoCategories,
    #[error("category name cannot be empty")]
    EmptyCategoryName,
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("category '{category}' must contain the free option '{free}' exactly once (found {found})")]
    FreeSentinel {
        category: String,
        free: String,
        found: usize,
    },
    #[error("category '{0}' needs at least one option besides the free option")]
    TooFewOptions(String),
    #[error("duplicate option '{option}' in category '{category}'")]
    DuplicateOption { category: String, option: String },
    #[error("special prompt list is empty")]
    NoSpecials,
    #[error("duplicate special prompt: {0}")]
    DuplicateSpecial(String),
    #[error("{0} label cannot be empty")]
    EmptyLabel(&'static str),
}

/// A constraint category and its options, free sentinel included
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    options: Vec<String>,
    free_index: usize,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All options in catalog order, including the free sentinel
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Options that can be emitted as a constraint (the free sentinel removed)
    pub fn choices(&self) -> impl Iterator<Item = &str> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.free_index)
            .map(|(_, option)| option.as_str())
    }

    pub fn choice_count(&self) -> usize {
        self.options.len() - 1
    }

    /// The `index`-th choice, counting past the free sentinel
    pub fn choice(&self, index: usize) -> Option<&str> {
        let position = if index < self.free_index { index } else { index + 1 };
        self.options.get(position).map(String::as_str)
    }
}

/// Validated, immutable catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogBuilder", into = "CatalogBuilder")]
pub struct Catalog {
    categories: Vec<Category>,
    specials: Vec<String>,
    free: String,
    unconstrained: String,
}

impl Catalog {
    /// Shorthand for building a catalog with the default labels
    ///
    /// # Example
    /// ```
    /// use karaoke_prompts::Catalog;
    ///
    /// let catalog = Catalog::new(
    ///     [("era", vec!["90s", "2000s", "free"])],
    ///     ["Title has two words"],
    /// )
    /// .unwrap();
    /// assert_eq!(catalog.categories().len(), 1);
    /// ```
    pub fn new<C, N, O, S, P>(categories: C, specials: S) -> Result<Self, CatalogError>
    where
        C: IntoIterator<Item = (N, Vec<O>)>,
        N: Into<String>,
        O: Into<String>,
        S: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut builder = CatalogBuilder::new();
        for (name, options) in categories {
            builder = builder.category(name, options);
        }
        builder.specials(specials).build()
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Categories in canonical order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Special prompts in canonical order
    pub fn specials(&self) -> &[String] {
        &self.specials
    }

    pub fn free(&self) -> &str {
        &self.free
    }

    pub fn unconstrained(&self) -> &str {
        &self.unconstrained
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub options: Vec<String>,
}

/// Unvalidated catalog contents; [`CatalogBuilder::build`] checks them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogBuilder {
    #[serde(default)]
    pub categories: Vec<CategorySpec>,
    #[serde(default)]
    pub specials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unconstrained: Option<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category<O: Into<String>>(
        mut self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = O>,
    ) -> Self {
        self.categories.push(CategorySpec {
            name: name.into(),
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn special(mut self, prompt: impl Into<String>) -> Self {
        self.specials.push(prompt.into());
        self
    }

    pub fn specials<P: Into<String>>(mut self, prompts: impl IntoIterator<Item = P>) -> Self {
        self.specials.extend(prompts.into_iter().map(Into::into));
        self
    }

    /// Set the free sentinel (defaults to [`DEFAULT_FREE`])
    pub fn free(mut self, free: impl Into<String>) -> Self {
        self.free = Some(free.into());
        self
    }

    /// Set the unconstrained label (defaults to [`DEFAULT_UNCONSTRAINED`])
    pub fn unconstrained(mut self, label: impl Into<String>) -> Self {
        self.unconstrained = Some(label.into());
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let free = self.free.unwrap_or_else(|| DEFAULT_FREE.to_string());
        let unconstrained = self
            .unconstrained
            .unwrap_or_else(|| DEFAULT_UNCONSTRAINED.to_string());
        if free.is_empty() {
            return Err(CatalogError::EmptyLabel("free"));
        }
        if unconstrained.is_empty() {
            return Err(CatalogError::EmptyLabel("unconstrained"));
        }

        if self.categories.is_empty() {
            return Err(CatalogError::NoCategories);
        }

        let mut names = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());
        for entry in self.categories {
            if entry.name.is_empty() {
                return Err(CatalogError::EmptyCategoryName);
            }
            if !names.insert(entry.name.clone()) {
                return Err(CatalogError::DuplicateCategory(entry.name));
            }
            categories.push(build_category(entry, &free)?);
        }

        if self.specials.is_empty() {
            return Err(CatalogError::NoSpecials);
        }
        let mut seen = HashSet::new();
        for prompt in &self.specials {
            if !seen.insert(prompt.as_str()) {
                return Err(CatalogError::DuplicateSpecial(prompt.clone()));
            }
        }

        Ok(Catalog {
            categories,
            specials: self.specials,
            free,
            unconstrained,
        })
    }
}

fn build_category(entry: CategorySpec, free: &str) -> Result<Category, CatalogError> {
    let mut sentinels = entry
        .options
        .iter()
        .enumerate()
        .filter(|(_, option)| *option == free)
        .map(|(index, _)| index);
    let free_index = match (sentinels.next(), sentinels.next()) {
        (Some(index), None) => index,
        _ => {
            let found = entry.options.iter().filter(|o| *o == free).count();
            return Err(CatalogError::FreeSentinel {
                category: entry.name,
                free: free.to_string(),
                found,
            });
        }
    };
    if entry.options.len() < 2 {
        return Err(CatalogError::TooFewOptions(entry.name));
    }

    let mut seen = HashSet::new();
    for option in &entry.options {
        if !seen.insert(option.as_str()) {
            return Err(CatalogError::DuplicateOption {
                category: entry.name.clone(),
                option: option.clone(),
            });
        }
    }

    Ok(Category {
        name: entry.name,
        options: entry.options,
        free_index,
    })
}

impl TryFrom<CatalogBuilder> for Catalog {
    type Error = CatalogError;

    fn try_from(builder: CatalogBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<Catalog> for CatalogBuilder {
    fn from(catalog: Catalog) -> Self {
        CatalogBuilder {
            categories: catalog
                .categories
                .into_iter()
                .map(|c| CategorySpec {
                    name: c.name,
                    options: c.options,
                })
                .collect(),
            specials: catalog.specials,
            free: Some(catalog.free),
            unconstrained: Some(catalog.unconstrained),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogBuilder {
        Catalog::builder()
            .category("A", ["a1", "a2", "free"])
            .category("B", ["b1", "free"])
            .specials(["s1", "s2"])
    }

    #[test]
    fn test_build_sample() {
        let catalog = sample().build().unwrap();
        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.free(), "free");
        assert_eq!(catalog.unconstrained(), "no constraint");
        assert_eq!(catalog.specials(), ["s1", "s2"]);
    }

    #[test]
    fn test_choices_skip_free() {
        let catalog = Catalog::builder()
            .category("A", ["a1", "free", "a2"])
            .special("s1")
            .build()
            .unwrap();
        let category = catalog.category("A").unwrap();
        let choices: Vec<_> = category.choices().collect();
        assert_eq!(choices, ["a1", "a2"]);
        assert_eq!(category.choice_count(), 2);
        assert_eq!(category.choice(1), Some("a2"));
        assert_eq!(category.choice(2), None);
    }

    #[test]
    fn test_free_index_tracks_sentinel_position() {
        let catalog = Catalog::builder()
            .category("first", ["free", "x", "y"])
            .category("last", ["x", "y", "free"])
            .special("s1")
            .build()
            .unwrap();

        let first = catalog.category("first").unwrap();
        assert_eq!(first.choice(0), Some("x"));
        assert_eq!(first.choice(1), Some("y"));
        assert_eq!(first.choice(2), None);

        let last = catalog.category("last").unwrap();
        assert_eq!(last.choices().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(last.choice(1), Some("y"));
        assert_eq!(last.choice(2), None);
    }

    #[test]
    fn test_missing_free_rejected() {
        let err = Catalog::builder()
            .category("A", ["a1", "a2"])
            .special("s1")
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::FreeSentinel { found: 0, .. }));
    }

    #[test]
    fn test_double_free_rejected() {
        let err = Catalog::builder()
            .category("A", ["free", "a1", "free"])
            .special("s1")
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::FreeSentinel { found: 2, .. }));
    }

    #[test]
    fn test_only_free_rejected() {
        let err = Catalog::builder()
            .category("A", ["free"])
            .special("s1")
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogError::TooFewOptions("A".to_string()));
    }

    #[test]
    fn test_empty_specials_rejected() {
        let err = Catalog::builder()
            .category("A", ["a1", "free"])
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogError::NoSpecials);
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = sample().category("A", ["x", "free"]).build().unwrap_err();
        assert_eq!(err, CatalogError::DuplicateCategory("A".to_string()));

        let err = sample().special("s1").build().unwrap_err();
        assert_eq!(err, CatalogError::DuplicateSpecial("s1".to_string()));

        let err = Catalog::builder()
            .category("A", ["a1", "a1", "free"])
            .special("s1")
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateOption { .. }));
    }

    #[test]
    fn test_no_categories_rejected() {
        let err = Catalog::builder().special("s1").build().unwrap_err();
        assert_eq!(err, CatalogError::NoCategories);
    }

    #[test]
    fn test_custom_free_label() {
        let catalog = Catalog::builder()
            .free("自由")
            .unconstrained("縛りなし")
            .category("年代", ["90年代", "自由"])
            .special("タイトルが2文字")
            .build()
            .unwrap();
        assert_eq!(catalog.free(), "自由");
        assert_eq!(catalog.categories()[0].choices().collect::<Vec<_>>(), ["90年代"]);
    }

    #[test]
    fn test_json_goes_through_validation() {
        let catalog = sample().build().unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);

        let invalid = r#"{"categories":[{"name":"A","options":["a1"]}],"specials":["s1"]}"#;
        assert!(serde_json::from_str::<Catalog>(invalid).is_err());
    }
}
