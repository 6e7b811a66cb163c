//! Menu catalogue tree: categories, subcategories, subsections, items.
//!
//! A subcategory may hold a flat item list and named subsections at the
//! same time. Both are searched.

use serde::{Deserialize, Serialize};

use super::ResourceId;
use super::slug::slugify;
use super::validation::{
    FormValidationError, ensure_amount, validate_non_empty, validate_slug,
};

/// Top-level menu section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Backend identifier.
    #[serde(alias = "_id")]
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Groups of items.
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    /// Subcategory with `name`, ignoring case.
    pub fn find_subcategory(&self, name: &str) -> Option<&Subcategory> {
        self.subcategories
            .iter()
            .find(|sub| sub.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Number of items across every subcategory and subsection.
    pub fn item_count(&self) -> usize {
        self.subcategories.iter().map(Subcategory::item_count).sum()
    }
}

/// Group of items inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    /// Display name, unique within the category.
    pub name: String,
    /// Items listed directly under the subcategory.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Named blocks of items.
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Subcategory {
    /// Empty subcategory named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            subsections: Vec::new(),
        }
    }

    /// Subsection with `name`, ignoring case.
    pub fn find_subsection(&self, name: &str) -> Option<&Subsection> {
        self.subsections
            .iter()
            .find(|section| section.name.eq_ignore_ascii_case(name.trim()))
    }

    fn item_count(&self) -> usize {
        self.items.len()
            + self
                .subsections
                .iter()
                .map(|section| section.items.len())
                .sum::<usize>()
    }
}

/// Named block of items inside a subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    /// Display name, unique within the subcategory.
    pub name: String,
    /// Items in this block.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Display name.
    pub name: String,
    /// Optional description; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Price in euros.
    pub price: f64,
    #[serde(
        default,
        rename = "image",
        alias = "imageUrl",
        skip_serializing_if = "Option::is_none"
    )]
    /// Image URL, sent as `image`.
    pub image_url: Option<String>,
}

impl Item {
    /// Validated item.
    pub fn new(
        name: &str,
        description: &str,
        price: f64,
        image_url: Option<&str>,
    ) -> Result<Self, FormValidationError> {
        let name = validate_non_empty(name, "item name")?;
        ensure_amount(price, "price")?;
        Ok(Self {
            name,
            description: description.trim().to_owned(),
            price,
            image_url: image_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
        })
    }

    fn mentions(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// Admin input for creating or renaming a category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Explicit slug; derived from the name when absent or blank.
    pub slug: Option<String>,
    /// Groups of items to store with the category.
    pub subcategories: Vec<Subcategory>,
}

/// Body for `POST /catalog/category` and `PUT /catalog/category/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    /// Trimmed display name.
    pub name: String,
    /// Resolved slug.
    pub slug: String,
    /// Groups of items.
    pub subcategories: Vec<Subcategory>,
}

impl CategoryDraft {
    /// Draft named `name` with a derived slug.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate and build the request body. A missing or blank slug is
    /// derived from the name.
    pub fn into_body(self) -> Result<CategoryBody, FormValidationError> {
        let name = validate_non_empty(&self.name, "category name")?;
        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => validate_slug(explicit, "slug")?,
            None => validate_slug(&slugify(&name), "slug")?,
        };
        Ok(CategoryBody {
            name,
            slug,
            subcategories: self.subcategories,
        })
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: Some(category.slug.clone()),
            subcategories: category.subcategories.clone(),
        }
    }
}

/// Body for `POST /catalog/item`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    /// Category receiving the item.
    pub category_id: ResourceId,
    /// Subcategory receiving the item.
    pub subcategory_name: String,
    /// Subsection receiving the item, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection_name: Option<String>,
    /// The item itself.
    pub item: Item,
}

impl NewItem {
    /// Target an item at a named subcategory (and optional subsection).
    /// Existence is checked by the backend.
    pub fn new(
        category_id: ResourceId,
        subcategory_name: &str,
        subsection_name: Option<&str>,
        item: Item,
    ) -> Result<Self, FormValidationError> {
        Ok(Self {
            category_id,
            subcategory_name: validate_non_empty(subcategory_name, "subcategory")?,
            subsection_name: subsection_name
                .map(|name| validate_non_empty(name, "subsection"))
                .transpose()?,
            item,
        })
    }
}

/// One search result with its position in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogHit<'a> {
    /// Category holding the item.
    pub category: &'a Category,
    /// Subcategory holding the item.
    pub subcategory: &'a Subcategory,
    /// Subsection holding the item, if any.
    pub subsection: Option<&'a Subsection>,
    /// Matching item.
    pub item: &'a Item,
}

/// Local search over an already-fetched catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive text matched against item names and descriptions.
    pub search: Option<String>,
    /// Restrict to one category slug.
    pub category: Option<String>,
}

impl CatalogFilter {
    /// Items passing the filter, in menu order.
    pub fn apply<'a>(&self, categories: &'a [Category]) -> Vec<CatalogHit<'a>> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        let matches = |item: &Item| needle.as_deref().is_none_or(|needle| item.mentions(needle));

        categories
            .iter()
            .filter(|category| {
                self.category
                    .as_deref()
                    .is_none_or(|slug| category.slug.eq_ignore_ascii_case(slug))
            })
            .flat_map(|category| {
                category.subcategories.iter().flat_map(move |subcategory| {
                    let flat = subcategory.items.iter().map(move |item| CatalogHit {
                        category,
                        subcategory,
                        subsection: None,
                        item,
                    });
                    let nested = subcategory.subsections.iter().flat_map(move |section| {
                        section.items.iter().map(move |item| CatalogHit {
                            category,
                            subcategory,
                            subsection: Some(section),
                            item,
                        })
                    });
                    flat.chain(nested)
                })
            })
            .filter(|hit| matches(hit.item))
            .collect()
    }
}
