//! Menu categories and products.
//!
//! Drafts validate admin input before it reaches a repository; the read
//! models mirror stored rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::money::{Money, NegativeAmount};
use super::slug::{Slug, SlugValidationError};

/// Longest accepted category or product name.
pub const CATALOGUE_NAME_MAX: usize = 120;
/// Longest accepted description.
pub const DESCRIPTION_MAX: usize = 2000;
/// Shortest preparation time, in minutes.
pub const PREPARATION_MIN: u32 = 1;
/// Longest preparation time, in minutes.
pub const PREPARATION_MAX: u32 = 240;
/// Longest accepted search term.
pub const SEARCH_MAX: usize = 100;

/// Validation failures for catalogue input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error(transparent)]
    Slug(#[from] SlugValidationError),
    #[error(transparent)]
    Price(#[from] NegativeAmount),
    #[error("preparation time must be between {min} and {max} minutes")]
    PreparationOutOfRange { min: u32, max: u32 },
    #[error("search term must be at most {max} characters")]
    SearchTooLong { max: usize },
}

impl CatalogueValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
            Self::Slug(_) => "slug",
            Self::Price(_) => "priceCents",
            Self::PreparationOutOfRange { .. } => "preparationMinutes",
            Self::SearchTooLong { .. } => "q",
        }
    }
}

fn validate_name(raw: &str) -> Result<String, CatalogueValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogueValidationError::EmptyName);
    }
    if name.chars().count() > CATALOGUE_NAME_MAX {
        return Err(CatalogueValidationError::NameTooLong {
            max: CATALOGUE_NAME_MAX,
        });
    }
    Ok(name.to_owned())
}

fn validate_description(raw: Option<String>) -> Result<Option<String>, CatalogueValidationError> {
    let Some(text) = raw.map(|value| value.trim().to_owned()) else {
        return Ok(None);
    };
    if text.is_empty() {
        return Ok(None);
    }
    if text.chars().count() > DESCRIPTION_MAX {
        return Err(CatalogueValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(Some(text))
}

fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<Slug, CatalogueValidationError> {
    match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(Slug::new(value)?),
        None => Ok(Slug::from_name(name)),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Menu section such as "Pizza" or "Desserts".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Validated category create/update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Raw category fields as submitted by an admin.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl TryFrom<CategoryInput> for CategoryDraft {
    type Error = CatalogueValidationError;

    /// The slug defaults to one derived from the name.
    fn try_from(input: CategoryInput) -> Result<Self, Self::Error> {
        let name = validate_name(&input.name)?;
        let slug = resolve_slug(input.slug.as_deref(), &name)?;
        Ok(Self {
            description: validate_description(input.description)?,
            image_url: blank_to_none(input.image_url),
            name,
            slug,
        })
    }
}

/// Bounded preparation time in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u32")]
pub struct PreparationMinutes(u32);

impl PreparationMinutes {
    /// Validate against [`PREPARATION_MIN`]..=[`PREPARATION_MAX`].
    pub fn new(minutes: u32) -> Result<Self, CatalogueValidationError> {
        if (PREPARATION_MIN..=PREPARATION_MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(CatalogueValidationError::PreparationOutOfRange {
                min: PREPARATION_MIN,
                max: PREPARATION_MAX,
            })
        }
    }

    /// Minutes.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<PreparationMinutes> for u32 {
    fn from(value: PreparationMinutes) -> Self {
        value.0
    }
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    #[serde(rename = "priceCents")]
    pub price: Money,
    pub image_url: Option<String>,
    pub preparation_minutes: PreparationMinutes,
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product create/update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub category_id: Uuid,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub preparation_minutes: PreparationMinutes,
    pub is_available: bool,
    pub is_featured: bool,
}

/// Raw product fields as submitted by an admin.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub preparation_minutes: u32,
    pub is_available: bool,
    pub is_featured: bool,
}

impl TryFrom<ProductInput> for ProductDraft {
    type Error = CatalogueValidationError;

    fn try_from(input: ProductInput) -> Result<Self, Self::Error> {
        let name = validate_name(&input.name)?;
        let slug = resolve_slug(input.slug.as_deref(), &name)?;
        Ok(Self {
            category_id: input.category_id,
            description: validate_description(input.description)?,
            price: Money::from_cents(input.price_cents)?,
            image_url: blank_to_none(input.image_url),
            preparation_minutes: PreparationMinutes::new(input.preparation_minutes)?,
            is_available: input.is_available,
            is_featured: input.is_featured,
            name,
            slug,
        })
    }
}

/// Product listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Restrict to one category slug.
    pub category: Option<Slug>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    /// Restrict to (non-)featured products.
    pub featured: Option<bool>,
    /// Admin listings include products hidden from the menu.
    pub include_unavailable: bool,
}

impl ProductFilter {
    /// Build a public filter, validating the raw query values.
    pub fn public(
        category: Option<&str>,
        search: Option<&str>,
        featured: Option<bool>,
    ) -> Result<Self, CatalogueValidationError> {
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Slug::new)
            .transpose()?;
        let search = search
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        if search
            .as_ref()
            .is_some_and(|term| term.chars().count() > SEARCH_MAX)
        {
            return Err(CatalogueValidationError::SearchTooLong { max: SEARCH_MAX });
        }
        Ok(Self {
            category,
            search,
            featured,
            include_unavailable: false,
        })
    }

    /// Same filter, widened to include unavailable products.
    #[must_use]
    pub fn including_unavailable(mut self) -> Self {
        self.include_unavailable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn product_input() -> ProductInput {
        ProductInput {
            category_id: Uuid::nil(),
            name: String::from("  Margherita "),
            slug: None,
            description: Some(String::from("   ")),
            price_cents: 1150,
            image_url: Some(String::new()),
            preparation_minutes: 12,
            is_available: true,
            is_featured: false,
        }
    }

    #[rstest]
    fn product_draft_normalises_optional_text(product_input: ProductInput) {
        let draft = ProductDraft::try_from(product_input).expect("valid product");
        assert_eq!(draft.name, "Margherita");
        assert_eq!(draft.slug.as_ref(), "margherita");
        assert_eq!(draft.description, None);
        assert_eq!(draft.image_url, None);
        assert_eq!(draft.price.cents(), 1150);
    }

    #[rstest]
    #[case::negative_price(|i: &mut ProductInput| i.price_cents = -5, "priceCents")]
    #[case::zero_prep(|i: &mut ProductInput| i.preparation_minutes = 0, "preparationMinutes")]
    #[case::long_prep(|i: &mut ProductInput| i.preparation_minutes = 241, "preparationMinutes")]
    #[case::blank_name(|i: &mut ProductInput| i.name = String::from(" "), "name")]
    #[case::bad_slug(|i: &mut ProductInput| i.slug = Some(String::from("Bad Slug")), "slug")]
    fn product_draft_rejects_invalid_fields(
        mut product_input: ProductInput,
        #[case] mutate: fn(&mut ProductInput),
        #[case] field: &str,
    ) {
        mutate(&mut product_input);
        let err = ProductDraft::try_from(product_input).expect_err("invalid product");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn category_draft_prefers_explicit_slug() {
        let draft = CategoryDraft::try_from(CategoryInput {
            name: String::from("Sweet Things"),
            slug: Some(String::from("desserts")),
            ..CategoryInput::default()
        })
        .expect("valid category");
        assert_eq!(draft.slug.as_ref(), "desserts");
    }

    #[rstest]
    fn public_filter_ignores_blank_values() {
        let filter = ProductFilter::public(Some(" "), Some(""), None).expect("valid filter");
        assert_eq!(filter, ProductFilter::default());
    }

    #[rstest]
    fn public_filter_rejects_long_search_terms() {
        let term = "x".repeat(SEARCH_MAX + 1);
        assert_eq!(
            ProductFilter::public(None, Some(&term), None),
            Err(CatalogueValidationError::SearchTooLong { max: SEARCH_MAX })
        );
    }
}
