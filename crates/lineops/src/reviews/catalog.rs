use std::collections::BTreeMap;

use super::domain::{CategoryId, ReviewTemplate, TemplateId};

/// Catalog provider boundary. Template definitions and their ordered
/// categories are owned elsewhere; the engine only reads them.
pub trait TemplateCatalog: Send + Sync {
    fn template(&self, id: &TemplateId) -> Result<Option<ReviewTemplate>, CatalogError>;
    fn template_by_name(&self, name: &str) -> Result<Option<ReviewTemplate>, CatalogError>;
    fn templates(&self) -> Result<Vec<ReviewTemplate>, CatalogError>;
}

/// Error enumeration for catalog lookups.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Collect the declared rating ceilings for a template's categories.
pub fn category_maxes(template: &ReviewTemplate) -> BTreeMap<CategoryId, u16> {
    template
        .categories
        .iter()
        .map(|category| (category.id.clone(), category.max_rating))
        .collect()
}
