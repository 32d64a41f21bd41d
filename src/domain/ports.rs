use crate::domain::model::{BoundaryPolicy, ResolvedCategory, SpeciesTable};
use crate::utils::error::Result;

/// Source of reference conversion data.
pub trait TableProvider: Send + Sync {
    fn species_table(&self) -> &SpeciesTable;

    fn resolve(&self, species: &str, category: Option<&str>) -> Result<ResolvedCategory<'_>> {
        self.species_table().resolve(species, category)
    }
}

impl TableProvider for SpeciesTable {
    fn species_table(&self) -> &SpeciesTable {
        self
    }
}

impl<T: TableProvider + ?Sized> TableProvider for std::sync::Arc<T> {
    fn species_table(&self) -> &SpeciesTable {
        (**self).species_table()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn tables_path(&self) -> Option<&str>;
    fn tables_only(&self) -> bool;
    fn boundary_policy(&self) -> BoundaryPolicy;
}
