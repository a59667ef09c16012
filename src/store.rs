//! In-memory company store.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::models::{Company, CompanyId};
use crate::traits::{CompanyFilter, CompanyStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCompanyStore {
    companies: Vec<Company>,
    index: HashMap<CompanyId, usize>,
}

impl InMemoryCompanyStore {
    pub fn new(companies: Vec<Company>) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(companies.len());
        for (position, company) in companies.iter().enumerate() {
            if index.insert(company.id.clone(), position).is_some() {
                return Err(StoreError::DuplicateId(company.id.clone()));
            }
        }
        Ok(Self { companies, index })
    }

    /// Load a JSON array of companies.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(serde_json::from_str(&text)?)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Mutable access for enrichment passes such as geocoding. Ids must not
    /// be changed through this.
    pub fn companies_mut(&mut self) -> &mut [Company] {
        &mut self.companies
    }

    pub fn ids(&self) -> Vec<CompanyId> {
        self.companies.iter().map(|company| company.id.clone()).collect()
    }
}

impl CompanyStore for InMemoryCompanyStore {
    fn get(&self, id: &CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.index.get(id).map(|&position| self.companies[position].clone()))
    }

    fn find(&self, filter: &CompanyFilter) -> Result<Vec<Company>, StoreError> {
        Ok(self
            .companies
            .iter()
            .filter(|company| filter.matches(company))
            .cloned()
            .collect())
    }
}
