use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use urbanista::accounts::{
    AccountDirectory, AccountId, AccountProfile, AccountRole, DirectoryError,
};
use urbanista::catalog::{Catalog, OfferKind};
use urbanista::listings::{
    Listing, ListingId, ListingRepository, ListingSearchQuery, ListingStatus, Page, PageRequest,
    RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Listing storage backing the service in lieu of a database. Rows are kept
/// ordered by id so browse pages are stable.
#[derive(Clone)]
pub(crate) struct InMemoryListingRepository {
    catalog: Arc<Catalog>,
    rows: Arc<Mutex<BTreeMap<ListingId, Listing>>>,
}

impl InMemoryListingRepository {
    pub(crate) fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            rows: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rows.lock().expect("repository mutex poisoned").len()
    }
}

impl ListingRepository for InMemoryListingRepository {
    fn insert_tree(
        &self,
        parent: Listing,
        subprojects: Vec<Listing>,
    ) -> Result<Listing, RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        // All-or-nothing: reject the whole tree before touching the map.
        if rows.contains_key(&parent.id)
            || subprojects.iter().any(|sub| rows.contains_key(&sub.id))
        {
            return Err(RepositoryError::Conflict);
        }
        rows.insert(parent.id.clone(), parent.clone());
        for sub in subprojects {
            rows.insert(sub.id.clone(), sub);
        }
        Ok(parent)
    }

    fn update(&self, listing: Listing) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        if !rows.contains_key(&listing.id) {
            return Err(RepositoryError::NotFound);
        }
        rows.insert(listing.id.clone(), listing);
        Ok(())
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows.get(id).cloned())
    }

    fn children(&self, id: &ListingId) -> Result<Vec<Listing>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .values()
            .filter(|listing| listing.parent_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }

    fn projects(&self) -> Result<Vec<Listing>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .values()
            .filter(|listing| {
                listing.offer_kind == OfferKind::Project
                    && listing.status == ListingStatus::Active
                    && listing.parent_id.is_none()
            })
            .cloned()
            .collect())
    }

    fn search(
        &self,
        query: &ListingSearchQuery,
        page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        let mut matches: Vec<_> = rows
            .values()
            .filter(|listing| listing.status == ListingStatus::Active)
            .filter(|listing| query.matches(listing, &self.catalog))
            .cloned()
            .collect();
        // Newest ids first.
        matches.reverse();
        Ok(Page::slice(matches, page))
    }
}

/// Account lookups backing the owner checks. Real deployments put the
/// identity provider behind this seam.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountDirectory {
    accounts: Arc<Mutex<HashMap<AccountId, AccountProfile>>>,
}

impl InMemoryAccountDirectory {
    pub(crate) fn seeded() -> Self {
        let directory = Self::default();
        directory.add(AccountProfile {
            id: AccountId("usr-1".to_string()),
            role: AccountRole::Publisher,
            display_name: "Demo Publisher".to_string(),
        });
        directory.add(AccountProfile {
            id: AccountId("adm-1".to_string()),
            role: AccountRole::Administrator,
            display_name: "Back Office".to_string(),
        });
        directory
    }

    pub(crate) fn add(&self, profile: AccountProfile) {
        self.accounts
            .lock()
            .expect("directory mutex poisoned")
            .insert(profile.id.clone(), profile);
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn fetch(&self, id: &AccountId) -> Result<Option<AccountProfile>, DirectoryError> {
        let accounts = self.accounts.lock().expect("directory mutex poisoned");
        Ok(accounts.get(id).cloned())
    }
}
