use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    Listing, ListingDraft, ListingId, ListingStatus, MediaDraft, MediaId, MediaItem,
};
use super::guard::{IntakeViolation, ListingGuard};
use super::media::{MediaPolicy, MediaViolation};
use super::repository::{ListingRepository, RepositoryError};
use super::search::{ListingSearchQuery, Page, PageRequest};
use super::views::{self, ListingDetailView, ListingSummaryView, MediaView};
use crate::accounts::{AccountDirectory, AccountId, DirectoryError};
use crate::catalog::{Catalog, OfferKind};

/// Service composing the intake guard, catalog, repository, and account
/// directory behind the HTTP surface.
pub struct ListingService<R, D> {
    guard: ListingGuard,
    catalog: Arc<Catalog>,
    repository: Arc<R>,
    directory: Arc<D>,
    media_policy: MediaPolicy,
    page_size: u32,
}

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static MEDIA_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("lst-{id:06}"))
}

fn next_media_id() -> MediaId {
    let id = MEDIA_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MediaId(format!("med-{id:06}"))
}

impl<R, D> ListingService<R, D>
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    pub fn new(catalog: Arc<Catalog>, repository: Arc<R>, directory: Arc<D>) -> Self {
        Self::with_limits(
            catalog,
            repository,
            directory,
            MediaPolicy::default(),
            PageRequest::DEFAULT_PER_PAGE,
        )
    }

    pub fn with_limits(
        catalog: Arc<Catalog>,
        repository: Arc<R>,
        directory: Arc<D>,
        media_policy: MediaPolicy,
        page_size: u32,
    ) -> Self {
        Self {
            guard: ListingGuard::new(catalog.clone()),
            catalog,
            repository,
            directory,
            media_policy,
            page_size: page_size.max(1),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validate and persist a draft, including its subproject tree, in one
    /// atomic repository write.
    pub fn create(&self, draft: ListingDraft) -> Result<ListingDetailView, ServiceError> {
        let owner = self.require_owner(&draft.owner)?;

        let mut tree = self.guard.validate(draft)?;
        self.check_parent_link(&tree.parent.parent_id, None)?;

        tree.parent.id = next_listing_id();
        for sub in &mut tree.subprojects {
            sub.id = next_listing_id();
            sub.parent_id = Some(tree.parent.id.clone());
        }

        let subproject_count = tree.subprojects.len();
        let stored = self
            .repository
            .insert_tree(tree.parent, tree.subprojects)?;

        info!(listing = %stored.id, subprojects = subproject_count, "listing created");
        self.detail_view(&stored, &owner)
    }

    /// Re-validate and persist changes to an existing listing. Status, media,
    /// listed-on date, and the subproject tree are preserved as stored.
    pub fn update(
        &self,
        id: &ListingId,
        draft: ListingDraft,
    ) -> Result<ListingDetailView, ServiceError> {
        let existing = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !draft.subprojects.is_empty() {
            return Err(ServiceError::SubprojectsImmutable);
        }
        let owner = self.require_owner(&draft.owner)?;

        let tree = self.guard.validate(draft)?;
        if tree.parent.parent_id.as_ref() == Some(id) {
            return Err(ServiceError::ParentCycle);
        }
        self.check_parent_link(&tree.parent.parent_id, Some(id))?;

        let mut updated = tree.parent;
        updated.id = existing.id.clone();
        updated.status = existing.status;
        updated.listed_on = existing.listed_on;
        updated.media = existing.media;

        self.repository.update(updated.clone())?;
        info!(listing = %updated.id, "listing updated");
        self.detail_view(&updated, &owner)
    }

    /// Show-page payload with parent and subproject relations loaded.
    pub fn get(&self, id: &ListingId) -> Result<ListingDetailView, ServiceError> {
        let listing = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let owner = self.owner_name(&listing.owner)?;
        self.detail_view(&listing, &owner)
    }

    /// First page of active listings, newest ids first.
    pub fn browse(&self, page: Option<u32>) -> Result<Page<ListingSummaryView>, ServiceError> {
        self.search_page(ListingSearchQuery::default(), page)
    }

    /// Filtered search over active listings.
    pub fn search(
        &self,
        query: ListingSearchQuery,
    ) -> Result<Page<ListingSummaryView>, ServiceError> {
        let page = query.page;
        self.search_page(query, page)
    }

    fn search_page(
        &self,
        query: ListingSearchQuery,
        page: Option<u32>,
    ) -> Result<Page<ListingSummaryView>, ServiceError> {
        let request = PageRequest::new(page.unwrap_or(1), self.page_size);
        let results = self.repository.search(&query, request)?;
        debug!(
            total = results.total,
            page = results.page,
            "listing search executed"
        );

        let mut summaries = Vec::with_capacity(results.items.len());
        for listing in &results.items {
            let owner = self.owner_name(&listing.owner)?;
            summaries.push(views::summary(listing, &self.catalog, &owner));
        }
        Ok(Page {
            items: summaries,
            page: results.page,
            per_page: results.per_page,
            total: results.total,
        })
    }

    /// Active project listings for parent pickers.
    pub fn projects(&self) -> Result<Vec<ListingSummaryView>, ServiceError> {
        let projects = self.repository.projects()?;
        let mut summaries = Vec::with_capacity(projects.len());
        for listing in &projects {
            let owner = self.owner_name(&listing.owner)?;
            summaries.push(views::summary(listing, &self.catalog, &owner));
        }
        Ok(summaries)
    }

    /// Soft delete: the row stays fetchable by id but leaves browse/search.
    pub fn end(&self, id: &ListingId) -> Result<(), ServiceError> {
        let mut listing = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        listing.status = ListingStatus::Ended;
        self.repository.update(listing)?;
        info!(listing = %id, "listing ended");
        Ok(())
    }

    /// Validate declared attachments and append them after existing media.
    pub fn attach_media(
        &self,
        id: &ListingId,
        drafts: Vec<MediaDraft>,
    ) -> Result<Vec<MediaView>, ServiceError> {
        let mut listing = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        for draft in &drafts {
            self.media_policy.validate(draft)?;
        }

        let mut next_order = listing
            .media
            .iter()
            .map(|item| item.order + 1)
            .max()
            .unwrap_or(0);
        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let item = MediaItem {
                id: next_media_id(),
                storage_key: draft.storage_key,
                content_type: draft.content_type,
                bytes: draft.bytes,
                kind: draft.kind,
                order: next_order,
            };
            next_order += 1;
            added.push(MediaView {
                id: item.id.clone(),
                path: item.storage_key.clone(),
                kind: item.kind,
                order: item.order,
            });
            listing.media.push(item);
        }

        self.repository.update(listing)?;
        info!(listing = %id, added = added.len(), "media attached");
        Ok(added)
    }

    pub fn remove_media(&self, id: &ListingId, media_id: &MediaId) -> Result<(), ServiceError> {
        let mut listing = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let before = listing.media.len();
        listing.media.retain(|item| item.id != *media_id);
        if listing.media.len() == before {
            return Err(ServiceError::Repository(RepositoryError::NotFound));
        }

        self.repository.update(listing)?;
        Ok(())
    }

    fn require_owner(&self, id: &AccountId) -> Result<String, ServiceError> {
        let profile = self
            .directory
            .fetch(id)?
            .ok_or_else(|| ServiceError::UnknownOwner(id.clone()))?;
        Ok(profile.display_name)
    }

    fn owner_name(&self, id: &AccountId) -> Result<String, ServiceError> {
        Ok(self
            .directory
            .fetch(id)?
            .map(|profile| profile.display_name)
            .unwrap_or_else(|| "unknown".to_string()))
    }

    /// A declared parent must exist and itself be a project listing.
    fn check_parent_link(
        &self,
        parent_id: &Option<ListingId>,
        updating: Option<&ListingId>,
    ) -> Result<(), ServiceError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if updating == Some(parent_id) {
            return Err(ServiceError::ParentCycle);
        }
        let parent = self
            .repository
            .fetch(parent_id)?
            .ok_or_else(|| ServiceError::ParentNotFound(parent_id.clone()))?;
        if parent.offer_kind != OfferKind::Project {
            return Err(ServiceError::ParentNotProject(parent_id.clone()));
        }
        Ok(())
    }

    fn detail_view(
        &self,
        listing: &Listing,
        owner: &str,
    ) -> Result<ListingDetailView, ServiceError> {
        let parent = match &listing.parent_id {
            Some(parent_id) => self
                .repository
                .fetch(parent_id)?
                .map(|parent| {
                    let name = self.owner_name(&parent.owner)?;
                    Ok::<_, ServiceError>(views::summary(&parent, &self.catalog, &name))
                })
                .transpose()?,
            None => None,
        };

        let children = self.repository.children(&listing.id)?;
        let mut subprojects = Vec::with_capacity(children.len());
        for child in &children {
            let name = self.owner_name(&child.owner)?;
            subprojects.push(views::summary(child, &self.catalog, &name));
        }

        Ok(views::detail(
            listing,
            &self.catalog,
            owner,
            parent,
            subprojects,
        ))
    }
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Media(#[from] MediaViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("listing owner '{0}' is not registered")]
    UnknownOwner(AccountId),
    #[error("parent listing '{0}' not found")]
    ParentNotFound(ListingId),
    #[error("parent listing '{0}' is not a project")]
    ParentNotProject(ListingId),
    #[error("a listing cannot be its own parent")]
    ParentCycle,
    #[error("subprojects cannot be modified through update")]
    SubprojectsImmutable,
}
