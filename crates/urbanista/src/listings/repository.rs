use super::domain::{Listing, ListingId};
use super::search::{ListingSearchQuery, Page, PageRequest};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `insert_tree` is the one transactional write in the system: the parent,
/// every subproject, and their media rows are stored together or not at all.
pub trait ListingRepository: Send + Sync {
    fn insert_tree(
        &self,
        parent: Listing,
        subprojects: Vec<Listing>,
    ) -> Result<Listing, RepositoryError>;
    fn update(&self, listing: Listing) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
    /// Direct children of a listing, ordered by id.
    fn children(&self, id: &ListingId) -> Result<Vec<Listing>, RepositoryError>;
    /// Active project-offer listings, for parent pickers.
    fn projects(&self) -> Result<Vec<Listing>, RepositoryError>;
    /// Active listings matching the query, paginated.
    fn search(
        &self,
        query: &ListingSearchQuery,
        page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
