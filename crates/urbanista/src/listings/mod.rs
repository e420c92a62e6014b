//! Listing intake, storage seams, search, and the HTTP surface.

pub mod domain;
pub mod guard;
pub mod media;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    Currency, GeoPoint, Listing, ListingDraft, ListingId, ListingStatus, MediaDraft, MediaId,
    MediaItem, MediaKind, PhysicalDetails, SubprojectDraft,
};
pub use guard::{IntakeViolation, ListingGuard, ValidatedTree};
pub use media::{MediaPolicy, MediaViolation};
pub use repository::{ListingRepository, RepositoryError};
pub use router::listing_router;
pub use search::{ListingSearchQuery, Page, PageRequest};
pub use service::{ListingService, ServiceError};
pub use views::{
    AmenityView, ListingDetailView, ListingSummaryView, MediaView, OfferTypeView, PropertyTypeView,
};
