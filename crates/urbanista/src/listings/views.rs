use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    Currency, GeoPoint, Listing, ListingId, ListingStatus, MediaId, MediaKind, PhysicalDetails,
};
use crate::catalog::rules::RuleBucket;
use crate::catalog::{Catalog, OfferTypeId, PropertyCategory, PropertyTypeId};

/// Shown when a listing has no image media yet.
pub const DEFAULT_IMAGE_PATH: &str = "/images/default-listing.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferTypeView {
    pub id: OfferTypeId,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyTypeView {
    pub id: PropertyTypeId,
    pub name: String,
    pub category: PropertyCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmenityView {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaView {
    pub id: MediaId,
    pub path: String,
    pub kind: MediaKind,
    pub order: u32,
}

/// Card-sized projection used by browse and search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSummaryView {
    pub id: ListingId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub first_image: String,
    pub offer_type: OfferTypeView,
    pub property_type: PropertyTypeView,
    pub owner: String,
}

/// Full projection for the show page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetailView {
    pub id: ListingId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: Currency,
    pub status: ListingStatus,
    pub bucket: RuleBucket,
    pub offer_type: OfferTypeView,
    pub property_type: PropertyTypeView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    pub details: PhysicalDetails,
    pub listed_on: NaiveDate,
    pub amenities: Vec<AmenityView>,
    pub media: Vec<MediaView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ListingSummaryView>,
    pub subprojects: Vec<ListingSummaryView>,
    pub owner: String,
}

fn offer_view(listing: &Listing, catalog: &Catalog) -> OfferTypeView {
    let id = catalog
        .offer_id(listing.offer_kind)
        .expect("offer kind resolved against this catalog at intake");
    OfferTypeView {
        id,
        name: listing.offer_kind.label(),
    }
}

fn property_view(listing: &Listing, catalog: &Catalog) -> PropertyTypeView {
    let property_type = catalog
        .property_type(listing.property_type)
        .expect("property type resolved against this catalog at intake");
    PropertyTypeView {
        id: property_type.id,
        name: property_type.name.clone(),
        category: property_type.category,
    }
}

fn amenity_views(listing: &Listing, catalog: &Catalog) -> Vec<AmenityView> {
    listing
        .amenities
        .iter()
        .filter_map(|id| catalog.amenity(*id))
        .map(|amenity| AmenityView {
            name: amenity.name.clone(),
            slug: amenity.slug.clone(),
        })
        .collect()
}

fn media_views(listing: &Listing) -> Vec<MediaView> {
    let mut media: Vec<_> = listing
        .media
        .iter()
        .map(|item| MediaView {
            id: item.id.clone(),
            path: item.storage_key.clone(),
            kind: item.kind,
            order: item.order,
        })
        .collect();
    media.sort_by_key(|item| item.order);
    media
}

/// Build the card projection. `owner` is the resolved display name.
pub fn summary(listing: &Listing, catalog: &Catalog, owner: &str) -> ListingSummaryView {
    ListingSummaryView {
        id: listing.id.clone(),
        title: listing.title.clone(),
        price: listing.price,
        currency: listing.currency,
        city: listing.city.clone(),
        first_image: listing
            .first_image()
            .map(|item| item.storage_key.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_PATH.to_string()),
        offer_type: offer_view(listing, catalog),
        property_type: property_view(listing, catalog),
        owner: owner.to_string(),
    }
}

/// Build the show-page projection from the listing and its loaded relations.
pub fn detail(
    listing: &Listing,
    catalog: &Catalog,
    owner: &str,
    parent: Option<ListingSummaryView>,
    subprojects: Vec<ListingSummaryView>,
) -> ListingDetailView {
    ListingDetailView {
        id: listing.id.clone(),
        title: listing.title.clone(),
        description: listing.description.clone(),
        price: listing.price,
        currency: listing.currency,
        status: listing.status,
        bucket: listing.bucket,
        offer_type: offer_view(listing, catalog),
        property_type: property_view(listing, catalog),
        city: listing.city.clone(),
        address: listing.address.clone(),
        geo: listing.geo,
        details: listing.details,
        listed_on: listing.listed_on,
        amenities: amenity_views(listing, catalog),
        media: media_views(listing),
        parent,
        subprojects,
        owner: owner.to_string(),
    }
}
