use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;
use crate::catalog::rules::RuleBucket;
use crate::catalog::{AmenityId, OfferKind, OfferTypeId, PropertyTypeId};

/// Identifier wrapper for listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for media attachments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub String);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currencies listings may be priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Pen,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Pen => "PEN",
        }
    }
}

/// Coordinates as submitted by map pickers; validated at intake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Physical-detail columns. All optional at the type level; the rule book
/// decides which are required or cleared per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalDetails {
    #[serde(default)]
    pub land_area: Option<f64>,
    #[serde(default)]
    pub built_area: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u16>,
    #[serde(default)]
    pub bathrooms: Option<u16>,
    #[serde(default)]
    pub floors: Option<u16>,
    #[serde(default)]
    pub parking_spaces: Option<u16>,
}

/// Lifecycle of a listing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Inactive,
    Ended,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Inactive => "inactive",
            ListingStatus::Ended => "ended",
        }
    }
}

/// Attachment categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Plan,
}

impl MediaKind {
    pub const fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Plan => "plan",
        }
    }
}

/// Stored media row. The blob itself lives in external storage; this is the
/// ordered metadata the listing keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub storage_key: String,
    pub content_type: String,
    pub bytes: u64,
    pub kind: MediaKind,
    pub order: u32,
}

/// Client-declared metadata for one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDraft {
    pub storage_key: String,
    pub content_type: String,
    pub bytes: u64,
    pub kind: MediaKind,
}

/// Intake payload for creating or updating a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub owner: AccountId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub currency: Currency,
    pub offer_type: OfferTypeId,
    pub property_type: PropertyTypeId,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
    #[serde(default)]
    pub details: PhysicalDetails,
    #[serde(default)]
    pub amenities: Vec<AmenityId>,
    #[serde(default)]
    pub parent_id: Option<ListingId>,
    #[serde(default)]
    pub subprojects: Vec<SubprojectDraft>,
    #[serde(default)]
    pub listed_on: Option<NaiveDate>,
}

/// Nested unit of a project draft. Location and currency are inherited from
/// the parent at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubprojectDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub property_type: PropertyTypeId,
    #[serde(default)]
    pub details: PhysicalDetails,
    #[serde(default)]
    pub amenities: Vec<AmenityId>,
}

/// A stored listing row plus its media collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner: AccountId,
    pub parent_id: Option<ListingId>,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Currency,
    pub offer_kind: OfferKind,
    pub property_type: PropertyTypeId,
    pub bucket: RuleBucket,
    pub city: Option<String>,
    pub address: Option<String>,
    pub geo: Option<GeoPoint>,
    pub details: PhysicalDetails,
    pub amenities: Vec<AmenityId>,
    pub status: ListingStatus,
    pub listed_on: NaiveDate,
    pub media: Vec<MediaItem>,
}

impl Listing {
    /// The first image by display order, if any.
    pub fn first_image(&self) -> Option<&MediaItem> {
        self.media
            .iter()
            .filter(|item| item.kind == MediaKind::Image)
            .min_by_key(|item| item.order)
    }
}
