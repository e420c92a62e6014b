use serde::{Deserialize, Serialize};

use super::domain::Listing;
use crate::catalog::{Catalog, OfferTypeId, PropertyTypeId};

/// Filters accepted by the search surface. All optional; an empty query is a
/// plain browse of active listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<OfferTypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyTypeId>,
    /// Case-insensitive substring match on the city column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ListingSearchQuery {
    /// Whether a listing satisfies every set filter. Status filtering is the
    /// repository's job; this only evaluates the query columns.
    pub fn matches(&self, listing: &Listing, catalog: &Catalog) -> bool {
        if let Some(offer_type) = self.offer_type {
            if catalog.offer_id(listing.offer_kind) != Some(offer_type) {
                return false;
            }
        }
        if let Some(property_type) = self.property_type {
            if listing.property_type != property_type {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let city_matches = listing
                .city
                .as_deref()
                .map(|city| city.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !city_matches {
                return false;
            }
        }
        if let Some(min) = self.min_bedrooms {
            if listing.details.bedrooms.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(min) = self.min_bathrooms {
            if listing.details.bathrooms.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price.map(|price| price < min).unwrap_or(true) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price.map(|price| price > max).unwrap_or(true) {
                return false;
            }
        }
        true
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 10;

    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    fn offset(&self) -> usize {
        ((self.page - 1) as usize).saturating_mul(self.per_page as usize)
    }
}

/// One page of results plus enough metadata to render pagination links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Slice an already-filtered, already-ordered collection into a page.
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.per_page as usize)
            .collect();
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64)
    }
}
