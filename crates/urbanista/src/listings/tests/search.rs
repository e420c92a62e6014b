use super::common::*;
use crate::catalog::OfferKind;
use crate::listings::domain::PhysicalDetails;
use crate::listings::search::{ListingSearchQuery, Page, PageRequest};

#[test]
fn page_slicing_reports_totals() {
    let items: Vec<u32> = (1..=23).collect();
    let page = Page::slice(items.clone(), PageRequest::new(3, 10));

    assert_eq!(page.items, vec![21, 22, 23]);
    assert_eq!(page.page, 3);
    assert_eq!(page.per_page, 10);
    assert_eq!(page.total, 23);
    assert_eq!(page.total_pages(), 3);

    let beyond = Page::slice(items, PageRequest::new(9, 10));
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 23);
}

#[test]
fn page_requests_clamp_to_one() {
    let request = PageRequest::new(0, 0);
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 1);
}

#[test]
fn keyword_matches_city_case_insensitively() {
    let catalog = catalog();
    let listing = sample_listing("lst-000001", &catalog);

    let query = ListingSearchQuery {
        keyword: Some("LIMA".to_string()),
        ..ListingSearchQuery::default()
    };
    assert!(query.matches(&listing, &catalog));

    let query = ListingSearchQuery {
        keyword: Some("cusco".to_string()),
        ..ListingSearchQuery::default()
    };
    assert!(!query.matches(&listing, &catalog));

    let mut no_city = sample_listing("lst-000002", &catalog);
    no_city.city = None;
    let query = ListingSearchQuery {
        keyword: Some("lima".to_string()),
        ..ListingSearchQuery::default()
    };
    assert!(!query.matches(&no_city, &catalog));
}

#[test]
fn detail_filters_compare_against_minimums() {
    let catalog = catalog();
    let mut listing = sample_listing("lst-000001", &catalog);
    listing.details = PhysicalDetails {
        bedrooms: Some(3),
        bathrooms: Some(2),
        ..PhysicalDetails::default()
    };

    let query = ListingSearchQuery {
        min_bedrooms: Some(3),
        min_bathrooms: Some(2),
        ..ListingSearchQuery::default()
    };
    assert!(query.matches(&listing, &catalog));

    let query = ListingSearchQuery {
        min_bedrooms: Some(4),
        ..ListingSearchQuery::default()
    };
    assert!(!query.matches(&listing, &catalog));
}

#[test]
fn price_bounds_exclude_unpriced_listings() {
    let catalog = catalog();
    let mut listing = sample_listing("lst-000001", &catalog);

    let query = ListingSearchQuery {
        min_price: Some(100_000.0),
        max_price: Some(200_000.0),
        ..ListingSearchQuery::default()
    };
    assert!(query.matches(&listing, &catalog));

    listing.price = None;
    assert!(!query.matches(&listing, &catalog));
}

#[test]
fn offer_and_property_filters_use_catalog_ids() {
    let catalog = catalog();
    let listing = sample_listing("lst-000001", &catalog);

    let query = ListingSearchQuery {
        offer_type: catalog.offer_id(OfferKind::Sale),
        property_type: Some(property_id(&catalog, "house")),
        ..ListingSearchQuery::default()
    };
    assert!(query.matches(&listing, &catalog));

    let query = ListingSearchQuery {
        offer_type: catalog.offer_id(OfferKind::Rent),
        ..ListingSearchQuery::default()
    };
    assert!(!query.matches(&listing, &catalog));
}

#[test]
fn browse_pages_respect_configured_size() {
    let (service, _, _) = build_service();

    for index in 0..12 {
        let mut draft = house_sale_draft(service.catalog());
        draft.title = format!("Casa {index} en Surco");
        service.create(draft).expect("created");
    }

    let first = service.browse(None).expect("first page");
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.total_pages(), 2);

    let second = service.browse(Some(2)).expect("second page");
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.page, 2);
}
