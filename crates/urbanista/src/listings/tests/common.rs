use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::accounts::{AccountDirectory, AccountId, AccountProfile, AccountRole, DirectoryError};
use crate::catalog::{Catalog, OfferKind, OfferTypeId, PropertyTypeId};
use crate::listings::domain::{
    Currency, GeoPoint, Listing, ListingDraft, ListingId, ListingStatus, MediaDraft, MediaKind,
    PhysicalDetails, SubprojectDraft,
};
use crate::listings::guard::ListingGuard;
use crate::listings::repository::{ListingRepository, RepositoryError};
use crate::listings::router::listing_router;
use crate::listings::search::{ListingSearchQuery, Page, PageRequest};
use crate::listings::service::ListingService;
use crate::catalog::rules::RuleBucket;

pub(super) fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::standard())
}

pub(super) fn offer_id(catalog: &Catalog, kind: OfferKind) -> OfferTypeId {
    catalog.offer_id(kind).expect("offer seeded")
}

pub(super) fn property_id(catalog: &Catalog, name: &str) -> PropertyTypeId {
    catalog
        .property_type_by_name(name)
        .expect("property type seeded")
        .id
}

pub(super) fn listed_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date")
}

pub(super) fn publisher() -> AccountId {
    AccountId("usr-1".to_string())
}

pub(super) fn house_sale_draft(catalog: &Catalog) -> ListingDraft {
    ListingDraft {
        owner: publisher(),
        title: "Casa en Surco con jardín".to_string(),
        description: Some("Tres dormitorios, dos plantas.".to_string()),
        price: Some(185_000.0),
        currency: Currency::Usd,
        offer_type: offer_id(catalog, OfferKind::Sale),
        property_type: property_id(catalog, "house"),
        city: Some("Lima".to_string()),
        address: Some("Av. Primavera 1234".to_string()),
        geo: Some(GeoPoint {
            latitude: -12.1,
            longitude: -77.0,
        }),
        details: PhysicalDetails {
            land_area: Some(220.0),
            built_area: Some(180.0),
            bedrooms: Some(3),
            bathrooms: Some(2),
            floors: Some(2),
            parking_spaces: Some(1),
        },
        amenities: vec![catalog.amenities()[0].id, catalog.amenities()[1].id],
        parent_id: None,
        subprojects: Vec::new(),
        listed_on: Some(listed_on()),
    }
}

pub(super) fn terrain_draft(catalog: &Catalog) -> ListingDraft {
    let mut draft = house_sale_draft(catalog);
    draft.title = "Terreno agrícola en Cañete".to_string();
    draft.property_type = property_id(catalog, "agricultural_land");
    draft.details = PhysicalDetails {
        land_area: Some(5_000.0),
        ..PhysicalDetails::default()
    };
    draft
}

pub(super) fn room_draft(catalog: &Catalog) -> ListingDraft {
    let mut draft = house_sale_draft(catalog);
    draft.title = "Habitación para universitarios".to_string();
    draft.offer_type = offer_id(catalog, OfferKind::TemporaryAccommodation);
    draft.property_type = property_id(catalog, "student_room");
    draft.price = Some(350.0);
    draft.currency = Currency::Pen;
    draft.details = PhysicalDetails {
        built_area: Some(14.0),
        bedrooms: Some(1),
        bathrooms: Some(1),
        ..PhysicalDetails::default()
    };
    draft
}

pub(super) fn project_draft(catalog: &Catalog) -> ListingDraft {
    let mut draft = house_sale_draft(catalog);
    draft.title = "Condominio Los Álamos".to_string();
    draft.offer_type = offer_id(catalog, OfferKind::Project);
    draft.property_type = property_id(catalog, "residential_project");
    draft.price = None;
    draft.details = PhysicalDetails::default();
    draft.subprojects = vec![
        SubprojectDraft {
            title: "Torre A - departamentos".to_string(),
            description: None,
            price: Some(95_000.0),
            property_type: property_id(catalog, "condo_project"),
            details: PhysicalDetails {
                built_area: Some(72.0),
                bedrooms: Some(2),
                bathrooms: Some(1),
                ..PhysicalDetails::default()
            },
            amenities: Vec::new(),
        },
        SubprojectDraft {
            title: "Lotes de la etapa dos".to_string(),
            description: None,
            price: Some(40_000.0),
            property_type: property_id(catalog, "urban_land_project"),
            details: PhysicalDetails {
                land_area: Some(120.0),
                ..PhysicalDetails::default()
            },
            amenities: Vec::new(),
        },
    ];
    draft
}

pub(super) fn image_drafts() -> Vec<MediaDraft> {
    vec![
        MediaDraft {
            storage_key: "listings/facade.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: 400 * 1024,
            kind: MediaKind::Image,
        },
        MediaDraft {
            storage_key: "listings/kitchen.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: 380 * 1024,
            kind: MediaKind::Image,
        },
    ]
}

/// Build a stored listing row directly, bypassing the guard, for search and
/// view tests.
pub(super) fn sample_listing(id: &str, catalog: &Catalog) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        owner: publisher(),
        parent_id: None,
        title: "Casa en Surco".to_string(),
        description: None,
        price: Some(185_000.0),
        currency: Currency::Usd,
        offer_kind: OfferKind::Sale,
        property_type: property_id(catalog, "house"),
        bucket: RuleBucket::Habitable,
        city: Some("Lima".to_string()),
        address: None,
        geo: None,
        details: PhysicalDetails {
            built_area: Some(180.0),
            bedrooms: Some(3),
            bathrooms: Some(2),
            ..PhysicalDetails::default()
        },
        amenities: Vec::new(),
        status: ListingStatus::Active,
        listed_on: listed_on(),
        media: Vec::new(),
    }
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    catalog: Arc<Catalog>,
    pub(super) rows: Arc<Mutex<BTreeMap<ListingId, Listing>>>,
}

impl MemoryRepository {
    pub(super) fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            rows: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl ListingRepository for MemoryRepository {
    fn insert_tree(
        &self,
        parent: Listing,
        subprojects: Vec<Listing>,
    ) -> Result<Listing, RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
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
        matches.reverse();
        Ok(Page::slice(matches, page))
    }
}

/// Repository that refuses every operation, for failure-path tests.
pub(super) struct UnavailableRepository;

impl ListingRepository for UnavailableRepository {
    fn insert_tree(
        &self,
        _parent: Listing,
        _subprojects: Vec<Listing>,
    ) -> Result<Listing, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _listing: Listing) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn children(&self, _id: &ListingId) -> Result<Vec<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn projects(&self) -> Result<Vec<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn search(
        &self,
        _query: &ListingSearchQuery,
        _page: PageRequest,
    ) -> Result<Page<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    accounts: Arc<Mutex<HashMap<AccountId, AccountProfile>>>,
}

impl MemoryDirectory {
    pub(super) fn seeded() -> Self {
        let directory = Self::default();
        directory.add(AccountProfile {
            id: publisher(),
            role: AccountRole::Publisher,
            display_name: "María Fernández".to_string(),
        });
        directory.add(AccountProfile {
            id: AccountId("adm-1".to_string()),
            role: AccountRole::Administrator,
            display_name: "Back Office".to_string(),
        });
        directory
    }

    pub(super) fn add(&self, profile: AccountProfile) {
        self.accounts
            .lock()
            .expect("directory mutex poisoned")
            .insert(profile.id.clone(), profile);
    }
}

impl AccountDirectory for MemoryDirectory {
    fn fetch(&self, id: &AccountId) -> Result<Option<AccountProfile>, DirectoryError> {
        let accounts = self.accounts.lock().expect("directory mutex poisoned");
        Ok(accounts.get(id).cloned())
    }
}

pub(super) fn build_service() -> (
    Arc<ListingService<MemoryRepository, MemoryDirectory>>,
    MemoryRepository,
    MemoryDirectory,
) {
    let catalog = catalog();
    let repository = MemoryRepository::new(catalog.clone());
    let directory = MemoryDirectory::seeded();
    let service = Arc::new(ListingService::new(
        catalog,
        Arc::new(repository.clone()),
        Arc::new(directory.clone()),
    ));
    (service, repository, directory)
}

pub(super) fn guard() -> ListingGuard {
    ListingGuard::new(catalog())
}

pub(super) fn router_with_service(
    service: Arc<ListingService<MemoryRepository, MemoryDirectory>>,
) -> axum::Router {
    listing_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
