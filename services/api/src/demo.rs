use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::infra::{InMemoryAccountDirectory, InMemoryListingRepository};
use urbanista::accounts::AccountId;
use urbanista::catalog::{rules, Catalog, OfferKind};
use urbanista::error::AppError;
use urbanista::listings::{
    Currency, GeoPoint, ListingDraft, ListingSearchQuery, ListingService, MediaDraft, MediaKind,
    PhysicalDetails, SubprojectDraft,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Listing date for the seeded rows (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) listed_on: Option<NaiveDate>,
    /// City keyword used for the search walk-through.
    #[arg(long, default_value = "Lima")]
    pub(crate) keyword: String,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Print the lookup tables and what the rule book decides for each pairing.
pub(crate) fn run_catalog() -> Result<(), AppError> {
    let catalog = Catalog::standard();

    println!("Offer kinds");
    for (id, kind) in catalog.offers() {
        println!("  {:>2}  {}", id.0, kind.label());
    }

    for (_, kind) in catalog.offers() {
        println!("\nProperty types admitted for '{}'", kind.label());
        for property_type in catalog.property_types_for(*kind) {
            let bucket = rules::classify(*kind, property_type)
                .expect("admitted pairings always classify");
            println!(
                "  {:>2}  {:<28} category={:<8} bucket={}",
                property_type.id.0,
                property_type.name,
                property_type.category.label(),
                bucket.label()
            );
        }
    }

    println!("\nAmenities");
    for amenity in catalog.amenities() {
        println!("  {:>2}  {:<32} slug={}", amenity.id.0, amenity.name, amenity.slug);
    }

    Ok(())
}

/// Seed an in-memory repository with sample rows and walk the main flows:
/// create (with a project tree), media attach, browse, and search.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let listed_on = args.listed_on.unwrap_or_else(|| Local::now().date_naive());

    let catalog = Arc::new(Catalog::standard());
    let repository = Arc::new(InMemoryListingRepository::new(catalog.clone()));
    let directory = Arc::new(InMemoryAccountDirectory::seeded());
    let service = ListingService::new(catalog.clone(), repository, directory);
    let owner = AccountId("usr-1".to_string());

    println!("Property classifieds demo (listed on {listed_on})");

    let house = service
        .create(house_draft(&catalog, &owner, listed_on))
        .map_err(AppError::from)?;
    println!("\nCreated sale listing {} ({})", house.id, house.title);

    let terrain = service
        .create(terrain_draft(&catalog, &owner, listed_on))
        .map_err(AppError::from)?;
    println!(
        "Created terrain listing {} (bucket {})",
        terrain.id,
        terrain.bucket.label()
    );

    let room = service
        .create(room_draft(&catalog, &owner, listed_on))
        .map_err(AppError::from)?;
    println!("Created accommodation listing {} ({})", room.id, room.title);

    let project = service
        .create(project_draft(&catalog, &owner, listed_on))
        .map_err(AppError::from)?;
    println!(
        "Created project {} with {} subprojects",
        project.id,
        project.subprojects.len()
    );

    let media = service
        .attach_media(
            &house.id,
            vec![
                photo("listings/demo/fachada.jpg"),
                photo("listings/demo/cocina.png"),
            ],
        )
        .map_err(AppError::from)?;
    println!("\nAttached {} photos to {}", media.len(), house.id);

    let browse = service.browse(None).map_err(AppError::from)?;
    println!(
        "\nBrowse: {} active listings ({} page(s))",
        browse.total,
        browse.total_pages()
    );
    for item in &browse.items {
        println!(
            "  {}  {:<40} {} {}",
            item.id,
            item.title,
            item.offer_type.name,
            item.price
                .map(|price| format!("{} {price:.0}", item.currency.code()))
                .unwrap_or_else(|| "consultar".to_string())
        );
    }

    let results = service
        .search(ListingSearchQuery {
            keyword: Some(args.keyword.clone()),
            ..ListingSearchQuery::default()
        })
        .map_err(AppError::from)?;
    println!(
        "\nSearch '{}': {} match(es)",
        args.keyword, results.total
    );
    for item in &results.items {
        println!(
            "  {}  {:<40} {}",
            item.id,
            item.title,
            item.city.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

fn photo(path: &str) -> MediaDraft {
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    MediaDraft {
        storage_key: path.to_string(),
        content_type,
        bytes: 600 * 1024,
        kind: MediaKind::Image,
    }
}

fn house_draft(catalog: &Catalog, owner: &AccountId, listed_on: NaiveDate) -> ListingDraft {
    ListingDraft {
        owner: owner.clone(),
        title: "Casa familiar en Surco".to_string(),
        description: Some("Tres dormitorios, jardín interior.".to_string()),
        price: Some(245_000.0),
        currency: Currency::Usd,
        offer_type: offer(catalog, OfferKind::Sale),
        property_type: property(catalog, "house"),
        city: Some("Lima".to_string()),
        address: Some("Av. Primavera 1234".to_string()),
        geo: Some(GeoPoint {
            latitude: -12.135,
            longitude: -76.982,
        }),
        details: PhysicalDetails {
            land_area: Some(210.0),
            built_area: Some(185.0),
            bedrooms: Some(3),
            bathrooms: Some(2),
            floors: Some(2),
            parking_spaces: Some(2),
        },
        amenities: vec![catalog.amenities()[3].id],
        parent_id: None,
        subprojects: Vec::new(),
        listed_on: Some(listed_on),
    }
}

fn terrain_draft(catalog: &Catalog, owner: &AccountId, listed_on: NaiveDate) -> ListingDraft {
    ListingDraft {
        owner: owner.clone(),
        title: "Terreno urbano en Trujillo".to_string(),
        description: None,
        price: Some(95_000.0),
        currency: Currency::Pen,
        offer_type: offer(catalog, OfferKind::Sale),
        property_type: property(catalog, "urban_land"),
        city: Some("Trujillo".to_string()),
        address: None,
        geo: None,
        details: PhysicalDetails {
            land_area: Some(450.0),
            ..PhysicalDetails::default()
        },
        amenities: Vec::new(),
        parent_id: None,
        subprojects: Vec::new(),
        listed_on: Some(listed_on),
    }
}

fn room_draft(catalog: &Catalog, owner: &AccountId, listed_on: NaiveDate) -> ListingDraft {
    ListingDraft {
        owner: owner.clone(),
        title: "Habitación para universitarios cerca al campus".to_string(),
        description: None,
        price: Some(480.0),
        currency: Currency::Pen,
        offer_type: offer(catalog, OfferKind::TemporaryAccommodation),
        property_type: property(catalog, "student_room"),
        city: Some("Lima".to_string()),
        address: None,
        geo: None,
        details: PhysicalDetails {
            built_area: Some(16.0),
            bedrooms: Some(1),
            bathrooms: Some(1),
            ..PhysicalDetails::default()
        },
        amenities: Vec::new(),
        parent_id: None,
        subprojects: Vec::new(),
        listed_on: Some(listed_on),
    }
}

fn project_draft(catalog: &Catalog, owner: &AccountId, listed_on: NaiveDate) -> ListingDraft {
    ListingDraft {
        owner: owner.clone(),
        title: "Condominio Parque Central".to_string(),
        description: Some("Proyecto residencial con áreas comunes.".to_string()),
        price: None,
        currency: Currency::Usd,
        offer_type: offer(catalog, OfferKind::Project),
        property_type: property(catalog, "residential_project"),
        city: Some("Lima".to_string()),
        address: Some("Jr. Los Cedros 200".to_string()),
        geo: Some(GeoPoint {
            latitude: -12.09,
            longitude: -77.05,
        }),
        details: PhysicalDetails::default(),
        amenities: vec![catalog.amenities()[0].id, catalog.amenities()[1].id],
        parent_id: None,
        subprojects: vec![
            SubprojectDraft {
                title: "Torre A".to_string(),
                description: None,
                price: Some(98_000.0),
                property_type: property(catalog, "condo_project"),
                details: PhysicalDetails {
                    built_area: Some(70.0),
                    bedrooms: Some(2),
                    bathrooms: Some(2),
                    ..PhysicalDetails::default()
                },
                amenities: Vec::new(),
            },
            SubprojectDraft {
                title: "Lotes etapa dos".to_string(),
                description: None,
                price: Some(55_000.0),
                property_type: property(catalog, "urban_land_project"),
                details: PhysicalDetails {
                    land_area: Some(120.0),
                    ..PhysicalDetails::default()
                },
                amenities: Vec::new(),
            },
        ],
        listed_on: Some(listed_on),
    }
}

fn offer(catalog: &Catalog, kind: OfferKind) -> urbanista::catalog::OfferTypeId {
    catalog.offer_id(kind).expect("standard catalog seeds all offer kinds")
}

fn property(catalog: &Catalog, name: &str) -> urbanista::catalog::PropertyTypeId {
    catalog
        .property_type_by_name(name)
        .expect("standard catalog seeds the demo property types")
        .id
}
