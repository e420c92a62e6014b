//! Lookup tables for the classifieds domain: offer kinds, property types,
//! amenities, and the rule book that constrains how they pair.

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rules::{classify, FieldPolicy, FieldRule, PairingViolation, RuleBucket};

/// Identifier wrapper for offer-type lookup rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferTypeId(pub u32);

impl fmt::Display for OfferTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for property-type lookup rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyTypeId(pub u32);

impl fmt::Display for PropertyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for amenity lookup rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AmenityId(pub u32);

impl fmt::Display for AmenityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four ways a listing can be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Sale,
    Rent,
    Project,
    TemporaryAccommodation,
}

impl OfferKind {
    pub const ALL: [OfferKind; 4] = [
        OfferKind::Sale,
        OfferKind::Rent,
        OfferKind::Project,
        OfferKind::TemporaryAccommodation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            OfferKind::Sale => "sale",
            OfferKind::Rent => "rent",
            OfferKind::Project => "project",
            OfferKind::TemporaryAccommodation => "temporary_accommodation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == value.trim())
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse grouping of property types: standalone properties vs. development
/// project subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Property,
    Project,
}

impl PropertyCategory {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyCategory::Property => "property",
            PropertyCategory::Project => "project",
        }
    }
}

/// A property-type lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: PropertyTypeId,
    pub name: String,
    pub category: PropertyCategory,
}

/// An amenity lookup row. Slugs are derived from names and stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: AmenityId,
    pub name: String,
    pub slug: String,
}

/// Lowercase ASCII slug: alphanumeric runs joined by single hyphens.
/// Non-ASCII letters are dropped rather than transliterated.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// The reference data set every deployment starts from.
#[derive(Debug, Clone)]
pub struct Catalog {
    offers: Vec<(OfferTypeId, OfferKind)>,
    property_types: Vec<PropertyType>,
    amenities: Vec<Amenity>,
}

impl Catalog {
    pub fn new(
        offers: Vec<(OfferTypeId, OfferKind)>,
        property_types: Vec<PropertyType>,
        amenities: Vec<Amenity>,
    ) -> Self {
        Self {
            offers,
            property_types,
            amenities,
        }
    }

    /// Seeded lookup tables: the four offer kinds, the standard property
    /// types (including the terrain project subtypes so project trees can
    /// contain land parcels), and the stock amenity list.
    pub fn standard() -> Self {
        let offers = OfferKind::ALL
            .into_iter()
            .enumerate()
            .map(|(index, kind)| (OfferTypeId(index as u32 + 1), kind))
            .collect();

        let property_types = [
            ("house", PropertyCategory::Property),
            ("apartment", PropertyCategory::Property),
            ("office", PropertyCategory::Property),
            ("urban_land", PropertyCategory::Property),
            ("agricultural_land", PropertyCategory::Property),
            ("shared_bathroom_room", PropertyCategory::Property),
            ("private_room", PropertyCategory::Property),
            ("student_room", PropertyCategory::Property),
            ("condo_project", PropertyCategory::Project),
            ("commercial_project", PropertyCategory::Project),
            ("residential_project", PropertyCategory::Project),
            ("urban_land_project", PropertyCategory::Project),
            ("agricultural_land_project", PropertyCategory::Project),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (name, category))| PropertyType {
            id: PropertyTypeId(index as u32 + 1),
            name: name.to_string(),
            category,
        })
        .collect();

        let amenities = [
            "Piscina",
            "Gimnasio",
            "Estacionamiento",
            "Jardín",
            "Área de juegos para niños",
            "Balcón",
        ]
        .into_iter()
        .enumerate()
        .map(|(index, name)| Amenity {
            id: AmenityId(index as u32 + 1),
            name: name.to_string(),
            slug: slugify(name),
        })
        .collect();

        Self::new(offers, property_types, amenities)
    }

    pub fn offers(&self) -> &[(OfferTypeId, OfferKind)] {
        &self.offers
    }

    pub fn offer_by_id(&self, id: OfferTypeId) -> Option<OfferKind> {
        self.offers
            .iter()
            .find(|(offer_id, _)| *offer_id == id)
            .map(|(_, kind)| *kind)
    }

    pub fn offer_id(&self, kind: OfferKind) -> Option<OfferTypeId> {
        self.offers
            .iter()
            .find(|(_, offer)| *offer == kind)
            .map(|(id, _)| *id)
    }

    pub fn property_types(&self) -> &[PropertyType] {
        &self.property_types
    }

    pub fn property_type(&self, id: PropertyTypeId) -> Option<&PropertyType> {
        self.property_types.iter().find(|pt| pt.id == id)
    }

    pub fn property_type_by_name(&self, name: &str) -> Option<&PropertyType> {
        self.property_types.iter().find(|pt| pt.name == name)
    }

    pub fn amenities(&self) -> &[Amenity] {
        &self.amenities
    }

    pub fn amenity(&self, id: AmenityId) -> Option<&Amenity> {
        self.amenities.iter().find(|amenity| amenity.id == id)
    }

    /// Property types the rule book admits for an offer kind. Drives the
    /// filtered lookup endpoint and form type pickers.
    pub fn property_types_for(&self, offer: OfferKind) -> Vec<&PropertyType> {
        self.property_types
            .iter()
            .filter(|pt| rules::classify(offer, pt).is_ok())
            .collect()
    }
}
