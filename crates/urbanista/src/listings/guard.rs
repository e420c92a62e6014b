use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::domain::{Listing, ListingDraft, ListingId, ListingStatus, PhysicalDetails};
use crate::catalog::rules::{self, FieldRule, PairingViolation, RuleBucket};
use crate::catalog::{AmenityId, Catalog, OfferKind, OfferTypeId, PropertyType, PropertyTypeId};

const MAX_TITLE_LENGTH: usize = 255;

/// Rejections raised while turning a draft into storable rows.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error(transparent)]
    Pairing(#[from] PairingViolation),
    #[error("unknown offer type id {0}")]
    UnknownOfferType(OfferTypeId),
    #[error("unknown property type id {0}")]
    UnknownPropertyType(PropertyTypeId),
    #[error("unknown amenity id {0}")]
    UnknownAmenity(AmenityId),
    #[error("title is required")]
    TitleRequired,
    #[error("title exceeds 255 characters ({length})")]
    TitleTooLong { length: usize },
    #[error("land area is required for terrain types")]
    MissingLandArea,
    #[error("built area is required for habitable properties")]
    MissingBuiltArea,
    #[error("{field} must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("coordinates out of range ({latitude}, {longitude})")]
    GeoOutOfRange { latitude: f64, longitude: f64 },
    #[error("offer '{offer}' does not take subprojects")]
    SubprojectsNotAllowed { offer: OfferKind },
    #[error("subproject {index}: {source}")]
    Subproject {
        index: usize,
        #[source]
        source: Box<IntakeViolation>,
    },
}

/// A validated parent listing plus its validated subproject rows, all still
/// carrying placeholder ids until the service mints real ones.
#[derive(Debug, Clone)]
pub struct ValidatedTree {
    pub parent: Listing,
    pub subprojects: Vec<Listing>,
}

/// Guard converting inbound drafts into rule-book-conforming listing rows.
#[derive(Debug, Clone)]
pub struct ListingGuard {
    catalog: Arc<Catalog>,
}

impl ListingGuard {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validate a draft against the catalog and rule book.
    ///
    /// Required fields missing for the classified bucket are violations;
    /// forbidden fields are cleared. A parent reference on a non-project
    /// offer is cleared as well (existence checks belong to the service,
    /// which owns repository access).
    pub fn validate(&self, draft: ListingDraft) -> Result<ValidatedTree, IntakeViolation> {
        let offer = self
            .catalog
            .offer_by_id(draft.offer_type)
            .ok_or(IntakeViolation::UnknownOfferType(draft.offer_type))?;
        let property_type = self
            .catalog
            .property_type(draft.property_type)
            .ok_or(IntakeViolation::UnknownPropertyType(draft.property_type))?;

        let bucket = rules::classify(offer, property_type)?;

        let title = check_title(&draft.title)?;
        check_non_negative("price", draft.price)?;
        if let Some(geo) = draft.geo {
            if !geo.in_range() {
                return Err(IntakeViolation::GeoOutOfRange {
                    latitude: geo.latitude,
                    longitude: geo.longitude,
                });
            }
        }

        let amenities = self.check_amenities(&draft.amenities)?;
        let details = apply_field_policy(bucket, draft.details)?;

        let parent_id = if rules::parent_allowed(offer) {
            draft.parent_id
        } else {
            None
        };

        if !draft.subprojects.is_empty() && offer != OfferKind::Project {
            return Err(IntakeViolation::SubprojectsNotAllowed { offer });
        }

        let listed_on = draft
            .listed_on
            .unwrap_or_else(|| Local::now().date_naive());

        let parent = Listing {
            id: ListingId("pending".to_string()),
            owner: draft.owner.clone(),
            parent_id,
            title,
            description: draft.description,
            price: draft.price,
            currency: draft.currency,
            offer_kind: offer,
            property_type: property_type.id,
            bucket,
            city: draft.city.clone(),
            address: draft.address.clone(),
            geo: draft.geo,
            details,
            amenities,
            status: ListingStatus::Active,
            listed_on,
            media: Vec::new(),
        };

        let mut subprojects = Vec::with_capacity(draft.subprojects.len());
        for (index, sub) in draft.subprojects.into_iter().enumerate() {
            let sub_listing = self
                .validate_subproject(&parent, sub, listed_on)
                .map_err(|source| IntakeViolation::Subproject {
                    index,
                    source: Box::new(source),
                })?;
            subprojects.push(sub_listing);
        }

        Ok(ValidatedTree {
            parent,
            subprojects,
        })
    }

    /// Subprojects always carry offer `project`, are validated against their
    /// own property type, and inherit currency and location from the parent.
    fn validate_subproject(
        &self,
        parent: &Listing,
        sub: super::domain::SubprojectDraft,
        listed_on: NaiveDate,
    ) -> Result<Listing, IntakeViolation> {
        let property_type: &PropertyType = self
            .catalog
            .property_type(sub.property_type)
            .ok_or(IntakeViolation::UnknownPropertyType(sub.property_type))?;

        let bucket = rules::classify(OfferKind::Project, property_type)?;

        let title = check_title(&sub.title)?;
        check_non_negative("price", sub.price)?;
        let amenities = self.check_amenities(&sub.amenities)?;
        let details = apply_field_policy(bucket, sub.details)?;

        Ok(Listing {
            id: ListingId("pending".to_string()),
            owner: parent.owner.clone(),
            parent_id: None,
            title,
            description: sub.description,
            price: sub.price,
            currency: parent.currency,
            offer_kind: OfferKind::Project,
            property_type: property_type.id,
            bucket,
            city: parent.city.clone(),
            address: parent.address.clone(),
            geo: parent.geo,
            details,
            amenities,
            status: ListingStatus::Active,
            listed_on,
            media: Vec::new(),
        })
    }

    fn check_amenities(&self, ids: &[AmenityId]) -> Result<Vec<AmenityId>, IntakeViolation> {
        let mut seen = Vec::with_capacity(ids.len());
        for id in ids {
            if self.catalog.amenity(*id).is_none() {
                return Err(IntakeViolation::UnknownAmenity(*id));
            }
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        Ok(seen)
    }
}

fn check_title(title: &str) -> Result<String, IntakeViolation> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(IntakeViolation::TitleRequired);
    }
    let length = trimmed.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(IntakeViolation::TitleTooLong { length });
    }
    Ok(trimmed.to_string())
}

fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), IntakeViolation> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(IntakeViolation::NegativeValue { field }),
        _ => Ok(()),
    }
}

/// Apply a bucket's field policy: error on missing Required fields, clear
/// Forbidden ones, leave Optional ones as submitted.
fn apply_field_policy(
    bucket: RuleBucket,
    mut details: PhysicalDetails,
) -> Result<PhysicalDetails, IntakeViolation> {
    check_non_negative("land_area", details.land_area)?;
    check_non_negative("built_area", details.built_area)?;

    let policy = bucket.field_policy();

    match policy.land_area {
        FieldRule::Required if details.land_area.is_none() => {
            return Err(IntakeViolation::MissingLandArea);
        }
        FieldRule::Forbidden => details.land_area = None,
        _ => {}
    }

    match policy.built_area {
        FieldRule::Required if details.built_area.is_none() => {
            return Err(IntakeViolation::MissingBuiltArea);
        }
        FieldRule::Forbidden => details.built_area = None,
        _ => {}
    }

    if policy.bedrooms == FieldRule::Forbidden {
        details.bedrooms = None;
    }
    if policy.bathrooms == FieldRule::Forbidden {
        details.bathrooms = None;
    }
    if policy.floors == FieldRule::Forbidden {
        details.floors = None;
    }
    if policy.parking_spaces == FieldRule::Forbidden {
        details.parking_spaces = None;
    }

    Ok(details)
}
