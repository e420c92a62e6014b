//! The categorization rule book: a declarative table deciding, for every
//! (offer kind, property type) pairing, whether the pairing is admitted,
//! which rule bucket it falls into, and what that bucket demands of the
//! physical-detail fields and the parent reference.

use serde::{Deserialize, Serialize};

use super::{OfferKind, PropertyCategory, PropertyType};

/// Property-type names treated as bare land.
pub const TERRAIN_TYPES: [&str; 2] = ["urban_land", "agricultural_land"];

/// Property-type names rentable as temporary-accommodation rooms.
pub const ROOM_TYPES: [&str; 3] = ["shared_bathroom_room", "private_room", "student_room"];

/// Every admitted pairing maps to exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleBucket {
    Terrain,
    Habitable,
    AccommodationRoom,
    Project,
}

impl RuleBucket {
    pub const ALL: [RuleBucket; 4] = [
        RuleBucket::Terrain,
        RuleBucket::Habitable,
        RuleBucket::AccommodationRoom,
        RuleBucket::Project,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RuleBucket::Terrain => "terrain",
            RuleBucket::Habitable => "habitable",
            RuleBucket::AccommodationRoom => "accommodation_room",
            RuleBucket::Project => "project",
        }
    }

    /// The field policy attached to this bucket.
    pub const fn field_policy(self) -> FieldPolicy {
        match self {
            RuleBucket::Terrain => FieldPolicy {
                land_area: FieldRule::Required,
                built_area: FieldRule::Forbidden,
                bedrooms: FieldRule::Forbidden,
                bathrooms: FieldRule::Forbidden,
                floors: FieldRule::Forbidden,
                parking_spaces: FieldRule::Forbidden,
            },
            RuleBucket::Habitable => FieldPolicy {
                land_area: FieldRule::Optional,
                built_area: FieldRule::Required,
                bedrooms: FieldRule::Optional,
                bathrooms: FieldRule::Optional,
                floors: FieldRule::Optional,
                parking_spaces: FieldRule::Optional,
            },
            // Rooms may omit built area; projects carry no physical fields of
            // their own until subunits exist.
            RuleBucket::AccommodationRoom | RuleBucket::Project => FieldPolicy {
                land_area: FieldRule::Optional,
                built_area: FieldRule::Optional,
                bedrooms: FieldRule::Optional,
                bathrooms: FieldRule::Optional,
                floors: FieldRule::Optional,
                parking_spaces: FieldRule::Optional,
            },
        }
    }
}

/// Per-field stance of a bucket. Forbidden fields are cleared at intake
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Optional,
    Forbidden,
}

/// Stance of a bucket over each physical-detail column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub land_area: FieldRule,
    pub built_area: FieldRule,
    pub bedrooms: FieldRule,
    pub bathrooms: FieldRule,
    pub floors: FieldRule,
    pub parking_spaces: FieldRule,
}

/// How an offer kind admits property types.
#[derive(Debug, Clone, Copy)]
enum Admission {
    Category(PropertyCategory),
    Names(&'static [&'static str]),
}

/// One row of the pairing table.
struct PairingRow {
    offer: OfferKind,
    admits: Admission,
}

const PAIRING_TABLE: [PairingRow; 4] = [
    PairingRow {
        offer: OfferKind::Sale,
        admits: Admission::Category(PropertyCategory::Property),
    },
    PairingRow {
        offer: OfferKind::Rent,
        admits: Admission::Category(PropertyCategory::Property),
    },
    PairingRow {
        offer: OfferKind::Project,
        admits: Admission::Category(PropertyCategory::Project),
    },
    PairingRow {
        offer: OfferKind::TemporaryAccommodation,
        admits: Admission::Names(&ROOM_TYPES),
    },
];

/// Rejected pairings, naming both sides of the mismatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PairingViolation {
    #[error("offer 'project' admits only project property types, got '{property_type}'")]
    ProjectTypeRequired { property_type: String },
    #[error("offer '{offer}' admits only non-project property types, got '{property_type}'")]
    PropertyTypeRequired {
        offer: OfferKind,
        property_type: String,
    },
    #[error("temporary accommodation admits only room types, got '{property_type}'")]
    RoomTypeRequired { property_type: String },
}

/// Classify a pairing. Total: every pair yields either its bucket or a
/// violation naming the mismatch.
pub fn classify(
    offer: OfferKind,
    property_type: &PropertyType,
) -> Result<RuleBucket, PairingViolation> {
    let row = PAIRING_TABLE
        .iter()
        .find(|row| row.offer == offer)
        .expect("pairing table covers every offer kind");

    match row.admits {
        Admission::Category(category) if property_type.category != category => {
            return Err(match offer {
                OfferKind::Project => PairingViolation::ProjectTypeRequired {
                    property_type: property_type.name.clone(),
                },
                _ => PairingViolation::PropertyTypeRequired {
                    offer,
                    property_type: property_type.name.clone(),
                },
            });
        }
        Admission::Names(names) if !names.contains(&property_type.name.as_str()) => {
            return Err(PairingViolation::RoomTypeRequired {
                property_type: property_type.name.clone(),
            });
        }
        _ => {}
    }

    Ok(match offer {
        OfferKind::Project => RuleBucket::Project,
        OfferKind::TemporaryAccommodation => RuleBucket::AccommodationRoom,
        OfferKind::Sale | OfferKind::Rent => {
            if TERRAIN_TYPES.contains(&property_type.name.as_str()) {
                RuleBucket::Terrain
            } else {
                RuleBucket::Habitable
            }
        }
    })
}

/// Only project offers may hang under a parent project.
pub const fn parent_allowed(offer: OfferKind) -> bool {
    matches!(offer, OfferKind::Project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn every_pairing_maps_to_one_bucket_or_one_violation() {
        let catalog = Catalog::standard();
        for offer in OfferKind::ALL {
            for property_type in catalog.property_types() {
                let outcome = classify(offer, property_type);
                match outcome {
                    Ok(bucket) => assert!(RuleBucket::ALL.contains(&bucket)),
                    Err(violation) => {
                        // Violations must re-occur deterministically.
                        assert_eq!(classify(offer, property_type), Err(violation));
                    }
                }
            }
        }
    }

    #[test]
    fn sale_and_rent_split_terrain_from_habitable() {
        let catalog = Catalog::standard();
        let land = catalog.property_type_by_name("agricultural_land").unwrap();
        let house = catalog.property_type_by_name("house").unwrap();
        let room = catalog.property_type_by_name("private_room").unwrap();

        for offer in [OfferKind::Sale, OfferKind::Rent] {
            assert_eq!(classify(offer, land), Ok(RuleBucket::Terrain));
            assert_eq!(classify(offer, house), Ok(RuleBucket::Habitable));
            // Rooms are category property, so a plain sale/rent of one is
            // admitted and treated as habitable.
            assert_eq!(classify(offer, room), Ok(RuleBucket::Habitable));
        }
    }

    #[test]
    fn project_offers_reject_non_project_types() {
        let catalog = Catalog::standard();
        let house = catalog.property_type_by_name("house").unwrap();
        let condo = catalog.property_type_by_name("condo_project").unwrap();

        assert_eq!(classify(OfferKind::Project, condo), Ok(RuleBucket::Project));
        assert_eq!(
            classify(OfferKind::Project, house),
            Err(PairingViolation::ProjectTypeRequired {
                property_type: "house".to_string()
            })
        );
        assert_eq!(
            classify(OfferKind::Sale, condo),
            Err(PairingViolation::PropertyTypeRequired {
                offer: OfferKind::Sale,
                property_type: "condo_project".to_string()
            })
        );
    }

    #[test]
    fn temporary_accommodation_admits_only_rooms() {
        let catalog = Catalog::standard();
        let room = catalog.property_type_by_name("student_room").unwrap();
        let house = catalog.property_type_by_name("house").unwrap();

        assert_eq!(
            classify(OfferKind::TemporaryAccommodation, room),
            Ok(RuleBucket::AccommodationRoom)
        );
        assert_eq!(
            classify(OfferKind::TemporaryAccommodation, house),
            Err(PairingViolation::RoomTypeRequired {
                property_type: "house".to_string()
            })
        );
    }

    #[test]
    fn terrain_policy_forbids_building_fields() {
        let policy = RuleBucket::Terrain.field_policy();
        assert_eq!(policy.land_area, FieldRule::Required);
        assert_eq!(policy.built_area, FieldRule::Forbidden);
        assert_eq!(policy.bedrooms, FieldRule::Forbidden);
        assert_eq!(policy.parking_spaces, FieldRule::Forbidden);

        let policy = RuleBucket::Habitable.field_policy();
        assert_eq!(policy.built_area, FieldRule::Required);
        assert_eq!(policy.land_area, FieldRule::Optional);

        let policy = RuleBucket::AccommodationRoom.field_policy();
        assert_eq!(policy.built_area, FieldRule::Optional);
    }

    #[test]
    fn only_project_offers_take_parents() {
        assert!(parent_allowed(OfferKind::Project));
        assert!(!parent_allowed(OfferKind::Sale));
        assert!(!parent_allowed(OfferKind::Rent));
        assert!(!parent_allowed(OfferKind::TemporaryAccommodation));
    }
}
