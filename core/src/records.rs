//! Result records returned by the rent-pricing operations.
//!
//! Each type is a static field table plus typed accessors; see
//! [`crate::record`]. Aliases name the response key where it differs from
//! the record field.

use crate::record::{record_type, FieldDefault};

record_type! {
    /// A property managed under the client's account.
    Property, PROPERTY_MODEL, "property" {
        external_property_id: String,
        name: String,
        address: String,
        city: String,
        state: String,
        zip: String,
        fax: String,
        phone: String,
        website: String,
        property_type: Symbol as "type",
        year_built: Integer,
        buildings: Integer,
        unit_count: Integer,
        longitude: Float,
        latitude: Float,
    }
}

record_type! {
    /// Pricing parameters configured for a property.
    ///
    /// Built from the service's name/value parameter list, with names
    /// symbolized (`"Post Date"` reads as `post_date`).
    PropertyParameters, PROPERTY_PARAMETERS_MODEL, "property_parameters" {
        external_property_id: String,
        post_date: Date,
        min_new_lease_term: Integer,
        max_new_lease_term: Integer,
        new_lease_term_options: Integer,
        max_move_in_days: Integer,
        min_renewal_lease_term: Integer,
        max_renewal_lease_term: Integer,
        renewal_lease_term_options: Integer,
    }
}

record_type! {
    FloorPlan, FLOOR_PLAN_MODEL, "floor_plan" {
        external_property_id: String,
        name: String,
        description: String,
        square_feet: Integer,
        unit_count: Integer,
        bedrooms: Float as "bed_rooms",
        bathrooms: Float as "bath_rooms",
    }
}

record_type! {
    /// A unit as listed by `get_units` / `get_unit`.
    Unit, UNIT_MODEL, "unit" {
        external_property_id: String,
        floor_plan_name: String,
        name: String,
        availability_status: Symbol,
        building: String,
        bedrooms: Float as "bed_rooms",
        bathrooms: Float as "bath_rooms",
        square_feet: Integer as "square_footage",
        unit_type: String,
        make_ready_date: Date,
    }
}

record_type! {
    /// An available unit, flattened out of its floor plan.
    ///
    /// Floor-plan attributes (name, rooms, size) are carried on every unit;
    /// the unit's own values win where both are present.
    AvailableUnit, AVAILABLE_UNIT_MODEL, "available_unit" {
        external_property_id: String,
        effective_date: Date,
        floor_plan_name: String,
        bedrooms: Float as "bed_rooms",
        bathrooms: Float as "bath_rooms",
        square_feet: Integer,
        building: String,
        unit_type: String,
        unit_number: String,
        features: List as "feature",
        availability_status: Symbol as "status",
        date_available: Date,
        base_market_rent: Float,
        base_concession: Float,
        base_final_rent: Float,
        best_lease_term: Integer,
        best_market_rent: Float,
        best_concession: Float,
        best_final_rent: Float,
    }
}

record_type! {
    /// Rent ranges per floor plan and unit type.
    RentSummary, RENT_SUMMARY_MODEL, "rent_summary" {
        external_property_id: String,
        effective_date: Date,
        floor_plan_name: String,
        unit_type: String,
        bedrooms: Float as "bed_rooms",
        bathrooms: Float as "bath_rooms",
        avg_square_feet: Integer,
        min_market_rent: Float,
        max_market_rent: Float,
        concession_type: String,
        min_concession: Float,
        max_concession: Float,
        min_final_rent: Float,
        max_final_rent: Float,
        floor_plan_description: String,
    }
}

record_type! {
    /// One rate for a unit, move-in date and lease term.
    LeaseTermRent, LEASE_TERM_RENT_MODEL, "lease_term_rent" {
        external_property_id: String,
        unit_number: String,
        building: String,
        move_in_date: Date,
        term_length: Integer,
        end_date: Date,
        market_rent: Float,
        final_rent: Float,
        best: Boolean = FieldDefault::Boolean(true),
    }
}

record_type! {
    /// A lease term rent that also carries its price validity window.
    LeaseTermRentPlus, LEASE_TERM_RENT_PLUS_MODEL, "lease_term_rent_plus" {
        external_property_id: String,
        unit_number: String,
        building: String,
        move_in_date: Date,
        term_length: Integer,
        end_date: Date,
        market_rent: Float,
        final_rent: Float,
        best: Boolean = FieldDefault::Boolean(true),
        price_valid_end_date: Date,
        total_concession: Float,
    }
}

record_type! {
    /// A renewal offer for a sitting resident.
    RenewalLeaseTermRent, RENEWAL_LEASE_TERM_RENT_MODEL, "renewal_lease_term_rent" {
        external_property_id: String,
        unit_number: String,
        building: String,
        start_date: Date,
        term_length: Integer,
        end_date: Date,
        market_rent: Float,
        final_rent: Float,
        current_rent: Float,
        best: Boolean = FieldDefault::Boolean(true),
    }
}

const RATE_KEY: [&str; 5] = [
    "external_property_id",
    "unit_number",
    "building",
    "move_in_date",
    "term_length",
];

impl LeaseTermRent {
    /// Stable identifier over property, unit, building, move-in date and
    /// term length. Suitable as a deduplication key.
    pub fn id(&self) -> String {
        self.0.digest(&RATE_KEY)
    }
}

impl LeaseTermRentPlus {
    /// Same key as [`LeaseTermRent::id`].
    pub fn id(&self) -> String {
        self.0.digest(&RATE_KEY)
    }
}

impl RenewalLeaseTermRent {
    /// Keyed on the renewal start date instead of a move-in date.
    pub fn id(&self) -> String {
        self.0.digest(&[
            "external_property_id",
            "unit_number",
            "building",
            "start_date",
            "term_length",
        ])
    }
}
