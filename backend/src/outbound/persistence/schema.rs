//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Countries; `name` carries a unique constraint.
    countries (id) {
        id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    /// Cities; unique over (name, country_id). Shared reference data,
    /// never deleted by this service.
    cities (id) {
        id -> Int8,
        name -> Varchar,
        country_id -> Int8,
    }
}

diesel::table! {
    /// Customer core rows; `nic_number` carries a unique constraint.
    customers (id) {
        id -> Int8,
        name -> Varchar,
        date_of_birth -> Date,
        nic_number -> Varchar,
    }
}

diesel::table! {
    /// Mobile-number set per customer; the composite key gives set
    /// semantics. Cascades on customer delete.
    customer_mobile_numbers (customer_id, mobile_number) {
        customer_id -> Int8,
        mobile_number -> Varchar,
    }
}

diesel::table! {
    /// Undirected family edges stored once as a canonical pair with
    /// first_customer_id < second_customer_id. Cascades on delete of
    /// either endpoint.
    family_links (first_customer_id, second_customer_id) {
        first_customer_id -> Int8,
        second_customer_id -> Int8,
    }
}

diesel::table! {
    /// Addresses owned by exactly one customer; `position` preserves the
    /// ordered list. Cascades on customer delete.
    addresses (id) {
        id -> Int8,
        customer_id -> Int8,
        line_one -> Varchar,
        line_two -> Nullable<Varchar>,
        city_id -> Int8,
        position -> Int4,
    }
}

diesel::joinable!(cities -> countries (country_id));
diesel::joinable!(addresses -> customers (customer_id));
diesel::joinable!(addresses -> cities (city_id));
diesel::joinable!(customer_mobile_numbers -> customers (customer_id));

diesel::allow_tables_to_appear_in_same_query!(
    addresses,
    cities,
    countries,
    customer_mobile_numbers,
    customers,
    family_links,
);
