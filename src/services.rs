pub mod auth;
pub mod collection;
pub mod db;
pub mod form;
pub mod methods;
pub mod publications;
pub mod redis;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod socket;
