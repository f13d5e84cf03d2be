//! Academic task tracker: REST server plus the client core it serves.
//!
//! The binary runs the API (`api`, `auth`, `db`, `config`). The library
//! additionally carries the client side: the owned task store with its
//! optimistic sync policy (`store`, `client`, `cache`) and the pure view
//! derivation (`filter`), sharing one data model (`models`).

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod db;
pub mod filter;
pub mod models;
pub mod store;
