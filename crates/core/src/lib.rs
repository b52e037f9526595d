//! Shopfront Core - Shared types and catalog logic.
//!
//! This crate provides the domain model used across all Shopfront components:
//! - `storefront` - Public-facing shop
//! - `admin` - Internal administration console
//! - `cli` - Command-line tools for inspecting the sample catalog
//!
//! # Architecture
//!
//! The core crate contains types and pure functions only - no HTTP, no
//! sessions, no async runtime. The one exception is [`fixtures`], which can
//! read the YAML sample data from a directory on disk.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`catalog`] - Products, categories, brands and the in-memory [`Catalog`]
//! - [`query`] - The product query pipeline (filter, sort, paginate, adapt)
//! - [`cart`] - Shopping cart
//! - [`checkout`] - Checkout state machine and orders
//! - [`admin`] - Admin users, permissions and activity records
//! - [`fixtures`] - Sample data loading

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod query;
pub mod types;

pub use catalog::{Brand, Catalog, Category, Product, Variant};
pub use types::*;
