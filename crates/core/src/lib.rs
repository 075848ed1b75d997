//! Loomwear Core - Shared domain types and business rules.
//!
//! This crate provides the types and pure logic used across all Loomwear components:
//! - `storefront` - Public-facing apparel shop
//! - `admin` - Store administration console
//! - `cli` - Command-line tools for migrations and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The remote backend is the source of truth for every
//! entity; the types here mirror its JSON and add the rules the frontends
//! enforce locally (cart merging, order totals, form validation).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles and statuses
//! - [`cart`] - Cart lines, merge rules and subtotal
//! - [`catalog`] - Products, categories and catalog filtering
//! - [`order`] - Orders and order-total computation
//! - [`checkout`] - Checkout form validation
//! - [`user`] - Backend user accounts
//! - [`validation`] - Login, registration and profile form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod types;
pub mod user;
pub mod validation;

pub use types::*;
