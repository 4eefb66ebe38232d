//! Library half of folio: locale negotiation, rendering, preference
//! stores, the portfolio catalog, and the contact relay. The `folio`
//! binary wires these into the web server and CLI.

#[macro_use]
extern crate rust_i18n;

rust_i18n::i18n!("locales", fallback = "es");

pub mod animation;
pub mod api;
pub mod catalog;
pub mod config;
pub mod contact;
pub mod export;
pub mod i18n;
pub mod middleware;
pub mod relay;
pub mod render;
pub mod store;
pub mod theme;
