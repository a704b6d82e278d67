//! Crunchbase API client and authentication.
//!
//! This module provides the [`CrunchbaseClient`] for the Crunchbase v4 API,
//! along with the credential type ([`Auth`]).

mod auth;
mod crunchbase;

pub use auth::{API_KEY_HEADER, Auth};
pub use crunchbase::{CrunchbaseClient, FULL_PATH, LOOKUP_FIELD_IDS, LOOKUP_PATH, SEARCH_PATH};
