//! quakefind - locate the catalog event nearest a target time and place.
//!
//! A client library for the USGS ComCat fdsnws event service plus the
//! nearest-event ranking used by the `quakefind` binary. The flow is:
//! build a [`query::Query`], fetch candidates with [`client::ComcatClient`],
//! rank them with [`nearest::rank_events`], and present the result with
//! [`output::Presenter`].

pub mod cli;
pub mod client;
pub mod errors;
pub mod models;
pub mod nearest;
pub mod output;
pub mod query;
