//! Core of the homewatch camera-event viewer: timestamp codec, time-bucket
//! indexing, paged retrieval with its loading state machine, and the detail
//! selection cursor the presentation layer drills down with.

pub mod camera;
pub mod config;
pub mod fetch;
pub mod index;
pub mod logging;
pub mod media;
pub mod select;
pub mod timecode;
