#![doc = "webotron-core: core logic library for webotron."]

//! This crate holds the bucket setup and directory sync logic for webotron.
//! It has no cloud SDK dependency: every remote call goes through the
//! [`contract::BucketStore`] trait, implemented by the CLI crate against S3
//! and by mocks in tests.
//!
//! # Usage
//! Add this as a dependency for anything that needs to set up a website
//! bucket or push a local directory into one.

pub mod bucket;
pub mod content_type;
pub mod contract;
pub mod error;
pub mod synchronise;
pub mod walk;
