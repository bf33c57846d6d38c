//! Firestore-backed subscription store for Skywarn
//!
//! This crate persists one subscription document per user in a Firestore
//! collection, using the Firestore REST API with service account
//! authentication. It implements the `SubscriptionStore` abstraction so the
//! registration logic can be tested without any network dependency.

pub mod auth;
pub mod client;
pub mod store;

pub use client::{FirestoreClient, FirestoreError};
pub use store::FirestoreSubscriptionStore;
