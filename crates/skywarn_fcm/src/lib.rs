//! Firebase Cloud Messaging integration for Skywarn
//!
//! This crate provides functionality to manage topic subscriptions and send
//! push notifications using the Firebase Cloud Messaging HTTP v1 API and the
//! Instance ID API.
//!
//! # Features
//!
//! - Authentication with Firebase using service account credentials
//! - Adding and removing a device token from a weather topic
//! - Sending push notifications to topics
//! - Support for notification payload (title and body)
//! - Implementation of the `TopicMessagingService` abstraction so the
//!   registration logic never talks to Firebase directly

pub mod auth;
pub mod client;
pub mod service;

pub use client::{FcmClient, FcmError};
pub use service::FcmMessagingService;
