#![allow(dead_code)]
use utoipa::OpenApi;

use crate::handlers::{ErrorResponse, RegisterRequest, RegisterResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::register_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "FCM", description = "FCM registration and topic reconciliation")
    )
)]
pub struct RegistrationApiDoc;
