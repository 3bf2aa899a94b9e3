//! Extractors that reject with the JSON error envelope

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// `Json` body whose rejections become `400 {"error": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` parameters whose rejections become `400 {"error": ...}`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` parameters whose rejections become `400 {"error": ...}`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
