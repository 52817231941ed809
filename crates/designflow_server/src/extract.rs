use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON body extractor whose rejections go through `ApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);
