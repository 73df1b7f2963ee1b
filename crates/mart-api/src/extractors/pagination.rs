//! Page-number pagination from `?page=&limit=`

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use mart_core::PageRequest;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Page request clamped to `1..=100` items, first page by default
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination(pub PageRequest);

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self(PageRequest::new(params.page, params.limit))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(params.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let Pagination(page) = PaginationParams::default().into();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 20);
    }

    #[test]
    fn limit_is_clamped() {
        let Pagination(page) = PaginationParams {
            page: Some(0),
            limit: Some(500),
        }
        .into();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 100);
    }
}
