use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use derive_new::new;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::database::DatabaseError;
use crate::model::ParseArticleId;
use crate::service::CountError;
use crate::Located;

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(transparent)]
    InvalidId { source: ParseArticleId },
    #[snafu(transparent)]
    Count { source: CountError },
    #[snafu(transparent)]
    Store { source: DatabaseError },
}

/// Body shape every error response carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ErrorBody {
    pub message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::Count {
                source: CountError::UnknownArticle { .. },
            } => StatusCode::NOT_FOUND,
            ApiError::Count {
                source: CountError::Store { .. },
            }
            | ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // store failures are logged in full but never leak their details out
        let message = match &self {
            ApiError::Count {
                source: CountError::Store { source },
            }
            | ApiError::Store { source } => {
                tracing::error!(
                    error = %source,
                    location = %source.location(),
                    "store failure while handling the request"
                );
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}
