//! The page shown for unknown routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Display the 404 page.
pub async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Página não encontrada",
            "404",
            "Página não encontrada.",
            "Verifique o endereço ou volte para a página inicial.",
        ),
    )
        .into_response()
}
