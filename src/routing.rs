//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    AppState,
    dashboard::get_analysis_page,
    endpoints,
    export::export_analysis,
    home::get_home_page,
    not_found::get_404_not_found,
    template::{download_template, get_template_page},
    upload::{discard_upload, upload_ledger},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route(endpoints::ROOT, get(get_home_page))
        .route(endpoints::TEMPLATE_VIEW, get(get_template_page))
        .route(endpoints::ANALYSIS_VIEW, get(get_analysis_page))
        .route(endpoints::UPLOAD, post(upload_ledger).layer(upload_limit))
        .route(endpoints::DISCARD, post(discard_upload))
        .route(endpoints::EXPORT, get(export_analysis))
        .route(endpoints::TEMPLATE_DOWNLOAD, get(download_template))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };

    use crate::{AppConfig, AppState, endpoints, session::SESSION_COOKIE};

    use super::build_router;

    const LEDGER_CSV: &str = "Data,Descrição,Tipo,Valor\n\
        01/01/2000,Almoço,Alimentação,100.00\n\
        10/02/2000,Cinema,Lazer,70.00\n\
        15/03/2000,Faculdade,Educação,350.00\n";

    fn get_test_server(config: AppConfig) -> TestServer {
        let app = build_router(AppState::new(config));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn ledger_form() -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(LEDGER_CSV.as_bytes().to_vec())
                .file_name("gastos.csv")
                .mime_type("text/csv"),
        )
    }

    async fn upload(server: &TestServer) -> Cookie<'static> {
        let response = server.post(endpoints::UPLOAD).multipart(ledger_form()).await;

        response.assert_status_see_other();
        response.cookie(SESSION_COOKIE)
    }

    #[tokio::test]
    async fn serves_every_page() {
        let server = get_test_server(AppConfig::default());

        for endpoint in [
            endpoints::ROOT,
            endpoints::TEMPLATE_VIEW,
            endpoints::ANALYSIS_VIEW,
        ] {
            server.get(endpoint).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server(AppConfig::default());

        server
            .get("/nao-existe")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_analyse_export_and_discard() {
        let server = get_test_server(AppConfig::default());
        let session_cookie = upload(&server).await;

        let page = server
            .get(endpoints::ANALYSIS_VIEW)
            .add_cookie(session_cookie.clone())
            .await;
        page.assert_status_ok();
        let text = page.text();
        assert!(text.contains("gastos.csv"), "{text}");
        assert!(text.contains("income-gap-chart"), "{text}");

        let export = server
            .get(endpoints::EXPORT)
            .add_query_param("category", "Lazer")
            .add_cookie(session_cookie.clone())
            .await;
        export.assert_status_ok();
        assert_eq!(
            export.header("content-type"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(!export.as_bytes().is_empty());

        server
            .post(endpoints::DISCARD)
            .add_cookie(session_cookie.clone())
            .await
            .assert_status_see_other();

        server
            .get(endpoints::EXPORT)
            .add_cookie(session_cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sessions_do_not_share_uploads() {
        let server = get_test_server(AppConfig::default());
        upload(&server).await;

        server
            .get(endpoints::EXPORT)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_upload_over_size_limit() {
        let server = get_test_server(AppConfig {
            max_upload_bytes: 64,
            ..AppConfig::default()
        });

        let response = server.post(endpoints::UPLOAD).multipart(ledger_form()).await;

        assert!(
            response.status_code().is_client_error(),
            "got status {}",
            response.status_code()
        );
        assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
    }

    #[tokio::test]
    async fn template_download_is_a_workbook() {
        let server = get_test_server(AppConfig::default());

        let response = server.get(endpoints::TEMPLATE_DOWNLOAD).await;

        response.assert_status_ok();
        assert!(
            response
                .header("content-disposition")
                .to_str()
                .unwrap()
                .contains("planilha-de-gastos.xlsx")
        );
    }
}
