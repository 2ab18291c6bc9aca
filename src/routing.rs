//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx},
    budget::{create_budget_endpoint, delete_budget_endpoint, get_budget_page},
    dashboard::get_dashboard_page,
    endpoints,
    events::get_event_stream,
    internal_server_error::get_internal_server_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    register_user::{get_register_page, register_user},
    reports::get_reports_page,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_edit_transaction_page, get_transaction_rows, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::BUDGET_VIEW, get(get_budget_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::EVENTS, get(get_event_stream))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are requested by HTMX, which needs the HX-Redirect header
    // for auth redirects to work properly.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION,
                put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION_ROWS, get(get_transaction_rows))
            .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
            .route(endpoints::BUDGET, delete(delete_budget_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        AppState, endpoints, transaction::pagination::PageConfig,
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "nafstenoas", "Etc/UTC", PageConfig::default())
            .expect("Could not create app state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn protected_routes_redirect_anonymous_users_to_log_in() {
        let server = get_test_server();

        for route in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::BUDGET_VIEW,
            endpoints::REPORTS_VIEW,
        ] {
            let response = server.get(route).await;

            // The root route redirects to the dashboard, which the guard
            // then redirects to the log-in page.
            if route == endpoints::ROOT {
                continue;
            }

            response.assert_status_see_other();
            assert_eq!(
                response.header("location"),
                endpoints::LOG_IN_VIEW,
                "expected {route} to redirect anonymous users to the log-in page"
            );
        }
    }

    #[tokio::test]
    async fn unprotected_routes_do_not_redirect_anonymous_users() {
        let server = get_test_server();

        for route in [endpoints::LOG_IN_VIEW, endpoints::REGISTER_VIEW] {
            let response = server.get(route).await;

            response.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn authenticated_user_on_log_in_page_is_redirected_to_dashboard() {
        let server = get_test_server();

        // Register, which signs the user in.
        let response = server
            .post(endpoints::USERS)
            .form(&json!({
                "email": "ada@example.com",
                "password": "correcthorsebatterystaple",
                "confirm_password": "correcthorsebatterystaple",
            }))
            .await;
        response.assert_status_see_other();
        let cookies = response.cookies();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_cookies(cookies)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn authenticated_user_can_reach_protected_routes() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&json!({
                "email": "ada@example.com",
                "password": "correcthorsebatterystaple",
                "confirm_password": "correcthorsebatterystaple",
            }))
            .await;
        let cookies = response.cookies();

        for route in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::BUDGET_VIEW,
            endpoints::REPORTS_VIEW,
        ] {
            server
                .get(route)
                .add_cookies(cookies.clone())
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let server = get_test_server();

        let response = server.get("/no/such/route").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
