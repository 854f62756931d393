//! Integration tests for Google sign-in and sessions

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use mockito::Matcher;
    use tower::util::ServiceExt;

    use kindred::accounts::{find_credential, insert_oauth_state};

    use crate::test_utils::{authed, body_to_json, seed_user, test_app, test_config};

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn it_redirects_to_the_consent_screen() {
        let (app, _db) = test_app(test_config("https://accounts.example.test")).await;

        let response = app.oneshot(get("/api/auth/google")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://accounts.example.test/o/oauth2/v2/auth?"));
        assert!(location.contains("client_id=test_client_id"));
        assert!(location.contains("access_type=offline"));
        assert!(location.contains("&state="));
    }

    #[tokio::test]
    async fn it_rejects_an_unknown_state() {
        let (app, _db) = test_app(test_config("http://127.0.0.1:9")).await;

        let response = app
            .oneshot(get("/api/auth/google/callback?code=abc&state=forged"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_signs_in_and_stores_the_credential() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token": "ya29.new", "refresh_token": "1//refresh", "expires_in": 3599, "scope": "openid email https://www.googleapis.com/auth/calendar"}"#,
            )
            .create_async()
            .await;
        let _userinfo = server
            .mock("GET", "/v1/userinfo")
            .match_header("authorization", "Bearer ya29.new")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "alice@example.com", "email_verified": true, "name": "Alice"}"#)
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        insert_oauth_state(&db, "state-1").await.unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/auth/google/callback?code=auth-code&state=state-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["username"], "Alice");
        let user_id = body["user_id"].as_i64().unwrap();
        let session_token = body["session_token"].as_str().unwrap().to_string();

        let credential = find_credential(&db, user_id).await.unwrap().unwrap();
        assert_eq!(credential.access_token, "ya29.new");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(credential.token_uri, format!("{}/token", server.url()));

        let response = app
            .clone()
            .oneshot(authed("GET", "/api/auth/session", &session_token, None))
            .await
            .unwrap();
        let whoami = body_to_json(response.into_body()).await;
        assert_eq!(whoami["email"], "alice@example.com");
        assert_eq!(whoami["calendar_connected"], true);

        // The state can not be replayed
        let response = app
            .oneshot(get("/api/auth/google/callback?code=auth-code&state=state-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_refuses_unverified_emails() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.new", "expires_in": 3599}"#)
            .create_async()
            .await;
        let _userinfo = server
            .mock("GET", "/v1/userinfo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "mallory@example.com", "email_verified": false}"#)
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        insert_oauth_state(&db, "state-1").await.unwrap();

        let response = app
            .oneshot(get("/api/auth/google/callback?code=auth-code&state=state-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_ends_the_session_on_logout() {
        let (app, db) = test_app(test_config("http://127.0.0.1:9")).await;
        let (_, token) = seed_user(&db, "owner@example.com").await;

        let response = app
            .clone()
            .oneshot(authed("GET", "/api/auth/session", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let whoami = body_to_json(response.into_body()).await;
        assert_eq!(whoami["calendar_connected"], false);

        let response = app
            .clone()
            .oneshot(authed("POST", "/api/auth/logout", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(authed("GET", "/api/auth/session", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
