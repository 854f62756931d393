//! Integration tests for the calendar API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use mockito::Matcher;
    use tower::util::ServiceExt;

    use kindred::accounts::{Credential, find_credential, save_credential};

    use crate::test_utils::{
        authed, body_to_json, connect_calendar, seed_user, test_app, test_config,
    };

    /// Tests calendar endpoint returns 400 when no calendar is connected
    #[tokio::test]
    async fn it_returns_400_without_a_calendar() {
        let (app, db) = test_app(test_config("http://127.0.0.1:9")).await;
        let (_, token) = seed_user(&db, "owner@example.com").await;

        let response = app
            .oneshot(authed("GET", "/api/calendar", &token, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn it_lists_upcoming_events() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/calendar/v3/calendars/work%40example.com/events")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("singleEvents".into(), "true".into()),
                Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
                Matcher::UrlEncoded("maxResults".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"id": "e1", "summary": "Standup", "start": {"dateTime": "2025-01-06T09:00:00-08:00"}, "end": {"dateTime": "2025-01-06T09:15:00-08:00"}},
                    {"id": "e2", "start": {"date": "2025-01-07"}, "end": {"date": "2025-01-08"}}
                ]}"#,
            )
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        let (user, token) = seed_user(&db, "owner@example.com").await;
        connect_calendar(&db, user.id, &server.url()).await;

        let response = app
            .oneshot(authed(
                "GET",
                "/api/calendar?days_ahead=14&calendar_id=work@example.com",
                &token,
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let events = body_to_json(response.into_body()).await;
        assert_eq!(events[0]["summary"], "Standup");
        assert_eq!(events[0]["start"], "2025-01-06T09:00:00-08:00");
        assert_eq!(events[1]["summary"], "No title");
        assert_eq!(events[1]["start"], "2025-01-07");
    }

    /// An expired access token is refreshed and the new one is kept
    #[tokio::test]
    async fn it_persists_a_refreshed_credential() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.rotated", "expires_in": 3599}"#)
            .create_async()
            .await;
        let _events = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ya29.rotated")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        let (user, token) = seed_user(&db, "owner@example.com").await;
        let expired = Credential {
            access_token: String::from("ya29.expired"),
            refresh_token: Some(String::from("1//refresh")),
            token_uri: format!("{}/token", server.url()),
            client_id: String::from("test_client_id"),
            client_secret: String::from("test_client_secret"),
            scopes: vec![String::from("https://www.googleapis.com/auth/calendar")],
            expires_at: Some(0),
        };
        save_credential(&db, user.id, &expired).await.unwrap();

        let response = app
            .oneshot(authed("GET", "/api/calendar", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = find_credential(&db, user.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "ya29.rotated");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
    }

    #[tokio::test]
    async fn it_asks_to_reconnect_when_access_is_revoked() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;
        let _events = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        let (user, token) = seed_user(&db, "owner@example.com").await;
        connect_calendar(&db, user.id, &server.url()).await;

        let response = app
            .oneshot(authed("GET", "/api/calendar", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// A token revoked before its recorded expiry is refreshed and retried
    #[tokio::test]
    async fn it_recovers_from_a_rejected_access_token() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.rotated", "expires_in": 3599}"#)
            .expect(1)
            .create_async()
            .await;
        let _rejected = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ya29.test")
            .with_status(401)
            .create_async()
            .await;
        let _accepted = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ya29.rotated")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let (app, db) = test_app(test_config(&server.url())).await;
        let (user, token) = seed_user(&db, "owner@example.com").await;
        connect_calendar(&db, user.id, &server.url()).await;

        let response = app
            .oneshot(authed("GET", "/api/calendar", &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = find_credential(&db, user.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "ya29.rotated");
    }
}
