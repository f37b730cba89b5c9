//! # Authentication Flows
//!
//! Session verification on protected routes, login and the shared REST/RPC
//! authorization decision.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, request, Harness};
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
    use identity_gateway::auth::{AccessControlTable, AuthError, Authenticator, SessionCodec};
    use serde_json::json;
    use shared_types::queries::{methods, AuthenticateReq, AuthenticateRes, User, ValidateReq, ValidateRes};
    use shared_types::{Role, ValidationType};
    use std::sync::Arc;
    use tonic::metadata::{MetadataMap, MetadataValue};

    const SUBJECT: &str = "5f0c2d1e-8a4b-4c6d-9e2f-1a3b5c7d9e0f";

    // =========================================================================
    // SESSION VERIFICATION
    // =========================================================================

    #[tokio::test]
    async fn test_missing_token_is_refused() {
        let harness = Harness::new();
        harness.backend.accept_tokens();

        let reply = harness.call(request("GET", "/api/v1/auth", None, None)).await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body, json!({"message": "unauthorized"}));
        assert_eq!(harness.backend.calls(methods::VALIDATE), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refused() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let token = harness.expired_token(SUBJECT);

        let reply = harness
            .call(request("GET", "/api/v1/auth", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body, json!({"message": "unauthorized"}));
    }

    #[tokio::test]
    async fn test_foreign_signature_is_refused() {
        let harness = Harness::new();
        harness.backend.accept_tokens();

        let mut other = config();
        other.session.jwt_secret = "someone-else".to_string();
        let (_, token) = SessionCodec::from_config(&other.session)
            .issue(SUBJECT, true, shared_types::SessionType::User)
            .unwrap();

        let reply = harness
            .call(request("DELETE", "/api/v1/groups/5f0c2d1e-8a4b-4c6d-9e2f-1a3b5c7d9e0f", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(harness.backend.calls(methods::VALIDATE), 0);
    }

    #[tokio::test]
    async fn test_revoked_token_is_refused() {
        let harness = Harness::new();
        harness.backend.on(methods::VALIDATE, |_: ValidateReq, _| {
            Ok(ValidateRes {
                user: None,
                status: 401,
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", "/api/v1/auth", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body, json!({"message": "unauthorized"}));
        assert_eq!(harness.backend.calls(methods::VALIDATE), 1);
    }

    #[tokio::test]
    async fn test_validation_checks_presented_token() {
        let harness = Harness::new();
        let token = harness.token(SUBJECT, false);
        let expected = token.clone();
        harness.backend.on(methods::VALIDATE, move |req: ValidateReq, _| {
            let valid = req.user_id == SUBJECT
                && req.access_token == expected
                && req.validation_type == ValidationType::Token.as_i64();
            Ok(ValidateRes {
                user: None,
                status: if valid { 200 } else { 401 },
            })
        });

        let reply = harness
            .call(request("GET", "/api/v1/auth", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["status"], 200);
    }

    #[tokio::test]
    async fn test_open_routes_skip_verification() {
        let harness = Harness::new();

        let health = harness.call(request("GET", "/health", None, None)).await;
        assert_eq!(health.status, StatusCode::OK);
        assert_eq!(health.text, "OK");

        let resource = harness
            .call(request("GET", "/api/v1/users/health", None, None))
            .await;
        assert_eq!(resource.status, StatusCode::OK);

        assert_eq!(harness.backend.calls(methods::VALIDATE), 0);
    }

    #[tokio::test]
    async fn test_head_is_guarded_like_get() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let item = format!("/api/v1/groups/{SUBJECT}");

        for method in ["GET", "HEAD"] {
            let reply = harness.call(request(method, &item, None, None)).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{method} {item}");
        }

        let search = harness
            .call(request("HEAD", "/api/v1/users/search", None, None))
            .await;
        assert_eq!(search.status, StatusCode::UNAUTHORIZED);

        assert_eq!(harness.backend.calls(methods::GET_GROUP_BY_ID), 0);
        assert_eq!(harness.backend.calls(methods::SEARCH_USER), 0);
        assert_eq!(harness.backend.calls(methods::VALIDATE), 0);
    }

    #[tokio::test]
    async fn test_debug_responses_carry_detail() {
        let mut config = config();
        config.http.debug_errors_response = true;
        let harness = Harness::with_config(config);

        let reply = harness
            .call(request("GET", "/api/v1/auth", Some("not-a-token"), None))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["message"], "unauthorized");
        assert!(reply.body["detail"].as_str().unwrap().contains("invalid token"));
    }

    // =========================================================================
    // LOGIN
    // =========================================================================

    #[tokio::test]
    async fn test_login_mints_session_token() {
        let harness = Harness::new();
        harness.backend.on(methods::AUTHENTICATE, |req: AuthenticateReq, _| {
            assert_eq!(req.email, "ada@example.com");
            Ok(AuthenticateRes {
                user: Some(User {
                    id: SUBJECT.to_string(),
                    email: req.email,
                    username: "ada".to_string(),
                    root: true,
                    active: true,
                    created_at: 1_700_000_000,
                    updated_at: 1_700_000_000,
                }),
                status: 200,
            })
        });

        let body = json!({"email": "ada@example.com", "password": "hunter22"});
        let reply = harness
            .call(request("POST", "/api/v1/auth", None, Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["user"]["id"], SUBJECT);

        let token = reply.header("authorization").unwrap();
        let session = harness.codec.decode(token).unwrap();
        assert_eq!(session.subject_id, SUBJECT);
        assert!(session.is_root_admin);
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials() {
        let harness = Harness::new();
        harness.backend.on(methods::AUTHENTICATE, |_: AuthenticateReq, _| {
            Ok(AuthenticateRes {
                user: None,
                status: 401,
            })
        });

        let body = json!({"email": "ada@example.com", "password": "wrong"});
        let reply = harness
            .call(request("POST", "/api/v1/auth", None, Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert!(reply.header("authorization").is_none());
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let harness = Harness::new();

        let body = json!({"email": "", "password": "hunter22"});
        let reply = harness
            .call(request("POST", "/api/v1/auth", None, Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(harness.backend.calls(methods::AUTHENTICATE), 0);
    }

    // =========================================================================
    // REST / RPC SYMMETRY
    // =========================================================================

    const CREATE_GROUP_RPC: &str = "/groupCommandService.groupCommandService/CreateGroup";

    fn root_only() -> Authenticator {
        let config = config();
        let table = AccessControlTable::builder()
            .http(Method::POST, "/api/v1/groups", Role::Root)
            .rpc(CREATE_GROUP_RPC, Role::Root)
            .build();
        Authenticator::new(
            Arc::new(table),
            Arc::new(SessionCodec::from_config(&config.session)),
        )
    }

    fn credentials(token: &str) -> (HeaderMap, MetadataMap) {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(token).unwrap());
        let mut metadata = MetadataMap::new();
        metadata.insert("authorization", MetadataValue::try_from(token).unwrap());
        (headers, metadata)
    }

    #[test]
    fn test_rest_and_rpc_agree() {
        let authenticator = root_only();
        let codec = authenticator.codec();

        let (_, member) = codec.issue(SUBJECT, false, shared_types::SessionType::User).unwrap();
        let (headers, metadata) = credentials(&member);
        assert!(matches!(
            authenticator.authorize_http(&Method::POST, "/api/v1/groups", &headers),
            Err(AuthError::PermissionDenied)
        ));
        assert!(matches!(
            authenticator.authorize_metadata(CREATE_GROUP_RPC, &metadata),
            Err(AuthError::PermissionDenied)
        ));

        let (_, root) = codec.issue(SUBJECT, true, shared_types::SessionType::User).unwrap();
        let (headers, metadata) = credentials(&root);
        let rest = authenticator
            .authorize_http(&Method::POST, "/api/v1/groups", &headers)
            .unwrap()
            .unwrap();
        let rpc = authenticator
            .authorize_metadata(CREATE_GROUP_RPC, &metadata)
            .unwrap()
            .unwrap();
        assert_eq!(rest, rpc);
    }

    #[test]
    fn test_unlisted_routes_are_open_on_both_surfaces() {
        let authenticator = root_only();
        let (headers, metadata) = (HeaderMap::new(), MetadataMap::new());

        assert!(authenticator
            .authorize_http(&Method::GET, "/api/v1/groups/search", &headers)
            .unwrap()
            .is_none());
        assert!(authenticator
            .authorize_metadata("/groupQueryService.groupQueryService/SearchGroup", &metadata)
            .unwrap()
            .is_none());
    }
}
