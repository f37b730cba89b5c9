//! # Query Flows
//!
//! Reads forwarded to the query backend through the logging and retry
//! interceptors, with the inbound trace carried on every call.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, request, Harness};
    use axum::http::StatusCode;
    use shared_types::queries::{
        methods, GetGroupByIdReq, GetGroupByIdRes, GetUserByIdReq, GetUserByIdRes,
        GetUserMembershipReq, GetUserMembershipRes, Group, SearchReq, SearchRes, User,
    };
    use tonic::Status;

    const SUBJECT: &str = "7a1d4e2b-3c5f-4e6a-8b9c-0d1e2f3a4b5c";
    const GROUP: &str = "c3d2e1f0-a9b8-4c7d-8e6f-5a4b3c2d1e0f";
    const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn group(id: &str) -> Group {
        Group {
            id: id.to_string(),
            name: "ops".to_string(),
            description: "operators".to_string(),
            creator_id: SUBJECT.to_string(),
            active: true,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_100,
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            root: false,
            active: true,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    // =========================================================================
    // RETRY
    // =========================================================================

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_GROUP_BY_ID, |req: GetGroupByIdReq, attempt| {
            if attempt < 3 {
                return Err(Status::aborted("conflict"));
            }
            Ok(GetGroupByIdRes {
                group: Some(group(&req.id)),
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/groups/{GROUP}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["id"], GROUP);
        assert_eq!(reply.body["creatorID"], SUBJECT);
        assert_eq!(reply.body["createdAt"], "2023-11-14T22:13:20Z");
        assert_eq!(harness.backend.calls(methods::GET_GROUP_BY_ID), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_GROUP_BY_ID, |_: GetGroupByIdReq, _| {
            Err::<GetGroupByIdRes, _>(Status::aborted("conflict"))
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/groups/{GROUP}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(harness.backend.calls(methods::GET_GROUP_BY_ID), 3);
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_retried() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_BY_ID, |_: GetUserByIdReq, _| {
            Err::<GetUserByIdRes, _>(Status::not_found("no such user"))
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.body.get("detail").is_none());
        assert_eq!(harness.backend.calls(methods::GET_USER_BY_ID), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_found() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_BY_ID, |_: GetUserByIdReq, _| {
            Ok(GetUserByIdRes { user: None })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["message"], "user not found");
    }

    #[tokio::test]
    async fn test_default_policy_retries_not_found() {
        let mut config = config();
        config.retry.retry_codes = vec!["NotFound".to_string(), "Aborted".to_string()];
        let harness = Harness::with_config(config);
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_BY_ID, |req: GetUserByIdReq, attempt| {
            if attempt == 1 {
                return Err(Status::not_found("not yet projected"));
            }
            Ok(GetUserByIdRes {
                user: Some(user(&req.id)),
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["username"], "ada");
        assert_eq!(harness.backend.calls(methods::GET_USER_BY_ID), 2);
    }

    // =========================================================================
    // TRACE PROPAGATION
    // =========================================================================

    #[tokio::test]
    async fn test_inbound_trace_reaches_backend() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_BY_ID, |req: GetUserByIdReq, _| {
            Ok(GetUserByIdRes {
                user: Some(user(&req.id)),
            })
        });
        let token = harness.token(SUBJECT, false);

        let mut req = request("GET", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None);
        req.headers_mut()
            .insert("traceparent", TRACEPARENT.parse().unwrap());
        let reply = harness.call(req).await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(harness.backend.trace_ids(methods::VALIDATE), vec![TRACE_ID]);
        assert_eq!(harness.backend.trace_ids(methods::GET_USER_BY_ID), vec![TRACE_ID]);
        assert!(reply.header("traceparent").unwrap().contains(TRACE_ID));
    }

    #[tokio::test]
    async fn test_requests_without_trace_get_one() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_BY_ID, |req: GetUserByIdReq, _| {
            Ok(GetUserByIdRes {
                user: Some(user(&req.id)),
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None))
            .await;

        let traceparent = reply.header("traceparent").unwrap();
        let trace_id = traceparent.split('-').nth(1).unwrap();
        assert_eq!(harness.backend.trace_ids(methods::GET_USER_BY_ID), vec![trace_id]);
    }

    // =========================================================================
    // MARSHALING
    // =========================================================================

    #[tokio::test]
    async fn test_search_clamps_page_size() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::SEARCH_USER, |req: SearchReq, _| {
            Ok(SearchRes {
                total_count: 1,
                total_pages: 1,
                page: req.page,
                size: req.size,
                has_more: false,
                users: vec![user(SUBJECT)],
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request(
                "GET",
                "/api/v1/users/search?search=ada&page=abc&size=500",
                Some(&token),
                None,
            ))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["page"], 1);
        assert_eq!(reply.body["size"], 100);
        assert_eq!(reply.body["totalCount"], 1);
        assert_eq!(reply.body["users"][0]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_group_members_are_listed() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.backend.on(methods::GET_USER_MEMBERSHIP, |req: GetUserMembershipReq, _| {
            assert_eq!(req.group_id, GROUP);
            Ok(GetUserMembershipRes {
                total_count: 0,
                total_pages: 0,
                page: req.page,
                size: req.size,
                has_more: false,
                user_memberships: Vec::new(),
            })
        });
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/groups/{GROUP}/users"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["size"], 10);
        assert_eq!(harness.backend.calls(methods::GET_USER_MEMBERSHIP), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_backend() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", "/api/v1/users/not-a-uuid", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(harness.backend.calls(methods::GET_USER_BY_ID), 0);
    }

    #[tokio::test]
    async fn test_unimplemented_backend_method() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("GET", &format!("/api/v1/memberships/{GROUP}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::NOT_IMPLEMENTED);
    }
}
