//! # Command Flows
//!
//! Writes accepted over REST must reach the bus as typed records carrying the
//! caller's trace, and must never reach it when the request is rejected.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{request, Harness};
    use axum::http::StatusCode;
    use serde_json::json;
    use shared_bus::{MessagePublisher, EVENT_TYPE_HEADER};
    use shared_types::events::{
        GroupCreate, MembershipCreate, PasswordUpdate, TokenBlacklist, UserCreate, UserDelete,
    };
    use shared_types::queries::{methods, ValidateReq, ValidateRes};
    use shared_types::{BusRecord, ValidationType};
    use tokio_test::assert_ok;
    use uuid::Uuid;

    const SUBJECT: &str = "0b7f3c1e-5d1a-4a8e-9c4e-3f1d2a6b7c8d";
    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    // =========================================================================
    // PUBLISHING
    // =========================================================================

    #[tokio::test]
    async fn test_create_group_publishes_record() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let mut groups = harness.bus.subscribe_topic("groupCreate");
        let token = harness.token(SUBJECT, false);

        let mut req = request(
            "POST",
            "/api/v1/groups",
            Some(&token),
            Some(json!({"name": "ops", "description": "operators", "active": true})),
        );
        req.headers_mut()
            .insert("traceparent", TRACEPARENT.parse().unwrap());
        let reply = harness.call(req).await;

        assert_eq!(reply.status, StatusCode::CREATED);
        let id = assert_ok!(Uuid::parse_str(reply.body["id"].as_str().unwrap()));

        let message = groups.try_recv().unwrap().unwrap();
        assert_eq!(message.key, id.to_string());
        assert_eq!(message.header(EVENT_TYPE_HEADER), Some(GroupCreate::EVENT_TYPE));
        assert!(message
            .header("traceparent")
            .unwrap()
            .contains("4bf92f3577b34da6a3ce929d0e0e4736"));

        let record: GroupCreate = message.decode().unwrap();
        assert_eq!(record.id, id.to_string());
        assert_eq!(record.creator_id, SUBJECT);
        assert_eq!(record.name, "ops");
        assert!(record.active);
    }

    #[tokio::test]
    async fn test_create_membership_publishes_enums_as_integers() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let mut memberships = harness.bus.subscribe_topic("membershipCreate");
        let token = harness.token(SUBJECT, false);
        let group = Uuid::new_v4();

        let body = json!({"userID": SUBJECT, "groupID": group, "status": 2, "role": 3});
        let reply = harness
            .call(request("POST", "/api/v1/memberships", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::CREATED);
        let record: MembershipCreate = memberships.try_recv().unwrap().unwrap().decode().unwrap();
        assert_eq!(record.user_id, SUBJECT);
        assert_eq!(record.group_id, group.to_string());
        assert_eq!(record.status, 2);
        assert_eq!(record.role, 3);
    }

    #[tokio::test]
    async fn test_delete_publishes_path_id() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let mut deletes = harness.bus.subscribe_topic("userDelete");
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("DELETE", &format!("/api/v1/users/{SUBJECT}"), Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["id"], SUBJECT);
        let record: UserDelete = deletes.try_recv().unwrap().unwrap().decode().unwrap();
        assert_eq!(record.id, SUBJECT);
    }

    #[tokio::test]
    async fn test_register_publishes_and_mints_token() {
        let harness = Harness::new();
        let mut users = harness.bus.subscribe_topic("userCreate");

        let body = json!({"email": "ada@example.com", "username": "ada", "password": "hunter22", "active": true});
        let reply = harness
            .call(request("POST", "/api/v1/auth/register", None, Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::CREATED);
        let id = reply.body["id"].as_str().unwrap().to_string();

        let session = harness
            .codec
            .decode(reply.header("authorization").unwrap())
            .unwrap();
        assert_eq!(session.subject_id, id);
        assert!(!session.is_root_admin);

        let record: UserCreate = users.try_recv().unwrap().unwrap().decode().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.email, "ada@example.com");
        assert!(!record.root);
    }

    #[tokio::test]
    async fn test_invalidate_blacklists_presented_token() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let mut blacklist = harness.bus.subscribe_topic("tokenBlacklist");
        let token = harness.token(SUBJECT, false);

        let reply = harness
            .call(request("DELETE", "/api/v1/auth", Some(&token), None))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["accessToken"], token.as_str());
        let record: TokenBlacklist = blacklist.try_recv().unwrap().unwrap().decode().unwrap();
        assert_eq!(record.access_token, token);
        assert_eq!(reply.body["id"], record.id.as_str());
    }

    // =========================================================================
    // PASSWORD CHANGE
    // =========================================================================

    fn password_backend(harness: &Harness, current: &'static str) {
        harness.backend.on(methods::VALIDATE, move |req: ValidateReq, _| {
            let valid = req.validation_type == ValidationType::Token.as_i64()
                || req.access_token == current;
            Ok(ValidateRes {
                user: None,
                status: if valid { 200 } else { 401 },
            })
        });
    }

    #[tokio::test]
    async fn test_password_change_checks_current_password() {
        let harness = Harness::new();
        password_backend(&harness, "old-pass");
        let mut updates = harness.bus.subscribe_topic("passwordUpdate");
        let token = harness.token(SUBJECT, false);

        let body = json!({"currentPassword": "old-pass", "newPassword": "new-pass"});
        let reply = harness
            .call(request("POST", "/api/v1/auth/password", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["id"], SUBJECT);
        let record: PasswordUpdate = updates.try_recv().unwrap().unwrap().decode().unwrap();
        assert_eq!(record.id, SUBJECT);
        assert_eq!(record.new_password, "new-pass");
    }

    #[tokio::test]
    async fn test_wrong_current_password_publishes_nothing() {
        let harness = Harness::new();
        password_backend(&harness, "old-pass");
        let token = harness.token(SUBJECT, false);

        let body = json!({"currentPassword": "guess", "newPassword": "new-pass"});
        let reply = harness
            .call(request("POST", "/api/v1/auth/password", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(harness.bus.messages_published(), 0);
    }

    // =========================================================================
    // REJECTED WRITES
    // =========================================================================

    #[tokio::test]
    async fn test_invalid_body_publishes_nothing() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let token = harness.token(SUBJECT, false);

        let body = json!({"email": "", "username": "ada", "password": "hunter22"});
        let reply = harness
            .call(request("POST", "/api/v1/users", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.body["message"].as_str().unwrap().contains("email"));
        assert_eq!(harness.bus.messages_published(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_role_is_rejected() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        let token = harness.token(SUBJECT, false);

        let body = json!({"userID": SUBJECT, "groupID": Uuid::new_v4(), "status": 1, "role": 9});
        let reply = harness
            .call(request("POST", "/api/v1/memberships", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, json!({"message": "invalid request body"}));
        assert_eq!(harness.bus.messages_published(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_write_publishes_nothing() {
        let harness = Harness::new();

        let body = json!({"name": "ops", "description": "operators"});
        let reply = harness
            .call(request("POST", "/api/v1/groups", None, Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(harness.bus.messages_published(), 0);
    }

    #[tokio::test]
    async fn test_closed_bus_is_unavailable() {
        let harness = Harness::new();
        harness.backend.accept_tokens();
        harness.bus.close();
        let token = harness.token(SUBJECT, false);

        let body = json!({"name": "ops", "description": "operators"});
        let reply = harness
            .call(request("POST", "/api/v1/groups", Some(&token), Some(body)))
            .await;

        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reply.body, json!({"message": "message bus unavailable"}));
    }
}
