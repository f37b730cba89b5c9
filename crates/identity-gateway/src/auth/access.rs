//! Route-to-role access table.
//!
//! Keys are normalized identically when the table is built and when a request
//! is checked:
//!
//! - REST: uppercase verb, one space, then the route path without query string
//!   (`"POST /api/v1/groups"`).
//! - RPC: the fully qualified method path (`"/package.Service/Method"`).
//!
//! A key that is not in the table is unprotected. Health and login routes rely
//! on this, so a key mismatch fails open. Normalization is covered by tests.

use crate::domain::config::HttpConfig;
use http::Method;
use shared_types::Role;
use std::collections::HashMap;

/// Route key for a REST request. `HEAD` is keyed as `GET`, the handler that
/// serves it.
pub fn http_route_key(method: &Method, path: &str) -> String {
    let verb = if *method == Method::HEAD {
        "GET".to_string()
    } else {
        method.as_str().to_ascii_uppercase()
    };
    let path = path.split('?').next().unwrap_or_default();
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    format!("{verb} {path}")
}

/// Route key for an RPC call.
pub fn rpc_route_key(full_method: &str) -> String {
    if full_method.starts_with('/') {
        full_method.to_string()
    } else {
        format!("/{full_method}")
    }
}

/// Immutable mapping from route key to the minimum role.
#[derive(Debug, Clone, Default)]
pub struct AccessControlTable {
    rules: HashMap<String, Role>,
}

impl AccessControlTable {
    pub fn builder() -> AccessControlTableBuilder {
        AccessControlTableBuilder::default()
    }

    /// Table for the gateway's own REST surface.
    pub fn for_routes(http: &HttpConfig) -> Self {
        Self::builder().with_gateway_routes(http).build()
    }

    pub fn lookup(&self, route_key: &str) -> Option<Role> {
        self.rules.get(route_key).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Role)> {
        self.rules.iter().map(|(k, r)| (k.as_str(), *r))
    }
}

#[derive(Debug, Default)]
pub struct AccessControlTableBuilder {
    rules: HashMap<String, Role>,
}

impl AccessControlTableBuilder {
    #[must_use]
    pub fn http(mut self, method: Method, path: &str, role: Role) -> Self {
        self.rules.insert(http_route_key(&method, path), role);
        self
    }

    #[must_use]
    pub fn rpc(mut self, full_method: &str, role: Role) -> Self {
        self.rules.insert(rpc_route_key(full_method), role);
        self
    }

    /// Protected routes of the users, groups, memberships and auth resources.
    #[must_use]
    pub fn with_gateway_routes(self, http: &HttpConfig) -> Self {
        let base = http.base_path.trim_end_matches('/');
        let users = format!("{base}{}", http.users_path);
        let groups = format!("{base}{}", http.groups_path);
        let memberships = format!("{base}{}", http.memberships_path);
        let auth = format!("{base}{}", http.auth_path);

        self.http(Method::POST, &users, Role::Member)
            .http(Method::GET, &auth, Role::Member)
            .http(Method::DELETE, &auth, Role::Member)
            .http(Method::POST, &format!("{auth}/password"), Role::Member)
            .http(Method::POST, &groups, Role::Member)
            .http(Method::GET, &groups, Role::Member)
            .http(Method::DELETE, &groups, Role::Member)
            .http(Method::POST, &memberships, Role::Member)
            .http(Method::DELETE, &memberships, Role::Member)
            .entity_routes(&users, Some("groups"))
            .entity_routes(&groups, Some("users"))
            .entity_routes(&memberships, None)
    }

    fn entity_routes(self, collection: &str, nested: Option<&str>) -> Self {
        let item = format!("{collection}/:id");
        let mut builder = self
            .http(Method::GET, &item, Role::Member)
            .http(Method::PUT, &item, Role::Member)
            .http(Method::DELETE, &item, Role::Member);
        if let Some(nested) = nested {
            builder = builder
                .http(Method::GET, &format!("{collection}/search"), Role::Member)
                .http(Method::GET, &format!("{item}/{nested}"), Role::Member);
        }
        builder
    }

    pub fn build(self) -> AccessControlTable {
        AccessControlTable { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AccessControlTable {
        AccessControlTable::for_routes(&HttpConfig::default())
    }

    #[test]
    fn test_http_key_normalization() {
        assert_eq!(
            http_route_key(&Method::POST, "/api/v1/groups"),
            "POST /api/v1/groups"
        );
        assert_eq!(
            http_route_key(&Method::GET, "/api/v1/groups/?page=2"),
            "GET /api/v1/groups"
        );
        assert_eq!(http_route_key(&Method::GET, "/"), "GET /");

        assert_eq!(
            http_route_key(&Method::HEAD, "/api/v1/groups/:id"),
            "GET /api/v1/groups/:id"
        );

        let custom = Method::from_bytes(b"purge").unwrap();
        assert_eq!(http_route_key(&custom, "/x"), "PURGE /x");
    }

    #[test]
    fn test_rpc_key_normalization() {
        assert_eq!(
            rpc_route_key("/authQueryService.authQueryService/Validate"),
            "/authQueryService.authQueryService/Validate"
        );
        assert_eq!(
            rpc_route_key("authQueryService.authQueryService/Validate"),
            "/authQueryService.authQueryService/Validate"
        );
    }

    #[test]
    fn test_registered_keys_match_request_keys() {
        let table = table();
        for (method, path) in [
            (Method::POST, "/api/v1/users"),
            (Method::GET, "/api/v1/auth"),
            (Method::DELETE, "/api/v1/auth"),
            (Method::POST, "/api/v1/auth/password"),
            (Method::POST, "/api/v1/groups"),
            (Method::GET, "/api/v1/groups"),
            (Method::DELETE, "/api/v1/groups"),
            (Method::POST, "/api/v1/memberships"),
            (Method::DELETE, "/api/v1/memberships"),
            (Method::GET, "/api/v1/users/:id/groups"),
            (Method::GET, "/api/v1/groups/search"),
            (Method::PUT, "/api/v1/memberships/:id"),
        ] {
            assert_eq!(
                table.lookup(&http_route_key(&method, path)),
                Some(Role::Member),
                "{method} {path}"
            );
        }
    }

    #[test]
    fn test_public_routes_unmapped() {
        let table = table();
        assert_eq!(table.lookup("POST /api/v1/auth"), None);
        assert_eq!(table.lookup("POST /api/v1/auth/register"), None);
        assert_eq!(table.lookup("GET /health"), None);
        assert_eq!(table.lookup("GET /api/v1/users/health"), None);
        // Near misses are not normalized into a match
        assert_eq!(table.lookup("post /api/v1/groups"), None);
        assert_eq!(table.lookup("POST api/v1/groups"), None);
    }

    #[test]
    fn test_builder_extends_table() {
        let table = AccessControlTable::builder()
            .with_gateway_routes(&HttpConfig::default())
            .rpc("/groupQueryService.groupQueryService/SearchGroup", Role::Root)
            .http(Method::DELETE, "/api/v1/users/:id", Role::Root)
            .build();

        assert_eq!(
            table.lookup("/groupQueryService.groupQueryService/SearchGroup"),
            Some(Role::Root)
        );
        assert_eq!(table.lookup("DELETE /api/v1/users/:id"), Some(Role::Root));
    }

    #[test]
    fn test_custom_paths() {
        let http = HttpConfig {
            base_path: "/identity/".to_string(),
            groups_path: "/teams".to_string(),
            ..HttpConfig::default()
        };
        let table = AccessControlTable::for_routes(&http);
        assert_eq!(table.lookup("POST /identity/teams"), Some(Role::Member));
        assert_eq!(table.lookup("POST /api/v1/groups"), None);
    }
}
