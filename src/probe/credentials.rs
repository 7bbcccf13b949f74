//! Per-request basic-auth credentials.
//!
//! A `CredentialContext` is built fresh for each probe call and dropped with
//! it, so nothing registered for one target is visible to another.

use crate::config::CredentialRule;

/// A username/password pair answering for an optional realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub realm: Option<String>,
    pub username: String,
    pub password: String,
}

/// Credentials registered for a single request.
#[derive(Debug, Clone, Default)]
pub struct CredentialContext {
    entries: Vec<Credential>,
}

impl CredentialContext {
    /// Register every rule with a pattern occurring in `url`.
    pub fn for_url(rules: &[CredentialRule], url: &str) -> Self {
        let mut context = Self::default();
        for rule in rules {
            if rule.patterns.iter().any(|p| url.contains(p.as_str())) {
                context.register(Credential {
                    realm: rule.realm.clone(),
                    username: rule.username.clone(),
                    password: rule.password.clone(),
                });
            }
        }
        context
    }

    pub fn register(&mut self, credential: Credential) {
        self.entries.push(credential);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Credential for a challenge realm.
    ///
    /// An exact realm match is preferred over realm-less entries. Among equal
    /// candidates the most recently registered wins.
    pub fn lookup(&self, realm: Option<&str>) -> Option<&Credential> {
        let exact = realm.and_then(|r| {
            self.entries
                .iter()
                .rev()
                .find(|c| c.realm.as_deref() == Some(r))
        });
        exact.or_else(|| self.entries.iter().rev().find(|c| c.realm.is_none()))
    }
}

/// Realm of a `WWW-Authenticate: Basic realm="..."` challenge.
///
/// Returns `None` for non-Basic schemes; `Some(None)` for Basic without a realm.
pub fn parse_basic_challenge(header: &str) -> Option<Option<String>> {
    let header = header.trim();
    let (scheme, params) = match header.split_once(char::is_whitespace) {
        Some((scheme, params)) => (scheme, params),
        None => (header, ""),
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let realm = params.split(',').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("realm") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    });
    Some(realm)
}
