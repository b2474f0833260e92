//! Validated newtypes for request inputs and server-held credentials
//!
//! Secrets get hand-written `Debug` impls so they never end up in logs
//! through `?` formatting.

use nutype::nutype;
use std::collections::HashSet;
use std::fmt;

/// Steam application id as accepted by the public download endpoint
/// and the metadata lookup: ASCII digits only.
#[nutype(
    validate(not_empty, regex = r"^[0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct NumericAppId(String);

/// Application id as accepted by the private endpoint. Only presence is checked.
#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct AppId(String);

/// Opaque proof-of-humanity token issued by the challenge widget
#[nutype(validate(not_empty), derive(Clone, AsRef))]
pub struct VerificationToken(String);

impl fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationToken(..)")
    }
}

/// Shared secret sent alongside tokens to the verification service
#[nutype(sanitize(trim), validate(not_empty), derive(Clone, AsRef))]
pub struct VerificationSecret(String);

impl fmt::Debug for VerificationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationSecret(..)")
    }
}

/// Credential appended to every upstream generator URL
#[nutype(sanitize(trim), validate(not_empty), derive(Clone, AsRef))]
pub struct UpstreamAuthCode(String);

impl fmt::Debug for UpstreamAuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamAuthCode(..)")
    }
}

/// One entry of the private-key allow-list, trimmed at load time
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(Clone, PartialEq, Eq, Hash, AsRef)
)]
pub struct PrivateKey(String);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Absolute http(s) URL of an external service
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, AsRef)
)]
pub struct EndpointUrl(String);

/// Allow-list of pre-shared keys for the private endpoint.
///
/// Entries are validated as [`PrivateKey`]s when parsed, so they are trimmed
/// and blank entries are dropped. Lookups are exact and case-sensitive: a
/// presented key is never trimmed.
#[derive(Clone, Default)]
pub struct PrivateKeySet(HashSet<String>);

impl PrivateKeySet {
    /// Parse a comma-separated key list
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .filter_map(|entry| PrivateKey::try_new(entry.to_string()).ok())
                .map(PrivateKey::into_inner)
                .collect(),
        )
    }

    pub fn contains(&self, presented: &str) -> bool {
        self.0.contains(presented)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PrivateKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeySet")
            .field("len", &self.0.len())
            .finish()
    }
}
