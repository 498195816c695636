//! Identifier sets: fids, handles or blockchain addresses.
//!
//! A request names accounts with exactly one kind of identifier. The set
//! serializes as the bare JSON array the upstream API expects.

use serde::Serialize;

use crate::error::ValidationError;

/// The kind of identifier a list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Fids,
    Handles,
    Addresses,
}

impl IdKind {
    /// Path segment and request field name (`fids`, `handles`, `addresses`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fids => "fids",
            Self::Handles => "handles",
            Self::Addresses => "addresses",
        }
    }
}

/// A non-empty list of identifiers of a single kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IdentifierSet {
    Fids(Vec<u64>),
    Handles(Vec<String>),
    Addresses(Vec<String>),
}

impl IdentifierSet {
    pub fn kind(&self) -> IdKind {
        match self {
            Self::Fids(_) => IdKind::Fids,
            Self::Handles(_) => IdKind::Handles,
            Self::Addresses(_) => IdKind::Addresses,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fids(ids) => ids.len(),
            Self::Handles(ids) | Self::Addresses(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a set from an already-deserialized list, rejecting an empty or absent one.
    ///
    /// `field` names the list in the error message; it is not always the
    /// kind itself (`/metadata/handles` takes addresses but reports `handles`).
    pub fn from_strings(
        kind: IdKind,
        field: &'static str,
        ids: Option<Vec<String>>,
    ) -> Result<Self, ValidationError> {
        let ids = ids
            .filter(|ids| !ids.is_empty())
            .ok_or(ValidationError::Missing { field })?;
        Ok(match kind {
            IdKind::Handles => Self::Handles(ids),
            IdKind::Addresses => Self::Addresses(ids),
            IdKind::Fids => Self::Fids(parse_fids(&ids)?),
        })
    }

    /// Build a fid set, rejecting an empty or absent list.
    pub fn from_fids(field: &'static str, ids: Option<Vec<u64>>) -> Result<Self, ValidationError> {
        ids.filter(|ids| !ids.is_empty())
            .map(Self::Fids)
            .ok_or(ValidationError::Missing { field })
    }

    /// Parse a raw JSON request body holding a bare identifier array.
    ///
    /// An empty body, `null` or `[]` is reported as a missing `field`.
    pub fn parse_body(kind: IdKind, field: &'static str, body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::Missing { field });
        }
        match kind {
            IdKind::Fids => Self::from_fids(field, serde_json::from_slice(body)?),
            IdKind::Handles | IdKind::Addresses => {
                Self::from_strings(kind, field, serde_json::from_slice(body)?)
            }
        }
    }
}

fn parse_fids(ids: &[String]) -> Result<Vec<u64>, ValidationError> {
    ids.iter()
        .map(|id| {
            id.trim()
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidInteger { field: "fids" })
        })
        .collect()
}

/// Pick the identifier set for a direct-links query.
///
/// Exactly one of `handles` or `fids` must be non-empty.
pub fn resolve_direct_links(
    handles: Option<Vec<String>>,
    fids: Option<Vec<u64>>,
) -> Result<IdentifierSet, ValidationError> {
    let handles = handles.filter(|h| !h.is_empty());
    let fids = fids.filter(|f| !f.is_empty());
    match (handles, fids) {
        (Some(_), Some(_)) => Err(ValidationError::Ambiguous),
        (Some(handles), None) => Ok(IdentifierSet::Handles(handles)),
        (None, Some(fids)) => Ok(IdentifierSet::Fids(fids)),
        (None, None) => Err(ValidationError::NoIdentifiers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_array() {
        let fids = IdentifierSet::Fids(vec![1, 2, 3]);
        assert_eq!(serde_json::to_string(&fids).unwrap(), "[1,2,3]");

        let handles = IdentifierSet::Handles(vec!["dwr.eth".into(), "v".into()]);
        assert_eq!(serde_json::to_string(&handles).unwrap(), r#"["dwr.eth","v"]"#);
    }

    #[test]
    fn parse_body_rejects_empty_inputs() {
        for body in [&b""[..], b"  ", b"null", b"[]"] {
            let err = IdentifierSet::parse_body(IdKind::Handles, "handles", body).unwrap_err();
            assert_eq!(err, ValidationError::Missing { field: "handles" });
        }
    }

    #[test]
    fn parse_body_fids() {
        let set = IdentifierSet::parse_body(IdKind::Fids, "fids", b"[3, 5]").unwrap();
        assert_eq!(set, IdentifierSet::Fids(vec![3, 5]));
        assert_eq!(set.kind(), IdKind::Fids);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parse_body_wrong_element_type() {
        let err = IdentifierSet::parse_body(IdKind::Fids, "fids", br#"["abc"]"#).unwrap_err();
        assert!(matches!(err, ValidationError::Body(_)));
    }

    #[test]
    fn parse_body_object_is_rejected() {
        let err =
            IdentifierSet::parse_body(IdKind::Addresses, "addresses", br#"{"a":1}"#).unwrap_err();
        assert!(matches!(err, ValidationError::Body(_)));
    }

    #[test]
    fn from_strings_parses_fids() {
        let set =
            IdentifierSet::from_strings(IdKind::Fids, "fids", Some(vec!["2".into(), " 3".into()]))
                .unwrap();
        assert_eq!(set, IdentifierSet::Fids(vec![2, 3]));

        let err = IdentifierSet::from_strings(IdKind::Fids, "fids", Some(vec!["x".into()]))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidInteger { field: "fids" });
    }

    #[test]
    fn direct_links_both_kinds_is_ambiguous() {
        let err = resolve_direct_links(Some(vec!["a".into()]), Some(vec![1])).unwrap_err();
        assert_eq!(err, ValidationError::Ambiguous);
    }

    #[test]
    fn direct_links_single_kind() {
        assert_eq!(
            resolve_direct_links(Some(vec!["a".into()]), Some(vec![])),
            Ok(IdentifierSet::Handles(vec!["a".into()]))
        );
        assert_eq!(
            resolve_direct_links(None, Some(vec![7])),
            Ok(IdentifierSet::Fids(vec![7]))
        );
    }

    #[test]
    fn direct_links_none() {
        assert_eq!(
            resolve_direct_links(Some(vec![]), None),
            Err(ValidationError::NoIdentifiers)
        );
    }
}
