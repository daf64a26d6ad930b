//! Relationship type: a resource-relation-subject triple.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::caveat::{Caveat, CaveatValue};
use super::filter::{RelationshipFilter, SubjectFilter};
use crate::Error;

/// A relationship: a fact stating a subject holds a relation to a resource,
/// optionally gated by a caveat.
///
/// Relationships are immutable values. They are constructed by the caller
/// (from a compact triple string, or from two typed [`ObjectRef`]
/// endpoints) and consumed once per API call.
///
/// ## Triple notation
///
/// The compact string form is `"type:id#relation"` for the resource half
/// and `"type:id"` (or `"type:id#relation"` for subject sets) for the
/// subject half:
///
/// ```rust
/// use relish::Relationship;
///
/// // "user:alice is a viewer of document:readme"
/// let rel = Relationship::from_triple("document:readme", "viewer", "user:alice")?;
/// assert_eq!(rel.resource_type(), "document");
/// assert_eq!(rel.resource_relation(), "viewer");
/// assert_eq!(rel.subject_id(), "alice");
///
/// // subject sets carry their own relation
/// let rel = Relationship::from_tuple("folder:reports#viewer", "team:eng#member")?;
/// assert_eq!(rel.subject_relation(), Some("member"));
/// # Ok::<(), relish::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Resource type (e.g. "document").
    resource_type: String,

    /// Resource identifier.
    resource_id: String,

    /// Relation (or permission) on the resource.
    resource_relation: String,

    /// Subject type (e.g. "user").
    subject_type: String,

    /// Subject identifier.
    subject_id: String,

    /// Optional relation making the subject a subject set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_relation: Option<String>,

    /// Optional caveat gating this relationship.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caveat: Option<Caveat>,
}

impl Relationship {
    /// Parses a relationship from a resource, a relation, and a subject.
    ///
    /// Equivalent to [`from_tuple`](Relationship::from_tuple) with the
    /// resource and relation joined by `#`.
    ///
    /// # Errors
    ///
    /// [`InvalidResource`](crate::ErrorKind::InvalidResource) if the
    /// resource half has no `:`, [`InvalidRelation`](crate::ErrorKind::InvalidRelation)
    /// if the relation is empty, [`InvalidSubject`](crate::ErrorKind::InvalidSubject)
    /// if the subject half has no `:`.
    pub fn from_triple(resource: &str, relation: &str, subject: &str) -> Result<Self, Error> {
        Self::from_tuple(&format!("{}#{}", resource, relation), subject)
    }

    /// Parses a relationship from `"type:id#relation"` and `"type:id"`
    /// (optionally `"type:id#relation"`) halves.
    pub fn from_tuple(resource: &str, subject: &str) -> Result<Self, Error> {
        let (resource, resource_relation) = resource
            .split_once('#')
            .ok_or_else(|| Error::invalid_relation("missing resource relation"))?;
        if resource_relation.is_empty() {
            return Err(Error::invalid_relation("empty resource relation"));
        }

        let (resource_type, resource_id) = resource
            .split_once(':')
            .ok_or_else(|| Error::invalid_resource("missing resource id"))?;
        if resource_type.is_empty() || resource_id.is_empty() {
            return Err(Error::invalid_resource("empty resource type or id"));
        }

        // The subject relation is optional.
        let (subject, subject_relation) = match subject.split_once('#') {
            Some((s, rel)) if !rel.is_empty() => (s, Some(rel.to_owned())),
            Some((s, _)) => (s, None),
            None => (subject, None),
        };

        let (subject_type, subject_id) = subject
            .split_once(':')
            .ok_or_else(|| Error::invalid_subject("missing subject id"))?;
        if subject_type.is_empty() || subject_id.is_empty() {
            return Err(Error::invalid_subject("empty subject type or id"));
        }

        Ok(Self {
            resource_type: resource_type.to_owned(),
            resource_id: resource_id.to_owned(),
            resource_relation: resource_relation.to_owned(),
            subject_type: subject_type.to_owned(),
            subject_id: subject_id.to_owned(),
            subject_relation,
            caveat: None,
        })
    }

    /// Builds a relationship from two typed object endpoints.
    ///
    /// The resource object must carry a relation; the subject object's
    /// relation (if any) becomes the subject relation.
    pub fn from_objects(
        resource: &impl AsObject,
        subject: &impl AsObject,
    ) -> Result<Self, Error> {
        let resource = resource.as_object();
        let subject = subject.as_object();

        let resource_relation = resource
            .relation
            .filter(|r| !r.is_empty())
            .ok_or_else(|| Error::invalid_relation("resource object carries no relation"))?;

        Ok(Self {
            resource_type: resource.object_type,
            resource_id: resource.object_id,
            resource_relation,
            subject_type: subject.object_type,
            subject_id: subject.object_id,
            subject_relation: subject.relation.filter(|r| !r.is_empty()),
            caveat: None,
        })
    }

    /// Returns the resource type.
    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the resource identifier.
    #[inline]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Returns the relation on the resource.
    #[inline]
    pub fn resource_relation(&self) -> &str {
        &self.resource_relation
    }

    /// Returns the subject type.
    #[inline]
    pub fn subject_type(&self) -> &str {
        &self.subject_type
    }

    /// Returns the subject identifier.
    #[inline]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Returns the subject relation if the subject is a subject set.
    #[inline]
    pub fn subject_relation(&self) -> Option<&str> {
        self.subject_relation.as_deref()
    }

    /// Returns the relation interpreted as a permission for checks.
    #[inline]
    pub fn permission(&self) -> &str {
        &self.resource_relation
    }

    /// Returns the caveat gating this relationship, if any.
    #[inline]
    pub fn caveat(&self) -> Option<&Caveat> {
        self.caveat.as_ref()
    }

    /// Returns `true` if this relationship carries a caveat.
    #[inline]
    pub fn has_caveat(&self) -> bool {
        self.caveat.is_some()
    }

    /// Returns a new relationship gated by the given caveat.
    ///
    /// An empty name carries no caveat and is ignored. Pure: `self` is
    /// left unchanged.
    pub fn with_caveat(
        &self,
        name: impl Into<String>,
        context: impl IntoIterator<Item = (String, CaveatValue)>,
    ) -> Relationship {
        let name = name.into();
        if name.is_empty() {
            return self.clone();
        }
        Relationship {
            caveat: Some(Caveat::new(name, context)),
            ..self.clone()
        }
    }

    /// Returns a filter matching exactly this relationship.
    ///
    /// Useful to build a delete-by-self precondition.
    pub fn to_filter(&self) -> RelationshipFilter {
        let mut subject = SubjectFilter::new(&self.subject_type).subject_id(&self.subject_id);
        if let Some(rel) = &self.subject_relation {
            subject = subject.relation(rel);
        }

        RelationshipFilter::new(&self.resource_type)
            .resource_id(&self.resource_id)
            .relation(&self.resource_relation)
            .subject(subject)
    }

    /// Encodes the resource half as `"type:id#relation"`.
    pub fn object_ref(&self) -> String {
        format!(
            "{}:{}#{}",
            self.resource_type, self.resource_id, self.resource_relation
        )
    }

    /// Encodes the subject half as `"type:id"` or `"type:id#relation"`.
    pub fn subject_ref(&self) -> String {
        match &self.subject_relation {
            Some(rel) => format!("{}:{}#{}", self.subject_type, self.subject_id, rel),
            None => format!("{}:{}", self.subject_type, self.subject_id),
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.object_ref(), self.subject_ref())
    }
}

/// Anything that can produce a [`Relationship`].
///
/// Lets call sites pass either a raw relationship or a richer domain type
/// to the check and transaction APIs.
pub trait Relational {
    /// Returns the relationship this value stands for.
    fn relationship(&self) -> Relationship;
}

impl Relational for Relationship {
    fn relationship(&self) -> Relationship {
        self.clone()
    }
}

impl<T: Relational + ?Sized> Relational for &T {
    fn relationship(&self) -> Relationship {
        (**self).relationship()
    }
}

/// A typed reference to one endpoint of a relationship.
///
/// ```rust
/// use relish::{ObjectRef, Relationship};
///
/// let doc = ObjectRef::new("document", "readme").with_relation("viewer");
/// let alice = ObjectRef::new("user", "alice");
/// let rel = Relationship::from_objects(&doc, &alice)?;
/// assert_eq!(rel.to_string(), "document:readme#viewer@user:alice");
/// # Ok::<(), relish::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object type (e.g. "document").
    pub object_type: String,

    /// Object identifier.
    pub object_id: String,

    /// Optional relation on the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl ObjectRef {
    /// Creates an object reference without a relation.
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
            relation: None,
        }
    }

    /// Returns a copy carrying the given relation.
    #[must_use]
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)?;
        if let Some(rel) = &self.relation {
            write!(f, "#{}", rel)?;
        }
        Ok(())
    }
}

/// Anything that can produce an [`ObjectRef`].
///
/// Implement this on domain types (users, documents, teams) to use them
/// directly as relationship endpoints.
pub trait AsObject {
    /// Returns the object reference this value stands for.
    fn as_object(&self) -> ObjectRef;
}

impl AsObject for ObjectRef {
    fn as_object(&self) -> ObjectRef {
        self.clone()
    }
}

impl<T: AsObject + ?Sized> AsObject for &T {
    fn as_object(&self) -> ObjectRef {
        (**self).as_object()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_from_triple() {
        let rel = Relationship::from_triple("document:readme", "viewer", "user:alice").unwrap();
        assert_eq!(rel.resource_type(), "document");
        assert_eq!(rel.resource_id(), "readme");
        assert_eq!(rel.resource_relation(), "viewer");
        assert_eq!(rel.subject_type(), "user");
        assert_eq!(rel.subject_id(), "alice");
        assert_eq!(rel.subject_relation(), None);
        assert!(!rel.has_caveat());
    }

    #[test]
    fn test_from_tuple_subject_set() {
        let rel = Relationship::from_tuple("folder:reports#viewer", "team:eng#member").unwrap();
        assert_eq!(rel.subject_type(), "team");
        assert_eq!(rel.subject_id(), "eng");
        assert_eq!(rel.subject_relation(), Some("member"));
    }

    #[test_case("", "viewer", "user:x", ErrorKind::InvalidResource; "empty resource")]
    #[test_case("documentx", "viewer", "user:x", ErrorKind::InvalidResource; "resource missing colon")]
    #[test_case("document:x", "", "user:x", ErrorKind::InvalidRelation; "empty relation")]
    #[test_case("document:x", "viewer", "", ErrorKind::InvalidSubject; "empty subject")]
    #[test_case("document:x", "viewer", "userx", ErrorKind::InvalidSubject; "subject missing colon")]
    fn test_from_triple_invalid(resource: &str, relation: &str, subject: &str, kind: ErrorKind) {
        let err = Relationship::from_triple(resource, relation, subject).unwrap_err();
        assert_eq!(err.kind(), kind);
    }

    #[test]
    fn test_from_tuple_missing_hash() {
        let err = Relationship::from_tuple("document:x", "user:y").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRelation);
    }

    #[test]
    fn test_encode_round_trip() {
        let rel = Relationship::from_tuple("document:readme#viewer", "team:eng#member").unwrap();
        assert_eq!(rel.object_ref(), "document:readme#viewer");
        assert_eq!(rel.subject_ref(), "team:eng#member");

        let reparsed = Relationship::from_tuple(&rel.object_ref(), &rel.subject_ref()).unwrap();
        assert_eq!(rel, reparsed);
    }

    #[test]
    fn test_with_caveat_is_pure() {
        let rel = Relationship::from_triple("document:x", "viewer", "user:alice").unwrap();
        let caveated = rel.with_caveat(
            "only_on_tuesdays",
            [("day".to_string(), CaveatValue::from("tuesday"))],
        );

        assert!(!rel.has_caveat());
        assert!(caveated.has_caveat());
        assert_eq!(caveated.caveat().map(Caveat::name), Some("only_on_tuesdays"));

        // All other fields are identical.
        assert_eq!(rel.object_ref(), caveated.object_ref());
        assert_eq!(rel.subject_ref(), caveated.subject_ref());
    }

    #[test]
    fn test_with_caveat_empty_name_is_ignored() {
        let rel = Relationship::from_triple("document:x", "viewer", "user:alice").unwrap();
        let unchanged = rel.with_caveat("", [("day".to_string(), CaveatValue::from("tuesday"))]);

        assert!(!unchanged.has_caveat());
        assert_eq!(unchanged, rel);
    }

    #[test]
    fn test_to_filter_matches_self() {
        let rel = Relationship::from_tuple("document:x#viewer", "team:eng#member").unwrap();
        assert!(rel.to_filter().matches(&rel));

        let other = Relationship::from_triple("document:x", "viewer", "user:bob").unwrap();
        assert!(!rel.to_filter().matches(&other));
    }

    #[test]
    fn test_from_objects() {
        let doc = ObjectRef::new("document", "readme").with_relation("viewer");
        let alice = ObjectRef::new("user", "alice");
        let rel = Relationship::from_objects(&doc, &alice).unwrap();
        assert_eq!(rel.to_string(), "document:readme#viewer@user:alice");
    }

    #[test]
    fn test_from_objects_requires_resource_relation() {
        let doc = ObjectRef::new("document", "readme");
        let alice = ObjectRef::new("user", "alice");
        let err = Relationship::from_objects(&doc, &alice).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRelation);
    }

    #[test]
    fn test_relational_for_refs() {
        fn takes_relational(r: impl Relational) -> Relationship {
            r.relationship()
        }

        let rel = Relationship::from_triple("document:x", "viewer", "user:alice").unwrap();
        assert_eq!(takes_relational(&rel), rel);
        assert_eq!(takes_relational(rel.clone()), rel);
    }

    #[test]
    fn test_object_ref_display() {
        assert_eq!(ObjectRef::new("user", "alice").to_string(), "user:alice");
        assert_eq!(
            ObjectRef::new("team", "eng").with_relation("member").to_string(),
            "team:eng#member"
        );
    }

    #[test]
    fn test_serialization() {
        let rel = Relationship::from_triple("document:x", "viewer", "user:alice").unwrap();
        let json = serde_json::to_string(&rel).unwrap();
        let parsed: Relationship = serde_json::from_str(&json).unwrap();
        assert_eq!(rel, parsed);
    }

    proptest! {
        #[test]
        fn prop_triple_round_trips(
            rt in "[a-z][a-z0-9_]{0,7}",
            rid in "[a-zA-Z0-9_]{1,12}",
            rel in "[a-z][a-z0-9_]{0,7}",
            st in "[a-z][a-z0-9_]{0,7}",
            sid in "[a-zA-Z0-9_]{1,12}",
        ) {
            let resource = format!("{}:{}#{}", rt, rid, rel);
            let subject = format!("{}:{}", st, sid);

            let parsed = Relationship::from_tuple(&resource, &subject).unwrap();
            prop_assert_eq!(parsed.object_ref(), resource);
            prop_assert_eq!(parsed.subject_ref(), subject);
        }
    }
}
