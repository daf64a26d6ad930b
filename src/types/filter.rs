//! Filters and preconditions for selecting sets of relationships.

use serde::{Deserialize, Serialize};

use super::relationship::Relationship;

/// Selects relationships by progressively narrowing fields.
///
/// Only the resource type is mandatory. Every other field left unset
/// places no constraint on the match.
///
/// ```rust
/// use relish::{RelationshipFilter, SubjectFilter};
///
/// // every relationship any member of team:eng holds on any document
/// let filter = RelationshipFilter::new("document")
///     .subject(SubjectFilter::new("team").subject_id("eng").relation("member"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationshipFilter {
    /// Resource type to match. Mandatory.
    resource_type: String,

    /// Exact resource id, or no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_id: Option<String>,

    /// Exact relation, or no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<String>,

    /// Constraint on the subject half, or no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<SubjectFilter>,
}

impl RelationshipFilter {
    /// Creates a filter matching every relationship on the given
    /// resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Narrows the filter to an exact resource id.
    #[must_use]
    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Narrows the filter to an exact relation.
    #[must_use]
    pub fn relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Narrows the filter on the subject half.
    #[must_use]
    pub fn subject(mut self, subject: SubjectFilter) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Returns the resource type this filter matches.
    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns `true` if the relationship satisfies every constraint of
    /// this filter.
    pub fn matches(&self, rel: &Relationship) -> bool {
        if rel.resource_type() != self.resource_type {
            return false;
        }
        if let Some(id) = &self.resource_id {
            if rel.resource_id() != id {
                return false;
            }
        }
        if let Some(relation) = &self.relation {
            if rel.resource_relation() != relation {
                return false;
            }
        }
        match &self.subject {
            Some(subject) => subject.matches(rel),
            None => true,
        }
    }
}

/// Constrains the subject half of a [`RelationshipFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectFilter {
    /// Subject type to match. Mandatory.
    subject_type: String,

    /// Exact subject id, or no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_id: Option<String>,

    /// Exact subject relation, or no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<String>,
}

impl SubjectFilter {
    /// Creates a filter matching every subject of the given type.
    pub fn new(subject_type: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
            ..Self::default()
        }
    }

    /// Narrows the filter to an exact subject id.
    #[must_use]
    pub fn subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Narrows the filter to an exact subject relation.
    #[must_use]
    pub fn relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Returns `true` if the relationship's subject satisfies every
    /// constraint of this filter.
    pub fn matches(&self, rel: &Relationship) -> bool {
        if rel.subject_type() != self.subject_type {
            return false;
        }
        if let Some(id) = &self.subject_id {
            if rel.subject_id() != id {
                return false;
            }
        }
        if let Some(relation) = &self.relation {
            if rel.subject_relation() != Some(relation.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Whether a precondition demands matches or their absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconditionOperation {
    /// The write proceeds only if at least one relationship matches.
    MustMatch,

    /// The write proceeds only if no relationship matches.
    MustNotMatch,
}

/// A guard evaluated atomically with a write or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precondition {
    /// Match or must-not-match.
    pub operation: PreconditionOperation,

    /// The relationships the guard inspects.
    pub filter: RelationshipFilter,
}

impl Precondition {
    /// Creates a guard requiring at least one match.
    pub fn must_match(filter: RelationshipFilter) -> Self {
        Self {
            operation: PreconditionOperation::MustMatch,
            filter,
        }
    }

    /// Creates a guard requiring no matches.
    pub fn must_not_match(filter: RelationshipFilter) -> Self {
        Self {
            operation: PreconditionOperation::MustNotMatch,
            filter,
        }
    }
}

/// A deletion target: the filter selecting what to delete plus the
/// guards the delete is conditioned on.
///
/// ```rust
/// use relish::{PreconditionedFilter, RelationshipFilter};
///
/// let target = PreconditionedFilter::new(
///     RelationshipFilter::new("document").resource_id("readme"),
/// )
/// .must_match(RelationshipFilter::new("document").resource_id("readme").relation("owner"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionedFilter {
    filter: RelationshipFilter,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    preconditions: Vec<Precondition>,
}

impl PreconditionedFilter {
    /// Creates an unconditioned deletion target.
    pub fn new(filter: RelationshipFilter) -> Self {
        Self {
            filter,
            preconditions: Vec::new(),
        }
    }

    /// Adds a guard requiring at least one match.
    #[must_use]
    pub fn must_match(mut self, filter: RelationshipFilter) -> Self {
        self.preconditions.push(Precondition::must_match(filter));
        self
    }

    /// Adds a guard requiring no matches.
    #[must_use]
    pub fn must_not_match(mut self, filter: RelationshipFilter) -> Self {
        self.preconditions.push(Precondition::must_not_match(filter));
        self
    }

    /// Returns the filter selecting what to delete.
    #[inline]
    pub fn filter(&self) -> &RelationshipFilter {
        &self.filter
    }

    /// Returns the guards, in the order they were added.
    #[inline]
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relationship {
        Relationship::from_tuple("document:readme#viewer", "team:eng#member")
            .expect("valid relationship")
    }

    #[test]
    fn test_type_only_filter_matches() {
        let rel = sample();
        assert!(RelationshipFilter::new("document").matches(&rel));
        assert!(!RelationshipFilter::new("folder").matches(&rel));
    }

    #[test]
    fn test_unset_fields_do_not_constrain() {
        let rel = sample();
        let filter = RelationshipFilter::new("document").relation("viewer");
        assert!(filter.matches(&rel));

        let narrower = filter.resource_id("other");
        assert!(!narrower.matches(&rel));
    }

    #[test]
    fn test_subject_filter() {
        let rel = sample();

        let by_type = RelationshipFilter::new("document").subject(SubjectFilter::new("team"));
        assert!(by_type.matches(&rel));

        let wrong_member = RelationshipFilter::new("document")
            .subject(SubjectFilter::new("team").subject_id("sales"));
        assert!(!wrong_member.matches(&rel));

        let with_relation = RelationshipFilter::new("document")
            .subject(SubjectFilter::new("team").relation("member"));
        assert!(with_relation.matches(&rel));

        // A constrained subject relation does not match a plain subject.
        let plain = Relationship::from_triple("document:readme", "viewer", "user:alice")
            .expect("valid relationship");
        let needs_relation = RelationshipFilter::new("document")
            .subject(SubjectFilter::new("user").relation("member"));
        assert!(!needs_relation.matches(&plain));
    }

    #[test]
    fn test_preconditioned_filter_builders() {
        let target = PreconditionedFilter::new(RelationshipFilter::new("document"))
            .must_match(RelationshipFilter::new("document").relation("owner"))
            .must_not_match(RelationshipFilter::new("document").relation("banned"));

        assert_eq!(target.preconditions().len(), 2);
        assert_eq!(
            target.preconditions()[0].operation,
            PreconditionOperation::MustMatch
        );
        assert_eq!(
            target.preconditions()[1].operation,
            PreconditionOperation::MustNotMatch
        );
        assert_eq!(target.filter().resource_type(), "document");
    }
}
