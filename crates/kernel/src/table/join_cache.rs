//! Property path resolution with a per-build join cache.
//!
//! Paths are walked one segment at a time against the static entity
//! metadata. Every relationship prefix becomes exactly one LEFT join, keyed
//! by the prefix segments, so `locations.region.code` and
//! `locations.region.name` share the `locations` and `locations.region` joins.
//! A cache lives for one query build and is never shared between requests.

use std::collections::HashMap;

use sea_query::{Alias, Expr};

use super::error::{FetchError, FetchResult};
use super::metadata::{Cardinality, JoinKey, ScalarType};
use super::type_registry::{EntityDescriptor, TypeRegistry};
use super::types::PropertyPath;

/// Table alias of the root entity in every generated query.
pub const ROOT_ALIAS: &str = "root";

/// Maximum number of segments in a property path.
pub const MAX_PATH_DEPTH: usize = 5;

/// One resolved relationship hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinNode {
    /// Alias of the joined table (prefix segments joined by `__`).
    pub alias: String,
    pub parent_alias: String,
    pub table: String,
    pub cardinality: Cardinality,
    /// Column on the parent side of the ON clause.
    pub parent_column: String,
    /// Column on the joined side of the ON clause.
    pub child_column: String,
    /// Whether any hop from the root to here is to-many.
    pub multi: bool,
}

/// A scalar field at the end of a resolved path.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub path: PropertyPath,
    /// Alias of the table holding the column.
    pub table_alias: String,
    pub column: String,
    pub scalar: ScalarType,
    /// Whether the field can hold several values per root row.
    pub multi: bool,
}

impl ResolvedField {
    /// Column expression `"alias"."column"`.
    pub fn expr(&self) -> Expr {
        Expr::col((Alias::new(&self.table_alias), Alias::new(&self.column)))
    }

    /// Identity of the underlying column, used to detect duplicate sorts.
    pub fn key(&self) -> (&str, &str) {
        (&self.table_alias, &self.column)
    }
}

/// The entity a chain of relationships lands on.
#[derive(Debug, Clone)]
struct ResolvedEntity<'r> {
    table_alias: String,
    descriptor: &'r EntityDescriptor,
    multi: bool,
}

/// Join cache for one query build.
pub struct JoinCache<'r> {
    registry: &'r TypeRegistry,
    root: &'r EntityDescriptor,
    by_prefix: HashMap<Vec<String>, usize>,
    joins: Vec<JoinNode>,
}

impl<'r> JoinCache<'r> {
    pub fn new(registry: &'r TypeRegistry, root: &'r EntityDescriptor) -> Self {
        Self {
            registry,
            root,
            by_prefix: HashMap::new(),
            joins: Vec::new(),
        }
    }

    pub fn root(&self) -> &'r EntityDescriptor {
        self.root
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Joins created so far, in creation order (parents before children).
    pub fn joins(&self) -> &[JoinNode] {
        &self.joins
    }

    /// Whether any join fans out the root rows.
    pub fn has_to_many(&self) -> bool {
        self.joins.iter().any(|j| j.cardinality == Cardinality::ToMany)
    }

    /// Resolve a dot-separated path ending in a scalar field.
    pub fn resolve_field(&mut self, raw: &str) -> FetchResult<ResolvedField> {
        let path = self.parse(raw)?;
        let segments = path.segments();
        let (last, relations) = match segments.split_last() {
            Some(split) => split,
            None => return Err(self.unknown(self.root, raw, "")),
        };

        let reached = self.walk(raw, relations)?;
        let field = reached
            .descriptor
            .schema
            .field_def(last)
            .ok_or_else(|| self.unknown(reached.descriptor, raw, last))?;

        Ok(ResolvedField {
            table_alias: reached.table_alias,
            column: field.column.clone(),
            scalar: field.scalar,
            multi: reached.multi,
            path,
        })
    }

    fn parse(&self, raw: &str) -> FetchResult<PropertyPath> {
        let path = PropertyPath::parse(raw, self.root.object_type.as_str())?;
        if path.len() > MAX_PATH_DEPTH {
            return Err(FetchError::PathTooDeep {
                path: raw.to_string(),
                max: MAX_PATH_DEPTH,
            });
        }
        Ok(path)
    }

    fn walk(&mut self, raw: &str, relations: &[String]) -> FetchResult<ResolvedEntity<'r>> {
        let mut current = ResolvedEntity {
            table_alias: ROOT_ALIAS.to_string(),
            descriptor: self.root,
            multi: false,
        };

        for depth in 0..relations.len() {
            let prefix = &relations[..=depth];
            let segment = &relations[depth];
            let relation = current
                .descriptor
                .schema
                .relation(segment)
                .ok_or_else(|| self.unknown(current.descriptor, raw, segment))?;
            let target = self.registry.resolve(relation.target)?;

            let index = match self.by_prefix.get(prefix) {
                Some(&index) => index,
                None => {
                    let (parent_column, child_column) = match &relation.key {
                        JoinKey::Local(column) => {
                            (column.clone(), target.repository.id_column.to_string())
                        }
                        JoinKey::Foreign(column) => (
                            current.descriptor.repository.id_column.to_string(),
                            column.clone(),
                        ),
                    };
                    self.joins.push(JoinNode {
                        alias: prefix.join("__"),
                        parent_alias: current.table_alias.clone(),
                        table: target.repository.table.clone(),
                        cardinality: relation.cardinality,
                        parent_column,
                        child_column,
                        multi: current.multi || relation.cardinality == Cardinality::ToMany,
                    });
                    let index = self.joins.len() - 1;
                    self.by_prefix.insert(prefix.to_vec(), index);
                    index
                }
            };

            let node = &self.joins[index];
            current = ResolvedEntity {
                table_alias: node.alias.clone(),
                descriptor: target,
                multi: node.multi,
            };
        }

        Ok(current)
    }

    fn unknown(&self, on: &EntityDescriptor, raw: &str, segment: &str) -> FetchError {
        FetchError::UnknownField {
            object_type: on.object_type.to_string(),
            path: raw.to_string(),
            segment: segment.to_string(),
        }
    }
}
