//! Object type registry.
//!
//! Maps each [`ObjectType`] to its concrete entity, identifier type, storage
//! table and display name. Built once at startup and read-only afterwards,
//! so it is shared behind an `Arc` without locking.

use std::any::type_name;
use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::Serialize;

use super::error::{FetchError, FetchResult};
use super::metadata::{Cardinality, Entity, EntitySchema, humanize, pluralize};
use super::object_type::ObjectType;
use super::types::FetchRequest;

/// Storage handle for an entity: table plus primary key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub table: String,
    pub id_column: &'static str,
}

/// Everything the engine needs to know about one object type.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub object_type: ObjectType,
    /// Concrete Rust type backing the entity.
    pub type_name: &'static str,
    /// Rust type of the primary key.
    pub id_type: &'static str,
    pub repository: Repository,
    pub display_name: String,
    pub schema: EntitySchema,
}

impl EntityDescriptor {
    fn of<E: Entity>() -> Self {
        let schema = E::schema();
        let tag = E::OBJECT_TYPE.as_str();
        let table = schema
            .table
            .map(str::to_string)
            .unwrap_or_else(|| pluralize(&tag.to_ascii_lowercase()));
        let display_name = schema
            .display_name
            .map(str::to_string)
            .unwrap_or_else(|| humanize(tag));

        Self {
            object_type: E::OBJECT_TYPE,
            type_name: type_name::<E>(),
            id_type: type_name::<E::Id>(),
            repository: Repository {
                table,
                id_column: schema.id_column,
            },
            display_name,
            schema,
        }
    }
}

/// Serializable column catalog for table UIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCatalog {
    pub object_type: ObjectType,
    pub display_name: String,
    pub table: String,
    pub fields: Vec<FieldCatalog>,
    pub relationships: Vec<RelationshipCatalog>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldCatalog {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub scalar: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<&'static [&'static str]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipCatalog {
    pub name: &'static str,
    pub target: ObjectType,
    pub cardinality: Cardinality,
}

/// Builder collecting entity registrations before validation.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    entries: Vec<EntityDescriptor>,
    search_paths: Vec<(ObjectType, ObjectType, &'static str)>,
}

impl TypeRegistryBuilder {
    /// Register an entity type.
    pub fn register<E: Entity>(mut self) -> Self {
        self.entries.push(EntityDescriptor::of::<E>());
        self
    }

    /// Declare the relationship path used when `root` requests carry a search
    /// constraint on `target` and no single direct relationship exists.
    pub fn search_path(mut self, root: ObjectType, target: ObjectType, path: &'static str) -> Self {
        self.search_paths.push((root, target, path));
        self
    }

    /// Validate the collected metadata and freeze it.
    pub fn build(self) -> Result<TypeRegistry> {
        let mut entries: HashMap<ObjectType, EntityDescriptor> = HashMap::new();
        for entry in self.entries {
            let tag = entry.object_type;
            if entries.insert(tag, entry).is_some() {
                bail!("object type {tag} registered twice");
            }
        }

        for entry in entries.values() {
            for rel in &entry.schema.relations {
                if !entries.contains_key(&rel.target) {
                    bail!(
                        "relationship {}.{} targets unregistered object type {}",
                        entry.object_type,
                        rel.name,
                        rel.target
                    );
                }
            }
        }

        let mut legacy_names: HashMap<String, ObjectType> = HashMap::new();
        for entry in entries.values() {
            let mut names: Vec<&str> = vec![
                entry.object_type.as_str(),
                entry.display_name.as_str(),
                entry.repository.table.as_str(),
            ];
            for alias in &entry.schema.aliases {
                names.push(alias);
            }
            for name in names {
                let key = normalize_legacy_name(name);
                match legacy_names.get(&key) {
                    Some(existing) if *existing != entry.object_type => bail!(
                        "legacy name '{name}' maps to both {existing} and {}",
                        entry.object_type
                    ),
                    _ => {
                        legacy_names.insert(key, entry.object_type);
                    }
                }
            }
        }

        let mut search_paths = HashMap::new();
        for (root, target, path) in self.search_paths {
            let landed = walk_relations(&entries, root, path)?;
            if landed != target {
                bail!("search path {root} -> '{path}' lands on {landed}, expected {target}");
            }
            search_paths.insert((root, target), path.to_string());
        }

        Ok(TypeRegistry {
            entries,
            legacy_names,
            search_paths,
        })
    }
}

fn walk_relations(
    entries: &HashMap<ObjectType, EntityDescriptor>,
    root: ObjectType,
    path: &str,
) -> Result<ObjectType> {
    let mut current = root;
    for segment in path.split('.') {
        let Some(entry) = entries.get(&current) else {
            bail!("search path '{path}' starts from unregistered object type {current}");
        };
        let Some(rel) = entry.schema.relation(segment) else {
            bail!("search path '{path}': {current} has no relationship '{segment}'");
        };
        current = rel.target;
    }
    Ok(current)
}

/// Lowercase alphanumerics only, so `Event Location`, `event_locations` and
/// `EVENT-LOCATION` compare by their letters.
fn normalize_legacy_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Read-only lookup table from object type to entity metadata.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: HashMap<ObjectType, EntityDescriptor>,
    legacy_names: HashMap<String, ObjectType>,
    search_paths: HashMap<(ObjectType, ObjectType), String>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Look up a registered object type.
    pub fn resolve(&self, object_type: ObjectType) -> FetchResult<&EntityDescriptor> {
        self.entries
            .get(&object_type)
            .ok_or_else(|| FetchError::UnknownObjectType(object_type.to_string()))
    }

    /// Parse and look up a wire tag.
    pub fn resolve_tag(&self, tag: &str) -> FetchResult<&EntityDescriptor> {
        self.resolve(tag.parse()?)
    }

    /// Map a legacy free-text entity name to its object type.
    pub fn resolve_by_legacy_name(&self, name: &str) -> FetchResult<ObjectType> {
        self.legacy_names
            .get(&normalize_legacy_name(name))
            .copied()
            .ok_or_else(|| FetchError::UnknownObjectType(name.to_string()))
    }

    /// Resolve the root type of a request: explicit tag first, legacy name second.
    pub fn resolve_root(&self, request: &FetchRequest) -> FetchResult<&EntityDescriptor> {
        match (&request.object_type, &request.entity_name) {
            (Some(tag), _) => self.resolve_tag(tag),
            (None, Some(name)) => self.resolve(self.resolve_by_legacy_name(name)?),
            (None, None) => Err(FetchError::MissingObjectType),
        }
    }

    /// Relationship path connecting `root` to `target` for search constraints.
    ///
    /// Returns `None` when the target is the root itself.
    pub fn search_path(&self, root: ObjectType, target: ObjectType) -> FetchResult<Option<String>> {
        if root == target {
            return Ok(None);
        }
        if let Some(path) = self.search_paths.get(&(root, target)) {
            return Ok(Some(path.clone()));
        }

        let descriptor = self.resolve(root)?;
        let direct: Vec<&str> = descriptor
            .schema
            .relations_to(target)
            .map(|r| r.name)
            .collect();
        match direct.as_slice() {
            [single] => Ok(Some((*single).to_string())),
            [] => Err(FetchError::UnresolvableSearchTarget {
                root: root.to_string(),
                target: target.to_string(),
                reason: "no relationship connects them".to_string(),
            }),
            many => Err(FetchError::UnresolvableSearchTarget {
                root: root.to_string(),
                target: target.to_string(),
                reason: format!("ambiguous relationships: {}", many.join(", ")),
            }),
        }
    }

    /// Column catalog for one object type.
    pub fn describe(&self, object_type: ObjectType) -> FetchResult<EntityCatalog> {
        let descriptor = self.resolve(object_type)?;
        let schema = &descriptor.schema;

        Ok(EntityCatalog {
            object_type,
            display_name: descriptor.display_name.clone(),
            table: descriptor.repository.table.clone(),
            fields: schema
                .fields
                .iter()
                .map(|f| FieldCatalog {
                    name: f.name,
                    scalar: f.scalar.name(),
                    variants: match f.scalar {
                        super::metadata::ScalarType::Enum(variants) => Some(variants),
                        _ => None,
                    },
                })
                .collect(),
            relationships: schema
                .relations
                .iter()
                .map(|r| RelationshipCatalog {
                    name: r.name,
                    target: r.target,
                    cardinality: r.cardinality,
                })
                .collect(),
        })
    }

    /// Registered object types, in tag order.
    pub fn object_types(&self) -> Vec<ObjectType> {
        let mut tags: Vec<ObjectType> = self.entries.keys().copied().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models;
    use crate::table::metadata::ScalarType;

    struct Orphan;

    impl Entity for Orphan {
        const OBJECT_TYPE: ObjectType = ObjectType::GoldenHour;
        type Id = i64;

        fn schema() -> EntitySchema {
            EntitySchema::new().to_one("reward", ObjectType::Reward)
        }
    }

    #[test]
    fn lucky_draw_registry_resolves_every_tag() {
        let registry = models::registry().unwrap();
        assert_eq!(registry.len(), ObjectType::ALL.len());
        for tag in ObjectType::ALL {
            let descriptor = registry.resolve(tag).unwrap();
            assert_eq!(descriptor.object_type, tag);
            assert!(descriptor.schema.field_def("id").is_some());
        }
    }

    #[test]
    fn table_and_display_names() {
        let registry = models::registry().unwrap();
        let location = registry.resolve(ObjectType::EventLocation).unwrap();
        assert_eq!(location.repository.table, "event_locations");
        assert_eq!(location.display_name, "Event Location");
        assert!(location.type_name.ends_with("EventLocation"));
        assert_eq!(location.id_type, "i64");

        // Irregular override.
        let spins = registry.resolve(ObjectType::SpinHistory).unwrap();
        assert_eq!(spins.repository.table, "spin_history");
    }

    #[test]
    fn legacy_names_resolve() {
        let registry = models::registry().unwrap();
        for name in ["Event Location", "event_locations", "EVENT_LOCATION", "event-location"] {
            assert_eq!(
                registry.resolve_by_legacy_name(name).unwrap(),
                ObjectType::EventLocation,
                "{name}"
            );
        }
        assert!(matches!(
            registry.resolve_by_legacy_name("Lottery Ticket"),
            Err(FetchError::UnknownObjectType(_))
        ));
    }

    #[test]
    fn resolve_root_prefers_explicit_tag() {
        let registry = models::registry().unwrap();

        let req = FetchRequest {
            object_type: Some("REWARD".into()),
            entity_name: Some("events".into()),
            ..Default::default()
        };
        assert_eq!(registry.resolve_root(&req).unwrap().object_type, ObjectType::Reward);

        let req = FetchRequest {
            entity_name: Some("events".into()),
            ..Default::default()
        };
        assert_eq!(registry.resolve_root(&req).unwrap().object_type, ObjectType::Event);

        let req = FetchRequest::default();
        assert!(matches!(registry.resolve_root(&req), Err(FetchError::MissingObjectType)));

        let req = FetchRequest {
            object_type: Some("NOT_REAL".into()),
            ..Default::default()
        };
        assert!(matches!(registry.resolve_root(&req), Err(FetchError::UnknownObjectType(_))));
    }

    #[test]
    fn search_path_lookup_order() {
        let registry = models::registry().unwrap();

        assert_eq!(registry.search_path(ObjectType::Event, ObjectType::Event).unwrap(), None);
        assert_eq!(
            registry
                .search_path(ObjectType::Event, ObjectType::EventLocation)
                .unwrap()
                .as_deref(),
            Some("locations")
        );
        assert_eq!(
            registry
                .search_path(ObjectType::Event, ObjectType::Region)
                .unwrap()
                .as_deref(),
            Some("locations.region")
        );
        assert!(matches!(
            registry.search_path(ObjectType::Reward, ObjectType::Region),
            Err(FetchError::UnresolvableSearchTarget { .. })
        ));
    }

    #[test]
    fn dangling_relationship_fails_build() {
        let err = TypeRegistry::builder().register::<Orphan>().build().unwrap_err();
        assert!(err.to_string().contains("unregistered"));
    }

    #[test]
    fn duplicate_registration_fails_build() {
        let err = TypeRegistry::builder()
            .register::<models::Region>()
            .register::<models::Region>()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn bad_search_path_fails_build() {
        let err = TypeRegistry::builder()
            .register::<models::Region>()
            .register::<models::Province>()
            .register::<models::EventLocation>()
            .register::<models::Event>()
            .register::<models::Reward>()
            .register::<models::ParticipantEvent>()
            .register::<models::Participant>()
            .register::<models::SpinHistory>()
            .register::<models::GoldenHour>()
            .search_path(ObjectType::Region, ObjectType::Reward, "provinces")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("lands on"));
    }

    #[test]
    fn describe_lists_fields_and_relationships() {
        let registry = models::registry().unwrap();
        let catalog = registry.describe(ObjectType::EventLocation).unwrap();
        assert_eq!(catalog.table, "event_locations");

        let status = catalog.fields.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.scalar, ScalarType::Enum(&[]).name());
        assert!(status.variants.unwrap().contains(&"ACTIVE"));

        let region = catalog.relationships.iter().find(|r| r.name == "region").unwrap();
        assert_eq!(region.target, ObjectType::Region);
        assert_eq!(region.cardinality, Cardinality::ToOne);

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["objectType"], "EVENT_LOCATION");
    }
}
