//! Static entity metadata: scalar fields and relationships per entity type.
//!
//! Every entity describes itself once through [`Entity::schema`]. Relationship
//! targets are referenced by [`ObjectType`] tag only, so two entities that
//! point at each other never expand into one another while the registry is
//! being built.

use serde::Serialize;

use super::object_type::ObjectType;
use super::types::FieldType;

/// Storage type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    /// Text column restricted to the listed variants (matched case-sensitively).
    Enum(&'static [&'static str]),
}

impl ScalarType {
    /// Name used in error messages and the column catalog.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Text => "TEXT",
            ScalarType::Integer => "INTEGER",
            ScalarType::Decimal => "DECIMAL",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Date => "DATE",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::Enum(_) => "ENUM",
        }
    }

    /// Whether pattern operators (contains, starts/ends with) apply.
    pub fn is_textual(self) -> bool {
        matches!(self, ScalarType::Text)
    }

    /// Whether range operators (greater/less than, between) apply.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ScalarType::Boolean | ScalarType::Enum(_))
    }

    /// Column type used for rendering when the request does not declare one.
    pub fn default_field_type(self) -> FieldType {
        match self {
            ScalarType::Text => FieldType::String,
            ScalarType::Integer | ScalarType::Decimal => FieldType::Number,
            ScalarType::Boolean => FieldType::Boolean,
            ScalarType::Date | ScalarType::Timestamp => FieldType::Date,
            ScalarType::Enum(_) => FieldType::Enum,
        }
    }
}

/// A scalar property of an entity.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Property name used in paths (`startDate`).
    pub name: &'static str,
    /// Backing column (`start_date`).
    pub column: String,
    pub scalar: ScalarType,
}

/// Relationship cardinality as seen from the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Which side of the relationship holds the foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKey {
    /// `owner.<column> = target.<target id>`
    Local(String),
    /// `owner.<owner id> = target.<column>`
    Foreign(String),
}

/// A navigable relationship to another entity type.
#[derive(Debug, Clone)]
pub struct RelationDef {
    pub name: &'static str,
    pub target: ObjectType,
    pub cardinality: Cardinality,
    pub key: JoinKey,
}

/// Field and relationship table for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub id_column: &'static str,
    pub table: Option<&'static str>,
    pub display_name: Option<&'static str>,
    pub aliases: Vec<&'static str>,
    pub fields: Vec<FieldDef>,
    pub relations: Vec<RelationDef>,
}

impl Default for EntitySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySchema {
    /// Start a schema with an integer `id` primary key.
    pub fn new() -> Self {
        Self {
            id_column: "id",
            table: None,
            display_name: None,
            aliases: Vec::new(),
            fields: vec![FieldDef {
                name: "id",
                column: "id".to_string(),
                scalar: ScalarType::Integer,
            }],
            relations: Vec::new(),
        }
    }

    /// Override the derived table name (irregular plurals, legacy tables).
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Override the derived display name.
    pub fn display_name(mut self, name: &'static str) -> Self {
        self.display_name = Some(name);
        self
    }

    /// Add a legacy name accepted by the registry.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Add a scalar field whose column is the snake_case property name.
    pub fn field(self, name: &'static str, scalar: ScalarType) -> Self {
        let column = snake_case(name);
        self.field_as(name, column, scalar)
    }

    /// Add a scalar field with an explicit column.
    pub fn field_as(mut self, name: &'static str, column: impl Into<String>, scalar: ScalarType) -> Self {
        self.fields.push(FieldDef {
            name,
            column: column.into(),
            scalar,
        });
        self
    }

    /// Add a to-one relationship keyed by `<name>_id` on this entity.
    pub fn to_one(self, name: &'static str, target: ObjectType) -> Self {
        let column = format!("{}_id", snake_case(name));
        self.to_one_via(name, target, column)
    }

    /// Add a to-one relationship keyed by an explicit local column.
    pub fn to_one_via(mut self, name: &'static str, target: ObjectType, column: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name,
            target,
            cardinality: Cardinality::ToOne,
            key: JoinKey::Local(column.into()),
        });
        self
    }

    /// Add a to-many relationship; `column` is the foreign key on the target.
    pub fn to_many(mut self, name: &'static str, target: ObjectType, column: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name,
            target,
            cardinality: Cardinality::ToMany,
            key: JoinKey::Foreign(column.into()),
        });
        self
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Relationships from this entity that land on `target`.
    pub fn relations_to(&self, target: ObjectType) -> impl Iterator<Item = &RelationDef> {
        self.relations.iter().filter(move |r| r.target == target)
    }
}

/// A persisted entity type that can be registered with the type registry.
pub trait Entity: Send + Sync + 'static {
    const OBJECT_TYPE: ObjectType;

    /// Primary key type.
    type Id: Send + Sync + 'static;

    fn schema() -> EntitySchema;
}

/// Convert `camelCase`/`PascalCase` to `snake_case`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// English plural of the last word of a snake_case name.
pub fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// `EVENT_LOCATION` -> `Event Location`.
pub fn humanize(tag: &str) -> String {
    tag.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
