//! Object-type-driven table query engine.
//!
//! A [`FetchRequest`] names a root entity type plus columns, filters, sorts
//! and nested search constraints as dot-separated property paths. The engine
//! resolves those paths into joins against static entity metadata, builds
//! typed predicates, runs one paginated data query and a matching count
//! query, and flattens the tuples into [`TableRow`]s.

pub mod coerce;
pub mod error;
pub mod join_cache;
pub mod materialize;
pub mod metadata;
pub mod object_type;
pub mod persistence;
pub mod predicate;
pub mod query_builder;
pub mod table_service;
pub mod type_registry;
pub mod types;

pub use error::{FetchError, FetchResult};
pub use join_cache::{JoinCache, MAX_PATH_DEPTH, ROOT_ALIAS};
pub use metadata::{Cardinality, Entity, EntitySchema, ScalarType};
pub use object_type::ObjectType;
pub use persistence::{PgPersistence, Persistence, Session, Tuple, Window};
pub use query_builder::QueryPlan;
pub use table_service::{FetchPage, PageLimits, TableService};
pub use type_registry::{EntityCatalog, EntityDescriptor, TypeRegistry};
pub use types::{
    ColumnDescriptor, FetchRequest, FetchResponse, FetchStatus, FieldType, FilterOperator,
    FilterSpec, FilterValue, SearchConstraint, SortDirection, SortSpec, TableRow,
};
