use derive_new::new;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::{
    engine::any::Any,
    opt::{IntoQuery, IntoResource, QueryResult},
    Surreal,
};
use url::Url;

pub use surrealdb::sql::Thing;

use crate::Located;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

const SCHEMA: &str = include_str!("../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseError {
    #[snafu(display("failed to query the database at {location}: {source}"))]
    DatabaseQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to deserialize the database response at {location}: {source}"))]
    DatabaseDeserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to parse the database response at {location}: response is empty"))]
    EmptyQuery {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    DatabaseConnection {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("cannot open the embedded in-memory database at {location}: {source}"))]
    MemoryConnection {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to apply the database schema at {location}: {source}"))]
    SchemaSetup {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for DatabaseError {
    fn location(&self) -> Location {
        match self {
            DatabaseError::DatabaseQuery { location, .. }
            | DatabaseError::DatabaseDeserialize { location, .. }
            | DatabaseError::EmptyQuery { location, .. }
            | DatabaseError::DatabaseConnection { location, .. }
            | DatabaseError::MemoryConnection { location, .. }
            | DatabaseError::SchemaSetup { location, .. } => *location,
        }
    }
}

/// Represents an identifier for a database record.
pub trait Id {
    /// Returns the ID of the record.
    fn id(&self) -> &Thing;

    /// Returns the name of the table associated with the record.
    fn table() -> &'static str;
}

impl<T: Id> Id for &T {
    fn id(&self) -> &Thing {
        (*self).id()
    }

    fn table() -> &'static str {
        T::table()
    }
}

/// Represents a type that can be used to establish a connection to a database.
pub trait Connection {
    /// The type of the connected database.
    type Database;

    /// Establishes a connection to the database.
    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Database>> + Send;
}

/// Represents a database wrapper.
///
/// This struct provides a wrapper around a database, allowing for easier interaction and abstraction.
#[derive(Debug, Clone, new)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Applies the table schema and wraps the raw connection.
    pub async fn initialize(database: Surreal<Any>) -> Result<Self> {
        database
            .query(SCHEMA)
            .await
            .context(SchemaSetupSnafu)?
            .check()
            .context(SchemaSetupSnafu)?;

        Ok(Database::new(database))
    }

    /// Opens an ephemeral in-memory database, used by tests and local development.
    ///
    /// Every call returns a fresh, empty instance.
    pub async fn memory() -> Result<Self> {
        let database = surrealdb::engine::any::connect("mem://")
            .await
            .context(MemoryConnectionSnafu)?;

        database
            .use_ns("gazette")
            .use_db("gazette")
            .await
            .context(MemoryConnectionSnafu)?;

        Self::initialize(database).await
    }

    /// Create a builder to execute arbitrary SQL code on the database.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Database::memory().await?;
    /// let busiest: Vec<PageView> = db.sql("SELECT * FROM page_views WHERE count > $threshold")
    ///                 .bind(("threshold", 1_000))
    ///                 .fetch().await?;
    /// ```
    ///
    /// The `fetch` method can deserialize the result into either a single value (`Option<T>`) or a collection of values (`Vec<T>`).
    pub fn sql(&self, query: impl IntoQuery) -> Query<'_> {
        let query = self.database.query(query);
        Query { query }
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}

#[derive(Debug)]
pub struct Query<'a> {
    query: surrealdb::method::Query<'a, surrealdb::engine::any::Any>,
}

impl Query<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    pub async fn fetch<T: serde::de::DeserializeOwned>(self) -> Result<T>
    where
        usize: QueryResult<T>,
    {
        let mut statements = self.query.await.context(DatabaseQuerySnafu)?;
        let result = statements.take::<T>(0).context(DatabaseDeserializeSnafu)?;
        Ok(result)
    }
}

/// A typed record id for a database record. Type `T` must implement the [Id] trait so that the table name can be inferred.
///
/// This type implements [Default] which creates a new record with a random UUID as the identifier.
#[derive(PartialEq, Eq)]
pub struct Record<T> {
    inner: Thing,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Id> Record<T> {
    /// Creates a new `Record` from the specified `id` and inferred the table's name from `T`.
    pub fn new(id: impl Into<surrealdb::sql::Id>) -> Self {
        let inner = Thing {
            tb: T::table().to_string(),
            id: id.into(),
        };

        Record {
            inner,
            _marker: std::marker::PhantomData,
        }
    }

    /// Creates a new `Record` with a random UUID as the identifier.
    pub fn uuid() -> Self {
        Self::new(surrealdb::sql::Id::uuid())
    }
}

impl<T> Record<T> {
    pub fn thing(&self) -> &Thing {
        &self.inner
    }

    /// The raw identifier part, without the table prefix.
    pub fn key(&self) -> String {
        self.inner.id.to_raw()
    }
}

impl<T: Id> std::default::Default for Record<T> {
    fn default() -> Self {
        Self::uuid()
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = Thing;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> std::fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> std::fmt::Display for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> std::clone::Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> serde::Serialize for Record<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, T: Id> serde::Deserialize<'de> for Record<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let thing = Thing::deserialize(deserializer)?;

        let expected = T::table();
        let actual = &thing.tb;

        if expected != actual {
            return Err(serde::de::Error::custom(format!(
                "table name mismatch, expected '{expected}' but got '{actual}'"
            )));
        }

        Ok(Record {
            inner: thing,
            _marker: std::marker::PhantomData,
        })
    }
}

impl<T> std::hash::Hash for Record<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl<T, R> IntoResource<R> for Record<T>
where
    Thing: IntoResource<R>,
{
    fn into_resource(self) -> std::result::Result<surrealdb::opt::Resource, surrealdb::Error> {
        self.inner.into_resource()
    }
}
