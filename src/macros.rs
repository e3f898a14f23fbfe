use crate::database::Id;

pub fn table<T: Id>() -> &'static str {
    T::table()
}

#[macro_export]
macro_rules! define_model {
    ($model:ty) => {
        impl $model {
            pub async fn list(db: impl Into<&Database>) -> $crate::database::Result<Vec<Self>> {
                db.into()
                    .select($crate::macros::table::<Self>())
                    .await
                    .context(DatabaseQuerySnafu)
            }

            pub async fn find(
                id: impl surrealdb::opt::IntoResource<Option<Self>>, db: impl Into<&Database>,
            ) -> $crate::database::Result<Option<Self>> {
                db.into().select(id).await.context(DatabaseQuerySnafu)
            }

            pub async fn create(&self, db: impl Into<&Database>) -> $crate::database::Result<Vec<Self>> {
                db.into().create($crate::macros::table::<Self>())
                    .content(self)
                    .await
                    .context(DatabaseQuerySnafu)
            }
        }
    };
}

#[macro_export]
macro_rules! define_id {
    ($table:literal, $model:ty : $self:ident => $getter:expr) => {
        impl $crate::database::Id for $model {
            fn id(&$self) -> &$crate::database::Thing {
                $getter
            }

            fn table() -> &'static str {
                $table
            }
        }
    };
}

/// Defines a method to query the database using SQL.
///
/// # Syntax
/// ```text
/// [Base Type] > method_name(...arguments) > [Output Type] where "sql query"
/// ```
/// Where the `Base Type` is the type that the method is being defined for and the `Output Type` is the shape
/// the query result deserializes into, either a single `Option<T>` or a collection `Vec<T>`.
///
/// # Example
///
/// ```rust,ignore
/// define_relation! {
///     PageView > on_day(day: Day) > Option<Tally>
///         where "SELECT math::sum(count) AS total FROM page_views WHERE day = $day GROUP ALL"
/// }
///
/// let total = PageView::on_day(day, &db).await?;
/// ```
#[macro_export]
macro_rules! define_relation {
    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) > $export:ty where $query:literal) => {
        impl $model {
            pub async fn $relation($($binding : $binding_type ,)* db: impl Into<&Database>) -> $crate::database::Result<$export> {
                db.into().sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .fetch()
                    .await
            }
        }
    };
}
