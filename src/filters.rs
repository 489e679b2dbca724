/// Query construction from optional request fields
///
/// Every list/update operation takes an explicit struct of optional
/// fields; these helpers map each *present* field to one SQL clause on
/// top of `sqlx::QueryBuilder`. Absent fields contribute nothing, and
/// there is no runtime inspection of arbitrary keys.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Builds a SELECT with a WHERE clause grown one predicate at a time.
pub struct SqlFilter<'args> {
    builder: QueryBuilder<'args, Postgres>,
    has_clause: bool,
}

impl<'args> SqlFilter<'args> {
    pub fn new(select: impl Into<String>) -> Self {
        Self {
            builder: QueryBuilder::new(select),
            has_clause: false,
        }
    }

    fn connective(&mut self) {
        if self.has_clause {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
        }
        self.has_clause = true;
    }

    fn compare<T>(&mut self, column: &str, operator: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.connective();
            self.builder.push(column).push(operator).push_bind(value);
        }
        self
    }

    /// `column = value` when the value is present.
    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.compare(column, " = ", value)
    }

    /// `column >= value` when the value is present.
    pub fn gte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.compare(column, " >= ", value)
    }

    /// `column <= value` when the value is present.
    pub fn lte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.compare(column, " <= ", value)
    }

    /// Raw SQL tail (ORDER BY and friends).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.builder.push(sql);
        self
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn builder(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        &mut self.builder
    }
}

/// Builds an UPDATE whose SET list contains only the supplied fields.
/// `updated_at` is always touched so an update with no optional fields
/// is still a valid statement.
pub struct SqlUpdate<'args> {
    builder: QueryBuilder<'args, Postgres>,
}

impl<'args> SqlUpdate<'args> {
    pub fn new(table: &str) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET updated_at = now()");
        Self { builder }
    }

    /// `column = value` assignment when the value is present.
    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.builder.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// `WHERE id = <id>` plus a RETURNING list to get the row back.
    pub fn where_id<T>(&mut self, id: T, returning: &str) -> &mut QueryBuilder<'args, Postgres>
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(returning);
        &mut self.builder
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn absent_fields_produce_no_where_clause() {
        let mut filter = SqlFilter::new("SELECT * FROM expenses");
        filter
            .eq("is_loan", None::<bool>)
            .eq("sub_category_id", None::<Uuid>);

        assert_eq!(filter.sql(), "SELECT * FROM expenses");
    }

    #[test]
    fn present_fields_become_predicates_in_order() {
        let mut filter = SqlFilter::new("SELECT * FROM expenses");
        filter
            .eq("is_loan", Some(true))
            .eq("sub_category_id", Some(Uuid::new_v4()));

        assert_eq!(
            filter.sql(),
            "SELECT * FROM expenses WHERE is_loan = $1 AND sub_category_id = $2"
        );
    }

    #[test]
    fn range_predicates_use_gte_and_lte() {
        let mut filter = SqlFilter::new("SELECT * FROM labour_works");
        filter
            .gte("worked_on", Some("2024-01-01"))
            .lte("worked_on", Some("2024-01-31"));

        assert_eq!(
            filter.sql(),
            "SELECT * FROM labour_works WHERE worked_on >= $1 AND worked_on <= $2"
        );
    }

    #[test]
    fn mixed_present_and_absent_fields() {
        let mut filter = SqlFilter::new("SELECT * FROM sub_categories");
        filter
            .eq("is_deleted", None::<bool>)
            .eq("category_id", Some(Uuid::new_v4()));

        assert_eq!(
            filter.sql(),
            "SELECT * FROM sub_categories WHERE category_id = $1"
        );
    }

    #[test]
    fn update_sets_only_supplied_fields() {
        let mut update = SqlUpdate::new("categories");
        update
            .set("name", Some("Food"))
            .set("is_active", None::<bool>)
            .set("is_deleted", Some(false));

        assert_eq!(
            update.sql(),
            "UPDATE categories SET updated_at = now(), name = $1, is_deleted = $2"
        );
    }

    #[test]
    fn update_with_no_fields_still_touches_updated_at() {
        let update = SqlUpdate::new("categories");
        assert_eq!(update.sql(), "UPDATE categories SET updated_at = now()");
    }
}
