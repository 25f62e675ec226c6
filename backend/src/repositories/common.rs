//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

/// Appends `WHERE` for the first filter clause and `AND` for the rest.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}
