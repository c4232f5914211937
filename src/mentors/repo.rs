use sqlx::PgPool;

use crate::auth::repo_types::User;
use crate::mentors::dto::MentorQuery;

/// Mentors matching the optional name substring and tech-stack membership
/// filters. Ordering comes from the closed sort enum, never from user input.
pub async fn list_mentors(db: &PgPool, query: &MentorQuery) -> sqlx::Result<Vec<User>> {
    let sql = format!(
        r#"
        SELECT id, email, password_hash, name, role, bio, tech_stack, interests,
               avatar_key, created_at, updated_at
          FROM users
         WHERE role = 'mentor'
           AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR tech_stack @> ARRAY[$2])
         ORDER BY {}
        "#,
        query.sort_by.order_clause()
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(query.search.as_deref())
        .bind(query.tech_stack.as_deref())
        .fetch_all(db)
        .await
}

#[cfg(test)]
mod tests {
    use crate::mentors::dto::MentorSort;

    #[test]
    fn listing_sql_embeds_the_selected_order() {
        // The clause is interpolated, not bound; make sure both variants
        // produce well-formed ORDER BY endings.
        for sort in [MentorSort::Name, MentorSort::TechStack] {
            let clause = sort.order_clause();
            assert!(clause.contains("ASC"));
            assert!(!clause.contains('$'));
        }
    }
}
