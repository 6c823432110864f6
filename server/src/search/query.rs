//! Translation of validated filter objects into SQL.
//!
//! The page query and the count query are built from one shared predicate
//! (`push_predicate`), so `meta.total` always counts the same set the page
//! was drawn from. The two queries still run without a shared snapshot;
//! a benign race against concurrent writes is accepted.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::filters::EventFilters;

/// Escape LIKE metacharacters in user input before wrapping it in `%`.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Start a SELECT over events with the organizer populated and the
/// per-viewer star flag attached. Shared by search and the list/read
/// endpoints.
pub fn base_select(viewer: Option<Uuid>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT e.id, e.title, e.description, e.location, e.date, \
         e.start_time, e.end_time, e.category, e.image_url, \
         e.tickets_available, e.price, e.status, \
         u.id AS organizer_id, u.name AS organizer_name, ",
    );
    match viewer {
        Some(user_id) => {
            qb.push("EXISTS(SELECT 1 FROM starred_events s WHERE s.event_id = e.id AND s.user_id = ");
            qb.push_bind(user_id);
            qb.push(") AS starred");
        }
        None => {
            qb.push("NULL::boolean AS starred");
        }
    }
    qb.push(", e.created_at, e.updated_at FROM events e JOIN users u ON u.id = e.organizer_id");
    qb
}

/// Append the WHERE clause derived from the filters. All present
/// constraints are ANDed; the free-text constraint is internally an OR
/// over title and description.
pub fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, filters: &EventFilters) {
    qb.push(" WHERE TRUE");

    if let Some(text) = &filters.query {
        let pattern = like_pattern(text);
        qb.push(" AND (e.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR e.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(category) = &filters.category {
        qb.push(" AND e.category = ");
        qb.push_bind(category.clone());
    }

    if let Some(location) = &filters.location {
        qb.push(" AND e.location ILIKE ");
        qb.push_bind(like_pattern(location));
    }

    // Open-ended ranges: either bound may stand alone.
    if let Some(start) = filters.start_date {
        qb.push(" AND e.date >= ");
        qb.push_bind(start);
    }
    if let Some(end) = filters.end_date {
        qb.push(" AND e.date <= ");
        qb.push_bind(end);
    }
}

/// Build the page query: predicate, then sort, then skip/limit.
pub fn page_query(filters: &EventFilters, viewer: Option<Uuid>) -> QueryBuilder<'static, Postgres> {
    let mut qb = base_select(viewer);
    push_predicate(&mut qb, filters);
    qb.push(" ORDER BY ");
    qb.push(filters.sort.column());
    qb.push(" ");
    qb.push(filters.order.sql());
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(filters.limit));
    qb.push(" OFFSET ");
    qb.push_bind(filters.offset());
    qb
}

/// Build the count query over the same predicate, without sort or
/// pagination options.
pub fn count_query(filters: &EventFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM events e");
    push_predicate(&mut qb, filters);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filters::{SortField, SortOrder};
    use chrono::NaiveDate;

    fn predicate_sql(filters: &EventFilters) -> String {
        let mut qb = QueryBuilder::new("");
        push_predicate(&mut qb, filters);
        qb.sql().to_string()
    }

    #[test]
    fn empty_filters_produce_no_constraints() {
        assert_eq!(predicate_sql(&EventFilters::default()), " WHERE TRUE");
    }

    #[test]
    fn free_text_matches_title_or_description() {
        let filters = EventFilters {
            query: Some("diwali".into()),
            ..Default::default()
        };
        let sql = predicate_sql(&filters);
        assert!(sql.contains("(e.title ILIKE $1 OR e.description ILIKE $2)"));
    }

    #[test]
    fn category_filter_is_an_equality() {
        let filters = EventFilters {
            category: Some("music".into()),
            ..Default::default()
        };
        assert!(predicate_sql(&filters).contains("e.category = $1"));
    }

    #[test]
    fn absent_category_and_all_sentinel_build_identical_sql() {
        // "all" never reaches the builder: validation maps it to None, so
        // both shapes share one SQL text.
        let none = predicate_sql(&EventFilters::default());
        let validated = crate::search::filters::validate(
            crate::search::filters::SearchRequest {
                category: Some("all".into()),
                ..Default::default()
            },
            &["music".to_string()],
        )
        .unwrap();
        assert_eq!(none, predicate_sql(&validated));
    }

    #[test]
    fn date_range_bounds_are_independent() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let lower = EventFilters {
            start_date: Some(d),
            ..Default::default()
        };
        let sql = predicate_sql(&lower);
        assert!(sql.contains("e.date >="));
        assert!(!sql.contains("e.date <="));

        let upper = EventFilters {
            end_date: Some(d),
            ..Default::default()
        };
        let sql = predicate_sql(&upper);
        assert!(sql.contains("e.date <="));
        assert!(!sql.contains("e.date >="));

        let both = EventFilters {
            start_date: Some(d),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
            ..Default::default()
        };
        let sql = predicate_sql(&both);
        assert!(sql.contains("e.date >="));
        assert!(sql.contains("e.date <="));
    }

    #[test]
    fn all_constraints_are_anded() {
        let filters = EventFilters {
            query: Some("festival".into()),
            category: Some("music".into()),
            location: Some("berlin".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        let sql = predicate_sql(&filters);
        assert_eq!(sql.matches(" AND ").count(), 5);
    }

    #[test]
    fn page_query_orders_then_paginates() {
        let filters = EventFilters {
            category: Some("music".into()),
            sort: SortField::Price,
            order: SortOrder::Desc,
            page: 2,
            limit: 10,
            ..Default::default()
        };
        let qb = page_query(&filters, None);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY e.price DESC"));
        let order_at = sql.find("ORDER BY").unwrap();
        let limit_at = sql.find("LIMIT").unwrap();
        assert!(order_at < limit_at, "sort must be applied before skip/limit");
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn count_query_shares_the_predicate_and_drops_pagination() {
        let filters = EventFilters {
            query: Some("kathak".into()),
            page: 4,
            limit: 25,
            ..Default::default()
        };
        let count_sql = count_query(&filters).sql().to_string();
        assert!(count_sql.starts_with("SELECT COUNT(*) FROM events e WHERE TRUE"));
        assert!(count_sql.contains("e.title ILIKE"));
        assert!(!count_sql.contains("LIMIT"));
        assert!(!count_sql.contains("OFFSET"));
        assert!(!count_sql.contains("ORDER BY"));
    }

    #[test]
    fn viewer_star_flag_is_a_bound_exists_subquery() {
        let viewer = Uuid::new_v4();
        let qb = page_query(&EventFilters::default(), Some(viewer));
        assert!(qb.sql().contains("EXISTS(SELECT 1 FROM starred_events"));

        let anon = page_query(&EventFilters::default(), None);
        assert!(anon.sql().contains("NULL::boolean AS starred"));
    }

    #[test]
    fn like_patterns_escape_metacharacters() {
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
        assert_eq!(like_pattern("diwali"), "%diwali%");
    }
}
