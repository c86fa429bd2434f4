//! Recipe list queries: filtering, sorting and pagination.
//!
//! Raw query-string values arrive as [`RecipeListParams`] and are normalized
//! once into a [`RecipeQuery`]. The memory store evaluates the query with
//! [`RecipeQuery::apply`]; the `PostgreSQL` store translates the same
//! normalized fields into SQL, so both adapters agree on defaults and
//! coercion rules.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Recipe;

/// Page used when the client sends none (or garbage).
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client sends none (or garbage).
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound on the page size.
pub const MAX_LIMIT: u32 = 100;

/// Query-string parameters accepted by `GET /api/recipes`.
///
/// Every field is kept as a string so that malformed numbers degrade to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub cuisine: Option<String>,
    pub max_time: Option<String>,
    pub ingredients: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
}

/// Field a recipe list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Title,
    Cuisine,
    CookTime,
    Servings,
}

impl SortKey {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "cuisine" => Some(Self::Cuisine),
            "cookTime" => Some(Self::CookTime),
            "servings" => Some(Self::Servings),
            _ => None,
        }
    }

    /// Column expression used by SQL adapters.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Title => "lower(title)",
            Self::Cuisine => "lower(cuisine)",
            Self::CookTime => "cook_time",
            Self::Servings => "servings",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordering of a recipe list, parsed from `sortBy` (`title`, `-createdAt`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Descending,
        }
    }
}

impl Sort {
    /// Parse a `sortBy` value. A leading `-` means descending; unknown keys
    /// fall back to the default order.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (direction, name) = raw.strip_prefix('-').map_or_else(
            || (SortDirection::Ascending, raw.strip_prefix('+').unwrap_or(raw)),
            |rest| (SortDirection::Descending, rest),
        );

        SortKey::parse(name).map_or_else(Self::default, |key| Self { key, direction })
    }

    /// Compare two recipes under this ordering. Ties are broken by creation
    /// time and then ID so paging through equal keys is stable.
    #[must_use]
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        let primary = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Cuisine => a.cuisine.to_lowercase().cmp(&b.cuisine.to_lowercase()),
            SortKey::CookTime => a.cook_time.cmp(&b.cook_time),
            SortKey::Servings => a.servings.cmp(&b.servings),
        };
        let ordered = primary
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id));

        match self.direction {
            SortDirection::Ascending => ordered,
            SortDirection::Descending => ordered.reverse(),
        }
    }
}

/// Page number and size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Coerce raw `page`/`limit` values.
    ///
    /// Missing or non-numeric values take the defaults; values that parse to
    /// zero or less become 1; the limit is capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = coerce_positive(page, DEFAULT_PAGE);
        let limit = coerce_positive(limit, DEFAULT_LIMIT).min(MAX_LIMIT);
        Self { page, limit }
    }

    /// Number of records to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn coerce_positive(raw: Option<&str>, default: u32) -> u32 {
    match raw.and_then(parse_int_prefix) {
        None => default,
        Some(n) if n < 1 => 1,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
    }
}

/// Parse the leading integer of a string the way query strings are usually
/// read: leading whitespace and a sign are allowed, trailing junk is ignored
/// (`"12abc"` is 12), and no digits at all is `None`.
#[must_use]
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = s.strip_prefix('-').map_or_else(
        || (false, s.strip_prefix('+').unwrap_or(s)),
        |rest| (true, rest),
    );
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let n: i64 = digits.get(..end)?.parse().ok()?;
    Some(if negative { -n } else { n })
}

/// A normalized recipe list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    /// Cuisine to match, compared ignoring case.
    pub cuisine: Option<String>,
    /// Maximum cook time in minutes, inclusive.
    pub max_time: Option<i64>,
    /// Lower-cased ingredients that must all be present.
    pub ingredients: Vec<String>,
    /// Lower-cased search terms; each must occur in the title or an ingredient.
    pub search_terms: Vec<String>,
    pub sort: Sort,
    pub pagination: Pagination,
}

impl From<RecipeListParams> for RecipeQuery {
    fn from(params: RecipeListParams) -> Self {
        let cuisine = params
            .cuisine
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        let max_time = params.max_time.as_deref().and_then(parse_int_prefix);

        let ingredients = params
            .ingredients
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|i| i.trim().to_lowercase())
                    .filter(|i| !i.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let search_terms = params
            .search
            .as_deref()
            .map(|raw| raw.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default();

        let sort = params.sort_by.as_deref().map(Sort::parse).unwrap_or_default();

        let pagination = Pagination::from_raw(params.page.as_deref(), params.limit.as_deref());

        Self {
            cuisine,
            max_time,
            ingredients,
            search_terms,
            sort,
            pagination,
        }
    }
}

impl RecipeQuery {
    /// Whether `recipe` passes every active filter.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(cuisine) = &self.cuisine
            && recipe.cuisine.to_lowercase() != cuisine.to_lowercase()
        {
            return false;
        }

        if let Some(max_time) = self.max_time
            && i64::from(recipe.cook_time) > max_time
        {
            return false;
        }

        if !self.ingredients.iter().all(|i| recipe.has_ingredient(i)) {
            return false;
        }

        let title = recipe.title.to_lowercase();
        self.search_terms.iter().all(|term| {
            title.contains(term.as_str())
                || recipe
                    .ingredients
                    .iter()
                    .any(|i| i.to_lowercase().contains(term.as_str()))
        })
    }

    /// Filter, sort and slice an in-memory collection.
    pub fn apply<I>(&self, recipes: I) -> Page<Recipe>
    where
        I: IntoIterator<Item = Recipe>,
    {
        let mut matched: Vec<Recipe> = recipes.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let total = matched.len() as u64;
        let offset = usize::try_from(self.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.pagination.limit).unwrap_or(usize::MAX);
        let results = matched.into_iter().skip(offset).take(limit).collect();

        Page::new(self.pagination, total, results)
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub limit: u32,
    /// Number of matching records before slicing.
    pub total: u64,
    pub total_pages: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build an envelope; `total_pages` is derived from `total` and the limit.
    #[must_use]
    pub fn new(pagination: Pagination, total: u64, results: Vec<T>) -> Self {
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: total.div_ceil(u64::from(pagination.limit.max(1))),
            results,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::types::NewRecipe;

    fn recipe(title: &str, cuisine: &str, cook_time: i32, ingredients: &[&str], age: i64) -> Recipe {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        NewRecipe {
            title: title.to_owned(),
            cuisine: cuisine.to_owned(),
            ingredients: ingredients.iter().map(|s| (*s).to_owned()).collect(),
            cook_time,
            servings: 2,
            instructions: None,
            nutrition: None,
            image_url: None,
        }
        .into_recipe(base + Duration::minutes(age))
    }

    fn params() -> RecipeListParams {
        RecipeListParams::default()
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("12"), Some(12));
        assert_eq!(parse_int_prefix("  7 "), Some(7));
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("+4"), Some(4));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn test_pagination_defaults_and_coercion() {
        assert_eq!(Pagination::from_raw(None, None), Pagination { page: 1, limit: 10 });
        assert_eq!(
            Pagination::from_raw(Some("0"), Some("-5")),
            Pagination { page: 1, limit: 1 }
        );
        assert_eq!(
            Pagination::from_raw(Some("x"), Some("y")),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(Pagination::from_raw(Some("3"), Some("1000")).limit, MAX_LIMIT);
        assert_eq!(Pagination { page: 3, limit: 5 }.offset(), 10);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(Sort::parse("-createdAt"), Sort::default());
        assert_eq!(
            Sort::parse("title"),
            Sort {
                key: SortKey::Title,
                direction: SortDirection::Ascending
            }
        );
        assert_eq!(
            Sort::parse("-cookTime"),
            Sort {
                key: SortKey::CookTime,
                direction: SortDirection::Descending
            }
        );
        assert_eq!(Sort::parse("password"), Sort::default());
    }

    #[test]
    fn test_cuisine_filter_ignores_case() {
        let query = RecipeQuery::from(RecipeListParams {
            cuisine: Some("Italian".to_owned()),
            ..params()
        });
        assert!(query.matches(&recipe("Carbonara", "italian", 20, &["eggs"], 0)));
        assert!(query.matches(&recipe("Risotto", "ITALIAN", 40, &["rice"], 0)));
        assert!(!query.matches(&recipe("Ramen", "Japanese", 30, &["noodles"], 0)));
    }

    #[test]
    fn test_max_time_is_inclusive() {
        let query = RecipeQuery::from(RecipeListParams {
            max_time: Some("20".to_owned()),
            ..params()
        });
        assert!(query.matches(&recipe("A", "x", 20, &["a"], 0)));
        assert!(!query.matches(&recipe("B", "x", 21, &["a"], 0)));
    }

    #[test]
    fn test_unparseable_max_time_is_ignored() {
        let query = RecipeQuery::from(RecipeListParams {
            max_time: Some("soon".to_owned()),
            ..params()
        });
        assert_eq!(query.max_time, None);
        assert!(query.matches(&recipe("Slow", "x", 600, &["a"], 0)));
    }

    #[test]
    fn test_ingredients_must_all_be_present() {
        let query = RecipeQuery::from(RecipeListParams {
            ingredients: Some(" Eggs, pecorino ,,".to_owned()),
            ..params()
        });
        assert_eq!(query.ingredients, vec!["eggs", "pecorino"]);
        assert!(query.matches(&recipe("Carbonara", "x", 20, &["eggs", "Pecorino", "guanciale"], 0)));
        assert!(!query.matches(&recipe("Omelette", "x", 5, &["eggs"], 0)));
    }

    #[test]
    fn test_search_terms_match_title_or_ingredients() {
        let query = RecipeQuery::from(RecipeListParams {
            search: Some("Curry coconut".to_owned()),
            ..params()
        });
        assert!(query.matches(&recipe("Green Curry", "Thai", 30, &["coconut milk"], 0)));
        assert!(!query.matches(&recipe("Green Curry", "Thai", 30, &["yogurt"], 0)));
    }

    #[test]
    fn test_page_two_of_twelve() {
        let recipes: Vec<Recipe> = (0..12)
            .map(|i| recipe(&format!("R{i:02}"), "x", 10, &["a"], i))
            .collect();
        let query = RecipeQuery::from(RecipeListParams {
            page: Some("2".to_owned()),
            limit: Some("5".to_owned()),
            sort_by: Some("title".to_owned()),
            ..params()
        });

        let page = query.apply(recipes);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 5);
        let titles: Vec<&str> = page.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["R05", "R06", "R07", "R08", "R09"]);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let recipes = vec![
            recipe("Old", "x", 10, &["a"], 0),
            recipe("New", "x", 10, &["a"], 10),
        ];
        let page = RecipeQuery::default().apply(recipes);
        assert_eq!(page.results[0].title, "New");
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let recipes = vec![recipe("Only", "x", 10, &["a"], 0)];
        let query = RecipeQuery::from(RecipeListParams {
            page: Some("4".to_owned()),
            ..params()
        });
        let page = query.apply(recipes);
        assert_eq!(page.total, 1);
        assert!(page.results.is_empty());
    }
}
