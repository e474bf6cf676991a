//! Listing query for job hiring posts.
//!
//! Without filters the listing goes through the ORM paginator. Once any
//! filter is present the statement is assembled by hand so the category
//! filter can join `job_post_categories`; every user-supplied value is bound
//! as a `$n` parameter, never spliced into the SQL text.

use sea_orm::{
    Condition, DbBackend, EntityTrait, Order, QueryFilter, QueryOrder, Select, Statement, Value,
    sea_query::{Expr, NullOrdering, extension::postgres::PgExpr},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::database::models::{job_finding_post, job_post};
use crate::errors::{AppError, FieldIssue};

pub const PAGE_SIZE: u64 = 10;

/// Highest page whose offset still fits a Postgres BIGINT.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum SalarySort {
    #[serde(rename = "high-low")]
    HighLow,
    #[serde(rename = "low-high")]
    LowHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum DateSort {
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
}

impl SalarySort {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "high-low" => Some(SalarySort::HighLow),
            "low-high" => Some(SalarySort::LowHigh),
            _ => None,
        }
    }
}

impl DateSort {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(DateSort::Newest),
            "oldest" => Some(DateSort::Oldest),
            _ => None,
        }
    }
}

/// Query string of `GET /api/post/job`.
///
/// Parsed by hand rather than through `web::Query` because `category` may be
/// repeated (`?category=3&category=7`) as well as comma separated.
#[derive(Debug, Clone, Default)]
pub struct JobPostQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
    pub location: Option<String>,
    /// Comma separated category ids, e.g. `3,7`.
    pub categories: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub salary_sort: Option<SalarySort>,
    pub date_sort: Option<DateSort>,
}

#[derive(Debug, Clone)]
pub struct FilteredStatements {
    pub select: Statement,
    pub count: Statement,
}

pub fn total_pages(total_items: u64) -> u64 {
    total_items.div_ceil(PAGE_SIZE)
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, FieldIssue> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| FieldIssue::new(field, format!("'{}' is not a number", value)))
}

fn check_page(page: u64) -> Result<u64, FieldIssue> {
    if page > MAX_PAGE {
        Err(FieldIssue::new("page", format!("Must not exceed {}", MAX_PAGE)))
    } else {
        Ok(page)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Default)]
struct Params {
    values: Vec<Value>,
}

impl Params {
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }
}

impl JobPostQuery {
    pub fn from_query_string(query: &str) -> Result<Self, AppError> {
        let mut parsed = JobPostQuery::default();
        let mut categories: Vec<String> = Vec::new();
        let mut issues = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "page" => match parse_number::<u64>("page", &value).and_then(check_page) {
                    Ok(page) => parsed.page = Some(page),
                    Err(issue) => issues.push(issue),
                },
                "search" => parsed.search = Some(value.into_owned()),
                "location" => parsed.location = Some(value.into_owned()),
                "category" | "categories" => categories.push(value.into_owned()),
                "minSalary" => match parse_number::<i64>("minSalary", &value) {
                    Ok(min) => parsed.min_salary = Some(min),
                    Err(issue) => issues.push(issue),
                },
                "maxSalary" => match parse_number::<i64>("maxSalary", &value) {
                    Ok(max) => parsed.max_salary = Some(max),
                    Err(issue) => issues.push(issue),
                },
                "salarySort" => match SalarySort::parse(&value) {
                    Some(sort) => parsed.salary_sort = Some(sort),
                    None => issues.push(FieldIssue::new(
                        "salarySort",
                        "Expected high-low or low-high",
                    )),
                },
                "dateSort" => match DateSort::parse(&value) {
                    Some(sort) => parsed.date_sort = Some(sort),
                    None => issues.push(FieldIssue::new("dateSort", "Expected newest or oldest")),
                },
                _ => {}
            }
        }

        if !issues.is_empty() {
            return Err(AppError::Validation(issues));
        }
        if !categories.is_empty() {
            parsed.categories = Some(categories.join(","));
        }
        Ok(parsed)
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(PAGE_SIZE)
    }

    pub fn category_ids(&self) -> Result<Vec<i32>, AppError> {
        let Some(raw) = non_blank(&self.categories) else {
            return Ok(Vec::new());
        };
        let mut ids = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part.parse::<i32>().map_err(|_| {
                AppError::Validation(vec![FieldIssue::new(
                    "categories",
                    format!("'{}' is not a category id", part),
                )])
            })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn has_filters(&self) -> bool {
        non_blank(&self.search).is_some()
            || non_blank(&self.location).is_some()
            || non_blank(&self.categories).is_some()
            || self.min_salary.is_some()
            || self.max_salary.is_some()
    }

    /// Salary ordering wins over date ordering; newest first otherwise.
    fn order_by_sql(&self) -> &'static str {
        match (self.salary_sort, self.date_sort) {
            (Some(SalarySort::HighLow), _) => "jp.salary DESC NULLS LAST, jp.created_at DESC",
            (Some(SalarySort::LowHigh), _) => "jp.salary ASC NULLS LAST, jp.created_at DESC",
            (None, Some(DateSort::Oldest)) => "jp.created_at ASC",
            (None, _) => "jp.created_at DESC",
        }
    }

    fn where_sql(&self, params: &mut Params) -> Result<(String, bool), AppError> {
        let mut clauses: Vec<String> = Vec::new();

        if let Some(search) = non_blank(&self.search) {
            let p = params.bind(like_pattern(search));
            clauses.push(format!("(jp.title ILIKE {p} OR jp.description ILIKE {p})"));
        }
        if let Some(location) = non_blank(&self.location) {
            let p = params.bind(like_pattern(location));
            clauses.push(format!("jp.location ILIKE {p}"));
        }
        if let Some(min) = self.min_salary {
            let p = params.bind(min);
            clauses.push(format!("jp.salary >= {p}"));
        }
        if let Some(max) = self.max_salary {
            let p = params.bind(max);
            clauses.push(format!("jp.salary <= {p}"));
        }

        let categories = self.category_ids()?;
        let joins_categories = !categories.is_empty();
        if joins_categories {
            let placeholders: Vec<String> = categories.into_iter().map(|id| params.bind(id)).collect();
            clauses.push(format!("jpc.category_id IN ({})", placeholders.join(", ")));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        Ok((where_sql, joins_categories))
    }

    /// Builds the filtered page query and its matching count query.
    pub fn filtered_statements(&self) -> Result<FilteredStatements, AppError> {
        if let (Some(min), Some(max)) = (self.min_salary, self.max_salary) {
            if min > max {
                return Err(AppError::Validation(vec![FieldIssue::new(
                    "minSalary",
                    "Must not exceed maxSalary",
                )]));
            }
        }

        let mut params = Params::default();
        let (where_sql, joins_categories) = self.where_sql(&mut params)?;
        let from_sql = if joins_categories {
            "FROM job_posts jp INNER JOIN job_post_categories jpc ON jpc.job_post_id = jp.id"
        } else {
            "FROM job_posts jp"
        };

        let count_sql = format!("SELECT COUNT(DISTINCT jp.id) AS total {from_sql}{where_sql}");
        let count = Statement::from_sql_and_values(
            DbBackend::Postgres,
            count_sql,
            params.values.clone(),
        );

        let limit = params.bind(PAGE_SIZE as i64);
        let offset = params.bind(self.offset() as i64);
        let distinct = if joins_categories { "DISTINCT " } else { "" };
        let select_sql = format!(
            "SELECT {distinct}jp.* {from_sql}{where_sql} ORDER BY {} LIMIT {limit} OFFSET {offset}",
            self.order_by_sql()
        );
        let select = Statement::from_sql_and_values(DbBackend::Postgres, select_sql, params.values);

        Ok(FilteredStatements { select, count })
    }

    /// ORM select used when no filter is present.
    pub fn orm_select(&self) -> Select<job_post::Entity> {
        let select = job_post::Entity::find();
        match (self.salary_sort, self.date_sort) {
            (Some(SalarySort::HighLow), _) => select
                .order_by_with_nulls(job_post::Column::Salary, Order::Desc, NullOrdering::Last)
                .order_by_desc(job_post::Column::CreatedAt),
            (Some(SalarySort::LowHigh), _) => select
                .order_by_with_nulls(job_post::Column::Salary, Order::Asc, NullOrdering::Last)
                .order_by_desc(job_post::Column::CreatedAt),
            (None, Some(DateSort::Oldest)) => select.order_by_asc(job_post::Column::CreatedAt),
            (None, _) => select.order_by_desc(job_post::Column::CreatedAt),
        }
    }
}

/// Query string of `GET /api/post/finding`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFindingPostQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
    pub date_sort: Option<DateSort>,
}

impl JobFindingPostQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.page.map(check_page) {
            Some(Err(issue)) => Err(AppError::Validation(vec![issue])),
            _ => Ok(()),
        }
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn orm_select(&self) -> Select<job_finding_post::Entity> {
        let mut select = job_finding_post::Entity::find();
        if let Some(search) = non_blank(&self.search) {
            let pattern = like_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::col((job_finding_post::Entity, job_finding_post::Column::Title))
                            .ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((job_finding_post::Entity, job_finding_post::Column::Description))
                            .ilike(pattern),
                    ),
            );
        }
        match self.date_sort {
            Some(DateSort::Oldest) => select.order_by_asc(job_finding_post::Column::CreatedAt),
            _ => select.order_by_desc(job_finding_post::Column::CreatedAt),
        }
    }
}
