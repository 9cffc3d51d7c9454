use serde::Deserialize;

/// SQL query builder for the task listing endpoint
/// Produces an owner-scoped SELECT with optional completed filter,
/// single-key sorting, and limit/skip pagination.
///
/// The owner id is always `$1`; when a completed filter is present it
/// becomes `$2`. The caller binds values in that order.
pub struct TaskQueryBuilder {
    base_query: String,
    completed_filter: bool,
    order_clause: Option<String>,
    limit: Option<u32>,
    skip: u32,
}

impl TaskQueryBuilder {
    pub fn new() -> Self {
        Self {
            base_query:
                "SELECT id, description, completed, owner_id, created_at, updated_at FROM tasks"
                    .to_string(),
            completed_filter: false,
            order_clause: None,
            limit: None,
            skip: 0,
        }
    }

    /// Adds the boolean-equality filter on completed as `$2`
    pub fn add_completed_filter(&mut self) {
        self.completed_filter = true;
    }

    /// Sets the ORDER BY clause from a validated sort key
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        self.order_clause = Some(format!("{} {}", field.column(), order_str));
    }

    /// Sets pagination; an absent limit means unbounded
    pub fn set_pagination(&mut self, limit: Option<u32>, skip: u32) {
        self.limit = limit;
        self.skip = skip;
    }

    /// Builds the final SQL query string
    /// LIMIT and OFFSET are inlined as integers; PostgreSQL requires them
    /// to be integers, not text parameters.
    pub fn build(&self) -> String {
        let mut query = self.base_query.clone();

        query.push_str(" WHERE owner_id = $1");
        if self.completed_filter {
            query.push_str(" AND completed = $2");
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }
        if self.skip > 0 {
            query.push_str(&format!(" OFFSET {}", self.skip));
        }

        query
    }
}

impl Default for TaskQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters extracted from the task listing request
/// All fields are optional to support flexible querying
#[derive(Debug, Deserialize)]
pub struct TaskQueryParams {
    /// Boolean-equality filter on the completed flag
    pub completed: Option<bool>,
    /// Sort key of the form `field:asc` or `field:desc`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// Maximum number of tasks to return (absent means unbounded)
    pub limit: Option<u32>,
    /// Number of tasks to skip before the first returned (defaults to 0)
    pub skip: Option<u32>,
}

/// Sortable task fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedTaskQuery {
    pub completed: Option<bool>,
    pub sort: Option<(SortField, SortOrder)>,
    pub limit: Option<u32>,
    pub skip: u32,
}

/// Validation error type for query parameters
#[derive(Debug)]
pub struct QueryValidationError {
    pub message: String,
}

impl std::fmt::Display for QueryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryValidationError {}

/// Query parameter validator for task listings
pub struct TaskQueryValidator;

impl TaskQueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: TaskQueryParams) -> Result<ValidatedTaskQuery, QueryValidationError> {
        let sort = match params.sort_by {
            Some(ref raw) => Some(Self::parse_sort_key(raw)?),
            None => None,
        };

        Ok(ValidatedTaskQuery {
            completed: params.completed,
            sort,
            limit: params.limit,
            skip: params.skip.unwrap_or(0),
        })
    }

    /// Parses a `field:direction` sort key
    /// Only `desc` flips the order; a missing or unrecognized direction
    /// is treated as ascending.
    fn parse_sort_key(raw: &str) -> Result<(SortField, SortOrder), QueryValidationError> {
        let (field_str, order_str) = match raw.split_once(':') {
            Some((f, o)) => (f, Some(o)),
            None => (raw, None),
        };

        let field = Self::parse_sort_field(field_str)?;
        let order = match order_str {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };

        Ok((field, order))
    }

    fn parse_sort_field(s: &str) -> Result<SortField, QueryValidationError> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "description" => Ok(SortField::Description),
            "completed" => Ok(SortField::Completed),
            _ => Err(QueryValidationError {
                message: format!(
                    "Invalid sort field '{}'. Must be 'createdAt', 'updatedAt', 'description' or 'completed'",
                    s
                ),
            }),
        }
    }
}
