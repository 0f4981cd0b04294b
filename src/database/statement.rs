use crate::database::CqlValue;

/// Parameterized statement: a CQL template with positional placeholders
/// and the matching ordered values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    cql: String,
    values: Vec<CqlValue>,
}

impl Statement {
    pub fn cql(&self) -> &str {
        &self.cql
    }

    pub fn values(&self) -> &[CqlValue] {
        &self.values
    }
}

/// SELECT builder over a single partition.
///
/// `key_eq` predicates address primary-key columns and cost nothing.
/// `scan_eq`/`scan_lte` predicates are not indexed; adding one marks the
/// statement so `build` appends `ALLOW FILTERING`, trading a partition
/// scan for correctness.
#[derive(Debug)]
pub struct Select {
    table: &'static str,
    projection: &'static str,
    predicates: Vec<String>,
    values: Vec<CqlValue>,
    limit: Option<i32>,
    relaxed: bool,
}

impl Select {
    pub fn from(table: &'static str) -> Self {
        Select {
            table,
            projection: "*",
            predicates: Vec::new(),
            values: Vec::new(),
            limit: None,
            relaxed: false,
        }
    }

    /// COUNT(*) projection over the same predicate machinery.
    pub fn count(table: &'static str) -> Self {
        Select {
            projection: "COUNT(*)",
            ..Select::from(table)
        }
    }

    pub fn key_eq(self, column: &str, value: CqlValue) -> Self {
        self.predicate(format!("{} = ?", column), value)
    }

    pub fn scan_eq(mut self, column: &str, value: CqlValue) -> Self {
        self.relaxed = true;
        self.predicate(format!("{} = ?", column), value)
    }

    pub fn scan_lte(mut self, column: &str, value: CqlValue) -> Self {
        self.relaxed = true;
        self.predicate(format!("{} <= ?", column), value)
    }

    pub fn limit(mut self, rows: i32) -> Self {
        self.limit = Some(rows);
        self
    }

    pub fn build(mut self) -> Statement {
        let mut cql = format!("SELECT {} FROM {}", self.projection, self.table);

        if !self.predicates.is_empty() {
            cql.push_str(" WHERE ");
            cql.push_str(&self.predicates.join(" AND "));
        }

        if let Some(rows) = self.limit {
            cql.push_str(" LIMIT ?");
            self.values.push(CqlValue::Int(rows));
        }

        if self.relaxed {
            cql.push_str(" ALLOW FILTERING");
        }

        Statement {
            cql,
            values: self.values,
        }
    }

    fn predicate(mut self, fragment: String, value: CqlValue) -> Self {
        self.predicates.push(fragment);
        self.values.push(value);
        self
    }
}

/// INSERT builder; columns render in the order they were added.
#[derive(Debug)]
pub struct Insert {
    table: &'static str,
    columns: Vec<&'static str>,
    values: Vec<CqlValue>,
    ttl_secs: Option<i32>,
}

impl Insert {
    pub fn new(table: &'static str) -> Self {
        Insert {
            table,
            columns: Vec::new(),
            values: Vec::new(),
            ttl_secs: None,
        }
    }

    pub fn value(mut self, column: &'static str, value: CqlValue) -> Self {
        self.columns.push(column);
        self.values.push(value);
        self
    }

    /// Expire the row this many seconds after the write.
    pub fn ttl(mut self, secs: i32) -> Self {
        self.ttl_secs = Some(secs);
        self
    }

    pub fn build(mut self) -> Statement {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let mut cql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            placeholders
        );

        if let Some(secs) = self.ttl_secs {
            cql.push_str(" USING TTL ?");
            self.values.push(CqlValue::Int(secs));
        }

        Statement {
            cql,
            values: self.values,
        }
    }
}

/// DELETE builder addressing rows by primary key.
#[derive(Debug)]
pub struct Delete {
    table: &'static str,
    predicates: Vec<String>,
    values: Vec<CqlValue>,
    limit: Option<i32>,
}

impl Delete {
    pub fn from(table: &'static str) -> Self {
        Delete {
            table,
            predicates: Vec::new(),
            values: Vec::new(),
            limit: None,
        }
    }

    pub fn key_eq(mut self, column: &str, value: CqlValue) -> Self {
        self.predicates.push(format!("{} = ?", column));
        self.values.push(value);
        self
    }

    /// Row limit on the delete. Advisory: engines without row-limited
    /// deletes ignore it, since the key predicates already address at
    /// most one row.
    pub fn limit(mut self, rows: i32) -> Self {
        self.limit = Some(rows);
        self
    }

    pub fn build(mut self) -> Statement {
        let mut cql = format!("DELETE FROM {}", self.table);

        if !self.predicates.is_empty() {
            cql.push_str(" WHERE ");
            cql.push_str(&self.predicates.join(" AND "));
        }

        if let Some(rows) = self.limit {
            cql.push_str(" LIMIT ?");
            self.values.push(CqlValue::Int(rows));
        }

        Statement {
            cql,
            values: self.values,
        }
    }
}
