//! Database provisioning: CSV files materialized as SQLite tables.
//!
//! Each domain is provisioned independently. A domain's table is dropped
//! and recreated inside one exclusive transaction, so a reader that opens
//! the database concurrently sees either the previous table or the new
//! one, never a partial load.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, TransactionBehavior, params_from_iter};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, ResolvedDomain};
use crate::core::Domain;
use crate::error::ProvisionError;

/// SQLite storage class inferred for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// `true`/`false` values, stored as 0/1.
    Boolean,
    /// 64-bit integers.
    Integer,
    /// Floating point.
    Real,
    /// Anything else.
    Text,
}

impl ColumnType {
    const fn sql(self) -> &'static str {
        match self {
            Self::Boolean | Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let (mut boolean, mut integer, mut real) = (true, true, true);
        for cell in cells.map(str::trim).filter(|c| !c.is_empty()) {
            seen = true;
            boolean &= parse_bool(cell).is_some();
            integer &= cell.parse::<i64>().is_ok();
            real &= cell.parse::<f64>().is_ok();
            if !(boolean || integer || real) {
                return Self::Text;
            }
        }
        if !seen {
            Self::Real
        } else if boolean {
            Self::Boolean
        } else if integer {
            Self::Integer
        } else if real {
            Self::Real
        } else {
            Self::Text
        }
    }

    /// Text cells are stored as written; only typed cells are trimmed.
    fn convert(self, cell: &str) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        let trimmed = cell.trim();
        match self {
            Self::Text => Value::Text(cell.to_string()),
            _ if trimmed.is_empty() => Value::Null,
            Self::Boolean => {
                parse_bool(trimmed).map_or(Value::Null, |b| Value::Integer(i64::from(b)))
            }
            Self::Integer => trimmed.parse().map_or(Value::Null, Value::Integer),
            Self::Real => trimmed.parse().map_or(Value::Null, Value::Real),
        }
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Result of provisioning one domain.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Domain provisioned.
    pub domain: Domain,
    /// Table written.
    pub table: String,
    /// Database file written.
    pub database: PathBuf,
    /// Rows loaded.
    pub rows: usize,
    /// Column names and inferred types, in CSV order.
    pub columns: Vec<(String, ColumnType)>,
}

/// Outcome of provisioning all domains.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    outcomes: BTreeMap<Domain, Result<TableSummary, ProvisionError>>,
}

impl ProvisionReport {
    /// Success flag for every domain attempted.
    #[must_use]
    pub fn flags(&self) -> BTreeMap<Domain, bool> {
        self.outcomes
            .iter()
            .map(|(d, r)| (*d, r.is_ok()))
            .collect()
    }

    /// Outcome for one domain, if attempted.
    #[must_use]
    pub fn outcome(&self, domain: Domain) -> Option<&Result<TableSummary, ProvisionError>> {
        self.outcomes.get(&domain)
    }

    /// All outcomes in domain order.
    pub fn outcomes(&self) -> impl Iterator<Item = (Domain, &Result<TableSummary, ProvisionError>)> {
        self.outcomes.iter().map(|(d, r)| (*d, r))
    }

    /// Number of domains that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|r| r.is_ok()).count()
    }

    /// Number of domains attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` if every attempted domain succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }
}

impl std::fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (domain, outcome) in self.outcomes() {
            match outcome {
                Ok(summary) => writeln!(
                    f,
                    "✅ {} DB ready ({} rows, {} columns)",
                    domain.title(),
                    summary.rows,
                    summary.columns.len()
                )?,
                Err(e) => writeln!(f, "❌ {} DB failed: {e}", domain.title())?,
            }
        }
        write!(f, "{}/{} successful", self.succeeded(), self.total())
    }
}

/// Loads the configured CSV files into their SQLite databases.
#[derive(Debug, Clone)]
pub struct Provisioner {
    data_directory: PathBuf,
    domains: [ResolvedDomain; 3],
}

impl Provisioner {
    /// Creates a provisioner for every domain in the configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            data_directory: config.directories.data_directory.clone(),
            domains: Domain::ALL.map(|d| config.domain(d)),
        }
    }

    /// Provisions every domain, each independently of the others.
    pub fn provision_all(&self) -> ProvisionReport {
        let mut report = ProvisionReport::default();
        for resolved in &self.domains {
            let outcome = self.provision(resolved);
            match &outcome {
                Ok(summary) => info!(
                    domain = %resolved.domain,
                    rows = summary.rows,
                    columns = summary.columns.len(),
                    database = %summary.database.display(),
                    "database provisioned"
                ),
                Err(e) => warn!(domain = %resolved.domain, error = %e, "database provisioning failed"),
            }
            report.outcomes.insert(resolved.domain, outcome);
        }
        info!(
            succeeded = report.succeeded(),
            total = report.total(),
            "database setup complete"
        );
        report
    }

    /// Provisions a single domain.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::SourceMissing`] if the CSV is absent, and
    /// other variants for parse, filesystem, or SQLite failures.
    pub fn provision_domain(&self, domain: Domain) -> Result<TableSummary, ProvisionError> {
        self.provision(&self.domains[domain as usize])
    }

    fn provision(&self, resolved: &ResolvedDomain) -> Result<TableSummary, ProvisionError> {
        if !resolved.source.exists() {
            return Err(ProvisionError::SourceMissing {
                path: resolved.source.clone(),
            });
        }

        let (headers, rows) = read_csv(&resolved.source)?;

        ensure_dir(&self.data_directory)?;
        if let Some(parent) = resolved.database.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_dir(parent)?;
        }

        let columns: Vec<(String, ColumnType)> = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let ty = ColumnType::infer(rows.iter().map(|r| r.get(i).unwrap_or("")));
                (name, ty)
            })
            .collect();

        let mut conn = Connection::open(&resolved.database)?;
        write_table(&mut conn, &resolved.table, &columns, &rows)?;

        Ok(TableSummary {
            domain: resolved.domain,
            table: resolved.table.clone(),
            database: resolved.database.clone(),
            rows: rows.len(),
            columns,
        })
    }
}

fn ensure_dir(path: &Path) -> Result<(), ProvisionError> {
    std::fs::create_dir_all(path).map_err(|source| ProvisionError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<csv::StringRecord>), ProvisionError> {
    let csv_err = |source| ProvisionError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let raw: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();
    if raw.iter().all(|h| h.trim().is_empty()) {
        return Err(ProvisionError::NoColumns {
            path: path.to_path_buf(),
        });
    }

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    Ok((dedupe_headers(raw), rows))
}

/// Makes header names unique: repeats of `x` become `x.1`, `x.2`, ...
///
/// A suffixed name that is already taken gets suffixed again, so
/// `a,a.1,a` becomes `a,a.1,a.1.1`. Blank headers become `Unnamed: {i}`.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut name = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{name}.{seen}");
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn write_table(
    conn: &mut Connection,
    table: &str,
    columns: &[(String, ColumnType)],
    rows: &[csv::StringRecord],
) -> Result<(), ProvisionError> {
    let table_q = quote_ident(table);
    let column_defs = columns
        .iter()
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");

    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;
    tx.execute(&format!("DROP TABLE IF EXISTS {table_q}"), [])?;
    tx.execute(&format!("CREATE TABLE {table_q} ({column_defs})"), [])?;
    {
        let mut stmt = tx.prepare(&format!("INSERT INTO {table_q} VALUES ({placeholders})"))?;
        for row in rows {
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, (_, ty))| ty.convert(row.get(i).unwrap_or("")));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    Ok(())
}
