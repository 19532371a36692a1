// stowage-core/src/domain/resource.rs

use std::fmt;

use crate::domain::error::DomainError;

fn require_part(part: &str, whole: &str) -> Result<String, DomainError> {
    let trimmed = part.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidIdentifier {
            value: whole.to_string(),
            reason: "empty component".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Name of an object store bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(name: &str) -> Result<Self, DomainError> {
        Ok(Self(require_part(name, name)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A warehouse dataset, `project.dataset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    pub project: String,
    pub dataset: String,
}

impl DatasetRef {
    pub fn new(project: &str, dataset: &str) -> Result<Self, DomainError> {
        let whole = format!("{}.{}", project, dataset);
        Ok(Self {
            project: require_part(project, &whole)?,
            dataset: require_part(dataset, &whole)?,
        })
    }

    pub fn table(&self, table: &str) -> Result<TableRef, DomainError> {
        let whole = format!("{}.{}", self, table);
        Ok(TableRef {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            table: require_part(table, &whole)?,
        })
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}

/// A warehouse table, `project.dataset.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = id.split('.').collect();
        if parts.len() != 3 {
            return Err(DomainError::InvalidIdentifier {
                value: id.to_string(),
                reason: format!("expected 3 dotted parts, found {}", parts.len()),
            });
        }
        DatasetRef::new(parts[0], parts[1])?.table(parts[2])
    }

    pub fn dataset_ref(&self) -> DatasetRef {
        DatasetRef {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// A relational table name, optionally schema-qualified (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        match id.split_once('.') {
            Some((schema, name)) => Ok(Self {
                schema: Some(require_part(schema, id)?),
                name: require_part(name, id)?,
            }),
            None => Ok(Self {
                schema: None,
                name: require_part(id, id)?,
            }),
        }
    }

    /// Renders the name as double-quoted SQL identifiers.
    pub fn to_sql(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_table_ref_parse_and_display() -> Result<()> {
        let table = TableRef::parse("acme.raw.customers")?;
        assert_eq!(table.project, "acme");
        assert_eq!(table.dataset, "raw");
        assert_eq!(table.table, "customers");
        assert_eq!(table.to_string(), "acme.raw.customers");
        assert_eq!(table.dataset_ref().to_string(), "acme.raw");
        Ok(())
    }

    #[test]
    fn test_table_ref_rejects_missing_parts() {
        assert!(TableRef::parse("acme.customers").is_err());
        assert!(TableRef::parse("acme..customers").is_err());
        assert!(TableRef::parse("").is_err());
    }

    #[test]
    fn test_dataset_table_builder() -> Result<()> {
        let dataset = DatasetRef::new("acme", "raw")?;
        assert_eq!(dataset.table("orders")?.to_string(), "acme.raw.orders");
        assert!(dataset.table("  ").is_err());
        Ok(())
    }

    #[test]
    fn test_bucket_requires_presence() {
        assert!(BucketName::new("").is_err());
        assert!(BucketName::new("landing-zone").is_ok());
    }

    #[test]
    fn test_qualified_name_quoting() -> Result<()> {
        let qualified = QualifiedName::parse("customers.customer_data")?;
        assert_eq!(qualified.to_sql(), "\"customers\".\"customer_data\"");

        let bare = QualifiedName::parse("odd\"name")?;
        assert_eq!(bare.schema, None);
        assert_eq!(bare.to_sql(), "\"odd\"\"name\"");
        Ok(())
    }
}
