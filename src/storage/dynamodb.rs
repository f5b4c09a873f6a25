//! DynamoDB storage implementation.
//!
//! Summaries go through a conditional `PutItem` (`attribute_not_exists`),
//! details through a conditional `UpdateItem` (`attribute_exists`) whose
//! `SET` clause only names the detail attributes.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Attribute, Attributes, ItemKey, Table, TableConfig};
use crate::storage::{InsertOutcome, RecordStore};

/// DynamoDB-backed record store.
pub struct DynamoStore {
    client: Client,
    tables: TableConfig,
}

impl DynamoStore {
    pub fn new(client: Client, tables: TableConfig) -> Self {
        Self { client, tables }
    }

    fn table_name(&self, table: Table) -> &str {
        match table {
            Table::Series => &self.tables.series,
            Table::Chapters => &self.tables.chapters,
        }
    }
}

fn to_value(attribute: &Attribute) -> AttributeValue {
    match attribute {
        Attribute::S(s) => AttributeValue::S(s.clone()),
        Attribute::N(n) => AttributeValue::N(n.to_string()),
        Attribute::L(items) => {
            AttributeValue::L(items.iter().cloned().map(AttributeValue::S).collect())
        }
    }
}

fn key_item(table: Table, key: &ItemKey) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            table.provider_attr().to_string(),
            AttributeValue::S(key.provider.clone()),
        ),
        (table.id_attr().to_string(), AttributeValue::S(key.id.clone())),
    ])
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn insert_if_absent(
        &self,
        table: Table,
        key: &ItemKey,
        attributes: &Attributes,
    ) -> Result<InsertOutcome> {
        let mut item = key_item(table, key);
        for (name, value) in attributes {
            item.insert(name.clone(), to_value(value));
        }

        let result = self
            .client
            .put_item()
            .table_name(self.table_name(table))
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", table.id_attr())
            .send()
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    debug!(table = %table, key = %key, "Item already exists");
                    Ok(InsertOutcome::Duplicate)
                } else {
                    Err(AppError::store(format!(
                        "put {table} {key}: {}",
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }

    async fn merge(&self, table: Table, key: &ItemKey, attributes: &Attributes) -> Result<()> {
        if attributes.is_empty() {
            return Ok(());
        }

        let mut request = self
            .client
            .update_item()
            .table_name(self.table_name(table))
            .set_key(Some(key_item(table, key)))
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", table.id_attr());

        let mut assignments = Vec::with_capacity(attributes.len());
        for (i, (name, value)) in attributes.iter().enumerate() {
            let name_ref = format!("#a{i}");
            let value_ref = format!(":v{i}");
            assignments.push(format!("{name_ref} = {value_ref}"));
            request = request
                .expression_attribute_names(name_ref, name)
                .expression_attribute_values(value_ref, to_value(value));
        }

        let result = request
            .update_expression(format!("SET {}", assignments.join(", ")))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    Err(AppError::MergeNotFound {
                        table: table.to_string(),
                        provider: key.provider.clone(),
                        id: key.id.clone(),
                    })
                } else {
                    Err(AppError::store(format!(
                        "update {table} {key}: {}",
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_item_uses_table_key_names() {
        let item = key_item(Table::Chapters, &ItemKey::new("asura", "alpha-chapter-1"));
        assert_eq!(
            item.get("SeriesProvider"),
            Some(&AttributeValue::S("asura".to_string()))
        );
        assert_eq!(
            item.get("ChapterId"),
            Some(&AttributeValue::S("alpha-chapter-1".to_string()))
        );
    }

    #[test]
    fn test_to_value() {
        assert_eq!(to_value(&Attribute::N(12)), AttributeValue::N("12".to_string()));
        assert_eq!(
            to_value(&Attribute::L(vec!["a".to_string(), "b".to_string()])),
            AttributeValue::L(vec![
                AttributeValue::S("a".to_string()),
                AttributeValue::S("b".to_string())
            ])
        );
    }
}
