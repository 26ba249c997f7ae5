//! Read side of the orchestrator: list, paginate, show, count.
//!
//! Every read merges the context's conditionals with the call's filters,
//! applies the schema's booting scope and tombstone visibility, orders by
//! primary key, and eager-loads the declared relations. The `prepare_*`
//! variants return raw [`Record`]s; the plain variants pass them through the
//! entity's resource transformer.

use super::condition::{Conditionals, Logic, Operator};
use super::error::{DataError, DataResult};
use super::manager::{ConditionInput, Entity};
use super::pagination::{Page, PageLinks, PageMeta, PaginateRequest};
use super::record::{Record, Related};
use super::schema::RelationKind;
use crate::db::records::{Records, Select, Trashed};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

impl<'m> Entity<'m> {
    pub fn prepare_list(&self, filters: Option<ConditionInput>) -> DataResult<Vec<Record>> {
        let select = Select {
            conditionals: self.query_conditionals(filters.as_ref())?,
            trashed: self.trashed,
            ..Default::default()
        };
        let mut records = self.records().select(&select)?;
        self.load_relations(&mut records)?;
        debug!(entity = self.name(), count = records.len(), "list prepared");
        Ok(records)
    }

    pub fn list(&self) -> DataResult<Vec<Value>> {
        let records = self.prepare_list(None)?;
        Ok(self.present_all(&records))
    }

    pub fn count(&self, filters: Option<ConditionInput>) -> DataResult<u64> {
        let conditionals = self.query_conditionals(filters.as_ref())?;
        self.records().count(&conditionals, self.trashed)
    }

    pub fn prepare_paginate(&self, request: &PaginateRequest) -> DataResult<Page<Record>> {
        let options = self.manager.options();
        let per_page = request.per_page.unwrap_or(options.per_page).clamp(1, options.max_per_page.max(1));
        let page = request.page.max(1);

        let params = request.filter_params();
        let filters = (!params.is_empty()).then_some(ConditionInput::Params(params));
        let conditionals = self.query_conditionals(filters.as_ref())?;

        let total = match request.total {
            Some(total) => total,
            None => self.records().count(&conditionals, self.trashed)?,
        };

        let select = Select {
            conditionals,
            trashed: self.trashed,
            columns: request.columns.clone(),
            limit: Some(per_page),
            offset: (page - 1).saturating_mul(per_page),
        };
        let mut records = self.records().select(&select)?;
        self.load_relations(&mut records)?;

        let meta = PageMeta::new(page, per_page, total, records.len());
        let links = PageLinks::build(&request.path, &request.filters, &meta);
        debug!(entity = self.name(), page, per_page, total, "page prepared");

        Ok(Page { data: records, meta, links })
    }

    pub fn paginate(&self, request: Option<&PaginateRequest>) -> DataResult<Page<Value>> {
        let default_request = PaginateRequest::default();
        let page = self.prepare_paginate(request.unwrap_or(&default_request))?;
        let resource = self.schema().resource();
        let presenter = self.manager.presenter();
        Ok(page.map(|record| presenter.present(self.name(), resource.as_ref(), &record)))
    }

    /// Fetches one record by id, or the first record matching the
    /// conditionals when no id is given.
    pub fn prepare_show(&self, id: Option<&str>, filters: Option<ConditionInput>) -> DataResult<Record> {
        let mut conditionals = self.query_conditionals(filters.as_ref())?;
        if let Some(id) = id {
            conditionals = conditionals.merge(&Conditionals::and().where_eq("id", id), Logic::And);
        }

        let select = Select {
            conditionals,
            trashed: self.trashed,
            limit: Some(1),
            ..Default::default()
        };
        let mut records = self.records().select(&select)?;
        self.load_relations(&mut records)?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| DataError::not_found(self.name(), id.unwrap_or("matching conditionals")))
    }

    pub fn show(&self, id: Option<&str>) -> DataResult<Value> {
        let record = self.prepare_show(id, None)?;
        Ok(self.present(&record))
    }

    pub(crate) fn load_relations(&self, records: &mut [Record]) -> DataResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        for name in &self.with {
            let relation = self.schema().relation(name).ok_or_else(|| DataError::UnknownRelation {
                entity: self.name().to_string(),
                relation: name.clone(),
            })?;

            match relation.kind {
                RelationKind::BelongsTo { foreign_key } => {
                    let keys: BTreeSet<String> = records.iter().filter_map(|record| key_of(record.get(foreign_key))).collect();
                    let related = self.fetch_by(relation.entity, "id", keys)?;
                    for record in records.iter_mut() {
                        let found = key_of(record.get(foreign_key)).and_then(|key| related.get(&key).and_then(|rows| rows.first().cloned()));
                        record.relations.insert(relation.name.to_string(), Related::One(found.map(Box::new)));
                    }
                }
                RelationKind::HasMany { foreign_key } => {
                    let keys: BTreeSet<String> = records.iter().map(|record| record.id.clone()).collect();
                    let related = self.fetch_by(relation.entity, foreign_key, keys)?;
                    for record in records.iter_mut() {
                        let rows = related.get(&record.id).cloned().unwrap_or_default();
                        record.relations.insert(relation.name.to_string(), Related::Many(rows));
                    }
                }
                RelationKind::MorphTo { type_column, id_column } => {
                    let mut by_type: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
                    for record in records.iter() {
                        if let (Some(kind), Some(key)) = (key_of(record.get(type_column)), key_of(record.get(id_column))) {
                            by_type.entry(kind).or_default().insert(key);
                        }
                    }

                    let mut related: BTreeMap<String, BTreeMap<String, Vec<Record>>> = BTreeMap::new();
                    for (kind, keys) in by_type {
                        if !self.manager.registry().contains(&kind) {
                            warn!(entity = self.name(), relation = relation.name, target = %kind, "skipping unknown morph target");
                            continue;
                        }
                        related.insert(kind.clone(), self.fetch_by(&kind, "id", keys)?);
                    }

                    for record in records.iter_mut() {
                        let found = match (key_of(record.get(type_column)), key_of(record.get(id_column))) {
                            (Some(kind), Some(key)) => related.get(&kind).and_then(|rows| rows.get(&key)).and_then(|rows| rows.first().cloned()),
                            _ => None,
                        };
                        record.relations.insert(relation.name.to_string(), Related::One(found.map(Box::new)));
                    }
                }
            }
        }

        Ok(())
    }

    /// Loads rows of `entity` whose `field` is one of `keys`, grouped by that
    /// field.
    fn fetch_by(&self, entity: &str, field: &str, keys: BTreeSet<String>) -> DataResult<BTreeMap<String, Vec<Record>>> {
        let mut grouped: BTreeMap<String, Vec<Record>> = BTreeMap::new();
        if keys.is_empty() {
            return Ok(grouped);
        }

        let schema = self.manager.registry().resolve(entity)?;
        let values: Vec<Value> = keys.into_iter().map(Value::String).collect();
        let select = Select {
            conditionals: Conditionals::and().where_op(field, Operator::In, Value::Array(values)),
            trashed: Trashed::Without,
            ..Default::default()
        };

        for record in Records::new(self.conn(), schema.as_ref()).select(&select)? {
            if let Some(key) = key_of(record.get(field)) {
                grouped.entry(key).or_default().push(record);
            }
        }

        Ok(grouped)
    }
}

fn key_of(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
