// src/store/arrow.rs

use crate::record::{CanonicalRecord, DatePrecision, IncidentDate, IncidentType, Location};
use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{
        Array, ArrayRef, AsArray, Date32Array, MapBuilder, StringArray, StringBuilder,
        StructArray,
    },
    datatypes::{DataType, Date32Type, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::sync::Arc;

pub const SOURCE_NAME: &str = "source_name";
pub const INCIDENT_DATE: &str = "incident_date";
pub const DATE_PRECISION: &str = "date_precision";
pub const INCIDENT_TYPE: &str = "incident_type";
pub const INCIDENT_TYPE_FIELDS: &str = "incident_type_fields";
pub const LOCATION: &str = "location";

/// Convert records into one batch with the canonical column layout:
///
/// - `source_name`          Utf8, non-null
/// - `incident_date`        Date32
/// - `date_precision`       Utf8 (`full_date` | `year_month` | `year_only`)
/// - `incident_type`        Utf8, the single-string label
/// - `incident_type_fields` Map<Utf8, Utf8>, null unless the type is structured
/// - `location`             Struct<postcode, town, district, county>
///
/// Every source produces exactly this layout, so artifacts concatenate
/// without per-source handling.
pub fn records_to_batch(records: &[CanonicalRecord]) -> Result<RecordBatch> {
    let source: StringArray = records.iter().map(|r| Some(r.source_name())).collect();
    let dates: Date32Array = records
        .iter()
        .map(|r| r.incident_date().map(Date32Type::from_naive_date))
        .collect();
    let precision: StringArray = records
        .iter()
        .map(|r| r.date_precision().map(|p| p.as_str()))
        .collect();
    let label: StringArray = records
        .iter()
        .map(|r| r.incident_type().map(IncidentType::label))
        .collect();

    let mut fields = MapBuilder::new(None, StringBuilder::new(), StringBuilder::new());
    for r in records {
        match r.incident_type() {
            Some(IncidentType::Fields(pairs)) => {
                for (k, v) in pairs {
                    fields.keys().append_value(k);
                    fields.values().append_value(v);
                }
                fields.append(true)?;
            }
            _ => fields.append(false)?,
        }
    }
    let fields = fields.finish();

    let location = StructArray::from(
        Location::KEYS
            .iter()
            .map(|key| {
                let arr: StringArray = records.iter().map(|r| r.location().get(key)).collect();
                (
                    Arc::new(Field::new(*key, DataType::Utf8, true)),
                    Arc::new(arr) as ArrayRef,
                )
            })
            .collect::<Vec<_>>(),
    );

    let schema = Schema::new(vec![
        Field::new(SOURCE_NAME, DataType::Utf8, false),
        Field::new(INCIDENT_DATE, DataType::Date32, true),
        Field::new(DATE_PRECISION, DataType::Utf8, true),
        Field::new(INCIDENT_TYPE, DataType::Utf8, true),
        Field::new(INCIDENT_TYPE_FIELDS, fields.data_type().clone(), true),
        Field::new(LOCATION, location.data_type().clone(), false),
    ]);

    let columns: Vec<ArrayRef> = vec![
        Arc::new(source),
        Arc::new(dates),
        Arc::new(precision),
        Arc::new(label),
        Arc::new(fields),
        Arc::new(location),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).context("building canonical record batch")
}

/// The canonical artifact schema.
pub fn canonical_schema() -> Result<SchemaRef> {
    Ok(records_to_batch(&[])?.schema())
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("artifact has no `{}` column", name))
}

fn utf8<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    column(batch, name)?
        .as_string_opt::<i32>()
        .with_context(|| format!("`{}` is not a Utf8 column", name))
}

fn opt_str(arr: &StringArray, row: usize) -> Option<&str> {
    if arr.is_null(row) {
        None
    } else {
        Some(arr.value(row))
    }
}

/// Decode a batch in the canonical layout back into records.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<CanonicalRecord>> {
    let source = utf8(batch, SOURCE_NAME)?;
    let dates = column(batch, INCIDENT_DATE)?
        .as_primitive_opt::<Date32Type>()
        .context("`incident_date` is not a Date32 column")?;
    let precision = utf8(batch, DATE_PRECISION)?;
    let label = utf8(batch, INCIDENT_TYPE)?;
    let fields = column(batch, INCIDENT_TYPE_FIELDS)?
        .as_map_opt()
        .context("`incident_type_fields` is not a Map column")?;
    let location = column(batch, LOCATION)?
        .as_struct_opt()
        .context("`location` is not a Struct column")?;
    let location_cols = Location::KEYS
        .iter()
        .map(|k| {
            location
                .column_by_name(k)
                .and_then(|c| c.as_string_opt::<i32>())
                .with_context(|| format!("`location` has no Utf8 `{}` field", k))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let date = (!dates.is_null(row)).then(|| Date32Type::to_naive_date(dates.value(row)));
        let incident_date = match (date, opt_str(precision, row)) {
            (Some(d), Some(p)) => {
                let p = p
                    .parse::<DatePrecision>()
                    .map_err(|e| anyhow!("row {}: {}", row, e))?;
                Some(IncidentDate::new(d, p))
            }
            (None, None) => None,
            _ => bail!("row {}: incident_date and date_precision disagree", row),
        };

        let incident_type = if !fields.is_null(row) {
            let entries = fields.value(row);
            let keys = entries
                .column(0)
                .as_string_opt::<i32>()
                .context("map keys are not Utf8")?;
            let values = entries
                .column(1)
                .as_string_opt::<i32>()
                .context("map values are not Utf8")?;
            let pairs = (0..entries.len())
                .map(|i| (keys.value(i).to_string(), values.value(i).to_string()))
                .collect();
            Some(IncidentType::Fields(pairs))
        } else {
            opt_str(label, row).map(IncidentType::text)
        };

        let get = |i: usize| opt_str(location_cols[i], row).map(str::to_string);
        let loc = Location::default()
            .postcode(get(0))
            .town(get(1))
            .district(get(2))
            .county(get(3));

        out.push(CanonicalRecord::new(
            source.value(row),
            incident_date,
            incident_type,
            loc,
        ));
    }
    Ok(out)
}
