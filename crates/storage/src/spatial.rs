//! Spatial data source that statistic queries run against.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Column, PgPool, Row, TypeInfo};
use tracing::trace;

use geostats_common::{GeoPoint, GeoStatsError, GeoStatsResult, StatValue};

/// Executes a statistic query template at a point.
///
/// Templates reference the point through the named placeholders `:lat` and
/// `:lng`. The result is the first column of the first row; no row or a NULL
/// value is `None`.
#[async_trait]
pub trait SpatialSource: Send + Sync {
    async fn query_scalar(&self, template: &str, point: GeoPoint) -> GeoStatsResult<Option<StatValue>>;
}

/// Positional parameter bound in place of a named placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Lat,
    Lng,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lat" => Some(Placeholder::Lat),
            "lng" => Some(Placeholder::Lng),
            _ => None,
        }
    }

    fn value(self, point: GeoPoint) -> f64 {
        match self {
            Placeholder::Lat => point.lat,
            Placeholder::Lng => point.lng,
        }
    }
}

/// A template rewritten for PostgreSQL positional parameters.
///
/// Each distinct placeholder gets one `$n`, numbered by first appearance, so
/// templates that only mention one of them bind exactly one parameter.
/// `::` casts and string literals are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub params: Vec<Placeholder>,
}

impl PreparedQuery {
    pub fn new(template: &str) -> Self {
        let template = template.trim().trim_end_matches(';').trim_end();
        let chars: Vec<char> = template.chars().collect();
        let mut sql = String::with_capacity(template.len());
        let mut params: Vec<Placeholder> = Vec::new();
        let mut in_literal = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if in_literal {
                if c == '\'' {
                    in_literal = false;
                }
                sql.push(c);
                i += 1;
                continue;
            }

            match c {
                '\'' => {
                    in_literal = true;
                    sql.push(c);
                    i += 1;
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    sql.push_str("::");
                    i += 2;
                }
                ':' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                        end += 1;
                    }
                    let name: String = chars[start..end].iter().collect();

                    match Placeholder::from_name(&name) {
                        Some(placeholder) => {
                            let position = match params.iter().position(|p| *p == placeholder) {
                                Some(pos) => pos,
                                None => {
                                    params.push(placeholder);
                                    params.len() - 1
                                }
                            };
                            sql.push('$');
                            sql.push_str(&(position + 1).to_string());
                        }
                        None => {
                            sql.push(':');
                            sql.push_str(&name);
                        }
                    }
                    i = end;
                }
                _ => {
                    sql.push(c);
                    i += 1;
                }
            }
        }

        Self { sql, params }
    }
}

/// Numeric column types decoded from the first result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
}

impl ScalarKind {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "INT2" => Some(ScalarKind::Int2),
            "INT4" => Some(ScalarKind::Int4),
            "INT8" => Some(ScalarKind::Int8),
            "FLOAT4" => Some(ScalarKind::Float4),
            "FLOAT8" => Some(ScalarKind::Float8),
            _ => None,
        }
    }
}

fn decode_first_column(row: &PgRow) -> GeoStatsResult<Option<StatValue>> {
    let column = row
        .columns()
        .first()
        .ok_or_else(|| GeoStatsError::Internal("query returned no columns".to_string()))?;
    let type_name = column.type_info().name();

    let kind = ScalarKind::from_type_name(type_name).ok_or_else(|| {
        GeoStatsError::Internal(format!(
            "unsupported result type {} (cast the result to float8)",
            type_name
        ))
    })?;

    let decode_err = |e: sqlx::Error| GeoStatsError::Internal(format!("decode failed: {}", e));

    let value = match kind {
        ScalarKind::Int2 => row
            .try_get::<Option<i16>, _>(0)
            .map_err(decode_err)?
            .map(|v| StatValue::Integer(v as i64)),
        ScalarKind::Int4 => row
            .try_get::<Option<i32>, _>(0)
            .map_err(decode_err)?
            .map(|v| StatValue::Integer(v as i64)),
        ScalarKind::Int8 => row
            .try_get::<Option<i64>, _>(0)
            .map_err(decode_err)?
            .map(StatValue::Integer),
        ScalarKind::Float4 => row
            .try_get::<Option<f32>, _>(0)
            .map_err(decode_err)?
            .map(|v| StatValue::Float(v as f64)),
        ScalarKind::Float8 => row
            .try_get::<Option<f64>, _>(0)
            .map_err(decode_err)?
            .map(StatValue::Float),
    };

    Ok(value)
}

/// Runs statistic templates against a PostGIS database.
pub struct PostgisSource {
    pool: PgPool,
}

impl PostgisSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpatialSource for PostgisSource {
    async fn query_scalar(&self, template: &str, point: GeoPoint) -> GeoStatsResult<Option<StatValue>> {
        let prepared = PreparedQuery::new(template);
        trace!(sql = %prepared.sql, lat = point.lat, lng = point.lng, "Running spatial query");

        let mut query = sqlx::query(&prepared.sql);
        for placeholder in &prepared.params {
            query = query.bind(placeholder.value(point));
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GeoStatsError::Internal(format!("Spatial query failed: {}", e)))?;

        match row {
            Some(row) => decode_first_column(&row),
            None => Ok(None),
        }
    }
}
