//! Maps loosely-keyed research objects onto [`NewStartup`].
//!
//! Producers emit the same logical field under different keys: a
//! human-readable label (`"Company Name"`), the canonical snake-case key
//! (`"company_name"`), or a short alias (`"name"`). Each field is described
//! by a [`FieldSpec`] listing its keys in precedence order; the first key
//! holding a non-empty, convertible value wins. Keys that appear in no
//! field's key list are ignored.

use serde_json::{Map, Value};

use crate::models::NewStartup;

/// Candidate keys for one logical field, highest precedence first.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical column name.
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

pub const COMPANY_NAME: FieldSpec = FieldSpec {
    name: "company_name",
    keys: &["Company Name", "company_name", "name"],
};
pub const WEBSITE_URL: FieldSpec = FieldSpec {
    name: "website_url",
    keys: &["Website URL", "website_url", "website"],
};
pub const FOUNDING_YEAR: FieldSpec = FieldSpec {
    name: "founding_year",
    keys: &["Founding Year", "founding_year", "founded"],
};
pub const FOUNDERS: FieldSpec = FieldSpec {
    name: "founders",
    keys: &["Founders", "founders"],
};
pub const BUSINESS_MODEL: FieldSpec = FieldSpec {
    name: "business_model",
    keys: &["Business Model", "business_model"],
};
pub const INDUSTRY_SECTOR: FieldSpec = FieldSpec {
    name: "industry_sector",
    keys: &["Industry Sector", "industry_sector", "industry"],
};
pub const FUNDING_ROUNDS: FieldSpec = FieldSpec {
    name: "funding_rounds",
    keys: &["Funding Rounds", "funding_rounds"],
};
pub const TOTAL_CAPITAL_RAISED: FieldSpec = FieldSpec {
    name: "total_capital_raised",
    keys: &[
        "Total Capital Raised to Date",
        "total_capital_raised",
        "total_funding",
    ],
};
pub const CURRENT_REVENUE_ESTIMATES: FieldSpec = FieldSpec {
    name: "current_revenue_estimates",
    keys: &[
        "Current Revenue Estimates",
        "current_revenue_estimates",
        "revenue",
    ],
};
pub const EMPLOYEE_COUNT: FieldSpec = FieldSpec {
    name: "employee_count",
    keys: &["Employee Count", "employee_count", "employees"],
};
pub const CUSTOMER_USER_BASE_SIZE: FieldSpec = FieldSpec {
    name: "customer_user_base_size",
    keys: &[
        "Customer/User Base Size",
        "customer_user_base_size",
        "users",
    ],
};
pub const KEY_PARTNERSHIPS: FieldSpec = FieldSpec {
    name: "key_partnerships",
    keys: &["Key Partnerships", "key_partnerships"],
};
pub const MAJOR_COMPETITORS: FieldSpec = FieldSpec {
    name: "major_competitors",
    keys: &["Major Competitors", "major_competitors"],
};
pub const RECENT_NEWS_DEVELOPMENTS: FieldSpec = FieldSpec {
    name: "recent_news_developments",
    keys: &[
        "Recent News or Developments",
        "recent_news_developments",
        "recent_news",
    ],
};

/// Every field, in schema order.
pub const FIELDS: [FieldSpec; 14] = [
    COMPANY_NAME,
    WEBSITE_URL,
    FOUNDING_YEAR,
    FOUNDERS,
    BUSINESS_MODEL,
    INDUSTRY_SECTOR,
    FUNDING_ROUNDS,
    TOTAL_CAPITAL_RAISED,
    CURRENT_REVENUE_ESTIMATES,
    EMPLOYEE_COUNT,
    CUSTOMER_USER_BASE_SIZE,
    KEY_PARTNERSHIPS,
    MAJOR_COMPETITORS,
    RECENT_NEWS_DEVELOPMENTS,
];

/// Why a candidate did not become a record. Not an error: the pipeline
/// counts these as skipped and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("candidate is not a JSON object")]
    NotAnObject,
    #[error("missing company name")]
    MissingCompanyName,
}

/// Normalizes any JSON value; non-objects are rejected.
pub fn normalize_value(candidate: &Value) -> Result<NewStartup, Rejection> {
    match candidate {
        Value::Object(map) => normalize(map),
        _ => Err(Rejection::NotAnObject),
    }
}

/// Normalizes one raw object. Pure; never touches the store.
pub fn normalize(raw: &Map<String, Value>) -> Result<NewStartup, Rejection> {
    let company_name = resolve(raw, &COMPANY_NAME, as_text).ok_or(Rejection::MissingCompanyName)?;

    Ok(NewStartup {
        company_name,
        website_url: resolve(raw, &WEBSITE_URL, as_text),
        founding_year: resolve(raw, &FOUNDING_YEAR, as_integer),
        founders: resolve(raw, &FOUNDERS, as_string_list).unwrap_or_default(),
        business_model: resolve(raw, &BUSINESS_MODEL, as_text),
        industry_sector: resolve(raw, &INDUSTRY_SECTOR, as_text),
        funding_rounds: resolve(raw, &FUNDING_ROUNDS, as_value_list).unwrap_or_default(),
        total_capital_raised: resolve(raw, &TOTAL_CAPITAL_RAISED, as_text),
        current_revenue_estimates: resolve(raw, &CURRENT_REVENUE_ESTIMATES, as_text),
        employee_count: resolve(raw, &EMPLOYEE_COUNT, as_integer),
        customer_user_base_size: resolve(raw, &CUSTOMER_USER_BASE_SIZE, as_text),
        key_partnerships: resolve(raw, &KEY_PARTNERSHIPS, as_string_list).unwrap_or_default(),
        major_competitors: resolve(raw, &MAJOR_COMPETITORS, as_string_list).unwrap_or_default(),
        recent_news_developments: resolve(raw, &RECENT_NEWS_DEVELOPMENTS, as_text),
    })
}

/// Walks `spec.keys` in order and returns the first value `convert`
/// accepts. Converters return `None` for empty values so a blank label
/// falls through to the canonical key and then the alias.
fn resolve<T>(
    raw: &Map<String, Value>,
    spec: &FieldSpec,
    convert: fn(&Value) -> Option<T>,
) -> Option<T> {
    spec.keys
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(convert)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64)),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

/// Whole floats inside the `i64` range; anything else is not a count.
fn integral_f64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    };
    (!items.is_empty()).then_some(items)
}

fn as_value_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) if !items.is_empty() => Some(items.clone()),
        Value::Object(map) if !map.is_empty() => Some(vec![value.clone()]),
        Value::String(s) if !s.trim().is_empty() => Some(vec![value.clone()]),
        _ => None,
    }
}
