//! Field-name reconciliation for raw order records.
//!
//! The inventory API is inconsistent about key casing: the same logical field
//! may arrive as `EstimatedDeliveryDate` or `estimatedDeliveryDate`. Each
//! logical field is declared once as an ordered alias list and every read goes
//! through [`resolve`].

use serde_json::{Map, Value};

/// A sales-order record exactly as the API returned it.
pub type RawOrderRecord = Map<String, Value>;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A logical field and the keys it may appear under, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }
}

pub const ID: Field = Field::new("Id", &["Id", "id"]);
pub const REFERENCE: Field = Field::new("Reference", &["Reference", "reference"]);
pub const PROJECT_NAME: Field = Field::new("ProjectName", &["ProjectName", "projectName"]);
pub const COMPANY: Field = Field::new("Company", &["Company", "company"]);
pub const CREATED_DATE: Field = Field::new("CreatedDate", &["CreatedDate", "createdDate"]);
pub const MODIFIED_DATE: Field = Field::new("ModifiedDate", &["ModifiedDate", "modifiedDate"]);
pub const STAGE: Field = Field::new("Stage", &["Stage", "stage"]);
pub const STATUS: Field = Field::new("Status", &["Status", "status"]);
pub const BRANCH_ID: Field = Field::new("BranchId", &["BranchId", "branchId"]);
pub const ESTIMATED_DELIVERY_DATE: Field = Field::new(
    "EstimatedDeliveryDate",
    &["EstimatedDeliveryDate", "estimatedDeliveryDate"],
);
pub const DISPATCHED_DATE: Field =
    Field::new("DispatchedDate", &["DispatchedDate", "dispatchedDate"]);
pub const IS_VOID: Field = Field::new("IsVoid", &["IsVoid", "isVoid"]);
pub const LINE_ITEMS: Field = Field::new("LineItems", &["LineItems", "lineItems"]);
pub const DISTRIBUTION_BRANCH_ID: Field = Field::new(
    "DistributionBranchId",
    &["DistributionBranchId", "distributionBranchId"],
);
pub const DISTRIBUTION_BRANCH: Field = Field::new(
    "DistributionBranch",
    &["DistributionBranch", "distributionBranch"],
);

/// Line-item quantity. Ordered quantity in the unit of measure is the fallback.
pub const LINE_QTY: Field = Field::new(
    "Qty",
    &["Qty", "qty", "UomQtyOrdered", "uomQtyOrdered"],
);

/// Fields requested from the sales-order listing, in request order.
pub const SALES_ORDER_FIELDS: &[Field] = &[
    ID,
    REFERENCE,
    PROJECT_NAME,
    COMPANY,
    CREATED_DATE,
    MODIFIED_DATE,
    STAGE,
    STATUS,
    BRANCH_ID,
    ESTIMATED_DELIVERY_DATE,
    DISPATCHED_DATE,
    IS_VOID,
    LINE_ITEMS,
    DISTRIBUTION_BRANCH_ID,
    DISTRIBUTION_BRANCH,
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// First non-null value stored under any of the field's aliases.
pub fn resolve<'a>(record: &'a RawOrderRecord, field: &Field) -> Option<&'a Value> {
    field
        .aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !v.is_null())
}

/// First value under any alias that is set to something: null, `false`, zero,
/// an empty string and empty collections are skipped.
pub fn resolve_truthy<'a>(record: &'a RawOrderRecord, field: &Field) -> Option<&'a Value> {
    field
        .aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| is_set(v))
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text value of a field, or `""` when absent. Scalars are stringified.
pub fn text(record: &RawOrderRecord, field: &Field) -> String {
    match resolve(record, field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Loose truthiness for flags: `true`, non-zero numbers, and non-empty strings
/// other than `"false"`/`"0"` count as set.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
        }
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Numeric value of a JSON scalar. Numeric strings are accepted; anything else,
/// including non-finite results, is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer identifier from a number or a numeric string.
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// `EstimatedDeliveryDate` → `estimatedDeliveryDate`.
    fn camel_case(pascal: &str) -> String {
        let mut chars = pascal.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn record(v: Value) -> RawOrderRecord {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn pascal_case_key_found() {
        let r = record(json!({"Reference": "SO-1"}));
        assert_eq!(resolve(&r, &REFERENCE), Some(&json!("SO-1")));
    }

    #[test]
    fn camel_case_key_found() {
        let r = record(json!({"reference": "SO-2"}));
        assert_eq!(resolve(&r, &REFERENCE), Some(&json!("SO-2")));
    }

    #[test]
    fn pascal_case_preferred_over_camel_case() {
        let r = record(json!({"Stage": "New", "stage": "Processing"}));
        assert_eq!(resolve(&r, &STAGE), Some(&json!("New")));
    }

    #[test]
    fn null_pascal_value_falls_through_to_camel_case() {
        let r = record(json!({"Stage": null, "stage": "Processing"}));
        assert_eq!(resolve(&r, &STAGE), Some(&json!("Processing")));
    }

    #[test]
    fn absent_in_both_is_none() {
        let r = record(json!({"Other": 1}));
        assert_eq!(resolve(&r, &COMPANY), None);
        assert_eq!(text(&r, &COMPANY), "");
    }

    #[test]
    fn truthy_lookup_skips_zero_and_blank_quantities() {
        let item = record(json!({"Qty": 0, "UomQtyOrdered": 5}));
        assert_eq!(resolve_truthy(&item, &LINE_QTY), Some(&json!(5)));
        let item = record(json!({"Qty": "", "qty": null, "uomQtyOrdered": "3"}));
        assert_eq!(resolve_truthy(&item, &LINE_QTY), Some(&json!("3")));
        let item = record(json!({"Qty": 0}));
        assert_eq!(resolve_truthy(&item, &LINE_QTY), None);
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("EstimatedDeliveryDate"), "estimatedDeliveryDate");
        assert_eq!(camel_case("Id"), "id");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn declared_aliases_follow_camel_case_rule() {
        for field in SALES_ORDER_FIELDS {
            assert_eq!(field.aliases[0], field.name);
            assert_eq!(field.aliases[1], camel_case(field.name));
        }
    }

    #[test]
    fn quantity_aliases_in_priority_order() {
        let item = record(json!({"UomQtyOrdered": 4, "qty": 2}));
        assert_eq!(resolve(&item, &LINE_QTY), Some(&json!(2)));
        let item = record(json!({"uomQtyOrdered": "6"}));
        assert_eq!(resolve(&item, &LINE_QTY), Some(&json!("6")));
    }

    #[test]
    fn text_stringifies_scalars() {
        let r = record(json!({"Reference": 1042}));
        assert_eq!(text(&r, &REFERENCE), "1042");
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!("false"))));
    }

    #[test]
    fn number_coercion() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(2.5)), Some(2.5));
        assert_eq!(coerce_number(&json!(" 4 ")), Some(4.0));
        assert_eq!(coerce_number(&json!("four")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn id_coercion() {
        assert_eq!(coerce_id(&json!(6877)), Some(6877));
        assert_eq!(coerce_id(&json!(6877.0)), Some(6877));
        assert_eq!(coerce_id(&json!("6877")), Some(6877));
        assert_eq!(coerce_id(&json!(6877.5)), None);
        assert_eq!(coerce_id(&json!("Locksmiths")), None);
    }
}
