use serde_json::Value;

use super::scalar;

/// Key answers, most telling first.
const PRIORITY_KEYS: [&str; 5] = [
    "months_saved",
    "interest_saved",
    "recommended_extra",
    "new_term",
    "monthly_obligatory",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Array(rows) = result_obj {
        return format!("{} rows", rows.len());
    }

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format!("{}: {}", key, scalar(val, "null"));
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar(val, "null"));
        }
    }

    scalar(result_obj, "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_months_saved_preferred() {
        let v = json!({"result": {"interest_saved": "10", "months_saved": 12}});
        assert_eq!(minimal_answer(&v), "months_saved: 12");
    }

    #[test]
    fn test_budget_answer() {
        let v = json!({"result": {"surplus": "10", "recommended_extra": "7"}});
        assert_eq!(minimal_answer(&v), "recommended_extra: 7");
    }

    #[test]
    fn test_row_sets_counted() {
        let v = json!([{"month": 1}, {"month": 2}]);
        assert_eq!(minimal_answer(&v), "2 rows");
    }
}
