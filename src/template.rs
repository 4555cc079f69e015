use std::path::Path;

use serde_json::{Map, Value};

/// Fill `%key%` placeholders in a document template with the given values.
/// Numeric values are rounded to two decimals when `truncate` is set;
/// placeholders without a matching key are left untouched.
pub fn fill_template(template: &str, values: &Map<String, Value>, truncate: bool) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        let placeholder = format!("%{}%", key);
        let replacement = match value {
            Value::Number(n) if truncate => {
                format_number((n.as_f64().unwrap_or(0.0) * 100.0).round() / 100.0)
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&placeholder, &replacement);
    }
    out
}

/// Write the filled document out. Conversion to PDF is left to the hosting
/// platform; substitution-then-export is the whole job here.
pub fn export_document(path: &Path, text: &str) -> std::io::Result<()> {
    std::fs::write(path, text)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
