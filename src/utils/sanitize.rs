use serde_json::Value;

/// Masks sensitive fields in JSON payloads before they are logged.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = match sensitivity(key) {
                    Sensitivity::Secret => Value::String("****".to_string()),
                    Sensitivity::Partial => mask_value(val),
                    Sensitivity::None => sanitize_json(val),
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

enum Sensitivity {
    None,
    Partial,
    Secret,
}

fn sensitivity(key: &str) -> Sensitivity {
    match key.to_lowercase().as_str() {
        // Descriptions often hold the raw bank SMS.
        "description" | "password" | "secret" | "token" | "idtoken" | "api_key"
        | "authorization" => Sensitivity::Secret,
        "userid" | "email" => Sensitivity::Partial,
        _ => Sensitivity::None,
    }
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 8 => {
            let chars: Vec<char> = s.chars().collect();
            let visible: String = chars[..4].iter().collect();
            let end: String = chars[chars.len() - 4..].iter().collect();
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}
