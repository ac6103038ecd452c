//! JSON output formatting.

use myst_core::{ConsistencyReport, Secret};

/// Convert a secret to JSON. The envelope is never included.
pub fn secret_json(secret: &Secret, value: Option<&str>) -> serde_json::Value {
    let mut json = serde_json::json!({
        "id": secret.id,
        "key": secret.key,
        "website": secret.website,
        "notes": secret.notes,
        "created_at": secret.created_at,
        "updated_at": secret.updated_at,
    });
    if let (Some(value), Some(map)) = (value, json.as_object_mut()) {
        map.insert("value".to_string(), serde_json::Value::from(value));
    }
    json
}

/// Convert multiple secrets to a JSON array.
pub fn secrets_json(secrets: &[Secret]) -> Vec<serde_json::Value> {
    secrets
        .iter()
        .map(|secret| secret_json(secret, None))
        .collect()
}

pub fn report_json(report: &ConsistencyReport) -> anyhow::Result<serde_json::Value> {
    let mut json = serde_json::to_value(report)?;
    if let Some(map) = json.as_object_mut() {
        map.insert(
            "consistent".to_string(),
            serde_json::Value::from(report.is_consistent()),
        );
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn secret() -> Secret {
        let now = Utc::now();
        Secret {
            id: Uuid::new_v4(),
            key: "github".to_string(),
            encrypted_value: "ct-salt-nonce".to_string(),
            website: None,
            notes: Some("personal token".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_secret_json_hides_envelope() {
        let json = secret_json(&secret(), None);
        assert_eq!(json["key"], "github");
        assert!(json.get("encrypted_value").is_none());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_revealed_value_is_included() {
        let json = secret_json(&secret(), Some("tok123"));
        assert_eq!(json["value"], "tok123");
    }

    #[test]
    fn test_report_json_flags_consistency() {
        let json = report_json(&ConsistencyReport::default()).unwrap();
        assert_eq!(json["consistent"], true);
        assert_eq!(json["secrets"], 0);
    }
}
