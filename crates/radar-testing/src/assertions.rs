//! Assertions over the CLI's JSON output.
//!
//! `Availability` values serialize as `{"state": "...", "data": ...}`.

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert an availability value is in `state` ("pending", "ready" or
/// "unavailable").
pub fn assert_state(value: &Value, state: &str) -> Result<()> {
    let actual = value["state"]
        .as_str()
        .with_context(|| format!("Expected an availability value, got {}", value))?;

    if actual != state {
        anyhow::bail!("Expected state {}, got {} ({})", state, actual, value["data"]);
    }

    Ok(())
}

/// Assert an availability value is ready and return its data.
pub fn assert_ready(value: &Value) -> Result<&Value> {
    assert_state(value, "ready")?;
    Ok(&value["data"])
}

/// Assert a job listing holds exactly these ids, in this order.
pub fn assert_job_ids(json: &Value, expected: &[u64]) -> Result<()> {
    let jobs = json.as_array().context("Expected a JSON array of jobs")?;
    let ids = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| {
            job["id"]
                .as_u64()
                .with_context(|| format!("Job {} has no numeric id", i))
        })
        .collect::<Result<Vec<u64>>>()?;

    if ids != expected {
        anyhow::bail!("Expected jobs {:?}, got {:?}", expected, ids);
    }

    Ok(())
}

/// Assert a `[...]` of strings equals `expected`.
pub fn assert_names(value: &Value, expected: &[&str]) -> Result<()> {
    let names = value
        .as_array()
        .with_context(|| format!("Expected an array of names, got {}", value))?
        .iter()
        .map(|name| name.as_str().context("Expected a string name"))
        .collect::<Result<Vec<&str>>>()?;

    if names != expected {
        anyhow::bail!("Expected {:?}, got {:?}", expected, names);
    }

    Ok(())
}

/// Assert a number field is within 1e-9 of `expected`.
pub fn assert_close(value: &Value, expected: f64) -> Result<()> {
    let actual = value
        .as_f64()
        .with_context(|| format!("Expected a number, got {}", value))?;

    if (actual - expected).abs() > 1e-9 {
        anyhow::bail!("Expected {}, got {}", expected, actual);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_ready_returns_data() {
        let value = json!({"state": "ready", "data": {"items_total": 2}});
        let data = assert_ready(&value).unwrap();
        assert_eq!(data["items_total"], 2);
    }

    #[test]
    fn test_assert_state_rejects_other_state() {
        let value = json!({"state": "unavailable", "data": "job failed"});
        assert!(assert_state(&value, "ready").is_err());
        assert!(assert_state(&value, "unavailable").is_ok());
    }

    #[test]
    fn test_assert_job_ids_checks_order() {
        let value = json!([{"id": 2}, {"id": 1}]);
        assert!(assert_job_ids(&value, &[2, 1]).is_ok());
        assert!(assert_job_ids(&value, &[1, 2]).is_err());
    }
}
