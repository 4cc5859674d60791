use crate::models::Activity;
use anyhow::{anyhow, Result};

/// Boundary validation for ingested activities. Malformed activities are
/// rejected before they reach the engine.
pub fn validate_activity(activity: &Activity) -> Result<()> {
    if activity.user_id.trim().is_empty() {
        return Err(anyhow!("userId is required"));
    }

    if activity.item_id.trim().is_empty() {
        return Err(anyhow!("itemId is required"));
    }

    if activity.action.trim().is_empty() {
        return Err(anyhow!("action is required"));
    }

    Ok(())
}

/// Validate a full ingest batch, reporting the position of the first
/// malformed activity.
pub fn validate_activities(activities: &[Activity]) -> Result<()> {
    for (i, activity) in activities.iter().enumerate() {
        validate_activity(activity).map_err(|e| anyhow!("activity {}: {}", i, e))?;
    }
    Ok(())
}
