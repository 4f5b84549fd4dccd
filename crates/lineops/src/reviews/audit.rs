use chrono::{DateTime, Utc};

use super::domain::{
    CategoryResponseInput, EmployeeId, ResponseSnapshot, ReviewResponse, ReviewUpdateRecord,
    UpdateType,
};

/// Capture the mutable fields of a response before it is overwritten.
pub fn snapshot(response: &ReviewResponse) -> ResponseSnapshot {
    ResponseSnapshot {
        rating: response.rating,
        notes: response.notes.clone(),
        photos: response.photos.clone(),
    }
}

fn snapshot_input(input: &CategoryResponseInput) -> ResponseSnapshot {
    ResponseSnapshot {
        rating: input.rating,
        notes: input.notes.clone(),
        photos: input.photos.clone(),
    }
}

/// Build the audit entry for one overwritten response.
///
/// Only overwrites are recorded; first creation is the expected path and
/// produces no entry. An identical resubmission still gets a record; the
/// trail answers "who touched this and when", not "what changed".
pub fn overwrite_record(
    existing: &ReviewResponse,
    incoming: &CategoryResponseInput,
    updated_by: &EmployeeId,
    manager_override: bool,
    recorded_at: DateTime<Utc>,
) -> ReviewUpdateRecord {
    ReviewUpdateRecord {
        instance_id: existing.instance_id.clone(),
        category_id: existing.category_id.clone(),
        updated_by: updated_by.clone(),
        update_type: UpdateType::ResponseUpdated,
        previous_value: snapshot(existing),
        new_value: snapshot_input(incoming),
        manager_override,
        recorded_at,
    }
}
