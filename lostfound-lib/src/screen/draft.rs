use lostfound_proto::{dto::DeviceDraft, is_valid_latitude, is_valid_longitude};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error("Device name is required")]
    MissingName,
    #[error("Latitude must be between -90 and 90")]
    InvalidLatitude,
    #[error("Longitude must be between -180 and 180")]
    InvalidLongitude,
}

fn normalize(text: &Option<String>) -> Option<String> {
    text.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Checks a draft the way the registry would and returns it trimmed, with blank
/// optional fields dropped.
pub fn validate_draft(draft: &DeviceDraft) -> Result<DeviceDraft, DraftError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(DraftError::MissingName);
    }
    if draft.latitude.is_some_and(|lat| !is_valid_latitude(lat)) {
        return Err(DraftError::InvalidLatitude);
    }
    if draft.longitude.is_some_and(|lon| !is_valid_longitude(lon)) {
        return Err(DraftError::InvalidLongitude);
    }
    Ok(DeviceDraft {
        name: name.to_owned(),
        description: normalize(&draft.description),
        category: normalize(&draft.category),
        location: normalize(&draft.location),
        status: draft.status,
        latitude: draft.latitude,
        longitude: draft.longitude,
    })
}

/// Like [`validate_draft`], but blank text fields are kept as empty strings. The
/// registry only overwrites the fields present in an edit, so an omitted field would
/// keep its old value.
pub fn validate_edit(draft: &DeviceDraft) -> Result<DeviceDraft, DraftError> {
    let draft = validate_draft(draft)?;
    let cleared = |text: Option<String>| Some(text.unwrap_or_default());
    Ok(DeviceDraft {
        description: cleared(draft.description),
        category: cleared(draft.category),
        location: cleared(draft.location),
        ..draft
    })
}

#[cfg(test)]
mod tests {
    use lostfound_proto::dto::DeviceDraft;

    use super::{validate_draft, validate_edit, DraftError};

    #[test]
    fn test_name_required() {
        assert_eq!(
            Err(DraftError::MissingName),
            validate_draft(&DeviceDraft::new("   "))
        );
    }

    #[test]
    fn test_coordinate_ranges() {
        let mut draft = DeviceDraft::new("Phone");
        draft.latitude = Some(91.0);
        assert_eq!(Err(DraftError::InvalidLatitude), validate_draft(&draft));

        draft.latitude = Some(-90.0);
        draft.longitude = Some(180.5);
        assert_eq!(Err(DraftError::InvalidLongitude), validate_draft(&draft));
    }

    #[test]
    fn test_normalized() {
        let mut draft = DeviceDraft::new("  Phone ");
        draft.category = Some(" ".to_owned());
        draft.location = Some(" Central Station ".to_owned());
        let draft = validate_draft(&draft).unwrap();
        assert_eq!("Phone", draft.name);
        assert_eq!(None, draft.category);
        assert_eq!(Some("Central Station".to_owned()), draft.location);
    }

    #[test]
    fn test_edit_sends_cleared_fields() {
        let mut draft = DeviceDraft::new("Phone");
        draft.description = Some("".to_owned());
        draft.category = Some("  ".to_owned());
        draft.location = Some(" Central Station ".to_owned());

        let body = serde_json::to_value(validate_edit(&draft).unwrap()).unwrap();
        assert_eq!("", body["description"]);
        assert_eq!("", body["category"]);
        assert_eq!("Central Station", body["location"]);

        draft.location = None;
        let body = serde_json::to_value(validate_edit(&draft).unwrap()).unwrap();
        assert_eq!("", body["location"]);
        assert!(body["latitude"].is_null());

        assert_eq!(
            Err(DraftError::MissingName),
            validate_edit(&DeviceDraft::new(""))
        );
    }
}
