/// Every stream in the pipeline keys messages by device: the final subject
/// token is the device id, e.g. `device_status.24c14Q2GGmXRT4JL0Gazu0MJ9XI`.
pub fn device_id_from_subject(subject: &str) -> Option<&str> {
    let (_, device_id) = subject.rsplit_once('.')?;
    (!device_id.is_empty()).then_some(device_id)
}

/// Output subject for a device, preserving the key the event arrived with.
pub fn keyed_subject(base: &str, device_id: &str) -> String {
    format!("{base}.{device_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_final_subject_token() {
        assert_eq!(
            device_id_from_subject("device_status.24c14Q2GGmXRT4JL0Gazu0MJ9XI"),
            Some("24c14Q2GGmXRT4JL0Gazu0MJ9XI")
        );
        assert_eq!(
            device_id_from_subject("privacy_fences.deep.dev-1"),
            Some("dev-1")
        );
    }

    #[test]
    fn rejects_subjects_without_a_device_token() {
        assert_eq!(device_id_from_subject("device_status"), None);
        assert_eq!(device_id_from_subject("device_status."), None);
    }

    #[test]
    fn keyed_subject_round_trips_through_extraction() {
        let subject = keyed_subject("device_status_private", "dev-1");

        assert_eq!(subject, "device_status_private.dev-1");
        assert_eq!(device_id_from_subject(&subject), Some("dev-1"));
    }
}
