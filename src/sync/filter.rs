use crate::models::{Device, StatusFilter};

/// Devices matching the status filter and the search term, in input order
///
/// The search term is trimmed and matched case-insensitively against the
/// device name; an empty or absent term matches everything.
///
/// # Arguments
/// * `devices` - Latest device snapshot
/// * `status_filter` - Status the devices must have, or `All`
/// * `search_term` - Raw text from the search box
///
/// # Returns
/// Borrowed devices that pass both filters
pub fn apply<'a>(
    devices: &'a [Device],
    status_filter: StatusFilter,
    search_term: Option<&str>,
) -> Vec<&'a Device> {
    let needle = search_term
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());

    devices
        .iter()
        .filter(|d| status_filter.matches(d.status))
        .filter(|d| match &needle {
            Some(needle) => d.device_name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}
