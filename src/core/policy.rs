//! Resource limit policy: requested values raised to configured floors.

/// Effective memory or disk allocation in MB.
pub fn effective(requested: u64, minimum: u64) -> u64 {
    requested.max(minimum)
}

/// Effective open-file ceiling for the run action.
///
/// A request of `0` means the caller left the limit unset, so the run action
/// carries no limit at all rather than the floor.
pub fn file_descriptor_limit(requested: u64, minimum: u64) -> Option<u64> {
    if requested == 0 {
        None
    } else {
        Some(effective(requested, minimum))
    }
}
