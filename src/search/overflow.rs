use crate::constants::search::ANY_SEARCH_CAP;

/// Caps the result list of an unrestricted ("any") search. The repository
/// fetches one row past the cap as an overflow probe; when it is present the
/// trailing rows are dropped as-is, with no re-sorting, and the flag tells
/// the caller to render a "narrow your search" notice.
#[must_use]
pub fn apply_cap<T>(wildcard: bool, mut items: Vec<T>) -> (Vec<T>, bool) {
    if wildcard && items.len() > ANY_SEARCH_CAP {
        items.truncate(ANY_SEARCH_CAP);
        (items, true)
    } else {
        (items, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_truncates_to_cap_and_flags() {
        let items: Vec<i64> = (0..51).collect();
        let (capped, truncated) = apply_cap(true, items);
        assert_eq!(capped.len(), 50);
        assert!(truncated);
        // Deterministic: trailing items dropped, head order untouched.
        assert_eq!(capped[0], 0);
        assert_eq!(capped[49], 49);
    }

    #[test]
    fn exactly_cap_is_not_truncated() {
        let items: Vec<i64> = (0..50).collect();
        let (capped, truncated) = apply_cap(true, items);
        assert_eq!(capped.len(), 50);
        assert!(!truncated);
    }

    #[test]
    fn non_wildcard_searches_are_never_capped() {
        let items: Vec<i64> = (0..120).collect();
        let (capped, truncated) = apply_cap(false, items);
        assert_eq!(capped.len(), 120);
        assert!(!truncated);
    }
}
