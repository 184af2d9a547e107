pub mod search {

    /// Search term treated as a wildcard: match everything, apply other filters only.
    pub const ANY_TERM: &str = "any";

    /// Sentinel value for job type / experience level meaning "no constraint".
    pub const ALL_SENTINEL: &str = "all";

    /// Prefix marking a location string as coordinate-derived rather than a place name.
    /// Example: `geo:51.5074,-0.1278`
    pub const COORDINATE_PREFIX: &str = "geo:";

    /// Result cap for unrestricted ("any") searches.
    pub const ANY_SEARCH_CAP: usize = 50;

    pub const DEFAULT_RADIUS_MILES: f64 = 10.0;

    pub const MILES_TO_KM: f64 = 1.609_344;

    /// Kilometres per degree of latitude.
    pub const KM_PER_DEGREE_LAT: f64 = 111.0;

    /// Fallback map center when neither the request nor the results carry
    /// coordinates (central London).
    pub const DEFAULT_MAP_CENTER: (f64, f64) = (51.5074, -0.1278);
}

pub mod salary {

    /// Working hours in a year (40h x 52 weeks).
    pub const HOURS_PER_YEAR: f64 = 2080.0;

    /// Working days in a year (5 days x 52 weeks).
    pub const DAYS_PER_YEAR: f64 = 260.0;

    pub const WEEKS_PER_YEAR: f64 = 52.0;

    pub const MONTHS_PER_YEAR: f64 = 12.0;
}

pub mod limits {

    pub const MAX_TITLE_LEN: usize = 120;

    pub const MAX_DESCRIPTION_LEN: usize = 10_000;

    pub const MAX_MESSAGE_LEN: usize = 4_000;

    pub const MAX_REPORT_REASON_LEN: usize = 2_000;

    pub const DEFAULT_LOG_PAGE_SIZE: u64 = 50;
}
