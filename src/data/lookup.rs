//! Fixed lookup tables used while cleaning the income-stratified source.

/// Income bracket label that marks the territories aggregate rows.
pub const TERRITORIES_BRACKET: &str = "Territories";

/// USPS 2-letter code to full state name (50 states, no DC or territories).
const USPS_STATES: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Income bracket label to representative midpoint in USD.
pub const INCOME_BRACKETS: [(&str, f64); 5] = [
    ("< $15,000", 7500.0),
    ("$15,000\u{2013}<$25,000", 20000.0),
    ("$25,000\u{2013}<$50,000", 37500.0),
    ("$50,000\u{2013}<$75,000", 62500.0),
    (">=$75,000", 87500.0),
];

/// Map a USPS code to the full state name.
pub fn state_name(code: &str) -> Option<&'static str> {
    USPS_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Map an income bracket label to its midpoint.
pub fn income_midpoint(bracket: &str) -> Option<f64> {
    INCOME_BRACKETS
        .iter()
        .find(|(label, _)| *label == bracket)
        .map(|(_, mid)| *mid)
}
