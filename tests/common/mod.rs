//! Shared fixtures: station tables rendered in the Bureau's layout.

#![allow(dead_code)]

use std::path::Path;

/// Renders rows in the published layout: 16 preamble lines, one line per
/// year with two-space separated values, 3 closing lines.
pub fn render_table(station: &str, rows: &[(i32, [f64; 12])], last_row: Option<&str>) -> String {
    let mut text = String::new();
    text.push_str("<html>\r\n<head>\r\n");
    text.push_str(&format!("<title>{} monthly MSLP</title>\r\n", station));
    text.push_str("</head>\r\n<body>\r\n");
    for i in 0..10 {
        text.push_str(&format!("<!-- preamble {} -->\r\n", i));
    }
    text.push_str("<pre>\r\n");

    for (year, values) in rows {
        text.push_str(&year.to_string());
        for v in values {
            text.push_str(&format!("  {:.1}", v));
        }
        text.push_str("\r\n");
    }
    if let Some(row) = last_row {
        text.push_str(row);
        text.push_str("\r\n");
    }

    text.push_str("</pre>\r\n</body>\r\n</html>\r\n");
    text
}

/// Deterministic, varying pressures for `years`.
pub fn synthetic_rows(years: std::ops::RangeInclusive<i32>, base: f64, a: i32, b: i32) -> Vec<(i32, [f64; 12])> {
    years
        .map(|year| {
            let mut values = [0.0; 12];
            for (m, v) in values.iter_mut().enumerate() {
                let step = (year * a + m as i32 * b).rem_euclid(11) as f64;
                *v = base + step * 0.2;
            }
            (year, values)
        })
        .collect()
}

/// Tahiti and Darwin tables covering the reference period and 2009-2011,
/// with a ragged 2011 row (Oct-Dec not yet published).
pub fn realistic_tables() -> (String, String) {
    let mut tahiti = synthetic_rows(1941..=1980, 1011.0, 7, 3);
    tahiti.extend(synthetic_rows(2009..=2010, 1011.0, 7, 3));
    let mut darwin = synthetic_rows(1941..=1980, 1008.5, 5, 2);
    darwin.extend(synthetic_rows(2009..=2010, 1008.5, 5, 2));

    let tahiti_text = render_table(
        "Tahiti",
        &tahiti,
        Some("2011  1012.1  1011.7  1012.0  1012.6  1013.2  1013.9  1014.3  1014.0  1013.5  *\t*\t*"),
    );
    let darwin_text = render_table(
        "Darwin",
        &darwin,
        Some("2011 1007.9 1008.2 1008.8 1009.6 1010.9 1011.8 1012.1 1011.9 1011.0 *\t*\t*"),
    );
    (tahiti_text, darwin_text)
}

/// Writes both tables where `LocalSource` expects them.
pub fn write_replay_dir(dir: &Path, tahiti: &str, darwin: &str) {
    std::fs::write(dir.join("tahitimslp.html"), tahiti).expect("write tahiti replay");
    std::fs::write(dir.join("darwinmslp.html"), darwin).expect("write darwin replay");
}
