//! Deep links and in-document anchors for part numbers

use std::collections::{HashMap, HashSet};

use crate::core::report::ReportModel;

/// Percent-encode a part number for use in a URL
///
/// Unreserved characters and `/` pass through; everything else is encoded
/// byte by byte as UTF-8.
pub fn encode_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for byte in part.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Fill a link template with an encoded part number
pub fn part_url(template: &str, part: &str) -> String {
    template.replace("{part}", &encode_part(part))
}

fn slug(part: &str) -> String {
    let mut slug = String::from("part-");
    for c in part.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else {
            slug.push('-');
        }
    }
    slug
}

/// Unique anchor id for every part that has a sheet
///
/// Parts whose slugs collide get a numeric suffix in sheet order.
pub fn sheet_anchors(model: &ReportModel) -> HashMap<String, String> {
    let mut used = HashSet::new();
    let mut anchors = HashMap::new();

    for sheet in &model.part_sheets {
        let base = slug(sheet.part());
        let mut anchor = base.clone();
        let mut n = 2;
        while !used.insert(anchor.clone()) {
            anchor = format!("{}-{}", base, n);
            n += 1;
        }
        anchors.insert(sheet.part().to_string(), anchor);
    }

    anchors
}
