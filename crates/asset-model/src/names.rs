use unicode_normalization::UnicodeNormalization as _;

use crate::ModelError;

/// Maximum length of a worksheet name in characters (Excel-compatible).
pub const EXCEL_SHEET_NAME_MAX_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const INVALID_FILE_STEM_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Case-folded form used for region/category/sheet comparisons.
///
/// Both inputs are normalized with Unicode NFKC and then uppercased, which approximates how Excel
/// compares sheet names.
pub fn name_casefold(name: &str) -> String {
    name.trim().nfkc().flat_map(|c| c.to_uppercase()).collect()
}

pub fn name_eq_case_insensitive(a: &str, b: &str) -> bool {
    a.trim()
        .nfkc()
        .flat_map(|c| c.to_uppercase())
        .eq(b.trim().nfkc().flat_map(|c| c.to_uppercase()))
}

/// Validate a region name for use as a worksheet name.
pub fn validate_sheet_name(name: &str) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidSheetName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("sheet name cannot be empty".to_string()));
    }
    let len = name.chars().count();
    if len > EXCEL_SHEET_NAME_MAX_LEN {
        return Err(invalid(format!(
            "sheet name is too long ({len} > {EXCEL_SHEET_NAME_MAX_LEN})"
        )));
    }
    if let Some(ch) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(invalid(format!("invalid character '{ch}'")));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid("sheet name cannot begin or end with '".to_string()));
    }
    Ok(())
}

/// Validate a category name for use as a workbook file stem.
pub fn validate_category_name(name: &str) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidCategoryName {
        name: name.to_string(),
        reason,
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("category name cannot be empty".to_string()));
    }
    if trimmed != name {
        return Err(invalid("leading or trailing whitespace".to_string()));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(invalid("reserved path component".to_string()));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| INVALID_FILE_STEM_CHARS.contains(c) || c.is_control())
    {
        return Err(invalid(format!("invalid character {ch:?}")));
    }
    Ok(())
}

/// Split an import sheet name of the form `"<category> <2-letter region code>"`.
///
/// Returns the category and, when the last whitespace-separated token is exactly two ASCII
/// letters, the uppercased region code. Otherwise the whole (trimmed) name is the category.
pub fn split_region_suffix(sheet_name: &str) -> (String, Option<String>) {
    let trimmed = sheet_name.trim();
    if let Some((head, tail)) = trimmed.rsplit_once(char::is_whitespace) {
        let head = head.trim_end();
        if !head.is_empty() && tail.len() == 2 && tail.chars().all(|c| c.is_ascii_alphabetic()) {
            return (head.to_string(), Some(tail.to_ascii_uppercase()));
        }
    }
    (trimmed.to_string(), None)
}
