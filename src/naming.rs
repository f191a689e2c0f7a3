//! Sticker file naming: `<prefix>_<id>.<ext>`.
//!
//! The identifier is 8 random lowercase hex characters (32 bits). Two runs
//! colliding is unlikely but not impossible; nothing checks for it.

/// Length of the random identifier in characters.
pub const ID_LEN: usize = 8;

/// Fresh random identifier, e.g. `"3fa9c01e"`.
pub fn sticker_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

/// Build the output file name from its parts.
///
/// ```
/// # use xtickr::naming::sticker_file_name;
/// assert_eq!(
///     sticker_file_name("xtickr_sticker", "0badf00d", "webp"),
///     "xtickr_sticker_0badf00d.webp"
/// );
/// ```
pub fn sticker_file_name(prefix: &str, id: &str, extension: &str) -> String {
    format!("{prefix}_{id}.{extension}")
}

/// Split a sticker file name back into `(prefix, id)`.
///
/// Returns `None` unless the name ends in `_<8 hex chars>.<extension>`.
pub fn parse_sticker_file_name<'a>(name: &'a str, extension: &str) -> Option<(&'a str, &'a str)> {
    let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
    let (prefix, id) = stem.rsplit_once('_')?;
    let valid_id = id.len() == ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    (valid_id && !prefix.is_empty()).then_some((prefix, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_eight_lowercase_hex_chars() {
        for _ in 0..50 {
            let id = sticker_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn ids_differ_between_calls() {
        let ids: std::collections::HashSet<String> = (0..20).map(|_| sticker_id()).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn generated_names_parse_back() {
        let id = sticker_id();
        let name = sticker_file_name("xtickr_sticker", &id, "webp");
        assert_eq!(
            parse_sticker_file_name(&name, "webp"),
            Some(("xtickr_sticker", id.as_str()))
        );
    }

    #[test]
    fn parse_rejects_other_names() {
        assert_eq!(parse_sticker_file_name("xtickr_sticker_1234.webp", "webp"), None);
        assert_eq!(parse_sticker_file_name("xtickr_sticker_0BADF00D.webp", "webp"), None);
        assert_eq!(parse_sticker_file_name("xtickr_sticker_0badf00d.png", "webp"), None);
        assert_eq!(parse_sticker_file_name("_0badf00d.webp", "webp"), None);
    }
}
