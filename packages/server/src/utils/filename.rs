use common::storage::MAX_FILENAME_LEN;

/// Make a user-supplied title or username safe to use as a filename stem.
///
/// Characters outside `[A-Za-z0-9._-]` become `-`, runs of `-` collapse,
/// and leading dots/dashes are stripped. Falls back to `file`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.trim().chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_start_matches(['.', '-']).trim_end_matches('-');
    if slug.is_empty() {
        "file".to_string()
    } else {
        slug.to_string()
    }
}

/// Generated blob filename: `{slug}-{unix_timestamp}.{ext}`. A non-zero
/// `attempt` adds a `-{attempt}` suffix to step around a taken name.
///
/// The slug is shortened so the whole name fits in [`MAX_FILENAME_LEN`]
/// bytes; the timestamp, suffix and extension are always kept.
pub fn image_filename(source: &str, timestamp: i64, attempt: u32, extension: &str) -> String {
    let tail = if attempt == 0 {
        format!("-{timestamp}.{extension}")
    } else {
        format!("-{timestamp}-{attempt}.{extension}")
    };

    let mut slug = slugify(source);
    let budget = MAX_FILENAME_LEN.saturating_sub(tail.len()).max(1);
    if slug.len() > budget {
        let mut cut = budget;
        while !slug.is_char_boundary(cut) {
            cut -= 1;
        }
        slug.truncate(cut);
        let kept = slug.trim_end_matches(['-', '.']).len();
        slug.truncate(kept);
        if slug.is_empty() {
            slug.push_str("file");
        }
    }
    slug + &tail
}
