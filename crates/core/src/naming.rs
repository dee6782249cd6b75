//! Archive entry naming for exported videos.
//!
//! Generates deterministic filenames for archive entries based on the
//! job's position in the queue and a sanitized slice of its prompt.

/// Fixed filename for the exported archive.
pub const ARCHIVE_FILENAME: &str = "gemini_videos.zip";

/// Longest prompt slice carried into an entry name.
const PROMPT_NAME_LEN: usize = 30;

/// Generate an archive entry name from a job's queue position and prompt.
///
/// Convention: `{2-digit 1-based index}_{sanitized prompt}.mp4` where the
/// prompt is cut to its first 30 characters and every character outside
/// ASCII alphanumerics becomes an underscore.
///
/// # Examples
///
/// ```
/// use veobatch_core::naming::archive_entry_name;
///
/// assert_eq!(archive_entry_name(0, "A dog, surfing!"), "01_A_dog__surfing_.mp4");
/// assert_eq!(archive_entry_name(11, "short"), "12_short.mp4");
/// ```
pub fn archive_entry_name(index: usize, prompt: &str) -> String {
    let sanitized: String = prompt
        .chars()
        .take(PROMPT_NAME_LEN)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    format!("{:02}_{sanitized}.mp4", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_one_based_and_padded() {
        assert_eq!(archive_entry_name(0, "abc"), "01_abc.mp4");
        assert_eq!(archive_entry_name(9, "abc"), "10_abc.mp4");
    }

    #[test]
    fn non_alphanumerics_become_underscores() {
        assert_eq!(archive_entry_name(0, "a b/c"), "01_a_b_c.mp4");
    }

    #[test]
    fn prompt_is_cut_to_thirty_chars() {
        let prompt = "x".repeat(50);
        assert_eq!(archive_entry_name(0, &prompt), format!("01_{}.mp4", "x".repeat(30)));
    }

    #[test]
    fn indexes_beyond_99_keep_growing() {
        assert_eq!(archive_entry_name(99, "p"), "100_p.mp4");
    }

    #[test]
    fn unicode_is_sanitized_not_split() {
        // Each non-ASCII char maps to one underscore.
        assert_eq!(archive_entry_name(0, "héllo"), "01_h_llo.mp4");
    }
}
