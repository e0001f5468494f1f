//! Clipboard helpers
//!
//! Tables are copied as tab-separated text so they paste into spreadsheets.
//! The `arboard` clipboard is created fresh each time to avoid holding
//! resources.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Copy text to the system clipboard
///
/// Common failure cases: no display server (headless Linux), permission denied.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}

/// Join rows of cells: tabs between cells, newlines between rows
pub fn to_tsv<R, C>(rows: R) -> String
where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<str>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.as_ref().replace(['\t', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_flattens_embedded_separators() {
        let rows = vec![vec!["1", "Brake\tpads"], vec!["2", "line\nbreak"]];
        assert_eq!(to_tsv(rows), "1\tBrake pads\n2\tline break");
    }
}
