// File: ./src/clipboard.rs
use anyhow::Result;

#[cfg(feature = "clipboard")]
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())?;
    log::debug!("event=clipboard_copy bytes={}", text.len());
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
pub fn copy(_text: &str) -> Result<()> {
    anyhow::bail!("clipboard support not compiled in (enable the `clipboard` feature)")
}
