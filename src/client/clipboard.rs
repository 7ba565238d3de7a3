use base64::{ engine::general_purpose::STANDARD, Engine };
use std::io::{ self, Write };

pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> io::Result<()>;
}

/// Sets the system clipboard through the terminal with an OSC 52 sequence.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_base64_payload() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.copy("hi").unwrap();
        assert_eq!(clipboard.out, b"\x1b]52;c;aGk=\x07");
    }
}
