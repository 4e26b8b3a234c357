use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use framesync_codec::Frame;
use serde::Serialize;

use crate::hex::to_hex;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: usize,
    protocol: &'a str,
    tag: String,
    length: usize,
    value: String,
}

/// Prints decoded frames as they arrive. Table output is collected and
/// rendered once by [`finish`](Self::finish).
pub struct FramePrinter<'a> {
    format: OutputFormat,
    protocol: &'a str,
    printed: usize,
    table: Option<Table>,
}

impl<'a> FramePrinter<'a> {
    pub fn new(format: OutputFormat, protocol: &'a str) -> Self {
        let table = (format == OutputFormat::Table).then(|| {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "TAG", "LENGTH", "VALUE"]);
            table
        });
        Self {
            format,
            protocol,
            printed: 0,
            table,
        }
    }

    pub fn print(&mut self, frame: &Frame) {
        let index = self.printed;
        self.printed += 1;

        match self.format {
            OutputFormat::Json => {
                let out = FrameOutput {
                    index,
                    protocol: self.protocol,
                    tag: to_hex(&frame.tag),
                    length: frame.length(),
                    value: to_hex(&frame.value),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => {
                if let Some(table) = self.table.as_mut() {
                    table.add_row(vec![
                        index.to_string(),
                        to_hex(&frame.tag),
                        frame.length().to_string(),
                        value_preview(&frame.value),
                    ]);
                }
            }
            OutputFormat::Pretty => {
                println!(
                    "#{index} tag={} length={} value={}",
                    to_hex(&frame.tag),
                    frame.length(),
                    to_hex(&frame.value)
                );
            }
            OutputFormat::Raw => print_raw(&frame.value),
        }
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn finish(self) {
        if let Some(table) = self.table {
            if self.printed > 0 {
                println!("{table}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Hex for short values, elided in the middle for long ones.
fn value_preview(value: &[u8]) -> String {
    const EDGE: usize = 12;
    if value.len() <= EDGE * 2 {
        return to_hex(value);
    }
    format!(
        "{} .. {} ({} bytes)",
        to_hex(&value[..EDGE]),
        to_hex(&value[value.len() - EDGE..]),
        value.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_values() {
        assert_eq!(value_preview(&[0x01, 0x02]), "01 02");
    }

    #[test]
    fn preview_elides_long_values() {
        let value: Vec<u8> = (0..40).collect();
        let preview = value_preview(&value);
        assert!(preview.starts_with("00 01 02"));
        assert!(preview.ends_with("(40 bytes)"));
        assert!(preview.contains(" .. "));
    }

    #[test]
    fn printer_counts_frames() {
        let mut printer = FramePrinter::new(OutputFormat::Table, "marker-tlv");
        printer.print(&Frame::new(vec![0x7E], vec![0x01]));
        printer.print(&Frame::new(vec![0x7E], Vec::new()));
        assert_eq!(printer.printed(), 2);
    }
}
