use std::io::{self, Write};

use alloy::rpc::types::TransactionReceipt;

/// Indented JSON rendering of a receipt.
pub fn render_receipt(receipt: &TransactionReceipt) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(receipt)
}

/// Write a rendered receipt to `out` as-is, followed by a newline.
///
/// The report goes to stdout rather than through the log so that neither
/// the log level nor the JSON log layout can hide or flatten it.
pub fn write_report<W: Write>(out: &mut W, rendered_receipt: &str) -> io::Result<()> {
    writeln!(out, "{}", rendered_receipt)?;
    out.flush()
}
