//! Hex text helpers for captures and frame arguments.

/// Uppercase, space-separated hex (`"99 04 22"`).
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Parse hex text. Tokens are separated by whitespace or commas and may carry
/// a `0x` prefix; each token holds one or more whole bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    for token in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || digits.len() % 2 != 0 {
            return Err(format!("odd number of hex digits in {token:?}"));
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).map_err(|_| format!("invalid hex {token:?}"))?;
            let byte =
                u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex {token:?}"))?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}
