/// Decode a PDF string object's bytes.
///
/// UTF-16BE when it carries a byte order mark, otherwise each byte is taken
/// as a Latin-1 code point. Font encodings are not consulted.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}
