//! Payload assembly and the single-byte text codec used on the wire.

use std::net::Ipv4Addr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::ExecutionRequest;

#[cfg(windows)]
pub const NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
pub const NEWLINE: &str = "\n";

/// How the `enable_attach` line of the debug preamble is rendered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreambleStyle {
    /// Byte-for-byte what existing listeners have always received, including
    /// the unclosed `enable_attach(` call.
    #[default]
    Verbatim,
    /// Closes the `enable_attach(` call.
    Balanced,
}

pub fn debug_preamble(ip: Ipv4Addr, debug_port: u16, style: PreambleStyle) -> String {
    let close = match style {
        PreambleStyle::Verbatim => "",
        PreambleStyle::Balanced => ")",
    };
    format!(
        "import ptvsd{nl}\
         ptvsd.enable_attach(secret='secret', address = ('{ip}', {debug_port}){close}{nl}\
         ptvsd.wait_for_attach(){nl}",
        nl = NEWLINE,
    )
}

/// Preamble (when debugging) followed directly by the payload, no separator.
pub fn build_payload(request: &ExecutionRequest, ip: Ipv4Addr, style: PreambleStyle) -> String {
    if !request.debug.enabled {
        return request.payload.clone();
    }
    let mut text = debug_preamble(ip, request.debug.debug_port, style);
    text.push_str(&request.payload);
    text
}

/// One byte per UTF-16 code unit. Units outside 7-bit ASCII are sent as `?`,
/// so a character outside the BMP (a surrogate pair) becomes `??`. Callers
/// must keep payloads ASCII if the remote script depends on them.
pub fn encode_ascii(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let bytes: Vec<u8> = text
        .encode_utf16()
        .map(|unit| {
            if unit < 0x80 {
                unit as u8
            } else {
                replaced += 1;
                b'?'
            }
        })
        .collect();
    if replaced > 0 {
        warn!("{} non-ASCII code unit(s) in payload sent as '?'", replaced);
    }
    bytes
}

pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_preamble_keeps_unbalanced_paren() {
        let text = debug_preamble(Ipv4Addr::LOCALHOST, 9001, PreambleStyle::Verbatim);
        let expected = format!(
            "import ptvsd{0}ptvsd.enable_attach(secret='secret', address = ('127.0.0.1', 9001){0}ptvsd.wait_for_attach(){0}",
            NEWLINE
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn balanced_preamble_closes_call() {
        let text = debug_preamble(Ipv4Addr::new(192, 168, 1, 7), 5678, PreambleStyle::Balanced);
        assert!(text.contains("address = ('192.168.1.7', 5678))"));
    }

    #[test]
    fn payload_without_debug_is_untouched() {
        let req = ExecutionRequest::new("print(1)");
        let built = build_payload(&req, Ipv4Addr::LOCALHOST, PreambleStyle::Verbatim);
        assert_eq!(built, "print(1)");
    }

    #[test]
    fn payload_follows_preamble_directly() {
        let req = ExecutionRequest::new("print(1)").with_debug(9001);
        let built = build_payload(&req, Ipv4Addr::LOCALHOST, PreambleStyle::Verbatim);
        let expected_tail = format!("ptvsd.wait_for_attach(){}print(1)", NEWLINE);
        assert!(built.starts_with("import ptvsd"));
        assert!(built.ends_with(&expected_tail));
    }

    #[test]
    fn non_ascii_becomes_question_marks() {
        assert_eq!(encode_ascii("a\u{e9}b\u{1F600}"), b"a?b??".to_vec());
        assert_eq!(decode_ascii(&[b'o', 0xC3, 0xA9, b'k']), "o??k");
    }

    #[test]
    fn astral_char_is_two_question_marks() {
        assert_eq!(encode_ascii("a\u{1F600}b"), b"a??b".to_vec());
        assert_eq!(encode_ascii("print('\u{2603}')"), b"print('?')".to_vec());
    }
}
