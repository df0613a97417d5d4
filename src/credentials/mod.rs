//! Vendor credential encodings: Cisco type 7 and the Brocade NetIron SNMP
//! community cipher.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{HelperError, Result};

const CISCO_TYPE7_KEY: &[u8] = b"dsfd;kfoA,.iyewrkldJKDHSUBsgvca69834ncxv9873254k;fg87";

/// Salt used when rendering device configs
const CISCO_TYPE7_DEFAULT_SALT: u8 = 1;

/// Substitution table for NetIron `snmp-server community` strings.
/// Not a bijection: both 'H' and '5' encode to '0'.
static NETIRON_SNMP_TABLE: &[(char, char)] = &[
    ('a', '!'), ('b', '2'), ('c', 'd'), ('d', '@'), ('e', 'n'), ('f', 'G'), ('g', '"'), ('h', 'b'),
    ('i', '='), ('j', '?'), ('k', 'D'), ('l', '^'), ('m', '6'), ('n', 'g'), ('o', 's'), ('p', 'S'),
    ('q', 'R'), ('r', 'U'), ('s', '-'), ('t', 'o'), ('u', 'i'), ('v', 'r'), ('w', '+'), ('x', 'C'),
    ('y', '\\'), ('z', 'x'), ('A', 'q'), ('B', 'L'), ('C', 'B'), ('D', ':'), ('E', 'f'), ('F', 'w'),
    ('G', '9'), ('H', '0'), ('I', '\''), ('J', 'c'), ('K', 'h'), ('L', '#'), ('M', 'k'), ('N', 't'),
    ('O', ','), ('P', '5'), ('Q', '_'), ('R', 'P'), ('S', '%'), ('T', 'l'), ('U', 'K'), ('V', ']'),
    ('W', 'a'), ('X', 'E'), ('Y', '*'), ('Z', '('), ('0', 'Q'), ('1', 'Z'), ('2', '|'), ('3', '8'),
    ('4', '3'), ('5', '0'), ('6', 'm'), ('7', 'Y'), ('8', 'W'), ('9', '{'), ('!', 'V'), ('"', 'F'),
    ('#', 'I'), ('$', '4'), ('%', 'u'), ('&', '>'), ('\'', 'N'), ('(', 'p'), (')', 'z'), ('*', 'X'),
    ('+', 'e'), (',', 'T'), ('-', 'M'), ('.', '&'), ('/', ')'), (':', 'y'), (';', ';'), ('<', '`'),
    ('=', '$'), ('>', 'v'), ('@', '1'), ('[', '7'), (']', '~'), ('\\', 'H'), ('^', '<'), ('_', '}'),
    ('`', '/'), ('{', '.'), ('}', 'j'), ('~', '['),
];

/// Cisco type 7 hash of `password` with the default salt
pub fn encrypt_cisco_type7(password: &str) -> String {
    cisco_type7_with_key_offset(password, CISCO_TYPE7_DEFAULT_SALT)
}

/// Cisco type 7 hash with an explicit salt (0..=52)
pub fn encrypt_cisco_type7_with_salt(password: &str, salt: u8) -> Result<String> {
    if usize::from(salt) >= CISCO_TYPE7_KEY.len() {
        return Err(HelperError::InvalidCredential(format!(
            "type 7 salt {} out of range 0-{}",
            salt,
            CISCO_TYPE7_KEY.len() - 1
        )));
    }
    Ok(cisco_type7_with_key_offset(password, salt))
}

fn cisco_type7_with_key_offset(password: &str, salt: u8) -> String {
    let mut hash = format!("{:02}", salt);
    for (byte, key) in password.bytes().zip(type7_key_stream(salt)) {
        hash.push_str(&format!("{:02X}", byte ^ key));
    }
    hash
}

fn type7_key_stream(salt: u8) -> impl Iterator<Item = u8> {
    CISCO_TYPE7_KEY
        .iter()
        .copied()
        .cycle()
        .skip(usize::from(salt) % CISCO_TYPE7_KEY.len())
}

/// Recover the plain text of a Cisco type 7 hash
pub fn decrypt_cisco_type7(hash: &str) -> Result<String> {
    let invalid = |reason: &str| HelperError::InvalidCredential(format!("type 7 hash: {}", reason));

    if hash.len() < 2 || hash.len() % 2 != 0 || !hash.is_ascii() {
        return Err(invalid("expected two salt digits followed by hex pairs"));
    }
    let (salt, body) = hash.split_at(2);
    let salt: u8 = salt.parse().map_err(|_| invalid("salt is not decimal"))?;
    if usize::from(salt) >= CISCO_TYPE7_KEY.len() {
        return Err(invalid("salt out of range"));
    }

    let mut plain = Vec::with_capacity(body.len() / 2);
    for (index, key) in (0..body.len()).step_by(2).zip(type7_key_stream(salt)) {
        let byte = u8::from_str_radix(&body[index..index + 2], 16)
            .map_err(|_| invalid("body is not hex"))?;
        plain.push(byte ^ key);
    }

    String::from_utf8(plain).map_err(|_| invalid("decoded text is not UTF-8"))
}

/// Encode an SNMP community the way NetIron stores it: substitute each
/// character, base64 the result and prefix `$`.
pub fn encrypt_netiron_snmp(community: &str) -> Result<String> {
    let mut cipher = String::with_capacity(community.len());
    for ch in community.chars() {
        let Some((_, substitute)) = NETIRON_SNMP_TABLE.iter().find(|(plain, _)| *plain == ch) else {
            return Err(HelperError::InvalidCredential(format!(
                "character '{}' cannot be used in a NetIron community",
                ch
            )));
        };
        cipher.push(*substitute);
    }

    Ok(format!("${}", STANDARD.encode(cipher.as_bytes())))
}

/// Decode a NetIron `$`-prefixed community string
pub fn decrypt_netiron_snmp(encoded: &str) -> Result<String> {
    let body = encoded.strip_prefix('$').ok_or_else(|| {
        HelperError::InvalidCredential("NetIron community must start with '$'".to_string())
    })?;
    let bytes = STANDARD
        .decode(body)
        .map_err(|e| HelperError::InvalidCredential(format!("NetIron community: {}", e)))?;
    let cipher = String::from_utf8(bytes).map_err(|_| {
        HelperError::InvalidCredential("NetIron community is not UTF-8".to_string())
    })?;

    let mut plain = String::with_capacity(cipher.len());
    for ch in cipher.chars() {
        let mut candidates = NETIRON_SNMP_TABLE.iter().filter(|(_, encoded)| *encoded == ch);
        match (candidates.next(), candidates.next()) {
            (Some((original, _)), None) => plain.push(*original),
            (Some(_), Some(_)) => {
                return Err(HelperError::InvalidCredential(format!(
                    "NetIron cipher character '{}' is ambiguous",
                    ch
                )))
            }
            _ => {
                return Err(HelperError::InvalidCredential(format!(
                    "unknown NetIron cipher character '{}'",
                    ch
                )))
            }
        }
    }

    Ok(plain)
}
