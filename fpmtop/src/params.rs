//! FastCGI name/value pairs, restricted to the short form.
//!
//! Each entry is `key_len:u8, value_len:u8, key, value`. Keys or values longer
//! than 255 bytes would need the four-byte length form, which this client does
//! not speak; such entries are skipped rather than reported.

use std::collections::BTreeMap;
use std::io;

use bytes::BufMut;

/// Longest key or value the one-byte length prefix can describe.
pub const MAX_SHORT_LEN: usize = 255;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn encodable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, v)| k.len() <= MAX_SHORT_LEN && v.len() <= MAX_SHORT_LEN)
    }

    /// Number of bytes [`Params::write`] will produce.
    pub fn size(&self) -> usize {
        self.encodable().map(|(k, v)| 2 + k.len() + v.len()).sum()
    }

    /// Append the encoded entries to `buf`.
    pub fn write<B: BufMut>(&self, buf: &mut B) {
        for (key, value) in self.encodable() {
            buf.put_u8(key.len() as u8);
            buf.put_u8(value.len() as u8);
            buf.put_slice(key.as_bytes());
            buf.put_slice(value.as_bytes());
        }
    }

    /// Decode a params payload written with the short length form.
    pub fn decode(mut bytes: &[u8]) -> io::Result<Self> {
        let mut out = Params::new();
        while !bytes.is_empty() {
            if bytes.len() < 2 {
                return Err(truncated());
            }
            let (klen, vlen) = (bytes[0] as usize, bytes[1] as usize);
            bytes = &bytes[2..];
            if bytes.len() < klen + vlen {
                return Err(truncated());
            }
            let key = String::from_utf8_lossy(&bytes[..klen]).into_owned();
            let value = String::from_utf8_lossy(&bytes[klen..klen + vlen]).into_owned();
            out.insert(key, value);
            bytes = &bytes[klen + vlen..];
        }
        Ok(out)
    }
}

fn truncated() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "truncated name/value pair")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut p = Params::new();
        for (k, v) in iter {
            p.insert(k, v);
        }
        p
    }
}
