//! Human-readable certificate summaries for the trust prompt.

use git2::cert::Cert;
use std::fmt::Write as _;

/// Render what we know about a certificate into `buf`.
///
/// The buffer is reused across callback invocations; it is cleared here
/// rather than reallocated.
pub fn describe_into(buf: &mut String, cert: &Cert<'_>, host: &str) {
    buf.clear();
    let _ = writeln!(buf, "certificate for host '{}':", host);

    if let Some(hostkey) = cert.as_hostkey() {
        if let Some(sha256) = hostkey.hash_sha256() {
            let _ = writeln!(buf, "  SSH SHA256 fingerprint: {}", hex(sha256));
        }
        if let Some(sha1) = hostkey.hash_sha1() {
            let _ = writeln!(buf, "  SSH SHA1 fingerprint:   {}", hex(sha1));
        }
        if hostkey.hash_sha256().is_none() && hostkey.hash_sha1().is_none() {
            let _ = writeln!(buf, "  SSH host key (no fingerprint available)");
        }
    } else if let Some(x509) = cert.as_x509() {
        let data = x509.data();
        let _ = writeln!(buf, "  X.509 certificate, {} bytes DER", data.len());
        let shown = &data[..data.len().min(20)];
        let _ = writeln!(buf, "  leading bytes: {}", hex(shown));
    } else {
        let _ = writeln!(buf, "  unrecognized certificate type");
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_formatting() {
        assert_eq!(hex(&[0xde, 0xad, 0x00]), "de:ad:00");
        assert_eq!(hex(&[]), "");
    }
}
