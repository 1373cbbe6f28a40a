use md5::{Digest, Md5};

/// Lowercase hex MD5 digest of `input`.
///
/// Persistence cookie names, server cookie values, and externalized ACL
/// file names are derived with this function; proxies in the field depend
/// on the exact values, so it must not change.
pub fn md5_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Md5::digest(input.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test", "098f6bcd4621d373cade4e832627b4f6")]
    #[case("cookie_name", "e3cb9741ffde596f46710a5d7e3ec587")]
    #[case("localhost:80", "1c3c2192e2912699ccd31119b162666a")]
    #[case("", "d41d8cd98f00b204e9800998ecf8427e")]
    fn golden_digests(#[case] input: &str, #[case] digest: &str) {
        assert_eq!(md5_hex(input), digest);
    }
}
