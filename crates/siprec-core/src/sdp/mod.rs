//! SDP capture and validation
//!
//! The relay duplicates the call's current media offer into the recording
//! session. Payloads are sanity-checked, not fully parsed: the recording
//! server consumes the offer verbatim, this layer only refuses obvious
//! garbage.

pub mod relay;

pub use relay::{AttachReceipt, SdpRelay};

/// Checks that the first non-empty line is the `v=0` version line.
pub fn has_version_line(sdp: &str) -> bool {
    sdp.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim() == "v=0")
        .unwrap_or(false)
}

/// Checks for at least one media description (`m=` line).
pub fn has_media_description(sdp: &str) -> bool {
    sdp.lines().any(|line| line.starts_with("m="))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = "v=0\r\n\
        o=caller 2890844526 2890844526 IN IP4 10.0.0.1\r\n\
        s=-\r\n\
        c=IN IP4 10.0.0.1\r\n\
        t=0 0\r\n\
        m=audio 49170 RTP/AVP 0\r\n";

    #[test]
    fn accepts_a_normal_offer() {
        assert!(has_version_line(OFFER));
        assert!(has_media_description(OFFER));
    }

    #[test]
    fn version_must_come_first() {
        let shuffled = "m=audio 49170 RTP/AVP 0\r\nv=0\r\n";
        assert!(!has_version_line(shuffled));
    }

    #[test]
    fn rejects_session_without_media() {
        let no_media = "v=0\r\no=caller 1 1 IN IP4 10.0.0.1\r\ns=-\r\n";
        assert!(!has_media_description(no_media));
    }

    #[test]
    fn empty_payload_has_neither() {
        assert!(!has_version_line(""));
        assert!(!has_media_description(""));
    }
}
