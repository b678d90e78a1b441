//! Ready-made acceptance predicates.
//!
//! All of them receive [`ABSENT`] when the remote side does not have the
//! channel and only [`accept_missing_or`] and [`accept_any`] accept it.

use netreg_protocol::ABSENT;

pub use netreg_protocol::is_absent;

/// Accept exactly `version`; reject absence.
pub fn accept_exact(version: impl Into<String>) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let version = version.into();
    move |remote| remote == version
}

/// Accept any of `versions`; reject absence.
pub fn accept_one_of<I, S>(versions: I) -> impl Fn(&str) -> bool + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let versions: Vec<String> = versions.into_iter().map(Into::into).collect();
    move |remote| versions.iter().any(|v| v == remote)
}

/// Accept `version`, or the channel missing on the remote side. Suits
/// channels that are optional for the peer.
pub fn accept_missing_or(
    version: impl Into<String>,
) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let version = version.into();
    move |remote| remote == ABSENT || remote == version
}

/// Accept every version, including absence.
pub fn accept_any() -> impl Fn(&str) -> bool + Send + Sync + 'static {
    |_| true
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("1", true)]
    #[case("2", false)]
    #[case(ABSENT, false)]
    fn exact(#[case] remote: &str, #[case] expected: bool) {
        assert_eq!(accept_exact("1")(remote), expected);
    }

    #[rstest]
    #[case("1", true)]
    #[case("2", false)]
    #[case(ABSENT, true)]
    fn missing_or(#[case] remote: &str, #[case] expected: bool) {
        assert_eq!(accept_missing_or("1")(remote), expected);
    }

    #[test]
    fn one_of() {
        let accept = accept_one_of(["1.0", "1.1"]);
        assert!(accept("1.1"));
        assert!(!accept("1.2"));
        assert!(!accept(ABSENT));
    }

    #[test]
    fn any() {
        let accept = accept_any();
        assert!(accept("whatever"));
        assert!(accept(ABSENT));
        assert!(is_absent(ABSENT));
    }
}
