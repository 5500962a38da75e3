/// A known Minecraft Java Edition release, ordered chronologically.
///
/// The set is dense in ordering but deliberately not exhaustive: releases
/// that changed nothing we speak (and a few that were superseded within
/// days, like 1.21.2) are absent, and resolve to a neighbor via
/// [`Version::from_release_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Version {
    V1_7_2,
    V1_7_6,
    V1_8,
    V1_9,
    V1_9_1,
    V1_9_2,
    V1_9_4,
    V1_10,
    V1_11,
    V1_11_1,
    V1_12,
    V1_12_1,
    V1_12_2,
    V1_13,
    V1_13_1,
    V1_13_2,
    V1_14,
    V1_14_1,
    V1_14_2,
    V1_14_3,
    V1_14_4,
    V1_15,
    V1_15_1,
    V1_15_2,
    V1_16,
    V1_16_1,
    V1_16_2,
    V1_16_3,
    V1_16_4,
    V1_17,
    V1_17_1,
    V1_18,
    V1_18_2,
    V1_19,
    V1_19_2,
    V1_19_3,
    V1_19_4,
    V1_20,
    V1_20_2,
    V1_20_4,
    V1_20_5,
    V1_20_6,
    V1_21,
    V1_21_1,
    V1_21_3,
    V1_21_4,
    V1_21_5,
    V1_21_6,
    V1_21_7,
    V1_21_8,
}

use Version::*;

impl Version {
    pub const FIRST: Version = V1_7_2;
    pub const LATEST: Version = V1_21_8;

    /// Every known version, oldest first.
    pub const ALL: &'static [Version] = &[
        V1_7_2, V1_7_6, V1_8, V1_9, V1_9_1, V1_9_2, V1_9_4, V1_10, V1_11, V1_11_1, V1_12,
        V1_12_1, V1_12_2, V1_13, V1_13_1, V1_13_2, V1_14, V1_14_1, V1_14_2, V1_14_3, V1_14_4,
        V1_15, V1_15_1, V1_15_2, V1_16, V1_16_1, V1_16_2, V1_16_3, V1_16_4, V1_17, V1_17_1,
        V1_18, V1_18_2, V1_19, V1_19_2, V1_19_3, V1_19_4, V1_20, V1_20_2, V1_20_4, V1_20_5,
        V1_20_6, V1_21, V1_21_1, V1_21_3, V1_21_4, V1_21_5, V1_21_6, V1_21_7, V1_21_8,
    ];

    /// The numeric protocol id sent in the Handshake packet.
    pub fn protocol(self) -> i32 {
        match self {
            V1_7_2 => 4,
            V1_7_6 => 5,
            V1_8 => 47,
            V1_9 => 107,
            V1_9_1 => 108,
            V1_9_2 => 109,
            V1_9_4 => 110,
            V1_10 => 210,
            V1_11 => 315,
            V1_11_1 => 316,
            V1_12 => 335,
            V1_12_1 => 338,
            V1_12_2 => 340,
            V1_13 => 393,
            V1_13_1 => 401,
            V1_13_2 => 404,
            V1_14 => 477,
            V1_14_1 => 480,
            V1_14_2 => 485,
            V1_14_3 => 490,
            V1_14_4 => 498,
            V1_15 => 573,
            V1_15_1 => 575,
            V1_15_2 => 578,
            V1_16 => 735,
            V1_16_1 => 736,
            V1_16_2 => 751,
            V1_16_3 => 753,
            V1_16_4 => 754,
            V1_17 => 755,
            V1_17_1 => 756,
            V1_18 => 757,
            V1_18_2 => 758,
            V1_19 => 759,
            V1_19_2 => 760,
            V1_19_3 => 761,
            V1_19_4 => 762,
            V1_20 => 763,
            V1_20_2 => 764,
            V1_20_4 => 765,
            V1_20_5 => 766,
            V1_20_6 => 766,
            V1_21 => 767,
            V1_21_1 => 767,
            V1_21_3 => 768,
            V1_21_4 => 769,
            V1_21_5 => 770,
            V1_21_6 => 771,
            V1_21_7 => 772,
            V1_21_8 => 772,
        }
    }

    /// The canonical release string, e.g. `"1.21.8"`.
    pub fn name(self) -> &'static str {
        match self {
            V1_7_2 => "1.7.2",
            V1_7_6 => "1.7.6",
            V1_8 => "1.8",
            V1_9 => "1.9",
            V1_9_1 => "1.9.1",
            V1_9_2 => "1.9.2",
            V1_9_4 => "1.9.4",
            V1_10 => "1.10",
            V1_11 => "1.11",
            V1_11_1 => "1.11.1",
            V1_12 => "1.12",
            V1_12_1 => "1.12.1",
            V1_12_2 => "1.12.2",
            V1_13 => "1.13",
            V1_13_1 => "1.13.1",
            V1_13_2 => "1.13.2",
            V1_14 => "1.14",
            V1_14_1 => "1.14.1",
            V1_14_2 => "1.14.2",
            V1_14_3 => "1.14.3",
            V1_14_4 => "1.14.4",
            V1_15 => "1.15",
            V1_15_1 => "1.15.1",
            V1_15_2 => "1.15.2",
            V1_16 => "1.16",
            V1_16_1 => "1.16.1",
            V1_16_2 => "1.16.2",
            V1_16_3 => "1.16.3",
            V1_16_4 => "1.16.4",
            V1_17 => "1.17",
            V1_17_1 => "1.17.1",
            V1_18 => "1.18",
            V1_18_2 => "1.18.2",
            V1_19 => "1.19",
            V1_19_2 => "1.19.2",
            V1_19_3 => "1.19.3",
            V1_19_4 => "1.19.4",
            V1_20 => "1.20",
            V1_20_2 => "1.20.2",
            V1_20_4 => "1.20.4",
            V1_20_5 => "1.20.5",
            V1_20_6 => "1.20.6",
            V1_21 => "1.21",
            V1_21_1 => "1.21.1",
            V1_21_3 => "1.21.3",
            V1_21_4 => "1.21.4",
            V1_21_5 => "1.21.5",
            V1_21_6 => "1.21.6",
            V1_21_7 => "1.21.7",
            V1_21_8 => "1.21.8",
        }
    }

    /// The next-older known version, or `None` at [`Version::FIRST`].
    pub fn prev(self) -> Option<Version> {
        let idx = self as usize;
        if idx == 0 {
            None
        } else {
            Some(Version::ALL[idx - 1])
        }
    }

    /// Resolve a user-supplied release string to a known version.
    ///
    /// An exact canonical-string match wins. Otherwise the string is parsed
    /// as `major.minor[.patch]` and matched against the known family: with
    /// no patch given, the newest patch wins; with a patch `p`, the newest
    /// patch `q <= p` wins, falling back to the newest available when `p`
    /// is newer than anything known. Snapshot strings (`"25w37a"`) and
    /// unknown families yield `None`.
    pub fn from_release_str(s: &str) -> Option<Version> {
        if let Some(&v) = Version::ALL.iter().find(|v| v.name() == s) {
            return Some(v);
        }

        let (major, minor, patch, has_patch) = parse_release(s)?;

        let mut best: Option<(u32, Version)> = None;
        for &candidate in Version::ALL {
            let (c_major, c_minor, c_patch, _) =
                parse_release(candidate.name()).expect("canonical names always parse");
            if c_major != major || c_minor != minor {
                continue;
            }
            if has_patch && c_patch > patch {
                continue;
            }
            if best.map_or(true, |(b, _)| c_patch > b) {
                best = Some((c_patch, candidate));
            }
        }

        match best {
            Some((_, v)) => Some(v),
            // Every known patch is newer than the requested one; fall back
            // to the newest in the family.
            None if has_patch => Version::from_release_str(&format!("{}.{}", major, minor)),
            None => None,
        }
    }
}

fn parse_release(s: &str) -> Option<(u32, u32, u32, bool)> {
    let mut parts = s.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    let (patch, has_patch) = match parts.next() {
        Some(p) => (p.parse().ok()?, true),
        None => (0, false),
    };
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch, has_patch))
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Version {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::from_release_str(s).ok_or_else(|| UnknownVersion(s.to_string()))
    }
}

/// Error for release strings that resolve to no known version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVersion(pub String);

impl std::fmt::Display for UnknownVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown Minecraft version: {}", self.0)
    }
}

impl std::error::Error for UnknownVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_release_chronology() {
        assert!(V1_7_2 < V1_8);
        assert!(V1_12_2 < V1_13);
        assert!(V1_19_2 < V1_19_3);
        assert!(V1_20_6 < V1_21);
        assert!(Version::FIRST < Version::LATEST);
    }

    #[test]
    fn test_exact_lookup_for_every_known_version() {
        for &v in Version::ALL {
            assert_eq!(Version::from_release_str(v.name()), Some(v), "{}", v);
        }
    }

    #[test]
    fn test_fallback_future_patch() {
        assert_eq!(Version::from_release_str("1.21.9"), Some(V1_21_8));
    }

    #[test]
    fn test_fallback_nearest_lower_patch() {
        // 1.21.2 is not a known release; the newest 1.21.x patch <= 2 wins.
        assert_eq!(Version::from_release_str("1.21.2"), Some(V1_21_1));
    }

    #[test]
    fn test_fallback_missing_patch_picks_newest() {
        assert_eq!(Version::from_release_str("1.21"), Some(V1_21));
        assert_eq!(Version::from_release_str("1.16.5"), Some(V1_16_4));
        assert_eq!(Version::from_release_str("1.18.1"), Some(V1_18));
    }

    #[test]
    fn test_reject_non_release_strings() {
        assert_eq!(Version::from_release_str("25w37a"), None);
        assert_eq!(Version::from_release_str("2.0"), None);
        assert_eq!(Version::from_release_str("1"), None);
        assert_eq!(Version::from_release_str("1.19.2.1"), None);
        assert_eq!(Version::from_release_str(""), None);
    }

    #[test]
    fn test_prev_walks_to_first() {
        let mut v = Version::LATEST;
        let mut hops = 0;
        while let Some(p) = v.prev() {
            assert!(p < v);
            v = p;
            hops += 1;
        }
        assert_eq!(v, Version::FIRST);
        assert_eq!(hops, Version::ALL.len() - 1);
    }

    #[test]
    fn test_protocol_ids_monotonic_per_family() {
        // Shared protocol ids exist (1.20.5/1.20.6), but ids never decrease.
        for pair in Version::ALL.windows(2) {
            assert!(pair[0].protocol() <= pair[1].protocol());
        }
    }
}
