use std::{
    borrow::Borrow,
    fmt::{self, Display},
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

#[cfg(test)]
use quickcheck::Arbitrary;

/// A [PeerKey] identifies a probed peer, usually by the string form of its resolved address.
///
/// Keys are stored both in the tracker's registry and in its ranking order, so cloning
/// only bumps a reference count.
#[repr(transparent)]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct PeerKey(Arc<str>);

impl PeerKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PeerKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PeerKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl From<IpAddr> for PeerKey {
    fn from(addr: IpAddr) -> Self {
        Self::from(addr.to_string())
    }
}

impl From<SocketAddr> for PeerKey {
    fn from(addr: SocketAddr) -> Self {
        Self::from(addr.to_string())
    }
}

impl PartialEq<str> for PeerKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for PeerKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
impl Arbitrary for PeerKey {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        PeerKey::from(String::arbitrary(g))
    }
}
