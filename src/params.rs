//! Path parameters bound by the router.

use crate::request::Request;

/// Ordered key/value bindings for the named (`:id`) and catch-all (`*rest`)
/// segments of the pattern a request matched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Value of the first binding named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'k, 'v> From<matchit::Params<'k, 'v>> for Params {
    fn from(params: matchit::Params<'k, 'v>) -> Self {
        params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The path parameters the router attached to `req`.
///
/// Never fails: a request that matched a pattern without parameters, or that
/// never went through a router, yields an empty [`Params`].
pub fn params(req: &Request) -> &Params {
    req.params()
}
