use hyper::{http::uri::Scheme, Uri};

/// Only absolute `http` or `https` URIs with a host are worth fetching.
pub fn is_fetchable_uri(uri: &Uri) -> bool {
    let scheme = match uri.scheme() {
        Some(scheme) => scheme,
        _ => return false,
    };

    if scheme != &Scheme::HTTPS && scheme != &Scheme::HTTP {
        return false;
    }

    uri.host().is_some_and(|host| !host.is_empty())
}
