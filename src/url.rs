// scheme://host[:port][/path][?query]
// Also compiled into build.rs, keep it free of external crates.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub const fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Empty,
    Whitespace,
    MissingScheme,
    UnsupportedScheme,
    MissingHost,
    InvalidHost,
    UserInfo,
    Fragment,
    InvalidPort,
}

/// A parsed `http`/`https` endpoint. Borrowed parts point into the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerUrl<'a> {
    pub scheme: Scheme,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

impl<'a> ServerUrl<'a> {
    pub fn parse(url: &'a str) -> Result<Self, Error> {
        if url.is_empty() {
            return Err(Error::Empty);
        }
        if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::Whitespace);
        }
        if url.contains('#') {
            return Err(Error::Fragment);
        }

        let (scheme, rest) = url.split_once("://").ok_or(Error::MissingScheme)?;
        let scheme = if scheme.eq_ignore_ascii_case("http") {
            Scheme::Http
        } else if scheme.eq_ignore_ascii_case("https") {
            Scheme::Https
        } else {
            return Err(Error::UnsupportedScheme);
        };

        // authority ends at the first '/' or '?'
        let split = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, path) = rest.split_at(split);
        let path = if path.is_empty() { "/" } else { path };

        if authority.contains('@') {
            return Err(Error::UserInfo);
        }
        if authority.is_empty() {
            return Err(Error::MissingHost);
        }

        let (host, port) = match authority.strip_prefix('[') {
            Some(bracketed) => {
                let (host, port) = split_ipv6_literal(bracketed)?;
                if !is_ipv6(host) {
                    return Err(Error::InvalidHost);
                }
                (host, port)
            }
            None => {
                let (host, port) = match authority.rsplit_once(':') {
                    Some((host, port)) => (host, Some(port)),
                    None => (authority, None),
                };
                if host.is_empty() {
                    return Err(Error::MissingHost);
                }
                if !is_valid_host(host) {
                    return Err(Error::InvalidHost);
                }
                (host, port)
            }
        };

        let port = match port {
            Some(port) => parse_port(port)?,
            None => scheme.default_port(),
        };

        Ok(Self {
            scheme,
            host,
            port,
            path,
        })
    }

    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// True when the port is the scheme default and can be left out of a Host header.
    pub fn has_default_port(&self) -> bool {
        self.port == self.scheme.default_port()
    }
}

impl fmt::Display for ServerUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.host.contains(':');
        f.write_str(self.scheme.as_str())?;
        f.write_str("://")?;
        if bracket {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(self.host)?;
        }
        if !self.has_default_port() {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(self.path)
    }
}

// "fd00::1]:8080" -> ("fd00::1", Some("8080"))
fn split_ipv6_literal(rest: &str) -> Result<(&str, Option<&str>), Error> {
    let (host, after) = rest.split_once(']').ok_or(Error::InvalidHost)?;
    match after {
        "" => Ok((host, None)),
        _ => match after.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None => Err(Error::InvalidHost),
        },
    }
}

fn parse_port(port: &str) -> Result<u16, Error> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidPort);
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(Error::InvalidPort),
        Ok(port) => Ok(port),
    }
}

// DNS name or IPv4, IPv6 only comes in brackets
fn is_valid_host(host: &str) -> bool {
    if host.len() > 253 {
        return false;
    }
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return is_ipv4(host);
    }
    host.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn is_ipv4(host: &str) -> bool {
    let mut octets = 0;
    for part in host.split('.') {
        if part.is_empty() || part.len() > 3 || part.parse::<u8>().is_err() {
            return false;
        }
        octets += 1;
    }
    octets == 4
}

// eight 16-bit groups, or fewer around a single "::", with an optional
// dotted-quad tail standing in for the last two
fn is_ipv6(host: &str) -> bool {
    let (head, tail, compressed) = match host.split_once("::") {
        Some((head, tail)) => (head, tail, true),
        None => (host, "", false),
    };
    if tail.contains("::") {
        return false;
    }

    let head_groups = head.split(':').filter(|_| !head.is_empty());
    let tail_groups = tail.split(':').filter(|_| !tail.is_empty());
    let dotted_tail_allowed = !compressed || !tail.is_empty();

    let mut groups = head_groups.chain(tail_groups).peekable();
    let mut count = 0;
    while let Some(group) = groups.next() {
        let last = groups.peek().is_none();
        if last && dotted_tail_allowed && group.contains('.') {
            if !is_ipv4(group) {
                return false;
            }
            count += 2;
        } else if group.is_empty()
            || group.len() > 4
            || !group.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return false;
        } else {
            count += 1;
        }
    }

    if compressed {
        count <= 7
    } else {
        count == 8
    }
}
