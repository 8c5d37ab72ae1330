//! Option identifiers, named after their libcurl counterparts (without the
//! `CURLOPT_` prefix).

use std::fmt;
use std::str::FromStr;

/// Declaration order is the order the engine applies options in: request
/// method flags first, then the body, then everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptKey {
    HttpGet,
    NoBody,
    Post,
    Upload,
    CustomRequest,
    PostFields,
    HttpPost,
    UploadFile,
    ReturnTransfer,
    BinaryTransfer,
    TransferText,
    HeaderOut,
    Verbose,
    FollowLocation,
    MaxRedirs,
    ConnectTimeout,
    Timeout,
    LowSpeedLimit,
    LowSpeedTime,
    MaxRecvSpeed,
    BufferSize,
    DnsCacheTimeout,
    NoSignal,
    Port,
    Range,
    UserAgent,
    Referer,
    Encoding,
    HttpHeader,
    Cookie,
    CookieFile,
    CookieJar,
    UserPwd,
    Proxy,
    ProxyPort,
    ProxyUserPwd,
    HttpProxyTunnel,
    SslVerifyPeer,
    SslVerifyHost,
    CaInfo,
}

const NAMES: &[(OptKey, &str)] = &[
    (OptKey::HttpGet, "HTTPGET"),
    (OptKey::NoBody, "NOBODY"),
    (OptKey::Post, "POST"),
    (OptKey::Upload, "UPLOAD"),
    (OptKey::CustomRequest, "CUSTOMREQUEST"),
    (OptKey::PostFields, "POSTFIELDS"),
    (OptKey::HttpPost, "HTTPPOST"),
    (OptKey::UploadFile, "UPLOADFILE"),
    (OptKey::ReturnTransfer, "RETURNTRANSFER"),
    (OptKey::BinaryTransfer, "BINARYTRANSFER"),
    (OptKey::TransferText, "TRANSFERTEXT"),
    (OptKey::HeaderOut, "HEADEROUT"),
    (OptKey::Verbose, "VERBOSE"),
    (OptKey::FollowLocation, "FOLLOWLOCATION"),
    (OptKey::MaxRedirs, "MAXREDIRS"),
    (OptKey::ConnectTimeout, "CONNECTTIMEOUT"),
    (OptKey::Timeout, "TIMEOUT"),
    (OptKey::LowSpeedLimit, "LOW_SPEED_LIMIT"),
    (OptKey::LowSpeedTime, "LOW_SPEED_TIME"),
    (OptKey::MaxRecvSpeed, "MAX_RECV_SPEED_LARGE"),
    (OptKey::BufferSize, "BUFFERSIZE"),
    (OptKey::DnsCacheTimeout, "DNS_CACHE_TIMEOUT"),
    (OptKey::NoSignal, "NOSIGNAL"),
    (OptKey::Port, "PORT"),
    (OptKey::Range, "RANGE"),
    (OptKey::UserAgent, "USERAGENT"),
    (OptKey::Referer, "REFERER"),
    (OptKey::Encoding, "ENCODING"),
    (OptKey::HttpHeader, "HTTPHEADER"),
    (OptKey::Cookie, "COOKIE"),
    (OptKey::CookieFile, "COOKIEFILE"),
    (OptKey::CookieJar, "COOKIEJAR"),
    (OptKey::UserPwd, "USERPWD"),
    (OptKey::Proxy, "PROXY"),
    (OptKey::ProxyPort, "PROXYPORT"),
    (OptKey::ProxyUserPwd, "PROXYUSERPWD"),
    (OptKey::HttpProxyTunnel, "HTTPPROXYTUNNEL"),
    (OptKey::SslVerifyPeer, "SSL_VERIFYPEER"),
    (OptKey::SslVerifyHost, "SSL_VERIFYHOST"),
    (OptKey::CaInfo, "CAINFO"),
];

impl OptKey {
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, n)| *n)
            .unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for OptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptKey {
    type Err = String;

    /// Accepts `TIMEOUT`, `timeout` and `CURLOPT_TIMEOUT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("CURLOPT_").unwrap_or(&upper);
        NAMES
            .iter()
            .find(|(_, n)| *n == bare)
            .map(|(k, _)| *k)
            .ok_or_else(|| format!("unknown option: {s}"))
    }
}
