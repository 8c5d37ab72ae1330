//! Transfer outcome codes and their libcurl names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one transfer. Code 0 is success; everything else is a failure
/// that is still delivered to the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub code: u32,
    pub name: String,
}

pub const OK: u32 = 0;
pub const FAILED_INIT: u32 = 2;
pub const WRITE_ERROR: u32 = 23;
pub const READ_ERROR: u32 = 26;

const NAMES: &[(u32, &str)] = &[
    (0, "CURLE_OK"),
    (1, "CURLE_UNSUPPORTED_PROTOCOL"),
    (2, "CURLE_FAILED_INIT"),
    (3, "CURLE_URL_MALFORMAT"),
    (4, "CURLE_NOT_BUILT_IN"),
    (5, "CURLE_COULDNT_RESOLVE_PROXY"),
    (6, "CURLE_COULDNT_RESOLVE_HOST"),
    (7, "CURLE_COULDNT_CONNECT"),
    (8, "CURLE_WEIRD_SERVER_REPLY"),
    (9, "CURLE_REMOTE_ACCESS_DENIED"),
    (10, "CURLE_FTP_ACCEPT_FAILED"),
    (11, "CURLE_FTP_WEIRD_PASS_REPLY"),
    (12, "CURLE_FTP_ACCEPT_TIMEOUT"),
    (13, "CURLE_FTP_WEIRD_PASV_REPLY"),
    (14, "CURLE_FTP_WEIRD_227_FORMAT"),
    (15, "CURLE_FTP_CANT_GET_HOST"),
    (16, "CURLE_HTTP2"),
    (17, "CURLE_FTP_COULDNT_SET_TYPE"),
    (18, "CURLE_PARTIAL_FILE"),
    (19, "CURLE_FTP_COULDNT_RETR_FILE"),
    (21, "CURLE_QUOTE_ERROR"),
    (22, "CURLE_HTTP_RETURNED_ERROR"),
    (23, "CURLE_WRITE_ERROR"),
    (25, "CURLE_UPLOAD_FAILED"),
    (26, "CURLE_READ_ERROR"),
    (27, "CURLE_OUT_OF_MEMORY"),
    (28, "CURLE_OPERATION_TIMEDOUT"),
    (30, "CURLE_FTP_PORT_FAILED"),
    (31, "CURLE_FTP_COULDNT_USE_REST"),
    (33, "CURLE_RANGE_ERROR"),
    (34, "CURLE_HTTP_POST_ERROR"),
    (35, "CURLE_SSL_CONNECT_ERROR"),
    (36, "CURLE_BAD_DOWNLOAD_RESUME"),
    (37, "CURLE_FILE_COULDNT_READ_FILE"),
    (38, "CURLE_LDAP_CANNOT_BIND"),
    (39, "CURLE_LDAP_SEARCH_FAILED"),
    (42, "CURLE_ABORTED_BY_CALLBACK"),
    (43, "CURLE_BAD_FUNCTION_ARGUMENT"),
    (45, "CURLE_INTERFACE_FAILED"),
    (47, "CURLE_TOO_MANY_REDIRECTS"),
    (48, "CURLE_UNKNOWN_OPTION"),
    (49, "CURLE_SETOPT_OPTION_SYNTAX"),
    (52, "CURLE_GOT_NOTHING"),
    (53, "CURLE_SSL_ENGINE_NOTFOUND"),
    (54, "CURLE_SSL_ENGINE_SETFAILED"),
    (55, "CURLE_SEND_ERROR"),
    (56, "CURLE_RECV_ERROR"),
    (58, "CURLE_SSL_CERTPROBLEM"),
    (59, "CURLE_SSL_CIPHER"),
    (60, "CURLE_PEER_FAILED_VERIFICATION"),
    (61, "CURLE_BAD_CONTENT_ENCODING"),
    (63, "CURLE_FILESIZE_EXCEEDED"),
    (64, "CURLE_USE_SSL_FAILED"),
    (65, "CURLE_SEND_FAIL_REWIND"),
    (66, "CURLE_SSL_ENGINE_INITFAILED"),
    (67, "CURLE_LOGIN_DENIED"),
    (68, "CURLE_TFTP_NOTFOUND"),
    (69, "CURLE_TFTP_PERM"),
    (70, "CURLE_REMOTE_DISK_FULL"),
    (71, "CURLE_TFTP_ILLEGAL"),
    (72, "CURLE_TFTP_UNKNOWNID"),
    (73, "CURLE_REMOTE_FILE_EXISTS"),
    (74, "CURLE_TFTP_NOSUCHUSER"),
    (77, "CURLE_SSL_CACERT_BADFILE"),
    (78, "CURLE_REMOTE_FILE_NOT_FOUND"),
    (79, "CURLE_SSH"),
    (80, "CURLE_SSL_SHUTDOWN_FAILED"),
    (81, "CURLE_AGAIN"),
    (82, "CURLE_SSL_CRL_BADFILE"),
    (83, "CURLE_SSL_ISSUER_ERROR"),
    (84, "CURLE_FTP_PRET_FAILED"),
    (85, "CURLE_RTSP_CSEQ_ERROR"),
    (86, "CURLE_RTSP_SESSION_ERROR"),
    (87, "CURLE_FTP_BAD_FILE_LIST"),
    (88, "CURLE_CHUNK_FAILED"),
    (89, "CURLE_NO_CONNECTION_AVAILABLE"),
    (90, "CURLE_SSL_PINNEDPUBKEYNOTMATCH"),
    (91, "CURLE_SSL_INVALIDCERTSTATUS"),
    (92, "CURLE_HTTP2_STREAM"),
    (93, "CURLE_RECURSIVE_API_CALL"),
    (94, "CURLE_AUTH_ERROR"),
    (95, "CURLE_HTTP3"),
    (96, "CURLE_QUIC_CONNECT_ERROR"),
    (97, "CURLE_PROXY"),
    (98, "CURLE_SSL_CLIENTCERT"),
    (99, "CURLE_UNRECOVERABLE_POLL"),
];

/// libcurl name for `code`, `CURLE_UNKNOWN` outside the table.
pub fn code_name(code: u32) -> &'static str {
    NAMES
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|i| NAMES[i].1)
        .unwrap_or("CURLE_UNKNOWN")
}

impl Outcome {
    pub fn from_code(code: u32) -> Self {
        Self {
            code,
            name: code_name(code).to_string(),
        }
    }

    pub fn ok() -> Self {
        Self::from_code(OK)
    }

    /// Download sink could not be written.
    pub fn write_error() -> Self {
        Self::from_code(WRITE_ERROR)
    }

    /// Transfer could not be started at all.
    pub fn failed_init() -> Self {
        Self::from_code(FAILED_INIT)
    }

    /// Upload source could not be read.
    pub fn read_error() -> Self {
        Self::from_code(READ_ERROR)
    }

    pub fn is_ok(&self) -> bool {
        self.code == OK
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
