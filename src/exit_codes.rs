//! Process exit codes.
//!
//! Values 64-78 follow BSD `sysexits.h`. Codes from 100 up are specific to
//! this tool so scripts can tell auth, network and server failures apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbExitCode {
    Success = 0,
    /// Bad flags, unknown or ambiguous commands, invalid names.
    UsageError = 64,
    /// Malformed JSON input or unexpected response data.
    DataError = 65,
    /// A local input file could not be read.
    NoInput = 66,
    /// Context, collection, record or backup does not exist.
    NotFound = 67,
    SoftwareError = 70,
    /// Local filesystem failure.
    OSError = 71,
    /// No active context, unreadable configuration.
    ConfigError = 78,
    /// Missing, expired or rejected credentials.
    AuthError = 100,
    /// The server could not be reached.
    NetworkError = 101,
    /// The server answered with an error status.
    ApiError = 102,
}

impl PbExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn message(&self) -> &'static str {
        match self {
            PbExitCode::Success => "Success",
            PbExitCode::UsageError => "Command line usage error",
            PbExitCode::DataError => "Data format error",
            PbExitCode::NoInput => "Cannot open input file",
            PbExitCode::NotFound => "Resource not found",
            PbExitCode::SoftwareError => "Internal software error",
            PbExitCode::OSError => "Operating system error",
            PbExitCode::ConfigError => "Configuration error",
            PbExitCode::AuthError => "Authentication error",
            PbExitCode::NetworkError => "Network communication error",
            PbExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<PbExitCode> for i32 {
    fn from(code: PbExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_sysexits() {
        assert_eq!(PbExitCode::Success.code(), 0);
        assert_eq!(PbExitCode::UsageError.code(), 64);
        assert_eq!(PbExitCode::NotFound.code(), 67);
        assert_eq!(PbExitCode::ConfigError.code(), 78);
        assert_eq!(i32::from(PbExitCode::ApiError), 102);
        assert_eq!(PbExitCode::AuthError.message(), "Authentication error");
    }
}
