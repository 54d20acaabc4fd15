use std::error::Error;

use bigdecimal::ParseBigDecimalError;
use config::ConfigError;
use rusoto_ce::GetCostAndUsageError;
use rusoto_core::RusotoError;
use rusoto_s3::{GetObjectError, ListObjectsV2Error, PutObjectError};
use rusoto_sns::PublishError;
use rusoto_sts::GetCallerIdentityError;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CostReportError {
    NoneValue,
    ToPrimitive,
    InvalidDate,
    InvalidUtcOffset(i32),
    Config(ConfigError),
    MissingConfig(String),
    InvalidConfig { key: String, reason: String },
    NoReportFound(String),
    MissingMetric(String),
    InvalidAmount(ParseBigDecimalError),
    InvalidTimestamp(chrono::ParseError),
    Json(serde_json::Error),
    ReadBody(std::io::Error),
    Timeout(&'static str),
    GetCostAndUsageError(RusotoError<GetCostAndUsageError>),
    PutObjectError(RusotoError<PutObjectError>),
    ListObjectsError(RusotoError<ListObjectsV2Error>),
    GetObjectError(RusotoError<GetObjectError>),
    PublishError(RusotoError<PublishError>),
    GetCallerIdentityError(RusotoError<GetCallerIdentityError>),
}

impl Display for CostReportError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            CostReportError::NoneValue => write!(f, "Value is None"),
            CostReportError::ToPrimitive => {
                write!(f, "Failed to convert bigDecimal to primitive")
            }
            CostReportError::InvalidDate => write!(f, "Failed to compute calendar date"),
            CostReportError::InvalidUtcOffset(hours) => {
                write!(f, "UTC offset of {} hours is out of range", hours)
            }
            CostReportError::Config(ref error) => Display::fmt(error, f),
            CostReportError::MissingConfig(ref key) => {
                write!(f, "Missing configuration value {}", key)
            }
            CostReportError::InvalidConfig { ref key, ref reason } => {
                write!(f, "Invalid configuration value {}: {}", key, reason)
            }
            CostReportError::NoReportFound(ref prefix) => {
                write!(f, "No cost data files found under {}", prefix)
            }
            CostReportError::MissingMetric(ref service) => {
                write!(f, "BlendedCost amount missing for service {}", service)
            }
            CostReportError::InvalidAmount(ref error) => Display::fmt(error, f),
            CostReportError::InvalidTimestamp(ref error) => Display::fmt(error, f),
            CostReportError::Json(ref error) => Display::fmt(error, f),
            CostReportError::ReadBody(ref error) => Display::fmt(error, f),
            CostReportError::Timeout(operation) => write!(f, "{} timed out", operation),
            CostReportError::GetCostAndUsageError(ref error) => Display::fmt(error, f),
            CostReportError::PutObjectError(ref error) => Display::fmt(error, f),
            CostReportError::ListObjectsError(ref error) => Display::fmt(error, f),
            CostReportError::GetObjectError(ref error) => Display::fmt(error, f),
            CostReportError::PublishError(ref error) => Display::fmt(error, f),
            CostReportError::GetCallerIdentityError(ref error) => Display::fmt(error, f),
        }
    }
}

impl Error for CostReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            CostReportError::Config(ref error) => Some(error),
            CostReportError::InvalidAmount(ref error) => Some(error),
            CostReportError::InvalidTimestamp(ref error) => Some(error),
            CostReportError::Json(ref error) => Some(error),
            CostReportError::ReadBody(ref error) => Some(error),
            CostReportError::GetCostAndUsageError(ref error) => Some(error),
            CostReportError::PutObjectError(ref error) => Some(error),
            CostReportError::ListObjectsError(ref error) => Some(error),
            CostReportError::GetObjectError(ref error) => Some(error),
            CostReportError::PublishError(ref error) => Some(error),
            CostReportError::GetCallerIdentityError(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for CostReportError {
    fn from(e: ConfigError) -> CostReportError {
        CostReportError::Config(e)
    }
}

impl From<ParseBigDecimalError> for CostReportError {
    fn from(e: ParseBigDecimalError) -> CostReportError {
        CostReportError::InvalidAmount(e)
    }
}

impl From<chrono::ParseError> for CostReportError {
    fn from(e: chrono::ParseError) -> CostReportError {
        CostReportError::InvalidTimestamp(e)
    }
}

impl From<serde_json::Error> for CostReportError {
    fn from(e: serde_json::Error) -> CostReportError {
        CostReportError::Json(e)
    }
}

impl From<std::io::Error> for CostReportError {
    fn from(e: std::io::Error) -> CostReportError {
        CostReportError::ReadBody(e)
    }
}

impl From<RusotoError<GetCostAndUsageError>> for CostReportError {
    fn from(e: RusotoError<GetCostAndUsageError>) -> CostReportError {
        CostReportError::GetCostAndUsageError(e)
    }
}

impl From<RusotoError<PutObjectError>> for CostReportError {
    fn from(e: RusotoError<PutObjectError>) -> CostReportError {
        CostReportError::PutObjectError(e)
    }
}

impl From<RusotoError<ListObjectsV2Error>> for CostReportError {
    fn from(e: RusotoError<ListObjectsV2Error>) -> CostReportError {
        CostReportError::ListObjectsError(e)
    }
}

impl From<RusotoError<GetObjectError>> for CostReportError {
    fn from(e: RusotoError<GetObjectError>) -> CostReportError {
        CostReportError::GetObjectError(e)
    }
}

impl From<RusotoError<PublishError>> for CostReportError {
    fn from(e: RusotoError<PublishError>) -> CostReportError {
        CostReportError::PublishError(e)
    }
}

impl From<RusotoError<GetCallerIdentityError>> for CostReportError {
    fn from(e: RusotoError<GetCallerIdentityError>) -> CostReportError {
        CostReportError::GetCallerIdentityError(e)
    }
}
